use crate::indicator::TABuilder;
use crate::indicator::utils::{align_to_tail, moving_average, population_std_dev};
use crate::model::Candle;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
use std::marker::PhantomData;

/// 볼린저 밴드 시계열 포인트
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBandsPoint {
    pub timestamp: i64,
    /// 상단 밴드
    pub upper: f64,
    /// 중간 밴드 (SMA)
    pub middle: f64,
    /// 하단 밴드
    pub lower: f64,
}

impl BollingerBandsPoint {
    /// 밴드 폭 (상단 - 하단)
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// 중간 밴드 대비 밴드 폭 비율
    ///
    /// 중간 밴드가 0이면 0을 반환합니다.
    pub fn bandwidth(&self) -> f64 {
        if self.middle == 0.0 {
            return 0.0;
        }
        self.width() / self.middle
    }

    /// 밴드 내 가격 위치 (%B, 0.0 = 하단, 1.0 = 상단)
    ///
    /// 밴드 폭이 0이면 None
    pub fn percent_b(&self, price: f64) -> Option<f64> {
        let width = self.width();
        if width == 0.0 {
            return None;
        }
        Some((price - self.lower) / width)
    }
}

impl Display for BollingerBandsPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {:.2}, {:.2}, {:.2}",
            self.timestamp, self.upper, self.middle, self.lower
        )
    }
}

/// 볼린저 밴드 빌더
///
/// 중간 밴드는 SMA 계열과 같은 함수로 계산하여 동일한 값을 보장하고,
/// 밴드는 모집단 표준편차에 승수를 곱해 더하거나 뺍니다.
#[derive(Debug)]
pub struct BollingerBandsBuilder<C: Candle> {
    period: usize,
    /// 표준편차 승수
    multiplier: f64,
    _phantom: PhantomData<C>,
}

impl<C> BollingerBandsBuilder<C>
where
    C: Candle,
{
    /// 새 볼린저 밴드 빌더 생성
    ///
    /// # Arguments
    /// * `period` - 계산 기간 (기본값 20)
    /// * `multiplier` - 표준편차 승수 (기본값 2.0)
    ///
    /// # Panics
    /// * 기간이 0이거나 승수가 양수가 아니면 패닉 발생
    pub fn new(period: usize, multiplier: f64) -> Self {
        if period == 0 {
            panic!("볼린저 밴드 기간은 0보다 커야 합니다");
        }

        if !(multiplier > 0.0) {
            panic!("볼린저 밴드 승수는 0보다 커야 합니다");
        }

        BollingerBandsBuilder {
            period,
            multiplier,
            _phantom: PhantomData,
        }
    }
}

impl<C> TABuilder<BollingerBandsPoint, C> for BollingerBandsBuilder<C>
where
    C: Candle,
{
    fn name(&self) -> &'static str {
        "BollingerBands"
    }

    fn warm_up(&self) -> usize {
        self.period - 1
    }

    fn calculate(&self, data: &[C]) -> Vec<BollingerBandsPoint> {
        let closes: Vec<f64> = data.iter().map(|c| c.close_price()).collect();
        let middles = moving_average::sma_series(&closes, self.period);

        let bands: Vec<(f64, f64)> = closes
            .windows(self.period)
            .zip(middles)
            .map(|(window, middle)| (middle, population_std_dev(window)))
            .collect();

        align_to_tail(data, bands, |timestamp, (middle, std_dev)| {
            BollingerBandsPoint {
                timestamp,
                upper: middle + self.multiplier * std_dev,
                middle,
                lower: middle - self.multiplier * std_dev,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Ohlcv;

    fn candles_from_closes(closes: &[f64]) -> Vec<Ohlcv> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Ohlcv::new(i as i64, close, close, close, close, 1.0))
            .collect()
    }

    #[test]
    fn test_bband_known_values() {
        let closes = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let bb = BollingerBandsBuilder::<Ohlcv>::new(8, 2.0)
            .build(&candles_from_closes(&closes))
            .unwrap();

        assert_eq!(bb.len(), 1);
        assert!((bb[0].middle - 5.0).abs() < 1e-12);
        assert!((bb[0].upper - 9.0).abs() < 1e-12);
        assert!((bb[0].lower - 1.0).abs() < 1e-12);
        assert!((bb[0].bandwidth() - 1.6).abs() < 1e-12);
    }

    #[test]
    fn test_bband_flat_series_collapses() {
        let bb = BollingerBandsBuilder::<Ohlcv>::new(20, 2.0)
            .build(&candles_from_closes(&[10.0; 25]))
            .unwrap();

        assert_eq!(bb.len(), 6);
        for point in &bb {
            assert_eq!(point.upper, point.lower);
            assert!(point.percent_b(10.0).is_none());
        }
    }

    #[test]
    fn test_bband_ordering() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let bb = BollingerBandsBuilder::<Ohlcv>::new(20, 2.0)
            .build(&candles_from_closes(&closes))
            .unwrap();
        assert!(bb.iter().all(|p| p.lower <= p.middle && p.middle <= p.upper));
        assert_eq!(bb.last().unwrap().timestamp, 39);
    }
}
