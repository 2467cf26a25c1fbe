use crate::indicator::TABuilder;
use crate::indicator::utils::{PriceColumns, align_to_tail, highest, lowest, moving_average};
use crate::model::Candle;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::marker::PhantomData;

/// 스토캐스틱 시계열 포인트
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticPoint {
    pub timestamp: i64,
    /// %K (0-100)
    pub k: f64,
    /// %D: %K의 SMA (0-100)
    pub d: f64,
}

impl Display for StochasticPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: K {:.2}, D {:.2}", self.timestamp, self.k, self.d)
    }
}

/// %K 시계열 계산
///
/// 기간 내 최고가와 최저가가 같으면 %K는 0입니다.
fn calculate_percent_k(columns: &PriceColumns, period: usize) -> Vec<f64> {
    (period - 1..columns.len())
        .map(|i| {
            let start = i + 1 - period;
            let highest_high = highest(&columns.highs[start..=i]);
            let lowest_low = lowest(&columns.lows[start..=i]);
            let range = highest_high - lowest_low;
            if range == 0.0 {
                0.0
            } else {
                100.0 * (columns.closes[i] - lowest_low) / range
            }
        })
        .collect()
}

/// 스토캐스틱 오실레이터 빌더
///
/// %D가 존재하는 구간의 포인트만 만듭니다.
#[derive(Debug)]
pub struct StochasticBuilder<C: Candle> {
    /// %K 기간 (기본값 14)
    period: usize,
    /// %D 기간 (기본값 3)
    signal_period: usize,
    _phantom: PhantomData<C>,
}

impl<C> StochasticBuilder<C>
where
    C: Candle,
{
    pub fn new(period: usize, signal_period: usize) -> Self {
        if period == 0 || signal_period == 0 {
            panic!("스토캐스틱 기간은 0보다 커야 합니다");
        }

        StochasticBuilder {
            period,
            signal_period,
            _phantom: PhantomData,
        }
    }
}

impl<C> TABuilder<StochasticPoint, C> for StochasticBuilder<C>
where
    C: Candle,
{
    fn name(&self) -> &'static str {
        "Stochastic"
    }

    fn warm_up(&self) -> usize {
        self.period + self.signal_period - 2
    }

    fn calculate(&self, data: &[C]) -> Vec<StochasticPoint> {
        let columns = PriceColumns::from_candles(data);
        let k_values = calculate_percent_k(&columns, self.period);
        let d_values = moving_average::sma_series(&k_values, self.signal_period);

        let skip = k_values.len() - d_values.len();
        let values: Vec<(f64, f64)> = k_values[skip..].iter().copied().zip(d_values).collect();

        align_to_tail(data, values, |timestamp, (k, d)| StochasticPoint {
            timestamp,
            k,
            d,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Ohlcv;

    #[test]
    fn test_stochastic_close_at_high_is_100() {
        let candles: Vec<Ohlcv> = (0..20)
            .map(|i| {
                let base = 100.0 + i as f64;
                Ohlcv::new(i, base, base + 1.0, base - 1.0, base + 1.0, 10.0)
            })
            .collect();
        let stoch = StochasticBuilder::<Ohlcv>::new(14, 3).build(&candles).unwrap();

        assert_eq!(stoch.len(), 5);
        assert_eq!(stoch[0].timestamp, 15);
        assert!(stoch.iter().all(|p| (p.k - 100.0).abs() < 1e-12));
        assert!(stoch.iter().all(|p| (p.d - 100.0).abs() < 1e-12));
    }

    #[test]
    fn test_stochastic_zero_range_is_zero() {
        let candles: Vec<Ohlcv> = (0..16)
            .map(|i| Ohlcv::new(i, 5.0, 5.0, 5.0, 5.0, 1.0))
            .collect();
        let stoch = StochasticBuilder::<Ohlcv>::new(14, 3).build(&candles).unwrap();
        assert_eq!(stoch.len(), 1);
        assert_eq!(stoch[0].k, 0.0);
        assert_eq!(stoch[0].d, 0.0);
    }

    #[test]
    fn test_stochastic_insufficient_data() {
        let candles = vec![Ohlcv::default(); 15];
        assert!(StochasticBuilder::<Ohlcv>::new(14, 3).build(&candles).is_none());
    }
}
