use crate::indicator::utils::{align_to_tail, moving_average};
use crate::indicator::{TABuilder, ValuePoint};
use crate::model::Candle;
use std::marker::PhantomData;

/// RSI 시계열 포인트 (0-100)
pub type RSIPoint = ValuePoint;

/// 평균 이익/손실로 RSI 값 계산
///
/// 손실이 없으면 100, 이익과 손실이 모두 없으면(횡보) 중립값 50을 반환합니다.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            return 50.0;
        }
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

/// Wilder 평활화 RSI 시계열 계산
///
/// 첫 평균은 처음 `period`개 변화량의 단순 평균이며,
/// `values.len() - period`개의 값을 반환합니다.
fn calculate_rsi_series(values: &[f64], period: usize) -> Vec<f64> {
    if values.len() < period + 1 {
        return Vec::new();
    }

    let mut gains = Vec::with_capacity(values.len() - 1);
    let mut losses = Vec::with_capacity(values.len() - 1);

    // 가격 변화량 계산
    for pair in values.windows(2) {
        let change = pair[1] - pair[0];
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    // 첫 번째 평균 게인/로스 계산
    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;

    let mut result = Vec::with_capacity(values.len() - period);
    result.push(rsi_from_averages(avg_gain, avg_loss));

    for i in period..gains.len() {
        avg_gain = moving_average::wilder_step(avg_gain, gains[i], period);
        avg_loss = moving_average::wilder_step(avg_loss, losses[i], period);
        result.push(rsi_from_averages(avg_gain, avg_loss));
    }

    result
}

/// 상대강도지수(RSI) 기술적 지표 빌더
///
/// RSI는 가격 변동의 상대적 강도를 측정하여 과매수/과매도 상태를 판단합니다.
/// 최소 `period + 1`개의 종가가 필요합니다.
#[derive(Debug)]
pub struct RSIBuilder<C: Candle> {
    /// RSI 계산 기간
    period: usize,
    _phantom: PhantomData<C>,
}

impl<C> RSIBuilder<C>
where
    C: Candle,
{
    /// 새 RSI 빌더 생성
    ///
    /// # Panics
    /// * 기간이 0이면 패닉 발생
    pub fn new(period: usize) -> Self {
        if period == 0 {
            panic!("RSI 기간은 0보다 커야 합니다");
        }

        RSIBuilder {
            period,
            _phantom: PhantomData,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl<C> TABuilder<RSIPoint, C> for RSIBuilder<C>
where
    C: Candle,
{
    fn name(&self) -> &'static str {
        "RSI"
    }

    fn warm_up(&self) -> usize {
        self.period
    }

    fn calculate(&self, data: &[C]) -> Vec<RSIPoint> {
        let closes: Vec<f64> = data.iter().map(|c| c.close_price()).collect();
        let values = calculate_rsi_series(&closes, self.period);
        align_to_tail(data, values, |timestamp, value| RSIPoint { timestamp, value })
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
            .map(|(i, &close)| Ohlcv::new(i as i64, close, close, close, close, 1000.0))
            .collect()
    }

    #[test]
    fn test_rsi_requires_period_plus_one() {
        let builder = RSIBuilder::<Ohlcv>::new(14);
        let candles = candles_from_closes(&[100.0; 14]);
        assert!(builder.build(&candles).is_none());

        let candles = candles_from_closes(&[100.0; 15]);
        assert_eq!(builder.build(&candles).unwrap().len(), 1);
    }

    #[test]
    fn test_rsi_all_gains_is_100() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let rsi = RSIBuilder::<Ohlcv>::new(14)
            .build(&candles_from_closes(&closes))
            .unwrap();
        assert!(rsi.iter().all(|p| p.value == 100.0));
    }

    #[test]
    fn test_rsi_flat_market_is_neutral() {
        let rsi = RSIBuilder::<Ohlcv>::new(14)
            .build(&candles_from_closes(&[50.0; 30]))
            .unwrap();
        assert!(rsi.iter().all(|p| p.value == 50.0));
    }

    #[test]
    fn test_rsi_wilder_smoothing() {
        // 기간 2: 변화량 +1, -1, +2
        let closes = [10.0, 11.0, 10.0, 12.0];
        let rsi = RSIBuilder::<Ohlcv>::new(2)
            .build(&candles_from_closes(&closes))
            .unwrap();
        assert_eq!(rsi.len(), 2);
        // 첫 평균: gain 0.5, loss 0.5
        assert!((rsi[0].value - 50.0).abs() < 1e-12);
        // 다음: gain (0.5 + 2) / 2 = 1.25, loss 0.25 -> RS 5
        assert!((rsi[1].value - (100.0 - 100.0 / 6.0)).abs() < 1e-9);
        assert_eq!(rsi[1].timestamp, 3);
    }

    #[test]
    #[should_panic(expected = "RSI 기간은 0보다 커야 합니다")]
    fn test_rsi_zero_period() {
        RSIBuilder::<Ohlcv>::new(0);
    }
}
