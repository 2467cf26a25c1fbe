use crate::indicator::utils::align_to_tail;
use crate::indicator::{TABuilder, ValuePoint};
use crate::model::Candle;
use std::marker::PhantomData;

/// OBV 시계열 포인트
pub type OBVPoint = ValuePoint;

/// 거래량 균형 지표(OBV) 빌더
///
/// 첫 캔들은 0에서 시작하며, 종가가 오르면 거래량을 더하고
/// 내리면 빼고 같으면 유지합니다.
#[derive(Debug, Default)]
pub struct OBVBuilder<C: Candle> {
    _phantom: PhantomData<C>,
}

impl<C: Candle> OBVBuilder<C> {
    pub fn new() -> Self {
        OBVBuilder {
            _phantom: PhantomData,
        }
    }
}

impl<C> TABuilder<OBVPoint, C> for OBVBuilder<C>
where
    C: Candle,
{
    fn name(&self) -> &'static str {
        "OBV"
    }

    fn warm_up(&self) -> usize {
        0
    }

    fn calculate(&self, data: &[C]) -> Vec<OBVPoint> {
        let mut obv = 0.0;
        let mut values = Vec::with_capacity(data.len());
        values.push(obv);

        for pair in data.windows(2) {
            let (prev, current) = (&pair[0], &pair[1]);
            if current.close_price() > prev.close_price() {
                obv += current.volume();
            } else if current.close_price() < prev.close_price() {
                obv -= current.volume();
            }
            values.push(obv);
        }

        align_to_tail(data, values, |timestamp, value| OBVPoint { timestamp, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Ohlcv;

    #[test]
    fn test_obv_accumulates_by_direction() {
        let closes = [10.0, 11.0, 11.0, 9.0, 12.0];
        let candles: Vec<Ohlcv> = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Ohlcv::new(i as i64, c, c, c, c, (i + 1) as f64 * 100.0))
            .collect();
        let obv = OBVBuilder::<Ohlcv>::new().build(&candles).unwrap();

        let values: Vec<f64> = obv.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![0.0, 200.0, 200.0, -200.0, 300.0]);
    }

    #[test]
    fn test_obv_single_bar() {
        let obv = OBVBuilder::<Ohlcv>::new()
            .build(&[Ohlcv::new(7, 1.0, 1.0, 1.0, 1.0, 50.0)])
            .unwrap();
        assert_eq!(obv, vec![OBVPoint { timestamp: 7, value: 0.0 }]);
    }
}
