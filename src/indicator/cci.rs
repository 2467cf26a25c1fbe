use crate::indicator::utils::{PriceColumns, align_to_tail};
use crate::indicator::{TABuilder, ValuePoint};
use crate::model::Candle;
use std::marker::PhantomData;

/// CCI 시계열 포인트
pub type CCIPoint = ValuePoint;

/// Lambert 상수
const CCI_CONSTANT: f64 = 0.015;

/// 상품 채널 지수(CCI) 빌더
///
/// 전형가격(TP = (고가+저가+종가)/3)이 평균에서 얼마나 벗어났는지를
/// 평균 절대 편차로 정규화합니다. 평균 편차가 0이면 0을 반환합니다.
#[derive(Debug)]
pub struct CCIBuilder<C: Candle> {
    period: usize,
    _phantom: PhantomData<C>,
}

impl<C: Candle> CCIBuilder<C> {
    pub fn new(period: usize) -> Self {
        if period == 0 {
            panic!("CCI 기간은 0보다 커야 합니다");
        }

        CCIBuilder {
            period,
            _phantom: PhantomData,
        }
    }
}

impl<C> TABuilder<CCIPoint, C> for CCIBuilder<C>
where
    C: Candle,
{
    fn name(&self) -> &'static str {
        "CCI"
    }

    fn warm_up(&self) -> usize {
        self.period - 1
    }

    fn calculate(&self, data: &[C]) -> Vec<CCIPoint> {
        let columns = PriceColumns::from_candles(data);
        let typical_prices: Vec<f64> = (0..columns.len())
            .map(|i| (columns.highs[i] + columns.lows[i] + columns.closes[i]) / 3.0)
            .collect();

        let period = self.period as f64;
        let values: Vec<f64> = typical_prices
            .windows(self.period)
            .map(|window| {
                let mean = window.iter().sum::<f64>() / period;
                let mean_dev = window.iter().map(|tp| (tp - mean).abs()).sum::<f64>() / period;
                let current = window[window.len() - 1];
                if mean_dev == 0.0 {
                    0.0
                } else {
                    (current - mean) / (CCI_CONSTANT * mean_dev)
                }
            })
            .collect();

        align_to_tail(data, values, |timestamp, value| CCIPoint { timestamp, value })
    }
}
