use crate::indicator::utils::{PriceColumns, align_to_tail, highest, lowest};
use crate::indicator::{TABuilder, ValuePoint};
use crate::model::Candle;
use std::marker::PhantomData;

/// Williams %R 시계열 포인트 (-100 ~ 0)
pub type WilliamsRPoint = ValuePoint;

/// Williams %R 빌더
///
/// 기간 내 최고가 대비 종가의 위치를 -100(최저) ~ 0(최고)으로 표시합니다.
/// 범위가 0이면 -50을 반환합니다.
#[derive(Debug)]
pub struct WilliamsRBuilder<C: Candle> {
    period: usize,
    _phantom: PhantomData<C>,
}

impl<C: Candle> WilliamsRBuilder<C> {
    pub fn new(period: usize) -> Self {
        if period == 0 {
            panic!("Williams %R 기간은 0보다 커야 합니다");
        }

        WilliamsRBuilder {
            period,
            _phantom: PhantomData,
        }
    }
}

impl<C> TABuilder<WilliamsRPoint, C> for WilliamsRBuilder<C>
where
    C: Candle,
{
    fn name(&self) -> &'static str {
        "WilliamsR"
    }

    fn warm_up(&self) -> usize {
        self.period - 1
    }

    fn calculate(&self, data: &[C]) -> Vec<WilliamsRPoint> {
        let columns = PriceColumns::from_candles(data);
        let values: Vec<f64> = (self.period - 1..columns.len())
            .map(|i| {
                let start = i + 1 - self.period;
                let highest_high = highest(&columns.highs[start..=i]);
                let lowest_low = lowest(&columns.lows[start..=i]);
                let range = highest_high - lowest_low;
                if range == 0.0 {
                    -50.0
                } else {
                    -100.0 * (highest_high - columns.closes[i]) / range
                }
            })
            .collect();

        align_to_tail(data, values, |timestamp, value| WilliamsRPoint {
            timestamp,
            value,
        })
    }
}
