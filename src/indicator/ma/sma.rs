use crate::indicator::TABuilder;
use crate::indicator::ma::MAPoint;
use crate::indicator::utils::{align_to_tail, moving_average};
use crate::model::Candle;
use std::marker::PhantomData;

/// 단순이동평균(SMA) 빌더
#[derive(Debug)]
pub struct SMABuilder<C: Candle> {
    period: usize,
    _phantom: PhantomData<C>,
}

impl<C> SMABuilder<C>
where
    C: Candle,
{
    pub fn new(period: usize) -> Self {
        if period == 0 {
            panic!("이동평균 기간은 0보다 커야 합니다");
        }

        SMABuilder {
            period,
            _phantom: PhantomData,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl<C> TABuilder<MAPoint, C> for SMABuilder<C>
where
    C: Candle,
{
    fn name(&self) -> &'static str {
        "SMA"
    }

    fn warm_up(&self) -> usize {
        self.period - 1
    }

    fn calculate(&self, data: &[C]) -> Vec<MAPoint> {
        let closes: Vec<f64> = data.iter().map(|c| c.close_price()).collect();
        let values = moving_average::sma_series(&closes, self.period);
        align_to_tail(data, values, |timestamp, value| MAPoint { timestamp, value })
    }
}
