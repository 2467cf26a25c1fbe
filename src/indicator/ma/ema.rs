use crate::indicator::TABuilder;
use crate::indicator::ma::MAPoint;
use crate::indicator::utils::{align_to_tail, moving_average};
use crate::model::Candle;
use std::marker::PhantomData;

/// 지수이동평균(EMA) 빌더
///
/// 첫 값은 처음 `period`개 종가의 SMA로 시드하고,
/// 이후 알파 2/(period+1)로 평활화합니다.
#[derive(Debug)]
pub struct EMABuilder<C: Candle> {
    period: usize,
    _phantom: PhantomData<C>,
}

impl<C> EMABuilder<C>
where
    C: Candle,
{
    pub fn new(period: usize) -> Self {
        if period == 0 {
            panic!("이동평균 기간은 0보다 커야 합니다");
        }

        EMABuilder {
            period,
            _phantom: PhantomData,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl<C> TABuilder<MAPoint, C> for EMABuilder<C>
where
    C: Candle,
{
    fn name(&self) -> &'static str {
        "EMA"
    }

    fn warm_up(&self) -> usize {
        self.period - 1
    }

    fn calculate(&self, data: &[C]) -> Vec<MAPoint> {
        let closes: Vec<f64> = data.iter().map(|c| c.close_price()).collect();
        let values = moving_average::ema_series(&closes, self.period);
        align_to_tail(data, values, |timestamp, value| MAPoint { timestamp, value })
    }
}
