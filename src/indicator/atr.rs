use crate::indicator::utils::{PriceColumns, align_to_tail, moving_average, true_range};
use crate::indicator::{TABuilder, ValuePoint};
use crate::model::Candle;
use std::marker::PhantomData;

/// ATR 시계열 포인트
pub type ATRPoint = ValuePoint;

/// 두 번째 캔들부터의 True Range 시계열
pub(crate) fn true_ranges(columns: &PriceColumns) -> Vec<f64> {
    (1..columns.len())
        .map(|i| true_range(columns.highs[i], columns.lows[i], columns.closes[i - 1]))
        .collect()
}

/// 평균 실제 범위(ATR) 빌더
///
/// True Range는 두 번째 캔들부터 계산되며, 첫 ATR은 처음 `period`개
/// True Range의 평균이고 이후 Wilder 방식으로 평활화합니다.
#[derive(Debug)]
pub struct ATRBuilder<C: Candle> {
    period: usize,
    _phantom: PhantomData<C>,
}

impl<C: Candle> ATRBuilder<C> {
    /// 새 ATR 빌더 생성
    pub fn new(period: usize) -> ATRBuilder<C> {
        if period == 0 {
            panic!("ATR 기간은 0보다 커야 합니다");
        }

        ATRBuilder {
            period,
            _phantom: PhantomData,
        }
    }
}

impl<C> TABuilder<ATRPoint, C> for ATRBuilder<C>
where
    C: Candle,
{
    fn name(&self) -> &'static str {
        "ATR"
    }

    fn warm_up(&self) -> usize {
        self.period
    }

    fn calculate(&self, data: &[C]) -> Vec<ATRPoint> {
        let columns = PriceColumns::from_candles(data);
        let trs = true_ranges(&columns);

        let mut atr = trs[..self.period].iter().sum::<f64>() / self.period as f64;
        let mut values = Vec::with_capacity(trs.len() - self.period + 1);
        values.push(atr);

        for &tr in &trs[self.period..] {
            atr = moving_average::wilder_step(atr, tr, self.period);
            values.push(atr);
        }

        align_to_tail(data, values, |timestamp, value| ATRPoint { timestamp, value })
    }
}
