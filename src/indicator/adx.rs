use crate::indicator::TABuilder;
use crate::indicator::atr::true_ranges;
use crate::indicator::utils::{PriceColumns, align_to_tail, ta_lib_output};
use crate::model::Candle;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::marker::PhantomData;
use ta_lib::average_directional_movement_index;

/// ADX 시계열 포인트
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ADXPoint {
    pub timestamp: i64,
    /// 평균 방향성 지수 (0-100)
    pub adx: f64,
    /// +DI (0-100)
    pub pdi: f64,
    /// -DI (0-100)
    pub mdi: f64,
}

impl Display for ADXPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: ADX {:.2}, +DI {:.2}, -DI {:.2}",
            self.timestamp, self.adx, self.pdi, self.mdi
        )
    }
}

/// 두 번째 캔들부터의 (+DM, -DM) 시계열
fn directional_movements(columns: &PriceColumns) -> Vec<(f64, f64)> {
    (1..columns.len())
        .map(|i| {
            let up_move = columns.highs[i] - columns.highs[i - 1];
            let down_move = columns.lows[i - 1] - columns.lows[i];

            let plus_dm = if up_move > down_move && up_move > 0.0 {
                up_move
            } else {
                0.0
            };
            let minus_dm = if down_move > up_move && down_move > 0.0 {
                down_move
            } else {
                0.0
            };
            (plus_dm, minus_dm)
        })
        .collect()
}

/// 평활화된 합계로부터 (+DI, -DI) 계산
fn directional_indicators(smooth_tr: f64, smooth_plus_dm: f64, smooth_minus_dm: f64) -> (f64, f64) {
    if smooth_tr == 0.0 {
        return (0.0, 0.0);
    }

    (100.0 * smooth_plus_dm / smooth_tr, 100.0 * smooth_minus_dm / smooth_tr)
}

/// 인덱스 `period`부터의 (+DI, -DI) 시계열
fn calculate_di_series(columns: &PriceColumns, period: usize) -> Vec<(f64, f64)> {
    let trs = true_ranges(columns);
    let dms = directional_movements(columns);
    let weight = period as f64;

    // 처음 period 개 값의 합으로 시작하는 Wilder 평활화 합계
    let mut smooth_tr: f64 = trs[..period].iter().sum();
    let mut smooth_plus_dm: f64 = dms[..period].iter().map(|dm| dm.0).sum();
    let mut smooth_minus_dm: f64 = dms[..period].iter().map(|dm| dm.1).sum();

    let mut lines = Vec::with_capacity(trs.len() - period + 1);
    lines.push(directional_indicators(smooth_tr, smooth_plus_dm, smooth_minus_dm));

    for i in period..trs.len() {
        smooth_tr = smooth_tr - smooth_tr / weight + trs[i];
        smooth_plus_dm = smooth_plus_dm - smooth_plus_dm / weight + dms[i].0;
        smooth_minus_dm = smooth_minus_dm - smooth_minus_dm / weight + dms[i].1;
        lines.push(directional_indicators(smooth_tr, smooth_plus_dm, smooth_minus_dm));
    }

    lines
}

/// ADX 시계열 계산
///
/// ADX 선은 ta-lib 로 계산하며 첫 값은 인덱스 `2 * period - 1`에 위치합니다.
/// 각 ADX 값에 같은 캔들의 +DI/-DI 를 붙입니다.
fn calculate_adx_series(columns: &PriceColumns, period: usize) -> Vec<(f64, f64, f64)> {
    let adx_values = ta_lib_output(
        columns.len(),
        average_directional_movement_index(&columns.highs, &columns.lows, &columns.closes, Some(period)),
    );
    let di_lines = calculate_di_series(columns, period);

    let Some(di_start) = di_lines.len().checked_sub(adx_values.len()) else {
        log::warn!("ADX 길이가 DI 보다 깁니다: {} > {}", adx_values.len(), di_lines.len());
        return Vec::new();
    };

    adx_values
        .into_iter()
        .zip(&di_lines[di_start..])
        .map(|(adx, &(pdi, mdi))| (adx, pdi, mdi))
        .collect()
}

/// 평균 방향성 지수(ADX) 빌더
///
/// 추세의 방향과 무관하게 추세의 강도를 측정합니다.
#[derive(Debug)]
pub struct ADXBuilder<C: Candle> {
    period: usize,
    _phantom: PhantomData<C>,
}

impl<C> ADXBuilder<C>
where
    C: Candle,
{
    pub fn new(period: usize) -> Self {
        if period < 2 {
            panic!("ADX 기간은 2 이상이어야 합니다");
        }

        ADXBuilder {
            period,
            _phantom: PhantomData,
        }
    }
}

impl<C> TABuilder<ADXPoint, C> for ADXBuilder<C>
where
    C: Candle,
{
    fn name(&self) -> &'static str {
        "ADX"
    }

    fn warm_up(&self) -> usize {
        2 * self.period - 1
    }

    fn calculate(&self, data: &[C]) -> Vec<ADXPoint> {
        let columns = PriceColumns::from_candles(data);
        let values = calculate_adx_series(&columns, self.period);
        align_to_tail(data, values, |timestamp, (adx, pdi, mdi)| ADXPoint {
            timestamp,
            adx,
            pdi,
            mdi,
        })
    }
}
