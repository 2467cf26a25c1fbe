use crate::indicator::utils::{PriceColumns, align_to_tail};
use crate::indicator::{TABuilder, ValuePoint};
use crate::model::Candle;
use std::marker::PhantomData;

/// Parabolic SAR 시계열 포인트
pub type PSARPoint = ValuePoint;

/// SAR 진행 중의 상태
#[derive(Debug, Clone, Copy)]
struct SarState {
    is_long: bool,
    /// 현재 추세의 극점 (상승: 최고가, 하락: 최저가)
    extreme_point: f64,
    /// 가속 계수
    acceleration: f64,
    sar: f64,
}

/// Parabolic SAR 시계열 계산
///
/// 두 번째 캔들의 고가가 첫 캔들보다 높으면 상승 추세로 시작합니다.
/// 상승 중인 SAR은 직전 두 캔들의 저가를, 하락 중인 SAR은 직전 두 캔들의
/// 고가를 넘지 않으며, 가격이 SAR을 관통하면 추세가 반전됩니다.
fn calculate_psar_series(columns: &PriceColumns, step: f64, max: f64) -> Vec<f64> {
    let highs = &columns.highs;
    let lows = &columns.lows;

    let is_long = highs[1] > highs[0];
    let mut state = SarState {
        is_long,
        extreme_point: if is_long { highs[0] } else { lows[0] },
        acceleration: step,
        sar: if is_long { lows[0] } else { highs[0] },
    };

    let mut result = Vec::with_capacity(columns.len());
    result.push(state.sar);

    for i in 1..columns.len() {
        let mut sar = state.sar + state.acceleration * (state.extreme_point - state.sar);

        if state.is_long {
            sar = sar.min(lows[i - 1]);
            if i >= 2 {
                sar = sar.min(lows[i - 2]);
            }

            if lows[i] < sar {
                // 하락 반전
                state.is_long = false;
                sar = state.extreme_point;
                state.extreme_point = lows[i];
                state.acceleration = step;
            } else if highs[i] > state.extreme_point {
                state.extreme_point = highs[i];
                state.acceleration = (state.acceleration + step).min(max);
            }
        } else {
            sar = sar.max(highs[i - 1]);
            if i >= 2 {
                sar = sar.max(highs[i - 2]);
            }

            if highs[i] > sar {
                // 상승 반전
                state.is_long = true;
                sar = state.extreme_point;
                state.extreme_point = highs[i];
                state.acceleration = step;
            } else if lows[i] < state.extreme_point {
                state.extreme_point = lows[i];
                state.acceleration = (state.acceleration + step).min(max);
            }
        }

        state.sar = sar;
        result.push(sar);
    }

    result
}

/// Parabolic SAR 빌더
#[derive(Debug)]
pub struct PSARBuilder<C: Candle> {
    /// 가속 계수 증가폭 (기본값 0.02)
    step: f64,
    /// 가속 계수 최대값 (기본값 0.2)
    max: f64,
    _phantom: PhantomData<C>,
}

impl<C: Candle> PSARBuilder<C> {
    /// 새 Parabolic SAR 빌더 생성
    ///
    /// # Panics
    /// * step 또는 max 가 양수가 아니거나 step > max 이면 패닉 발생
    pub fn new(step: f64, max: f64) -> Self {
        if !(step > 0.0 && max > 0.0) || step > max {
            panic!("Parabolic SAR 가속 계수가 올바르지 않습니다");
        }

        PSARBuilder {
            step,
            max,
            _phantom: PhantomData,
        }
    }
}

impl<C> TABuilder<PSARPoint, C> for PSARBuilder<C>
where
    C: Candle,
{
    fn name(&self) -> &'static str {
        "PSAR"
    }

    fn warm_up(&self) -> usize {
        0
    }

    fn min_len(&self) -> usize {
        2
    }

    fn calculate(&self, data: &[C]) -> Vec<PSARPoint> {
        let columns = PriceColumns::from_candles(data);
        let values = calculate_psar_series(&columns, self.step, self.max);
        align_to_tail(data, values, |timestamp, value| PSARPoint { timestamp, value })
    }
}
