use crate::indicator::TABuilder;
use crate::indicator::utils::{align_to_tail, moving_average};
use crate::model::Candle;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::marker::PhantomData;

/// MACD 파라미터
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MACDParams {
    /// 빠른 EMA 기간 (일반적으로 12)
    pub fast_period: usize,
    /// 느린 EMA 기간 (일반적으로 26)
    pub slow_period: usize,
    /// 시그널 라인 기간 (일반적으로 9)
    pub signal_period: usize,
}

impl Default for MACDParams {
    fn default() -> Self {
        MACDParams {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl Display for MACDParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MACD({},{},{})",
            self.fast_period, self.slow_period, self.signal_period
        )
    }
}

/// MACD 시계열 포인트
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MACDPoint {
    pub timestamp: i64,
    /// MACD 라인 (빠른 EMA - 느린 EMA)
    pub macd: f64,
    /// 시그널 라인 (MACD의 EMA)
    pub signal: f64,
    /// 히스토그램 (MACD - 시그널)
    pub histogram: f64,
}

impl Display for MACDPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {:.2}, {:.2}, {:.2}",
            self.timestamp, self.macd, self.signal, self.histogram
        )
    }
}

/// MACD 라인과 시그널 라인 계산
///
/// 시그널 라인이 존재하는 구간만 반환하므로 결과 길이는
/// `values.len() - (slow + signal - 2)` 입니다.
fn calculate_macd_series(values: &[f64], params: &MACDParams) -> Vec<(f64, f64)> {
    let fast_ema = moving_average::ema_series(values, params.fast_period);
    let slow_ema = moving_average::ema_series(values, params.slow_period);
    if slow_ema.is_empty() {
        return Vec::new();
    }

    // 느린 EMA가 시작되는 지점에 빠른 EMA를 맞춤
    let offset = params.slow_period - params.fast_period;
    let macd_lines: Vec<f64> = slow_ema
        .iter()
        .zip(&fast_ema[offset..])
        .map(|(slow, fast)| fast - slow)
        .collect();

    let signal_lines = moving_average::ema_series(&macd_lines, params.signal_period);
    let skip = macd_lines.len().saturating_sub(signal_lines.len());

    macd_lines[skip..]
        .iter()
        .copied()
        .zip(signal_lines)
        .collect()
}

/// MACD(Moving Average Convergence Divergence) 계산을 위한 빌더
///
/// MACD는 두 개의 이동평균선(빠른 EMA와 느린 EMA)의 차이를 계산하고,
/// 이 값에 대한 시그널 라인(MACD의 EMA)을 제공하는 기술적 지표입니다.
#[derive(Debug)]
pub struct MACDBuilder<C: Candle> {
    params: MACDParams,
    _phantom: PhantomData<C>,
}

impl<C> MACDBuilder<C>
where
    C: Candle,
{
    /// 새 MACD 빌더 생성
    ///
    /// # Arguments
    /// * `params` - 빠른/느린/시그널 기간
    ///
    /// # Panics
    /// * 유효하지 않은 기간이 제공되면 패닉 발생
    pub fn new(params: MACDParams) -> Self {
        if params.fast_period == 0 || params.slow_period == 0 || params.signal_period == 0 {
            panic!("MACD 기간은 0보다 커야 합니다");
        }

        if params.fast_period >= params.slow_period {
            panic!("빠른 기간은 느린 기간보다 작아야 합니다");
        }

        MACDBuilder {
            params,
            _phantom: PhantomData,
        }
    }

    pub fn params(&self) -> &MACDParams {
        &self.params
    }
}

impl<C> TABuilder<MACDPoint, C> for MACDBuilder<C>
where
    C: Candle,
{
    fn name(&self) -> &'static str {
        "MACD"
    }

    fn warm_up(&self) -> usize {
        self.params.slow_period + self.params.signal_period - 2
    }

    /// 첫 시그널 값보다 한 캔들 더 요구하는 보수적 최소 길이
    fn min_len(&self) -> usize {
        self.params.slow_period + self.params.signal_period
    }

    fn calculate(&self, data: &[C]) -> Vec<MACDPoint> {
        let closes: Vec<f64> = data.iter().map(|c| c.close_price()).collect();
        let values = calculate_macd_series(&closes, &self.params);
        align_to_tail(data, values, |timestamp, (macd, signal)| MACDPoint {
            timestamp,
            macd,
            signal,
            histogram: macd - signal,
        })
    }
}
