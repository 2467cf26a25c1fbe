use crate::indicator::macd::MACDPoint;
use crate::indicator::rsi::RSIPoint;
use crate::indicator::utils::clamp;
use serde::Serialize;

/// RSI 점수 가중치
const RSI_WEIGHT: f64 = 0.6;
/// MACD 점수 가중치
const MACD_WEIGHT: f64 = 0.4;
/// MACD 히스토그램 증폭 배율
const HISTOGRAM_MULTIPLIER: f64 = 20.0;

/// 모멘텀 점수 (-100 ~ +100)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MomentumScore {
    pub rsi_score: f64,
    pub macd_score: f64,
    pub combined: f64,
}

/// RSI 기반 모멘텀 점수
///
/// RSI 50을 0으로 두고 0-100 범위를 -100 ~ +100으로 옮깁니다.
/// RSI 가 없으면 0
pub fn rsi_momentum(rsi: Option<&RSIPoint>) -> f64 {
    match rsi {
        Some(rsi) => (rsi.value - 50.0) * 2.0,
        None => 0.0,
    }
}

/// MACD 히스토그램 기반 모멘텀 점수
///
/// MACD 가 없으면 0
pub fn macd_momentum(macd: Option<&MACDPoint>) -> f64 {
    match macd {
        Some(macd) => clamp(macd.histogram * HISTOGRAM_MULTIPLIER, -100.0, 100.0),
        None => 0.0,
    }
}

/// RSI 와 MACD 모멘텀을 가중 결합
pub fn momentum_score(rsi: Option<&RSIPoint>, macd: Option<&MACDPoint>) -> MomentumScore {
    let rsi_score = rsi_momentum(rsi);
    let macd_score = macd_momentum(macd);

    MomentumScore {
        rsi_score,
        macd_score,
        combined: rsi_score * RSI_WEIGHT + macd_score * MACD_WEIGHT,
    }
}
