use crate::candle_store::dedup_timestamps;
use crate::indicator::IndicatorResults;
use crate::indicator::utils::{clamp, population_std_dev};
use crate::model::Candle;
use crate::sentiment::momentum::{MomentumScore, momentum_score};
use crate::sentiment::price_action::price_action_score;
use crate::sentiment::trend_strength::{TrendStrengthScore, trend_strength};
use crate::sentiment::volume_momentum::{VolumeMomentumScore, volume_momentum};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// 점수 계산에 필요한 최소 캔들 수
pub const MIN_SCORING_BARS: usize = 20;

const MOMENTUM_WEIGHT: f64 = 0.35;
const TREND_WEIGHT: f64 = 0.30;
const VOLUME_WEIGHT: f64 = 0.20;
const PRICE_ACTION_WEIGHT: f64 = 0.15;

/// 시장 심리 라벨
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    #[serde(rename = "Strong Bearish")]
    StrongBearish,
    Bearish,
    Neutral,
    Bullish,
    #[serde(rename = "Strong Bullish")]
    StrongBullish,
}

impl SentimentLabel {
    /// 반올림된 종합 점수로 라벨 결정
    ///
    /// 75 이상 Strong Bullish, 60 이상 Bullish, 40 이상 Neutral,
    /// 25 이상 Bearish, 그 외 Strong Bearish
    pub fn from_score(overall: u8) -> SentimentLabel {
        match overall {
            75.. => SentimentLabel::StrongBullish,
            60..=74 => SentimentLabel::Bullish,
            40..=59 => SentimentLabel::Neutral,
            25..=39 => SentimentLabel::Bearish,
            _ => SentimentLabel::StrongBearish,
        }
    }

    pub fn is_bullish(&self) -> bool {
        matches!(
            self,
            SentimentLabel::Bullish | SentimentLabel::StrongBullish
        )
    }

    pub fn is_bearish(&self) -> bool {
        matches!(
            self,
            SentimentLabel::Bearish | SentimentLabel::StrongBearish
        )
    }
}

impl Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SentimentLabel::StrongBearish => "Strong Bearish",
            SentimentLabel::Bearish => "Bearish",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Bullish => "Bullish",
            SentimentLabel::StrongBullish => "Strong Bullish",
        };
        write!(f, "{}", label)
    }
}

/// 종합 심리 점수
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VibeScore {
    /// 0 ~ 100 종합 점수
    pub overall: u8,
    /// -100 ~ +100
    pub momentum: i32,
    /// 0 ~ 100
    pub trend_strength: u8,
    /// -100 ~ +100
    pub volume_signal: i32,
    /// 0 ~ 100, 하위 점수들이 일치할수록 높음
    pub confidence: u8,
    pub label: SentimentLabel,
    /// 마지막 캔들의 timestamp
    pub timestamp: i64,
}

impl Display for VibeScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Vibe({} {}: momentum={}, trend={}, volume={}, confidence={})",
            self.overall,
            self.label,
            self.momentum,
            self.trend_strength,
            self.volume_signal,
            self.confidence
        )
    }
}

/// 종합 점수를 구성하는 하위 점수들
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VibeBreakdown {
    pub momentum: MomentumScore,
    pub trend: TrendStrengthScore,
    pub volume: VolumeMomentumScore,
    /// 최근 가격 움직임 (-100 ~ +100)
    pub price_action: f64,
}

/// -100 ~ +100 점수를 0 ~ 100 으로 변환
fn normalize(score: f64) -> f64 {
    (score + 100.0) / 2.0
}

/// 0.5 는 양의 방향으로 올리는 반올림
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

impl VibeBreakdown {
    /// 가중 결합한 종합 점수 (반올림 전)
    pub fn overall(&self) -> f64 {
        normalize(self.momentum.combined) * MOMENTUM_WEIGHT
            + self.trend.combined * TREND_WEIGHT
            + normalize(self.volume.score) * VOLUME_WEIGHT
            + normalize(self.price_action) * PRICE_ACTION_WEIGHT
    }

    /// 하위 점수 간 일치도
    ///
    /// 정규화된 모멘텀/추세/거래량 점수의 모집단 표준편차 σ 에 대해
    /// `100 - 2σ` 를 0 ~ 100 으로 제한합니다.
    pub fn confidence(&self) -> f64 {
        let std_dev = population_std_dev(&[
            normalize(self.momentum.combined),
            self.trend.combined,
            normalize(self.volume.score),
        ]);
        clamp(100.0 - std_dev * 2.0, 0.0, 100.0)
    }

    /// 반올림하여 종합 점수 생성
    ///
    /// NaN 하위 점수는 정수 변환에서 0 이 됩니다.
    pub fn to_vibe_score(&self, timestamp: i64) -> VibeScore {
        let raw_overall = self.overall();
        if !raw_overall.is_finite() {
            debug!("유한하지 않은 하위 점수: {:?}", self);
        }

        let overall = clamp(round_half_up(raw_overall), 0.0, 100.0) as u8;

        VibeScore {
            overall,
            momentum: round_half_up(self.momentum.combined) as i32,
            trend_strength: clamp(round_half_up(self.trend.combined), 0.0, 100.0) as u8,
            volume_signal: round_half_up(self.volume.score) as i32,
            confidence: round_half_up(self.confidence()) as u8,
            label: SentimentLabel::from_score(overall),
            timestamp,
        }
    }
}

fn meets_preconditions<C: Candle>(
    indicators: &IndicatorResults,
    bars: &[C],
    current_price: f64,
) -> bool {
    if bars.len() < MIN_SCORING_BARS {
        debug!("점수 계산 불가: 캔들 부족 ({} < {})", bars.len(), MIN_SCORING_BARS);
        return false;
    }

    let has_core = indicators.rsi.as_ref().is_some_and(|s| !s.is_empty())
        || indicators.macd.as_ref().is_some_and(|s| !s.is_empty())
        || indicators.sma.iter().any(|(_, s)| !s.is_empty());
    if !has_core {
        debug!("점수 계산 불가: RSI/MACD/SMA 없음");
        return false;
    }

    if current_price == 0.0 || current_price.is_nan() {
        debug!("점수 계산 불가: 현재가 {}", current_price);
        return false;
    }

    true
}

fn breakdown_of<C: Candle>(
    indicators: &IndicatorResults,
    bars: &[C],
    current_price: f64,
) -> VibeBreakdown {
    VibeBreakdown {
        momentum: momentum_score(indicators.latest_rsi(), indicators.latest_macd()),
        trend: trend_strength(current_price, &indicators.sma, indicators.latest_bb()),
        volume: volume_momentum(bars),
        price_action: price_action_score(bars),
    }
}

fn vibe_of<C: Candle>(indicators: &IndicatorResults, bars: &[C], current_price: f64) -> VibeScore {
    let timestamp = bars.last().map(|c| c.timestamp()).unwrap_or_default();
    breakdown_of(indicators, bars, current_price).to_vibe_score(timestamp)
}

/// 점수 계산 전제 조건 확인
///
/// 중복 timestamp 를 제거한 캔들이 20개 이상이고, RSI/MACD/SMA 중 하나 이상이
/// 있으며, 현재가가 0 또는 NaN 이 아니어야 합니다.
/// 캔들과 지표의 NaN 은 걸러내지 않고 그대로 점수 계산에 전달됩니다.
pub fn can_score<C: Candle>(indicators: &IndicatorResults, bars: &[C], current_price: f64) -> bool {
    meets_preconditions(indicators, &dedup_timestamps(bars), current_price)
}

/// 하위 점수 계산
///
/// 지표 엔진과 같이 같은 timestamp 의 캔들은 첫 번째만 사용합니다.
pub fn score_breakdown<C: Candle>(
    indicators: &IndicatorResults,
    bars: &[C],
    current_price: f64,
) -> VibeBreakdown {
    breakdown_of(indicators, &dedup_timestamps(bars), current_price)
}

/// 전제 조건 확인 없이 종합 점수 계산
///
/// 캔들이 없으면 timestamp 는 0 입니다.
pub fn compute_vibe_score<C: Candle>(
    indicators: &IndicatorResults,
    bars: &[C],
    current_price: f64,
) -> VibeScore {
    vibe_of(indicators, &dedup_timestamps(bars), current_price)
}

/// 지표와 캔들로 종합 심리 점수 계산
///
/// # Arguments
/// * `indicators` - 같은 캔들로 계산한 지표 결과
/// * `bars` - 시간 순 캔들 (같은 timestamp 는 첫 번째만 사용)
/// * `current_price` - 현재가
///
/// # Returns
/// * `Option<VibeScore>` - 전제 조건을 만족하지 못하면 None
pub fn score<C: Candle>(
    indicators: &IndicatorResults,
    bars: &[C],
    current_price: f64,
) -> Option<VibeScore> {
    let bars = dedup_timestamps(bars);
    if !meets_preconditions(indicators, &bars, current_price) {
        return None;
    }

    let vibe = vibe_of(indicators, &bars, current_price);
    debug!("심리 점수 계산 완료: {}", vibe);
    Some(vibe)
}
