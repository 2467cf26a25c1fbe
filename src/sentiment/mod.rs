// 지표 결과로부터 시장 심리(vibe) 점수를 계산합니다.
//
// 모멘텀(RSI, MACD), 추세 강도(이동평균, 볼린저 밴드), 거래량 모멘텀,
// 최근 가격 움직임을 고정 가중치로 결합합니다.

pub mod momentum;
pub mod price_action;
pub mod trend_strength;
pub mod vibe;
pub mod volume_momentum;

pub use momentum::MomentumScore;
pub use trend_strength::TrendStrengthScore;
pub use vibe::{
    MIN_SCORING_BARS, SentimentLabel, VibeBreakdown, VibeScore, can_score, compute_vibe_score,
    score, score_breakdown,
};
pub use volume_momentum::VolumeMomentumScore;
