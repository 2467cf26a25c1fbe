use crate::indicator::MASeries;
use crate::indicator::bband::BollingerBandsPoint;
use crate::indicator::utils::clamp;
use serde::Serialize;

/// 가격 위치를 비교할 SMA 기간
pub const TREND_SMA_PERIODS: [usize; 3] = [20, 50, 200];

/// 이동평균 하나당 가감 점수
const MA_STEP: f64 = 20.0;
const MA_WEIGHT: f64 = 0.6;
const BB_WEIGHT: f64 = 0.4;

/// 추세 강도 점수 (0 ~ 100)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendStrengthScore {
    pub ma_position_score: f64,
    pub bb_position_score: f64,
    pub combined: f64,
}

/// 이동평균 대비 가격 위치 점수
///
/// 50에서 시작하여 SMA 20/50/200 각각에 대해 가격이 위면 +20, 아래면 -20.
/// 같거나 해당 기간이 없으면 변화가 없습니다.
pub fn ma_position_score(current_price: f64, sma: &MASeries) -> f64 {
    let mut score = 50.0;

    for period in TREND_SMA_PERIODS {
        let Some(latest) = sma.get(&period).and_then(|points| points.last()) else {
            continue;
        };

        if current_price > latest.value {
            score += MA_STEP;
        } else if current_price < latest.value {
            score -= MA_STEP;
        }
    }

    clamp(score, 0.0, 100.0)
}

/// 볼린저 밴드 내 가격 위치 점수 (하단 0, 상단 100)
///
/// 밴드가 없거나 폭이 0이면 50
pub fn bb_position_score(current_price: f64, bb: Option<&BollingerBandsPoint>) -> f64 {
    let Some(position) = bb.and_then(|band| band.percent_b(current_price)) else {
        return 50.0;
    };

    clamp(position * 100.0, 0.0, 100.0)
}

/// 이동평균 위치와 볼린저 밴드 위치를 가중 결합
pub fn trend_strength(
    current_price: f64,
    sma: &MASeries,
    bb: Option<&BollingerBandsPoint>,
) -> TrendStrengthScore {
    let ma_position_score = ma_position_score(current_price, sma);
    let bb_position_score = bb_position_score(current_price, bb);

    TrendStrengthScore {
        ma_position_score,
        bb_position_score,
        combined: ma_position_score * MA_WEIGHT + bb_position_score * BB_WEIGHT,
    }
}
