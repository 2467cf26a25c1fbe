use crate::indicator::utils::{clamp, moving_average};
use crate::indicator::volume::relative_volume;
use crate::model::Candle;
use serde::Serialize;

/// 상대 거래량 기준 기간
const RELATIVE_PERIOD: usize = 20;
/// 거래량 추세의 단기 기간
const SHORT_PERIOD: usize = 10;
/// 거래량 추세의 장기 기간
const LONG_PERIOD: usize = 40;
/// 상대 거래량 배율 상한
const MAX_MULTIPLIER: f64 = 2.0;

/// 거래량 모멘텀 점수
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolumeMomentumScore {
    /// 현재 거래량 / 20기간 평균
    pub relative_volume: f64,
    /// 단기 대비 장기 평균 거래량 추세 (-100 ~ +100)
    pub volume_trend: f64,
    /// -100 ~ +100
    pub score: f64,
}

impl Default for VolumeMomentumScore {
    fn default() -> Self {
        VolumeMomentumScore {
            relative_volume: 1.0,
            volume_trend: 0.0,
            score: 0.0,
        }
    }
}

/// 10기간 평균 거래량과 40기간 평균 거래량의 차이 (-100 ~ +100)
///
/// 40개 미만이거나 장기 평균이 0이면 0
fn volume_trend(volumes: &[f64]) -> f64 {
    if volumes.len() < LONG_PERIOD {
        return 0.0;
    }

    let recent_avg = moving_average::calculate_sma_or_default(volumes, SHORT_PERIOD, 0.0);
    let longer_avg = moving_average::calculate_sma_or_default(volumes, LONG_PERIOD, 0.0);
    if longer_avg == 0.0 {
        return 0.0;
    }

    let trend_percent = (recent_avg - longer_avg) / longer_avg * 100.0;
    clamp(trend_percent * 2.0, -100.0, 100.0)
}

/// 거래량 모멘텀 계산
///
/// 거래량 추세를 상대 거래량(최대 2배)으로 증폭합니다.
/// 캔들이 20개 미만이면 중립값을 반환합니다.
pub fn volume_momentum<C: Candle>(bars: &[C]) -> VolumeMomentumScore {
    if bars.len() < RELATIVE_PERIOD {
        return VolumeMomentumScore::default();
    }

    let volumes: Vec<f64> = bars.iter().map(|c| c.volume()).collect();
    let current = volumes[volumes.len() - 1];
    let average = moving_average::calculate_sma_or_default(&volumes, RELATIVE_PERIOD, 0.0);

    let relative_volume = relative_volume(current, average);
    let volume_trend = volume_trend(&volumes);
    let multiplier = relative_volume.min(MAX_MULTIPLIER) / MAX_MULTIPLIER;

    VolumeMomentumScore {
        relative_volume,
        volume_trend,
        score: clamp(volume_trend * multiplier, -100.0, 100.0),
    }
}
