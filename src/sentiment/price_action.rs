use crate::indicator::utils::clamp;
use crate::model::Candle;

/// 가격 변화를 측정할 최근 캔들 수
pub const PRICE_ACTION_WINDOW: usize = 24;

/// 최근 가격 움직임 점수 (-100 ~ +100)
///
/// 최근 최대 24개 캔들의 첫 종가 대비 마지막 종가 변화율에 10을 곱합니다
/// (±10% 에서 ±100). 캔들이 2개 미만이거나 첫 종가가 0 이하이면 0
pub fn price_action_score<C: Candle>(bars: &[C]) -> f64 {
    if bars.len() < 2 {
        return 0.0;
    }

    let recent = &bars[bars.len().saturating_sub(PRICE_ACTION_WINDOW)..];
    let oldest = recent[0].close_price();
    let newest = recent[recent.len() - 1].close_price();

    if !(oldest > 0.0) {
        return 0.0;
    }

    let change_percent = (newest - oldest) / oldest * 100.0;
    clamp(change_percent * 10.0, -100.0, 100.0)
}
