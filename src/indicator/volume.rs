use crate::indicator::TABuilder;
use crate::indicator::utils::{align_to_tail, moving_average};
use crate::model::Candle;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::marker::PhantomData;

/// 거래량 지표 시계열 포인트
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumePoint {
    pub timestamp: i64,
    /// 현재 거래량
    pub volume: f64,
    /// 평균 거래량 (SMA)
    pub volume_ma: f64,
    /// 거래량 비율 (현재/평균, 평균이 0이면 1)
    pub relative_volume: f64,
}

impl Display for VolumePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: current={:.2}, avg={:.2}, ratio={:.2}",
            self.timestamp, self.volume, self.volume_ma, self.relative_volume
        )
    }
}

/// 현재 거래량과 평균 거래량의 비율
///
/// 평균이 0이면 1을 반환합니다.
pub fn relative_volume(volume: f64, average: f64) -> f64 {
    if average == 0.0 {
        1.0
    } else {
        volume / average
    }
}

/// 볼륨 기반 지표 빌더
///
/// 특정 기간의 거래량 이동평균과 현재 거래량의 비율을 계산합니다.
#[derive(Debug)]
pub struct VolumeBuilder<C: Candle> {
    /// 계산 기간
    period: usize,
    _phantom: PhantomData<C>,
}

impl<C> VolumeBuilder<C>
where
    C: Candle,
{
    /// 새 볼륨 빌더 생성
    ///
    /// # Arguments
    /// * `period` - 볼륨 계산 기간
    ///
    /// # Returns
    /// * `VolumeBuilder` - 새 빌더 인스턴스
    pub fn new(period: usize) -> Self {
        if period == 0 {
            panic!("볼륨 계산 기간은 0보다 커야 합니다");
        }

        VolumeBuilder {
            period,
            _phantom: PhantomData,
        }
    }
}

impl<C> TABuilder<VolumePoint, C> for VolumeBuilder<C>
where
    C: Candle,
{
    fn name(&self) -> &'static str {
        "Volume"
    }

    fn warm_up(&self) -> usize {
        self.period - 1
    }

    fn calculate(&self, data: &[C]) -> Vec<VolumePoint> {
        let volumes: Vec<f64> = data.iter().map(|c| c.volume()).collect();
        let averages = moving_average::sma_series(&volumes, self.period);
        let current = &volumes[self.period - 1..];

        let values: Vec<(f64, f64)> = current.iter().copied().zip(averages).collect();
        align_to_tail(data, values, |timestamp, (volume, volume_ma)| VolumePoint {
            timestamp,
            volume,
            volume_ma,
            relative_volume: relative_volume(volume, volume_ma),
        })
    }
}
