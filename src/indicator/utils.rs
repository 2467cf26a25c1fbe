use crate::model::Candle;

/// ta-lib 결과에서 실제 출력 구간만 남깁니다.
///
/// ta-lib 는 `(값, 시작 인덱스)`를 돌려주며 출력 개수는 `input_len - 시작 인덱스`입니다.
/// 계산이 실패하면 빈 벡터를 반환합니다.
pub(crate) fn ta_lib_output<B, E>(input_len: usize, result: Result<(Vec<f64>, B), E>) -> Vec<f64>
where
    usize: TryFrom<B>,
{
    let (mut values, begin_idx) = match result {
        Ok(output) => output,
        Err(_) => {
            log::warn!("ta-lib 계산 실패: 입력 {}개", input_len);
            return Vec::new();
        }
    };

    match usize::try_from(begin_idx) {
        Ok(begin_idx) if begin_idx <= input_len => {
            values.truncate(input_len - begin_idx);
            values
        }
        _ => {
            log::warn!("ta-lib 시작 인덱스가 올바르지 않음: 입력 {}개", input_len);
            Vec::new()
        }
    }
}

/// 공통 이동평균 계산 함수들
pub mod moving_average {
    use super::ta_lib_output;
    use ta_lib::{exponential_moving_average, simple_moving_average};

    /// 단순이동평균(SMA) 시계열 계산
    ///
    /// 볼린저 밴드 중심선도 이 함수를 쓰므로 같은 기간의 SMA 와 비트 단위로 같습니다.
    ///
    /// # Arguments
    /// * `values` - 가격 데이터 배열
    /// * `period` - 계산 기간
    ///
    /// # Returns
    /// * `Vec<f64>` - `values.len() - period + 1`개의 SMA 값 (데이터 부족 시 빈 벡터)
    pub fn sma_series(values: &[f64], period: usize) -> Vec<f64> {
        if period == 0 || values.len() < period {
            return Vec::new();
        }
        // ta-lib 는 기간 2 이상만 받음
        if period == 1 {
            return values.to_vec();
        }

        ta_lib_output(values.len(), simple_moving_average(values, Some(period)))
    }

    /// 마지막 `period`개 값의 단순 평균
    ///
    /// 데이터가 부족하거나 period가 0이면 `default_value`를 반환합니다.
    pub fn calculate_sma_or_default(values: &[f64], period: usize, default_value: f64) -> f64 {
        if period == 0 || values.len() < period {
            return default_value;
        }

        let start_idx = values.len() - period;
        values[start_idx..].iter().sum::<f64>() / period as f64
    }

    /// 지수이동평균(EMA) 시계열 계산
    ///
    /// alpha = 2/(period+1), 첫 값은 처음 `period`개 값의 SMA로 시드합니다.
    ///
    /// # Returns
    /// * `Vec<f64>` - `values.len() - period + 1`개의 EMA 값 (데이터 부족 시 빈 벡터)
    pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
        if period == 0 || values.len() < period {
            return Vec::new();
        }
        if period == 1 {
            return values.to_vec();
        }

        ta_lib_output(values.len(), exponential_moving_average(values, Some(period)))
    }

    /// Wilder 평활화 한 스텝 (가중치 1/period)
    pub fn wilder_step(previous: f64, current: f64, period: usize) -> f64 {
        (previous * (period as f64 - 1.0) + current) / period as f64
    }
}

/// 모집단 표준편차 계산
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values
        .iter()
        .map(|&x| {
            let diff = x - mean;
            diff * diff
        })
        .sum::<f64>()
        / values.len() as f64;

    variance.sqrt()
}

/// 윈도우 내 최고값
pub fn highest(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// 윈도우 내 최저값
pub fn lowest(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

/// 값을 [min, max] 범위로 제한
///
/// NaN 은 `min` 이 됩니다.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// 실제 범위(True Range) = max(고가-저가, |고가-이전종가|, |저가-이전종가|)
pub fn true_range(high: f64, low: f64, prev_close: f64) -> f64 {
    (high - low)
        .max((high - prev_close).abs())
        .max((low - prev_close).abs())
}

/// 캔들에서 가격 배열을 추출한 묶음
#[derive(Debug, Clone, Default)]
pub struct PriceColumns {
    pub timestamps: Vec<i64>,
    pub highs: Vec<f64>,
    pub lows: Vec<f64>,
    pub closes: Vec<f64>,
    pub volumes: Vec<f64>,
}

impl PriceColumns {
    pub fn from_candles<C: Candle>(data: &[C]) -> PriceColumns {
        let mut columns = PriceColumns {
            timestamps: Vec::with_capacity(data.len()),
            highs: Vec::with_capacity(data.len()),
            lows: Vec::with_capacity(data.len()),
            closes: Vec::with_capacity(data.len()),
            volumes: Vec::with_capacity(data.len()),
        };

        for candle in data {
            columns.timestamps.push(candle.timestamp());
            columns.highs.push(candle.high_price());
            columns.lows.push(candle.low_price());
            columns.closes.push(candle.close_price());
            columns.volumes.push(candle.volume());
        }

        columns
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}

/// 계산된 값들을 입력의 마지막 캔들에 맞춰 timestamp 와 정렬합니다.
///
/// `values`의 마지막 원소가 `data`의 마지막 캔들에 대응하며,
/// 앞쪽 `data.len() - values.len()`개 캔들은 워밍업으로 소비된 것으로 봅니다.
pub fn align_to_tail<C, V, T>(data: &[C], values: Vec<V>, to_point: impl Fn(i64, V) -> T) -> Vec<T>
where
    C: Candle,
{
    debug_assert!(values.len() <= data.len());
    let start_idx = data.len() - values.len();

    values
        .into_iter()
        .zip(&data[start_idx..])
        .map(|(value, candle)| to_point(candle.timestamp(), value))
        .collect()
}
