use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};

/// 캔들(OHLCV 봉) 데이터 접근 인터페이스
///
/// 지표 엔진과 심리 점수 계산기는 이 트레이트만 요구하므로
/// 데이터 소스별 봉 타입을 그대로 넘길 수 있습니다.
pub trait Candle: Clone + Debug + Send + Sync {
    /// 봉 시작 시각 (밀리초 epoch)
    fn timestamp(&self) -> i64;

    /// 봉 시작 시각 (UTC)
    ///
    /// 표현 범위를 벗어난 타임스탬프는 epoch 로 취급합니다.
    fn datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp()).unwrap_or_default()
    }

    fn open_price(&self) -> f64;
    fn high_price(&self) -> f64;
    fn low_price(&self) -> f64;
    fn close_price(&self) -> f64;
    fn volume(&self) -> f64;
}

/// 기본 OHLCV 봉
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Ohlcv {
    /// 봉 시작 시각 (밀리초 epoch)
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Ohlcv {
    /// 새 봉 생성
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Ohlcv {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

impl Display for Ohlcv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Ohlcv({}, o={}, h={}, l={}, c={}, v={})",
            self.datetime().format("%Y-%m-%d %H:%M"),
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume
        )
    }
}

impl Candle for Ohlcv {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }
    fn open_price(&self) -> f64 {
        self.open
    }
    fn high_price(&self) -> f64 {
        self.high
    }
    fn low_price(&self) -> f64 {
        self.low
    }
    fn close_price(&self) -> f64 {
        self.close
    }
    fn volume(&self) -> f64 {
        self.volume
    }
}
