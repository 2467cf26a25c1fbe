// 시세 소스에서 가격 이력을 받아 지표와 심리 점수를 계산하는 파이프라인

use crate::candle_store::CandleStore;
use crate::error::{AnalysisError, SourceError};
use crate::indicator::{IndicatorEngine, IndicatorResults};
use crate::model::Ohlcv;
use crate::sentiment::{VibeScore, score};
use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// 현재 시세 요약
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub symbol: String,
    pub current_price: f64,
    /// 24시간 가격 변화
    pub price_change: f64,
    /// 24시간 가격 변화율 (%)
    pub price_change_percent: f64,
    pub high_24h: f64,
    pub low_24h: f64,
    pub volume_24h: f64,
    pub market_cap: Option<f64>,
    /// 마지막 갱신 시각 (밀리초 epoch)
    pub last_updated: i64,
}

/// 캔들 간격
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    Minute1,
    #[serde(rename = "5m")]
    Minute5,
    #[serde(rename = "15m")]
    Minute15,
    #[serde(rename = "1h")]
    Hourly,
    #[serde(rename = "4h")]
    Hour4,
    #[serde(rename = "1d")]
    Daily,
    #[serde(rename = "1w")]
    Weekly,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Minute1 => "1m",
            Interval::Minute5 => "5m",
            Interval::Minute15 => "15m",
            Interval::Hourly => "1h",
            Interval::Hour4 => "4h",
            Interval::Daily => "1d",
            Interval::Weekly => "1w",
        }
    }

    /// 간격 길이 (밀리초)
    pub fn duration_millis(&self) -> i64 {
        const MINUTE: i64 = 60_000;
        match self {
            Interval::Minute1 => MINUTE,
            Interval::Minute5 => 5 * MINUTE,
            Interval::Minute15 => 15 * MINUTE,
            Interval::Hourly => 60 * MINUTE,
            Interval::Hour4 => 240 * MINUTE,
            Interval::Daily => 1_440 * MINUTE,
            Interval::Weekly => 10_080 * MINUTE,
        }
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Interval {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1m" => Ok(Interval::Minute1),
            "5m" => Ok(Interval::Minute5),
            "15m" => Ok(Interval::Minute15),
            "1h" => Ok(Interval::Hourly),
            "4h" => Ok(Interval::Hour4),
            "1d" => Ok(Interval::Daily),
            "1w" | "7d" => Ok(Interval::Weekly),
            other => Err(SourceError::Malformed(format!("알 수 없는 간격: {}", other))),
        }
    }
}

/// 소스가 반환하는 시세와 가격 이력
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketHistory {
    pub price: PriceSnapshot,
    pub history: Vec<Ohlcv>,
}

/// 시세 데이터 소스 인터페이스
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// 심볼의 현재 시세와 최근 `days`일 간의 가격 이력 조회
    async fn fetch(
        &self,
        symbol: &str,
        days: u32,
        interval: Interval,
    ) -> Result<MarketHistory, SourceError>;
}

/// 분석 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketAnalysis {
    pub symbol: String,
    pub price: PriceSnapshot,
    /// 정렬 및 중복 제거된 캔들
    pub bars: Vec<Ohlcv>,
    #[serde(skip)]
    pub indicators: IndicatorResults,
    /// 전제 조건을 만족하지 못하면 None
    pub vibe: Option<VibeScore>,
}

/// 시세 소스와 지표 엔진을 묶은 분석기
#[derive(Debug)]
pub struct MarketAnalyzer<S: MarketDataSource> {
    source: S,
    engine: IndicatorEngine,
}

impl<S: MarketDataSource> MarketAnalyzer<S> {
    /// 기본 지표 설정으로 분석기 생성
    pub fn new(source: S) -> MarketAnalyzer<S> {
        MarketAnalyzer {
            source,
            engine: IndicatorEngine::default(),
        }
    }

    /// 지정한 지표 엔진으로 분석기 생성
    pub fn with_engine(source: S, engine: IndicatorEngine) -> MarketAnalyzer<S> {
        MarketAnalyzer { source, engine }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn engine(&self) -> &IndicatorEngine {
        &self.engine
    }

    /// 심볼 분석
    ///
    /// # Arguments
    /// * `symbol` - 조회할 심볼
    /// * `days` - 조회 기간 (일)
    /// * `interval` - 캔들 간격
    ///
    /// # Returns
    /// * `Result<MarketAnalysis, AnalysisError>` - 소스 오류 또는 빈 이력이면 오류
    pub async fn analyze(
        &self,
        symbol: &str,
        days: u32,
        interval: Interval,
    ) -> Result<MarketAnalysis, AnalysisError> {
        debug!("시세 조회 시작: {} ({}일, {})", symbol, days, interval);
        let MarketHistory { price, history } = self.source.fetch(symbol, days, interval).await?;

        if history.is_empty() {
            warn!("가격 이력이 비어 있음: {}", symbol);
            return Err(AnalysisError::EmptyHistory(symbol.to_owned()));
        }

        let store = CandleStore::unbounded(history);
        let indicators = self.engine.compute_from_storage(&store);
        let vibe = score(&indicators, store.items(), price.current_price);

        match &vibe {
            Some(vibe) => info!("{} 분석 완료: {}", symbol, vibe),
            None => info!("{} 분석 완료: 점수 없음 (캔들 {}개)", symbol, store.len()),
        }

        Ok(MarketAnalysis {
            symbol: symbol.to_owned(),
            price,
            bars: store.into_items(),
            indicators,
            vibe,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_round_trip() {
        for interval in [
            Interval::Minute1,
            Interval::Minute5,
            Interval::Minute15,
            Interval::Hourly,
            Interval::Hour4,
            Interval::Daily,
            Interval::Weekly,
        ] {
            assert_eq!(interval.as_str().parse::<Interval>().unwrap(), interval);
        }
        assert_eq!("7d".parse::<Interval>().unwrap(), Interval::Weekly);
        assert!(matches!(
            "2y".parse::<Interval>(),
            Err(SourceError::Malformed(_))
        ));
    }

    #[test]
    fn test_interval_serde_uses_short_form() {
        assert_eq!(serde_json::to_string(&Interval::Hourly).unwrap(), "\"1h\"");
        assert_eq!(Interval::Daily.duration_millis(), 86_400_000);
    }
}
