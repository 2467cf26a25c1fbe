use common_test_utils::*;

use async_trait::async_trait;
use market_vibe::error::{AnalysisError, SourceError};
use market_vibe::indicator::IndicatorEngine;
use market_vibe::indicator::config::IndicatorConfig;
use market_vibe::model::Ohlcv;
use market_vibe::pipeline::{
    Interval, MarketAnalyzer, MarketDataSource, MarketHistory, PriceSnapshot,
};
use market_vibe::sentiment::SentimentLabel;
use std::collections::HashMap;

/// 메모리에 심볼별 이력을 보관하는 테스트 소스
#[derive(Debug, Default)]
struct InMemorySource {
    histories: HashMap<String, Vec<Ohlcv>>,
}

impl InMemorySource {
    fn with(symbol: &str, bars: Vec<Ohlcv>) -> Self {
        let mut source = InMemorySource::default();
        source.histories.insert(symbol.to_owned(), bars);
        source
    }
}

fn snapshot(symbol: &str, bars: &[Ohlcv]) -> PriceSnapshot {
    let current_price = bars.last().map(|b| b.close).unwrap_or_default();
    PriceSnapshot {
        symbol: symbol.to_owned(),
        current_price,
        price_change: 0.0,
        price_change_percent: 0.0,
        high_24h: current_price,
        low_24h: current_price,
        volume_24h: 0.0,
        market_cap: None,
        last_updated: bars.last().map(|b| b.timestamp).unwrap_or_default(),
    }
}

#[async_trait]
impl MarketDataSource for InMemorySource {
    async fn fetch(
        &self,
        symbol: &str,
        _days: u32,
        _interval: Interval,
    ) -> Result<MarketHistory, SourceError> {
        let bars = self
            .histories
            .get(symbol)
            .ok_or_else(|| SourceError::InvalidSymbol(symbol.to_owned()))?;

        Ok(MarketHistory {
            price: snapshot(symbol, bars),
            history: bars.clone(),
        })
    }
}

/// 항상 실패하는 소스
struct UnavailableSource;

#[async_trait]
impl MarketDataSource for UnavailableSource {
    async fn fetch(
        &self,
        _symbol: &str,
        _days: u32,
        _interval: Interval,
    ) -> Result<MarketHistory, SourceError> {
        Err(SourceError::Unavailable("rate limited".to_owned()))
    }
}

#[tokio::test]
async fn test_analyze_rising_market() {
    let bars = create_uptrend_candles(250, 100.0, 1.0);
    let analyzer = MarketAnalyzer::new(InMemorySource::with("BTC", bars));

    let analysis = analyzer.analyze("BTC", 30, Interval::Hourly).await.unwrap();

    assert_eq!(analysis.symbol, "BTC");
    assert_eq!(analysis.bars.len(), 250);
    assert_eq!(analysis.indicators.input_len(), 250);
    let vibe = analysis.vibe.unwrap();
    assert!(matches!(
        vibe.label,
        SentimentLabel::StrongBullish | SentimentLabel::Bullish
    ));
}

#[tokio::test]
async fn test_analyze_normalizes_history() {
    let mut bars = create_sideways_candles(40, 100.0, 4.0);
    bars.reverse();
    let duplicate = bars[5];
    bars.push(duplicate);

    let analyzer = MarketAnalyzer::new(InMemorySource::with("ETH", bars));
    let analysis = analyzer.analyze("ETH", 7, Interval::Daily).await.unwrap();

    assert_eq!(analysis.bars.len(), 40);
    assert!(analysis.bars.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
}

#[tokio::test]
async fn test_short_history_has_no_vibe() {
    let bars = create_uptrend_candles(10, 100.0, 1.0);
    let analyzer = MarketAnalyzer::new(InMemorySource::with("SOL", bars));

    let analysis = analyzer.analyze("SOL", 1, Interval::Minute5).await.unwrap();
    assert!(analysis.vibe.is_none());
    assert!(analysis.indicators.rsi.is_none());
}

#[tokio::test]
async fn test_empty_history_is_error() {
    let analyzer = MarketAnalyzer::new(InMemorySource::with("NEW", Vec::new()));

    let result = analyzer.analyze("NEW", 30, Interval::Daily).await;
    assert!(matches!(result, Err(AnalysisError::EmptyHistory(symbol)) if symbol == "NEW"));
}

#[tokio::test]
async fn test_source_errors_propagate() {
    let analyzer = MarketAnalyzer::new(InMemorySource::default());
    let result = analyzer.analyze("XYZ", 30, Interval::Daily).await;
    assert!(matches!(
        result,
        Err(AnalysisError::Source(SourceError::InvalidSymbol(_)))
    ));

    let analyzer = MarketAnalyzer::new(UnavailableSource);
    let result = analyzer.analyze("BTC", 30, Interval::Daily).await;
    assert!(matches!(
        result,
        Err(AnalysisError::Source(SourceError::Unavailable(_)))
    ));
}

#[tokio::test]
async fn test_analyzer_with_custom_engine() {
    let mut config = IndicatorConfig::default();
    config.sma.periods = vec![10];
    let engine = IndicatorEngine::new(config).unwrap();

    let bars = create_uptrend_candles(60, 100.0, 1.0);
    let analyzer = MarketAnalyzer::with_engine(InMemorySource::with("BTC", bars), engine);
    let analysis = analyzer.analyze("BTC", 30, Interval::Hourly).await.unwrap();

    assert_eq!(analysis.indicators.sma.get_keys(), &[10]);
}

#[tokio::test]
async fn test_dynamic_source() {
    let source: Box<dyn MarketDataSource> =
        Box::new(InMemorySource::with("BTC", create_flat_candles(30, 5.0)));
    let history = source.fetch("BTC", 1, Interval::Daily).await.unwrap();
    assert_eq!(history.history.len(), 30);
    assert_eq!(history.price.current_price, 5.0);
}
