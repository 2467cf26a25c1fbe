pub mod candle_store;
pub mod error;
pub mod indicator;
pub mod model;
pub mod pipeline;
pub mod sentiment;

/// 설정 로더
pub mod config_loader;

pub use indicator::{IndicatorEngine, IndicatorResults, compute_all};
pub use model::{Candle, Ohlcv};
pub use sentiment::{SentimentLabel, VibeScore, score};
