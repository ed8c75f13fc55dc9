pub mod analysis;
pub mod indicators;
pub mod market;
pub mod strategy;

pub use analysis::{
    AiAction, AiRecommendation, AnalysisResult, RecommendationSource, SentimentLabel,
    SentimentReport, TradeSignal,
};
pub use indicators::{
    AdlTrend, IndicatorSnapshot, TimeframeBias, TrendDirection, VolumeCategory,
};
pub use market::{OhlcCandle, TickerQuote};
pub use strategy::{StrategyProfile, StrategyType};
