//! Intent and sentiment label types
//!
//! Classification over user queries is total: every query maps to exactly
//! one [`IntentLabel`] with a confidence and a coarse [`SentimentLabel`],
//! and no input can make it fail.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of query intents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentLabel {
    /// Current price or quote of a stock
    PriceQuery,
    /// Whether the market is open and its trading hours
    MarketStatus,
    /// Benchmark index levels (Nifty, Sensex)
    IndexQuery,
    /// Explanation of a market term
    TermQuery,
    /// Recent news for a security
    NewsQuery,
    /// News-driven sentiment for a security
    SentimentQuery,
    /// Condensed overview of a security
    SummaryQuery,
    /// Trend/performance analysis of a security
    AnalysisQuery,
    /// Anything that matched no other intent
    GeneralQuery,
    /// Sector-level analysis
    SectorAnalysis,
    /// Industry-level analysis
    IndustryAnalysis,
    /// Overall market activity (indices + sectors)
    MarketActivity,
    /// Full sentiment breakdown with article detail
    SentimentAnalysis,
}

impl IntentLabel {
    /// Wire/display name of the label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PriceQuery => "price_query",
            Self::MarketStatus => "market_status",
            Self::IndexQuery => "index_query",
            Self::TermQuery => "term_query",
            Self::NewsQuery => "news_query",
            Self::SentimentQuery => "sentiment_query",
            Self::SummaryQuery => "summary_query",
            Self::AnalysisQuery => "analysis_query",
            Self::GeneralQuery => "general_query",
            Self::SectorAnalysis => "sector_analysis",
            Self::IndustryAnalysis => "industry_analysis",
            Self::MarketActivity => "market_activity",
            Self::SentimentAnalysis => "sentiment_analysis",
        }
    }

    /// Whether answering this intent requires a resolved symbol
    pub fn needs_symbol(&self) -> bool {
        matches!(
            self,
            Self::PriceQuery
                | Self::NewsQuery
                | Self::AnalysisQuery
                | Self::SummaryQuery
                | Self::SentimentQuery
                | Self::SentimentAnalysis
        )
    }
}

impl fmt::Display for IntentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A label + confidence pair from the intent model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntentPrediction {
    pub label: IntentLabel,
    /// Confidence in [0, 1]
    pub confidence: f64,
}

impl IntentPrediction {
    pub fn new(label: IntentLabel, confidence: f64) -> Self {
        Self {
            label,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// Coarse sentiment categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// Wire/display name of the label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A label + confidence pair from the sentiment model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentPrediction {
    pub label: SentimentLabel,
    /// Confidence in [0, 1]
    pub confidence: f64,
}

impl SentimentPrediction {
    pub fn new(label: SentimentLabel, confidence: f64) -> Self {
        Self {
            label,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// The neutral prediction used whenever scoring an item fails
    pub fn degraded() -> Self {
        Self::new(SentimentLabel::Neutral, 0.5)
    }
}
