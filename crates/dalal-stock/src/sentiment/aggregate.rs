//! Batch aggregation of scored articles

use super::ScoredArticle;
use dalal_core::SentimentLabel;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Average-score magnitude beyond which the batch reads bullish/bearish
///
/// The ±1 pair is a contract point, not a tunable.
const TONE_THRESHOLD: f64 = 1.0;

/// Qualitative reading of the averaged, time-decayed score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NewsTone {
    Bullish,
    Neutral,
    Bearish,
}

impl fmt::Display for NewsTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bullish => "Bullish",
            Self::Neutral => "Neutral",
            Self::Bearish => "Bearish",
        };
        f.write_str(name)
    }
}

/// Aggregate over one batch of scored articles
///
/// Recomputed on every request; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub total: usize,
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    pub positive_pct: f64,
    pub neutral_pct: f64,
    pub negative_pct: f64,
    /// Mean of the articles' total scores; 0 for an empty batch
    pub average_score: f64,
    pub tone: NewsTone,
}

/// Count, percentage and average the batch
pub fn aggregate(articles: &[ScoredArticle]) -> SentimentSummary {
    let total = articles.len();
    let count = |label: SentimentLabel| {
        articles
            .iter()
            .filter(|article| article.sentiment == label)
            .count()
    };

    let positive = count(SentimentLabel::Positive);
    let neutral = count(SentimentLabel::Neutral);
    let negative = count(SentimentLabel::Negative);

    let pct = |n: usize| {
        if total > 0 {
            (n as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    };

    let average_score = if total > 0 {
        articles.iter().map(|article| article.total_score).sum::<f64>() / total as f64
    } else {
        0.0
    };

    let tone = if average_score > TONE_THRESHOLD {
        NewsTone::Bullish
    } else if average_score < -TONE_THRESHOLD {
        NewsTone::Bearish
    } else {
        NewsTone::Neutral
    };

    SentimentSummary {
        total,
        positive,
        neutral,
        negative,
        positive_pct: pct(positive),
        neutral_pct: pct(neutral),
        negative_pct: pct(negative),
        average_score,
        tone,
    }
}

/// Five-step market consensus label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketConsensus {
    StronglyBullish,
    ModeratelyBullish,
    Neutral,
    ModeratelyBearish,
    StronglyBearish,
}

impl fmt::Display for MarketConsensus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StronglyBullish => "Strongly Bullish",
            Self::ModeratelyBullish => "Moderately Bullish",
            Self::Neutral => "Neutral",
            Self::ModeratelyBearish => "Moderately Bearish",
            Self::StronglyBearish => "Strongly Bearish",
        };
        f.write_str(name)
    }
}

/// Signal strength on the same 0-100 scale as the consensus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalStrength {
    StrongBuy,
    Buy,
    Neutral,
    Sell,
    StrongSell,
}

impl fmt::Display for SignalStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StrongBuy => "Strong Buy",
            Self::Buy => "Buy",
            Self::Neutral => "Neutral",
            Self::Sell => "Sell",
            Self::StrongSell => "Strong Sell",
        };
        f.write_str(name)
    }
}

/// Coverage-volume buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpactLevel {
    High,
    Medium,
    Low,
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        };
        f.write_str(name)
    }
}

/// Percentage-weighted market consensus over a sentiment summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketPulse {
    /// `positive_pct + 0.5 × neutral_pct`, on a 0-100 scale
    pub score: f64,
    pub consensus: MarketConsensus,
    pub signal_strength: SignalStrength,
    pub volume_impact: ImpactLevel,
    pub price_impact: SentimentLabel,
}

/// Bucket a summary into the five-step consensus
pub fn market_pulse(summary: &SentimentSummary) -> MarketPulse {
    let score = summary.positive_pct + 0.5 * summary.neutral_pct;

    let consensus = if score >= 70.0 {
        MarketConsensus::StronglyBullish
    } else if score >= 60.0 {
        MarketConsensus::ModeratelyBullish
    } else if score >= 40.0 {
        MarketConsensus::Neutral
    } else if score >= 30.0 {
        MarketConsensus::ModeratelyBearish
    } else {
        MarketConsensus::StronglyBearish
    };

    let signal_strength = if score >= 70.0 {
        SignalStrength::StrongBuy
    } else if score >= 60.0 {
        SignalStrength::Buy
    } else if score >= 40.0 {
        SignalStrength::Neutral
    } else if score >= 30.0 {
        SignalStrength::Sell
    } else {
        SignalStrength::StrongSell
    };

    let volume_impact = if summary.total > 10 {
        ImpactLevel::High
    } else if summary.total > 5 {
        ImpactLevel::Medium
    } else {
        ImpactLevel::Low
    };

    let price_impact = if score >= 60.0 {
        SentimentLabel::Positive
    } else if score <= 40.0 {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    };

    MarketPulse {
        score,
        consensus,
        signal_strength,
        volume_impact,
        price_impact,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(sentiment: SentimentLabel, total_score: f64) -> ScoredArticle {
        ScoredArticle {
            title: "t".to_string(),
            description: String::new(),
            link: String::new(),
            date: String::new(),
            sentiment,
            confidence: 0.9,
            base_score: 0.0,
            time_weight: 0.01,
            total_score,
        }
    }

    #[test]
    fn test_empty_batch_is_neutral_zero() {
        let summary = aggregate(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.average_score, 0.0);
        assert_eq!(summary.tone, NewsTone::Neutral);
        assert_eq!(summary.positive_pct, 0.0);
    }

    #[test]
    fn test_counts_and_percentages() {
        let batch = vec![
            article(SentimentLabel::Positive, 3.5),
            article(SentimentLabel::Positive, 3.1),
            article(SentimentLabel::Neutral, 0.0),
            article(SentimentLabel::Negative, -3.2),
        ];
        let summary = aggregate(&batch);
        assert_eq!(summary.positive, 2);
        assert_eq!(summary.neutral, 1);
        assert_eq!(summary.negative, 1);
        assert!((summary.positive_pct - 50.0).abs() < 1e-9);
        assert!((summary.neutral_pct - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_tone_buckets_at_plus_minus_one() {
        let bullish = aggregate(&[article(SentimentLabel::Positive, 3.0)]);
        assert_eq!(bullish.tone, NewsTone::Bullish);

        let bearish = aggregate(&[article(SentimentLabel::Negative, -3.0)]);
        assert_eq!(bearish.tone, NewsTone::Bearish);

        // Exactly 1.0 is NOT bullish: the bucket is strict
        let edge = aggregate(&[article(SentimentLabel::Positive, 1.0)]);
        assert_eq!(edge.tone, NewsTone::Neutral);
    }

    #[test]
    fn test_market_pulse_buckets() {
        let all_positive = aggregate(&[
            article(SentimentLabel::Positive, 3.0),
            article(SentimentLabel::Positive, 3.0),
        ]);
        let pulse = market_pulse(&all_positive);
        assert_eq!(pulse.consensus, MarketConsensus::StronglyBullish);
        assert_eq!(pulse.signal_strength, SignalStrength::StrongBuy);
        assert_eq!(pulse.price_impact, SentimentLabel::Positive);
        assert_eq!(pulse.volume_impact, ImpactLevel::Low);

        let all_negative = aggregate(&[
            article(SentimentLabel::Negative, -3.0),
            article(SentimentLabel::Negative, -3.0),
        ]);
        let pulse = market_pulse(&all_negative);
        assert_eq!(pulse.consensus, MarketConsensus::StronglyBearish);
        assert_eq!(pulse.price_impact, SentimentLabel::Negative);
    }

    #[test]
    fn test_even_split_is_neutral_pulse() {
        let split = aggregate(&[
            article(SentimentLabel::Positive, 3.0),
            article(SentimentLabel::Negative, -3.0),
        ]);
        let pulse = market_pulse(&split);
        // 50 + 0.5 * 0 = 50
        assert_eq!(pulse.consensus, MarketConsensus::Neutral);
        assert_eq!(pulse.signal_strength, SignalStrength::Neutral);
        assert_eq!(pulse.price_impact, SentimentLabel::Neutral);
    }
}
