//! News sentiment analysis
//!
//! Turns a batch of fetched articles into one time-decayed sentiment
//! summary: each article is labeled by the sentiment model (with a lexical
//! tie-break), weighted by recency, and the batch is averaged into counts,
//! percentages and a qualitative tone. A single article failing to score
//! degrades that article to neutral; it never aborts the batch.

pub mod aggregate;
pub mod score;

pub use aggregate::{
    ImpactLevel, MarketConsensus, MarketPulse, NewsTone, SentimentSummary, SignalStrength,
    aggregate, market_pulse,
};
pub use score::{
    MAX_TIME_WEIGHT, MIN_TIME_WEIGHT, base_score, parse_publish_date, refine_with_lexicon,
    time_weight, time_weight_at, total_score,
};

use crate::api::Article;
use chrono::{DateTime, Utc};
use dalal_core::{SentimentLabel, SentimentModel, SentimentPrediction};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// An article after scoring; immutable once built
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredArticle {
    pub title: String,
    pub description: String,
    pub link: String,
    /// Raw provider date string, kept for display and sorting
    pub date: String,
    pub sentiment: SentimentLabel,
    pub confidence: f64,
    pub base_score: f64,
    pub time_weight: f64,
    pub total_score: f64,
}

/// Scores article batches against the sentiment model seam
pub struct SentimentAnalyzer {
    model: Arc<dyn SentimentModel>,
}

impl SentimentAnalyzer {
    /// Create an analyzer over the given model
    pub fn new(model: Arc<dyn SentimentModel>) -> Self {
        Self { model }
    }

    /// Score one article at the given evaluation instant
    pub async fn score_article(&self, article: &Article, now: DateTime<Utc>) -> ScoredArticle {
        let text = article_text(article);

        let prediction = match self.model.analyze(&text).await {
            Ok(prediction) => refine_with_lexicon(&text, prediction),
            Err(e) => {
                tracing::warn!(error = %e, title = %article.title, "article sentiment degraded to neutral");
                SentimentPrediction::degraded()
            }
        };

        let weight = time_weight_at(&article.date, now);
        let base = base_score(prediction.label);

        ScoredArticle {
            title: article.title.clone(),
            description: article.description.clone(),
            link: article.link.clone(),
            date: article.date.clone(),
            sentiment: prediction.label,
            confidence: prediction.confidence,
            base_score: base,
            time_weight: weight,
            total_score: total_score(base, weight),
        }
    }

    /// Score a whole batch, newest first in the output
    ///
    /// The model is invoked once per article, sequentially — batches are
    /// small (≤ max_articles) and the model may be remote.
    pub async fn analyze_batch(&self, articles: &[Article]) -> Vec<ScoredArticle> {
        let now = Utc::now();
        let mut scored = Vec::with_capacity(articles.len());
        for article in articles {
            scored.push(self.score_article(article, now).await);
        }
        scored.sort_by(|a, b| b.date.cmp(&a.date));
        scored
    }
}

fn article_text(article: &Article) -> String {
    let combined = format!("{}. {}", article.title, article.description);
    combined.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct StubModel {
        label: SentimentLabel,
        fail: bool,
    }

    #[async_trait]
    impl SentimentModel for StubModel {
        async fn analyze(&self, _text: &str) -> dalal_core::Result<SentimentPrediction> {
            if self.fail {
                return Err(dalal_core::Error::ModelFailed("stub".to_string()));
            }
            Ok(SentimentPrediction::new(self.label, 0.9))
        }
    }

    fn article(title: &str, date: &str) -> Article {
        Article {
            title: title.to_string(),
            description: String::new(),
            link: String::new(),
            date: date.to_string(),
        }
    }

    #[tokio::test]
    async fn test_fresh_positive_article_scores_high() {
        let analyzer = SentimentAnalyzer::new(Arc::new(StubModel {
            label: SentimentLabel::Positive,
            fail: false,
        }));
        let now = Utc::now();
        let date = now.format("%a, %d %b %Y %H:%M:%S %z").to_string();

        let scored = analyzer.score_article(&article("Results beat estimates", &date), now).await;
        assert_eq!(scored.sentiment, SentimentLabel::Positive);
        assert_eq!(scored.time_weight, MAX_TIME_WEIGHT);
        assert!((scored.total_score - 3.72).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_model_failure_degrades_single_article() {
        let analyzer = SentimentAnalyzer::new(Arc::new(StubModel {
            label: SentimentLabel::Positive,
            fail: true,
        }));
        let scored = analyzer
            .score_article(&article("Anything", "not a date"), Utc::now())
            .await;
        assert_eq!(scored.sentiment, SentimentLabel::Neutral);
        assert_eq!(scored.confidence, 0.5);
        assert_eq!(scored.total_score, 0.0);
    }

    #[tokio::test]
    async fn test_batch_survives_bad_dates() {
        let analyzer = SentimentAnalyzer::new(Arc::new(StubModel {
            label: SentimentLabel::Negative,
            fail: false,
        }));
        let batch = vec![
            article("Shares plunge on weak demand", "garbage date"),
            article("Margins drop again", ""),
        ];
        let scored = analyzer.analyze_batch(&batch).await;
        assert_eq!(scored.len(), 2);
        for s in &scored {
            assert_eq!(s.time_weight, MIN_TIME_WEIGHT);
            assert!((s.total_score - (-3.03)).abs() < 1e-9);
        }
    }

    #[tokio::test]
    async fn test_lexicon_override_applies_in_scoring() {
        // Model says negative but the text is lexically positive
        let analyzer = SentimentAnalyzer::new(Arc::new(StubModel {
            label: SentimentLabel::Negative,
            fail: false,
        }));
        let scored = analyzer
            .score_article(
                &article("Profit surge lifts stock higher", "no date"),
                Utc::now(),
            )
            .await;
        assert_eq!(scored.sentiment, SentimentLabel::Positive);
        assert!(scored.confidence >= 0.9);
    }
}
