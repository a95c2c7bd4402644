//! Intent classification
//!
//! Two-tier classification over the cleaned query: the pretrained model's
//! label is kept only when it is very confident (and even then refined by
//! keyword checks); otherwise an ordered pattern table decides at a fixed
//! 0.8 confidence, with `general_query`/0.5 as the floor. The function is
//! total — any model failure degrades to the floor instead of surfacing.

use dalal_core::{
    IntentLabel, IntentModel, SentimentLabel, SentimentModel,
};
use std::sync::Arc;

/// Model confidence above which its label is trusted (then keyword-refined)
const REFINEMENT_BAND: f64 = 0.9;

/// Confidence assigned to pattern-table matches
const PATTERN_CONFIDENCE: f64 = 0.8;

/// Confidence of the general fallback
const FALLBACK_CONFIDENCE: f64 = 0.5;

/// Market term explanations, matched against the cleaned query
pub const MARKET_TERMS: &[(&str, &str)] = &[
    (
        "nifty",
        "Nifty is the benchmark stock market index of the National Stock Exchange (NSE) of India. It represents the weighted average of 50 of the largest Indian companies listed on the NSE.",
    ),
    (
        "sensex",
        "Sensex is the benchmark stock market index of the Bombay Stock Exchange (BSE) of India. It represents the weighted average of 30 of the largest and most actively traded stocks on the BSE.",
    ),
    (
        "bse",
        "BSE (Bombay Stock Exchange) is the oldest stock exchange in Asia, located in Mumbai, India. It is one of the largest stock exchanges in the world by market capitalization.",
    ),
    (
        "nse",
        "NSE (National Stock Exchange) is the leading stock exchange in India, located in Mumbai. It is the world's largest derivatives exchange by trading volume.",
    ),
    (
        "ipo",
        "IPO (Initial Public Offering) is the process by which a private company becomes publicly traded by offering its shares to the public for the first time.",
    ),
    (
        "market cap",
        "Market Capitalization (Market Cap) is the total market value of a company's outstanding shares. It is calculated by multiplying the current stock price by the total number of outstanding shares.",
    ),
    (
        "dividend",
        "A dividend is a payment made by a corporation to its shareholders, usually in the form of cash or additional shares. It represents a portion of the company's profits distributed to shareholders.",
    ),
    (
        "bull market",
        "A bull market is a period of rising stock prices, typically lasting for months or years. It is characterized by investor optimism and confidence.",
    ),
    (
        "bear market",
        "A bear market is a period of falling stock prices, typically lasting for months or years. It is characterized by investor pessimism and declining confidence.",
    ),
    (
        "mutual fund",
        "A mutual fund is an investment vehicle that pools money from many investors to purchase a diversified portfolio of stocks, bonds, or other securities.",
    ),
    (
        "etf",
        "ETF (Exchange-Traded Fund) is a type of investment fund that trades on stock exchanges, similar to stocks. ETFs typically track an index, commodity, bonds, or a basket of assets.",
    ),
    (
        "technical analysis",
        "Technical analysis is a method of evaluating securities by analyzing statistics generated by market activity, such as past prices and volume.",
    ),
    (
        "fundamental analysis",
        "Fundamental analysis is a method of evaluating a security by analyzing financial and economic factors, such as company earnings, revenue, and industry conditions.",
    ),
    (
        "pe ratio",
        "P/E Ratio (Price-to-Earnings Ratio) is a valuation ratio calculated by dividing the current stock price by its earnings per share. It helps investors determine if a stock is overvalued or undervalued.",
    ),
    (
        "volume",
        "Volume refers to the number of shares or contracts traded in a security or market during a given period. It is an important indicator of market activity and liquidity.",
    ),
];

/// Trigger phrases per intent, tried in order; first hit wins
const INTENT_PATTERNS: &[(IntentLabel, &[&str])] = &[
    (
        IntentLabel::PriceQuery,
        &[
            "price",
            "current price",
            "stock price",
            "share price",
            "value",
            "how much",
            "what is the price",
            "current value",
        ],
    ),
    (
        IntentLabel::MarketStatus,
        &[
            "market status",
            "market open",
            "trading hours",
            "market timing",
            "is market open",
            "when does market open",
        ],
    ),
    (
        IntentLabel::IndexQuery,
        &[
            "nifty",
            "sensex",
            "index",
            "market index",
            "benchmark",
            "nifty 50",
            "bse sensex",
        ],
    ),
    (
        IntentLabel::TermQuery,
        &[
            "what is", "explain", "define", "meaning of", "tell me about", "ipo", "fii", "dii",
            "circuit", "demat", "sebi",
        ],
    ),
    (
        IntentLabel::AnalysisQuery,
        &[
            "analysis",
            "outlook",
            "trend",
            "performance",
            "how is",
            "what about",
            "tell me about",
        ],
    ),
];

/// The classifier's full output: label, confidence, query sentiment
pub type Classified = (IntentLabel, f64, SentimentLabel);

/// Two-tier intent classifier over the pretrained model seams
pub struct IntentClassifier {
    intent_model: Arc<dyn IntentModel>,
    sentiment_model: Arc<dyn SentimentModel>,
}

impl IntentClassifier {
    /// Create a classifier over the given models
    pub fn new(intent_model: Arc<dyn IntentModel>, sentiment_model: Arc<dyn SentimentModel>) -> Self {
        Self {
            intent_model,
            sentiment_model,
        }
    }

    /// Classify a cleaned query; total over arbitrary input
    pub async fn classify(&self, query: &str) -> Classified {
        match self.try_classify(query).await {
            Ok(classified) => classified,
            Err(e) => {
                tracing::warn!(error = %e, "intent classification degraded to fallback");
                (
                    IntentLabel::GeneralQuery,
                    FALLBACK_CONFIDENCE,
                    SentimentLabel::Neutral,
                )
            }
        }
    }

    async fn try_classify(&self, query: &str) -> dalal_core::Result<Classified> {
        let prediction = self.intent_model.classify(query).await?;
        let sentiment = self.sentiment_model.analyze(query).await?.label;

        let q = query.to_lowercase();

        if prediction.confidence > REFINEMENT_BAND {
            let label = Self::refine(&q, prediction.label);
            return Ok((label, prediction.confidence, sentiment));
        }

        for (label, patterns) in INTENT_PATTERNS {
            if matches_any(&q, patterns) {
                return Ok((*label, PATTERN_CONFIDENCE, sentiment));
            }
        }

        Ok((IntentLabel::GeneralQuery, FALLBACK_CONFIDENCE, sentiment))
    }

    /// Keyword refinement applied inside the high-confidence band
    fn refine(q: &str, base: IntentLabel) -> IntentLabel {
        if q.contains("price") || q.contains("current price") {
            IntentLabel::PriceQuery
        } else if MARKET_TERMS.iter().any(|(term, _)| q.contains(term)) {
            IntentLabel::TermQuery
        } else if q.contains("news") || q.contains("latest") {
            IntentLabel::NewsQuery
        } else if q.contains("sentiment") || q.contains("outlook") {
            IntentLabel::SentimentQuery
        } else if q.contains("summary") || q.contains("summarize") {
            IntentLabel::SummaryQuery
        } else {
            base
        }
    }
}

/// First market term occurring in the query, with its explanation
pub fn lookup_term(query: &str) -> Option<(&'static str, &'static str)> {
    MARKET_TERMS
        .iter()
        .find(|(term, _)| query.contains(term))
        .copied()
}

/// Check if the query contains any of the phrases
fn matches_any(query: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| query.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dalal_core::{IntentPrediction, SentimentPrediction};

    /// Intent model stub with a fixed answer or failure
    struct StubIntent {
        label: IntentLabel,
        confidence: f64,
        fail: bool,
    }

    #[async_trait]
    impl IntentModel for StubIntent {
        async fn classify(&self, _text: &str) -> dalal_core::Result<IntentPrediction> {
            if self.fail {
                return Err(dalal_core::Error::ModelFailed("stub".to_string()));
            }
            Ok(IntentPrediction::new(self.label, self.confidence))
        }
    }

    struct StubSentiment;

    #[async_trait]
    impl SentimentModel for StubSentiment {
        async fn analyze(&self, _text: &str) -> dalal_core::Result<SentimentPrediction> {
            Ok(SentimentPrediction::new(SentimentLabel::Positive, 0.9))
        }
    }

    fn classifier(label: IntentLabel, confidence: f64, fail: bool) -> IntentClassifier {
        IntentClassifier::new(
            Arc::new(StubIntent {
                label,
                confidence,
                fail,
            }),
            Arc::new(StubSentiment),
        )
    }

    #[tokio::test]
    async fn test_high_confidence_price_keyword_refinement() {
        let c = classifier(IntentLabel::GeneralQuery, 0.95, false);
        let (label, confidence, _) = c.classify("what is the price of reliance").await;
        assert_eq!(label, IntentLabel::PriceQuery);
        assert!(confidence > 0.9);
    }

    #[tokio::test]
    async fn test_high_confidence_news_refinement() {
        let c = classifier(IntentLabel::GeneralQuery, 0.95, false);
        let (label, _, _) = c.classify("latest on tata motors").await;
        assert_eq!(label, IntentLabel::NewsQuery);
    }

    #[tokio::test]
    async fn test_high_confidence_keeps_base_without_keywords() {
        let c = classifier(IntentLabel::AnalysisQuery, 0.95, false);
        let (label, _, _) = c.classify("thoughts on hdfc").await;
        assert_eq!(label, IntentLabel::AnalysisQuery);
    }

    #[tokio::test]
    async fn test_low_confidence_pattern_fallback() {
        let c = classifier(IntentLabel::GeneralQuery, 0.4, false);
        let (label, confidence, _) = c.classify("is market open today").await;
        assert_eq!(label, IntentLabel::MarketStatus);
        assert_eq!(confidence, 0.8);
    }

    #[tokio::test]
    async fn test_pattern_order_price_beats_analysis() {
        // "value" is a price pattern and comes before the analysis entry
        let c = classifier(IntentLabel::GeneralQuery, 0.4, false);
        let (label, _, _) = c.classify("value and performance of itc").await;
        assert_eq!(label, IntentLabel::PriceQuery);
    }

    #[tokio::test]
    async fn test_no_pattern_gives_general_fallback() {
        let c = classifier(IntentLabel::GeneralQuery, 0.4, false);
        let (label, confidence, _) = c.classify("hello there").await;
        assert_eq!(label, IntentLabel::GeneralQuery);
        assert_eq!(confidence, 0.5);
    }

    #[tokio::test]
    async fn test_model_failure_degrades_to_floor() {
        let c = classifier(IntentLabel::GeneralQuery, 0.99, true);
        let (label, confidence, sentiment) = c.classify("anything").await;
        assert_eq!(label, IntentLabel::GeneralQuery);
        assert_eq!(confidence, 0.5);
        assert_eq!(sentiment, SentimentLabel::Neutral);
    }

    #[tokio::test]
    async fn test_total_over_empty_input() {
        let c = classifier(IntentLabel::GeneralQuery, 0.4, false);
        let (label, _, _) = c.classify("").await;
        assert_eq!(label, IntentLabel::GeneralQuery);
    }

    #[test]
    fn test_lookup_term_finds_first_match() {
        let hit = lookup_term("explain market cap to me");
        assert_eq!(hit.map(|(term, _)| term), Some("market cap"));
        assert!(lookup_term("nothing relevant here").is_none());
    }
}
