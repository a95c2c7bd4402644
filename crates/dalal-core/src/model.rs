//! Seams for the pretrained models
//!
//! The intent classifier, the sentiment classifier and the price forecaster
//! are external collaborators: text in, `(label, confidence)` out, or a
//! price history in, one predicted value out. Implementations may call a
//! hosted inference endpoint or run a local heuristic; the pipeline only
//! sees these traits and recovers from any error they return.

use crate::error::Result;
use crate::intent::{IntentPrediction, SentimentPrediction};
use async_trait::async_trait;

/// Maps free text to an intent label with a confidence
///
/// May be slow (remote inference); callers should not invoke it in tight
/// loops over large batches.
#[async_trait]
pub trait IntentModel: Send + Sync {
    async fn classify(&self, text: &str) -> Result<IntentPrediction>;
}

/// Maps free text to a sentiment label with a confidence
#[async_trait]
pub trait SentimentModel: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<SentimentPrediction>;
}

/// Predicts the next closing price from a window of recent closes
///
/// Fitting on every call is an accepted latency cost, not an error. An
/// implementation that cannot produce a value (e.g. too little history)
/// returns `Error::InsufficientInput` and the caller drops the forecast
/// signal rather than failing the request.
#[async_trait]
pub trait Forecaster: Send + Sync {
    async fn predict_next(&self, closes: &[f64]) -> Result<f64>;
}
