//! Offline stand-ins for the pretrained models
//!
//! The real classifiers are external collaborators behind the
//! `dalal-core` seams. These implementations keep the pipeline fully
//! functional without them: the intent stand-in reports full confidence so
//! the keyword-refinement band does the work, and the sentiment stand-in
//! scores by lexicon alone.

use crate::sentiment::refine_with_lexicon;
use async_trait::async_trait;
use dalal_core::{
    IntentLabel, IntentModel, IntentPrediction, Result, SentimentModel, SentimentPrediction,
};

/// Intent stand-in: always `general_query` at full confidence
///
/// Full confidence puts every query on the keyword-refinement path, so the
/// refinement keywords and pattern tables carry classification end to end.
pub struct HeuristicIntentModel;

#[async_trait]
impl IntentModel for HeuristicIntentModel {
    async fn classify(&self, _text: &str) -> Result<IntentPrediction> {
        Ok(IntentPrediction::new(IntentLabel::GeneralQuery, 1.0))
    }
}

/// Sentiment stand-in driven purely by the positive/negative word lists
pub struct LexiconSentimentModel;

#[async_trait]
impl SentimentModel for LexiconSentimentModel {
    async fn analyze(&self, text: &str) -> Result<SentimentPrediction> {
        Ok(refine_with_lexicon(text, SentimentPrediction::degraded()))
    }
}
