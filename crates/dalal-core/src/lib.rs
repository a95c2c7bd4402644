//! Core abstractions for dalal-rs
//!
//! This crate defines the types shared by every part of the market
//! assistant: the [`Query`] model with its cleaned form, the closed
//! [`IntentLabel`] enumeration, sentiment labels and predictions, and the
//! seams behind which the pretrained models live ([`IntentModel`],
//! [`SentimentModel`], [`Forecaster`]). The models themselves are external
//! collaborators; everything in this crate treats them as black boxes.

pub mod error;
pub mod intent;
pub mod model;
pub mod query;

pub use error::{Error, Result};
pub use intent::{IntentLabel, IntentPrediction, SentimentLabel, SentimentPrediction};
pub use model::{Forecaster, IntentModel, SentimentModel};
pub use query::Query;
