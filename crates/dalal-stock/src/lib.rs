//! Decision pipeline for Indian-market stock queries
//!
//! This crate answers free-text questions about NSE/BSE equities and
//! indices by:
//!
//! - resolving company references to canonical symbols (seeded alias
//!   table, fuzzy matching, dynamic provider lookup)
//! - classifying query intent (model band + pattern-table fallback)
//! - aggregating news sentiment with time-decayed scoring
//! - fusing technical indicators and an optional forecast into a single
//!   Buy/Sell/Hold verdict by majority vote
//! - caching expensive provider calls behind a TTL+capacity bound
//!
//! The pretrained models themselves live behind the `dalal-core` seams;
//! offline stand-ins in [`models`] keep the pipeline runnable without them.
//!
//! # Example
//!
//! ```rust,ignore
//! use dalal_stock::StockBot;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let bot = StockBot::with_defaults()?;
//!     let answer = bot.process_query("what is the price of Reliance").await;
//!     println!("{answer}");
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod intent;
pub mod market;
pub mod models;
pub mod render;
pub mod resolver;
pub mod sentiment;
pub mod signals;
mod tz;

// Re-export main types for convenience
pub use cache::{CacheKey, CacheManager, ResultCache};
pub use config::StockConfig;
pub use engine::{StockBot, StockBotBuilder};
pub use error::{Result, StockError};
pub use forecast::LinearTrendForecaster;
pub use intent::IntentClassifier;
pub use market::{MarketDesk, is_market_open};
pub use models::{HeuristicIntentModel, LexiconSentimentModel};
pub use resolver::{Resolution, ResolvedSymbol, SymbolResolver};
pub use sentiment::{SentimentAnalyzer, SentimentSummary};
pub use signals::{SignalFusionEngine, TradingSignals, Verdict};
