//! Configuration for the decision pipeline
//!
//! Behavioral contract points (the 0.9/0.8/0.5 confidence bands, the 80/100
//! fuzzy threshold, the ±1 consensus buckets, the ±2% forecast band) are
//! deliberately NOT configurable; they live as constants next to the code
//! that applies them. Everything here is an operational tunable.

use crate::error::{Result, StockError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the decision pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    /// Exchange suffix appended to equity symbols at the provider boundary
    pub market_suffix: String,

    /// Cache TTL for quote lookups
    pub cache_ttl_quotes: Duration,

    /// Cache TTL for historical price series
    pub cache_ttl_history: Duration,

    /// Cache TTL for news search results
    pub cache_ttl_news: Duration,

    /// Maximum entries per cache before the oldest are evicted
    pub cache_capacity: usize,

    /// Maximum number of news articles fetched per query
    pub max_articles: usize,

    /// How many of the scored articles are echoed back in responses
    pub recent_articles_shown: usize,

    /// News endpoint base URL
    pub news_base_url: String,

    /// News requests allowed per minute
    pub news_rate_limit: u32,

    /// Request timeout for outbound HTTP calls
    pub request_timeout: Duration,

    /// Lookback window (days) for signal computation
    pub signal_lookback_days: i64,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            market_suffix: ".NS".to_string(),
            cache_ttl_quotes: Duration::from_secs(120),
            cache_ttl_history: Duration::from_secs(120),
            cache_ttl_news: Duration::from_secs(120),
            cache_capacity: 256,
            max_articles: 10,
            recent_articles_shown: 3,
            news_base_url: "https://newsdata.io/api/1/news".to_string(),
            news_rate_limit: 60,
            request_timeout: Duration::from_secs(30),
            signal_lookback_days: 365,
        }
    }
}

impl StockConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_articles == 0 {
            return Err(StockError::ConfigError(
                "max_articles must be greater than 0".to_string(),
            ));
        }

        if self.cache_capacity == 0 {
            return Err(StockError::ConfigError(
                "cache_capacity must be greater than 0".to_string(),
            ));
        }

        if self.signal_lookback_days < 60 {
            return Err(StockError::ConfigError(
                "signal_lookback_days must cover at least 60 days for indicators".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    market_suffix: Option<String>,
    cache_ttl_quotes: Option<Duration>,
    cache_ttl_history: Option<Duration>,
    cache_ttl_news: Option<Duration>,
    cache_capacity: Option<usize>,
    max_articles: Option<usize>,
    recent_articles_shown: Option<usize>,
    news_base_url: Option<String>,
    news_rate_limit: Option<u32>,
    request_timeout: Option<Duration>,
    signal_lookback_days: Option<i64>,
}

impl StockConfigBuilder {
    /// Set the exchange suffix for equity symbols
    pub fn market_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.market_suffix = Some(suffix.into());
        self
    }

    /// Set cache TTL for quote lookups
    pub fn cache_ttl_quotes(mut self, duration: Duration) -> Self {
        self.cache_ttl_quotes = Some(duration);
        self
    }

    /// Set cache TTL for historical series
    pub fn cache_ttl_history(mut self, duration: Duration) -> Self {
        self.cache_ttl_history = Some(duration);
        self
    }

    /// Set cache TTL for news results
    pub fn cache_ttl_news(mut self, duration: Duration) -> Self {
        self.cache_ttl_news = Some(duration);
        self
    }

    /// Set per-cache capacity bound
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = Some(capacity);
        self
    }

    /// Set the maximum number of articles fetched per query
    pub fn max_articles(mut self, count: usize) -> Self {
        self.max_articles = Some(count);
        self
    }

    /// Set how many articles are echoed in responses
    pub fn recent_articles_shown(mut self, count: usize) -> Self {
        self.recent_articles_shown = Some(count);
        self
    }

    /// Set the news endpoint base URL
    pub fn news_base_url(mut self, url: impl Into<String>) -> Self {
        self.news_base_url = Some(url.into());
        self
    }

    /// Set the news requests-per-minute budget
    pub fn news_rate_limit(mut self, per_minute: u32) -> Self {
        self.news_rate_limit = Some(per_minute);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the signal computation lookback window in days
    pub fn signal_lookback_days(mut self, days: i64) -> Self {
        self.signal_lookback_days = Some(days);
        self
    }

    /// Override the news base URL from `DALAL_NEWS_URL` when present
    pub fn with_env_news_url(mut self) -> Self {
        if let Ok(url) = std::env::var("DALAL_NEWS_URL") {
            self.news_base_url = Some(url);
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockConfig> {
        let defaults = StockConfig::default();

        let config = StockConfig {
            market_suffix: self.market_suffix.unwrap_or(defaults.market_suffix),
            cache_ttl_quotes: self.cache_ttl_quotes.unwrap_or(defaults.cache_ttl_quotes),
            cache_ttl_history: self.cache_ttl_history.unwrap_or(defaults.cache_ttl_history),
            cache_ttl_news: self.cache_ttl_news.unwrap_or(defaults.cache_ttl_news),
            cache_capacity: self.cache_capacity.unwrap_or(defaults.cache_capacity),
            max_articles: self.max_articles.unwrap_or(defaults.max_articles),
            recent_articles_shown: self
                .recent_articles_shown
                .unwrap_or(defaults.recent_articles_shown),
            news_base_url: self.news_base_url.unwrap_or(defaults.news_base_url),
            news_rate_limit: self.news_rate_limit.unwrap_or(defaults.news_rate_limit),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            signal_lookback_days: self
                .signal_lookback_days
                .unwrap_or(defaults.signal_lookback_days),
        };

        config.validate()?;
        Ok(config)
    }
}
