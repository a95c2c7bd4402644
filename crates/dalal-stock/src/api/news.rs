//! News search provider client
//!
//! Rate-limited JSON client for a news search endpoint. Pagination mirrors
//! the upstream behavior: pages are fetched until the requested article
//! count is reached, an empty page comes back, or page 10 — fewer articles
//! than requested is a normal outcome, not an error.

use crate::error::{Result, StockError};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Highest page the paginated search will request
const MAX_PAGE: u32 = 10;

/// One news article as returned by the search endpoint
///
/// The publish date is kept as the raw provider string; it may be missing
/// or unparsable and is interpreted downstream with conservative defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

/// Seam for news retrieval
#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Search recent articles for a free-text query, newest first
    async fn search_news(&self, query: &str, max_articles: usize) -> Result<Vec<Article>>;
}

/// HTTP implementation of [`NewsProvider`] with request rate limiting
pub struct NewsClient {
    client: Client,
    base_url: String,
    rate_limiter: SharedRateLimiter,
}

impl NewsClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - Search endpoint base URL
    /// * `rate_limit` - Requests per minute budget
    /// * `timeout` - Per-request timeout
    pub fn new(base_url: impl Into<String>, rate_limit: u32, timeout: Duration) -> Self {
        let quota =
            Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::new(60).unwrap()));
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
            rate_limiter,
        }
    }

    async fn fetch_page(&self, query: &str, page: u32) -> Result<Vec<Article>> {
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", query), ("page", &page.to_string())])
            .send()
            .await
            .map_err(|e| StockError::ApiError(format!("News request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StockError::ApiError(format!(
                "News API error {status}: {body}"
            )));
        }

        let parsed = response
            .json::<SearchResponse>()
            .await
            .map_err(|e| StockError::ApiError(format!("Failed to parse news response: {e}")))?;

        Ok(parsed.articles)
    }
}

#[async_trait]
impl NewsProvider for NewsClient {
    async fn search_news(&self, query: &str, max_articles: usize) -> Result<Vec<Article>> {
        tracing::debug!(query, max_articles, "searching news");

        let mut articles = self.fetch_page(query, 1).await?;

        let mut page = 2;
        while articles.len() < max_articles && page <= MAX_PAGE {
            let page_results = self.fetch_page(query, page).await?;
            if page_results.is_empty() {
                tracing::debug!(page = page - 1, "no more results after page");
                break;
            }
            articles.extend(page_results);
            page += 1;
        }

        articles.truncate(max_articles);
        Ok(articles)
    }
}
