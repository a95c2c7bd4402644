//! Market data provider client
//!
//! Wraps the Yahoo Finance API behind the [`MarketProvider`] seam. Fields
//! the provider does not supply stay `None` — a missing ratio is never
//! rendered as zero.

use crate::error::{Result, StockError};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

/// One OHLCV bar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub adjclose: f64,
}

/// Snapshot of a security: the latest bar plus whatever valuation data the
/// provider happened to return
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteSummary {
    /// Display symbol, market suffix already stripped
    pub symbol: String,
    pub current_price: f64,
    pub day_high: f64,
    pub day_low: f64,
    pub volume: u64,
    pub previous_close: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub market_cap: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
}

/// Seam for price/fundamentals retrieval
///
/// Implementations must return `DataUnavailable` (not empty zeros) when a
/// symbol is unknown, and `Ok(None)` from [`search_symbol`] when nothing
/// matches — callers distinguish "no data" from "zero".
#[async_trait]
pub trait MarketProvider: Send + Sync {
    /// Latest bar for a provider-form symbol
    async fn latest_quote(&self, symbol: &str) -> Result<Quote>;

    /// Historical bars over a named range ("1d", "1mo", "1y", ...)
    async fn history(&self, symbol: &str, range: &str) -> Result<Vec<Quote>>;

    /// Look up a symbol from free text; `Ok(None)` when nothing matches
    async fn search_symbol(&self, text: &str) -> Result<Option<String>>;
}

/// Yahoo Finance implementation of [`MarketProvider`]
pub struct YahooMarketClient {}

impl YahooMarketClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Self {
        Self {}
    }

    fn connector() -> Result<yahoo::YahooConnector> {
        yahoo::YahooConnector::new().map_err(|e| StockError::MarketDataError(e.to_string()))
    }

    fn range_start(range: &str, end: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let start = match range {
            "1d" => end - chrono::Duration::days(1),
            "5d" => end - chrono::Duration::days(5),
            "1mo" => end - chrono::Duration::days(30),
            "3mo" => end - chrono::Duration::days(90),
            "6mo" => end - chrono::Duration::days(180),
            "1y" => end - chrono::Duration::days(365),
            "2y" => end - chrono::Duration::days(730),
            "5y" => end - chrono::Duration::days(1825),
            "ytd" => {
                let year = end.year();
                chrono::NaiveDate::from_ymd_opt(year, 1, 1)
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|d| d.and_utc())
                    .ok_or_else(|| StockError::MarketDataError("bad ytd start".to_string()))?
            }
            _ => {
                return Err(StockError::MarketDataError(format!(
                    "Invalid range: {range}"
                )));
            }
        };
        Ok(start)
    }

    fn convert(symbol: &str, q: &yahoo::Quote) -> Quote {
        Quote {
            symbol: symbol.to_string(),
            timestamp: DateTime::from_timestamp(q.timestamp as i64, 0).unwrap_or_else(Utc::now),
            open: q.open,
            high: q.high,
            low: q.low,
            close: q.close,
            volume: q.volume,
            adjclose: q.adjclose,
        }
    }
}

impl Default for YahooMarketClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketProvider for YahooMarketClient {
    async fn latest_quote(&self, symbol: &str) -> Result<Quote> {
        let provider = Self::connector()?;

        let response = provider
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| StockError::MarketDataError(e.to_string()))?;

        let quote = response
            .last_quote()
            .map_err(|e| StockError::MarketDataError(e.to_string()))?;

        Ok(Self::convert(symbol, &quote))
    }

    async fn history(&self, symbol: &str, range: &str) -> Result<Vec<Quote>> {
        let provider = Self::connector()?;

        let end = Utc::now();
        let start = Self::range_start(range, end)?;

        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| StockError::MarketDataError(format!("Invalid start timestamp: {e}")))?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| StockError::MarketDataError(format!("Invalid end timestamp: {e}")))?;

        let response = provider
            .get_quote_history(symbol, start_odt, end_odt)
            .await
            .map_err(|e| StockError::MarketDataError(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| StockError::MarketDataError(e.to_string()))?;

        Ok(quotes.iter().map(|q| Self::convert(symbol, q)).collect())
    }

    async fn search_symbol(&self, text: &str) -> Result<Option<String>> {
        let provider = Self::connector()?;

        let result = provider
            .search_ticker(text)
            .await
            .map_err(|e| StockError::MarketDataError(e.to_string()))?;

        Ok(result.quotes.first().map(|item| item.symbol.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_start_mapping() {
        let end = Utc::now();
        let start = YahooMarketClient::range_start("1mo", end).unwrap();
        assert_eq!((end - start).num_days(), 30);

        let start = YahooMarketClient::range_start("1y", end).unwrap();
        assert_eq!((end - start).num_days(), 365);
    }

    #[test]
    fn test_range_start_rejects_unknown() {
        assert!(YahooMarketClient::range_start("4mo", Utc::now()).is_err());
    }

    #[test]
    fn test_ytd_starts_on_jan_first() {
        let end = Utc::now();
        let start = YahooMarketClient::range_start("ytd", end).unwrap();
        assert_eq!(start.month(), 1);
        assert_eq!(start.day(), 1);
        assert_eq!(start.year(), end.year());
    }
}
