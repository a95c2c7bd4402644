//! Market-wide data operations
//!
//! The [`MarketDesk`] wraps the market data provider with the result
//! caches and answers the coarser questions: index levels, sector
//! performance, market hours, per-stock snapshots and the fixed
//! portfolio/watchlist views. Empty provider results surface as
//! `DataUnavailable`, never as zeroed-out numbers.

use crate::api::{MarketProvider, Quote, QuoteSummary};
use crate::cache::{CacheKey, CacheManager};
use crate::config::StockConfig;
use crate::error::{Result, StockError};
use crate::resolver::ResolvedSymbol;
use crate::tz;
use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Named benchmark indices
pub const INDEX_SYMBOLS: &[(&str, &str)] = &[("NIFTY", "^NSEI"), ("SENSEX", "^BSESN")];

/// Sector indices shown in market activity
pub const SECTOR_INDICES: &[(&str, &str)] = &[
    ("IT", "^CNXIT"),
    ("Bank", "^NSEBANK"),
    ("Pharma", "^CNXPHARMA"),
    ("Auto", "^CNXAUTO"),
    ("FMCG", "^CNXFMCG"),
];

/// Default holdings used by the portfolio and watchlist views
pub const DEFAULT_HOLDINGS: &[&str] = &["RELIANCE", "TCS", "INFY", "HDFCBANK"];

/// Day-change magnitude (percent) that raises a watchlist alert
const ALERT_THRESHOLD_PCT: f64 = 5.0;

/// Whether the Indian market is open at the given instant
///
/// Trading hours: 09:15-15:30 IST, Monday through Friday.
pub fn is_market_open_at(now: DateTime<Utc>) -> bool {
    let ist = now.with_timezone(&tz::ist());
    if ist.weekday().number_from_monday() > 5 {
        return false;
    }
    let minutes = ist.hour() * 60 + ist.minute();
    (9 * 60 + 15..=15 * 60 + 30).contains(&minutes)
}

/// Whether the Indian market is open right now
pub fn is_market_open() -> bool {
    is_market_open_at(Utc::now())
}

/// Intraday snapshot of a benchmark index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSnapshot {
    /// Friendly name ("NIFTY", "SENSEX")
    pub name: String,
    pub current: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub volume: u64,
    pub change: f64,
    pub change_pct: f64,
    pub last_updated: DateTime<Utc>,
}

/// One sector index's day performance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorPerformance {
    pub name: String,
    pub current: f64,
    pub change_pct: f64,
}

/// Overall market view: both benchmarks plus sector performance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketActivity {
    pub nifty: IndexSnapshot,
    pub sensex: IndexSnapshot,
    pub market_open: bool,
    pub sectors: Vec<SectorPerformance>,
    pub last_updated: DateTime<Utc>,
}

/// Trend view of a single stock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAnalysis {
    pub symbol: String,
    pub current_price: f64,
    pub price_change: f64,
    pub price_change_pct: f64,
    pub ma_20: Option<f64>,
    pub ma_50: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub volume: u64,
}

/// One row of a portfolio or watchlist view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingEntry {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub change_pct: f64,
    pub volume: u64,
}

/// Portfolio totals over the default holdings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub entries: Vec<HoldingEntry>,
    pub total_value: f64,
    pub total_change: f64,
    pub total_change_pct: f64,
}

/// Watchlist rows plus large-move alerts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistReport {
    pub entries: Vec<HoldingEntry>,
    pub alerts: Vec<String>,
}

/// Provider + caches, bundled behind the data-gathering operations
pub struct MarketDesk {
    provider: Arc<dyn MarketProvider>,
    caches: Arc<CacheManager>,
    config: StockConfig,
}

impl MarketDesk {
    /// Create a desk over the given provider and caches
    pub fn new(
        provider: Arc<dyn MarketProvider>,
        caches: Arc<CacheManager>,
        config: StockConfig,
    ) -> Self {
        Self {
            provider,
            caches,
            config,
        }
    }

    /// History for a provider-form symbol, through the cache
    async fn cached_history(&self, provider_symbol: &str, range: &str) -> Result<Vec<Quote>> {
        let key = CacheKey::new("history", (provider_symbol, range));
        let value = self
            .caches
            .history
            .get_or_fetch(key, || async {
                let quotes = self.provider.history(provider_symbol, range).await?;
                serde_json::to_value(quotes).map_err(StockError::from)
            })
            .await?;
        serde_json::from_value(value).map_err(StockError::from)
    }

    /// Latest quote for a provider-form symbol, through the cache
    async fn cached_quote(&self, provider_symbol: &str) -> Result<Quote> {
        let key = CacheKey::new("quote", provider_symbol);
        let value = self
            .caches
            .quotes
            .get_or_fetch(key, || async {
                let quote = self.provider.latest_quote(provider_symbol).await?;
                serde_json::to_value(quote).map_err(StockError::from)
            })
            .await?;
        serde_json::from_value(value).map_err(StockError::from)
    }

    /// Year of closing prices for signal computation
    pub async fn closes(&self, symbol: &ResolvedSymbol) -> Result<Vec<f64>> {
        let provider_symbol = symbol.provider_form(&self.config.market_suffix);
        let history = self.cached_history(&provider_symbol, "1y").await?;
        Ok(history.iter().map(|quote| quote.close).collect())
    }

    /// Snapshot of one security with whatever valuation data exists
    pub async fn quote_summary(&self, symbol: &ResolvedSymbol) -> Result<QuoteSummary> {
        let provider_symbol = symbol.provider_form(&self.config.market_suffix);
        let quote = self.cached_quote(&provider_symbol).await?;

        // 52-week range and previous close come from history; their absence
        // must stay None rather than pretend to be zero.
        let year = self.cached_history(&provider_symbol, "1y").await.ok();
        let (high_52w, low_52w, previous_close) = match &year {
            Some(history) if !history.is_empty() => {
                let high = history.iter().map(|q| q.high).fold(f64::MIN, f64::max);
                let low = history.iter().map(|q| q.low).fold(f64::MAX, f64::min);
                let previous = (history.len() >= 2).then(|| history[history.len() - 2].close);
                (Some(high), Some(low), previous)
            }
            _ => (None, None, None),
        };

        Ok(QuoteSummary {
            symbol: symbol.display().to_string(),
            current_price: quote.close,
            day_high: quote.high,
            day_low: quote.low,
            volume: quote.volume,
            previous_close,
            pe_ratio: None,
            market_cap: None,
            fifty_two_week_high: high_52w,
            fifty_two_week_low: low_52w,
        })
    }

    /// Trend analysis over a year of history
    pub async fn stock_analysis(&self, symbol: &ResolvedSymbol) -> Result<StockAnalysis> {
        let provider_symbol = symbol.provider_form(&self.config.market_suffix);
        let history = self.cached_history(&provider_symbol, "1y").await?;

        let Some(last) = history.last() else {
            return Err(StockError::DataUnavailable {
                symbol: symbol.display().to_string(),
                reason: "no price history".to_string(),
            });
        };

        let previous_close = if history.len() >= 2 {
            history[history.len() - 2].close
        } else {
            last.open
        };
        let price_change = last.close - previous_close;
        let price_change_pct = if previous_close != 0.0 {
            (price_change / previous_close) * 100.0
        } else {
            0.0
        };

        let closes: Vec<f64> = history.iter().map(|q| q.close).collect();
        Ok(StockAnalysis {
            symbol: symbol.display().to_string(),
            current_price: last.close,
            price_change,
            price_change_pct,
            ma_20: trailing_mean(&closes, 20),
            ma_50: trailing_mean(&closes, 50),
            fifty_two_week_high: history
                .iter()
                .map(|q| q.high)
                .fold(None, |acc: Option<f64>, h| Some(acc.map_or(h, |a| a.max(h)))),
            fifty_two_week_low: history
                .iter()
                .map(|q| q.low)
                .fold(None, |acc: Option<f64>, l| Some(acc.map_or(l, |a| a.min(l)))),
            volume: last.volume,
        })
    }

    /// Snapshot of a named benchmark index; `Ok(None)` for unknown names
    pub async fn index_snapshot(&self, name: &str) -> Result<Option<IndexSnapshot>> {
        let upper = name.to_uppercase();
        let Some((index_name, symbol)) = INDEX_SYMBOLS
            .iter()
            .find(|(candidate, _)| *candidate == upper)
        else {
            return Ok(None);
        };

        self.snapshot_for(index_name, symbol).await.map(Some)
    }

    async fn snapshot_for(&self, name: &str, provider_symbol: &str) -> Result<IndexSnapshot> {
        let history = self.cached_history(provider_symbol, "1d").await?;

        let (Some(first), Some(last)) = (history.first(), history.last()) else {
            return Err(StockError::DataUnavailable {
                symbol: name.to_string(),
                reason: "no intraday data".to_string(),
            });
        };

        let change = last.close - first.open;
        let change_pct = if first.open != 0.0 {
            (change / first.open) * 100.0
        } else {
            0.0
        };

        Ok(IndexSnapshot {
            name: name.to_string(),
            current: last.close,
            open: first.open,
            high: last.high,
            low: last.low,
            volume: last.volume,
            change,
            change_pct,
            last_updated: Utc::now(),
        })
    }

    /// Both benchmarks plus sector performance
    ///
    /// Individual sector failures are logged and skipped; the benchmarks
    /// themselves are required.
    pub async fn market_activity(&self) -> Result<MarketActivity> {
        let nifty = self.snapshot_for("NIFTY", "^NSEI").await?;
        let sensex = self.snapshot_for("SENSEX", "^BSESN").await?;

        let mut sectors = Vec::new();
        for (name, symbol) in SECTOR_INDICES {
            match self.snapshot_for(name, symbol).await {
                Ok(snapshot) => sectors.push(SectorPerformance {
                    name: (*name).to_string(),
                    current: snapshot.current,
                    change_pct: snapshot.change_pct,
                }),
                Err(e) => {
                    tracing::warn!(sector = %name, error = %e, "skipping sector");
                }
            }
        }

        Ok(MarketActivity {
            nifty,
            sensex,
            market_open: is_market_open(),
            sectors,
            last_updated: Utc::now(),
        })
    }

    async fn holding_entry(&self, symbol: &str) -> Result<HoldingEntry> {
        let resolved = ResolvedSymbol::new(symbol, &self.config.market_suffix);
        let provider_symbol = resolved.provider_form(&self.config.market_suffix);
        let history = self.cached_history(&provider_symbol, "5d").await?;

        let Some(last) = history.last() else {
            return Err(StockError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "no recent bars".to_string(),
            });
        };
        let previous_close = if history.len() >= 2 {
            history[history.len() - 2].close
        } else {
            last.open
        };

        let change = last.close - previous_close;
        let change_pct = if previous_close != 0.0 {
            (change / previous_close) * 100.0
        } else {
            0.0
        };

        Ok(HoldingEntry {
            symbol: resolved.display().to_string(),
            price: last.close,
            change,
            change_pct,
            volume: last.volume,
        })
    }

    /// Portfolio totals over the given symbols
    ///
    /// Symbols the provider cannot price are skipped.
    pub async fn portfolio(&self, symbols: &[&str]) -> Result<PortfolioReport> {
        let mut entries = Vec::new();
        for symbol in symbols {
            match self.holding_entry(symbol).await {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!(symbol = %symbol, error = %e, "skipping holding"),
            }
        }

        if entries.is_empty() {
            return Err(StockError::DataUnavailable {
                symbol: symbols.join(","),
                reason: "no holdings could be priced".to_string(),
            });
        }

        let total_value: f64 = entries.iter().map(|e| e.price).sum();
        let total_change: f64 = entries.iter().map(|e| e.change).sum();
        let total_change_pct = if total_value > 0.0 {
            (total_change / total_value) * 100.0
        } else {
            0.0
        };

        Ok(PortfolioReport {
            entries,
            total_value,
            total_change,
            total_change_pct,
        })
    }

    /// Watchlist rows with alerts on moves beyond ±5%
    pub async fn watchlist(&self, symbols: &[&str]) -> Result<WatchlistReport> {
        let portfolio = self.portfolio(symbols).await?;

        let alerts = portfolio
            .entries
            .iter()
            .filter(|entry| entry.change_pct.abs() > ALERT_THRESHOLD_PCT)
            .map(|entry| format!("{}: {:+.2}% change", entry.symbol, entry.change_pct))
            .collect();

        Ok(WatchlistReport {
            entries: portfolio.entries,
            alerts,
        })
    }
}

/// Mean of the last `window` values, if that many exist
fn trailing_mean(values: &[f64], window: usize) -> Option<f64> {
    if values.len() < window || window == 0 {
        return None;
    }
    let tail = &values[values.len() - window..];
    Some(tail.iter().sum::<f64>() / window as f64)
}
