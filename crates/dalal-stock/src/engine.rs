//! Query processing engine
//!
//! [`StockBot::process_query`] is the single entry point: it cleans the
//! query, short-circuits on market terms and the phrase-dispatched views,
//! then classifies intent, resolves the symbol and gathers whatever data
//! the intent needs. It is total — every failure path ends in a clarifying
//! question or an "unable to fetch" message, never an error.

use crate::api::{MarketProvider, NewsClient, NewsProvider, YahooMarketClient};
use crate::cache::{CacheKey, CacheManager};
use crate::config::StockConfig;
use crate::error::{Result, StockError};
use crate::forecast::LinearTrendForecaster;
use crate::intent::{self, IntentClassifier};
use crate::market::{self, DEFAULT_HOLDINGS, MarketDesk};
use crate::models::{HeuristicIntentModel, LexiconSentimentModel};
use crate::render;
use crate::resolver::{Resolution, ResolvedSymbol, SymbolResolver};
use crate::sentiment::{SentimentAnalyzer, aggregate, market_pulse};
use crate::signals::SignalFusionEngine;
use dalal_core::{Forecaster, IntentLabel, IntentModel, Query, SentimentModel};
use std::sync::Arc;

/// Phrases that route straight to the fusion engine
const SIGNAL_PHRASES: &[&str] = &[
    "trading signal",
    "buy signal",
    "sell signal",
    "when to buy",
    "when to sell",
];

const SECTOR_PHRASES: &[&str] = &["sector performance", "sector", "sectors"];
const PORTFOLIO_PHRASES: &[&str] = &["portfolio", "my stocks", "my investments"];
const WATCHLIST_PHRASES: &[&str] = &["watchlist", "watch list"];

/// The assembled decision pipeline
pub struct StockBot {
    config: StockConfig,
    resolver: SymbolResolver,
    classifier: IntentClassifier,
    analyzer: SentimentAnalyzer,
    fusion: SignalFusionEngine,
    desk: MarketDesk,
    news: Arc<dyn NewsProvider>,
    caches: Arc<CacheManager>,
}

impl StockBot {
    /// Start building a bot
    pub fn builder() -> StockBotBuilder {
        StockBotBuilder::default()
    }

    /// Bot with default providers and the offline model stand-ins
    pub fn with_defaults() -> Result<Self> {
        Self::builder().build()
    }

    /// Answer a free-text query; total over arbitrary input
    pub async fn process_query(&self, raw: &str) -> String {
        let query = Query::new(raw);
        let q = query.cleaned();
        tracing::debug!(query = q, "processing query");

        // Market terms answer directly, before any classification
        if let Some((_, explanation)) = intent::lookup_term(q) {
            return explanation.to_string();
        }

        if contains_any(q, SECTOR_PHRASES) {
            return match self.desk.market_activity().await {
                Ok(activity) => render::sector_performance(&activity.sectors),
                Err(e) => {
                    tracing::warn!(error = %e, "sector performance unavailable");
                    render::unavailable("sector performance data")
                }
            };
        }

        if contains_any(q, SIGNAL_PHRASES) {
            return match self.resolver.resolve(q).await {
                Resolution::Found(symbol) => self.trading_signals_answer(&symbol).await,
                Resolution::NotFound => render::CLARIFY_SIGNALS.to_string(),
            };
        }

        if contains_any(q, PORTFOLIO_PHRASES) {
            return match self.desk.portfolio(DEFAULT_HOLDINGS).await {
                Ok(report) => render::portfolio(&report),
                Err(e) => {
                    tracing::warn!(error = %e, "portfolio unavailable");
                    render::unavailable("portfolio analysis")
                }
            };
        }

        if contains_any(q, WATCHLIST_PHRASES) {
            return match self.desk.watchlist(DEFAULT_HOLDINGS).await {
                Ok(report) => render::watchlist(&report),
                Err(e) => {
                    tracing::warn!(error = %e, "watchlist unavailable");
                    render::unavailable("watchlist analysis")
                }
            };
        }

        let (label, confidence, _sentiment) = self.classifier.classify(q).await;
        tracing::debug!(intent = %label, confidence, "classified");

        let resolution = self.resolver.resolve(q).await;
        if label.needs_symbol() {
            let Resolution::Found(symbol) = resolution else {
                return render::CLARIFY.to_string();
            };
            return self.symbol_answer(label, &symbol).await;
        }

        match label {
            IntentLabel::MarketStatus => render::market_status(market::is_market_open()),
            IntentLabel::IndexQuery | IntentLabel::MarketActivity => {
                match self.desk.market_activity().await {
                    Ok(activity) => render::market_activity(&activity),
                    Err(e) => {
                        tracing::warn!(error = %e, "market activity unavailable");
                        render::unavailable("market data")
                    }
                }
            }
            IntentLabel::SectorAnalysis | IntentLabel::IndustryAnalysis => {
                match self.desk.market_activity().await {
                    Ok(activity) => render::sector_performance(&activity.sectors),
                    Err(e) => {
                        tracing::warn!(error = %e, "sector analysis unavailable");
                        render::unavailable("sector performance data")
                    }
                }
            }
            // Term queries that reach here matched no known term above
            IntentLabel::TermQuery | IntentLabel::GeneralQuery => render::HELP.to_string(),
            // Symbol-bound intents were dispatched already
            _ => render::HELP.to_string(),
        }
    }

    /// Dispatch for intents that carry a resolved symbol
    async fn symbol_answer(&self, label: IntentLabel, symbol: &ResolvedSymbol) -> String {
        match label {
            IntentLabel::PriceQuery => match self.desk.quote_summary(symbol).await {
                Ok(summary) => render::price_details(&summary),
                Err(e) => {
                    tracing::warn!(error = %e, symbol = %symbol, "quote unavailable");
                    render::unavailable("stock data")
                }
            },
            IntentLabel::NewsQuery => match self.scored_news(symbol).await {
                Ok(articles) if articles.is_empty() => {
                    format!("No recent news found for {symbol}.")
                }
                Ok(articles) => render::news_list(symbol.display(), &articles),
                Err(e) => {
                    tracing::warn!(error = %e, symbol = %symbol, "news unavailable");
                    render::unavailable("news")
                }
            },
            IntentLabel::SentimentQuery | IntentLabel::SentimentAnalysis => {
                self.sentiment_answer(symbol).await
            }
            IntentLabel::AnalysisQuery | IntentLabel::SummaryQuery => {
                match self.desk.stock_analysis(symbol).await {
                    Ok(report) => render::analysis(&report),
                    Err(e) => {
                        tracing::warn!(error = %e, symbol = %symbol, "analysis unavailable");
                        render::unavailable("stock analysis")
                    }
                }
            }
            _ => render::HELP.to_string(),
        }
    }

    async fn trading_signals_answer(&self, symbol: &ResolvedSymbol) -> String {
        let closes = match self.desk.closes(symbol).await {
            Ok(closes) => closes,
            Err(e) => {
                tracing::warn!(error = %e, symbol = %symbol, "history unavailable");
                return render::unavailable("trading signals");
            }
        };

        match self.fusion.evaluate(symbol.display(), &closes).await {
            Some(signals) => render::trading_signals(&signals),
            None => format!("No signal available for {symbol} at the moment."),
        }
    }

    async fn sentiment_answer(&self, symbol: &ResolvedSymbol) -> String {
        let articles = match self.scored_news(symbol).await {
            Ok(articles) => articles,
            Err(e) => {
                tracing::warn!(error = %e, symbol = %symbol, "sentiment news unavailable");
                return render::unavailable("sentiment data");
            }
        };

        if articles.is_empty() {
            return render::NO_NEWS.to_string();
        }

        let summary = aggregate(&articles);
        let pulse = market_pulse(&summary);
        let shown = self.config.recent_articles_shown.min(articles.len());
        render::sentiment_report(symbol.display(), &summary, &pulse, &articles[..shown])
    }

    /// Fetch (through the cache) and score news for a symbol
    async fn scored_news(&self, symbol: &ResolvedSymbol) -> Result<Vec<crate::sentiment::ScoredArticle>> {
        let key = CacheKey::new("news", (symbol.display(), self.config.max_articles));
        let value = self
            .caches
            .news
            .get_or_fetch(key, || async {
                let articles = self
                    .news
                    .search_news(symbol.display(), self.config.max_articles)
                    .await?;
                serde_json::to_value(articles).map_err(StockError::from)
            })
            .await?;

        let articles: Vec<crate::api::Article> = serde_json::from_value(value)?;
        Ok(self.analyzer.analyze_batch(&articles).await)
    }
}

/// Builder for [`StockBot`]
///
/// Providers and models default to the Yahoo client, the HTTP news client
/// and the offline model stand-ins; each can be swapped independently.
#[derive(Default)]
pub struct StockBotBuilder {
    config: Option<StockConfig>,
    market: Option<Arc<dyn MarketProvider>>,
    news: Option<Arc<dyn NewsProvider>>,
    intent_model: Option<Arc<dyn IntentModel>>,
    sentiment_model: Option<Arc<dyn SentimentModel>>,
    forecaster: Option<Arc<dyn Forecaster>>,
    no_forecaster: bool,
}

impl StockBotBuilder {
    /// Set the configuration
    pub fn config(mut self, config: StockConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a custom market data provider
    pub fn market_provider(mut self, provider: Arc<dyn MarketProvider>) -> Self {
        self.market = Some(provider);
        self
    }

    /// Use a custom news provider
    pub fn news_provider(mut self, provider: Arc<dyn NewsProvider>) -> Self {
        self.news = Some(provider);
        self
    }

    /// Use a custom intent model
    pub fn intent_model(mut self, model: Arc<dyn IntentModel>) -> Self {
        self.intent_model = Some(model);
        self
    }

    /// Use a custom sentiment model
    pub fn sentiment_model(mut self, model: Arc<dyn SentimentModel>) -> Self {
        self.sentiment_model = Some(model);
        self
    }

    /// Use a custom forecaster
    pub fn forecaster(mut self, forecaster: Arc<dyn Forecaster>) -> Self {
        self.forecaster = Some(forecaster);
        self
    }

    /// Run without any forecast vote
    pub fn without_forecaster(mut self) -> Self {
        self.no_forecaster = true;
        self
    }

    /// Assemble the bot
    pub fn build(self) -> Result<StockBot> {
        let config = match self.config {
            Some(config) => config,
            None => StockConfig::default(),
        };
        config.validate()?;

        let market: Arc<dyn MarketProvider> = self
            .market
            .unwrap_or_else(|| Arc::new(YahooMarketClient::new()));
        let news: Arc<dyn NewsProvider> = self.news.unwrap_or_else(|| {
            Arc::new(NewsClient::new(
                config.news_base_url.clone(),
                config.news_rate_limit,
                config.request_timeout,
            ))
        });
        let intent_model: Arc<dyn IntentModel> = self
            .intent_model
            .unwrap_or_else(|| Arc::new(HeuristicIntentModel));
        let sentiment_model: Arc<dyn SentimentModel> = self
            .sentiment_model
            .unwrap_or_else(|| Arc::new(LexiconSentimentModel));
        let forecaster = if self.no_forecaster {
            None
        } else {
            Some(
                self.forecaster
                    .unwrap_or_else(|| Arc::new(LinearTrendForecaster::new()) as Arc<dyn Forecaster>),
            )
        };

        let caches = Arc::new(CacheManager::new(
            config.cache_ttl_quotes,
            config.cache_ttl_history,
            config.cache_ttl_news,
            config.cache_capacity,
        ));

        Ok(StockBot {
            resolver: SymbolResolver::new(Arc::clone(&market), config.market_suffix.clone()),
            classifier: IntentClassifier::new(intent_model, Arc::clone(&sentiment_model)),
            analyzer: SentimentAnalyzer::new(sentiment_model),
            fusion: SignalFusionEngine::new(forecaster),
            desk: MarketDesk::new(market, Arc::clone(&caches), config.clone()),
            news,
            caches,
            config,
        })
    }
}

fn contains_any(query: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| query.contains(p))
}
