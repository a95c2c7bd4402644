//! Symbol resolution
//!
//! Maps free-text company references to canonical exchange symbols through
//! three ordered stages: substring match over the seeded alias table, best
//! single fuzzy match, then a dynamic provider lookup whose hits are
//! appended to the table for future queries. Resolution never fails hard —
//! every miss is a [`Resolution::NotFound`] the caller turns into a
//! clarifying question.

use crate::api::MarketProvider;
use crate::error::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Minimum fuzzy similarity (0-100 scale) accepted in stage 2
const FUZZY_THRESHOLD: f64 = 80.0;

/// Words stripped from the input before the dynamic provider lookup
const NOISE_WORDS: &str = r"\b(stock|share|price|value|current|latest)\b";

/// Seeded alias -> symbol pairs
///
/// Order matters: the substring stage returns the first entry that occurs
/// in the input, so broader aliases ("tata consultancy") sit before the
/// narrower ones that share a prefix.
const SEED_ALIASES: &[(&str, &str)] = &[
    ("reliance", "RELIANCE"),
    ("reliance industries", "RELIANCE"),
    ("ril", "RELIANCE"),
    ("tcs", "TCS"),
    ("tata consultancy", "TCS"),
    ("tata consultancy services", "TCS"),
    ("infosys", "INFY"),
    ("infy", "INFY"),
    ("hdfc bank", "HDFCBANK"),
    ("hdfc", "HDFCBANK"),
    ("icici bank", "ICICIBANK"),
    ("icici", "ICICIBANK"),
    ("wipro", "WIPRO"),
    ("tata motors", "TATAMOTORS"),
    ("tatamotors", "TATAMOTORS"),
    ("tata steel", "TATASTEEL"),
    ("tatasteel", "TATASTEEL"),
    ("bharti airtel", "BHARTIARTL"),
    ("airtel", "BHARTIARTL"),
    ("sbi", "SBIN"),
    ("state bank", "SBIN"),
    ("state bank of india", "SBIN"),
    ("axis bank", "AXISBANK"),
    ("axis", "AXISBANK"),
    ("kotak bank", "KOTAKBANK"),
    ("kotak", "KOTAKBANK"),
    ("asian paints", "ASIANPAINT"),
    ("asian", "ASIANPAINT"),
    ("bajaj auto", "BAJAJ-AUTO"),
    ("bajaj", "BAJAJ-AUTO"),
    ("hindalco", "HINDALCO"),
    ("itc", "ITC"),
    ("larsen", "LT"),
    ("l&t", "LT"),
    ("larsen and toubro", "LT"),
    ("m&m", "M&M"),
    ("mahindra", "M&M"),
    ("maruti", "MARUTI"),
    ("maruti suzuki", "MARUTI"),
    ("nestle", "NESTLEIND"),
    ("nestle india", "NESTLEIND"),
    ("ongc", "ONGC"),
    ("oil and natural gas", "ONGC"),
    ("power grid", "POWERGRID"),
    ("sun pharma", "SUNPHARMA"),
    ("sun", "SUNPHARMA"),
    ("titan", "TITAN"),
    ("ultracemco", "ULTRACEMCO"),
    ("ultra cement", "ULTRACEMCO"),
];

/// A canonical market symbol
///
/// Stored without the market suffix. The suffix is attached only when a
/// symbol crosses the provider boundary and is never shown to users; index
/// symbols (leading `^`) take no suffix at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedSymbol(String);

impl ResolvedSymbol {
    /// Wrap a display-form symbol, stripping `suffix` if present
    pub fn new(symbol: impl Into<String>, suffix: &str) -> Self {
        let symbol = symbol.into();
        let bare = symbol.strip_suffix(suffix).unwrap_or(&symbol);
        Self(bare.to_string())
    }

    /// User-visible form (no suffix)
    pub fn display(&self) -> &str {
        &self.0
    }

    /// Provider form: suffix attached unless this is an index symbol
    pub fn provider_form(&self, suffix: &str) -> String {
        if self.0.starts_with('^') || self.0.ends_with(suffix) {
            self.0.clone()
        } else {
            format!("{}{}", self.0, suffix)
        }
    }
}

impl fmt::Display for ResolvedSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a resolution attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(ResolvedSymbol),
    NotFound,
}

impl Resolution {
    /// The resolved symbol, if any
    pub fn symbol(&self) -> Option<&ResolvedSymbol> {
        match self {
            Self::Found(symbol) => Some(symbol),
            Self::NotFound => None,
        }
    }
}

/// Staged free-text to symbol resolver
pub struct SymbolResolver {
    aliases: RwLock<Vec<(String, String)>>,
    provider: Arc<dyn MarketProvider>,
    suffix: String,
    noise: Regex,
}

impl SymbolResolver {
    /// Create a resolver seeded with the common Indian-market aliases
    pub fn new(provider: Arc<dyn MarketProvider>, suffix: impl Into<String>) -> Self {
        let aliases = SEED_ALIASES
            .iter()
            .map(|(alias, symbol)| ((*alias).to_string(), (*symbol).to_string()))
            .collect();

        Self {
            aliases: RwLock::new(aliases),
            provider,
            suffix: suffix.into(),
            noise: Regex::new(NOISE_WORDS).expect("noise-word pattern is valid"),
        }
    }

    /// Resolve free text to a canonical symbol
    pub async fn resolve(&self, text: &str) -> Resolution {
        let input = text.trim().to_lowercase();

        // An empty needle would substring-match every alias; reject first.
        if input.is_empty() {
            return Resolution::NotFound;
        }

        if let Some(symbol) = self.substring_match(&input).await {
            tracing::debug!(%symbol, "resolved by substring match");
            return Resolution::Found(symbol);
        }

        if let Some(symbol) = self.fuzzy_match(&input).await {
            tracing::debug!(%symbol, "resolved by fuzzy match");
            return Resolution::Found(symbol);
        }

        match self.dynamic_lookup(&input).await {
            Ok(Some(symbol)) => {
                tracing::debug!(%symbol, "resolved by provider lookup");
                Resolution::Found(symbol)
            }
            Ok(None) => Resolution::NotFound,
            Err(e) => {
                // Provider failures are not resolution failures the user
                // should see a stack trace for.
                tracing::warn!(error = %e, "symbol lookup failed, treating as not found");
                Resolution::NotFound
            }
        }
    }

    /// Stage 1: first alias that occurs as a substring of the input wins
    async fn substring_match(&self, input: &str) -> Option<ResolvedSymbol> {
        let aliases = self.aliases.read().await;
        aliases
            .iter()
            .find(|(alias, _)| input.contains(alias.as_str()))
            .map(|(_, symbol)| ResolvedSymbol::new(symbol.clone(), &self.suffix))
    }

    /// Stage 2: single best fuzzy candidate, accepted above the threshold
    async fn fuzzy_match(&self, input: &str) -> Option<ResolvedSymbol> {
        let aliases = self.aliases.read().await;
        let best = aliases
            .iter()
            .map(|(alias, symbol)| {
                let score = strsim::normalized_levenshtein(input, alias) * 100.0;
                (score, symbol)
            })
            .max_by(|(a, _), (b, _)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        match best {
            Some((score, symbol)) if score > FUZZY_THRESHOLD => {
                Some(ResolvedSymbol::new(symbol.clone(), &self.suffix))
            }
            _ => None,
        }
    }

    /// Stage 3: strip noise words and ask the provider; cache hits
    async fn dynamic_lookup(&self, input: &str) -> Result<Option<ResolvedSymbol>> {
        let residual = self.noise.replace_all(input, "");
        let residual = residual.split_whitespace().collect::<Vec<_>>().join(" ");
        if residual.is_empty() {
            return Ok(None);
        }

        let Some(found) = self.provider.search_symbol(&residual).await? else {
            return Ok(None);
        };

        let symbol = ResolvedSymbol::new(found, &self.suffix);
        self.remember(&residual, symbol.display()).await;
        Ok(Some(symbol))
    }

    /// Append a newly learned alias; keys stay unique, first writer wins
    async fn remember(&self, alias: &str, symbol: &str) {
        let mut aliases = self.aliases.write().await;
        if !aliases.iter().any(|(existing, _)| existing == alias) {
            aliases.push((alias.to_string(), symbol.to_string()));
        }
    }

    /// Number of known aliases (seeded + learned)
    pub async fn alias_count(&self) -> usize {
        self.aliases.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Quote;
    use crate::error::StockError;
    use async_trait::async_trait;

    /// Provider stub: search result is fixed, price endpoints unused
    struct StubProvider {
        search: std::result::Result<Option<String>, ()>,
    }

    #[async_trait]
    impl MarketProvider for StubProvider {
        async fn latest_quote(&self, symbol: &str) -> Result<Quote> {
            Err(StockError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "stub".to_string(),
            })
        }

        async fn history(&self, symbol: &str, _range: &str) -> Result<Vec<Quote>> {
            Err(StockError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "stub".to_string(),
            })
        }

        async fn search_symbol(&self, _text: &str) -> Result<Option<String>> {
            match &self.search {
                Ok(result) => Ok(result.clone()),
                Err(()) => Err(StockError::ApiError("stub network failure".to_string())),
            }
        }
    }

    fn resolver_with(search: std::result::Result<Option<String>, ()>) -> SymbolResolver {
        SymbolResolver::new(Arc::new(StubProvider { search }), ".NS")
    }

    #[tokio::test]
    async fn test_known_aliases_resolve_exactly() {
        let resolver = resolver_with(Ok(None));
        for (alias, expected) in [("reliance", "RELIANCE"), ("sbi", "SBIN"), ("infy", "INFY")] {
            let resolution = resolver.resolve(alias).await;
            assert_eq!(
                resolution.symbol().map(ResolvedSymbol::display),
                Some(expected)
            );
        }
    }

    #[tokio::test]
    async fn test_substring_match_inside_sentence() {
        let resolver = resolver_with(Ok(None));
        let resolution = resolver.resolve("what is the price of tata motors today").await;
        assert_eq!(
            resolution.symbol().map(ResolvedSymbol::display),
            Some("TATAMOTORS")
        );
    }

    #[tokio::test]
    async fn test_empty_input_is_rejected_before_matching() {
        let resolver = resolver_with(Ok(Some("RELIANCE.NS".to_string())));
        assert_eq!(resolver.resolve("").await, Resolution::NotFound);
        assert_eq!(resolver.resolve("   ").await, Resolution::NotFound);
    }

    #[tokio::test]
    async fn test_fuzzy_match_above_threshold() {
        let resolver = resolver_with(Ok(None));
        // "relianc" is not a substring hit but sits at ~88 similarity
        let resolution = resolver.resolve("relianc").await;
        assert_eq!(
            resolution.symbol().map(ResolvedSymbol::display),
            Some("RELIANCE")
        );
    }

    #[tokio::test]
    async fn test_low_similarity_and_no_provider_hit_is_not_found() {
        let resolver = resolver_with(Ok(None));
        assert_eq!(
            resolver.resolve("completely unknown company").await,
            Resolution::NotFound
        );
    }

    #[tokio::test]
    async fn test_dynamic_lookup_learns_alias() {
        let resolver = resolver_with(Ok(Some("ZOMATO.NS".to_string())));
        let before = resolver.alias_count().await;

        let resolution = resolver.resolve("zomato stock price").await;
        assert_eq!(
            resolution.symbol().map(ResolvedSymbol::display),
            Some("ZOMATO")
        );
        assert_eq!(resolver.alias_count().await, before + 1);

        // Second resolution hits the table via the substring stage
        let again = resolver.resolve("zomato").await;
        assert_eq!(again.symbol().map(ResolvedSymbol::display), Some("ZOMATO"));
    }

    #[tokio::test]
    async fn test_provider_failure_is_swallowed() {
        let resolver = resolver_with(Err(()));
        assert_eq!(
            resolver.resolve("some obscure smallcap").await,
            Resolution::NotFound
        );
    }

    #[test]
    fn test_provider_form_suffix_rules() {
        let equity = ResolvedSymbol::new("RELIANCE", ".NS");
        assert_eq!(equity.provider_form(".NS"), "RELIANCE.NS");
        assert_eq!(equity.display(), "RELIANCE");

        let from_provider = ResolvedSymbol::new("ZOMATO.NS", ".NS");
        assert_eq!(from_provider.display(), "ZOMATO");

        let index = ResolvedSymbol::new("^NSEI", ".NS");
        assert_eq!(index.provider_form(".NS"), "^NSEI");
    }
}
