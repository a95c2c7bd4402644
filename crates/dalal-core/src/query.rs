//! User query model
//!
//! A [`Query`] keeps the raw input alongside a derived cleaned form. The
//! cleaned form is what every downstream component (resolver, classifier,
//! term lookup) operates on; it is computed once and never mutated.

use serde::{Deserialize, Serialize};

/// A user query and its normalized form
///
/// The cleaned form is lower-cased, restricted to alphanumerics, spaces and
/// periods, and has runs of whitespace collapsed to single spaces.
///
/// # Example
///
/// ```
/// use dalal_core::Query;
///
/// let q = Query::new("What's the PRICE   of Reliance?!");
/// assert_eq!(q.cleaned(), "whats the price of reliance");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    raw: String,
    cleaned: String,
}

impl Query {
    /// Create a query, deriving the cleaned form from the raw input
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let cleaned = clean(&raw);
        Self { raw, cleaned }
    }

    /// The input exactly as the user typed it
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The normalized form used for matching
    pub fn cleaned(&self) -> &str {
        &self.cleaned
    }

    /// Whether the cleaned form is empty (blank or all-symbol input)
    pub fn is_empty(&self) -> bool {
        self.cleaned.is_empty()
    }
}

/// Lower-case, keep alphanumerics/space/period, collapse whitespace
///
/// Punctuation is removed outright, not turned into spaces, so "what's"
/// normalizes to "whats".
fn clean(text: &str) -> String {
    let lowered = text.to_lowercase();
    let filtered: String = lowered
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.' || c.is_whitespace())
        .collect();
    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_lowercases_and_strips_punctuation() {
        let q = Query::new("Tell me about TCS!!!");
        assert_eq!(q.cleaned(), "tell me about tcs");
    }

    #[test]
    fn test_clean_collapses_whitespace() {
        let q = Query::new("  price \t of\n reliance  ");
        assert_eq!(q.cleaned(), "price of reliance");
    }

    #[test]
    fn test_clean_keeps_periods_and_digits() {
        let q = Query::new("nifty 50 crossed 22000.50?");
        assert_eq!(q.cleaned(), "nifty 50 crossed 22000.50");
    }

    #[test]
    fn test_empty_input() {
        assert!(Query::new("").is_empty());
        assert!(Query::new("   !!??  ").is_empty());
        assert!(!Query::new("itc").is_empty());
    }

    #[test]
    fn test_raw_is_preserved() {
        let q = Query::new("What IS the Price?");
        assert_eq!(q.raw(), "What IS the Price?");
    }
}
