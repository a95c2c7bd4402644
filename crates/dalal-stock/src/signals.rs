//! Trading signal fusion
//!
//! Each indicator maps to a categorical verdict on its own; the overall
//! verdict is an unweighted strict-majority vote over Buy vs Sell, with
//! ties (and everything else) landing on Hold. Every computed indicator
//! counts equally — 2-of-3 and 2-of-4 carry the same way. Indicators that
//! cannot be computed are omitted from the vote, shrinking the
//! denominator, never defaulted to Neutral.

use chrono::{DateTime, Utc};
use dalal_core::Forecaster;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use ta::{
    Next,
    indicators::{BollingerBands, MovingAverageConvergenceDivergence, RelativeStrengthIndex},
};

const RSI_PERIOD: usize = 14;
const RSI_OVERSOLD: f64 = 30.0;
const RSI_OVERBOUGHT: f64 = 70.0;

const MACD_FAST: usize = 12;
const MACD_SLOW: usize = 26;
const MACD_SIGNAL: usize = 9;

const BB_PERIOD: usize = 20;
const BB_MULTIPLIER: f64 = 2.0;

/// Predicted move (percent) beyond which the forecast votes Buy/Sell
const FORECAST_BAND_PCT: f64 = 2.0;

/// Categorical verdict from one indicator or the fusion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Buy,
    Sell,
    Neutral,
    Hold,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Buy => "Buy",
            Self::Sell => "Sell",
            Self::Neutral => "Neutral",
            Self::Hold => "Hold",
        };
        f.write_str(name)
    }
}

/// The indicators that can vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndicatorKind {
    Rsi,
    Macd,
    BollingerBands,
    Forecast,
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Rsi => "RSI",
            Self::Macd => "MACD",
            Self::BollingerBands => "Bollinger Bands",
            Self::Forecast => "Prediction",
        };
        f.write_str(name)
    }
}

/// Latest indicator values computed from a close series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub price: f64,
    pub rsi: Option<f64>,
    /// (macd line, signal line)
    pub macd: Option<(f64, f64)>,
    /// (upper band, lower band)
    pub bollinger: Option<(f64, f64)>,
}

/// Per-indicator verdicts plus the fused result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingSignals {
    /// Display-form symbol (no market suffix)
    pub symbol: String,
    pub current_price: f64,
    /// Verdicts in computation order; omitted indicators are absent
    pub verdicts: Vec<(IndicatorKind, Verdict)>,
    pub overall: Verdict,
    pub snapshot: IndicatorSnapshot,
    pub predicted_price: Option<f64>,
    pub predicted_change_pct: Option<f64>,
    pub last_updated: DateTime<Utc>,
}

/// RSI rule: oversold buys, overbought sells
fn rsi_verdict(rsi: f64) -> Verdict {
    if rsi < RSI_OVERSOLD {
        Verdict::Buy
    } else if rsi > RSI_OVERBOUGHT {
        Verdict::Sell
    } else {
        Verdict::Neutral
    }
}

/// MACD rule: exactly two outcomes, no neutral branch
fn macd_verdict(macd: f64, signal: f64) -> Verdict {
    if macd > signal { Verdict::Buy } else { Verdict::Sell }
}

/// Bollinger rule: price outside the bands votes, inside is neutral
fn bollinger_verdict(price: f64, upper: f64, lower: f64) -> Verdict {
    if price < lower {
        Verdict::Buy
    } else if price > upper {
        Verdict::Sell
    } else {
        Verdict::Neutral
    }
}

/// Forecast rule: only moves beyond ±2% vote
fn forecast_verdict(change_pct: f64) -> Verdict {
    if change_pct > FORECAST_BAND_PCT {
        Verdict::Buy
    } else if change_pct < -FORECAST_BAND_PCT {
        Verdict::Sell
    } else {
        Verdict::Hold
    }
}

/// Strict-majority vote; Neutral/Hold verdicts do not count
pub fn fuse(verdicts: &[(IndicatorKind, Verdict)]) -> Verdict {
    let buys = verdicts.iter().filter(|(_, v)| *v == Verdict::Buy).count();
    let sells = verdicts.iter().filter(|(_, v)| *v == Verdict::Sell).count();

    if buys > sells {
        Verdict::Buy
    } else if sells > buys {
        Verdict::Sell
    } else {
        Verdict::Hold
    }
}

/// Compute the latest indicator values from a close series
///
/// Indicators whose window exceeds the available history stay `None`.
pub fn compute_snapshot(closes: &[f64]) -> Option<IndicatorSnapshot> {
    let price = *closes.last()?;

    Some(IndicatorSnapshot {
        price,
        rsi: last_rsi(closes),
        macd: last_macd(closes),
        bollinger: last_bollinger(closes),
    })
}

fn last_rsi(closes: &[f64]) -> Option<f64> {
    if closes.len() <= RSI_PERIOD {
        return None;
    }
    let mut rsi = RelativeStrengthIndex::new(RSI_PERIOD).ok()?;
    let mut current = None;
    for &close in closes {
        current = Some(rsi.next(close));
    }
    current
}

fn last_macd(closes: &[f64]) -> Option<(f64, f64)> {
    if closes.len() <= MACD_SLOW {
        return None;
    }
    let mut macd = MovingAverageConvergenceDivergence::new(MACD_FAST, MACD_SLOW, MACD_SIGNAL).ok()?;
    let mut current = None;
    for &close in closes {
        let out = macd.next(close);
        current = Some((out.macd, out.signal));
    }
    current
}

fn last_bollinger(closes: &[f64]) -> Option<(f64, f64)> {
    if closes.len() <= BB_PERIOD {
        return None;
    }
    let mut bb = BollingerBands::new(BB_PERIOD, BB_MULTIPLIER).ok()?;
    let mut current = None;
    for &close in closes {
        let out = bb.next(close);
        current = Some((out.upper, out.lower));
    }
    current
}

/// Fuses indicator verdicts, optionally including a trained forecaster
pub struct SignalFusionEngine {
    forecaster: Option<Arc<dyn Forecaster>>,
}

impl SignalFusionEngine {
    /// Create an engine; `None` means no forecast vote
    pub fn new(forecaster: Option<Arc<dyn Forecaster>>) -> Self {
        Self { forecaster }
    }

    /// Evaluate a close series into per-indicator verdicts and the fusion
    ///
    /// Returns `None` when there is no history at all — the caller surfaces
    /// "no signal available" rather than a fabricated Hold.
    pub async fn evaluate(&self, symbol: &str, closes: &[f64]) -> Option<TradingSignals> {
        let snapshot = compute_snapshot(closes)?;
        let mut verdicts = Vec::new();

        if let Some(rsi) = snapshot.rsi {
            verdicts.push((IndicatorKind::Rsi, rsi_verdict(rsi)));
        }
        if let Some((macd, signal)) = snapshot.macd {
            verdicts.push((IndicatorKind::Macd, macd_verdict(macd, signal)));
        }
        if let Some((upper, lower)) = snapshot.bollinger {
            verdicts.push((
                IndicatorKind::BollingerBands,
                bollinger_verdict(snapshot.price, upper, lower),
            ));
        }

        let mut predicted_price = None;
        let mut predicted_change_pct = None;
        if let Some(forecaster) = &self.forecaster {
            match forecaster.predict_next(closes).await {
                Ok(predicted) => {
                    let change_pct = ((predicted - snapshot.price) / snapshot.price) * 100.0;
                    predicted_price = Some(predicted);
                    predicted_change_pct = Some(change_pct);
                    verdicts.push((IndicatorKind::Forecast, forecast_verdict(change_pct)));
                }
                Err(e) => {
                    // Omitted from the vote, not defaulted to Neutral
                    tracing::debug!(error = %e, "forecast unavailable, omitting from vote");
                }
            }
        }

        let overall = fuse(&verdicts);

        Some(TradingSignals {
            symbol: symbol.to_string(),
            current_price: snapshot.price,
            verdicts,
            overall,
            snapshot,
            predicted_price,
            predicted_change_pct,
            last_updated: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[test]
    fn test_rsi_bands() {
        assert_eq!(rsi_verdict(25.0), Verdict::Buy);
        assert_eq!(rsi_verdict(75.0), Verdict::Sell);
        assert_eq!(rsi_verdict(50.0), Verdict::Neutral);
        // Boundary values do not trigger
        assert_eq!(rsi_verdict(30.0), Verdict::Neutral);
        assert_eq!(rsi_verdict(70.0), Verdict::Neutral);
    }

    #[test]
    fn test_macd_has_no_neutral_branch() {
        assert_eq!(macd_verdict(1.2, 1.0), Verdict::Buy);
        assert_eq!(macd_verdict(1.0, 1.2), Verdict::Sell);
        assert_eq!(macd_verdict(1.0, 1.0), Verdict::Sell);
    }

    #[test]
    fn test_bollinger_band_breach() {
        assert_eq!(bollinger_verdict(95.0, 110.0, 100.0), Verdict::Buy);
        assert_eq!(bollinger_verdict(115.0, 110.0, 100.0), Verdict::Sell);
        assert_eq!(bollinger_verdict(105.0, 110.0, 100.0), Verdict::Neutral);
    }

    #[test]
    fn test_forecast_band() {
        assert_eq!(forecast_verdict(2.5), Verdict::Buy);
        assert_eq!(forecast_verdict(-2.5), Verdict::Sell);
        assert_eq!(forecast_verdict(1.9), Verdict::Hold);
        assert_eq!(forecast_verdict(-2.0), Verdict::Hold);
    }

    #[test]
    fn test_fusion_tie_is_hold() {
        let verdicts = vec![
            (IndicatorKind::Rsi, Verdict::Buy),
            (IndicatorKind::Macd, Verdict::Sell),
            (IndicatorKind::BollingerBands, Verdict::Buy),
            (IndicatorKind::Forecast, Verdict::Sell),
        ];
        assert_eq!(fuse(&verdicts), Verdict::Hold);
    }

    #[test]
    fn test_fusion_majority_buy_with_neutral_excluded() {
        let verdicts = vec![
            (IndicatorKind::Rsi, Verdict::Buy),
            (IndicatorKind::Macd, Verdict::Buy),
            (IndicatorKind::BollingerBands, Verdict::Neutral),
        ];
        assert_eq!(fuse(&verdicts), Verdict::Buy);
    }

    #[test]
    fn test_fusion_of_nothing_is_hold() {
        assert_eq!(fuse(&[]), Verdict::Hold);
    }

    #[test]
    fn test_snapshot_requires_history_per_indicator() {
        // Five bars: not enough for any indicator window
        let closes = vec![100.0, 101.0, 102.0, 101.5, 102.5];
        let snapshot = compute_snapshot(&closes).expect("non-empty history");
        assert!(snapshot.rsi.is_none());
        assert!(snapshot.macd.is_none());
        assert!(snapshot.bollinger.is_none());
        assert_eq!(snapshot.price, 102.5);

        assert!(compute_snapshot(&[]).is_none());
    }

    #[test]
    fn test_snapshot_with_full_history() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + f64::from(i % 7)).collect();
        let snapshot = compute_snapshot(&closes).expect("non-empty history");
        assert!(snapshot.rsi.is_some());
        assert!(snapshot.macd.is_some());
        assert!(snapshot.bollinger.is_some());
    }

    struct StubForecaster {
        predicted: f64,
    }

    #[async_trait]
    impl Forecaster for StubForecaster {
        async fn predict_next(&self, _closes: &[f64]) -> dalal_core::Result<f64> {
            Ok(self.predicted)
        }
    }

    #[tokio::test]
    async fn test_evaluate_includes_forecast_vote() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + f64::from(i % 5)).collect();
        let price = *closes.last().unwrap();
        let engine = SignalFusionEngine::new(Some(Arc::new(StubForecaster {
            predicted: price * 1.05,
        })));

        let signals = engine.evaluate("RELIANCE", &closes).await.expect("signals");
        assert!(
            signals
                .verdicts
                .iter()
                .any(|(kind, verdict)| *kind == IndicatorKind::Forecast
                    && *verdict == Verdict::Buy)
        );
        assert!(signals.predicted_change_pct.unwrap() > 2.0);
    }

    #[tokio::test]
    async fn test_evaluate_without_forecaster() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + f64::from(i % 5)).collect();
        let engine = SignalFusionEngine::new(None);
        let signals = engine.evaluate("TCS", &closes).await.expect("signals");
        assert!(
            !signals
                .verdicts
                .iter()
                .any(|(kind, _)| *kind == IndicatorKind::Forecast)
        );
    }

    #[tokio::test]
    async fn test_evaluate_empty_history_is_none() {
        let engine = SignalFusionEngine::new(None);
        assert!(engine.evaluate("TCS", &[]).await.is_none());
    }
}
