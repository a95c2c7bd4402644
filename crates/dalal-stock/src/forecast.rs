//! Stand-in price forecaster
//!
//! A least-squares linear trend over the most recent closes, predicting one
//! step ahead. It exists so the fusion engine's forecast vote works without
//! a hosted model; any real predictor just implements [`Forecaster`] and
//! replaces it. Fitting on every call is the accepted cost of the seam.

use async_trait::async_trait;
use dalal_core::{Error, Forecaster, Result};

/// Default fitting window, in bars
const DEFAULT_WINDOW: usize = 60;

/// Linear-trend implementation of [`Forecaster`]
pub struct LinearTrendForecaster {
    window: usize,
}

impl LinearTrendForecaster {
    /// Create a forecaster fitting over the default 60-bar window
    pub fn new() -> Self {
        Self {
            window: DEFAULT_WINDOW,
        }
    }

    /// Create a forecaster with a custom fitting window
    pub fn with_window(window: usize) -> Self {
        Self {
            window: window.max(2),
        }
    }
}

impl Default for LinearTrendForecaster {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Forecaster for LinearTrendForecaster {
    async fn predict_next(&self, closes: &[f64]) -> Result<f64> {
        let start = closes.len().saturating_sub(self.window);
        let window = &closes[start..];

        if window.len() < 2 {
            return Err(Error::InsufficientInput(format!(
                "need at least 2 closes, got {}",
                window.len()
            )));
        }

        let n = window.len() as f64;
        let mean_x = (n - 1.0) / 2.0;
        let mean_y = window.iter().sum::<f64>() / n;

        let mut ss_xy = 0.0;
        let mut ss_xx = 0.0;
        for (i, &y) in window.iter().enumerate() {
            let dx = i as f64 - mean_x;
            ss_xy += dx * (y - mean_y);
            ss_xx += dx * dx;
        }

        // A flat window has zero variance in x only when n < 2, which is
        // excluded above; ss_xx > 0 here.
        let slope = ss_xy / ss_xx;
        let intercept = mean_y - slope * mean_x;

        Ok(intercept + slope * n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_perfect_uptrend_extrapolates() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + f64::from(i) * 2.0).collect();
        let forecaster = LinearTrendForecaster::new();
        let predicted = forecaster.predict_next(&closes).await.unwrap();
        // Next value on the exact line: 100 + 30 * 2
        assert!((predicted - 160.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_flat_series_predicts_flat() {
        let closes = vec![250.0; 40];
        let forecaster = LinearTrendForecaster::new();
        let predicted = forecaster.predict_next(&closes).await.unwrap();
        assert!((predicted - 250.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_window_limits_fit() {
        // Old crash followed by a clean recovery; a 10-bar window must
        // ignore the crash entirely
        let mut closes = vec![500.0; 50];
        closes.extend((0..10).map(|i| 100.0 + f64::from(i)));
        let forecaster = LinearTrendForecaster::with_window(10);
        let predicted = forecaster.predict_next(&closes).await.unwrap();
        assert!((predicted - 110.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_too_little_history_errors() {
        let forecaster = LinearTrendForecaster::new();
        assert!(forecaster.predict_next(&[100.0]).await.is_err());
        assert!(forecaster.predict_next(&[]).await.is_err());
    }
}
