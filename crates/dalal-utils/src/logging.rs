//! Logging and tracing utilities

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing with the default filter
///
/// Honors `RUST_LOG` when set; otherwise logs the pipeline crates at `info`.
pub fn init_tracing() {
    init_tracing_with("info,dalal_stock=info");
}

/// Initialize tracing with an explicit fallback filter
pub fn init_tracing_with(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
