//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once per process
//! - Take the filter from `RUST_LOG`, falling back to the configured level

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::schema::ObservabilityConfig;

/// Filter used when neither `RUST_LOG` nor the config give a usable one.
const DEFAULT_FILTER: &str = "carrier_route=info,tower_http=info";

/// Build the filter directive for a configured level.
pub fn filter_directive(config: &ObservabilityConfig) -> String {
    if config.log_level.trim().is_empty() {
        DEFAULT_FILTER.to_string()
    } else {
        format!("carrier_route={level},tower_http={level}", level = config.log_level.trim())
    }
}

/// Install the global subscriber.
///
/// Calling this twice is harmless; the second call is ignored.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directive(config)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
