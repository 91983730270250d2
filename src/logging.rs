//! Logging initialization and configuration.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "scoped_store=info";

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Try to initialize the logging system.
///
/// Uses the `RUST_LOG` environment variable for filtering. If not set,
/// defaults to `scoped_store=info`. Returns `Err` if a subscriber has
/// already been set.
pub fn try_init() -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(default_filter())
        .with(tracing_subscriber::fmt::layer().compact())
        .try_init()
}

/// Try to initialize logging with an explicit filter.
///
/// A bare level such as `debug` applies to this crate only; anything else
/// is parsed as a full filter directive. Unparseable input falls back to
/// the default filter.
pub fn try_init_with_level(level: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    let directive = match level {
        "error" | "warn" | "info" | "debug" | "trace" => format!("scoped_store={level}"),
        other => other.to_string(),
    };
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| default_filter());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().compact())
        .try_init()
}
