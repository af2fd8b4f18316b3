//! Telemetry and observability setup
//!
//! Configures structured logging with tracing and tracing-subscriber. The
//! service only writes to stdout; shipping the JSON stream to a log store is
//! left to whatever runs the process.

use crate::cli::LogFormat;
use std::sync::Once;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Initialize tracing subscriber for structured logging
///
/// This can only be called once per process. Subsequent calls are silently ignored.
///
/// Reads log level from RUST_LOG environment variable, defaulting to
/// `default_level` for this crate.
///
/// # Examples
///
/// ```no_run
/// use slowtask::cli::LogFormat;
///
/// slowtask::telemetry::init("info", LogFormat::Json);
/// tracing::info!("Application started");
/// ```
pub fn init(default_level: &str, format: LogFormat) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(default_level));
        let registry = tracing_subscriber::registry().with(filter);

        match format {
            LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
            LogFormat::Compact => registry
                .with(tracing_subscriber::fmt::layer().compact())
                .init(),
            LogFormat::Json => registry
                .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
                .init(),
        }
    });
}

fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!("slowtask={},tower_http=debug", level))
}
