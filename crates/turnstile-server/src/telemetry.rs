//! Structured logging for the server process.
//!
//! Library crates only emit `tracing` events; the subscriber is installed
//! here once, with JSON output for log aggregation or pretty output for
//! development.

use tracing::info;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::config::{LogFormat, ServerConfig};
use crate::error::{ServerError, ServerResult};

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// configured level.
pub fn init_logging(config: &ServerConfig) -> ServerResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| ServerError::TelemetryError(format!("invalid log filter: {}", e)))?;

    let json_layer = (config.log_format == LogFormat::Json).then(|| {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
    });

    let pretty_layer = (config.log_format == LogFormat::Pretty).then(|| {
        fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
    });

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| ServerError::TelemetryError(format!("failed to set global subscriber: {}", e)))?;

    info!(
        log_level = %config.log_level,
        log_format = ?config.log_format,
        "Structured logging initialized"
    );
    Ok(())
}
