//! Structured logging initialization.
//!
//! One call per process from `main`. Diagnostic logs go through `tracing`;
//! the flushed trace/summary records go through the
//! [`LogSink`](crate::sink::LogSink) instead and are not affected by the
//! subscriber configuration here.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::EnvFilter;

/// Configuration for the diagnostic logging subscriber.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error).
    pub level: String,
    /// Service name reported in the initialization log line.
    pub service_name: String,
    /// JSON output (production) vs human-readable text.
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            service_name: "unknown-service".to_string(),
            json_format: true,
        }
    }
}

static LOGGING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initializes the global tracing subscriber. Idempotent: repeated calls
/// (e.g. from tests) are no-ops.
pub fn init_logging(config: Option<LoggingConfig>) {
    if LOGGING_INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }

    let config = config.unwrap_or_default();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    if config.json_format {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .flatten_event(true)
            .with_target(true)
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init();
    }

    tracing::info!(
        service = %config.service_name,
        level = %config.level,
        json = %config.json_format,
        "structured logging initialized"
    );
}
