//! ## Sets up logging by reading configuration from environment variables.
//!
//! Environment variables used:
//! - LOG_LEVEL: log level ("trace", "debug", "info", "warn", "error"); default is "info".
//!   Ignored when RUST_LOG is set, which takes a full filter directive instead.
//! - LOG_FORMAT: "compact" (default), "pretty" or "json"

use std::env;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::constants::{DEFAULT_LOG_FORMAT, DEFAULT_LOG_LEVEL};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Compact,
        }
    }
}

/// Normalizes a LOG_LEVEL value. Unknown levels fall back to the default.
pub fn resolve_log_level(value: Option<&str>) -> &'static str {
    match value.map(|v| v.trim().to_lowercase()).as_deref() {
        Some("trace") => "trace",
        Some("debug") => "debug",
        Some("info") => "info",
        Some("warn") | Some("warning") => "warn",
        Some("error") => "error",
        _ => DEFAULT_LOG_LEVEL,
    }
}

pub fn resolve_log_format(value: Option<&str>) -> LogFormat {
    LogFormat::parse(value.unwrap_or(DEFAULT_LOG_FORMAT))
}

/// Installs the global tracing subscriber.
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn setup_logging() {
    let log_level = resolve_log_level(env::var("LOG_LEVEL").ok().as_deref());
    let log_format = resolve_log_format(env::var("LOG_FORMAT").ok().as_deref());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match log_format {
        LogFormat::Json => builder.json().with_current_span(false).try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };

    if installed.is_ok() {
        info!(level = log_level, format = ?log_format, "Logging is successfully configured");
    }
}
