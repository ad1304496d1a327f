//! Logging configuration constants

/// Default log level when not specified
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default log format when not specified
pub const DEFAULT_LOG_FORMAT: &str = "compact";

/// Tracing target used for audit records and sanitized failures
pub const AUDIT_LOG_TARGET: &str = "audit";
