//! Health check models for the signing key.

use serde::Serialize;

/// Key health status levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// The key is reachable and its public key decodes.
    Healthy,
    /// The key could not be reached or its public key is unusable.
    Unhealthy,
}

/// Structured health report for operational dashboards.
///
/// `message` is always safe to display: unhealthy reports carry the sanitized
/// error text, never the provider error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyHealth {
    pub status: HealthStatus,
    pub message: String,
}

impl KeyHealth {
    pub fn healthy(message: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Healthy,
            message: message.into(),
        }
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            message: message.into(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}
