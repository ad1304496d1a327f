use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::Display;

use crate::utils::mask_key_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AuditOperation {
    MessageSigning,
    TransactionSigning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AuditOutcome {
    Success,
}

/// Record emitted for every successful signing operation.
///
/// Holds only the masked key id; signature material is never part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    pub key_id_prefix: String,
    pub operation: AuditOperation,
    pub outcome: AuditOutcome,
}

impl AuditRecord {
    pub fn success(key_id: &str, operation: AuditOperation) -> Self {
        Self {
            timestamp: Utc::now(),
            key_id_prefix: mask_key_id(key_id),
            operation,
            outcome: AuditOutcome::Success,
        }
    }
}
