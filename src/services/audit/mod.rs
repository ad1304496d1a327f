//! Audit and error logging for the signer.
//!
//! The signer hands every unsanitized failure and every successful signing to
//! an [`AuditLogger`] before anything is returned to the caller.

use tracing::{error, info, warn};

use crate::{
    constants::AUDIT_LOG_TARGET,
    models::{AuditRecord, KmsOperation, SigningError},
};

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
pub trait AuditLogger: Send + Sync {
    /// Records the original error of a failed operation.
    ///
    /// Receives the full cause, including provider messages; implementations
    /// must route it to a restricted sink.
    fn log_error(&self, operation: KmsOperation, error: &SigningError);

    /// Records a successful signing operation.
    fn log_audit(&self, record: &AuditRecord);

    /// Records a key rotation. Both ids are already masked.
    fn log_key_rotation(&self, old_key_id: &str, new_key_id: &str);
}

/// `AuditLogger` writing to the global `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditLogger;

impl AuditLogger for TracingAuditLogger {
    fn log_error(&self, operation: KmsOperation, error: &SigningError) {
        error!(
            target: AUDIT_LOG_TARGET,
            operation = %operation,
            kind = %error.kind(),
            error = ?error,
            "KMS {} failed", operation
        );
    }

    fn log_audit(&self, record: &AuditRecord) {
        info!(
            target: AUDIT_LOG_TARGET,
            timestamp = %record.timestamp.to_rfc3339(),
            key_id_prefix = %record.key_id_prefix,
            operation = %record.operation,
            outcome = %record.outcome,
            "KMS signing operation completed"
        );
    }

    fn log_key_rotation(&self, old_key_id: &str, new_key_id: &str) {
        warn!(
            target: AUDIT_LOG_TARGET,
            old_key_id = %old_key_id,
            new_key_id = %new_key_id,
            "Rotating KMS signing key"
        );
    }
}
