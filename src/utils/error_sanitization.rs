//! Error sanitization for signer failures.
//!
//! Callers only ever see `"KMS <operation> failed"`. The original error, which
//! may carry key ARNs, account ids, regions or endpoints, goes to the audit log
//! and, in development mode only, is appended to the message for
//! troubleshooting.

use crate::{
    config::SignerEnvironment,
    constants::KEY_ID_PREFIX_LENGTH,
    models::{KmsOperation, SanitizedError, SigningError},
};

/// Converts an internal signing error into the error returned to callers.
pub fn sanitize_signing_error(
    operation: KmsOperation,
    error: &SigningError,
    environment: SignerEnvironment,
) -> SanitizedError {
    let message = if environment.is_development() {
        format!("KMS {operation} failed: {error}")
    } else {
        format!("KMS {operation} failed")
    };

    SanitizedError::new(operation, error.kind(), message)
}

/// Shortens a key identifier for logging: first 8 characters followed by `...`.
pub fn mask_key_id(key_id: &str) -> String {
    let prefix: String = key_id.chars().take(KEY_ID_PREFIX_LENGTH).collect();
    format!("{prefix}...")
}
