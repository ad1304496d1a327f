use alloy::primitives::Address;
use serde::Serialize;
use strum::Display;
use thiserror::Error;

/// Shape problems in caller input or in bytes returned by the KMS.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FormatError {
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Invalid digest length: expected 32 bytes, got {0}")]
    InvalidDigestLength(usize),

    #[error("Invalid hex input: {0}")]
    InvalidHex(String),

    #[error("Unsupported transaction type: {0}")]
    UnsupportedTransactionType(u8),
}

/// Failure reported by the remote key-management service.
///
/// `message` is provider text and may contain key ARNs, account ids, regions or
/// endpoints. It is only ever written to the audit log.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{name}: {message}")]
pub struct RemoteError {
    pub name: String,
    pub message: String,
}

impl RemoteError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Unsanitized signing failure. Carries the original cause and must not be
/// returned to callers; see [`SanitizedError`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SigningError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    FormatError(#[from] FormatError),

    #[error("KMS request failed: {0}")]
    RemoteError(#[from] RemoteError),

    #[error("No recovery id maps the signature back to signer address {expected}")]
    RecoveryFailed { expected: Address },

    #[error("Transaction has no recipient; contract creation is not supported")]
    MissingRecipient,

    #[error("Transaction has no chain id and no default chain id is configured")]
    MissingChainId,

    #[error("Transaction assembly error: {0}")]
    TransactionError(String),
}

impl SigningError {
    pub fn kind(&self) -> SigningErrorKind {
        match self {
            SigningError::ConfigError(_) => SigningErrorKind::Config,
            SigningError::FormatError(_) => SigningErrorKind::Format,
            SigningError::RemoteError(_) => SigningErrorKind::Remote,
            SigningError::RecoveryFailed { .. } => SigningErrorKind::Recovery,
            SigningError::MissingRecipient => SigningErrorKind::MissingRecipient,
            SigningError::MissingChainId => SigningErrorKind::MissingChainId,
            SigningError::TransactionError(_) => SigningErrorKind::Transaction,
        }
    }

    /// Determines if this error is transient (a caller retry may succeed).
    ///
    /// Only remote failures qualify; malformed input and recovery mismatches
    /// fail the same way every time.
    pub fn is_transient(&self) -> bool {
        matches!(self, SigningError::RemoteError(_))
    }
}

/// Category of a failure, safe to expose to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SigningErrorKind {
    Config,
    Format,
    Remote,
    Recovery,
    MissingRecipient,
    MissingChainId,
    Transaction,
}

/// Operation named in sanitized error messages: `"KMS <operation> failed"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "kebab-case")]
pub enum KmsOperation {
    #[strum(serialize = "public key retrieval")]
    PublicKeyRetrieval,
    #[strum(serialize = "address derivation")]
    AddressDerivation,
    #[strum(serialize = "signing")]
    Signing,
    #[strum(serialize = "transaction signing")]
    TransactionSigning,
    #[strum(serialize = "key rotation")]
    KeyRotation,
}

/// Error returned to callers of the signer.
///
/// Never carries the original cause. The message is either the fixed
/// `"KMS <operation> failed"` or, in development mode only, that text followed
/// by the original message.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{message}")]
pub struct SanitizedError {
    operation: KmsOperation,
    kind: SigningErrorKind,
    message: String,
}

impl SanitizedError {
    pub(crate) fn new(operation: KmsOperation, kind: SigningErrorKind, message: String) -> Self {
        Self {
            operation,
            kind,
            message,
        }
    }

    pub fn operation(&self) -> KmsOperation {
        self.operation
    }

    pub fn kind(&self) -> SigningErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_transient(&self) -> bool {
        self.kind == SigningErrorKind::Remote
    }
}
