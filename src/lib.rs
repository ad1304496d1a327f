//! # KMS EVM Signer
//!
//! Produces Ethereum signatures and signed transactions with a secp256k1 key
//! held in a cloud KMS. No private key material is ever held locally.
//!
//! ```text
//! KmsSigner ── KmsClient (AWS KMS) ── DER decoding ── low-S + recovery id
//!     │
//!     └── AuditLogger (full errors, audit records)  → SanitizedError to callers
//! ```

pub mod config;
pub mod constants;
pub mod logging;
pub mod models;
pub mod services;
pub mod utils;

pub use config::{KmsSignerConfig, SignerEnvironment};
pub use models::{
    EthSignature, KeyHealth, SanitizedError, SignedTransaction, SigningError,
    UnsignedTransactionInput,
};
pub use services::{AuditLogger, AwsKmsClient, KmsClient, KmsSigner, TracingAuditLogger};
