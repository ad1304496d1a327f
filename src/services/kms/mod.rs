//! # KMS Client Module
//!
//! Boundary between the signer and the remote key-management service. The
//! signer only needs two calls, both keyed by the key id it currently holds:
//!
//! ```text
//! KmsClient
//!   ├── get_der_public_key  (DER SubjectPublicKeyInfo)
//!   └── sign_digest         (DER ECDSA-Sig-Value over a 32-byte digest)
//! ```
//!
//! `AwsKmsClient` implements it over `aws-sdk-kms`. `KmsClient` is mocked with
//! `mockall` for unit testing and injected into `KmsSigner`.

mod aws;
pub use aws::*;

use async_trait::async_trait;

use crate::models::RemoteError;

#[cfg(test)]
use mockall::automock;

pub type KmsResult<T> = Result<T, RemoteError>;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait KmsClient: Send + Sync {
    /// Fetches the DER-encoded public key of `key_id`.
    async fn get_der_public_key<'a, 'b>(&'a self, key_id: &'b str) -> KmsResult<Vec<u8>>;

    /// Signs a 32-byte digest with `key_id`. Returns a DER-encoded signature.
    ///
    /// The digest is signed as-is; implementations must not hash it again.
    async fn sign_digest<'a, 'b>(
        &'a self,
        key_id: &'b str,
        digest: [u8; 32],
    ) -> KmsResult<Vec<u8>>;
}
