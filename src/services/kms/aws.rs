use async_trait::async_trait;
use aws_config::{
    meta::region::RegionProviderChain, retry::RetryConfig, timeout::TimeoutConfig,
    BehaviorVersion, Region,
};
use aws_sdk_kms::{
    error::{DisplayErrorContext, ProvideErrorMetadata},
    primitives::Blob,
    types::{MessageType, SigningAlgorithmSpec},
    Client,
};
use std::error::Error;
use tracing::debug;

use super::{KmsClient, KmsResult};
use crate::{config::KmsSignerConfig, models::RemoteError};

/// `KmsClient` backed by AWS KMS.
#[derive(Debug, Clone)]
pub struct AwsKmsClient {
    inner: Client,
}

impl AwsKmsClient {
    /// Builds a client from the shared AWS configuration chain.
    ///
    /// The configured region wins over the default provider chain. `timeout_ms`
    /// bounds each operation; `max_retries` is handed to the SDK retry policy.
    pub async fn new(config: &KmsSignerConfig) -> Self {
        let region_provider =
            RegionProviderChain::first_try(config.region.clone().map(Region::new))
                .or_default_provider();

        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region_provider);

        if let Some(timeout) = config.timeout() {
            loader = loader
                .timeout_config(TimeoutConfig::builder().operation_timeout(timeout).build());
        }
        if let Some(max_retries) = config.max_retries {
            // The SDK counts the first attempt.
            let attempts = max_retries.saturating_add(1);
            loader = loader.retry_config(RetryConfig::standard().with_max_attempts(attempts));
        }

        let sdk_config = loader.load().await;
        Self {
            inner: Client::new(&sdk_config),
        }
    }

    pub fn from_client(inner: Client) -> Self {
        Self { inner }
    }
}

/// Keeps the service error code as the name and the full error chain as the
/// message. The message may carry the key ARN and account id.
fn remote_error<E>(error: E) -> RemoteError
where
    E: ProvideErrorMetadata + Error,
{
    let name = error.code().unwrap_or("KmsRequestError").to_string();
    RemoteError::new(name, DisplayErrorContext(&error).to_string())
}

#[async_trait]
impl KmsClient for AwsKmsClient {
    async fn get_der_public_key<'a, 'b>(&'a self, key_id: &'b str) -> KmsResult<Vec<u8>> {
        debug!("Fetching public key from AWS KMS");

        let get_output = self
            .inner
            .get_public_key()
            .key_id(key_id)
            .send()
            .await
            .map_err(remote_error)?;

        let der_pk_blob = get_output
            .public_key
            .ok_or_else(|| {
                RemoteError::new("MissingPublicKey", "No public key blob found in response")
            })?
            .into_inner();

        Ok(der_pk_blob)
    }

    async fn sign_digest<'a, 'b>(
        &'a self,
        key_id: &'b str,
        digest: [u8; 32],
    ) -> KmsResult<Vec<u8>> {
        // ECDSA_SHA_256 names the key type; with a Digest message KMS signs the
        // bytes without hashing them.
        let sign_output = self
            .inner
            .sign()
            .key_id(key_id)
            .signing_algorithm(SigningAlgorithmSpec::EcdsaSha256)
            .message_type(MessageType::Digest)
            .message(Blob::new(digest))
            .send()
            .await
            .map_err(remote_error)?;

        let der_signature = sign_output
            .signature
            .ok_or_else(|| {
                RemoteError::new("MissingSignature", "Signature not found in response")
            })?
            .into_inner();

        Ok(der_signature)
    }
}
