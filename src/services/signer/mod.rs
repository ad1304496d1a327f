//! # KMS Signer
//!
//! Ethereum signing engine over a remote KMS key. Holds no private key
//! material; the KMS produces raw ECDSA signatures and the signer turns them
//! into Ethereum signatures and signed transactions.
//!
//! ```text
//! KmsSigner
//!   ├── Key access       get_public_key, get_address, clear_cache, rotate_key
//!   ├── Digest signing   sign, sign_hex               (digest.rs)
//!   ├── Transactions     sign_transaction             (transaction.rs)
//!   └── Health           is_key_healthy, health_check
//! ```
//!
//! Every failure is handed, unsanitized, to the [`AuditLogger`] and returned
//! to the caller as a [`SanitizedError`].

mod digest;
mod key_state;
mod transaction;

#[cfg(test)]
mod test_utils;

use key_state::{KeySnapshot, KeyState};

use alloy::primitives::Address;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::{
    config::{KmsSignerConfig, SignerEnvironment},
    constants::HEALTHY_KEY_MESSAGE,
    models::{KeyHealth, KmsOperation, SanitizedError, SigningError},
    services::{
        audit::{AuditLogger, TracingAuditLogger},
        kms::{AwsKmsClient, KmsClient},
    },
    utils::{decode_public_key_info, derive_address, mask_key_id, sanitize_signing_error},
};

pub struct KmsSigner<C: KmsClient = AwsKmsClient> {
    client: C,
    audit_logger: Arc<dyn AuditLogger>,
    state: RwLock<KeyState>,
    environment: SignerEnvironment,
    default_chain_id: Option<u64>,
}

impl KmsSigner<AwsKmsClient> {
    /// Builds a signer backed by AWS KMS.
    pub async fn from_config(config: KmsSignerConfig) -> Result<Self, SigningError> {
        config.validate_config()?;
        let client = AwsKmsClient::new(&config).await;
        Self::new(config, client)
    }
}

impl<C: KmsClient> KmsSigner<C> {
    /// Creates a signer that logs through `tracing`.
    pub fn new(config: KmsSignerConfig, client: C) -> Result<Self, SigningError> {
        Self::with_audit_logger(config, client, Arc::new(TracingAuditLogger))
    }

    pub fn with_audit_logger(
        config: KmsSignerConfig,
        client: C,
        audit_logger: Arc<dyn AuditLogger>,
    ) -> Result<Self, SigningError> {
        config.validate_config()?;

        info!(
            key_id = %mask_key_id(&config.key_id),
            environment = ?config.environment,
            "Initialized KMS signer"
        );

        Ok(Self {
            client,
            audit_logger,
            state: RwLock::new(KeyState::new(config.key_id)),
            environment: config.environment,
            default_chain_id: config.chain_id,
        })
    }

    /// Returns the 65-byte uncompressed public key of the active key.
    ///
    /// Served from cache after the first successful fetch.
    pub async fn get_public_key(&self) -> Result<[u8; 65], SanitizedError> {
        let snapshot = self.snapshot().await;
        self.public_key_for(&snapshot)
            .await
            .map_err(|e| self.fail(KmsOperation::PublicKeyRetrieval, e))
    }

    /// Returns the Ethereum address of the active key.
    pub async fn get_address(&self) -> Result<Address, SanitizedError> {
        let snapshot = self.snapshot().await;
        self.address_for(&snapshot)
            .await
            .map_err(|e| self.fail(KmsOperation::AddressDerivation, e))
    }

    /// Drops the cached public key and address.
    pub async fn clear_cache(&self) {
        self.state.write().await.invalidate();
        debug!("Cleared cached KMS public key and address");
    }

    /// Switches signing to `new_key_id`. The next key access fetches from the
    /// remote under the new id.
    pub async fn rotate_key(&self, new_key_id: &str) -> Result<(), SanitizedError> {
        if new_key_id.trim().is_empty() {
            return Err(self.fail(
                KmsOperation::KeyRotation,
                SigningError::ConfigError("New key ID cannot be empty".to_string()),
            ));
        }

        let old_key_id = self.state.write().await.rotate(new_key_id.to_string());

        self.audit_logger
            .log_key_rotation(&mask_key_id(&old_key_id), &mask_key_id(new_key_id));
        Ok(())
    }

    pub async fn is_key_healthy(&self) -> bool {
        self.get_public_key().await.is_ok()
    }

    pub async fn health_check(&self) -> KeyHealth {
        match self.get_public_key().await {
            Ok(_) => KeyHealth::healthy(HEALTHY_KEY_MESSAGE),
            Err(e) => KeyHealth::unhealthy(e.message()),
        }
    }

    async fn snapshot(&self) -> KeySnapshot {
        self.state.read().await.snapshot()
    }

    /// Public key for the key named in `snapshot`. The lock is not held while
    /// the remote call is in flight.
    async fn public_key_for(&self, snapshot: &KeySnapshot) -> Result<[u8; 65], SigningError> {
        if let Some(public_key) = snapshot.public_key {
            return Ok(public_key);
        }

        let der = self.client.get_der_public_key(&snapshot.key_id).await?;
        let public_key = decode_public_key_info(&der)?;

        if !self
            .state
            .write()
            .await
            .store_public_key(snapshot.generation, public_key)
        {
            debug!("Discarded public key fetched before a key change");
        }
        Ok(public_key)
    }

    /// Address for the key named in `snapshot`. A public key failure is
    /// logged here as a retrieval failure; the caller logs it again under its
    /// own operation.
    async fn address_for(&self, snapshot: &KeySnapshot) -> Result<Address, SigningError> {
        if let Some(address) = snapshot.address {
            return Ok(address);
        }

        let public_key = self
            .public_key_for(snapshot)
            .await
            .inspect_err(|e| self.audit_logger.log_error(KmsOperation::PublicKeyRetrieval, e))?;
        let address = derive_address(&public_key);

        self.state
            .write()
            .await
            .store_address(snapshot.generation, address);
        Ok(address)
    }

    fn fail(&self, operation: KmsOperation, error: SigningError) -> SanitizedError {
        self.audit_logger.log_error(operation, &error);
        self.sanitize(operation, &error)
    }

    fn sanitize(&self, operation: KmsOperation, error: &SigningError) -> SanitizedError {
        sanitize_signing_error(operation, error, self.environment)
    }
}
