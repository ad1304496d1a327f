//! Shared fixtures for the signer unit tests.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use k256::{ecdsa::SigningKey, pkcs8::EncodePublicKey};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use super::KmsSigner;
use crate::{
    config::KmsSignerConfig,
    models::{AuditRecord, KmsOperation, RemoteError, SigningError},
    services::{
        audit::{AuditLogger, MockAuditLogger},
        kms::{KmsClient, KmsResult, MockKmsClient},
    },
    utils::{derive_address_from_der, SECP256K1_N},
};

pub const TEST_KEY_ID: &str = "test-key-id";
pub const ROTATED_KEY_ID: &str = "rotated-key-id";
pub const TEST_CHAIN_ID: u64 = 137;

pub fn test_key() -> SigningKey {
    SigningKey::from_slice(&[0x2a; 32]).unwrap()
}

pub fn other_key() -> SigningKey {
    SigningKey::from_slice(&[0x3b; 32]).unwrap()
}

pub fn der_public_key(key: &SigningKey) -> Vec<u8> {
    key.verifying_key()
        .to_public_key_der()
        .unwrap()
        .as_bytes()
        .to_vec()
}

pub fn address_of(key: &SigningKey) -> Address {
    derive_address_from_der(&der_public_key(key)).unwrap()
}

fn scalars(key: &SigningKey, digest: &[u8; 32]) -> (U256, U256) {
    let (signature, _) = key.sign_prehash_recoverable(digest).unwrap();
    (
        U256::from_be_slice(signature.r().to_bytes().as_slice()),
        U256::from_be_slice(signature.s().to_bytes().as_slice()),
    )
}

fn der_integer(value: U256) -> Vec<u8> {
    let bytes = value.to_be_bytes::<32>();
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(31);
    let mut content = bytes[start..].to_vec();
    if content[0] & 0x80 != 0 {
        content.insert(0, 0);
    }
    let mut encoded = vec![0x02, content.len() as u8];
    encoded.extend(content);
    encoded
}

pub fn der_signature(r: U256, s: U256) -> Vec<u8> {
    let mut body = der_integer(r);
    body.extend(der_integer(s));
    let mut encoded = vec![0x30, body.len() as u8];
    encoded.extend(body);
    encoded
}

/// DER signature as a KMS returns it: low or high S, whatever the signer produced.
pub fn der_sign(key: &SigningKey, digest: &[u8; 32]) -> Vec<u8> {
    let (r, s) = scalars(key, digest);
    der_signature(r, s)
}

/// Same signature with `s` replaced by `N - s`.
pub fn der_sign_high_s(key: &SigningKey, digest: &[u8; 32]) -> Vec<u8> {
    let (r, s) = scalars(key, digest);
    der_signature(r, SECP256K1_N - s)
}

pub fn access_denied() -> RemoteError {
    RemoteError::new(
        "AccessDeniedException",
        "User arn:aws:iam::123456789012:user/ci is not authorized to perform kms:Sign on \
         arn:aws:kms:us-east-1:123456789012:key/1234abcd-12ab-34cd-56ef-1234567890ab",
    )
}

/// KMS mock backed by a real k256 key.
pub fn mock_kms_client(key: &SigningKey) -> MockKmsClient {
    let mut client = MockKmsClient::new();
    client
        .expect_get_der_public_key()
        .return_const(Ok(der_public_key(key)));

    let signing_key = key.clone();
    client
        .expect_sign_digest()
        .returning(move |_, digest| Ok(der_sign(&signing_key, &digest)));
    client
}

pub fn quiet_logger() -> Arc<dyn AuditLogger> {
    let mut logger = MockAuditLogger::new();
    logger.expect_log_error().return_const(());
    logger.expect_log_audit().return_const(());
    logger.expect_log_key_rotation().return_const(());
    Arc::new(logger)
}

pub fn test_signer<C: KmsClient>(client: C, logger: Arc<dyn AuditLogger>) -> KmsSigner<C> {
    let config = KmsSignerConfig::new(TEST_KEY_ID).with_chain_id(TEST_CHAIN_ID);
    KmsSigner::with_audit_logger(config, client, logger).unwrap()
}

/// Logger that keeps what it is given, for order and content assertions.
#[derive(Clone, Default)]
pub struct RecordingLogger {
    errors: Arc<Mutex<Vec<(KmsOperation, SigningError)>>>,
    records: Arc<Mutex<Vec<AuditRecord>>>,
}

impl RecordingLogger {
    pub fn error_operations(&self) -> Vec<KmsOperation> {
        self.errors
            .lock()
            .unwrap()
            .iter()
            .map(|(operation, _)| *operation)
            .collect()
    }

    pub fn errors(&self) -> Vec<(KmsOperation, SigningError)> {
        self.errors.lock().unwrap().clone()
    }

    pub fn audit_records(&self) -> Vec<AuditRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl AuditLogger for RecordingLogger {
    fn log_error(&self, operation: KmsOperation, error: &SigningError) {
        self.errors.lock().unwrap().push((operation, error.clone()));
    }

    fn log_audit(&self, record: &AuditRecord) {
        self.records.lock().unwrap().push(record.clone());
    }

    fn log_key_rotation(&self, _old_key_id: &str, _new_key_id: &str) {}
}

/// Holds the public key fetch for `TEST_KEY_ID` open until released.
#[derive(Default)]
pub struct Gate {
    requested: Notify,
    opened: Notify,
}

impl Gate {
    pub async fn wait_until_requested(&self) {
        self.requested.notified().await;
    }

    pub fn open(&self) {
        self.opened.notify_one();
    }
}

pub struct GatedKmsClient {
    gate: Arc<Gate>,
    gated_der: Vec<u8>,
    other_der: Vec<u8>,
}

impl GatedKmsClient {
    pub fn new(gated_der: Vec<u8>, other_der: Vec<u8>) -> (Self, Arc<Gate>) {
        let gate = Arc::new(Gate::default());
        (
            Self {
                gate: Arc::clone(&gate),
                gated_der,
                other_der,
            },
            gate,
        )
    }
}

#[async_trait]
impl KmsClient for GatedKmsClient {
    async fn get_der_public_key<'a, 'b>(&'a self, key_id: &'b str) -> KmsResult<Vec<u8>> {
        if key_id != TEST_KEY_ID {
            return Ok(self.other_der.clone());
        }
        self.gate.requested.notify_one();
        self.gate.opened.notified().await;
        Ok(self.gated_der.clone())
    }

    async fn sign_digest<'a, 'b>(
        &'a self,
        _key_id: &'b str,
        _digest: [u8; 32],
    ) -> KmsResult<Vec<u8>> {
        Err(RemoteError::new("UnsupportedOperation", "gated client does not sign"))
    }
}
