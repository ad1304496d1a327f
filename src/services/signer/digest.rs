//! Digest signing: remote ECDSA, DER decoding, low-S normalization and the
//! recovery id search.

use alloy::primitives::{Address, B256};

use super::KmsSigner;
use crate::{
    constants::DIGEST_LENGTH,
    models::{
        AuditOperation, AuditRecord, EthSignature, FormatError, KmsOperation, SanitizedError,
        SigningError,
    },
    services::kms::KmsClient,
    utils::{decode_ecdsa_signature, normalize_low_s, recover_v},
};

/// Signature over a digest together with the key that produced it.
#[derive(Debug, Clone)]
pub(super) struct SignedDigest {
    pub signature: EthSignature,
    pub key_id: String,
    pub signer: Address,
}

impl<C: KmsClient> KmsSigner<C> {
    /// Signs a 32-byte digest. The digest is signed as given, without hashing.
    pub async fn sign(&self, digest: &[u8]) -> Result<EthSignature, SanitizedError> {
        self.sign_and_audit(digest)
            .await
            .map(|signed| signed.signature)
            .map_err(|e| self.sanitize(KmsOperation::Signing, &e))
    }

    /// Hex form of [`KmsSigner::sign`]; the `0x` or `0X` prefix is optional.
    pub async fn sign_hex(&self, digest: &str) -> Result<EthSignature, SanitizedError> {
        let hex_digest = digest
            .strip_prefix("0x")
            .or_else(|| digest.strip_prefix("0X"))
            .unwrap_or(digest);
        let bytes = hex::decode(hex_digest).map_err(|e| {
            self.fail(
                KmsOperation::Signing,
                FormatError::InvalidHex(e.to_string()).into(),
            )
        })?;

        self.sign(&bytes).await
    }

    /// Signs `digest`, logging a failure under `signing` and auditing a success.
    pub(super) async fn sign_and_audit(&self, digest: &[u8]) -> Result<SignedDigest, SigningError> {
        match self.sign_digest(digest).await {
            Ok(signed) => {
                self.audit_logger.log_audit(&AuditRecord::success(
                    &signed.key_id,
                    AuditOperation::MessageSigning,
                ));
                Ok(signed)
            }
            Err(e) => {
                self.audit_logger.log_error(KmsOperation::Signing, &e);
                Err(e)
            }
        }
    }

    async fn sign_digest(&self, digest: &[u8]) -> Result<SignedDigest, SigningError> {
        let digest: [u8; DIGEST_LENGTH] = digest
            .try_into()
            .map_err(|_| FormatError::InvalidDigestLength(digest.len()))?;

        // Key id and address come from one snapshot so a concurrent rotation
        // cannot pair a signature with the other key's address.
        let snapshot = self.snapshot().await;
        let signer = self.address_for(&snapshot).await?;

        let der_signature = self.client.sign_digest(&snapshot.key_id, digest).await?;
        let (r, s) = decode_ecdsa_signature(&der_signature)?;
        let (r, s) = normalize_low_s(r, s);

        let v = recover_v(&B256::from(digest), r, s, &signer)
            .ok_or(SigningError::RecoveryFailed { expected: signer })?;

        Ok(SignedDigest {
            signature: EthSignature::new(r, s, v),
            key_id: snapshot.key_id,
            signer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::*;
    use crate::{
        models::{AuditOutcome, SigningErrorKind},
        services::{audit::MockAuditLogger, kms::MockKmsClient},
        utils::{is_low_s, SECP256K1_N},
    };
    use alloy::primitives::{keccak256, B256, U256};
    use mockall::predicate::eq;
    use std::sync::Arc;

    fn digest() -> [u8; 32] {
        keccak256(b"payment 42").0
    }

    #[tokio::test]
    async fn test_sign_recovers_to_signer_address() {
        let key = test_key();
        let signer = test_signer(mock_kms_client(&key), quiet_logger());

        let signature = signer.sign(&digest()).await.unwrap();

        assert!(signature.v == 27 || signature.v == 28);
        assert!(is_low_s(signature.s()));
        assert_eq!(
            signature.recover_address(&B256::from(digest())).unwrap(),
            signer.get_address().await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_sign_normalizes_high_s() {
        let key = test_key();
        let mut client = MockKmsClient::new();
        client
            .expect_get_der_public_key()
            .return_const(Ok(der_public_key(&key)));
        let signing_key = key.clone();
        client
            .expect_sign_digest()
            .returning(move |_, digest| Ok(der_sign_high_s(&signing_key, &digest)));

        let signer = test_signer(client, quiet_logger());

        let signature = signer.sign(&digest()).await.unwrap();

        assert!(is_low_s(signature.s()));
        assert!(signature.s() < SECP256K1_N);
        assert_eq!(
            signature.recover_address(&B256::from(digest())).unwrap(),
            address_of(&key)
        );
    }

    #[tokio::test]
    async fn test_sign_hex_accepts_optional_prefix() {
        let key = test_key();
        let signer = test_signer(mock_kms_client(&key), quiet_logger());

        let plain = hex::encode(digest());
        let prefixed = format!("0x{plain}");
        let upper_prefixed = format!("0X{plain}");

        let a = signer.sign_hex(&plain).await.unwrap();
        let b = signer.sign_hex(&prefixed).await.unwrap();
        let c = signer.sign_hex(&upper_prefixed).await.unwrap();

        // RFC 6979 signatures are deterministic.
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[tokio::test]
    async fn test_sign_hex_rejects_bad_input_without_remote_call() {
        let mut client = MockKmsClient::new();
        client.expect_get_der_public_key().never();
        client.expect_sign_digest().never();

        let signer = test_signer(client, quiet_logger());

        for input in ["not-a-hex-digest", "0x1234"] {
            let error = signer.sign_hex(input).await.unwrap_err();
            assert_eq!(error.message(), "KMS signing failed");
            assert_eq!(error.kind(), SigningErrorKind::Format);
        }
    }

    #[tokio::test]
    async fn test_sign_rejects_wrong_digest_length() {
        let mut client = MockKmsClient::new();
        client.expect_sign_digest().never();

        let signer = test_signer(client, quiet_logger());

        let error = signer.sign(&[0u8; 31]).await.unwrap_err();

        assert_eq!(error.to_string(), "KMS signing failed");
    }

    #[tokio::test]
    async fn test_sign_fails_when_signature_is_from_another_key() {
        let key = test_key();
        let impostor = other_key();

        let mut client = MockKmsClient::new();
        client
            .expect_get_der_public_key()
            .return_const(Ok(der_public_key(&key)));
        client
            .expect_sign_digest()
            .returning(move |_, digest| Ok(der_sign(&impostor, &digest)));

        let logger = RecordingLogger::default();
        let signer = test_signer(client, Arc::new(logger.clone()));

        let error = signer.sign(&digest()).await.unwrap_err();

        assert_eq!(error.kind(), SigningErrorKind::Recovery);
        assert_eq!(error.message(), "KMS signing failed");
        assert!(logger.audit_records().is_empty());
    }

    #[tokio::test]
    async fn test_sign_rejects_malformed_kms_signature() {
        let key = test_key();
        let mut client = MockKmsClient::new();
        client
            .expect_get_der_public_key()
            .return_const(Ok(der_public_key(&key)));
        client
            .expect_sign_digest()
            .return_const(Ok(vec![0x30, 0x00]));

        let signer = test_signer(client, quiet_logger());

        let error = signer.sign(&digest()).await.unwrap_err();

        assert_eq!(error.kind(), SigningErrorKind::Format);
    }

    #[tokio::test]
    async fn test_sign_uses_current_key_id() {
        let key = test_key();
        let mut client = MockKmsClient::new();
        client
            .expect_get_der_public_key()
            .with(eq(TEST_KEY_ID))
            .return_const(Ok(der_public_key(&key)));
        let signing_key = key.clone();
        client
            .expect_sign_digest()
            .withf(|key_id, _| key_id == TEST_KEY_ID)
            .times(1)
            .returning(move |_, digest| Ok(der_sign(&signing_key, &digest)));

        let signer = test_signer(client, quiet_logger());

        signer.sign(&digest()).await.unwrap();
    }

    #[tokio::test]
    async fn test_remote_sign_error_is_sanitized() {
        let key = test_key();
        let mut client = MockKmsClient::new();
        client
            .expect_get_der_public_key()
            .return_const(Ok(der_public_key(&key)));
        client
            .expect_sign_digest()
            .return_const(Err(access_denied()));

        let mut logger = MockAuditLogger::new();
        logger
            .expect_log_error()
            .withf(|operation, error| {
                *operation == crate::models::KmsOperation::Signing
                    && error.to_string().contains("123456789012")
            })
            .times(1)
            .return_const(());
        logger.expect_log_audit().never();

        let signer = test_signer(client, Arc::new(logger));

        let error = signer.sign(&digest()).await.unwrap_err();

        assert_eq!(error.message(), "KMS signing failed");
        assert!(!error.message().contains("arn:aws"));
    }

    #[tokio::test]
    async fn test_audit_record_has_no_signature_material() {
        let key = test_key();
        let logger = RecordingLogger::default();
        let signer = test_signer(mock_kms_client(&key), Arc::new(logger.clone()));

        let signature = signer.sign(&digest()).await.unwrap();

        let records = logger.audit_records();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.key_id_prefix, "test-key...");
        assert_eq!(record.outcome, AuditOutcome::Success);

        let json = serde_json::to_string(record).unwrap();
        let r_hex = hex::encode(signature.r);
        let s_hex = hex::encode(signature.s);
        assert!(!json.contains(&r_hex));
        assert!(!json.contains(&s_hex));
        assert!(!json.contains(TEST_KEY_ID));
        assert!(!json.contains("signature"));
    }

    #[tokio::test]
    async fn test_every_signature_is_low_s() {
        let key = test_key();
        let signer = test_signer(mock_kms_client(&key), quiet_logger());

        for i in 0u64..16 {
            let digest = keccak256(U256::from(i).to_be_bytes::<32>());
            let signature = signer.sign(digest.as_slice()).await.unwrap();
            assert!(is_low_s(signature.s()));
        }
    }
}
