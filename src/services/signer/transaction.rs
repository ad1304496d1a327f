//! Transaction signing: canonical unsigned encoding, Keccak-256, digest
//! signing and EIP-2718 envelope assembly.

use alloy::{
    consensus::{SignableTransaction, Signed, TxEnvelope},
    eips::eip2718::Encodable2718,
    primitives::{Bytes, PrimitiveSignature},
};
use tracing::debug;

use super::{digest::SignedDigest, KmsSigner};
use crate::{
    models::{
        AuditOperation, AuditRecord, KmsOperation, SanitizedError, SignedTransaction,
        SigningError, TransactionType, TypedUnsignedTransaction, UnsignedTransactionInput,
    },
    services::kms::KmsClient,
};

impl<C: KmsClient> KmsSigner<C> {
    /// Signs a transaction and returns its raw EIP-2718 bytes and hash.
    ///
    /// Missing fields are defaulted (EIP-1559, 21000 gas, zero value and
    /// nonce). The chain id is taken from the transaction, else from the
    /// signer configuration. Contract creation is not supported.
    pub async fn sign_transaction(
        &self,
        transaction: UnsignedTransactionInput,
    ) -> Result<SignedTransaction, SanitizedError> {
        self.sign_unsigned_transaction(transaction)
            .await
            .map_err(|e| self.fail(KmsOperation::TransactionSigning, e))
    }

    async fn sign_unsigned_transaction(
        &self,
        transaction: UnsignedTransactionInput,
    ) -> Result<SignedTransaction, SigningError> {
        let (signed, key_id) = match transaction.resolve(self.default_chain_id)? {
            TypedUnsignedTransaction::Legacy(tx) => {
                self.sign_typed(tx, TransactionType::Legacy).await?
            }
            TypedUnsignedTransaction::Eip2930(tx) => {
                self.sign_typed(tx, TransactionType::Eip2930).await?
            }
            TypedUnsignedTransaction::Eip1559(tx) => {
                self.sign_typed(tx, TransactionType::Eip1559).await?
            }
        };

        self.audit_logger.log_audit(&AuditRecord::success(
            &key_id,
            AuditOperation::TransactionSigning,
        ));
        Ok(signed)
    }

    async fn sign_typed<T>(
        &self,
        tx: T,
        transaction_type: TransactionType,
    ) -> Result<(SignedTransaction, String), SigningError>
    where
        T: SignableTransaction<PrimitiveSignature> + Send,
        TxEnvelope: From<Signed<T>>,
    {
        // Keccak-256 of the canonical unsigned encoding; signed as-is.
        let signature_hash = tx.signature_hash();
        let SignedDigest {
            signature,
            key_id,
            signer,
        } = self.sign_and_audit(signature_hash.as_slice()).await?;

        let signed = tx.into_signed(signature.to_primitive());

        let sender = signed
            .recover_signer()
            .map_err(|e| SigningError::TransactionError(e.to_string()))?;
        if sender != signer {
            return Err(SigningError::TransactionError(format!(
                "signed envelope recovers to {sender}, expected {signer}"
            )));
        }

        let hash = *signed.hash();
        let raw = TxEnvelope::from(signed).encoded_2718();

        debug!(tx_hash = %hash, tx_type = ?transaction_type, "Signed transaction");

        Ok((
            SignedTransaction {
                transaction_type,
                hash,
                raw: Bytes::from(raw),
            },
            key_id,
        ))
    }
}
