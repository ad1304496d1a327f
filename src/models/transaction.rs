use alloy::{
    consensus::{TxEip1559, TxEip2930, TxLegacy},
    eips::eip2930::AccessList,
    primitives::{Address, Bytes, TxKind, B256, U256},
};
use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

use crate::{
    constants::DEFAULT_GAS_LIMIT,
    models::{FormatError, SigningError},
};

/// EIP-2718 transaction type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, Serialize, Deserialize)]
#[repr(u8)]
pub enum TransactionType {
    Legacy = 0,
    Eip2930 = 1,
    Eip1559 = 2,
}

impl TryFrom<Option<u8>> for TransactionType {
    type Error = FormatError;

    fn try_from(value: Option<u8>) -> Result<Self, Self::Error> {
        match value {
            None => Ok(TransactionType::Eip1559),
            Some(raw) => TransactionType::try_from_primitive(raw)
                .map_err(|e| FormatError::UnsupportedTransactionType(e.number)),
        }
    }
}

/// Caller-supplied transaction. Missing optional fields are filled by
/// [`UnsignedTransactionInput::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedTransactionInput {
    pub to: Option<Address>,
    pub value: Option<U256>,
    pub data: Option<Bytes>,
    pub gas_limit: Option<u64>,
    pub gas_price: Option<u128>,
    pub max_fee_per_gas: Option<u128>,
    pub max_priority_fee_per_gas: Option<u128>,
    pub nonce: Option<u64>,
    pub chain_id: Option<u64>,
    #[serde(rename = "type")]
    pub tx_type: Option<u8>,
    pub access_list: Option<AccessList>,
}

/// Fully defaulted unsigned transaction in its envelope type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedUnsignedTransaction {
    Legacy(TxLegacy),
    Eip2930(TxEip2930),
    Eip1559(TxEip1559),
}

impl TypedUnsignedTransaction {
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            TypedUnsignedTransaction::Legacy(_) => TransactionType::Legacy,
            TypedUnsignedTransaction::Eip2930(_) => TransactionType::Eip2930,
            TypedUnsignedTransaction::Eip1559(_) => TransactionType::Eip1559,
        }
    }
}

impl UnsignedTransactionInput {
    /// Applies the defaulting policy and selects the envelope type.
    ///
    /// The recipient is checked first: contract creation is rejected before any
    /// other field is looked at. `default_chain_id` comes from configuration and
    /// is used only when the transaction has no chain id of its own.
    pub fn resolve(
        self,
        default_chain_id: Option<u64>,
    ) -> Result<TypedUnsignedTransaction, SigningError> {
        let to = self.to.ok_or(SigningError::MissingRecipient)?;
        let chain_id = self
            .chain_id
            .or(default_chain_id)
            .ok_or(SigningError::MissingChainId)?;
        let tx_type = TransactionType::try_from(self.tx_type)?;

        let to = TxKind::Call(to);
        let nonce = self.nonce.unwrap_or_default();
        let value = self.value.unwrap_or_default();
        let input = self.data.unwrap_or_default();
        let gas_limit = self.gas_limit.unwrap_or(DEFAULT_GAS_LIMIT);
        let access_list = self.access_list.unwrap_or_default();

        let tx = match tx_type {
            TransactionType::Legacy => TypedUnsignedTransaction::Legacy(TxLegacy {
                chain_id: Some(chain_id),
                nonce,
                gas_price: self.gas_price.unwrap_or_default(),
                gas_limit,
                to,
                value,
                input,
            }),
            TransactionType::Eip2930 => TypedUnsignedTransaction::Eip2930(TxEip2930 {
                chain_id,
                nonce,
                gas_price: self.gas_price.unwrap_or_default(),
                gas_limit,
                to,
                value,
                access_list,
                input,
            }),
            TransactionType::Eip1559 => TypedUnsignedTransaction::Eip1559(TxEip1559 {
                chain_id,
                nonce,
                gas_limit,
                max_fee_per_gas: self.max_fee_per_gas.unwrap_or_default(),
                max_priority_fee_per_gas: self.max_priority_fee_per_gas.unwrap_or_default(),
                to,
                value,
                access_list,
                input,
            }),
        };

        Ok(tx)
    }
}

/// Signed transaction ready for `eth_sendRawTransaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedTransaction {
    pub transaction_type: TransactionType,
    pub hash: B256,
    /// EIP-2718 encoding (plain RLP for legacy transactions).
    pub raw: Bytes,
}
