//! Derivation of Ethereum addresses from secp256k1 public keys.

use alloy::primitives::{keccak256, Address};

use super::der::decode_public_key_info;
use crate::models::FormatError;

/// Derive the Ethereum address of an uncompressed public key.
///
/// Only the 64 coordinate bytes are hashed; the leading `0x04` marker is not
/// part of the Keccak-256 input.
pub fn derive_address(public_key: &[u8; 65]) -> Address {
    let hash = keccak256(&public_key[1..]);

    // Take the last 20 bytes of the hash
    Address::from_slice(&hash[12..])
}

/// Derive the Ethereum address from a DER `SubjectPublicKeyInfo` payload.
pub fn derive_address_from_der(der: &[u8]) -> Result<Address, FormatError> {
    let public_key = decode_public_key_info(der)?;
    Ok(derive_address(&public_key))
}

/// EIP-55 mixed-case rendering of an address.
pub fn to_checksum_address(address: &Address) -> String {
    address.to_checksum(None)
}
