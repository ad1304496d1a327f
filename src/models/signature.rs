use alloy::primitives::{Address, PrimitiveSignature, SignatureError, B256, U256};
use serde::Serialize;

/// Ethereum signature in `(r, s, v)` form with `v` in {27, 28}.
///
/// Always low-S (EIP-2) when produced by the signer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EthSignature {
    pub r: B256,
    pub s: B256,
    pub v: u8,
}

impl EthSignature {
    pub fn new(r: U256, s: U256, v: u8) -> Self {
        Self {
            r: B256::from(r),
            s: B256::from(s),
            v,
        }
    }

    pub fn r(&self) -> U256 {
        U256::from_be_bytes(self.r.0)
    }

    pub fn s(&self) -> U256 {
        U256::from_be_bytes(self.s.0)
    }

    /// Parity bit used by typed transaction envelopes (v 28 -> true).
    pub fn y_parity(&self) -> bool {
        self.v == 28
    }

    /// 65-byte `r || s || v` encoding.
    pub fn as_bytes(&self) -> [u8; 65] {
        let mut bytes = [0u8; 65];
        bytes[..32].copy_from_slice(self.r.as_slice());
        bytes[32..64].copy_from_slice(self.s.as_slice());
        bytes[64] = self.v;
        bytes
    }

    pub fn to_primitive(&self) -> PrimitiveSignature {
        PrimitiveSignature::new(self.r(), self.s(), self.y_parity())
    }

    /// Recovers the signer address from a 32-byte prehash.
    pub fn recover_address(&self, digest: &B256) -> Result<Address, SignatureError> {
        self.to_primitive().recover_address_from_prehash(digest)
    }
}

impl From<EthSignature> for PrimitiveSignature {
    fn from(signature: EthSignature) -> Self {
        signature.to_primitive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_bytes_layout() {
        let signature = EthSignature::new(U256::from(1u64), U256::from(2u64), 28);
        let bytes = signature.as_bytes();

        assert_eq!(bytes.len(), 65);
        assert_eq!(bytes[31], 1);
        assert_eq!(bytes[63], 2);
        assert_eq!(bytes[64], 28);
        assert!(bytes[..31].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_y_parity() {
        assert!(!EthSignature::new(U256::from(1u64), U256::from(1u64), 27).y_parity());
        assert!(EthSignature::new(U256::from(1u64), U256::from(1u64), 28).y_parity());
    }

    #[test]
    fn test_scalar_round_trip() {
        let r = U256::from(0xdead_beefu64);
        let s = U256::MAX >> 1;
        let signature = EthSignature::new(r, s, 27);

        assert_eq!(signature.r(), r);
        assert_eq!(signature.s(), s);
        assert_eq!(signature.to_primitive().r(), r);
        assert_eq!(signature.to_primitive().s(), s);
    }
}
