use alloy::primitives::{uint, Address, PrimitiveSignature, B256, U256};

use crate::constants::ETH_RECOVERY_IDS;

/// Order of the secp256k1 group.
pub const SECP256K1_N: U256 =
    uint!(0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141_U256);

/// `N / 2`, the largest `s` accepted under EIP-2.
pub const SECP256K1_HALF_N: U256 =
    uint!(0x7FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF5D576E7357A4501DDFE92F46681B20A0_U256);

/// Maps `s` to the low half of the curve order (EIP-2).
///
/// Flipping `s` also flips which recovery id belongs to the signer, so the
/// recovery search must run on the normalized pair.
pub fn normalize_low_s(r: U256, s: U256) -> (U256, U256) {
    if s > SECP256K1_HALF_N {
        (r, SECP256K1_N - s)
    } else {
        (r, s)
    }
}

pub fn is_low_s(s: U256) -> bool {
    s <= SECP256K1_HALF_N
}

/// Finds the Ethereum `v` (27 or 28) for which `(digest, r, s, v)` recovers to
/// `expected`.
///
/// 27 is tried first. Returns `None` when neither candidate recovers to the
/// expected address.
pub fn recover_v(digest: &B256, r: U256, s: U256, expected: &Address) -> Option<u8> {
    ETH_RECOVERY_IDS.into_iter().find(|v| {
        let candidate = PrimitiveSignature::new(r, s, *v == 28);
        matches!(
            candidate.recover_address_from_prehash(digest),
            Ok(recovered) if recovered == *expected
        )
    })
}
