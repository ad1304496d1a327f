//! DER decoding for the two structures a KMS hands back: the
//! `SubjectPublicKeyInfo` of a secp256k1 key and an ECDSA signature.

use alloy::primitives::U256;
use simple_asn1::{oid, ASN1Block};

use crate::{
    constants::{UNCOMPRESSED_POINT_MARKER, UNCOMPRESSED_PUBLIC_KEY_LENGTH},
    models::FormatError,
    utils::SECP256K1_N,
};

/// Extracts the 65-byte uncompressed point from a DER `SubjectPublicKeyInfo`.
///
/// ```text
/// SEQUENCE {
///   SEQUENCE { OID id-ecPublicKey, OID secp256k1 }
///   BIT STRING 04 || X || Y
/// }
/// ```
pub fn decode_public_key_info(der: &[u8]) -> Result<[u8; 65], FormatError> {
    let blocks = simple_asn1::from_der(der)
        .map_err(|e| FormatError::InvalidPublicKey(format!("ASN.1 parse error: {e}")))?;

    let fields = match blocks.as_slice() {
        [ASN1Block::Sequence(_, fields)] => fields,
        _ => {
            return Err(FormatError::InvalidPublicKey(
                "expected a single SubjectPublicKeyInfo SEQUENCE".to_string(),
            ))
        }
    };

    let (algorithm, point) = match fields.as_slice() {
        [ASN1Block::Sequence(_, algorithm), ASN1Block::BitString(_, _, point)] => {
            (algorithm, point)
        }
        _ => {
            return Err(FormatError::InvalidPublicKey(
                "expected AlgorithmIdentifier and BIT STRING".to_string(),
            ))
        }
    };

    validate_algorithm(algorithm)?;

    if point.len() != UNCOMPRESSED_PUBLIC_KEY_LENGTH {
        return Err(FormatError::InvalidPublicKey(format!(
            "expected {} byte uncompressed point, got {} bytes",
            UNCOMPRESSED_PUBLIC_KEY_LENGTH,
            point.len()
        )));
    }
    if point[0] != UNCOMPRESSED_POINT_MARKER {
        return Err(FormatError::InvalidPublicKey(format!(
            "expected uncompressed point marker 0x04, got 0x{:02x}",
            point[0]
        )));
    }

    let mut public_key = [0u8; UNCOMPRESSED_PUBLIC_KEY_LENGTH];
    public_key.copy_from_slice(point);
    Ok(public_key)
}

/// Object identifiers in the AlgorithmIdentifier must name an EC key on secp256k1.
fn validate_algorithm(algorithm: &[ASN1Block]) -> Result<(), FormatError> {
    let ec_public_key = oid!(1, 2, 840, 10045, 2, 1);
    let secp256k1 = oid!(1, 3, 132, 0, 10);

    match algorithm {
        [ASN1Block::ObjectIdentifier(_, key_type), ASN1Block::ObjectIdentifier(_, curve)]
            if *key_type == ec_public_key && *curve == secp256k1 =>
        {
            Ok(())
        }
        _ => Err(FormatError::InvalidPublicKey(
            "key is not an id-ecPublicKey on secp256k1".to_string(),
        )),
    }
}

/// Decodes a DER `SEQUENCE { INTEGER r, INTEGER s }` into 256-bit scalars.
///
/// The leading zero byte DER adds to integers with the high bit set is
/// accepted; anything other than exactly two positive integers below the curve
/// order is rejected.
pub fn decode_ecdsa_signature(der: &[u8]) -> Result<(U256, U256), FormatError> {
    let blocks = simple_asn1::from_der(der)
        .map_err(|e| FormatError::InvalidSignature(format!("ASN.1 parse error: {e}")))?;

    let (r, s) = match blocks.as_slice() {
        [ASN1Block::Sequence(_, fields)] => match fields.as_slice() {
            [ASN1Block::Integer(_, r), ASN1Block::Integer(_, s)] => (r, s),
            _ => {
                return Err(FormatError::InvalidSignature(
                    "expected a SEQUENCE of exactly two INTEGERs".to_string(),
                ))
            }
        },
        _ => {
            return Err(FormatError::InvalidSignature(
                "expected a single SEQUENCE".to_string(),
            ))
        }
    };

    let r = scalar_from_integer(r.to_biguint().map(|v| v.to_bytes_be()), "r")?;
    let s = scalar_from_integer(s.to_biguint().map(|v| v.to_bytes_be()), "s")?;
    Ok((r, s))
}

fn scalar_from_integer(bytes: Option<Vec<u8>>, name: &str) -> Result<U256, FormatError> {
    let bytes = bytes
        .ok_or_else(|| FormatError::InvalidSignature(format!("{name} is negative")))?;
    let value = U256::try_from_be_slice(&bytes)
        .ok_or_else(|| FormatError::InvalidSignature(format!("{name} exceeds 256 bits")))?;

    if value.is_zero() || value >= SECP256K1_N {
        return Err(FormatError::InvalidSignature(format!(
            "{name} is outside [1, N-1]"
        )));
    }
    Ok(value)
}
