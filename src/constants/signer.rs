//! Constants for KMS-backed Ethereum signing.

/// Length of an uncompressed SEC1 secp256k1 public key (0x04 || X || Y).
pub const UNCOMPRESSED_PUBLIC_KEY_LENGTH: usize = 65;

/// Marker byte of an uncompressed SEC1 point.
pub const UNCOMPRESSED_POINT_MARKER: u8 = 0x04;

/// Keccak-256 digest length.
pub const DIGEST_LENGTH: usize = 32;

/// Ethereum recovery ids tried in order during signature recovery.
pub const ETH_RECOVERY_IDS: [u8; 2] = [27, 28];

/// Gas limit of a plain value transfer.
pub const DEFAULT_GAS_LIMIT: u64 = 21_000;

/// Number of key id characters kept when a key id is written to logs.
pub const KEY_ID_PREFIX_LENGTH: usize = 8;

/// Message attached to a healthy key check.
pub const HEALTHY_KEY_MESSAGE: &str = "KMS key is accessible";

// Environment variables read by `KmsSignerConfig::from_env`
pub const KMS_KEY_ID_ENV: &str = "KMS_KEY_ID";
pub const KMS_REGION_ENV: &str = "KMS_REGION";
pub const AWS_REGION_ENV: &str = "AWS_REGION";
pub const KMS_TIMEOUT_MS_ENV: &str = "KMS_TIMEOUT_MS";
pub const KMS_MAX_RETRIES_ENV: &str = "KMS_MAX_RETRIES";
pub const KMS_CHAIN_ID_ENV: &str = "KMS_CHAIN_ID";
pub const APP_ENV: &str = "APP_ENV";
