//! Signer configuration.
mod signer_config;
pub use signer_config::*;
