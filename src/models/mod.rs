//! Data model for KMS-backed Ethereum signing.
mod audit;
pub use audit::*;

mod error;
pub use error::*;

pub mod health;
pub use health::*;

mod signature;
pub use signature::*;

mod transaction;
pub use transaction::*;
