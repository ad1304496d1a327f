//! # Services Module
//!
//! Remote key access, audit logging and the signing engine built on them.

pub mod audit;
pub use audit::*;

pub mod kms;
pub use kms::*;

pub mod signer;
pub use signer::*;
