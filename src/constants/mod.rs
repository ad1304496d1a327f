//! Constants shared across the signer crate.
mod logging;
pub use logging::*;

mod signer;
pub use signer::*;
