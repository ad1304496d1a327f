mod address_derivation;
pub use address_derivation::*;

mod der;
pub use der::*;

mod error_sanitization;
pub use error_sanitization::*;

mod secp256k;
pub use secp256k::*;
