//! Key management for test accounts and validators
//!
//! Account keys are ECDSA P-256 (ring); validator consensus keys are Ed25519
//! seeds. Private key material is zeroized on drop.

pub mod account;
pub mod validator_key;

pub use account::SigningAccount;
pub use validator_key::{ValidatorKey, VALIDATOR_SEED_LEN};
