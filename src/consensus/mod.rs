//! Consensus-side primitives
//!
//! Public keys, validators and validator sets with their Merkle hash, the
//! validator updates exchanged at InitChain and the consensus parameters.

pub mod merkle;
pub mod params;
pub mod pubkey;
pub mod validator;

pub use merkle::simple_hash_from_byte_vectors;
pub use params::{BlockParams, ConsensusParams, EvidenceParams, ValidatorParams};
pub use pubkey::{PubKey, ECDSA_P256_TYPE_URL, ED25519_TYPE_URL};
pub use validator::{Validator, ValidatorSet, ValidatorUpdate, MAX_TOTAL_VOTING_POWER};
