//! Utility functions and helpers
//!
//! Hashing, key generation, base58check encoding and the binary codec used
//! for store values.

pub mod crypto;
pub mod serialization;

pub use crypto::{
    base58_decode, base58_encode, hash_pub_key, new_key_pair, ripemd160_digest, sha256_digest,
};

pub use serialization::{deserialize, serialize};
