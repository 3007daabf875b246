use crate::consensus::PubKey;
use crate::error::{Result, TestEnvError};
use crate::types::{AccAddress, ConsAddress, ValAddress};
use rand::RngCore;
use ring::signature::{Ed25519KeyPair, KeyPair};
use zeroize::ZeroizeOnDrop;

pub const VALIDATOR_SEED_LEN: usize = 32;

/// Ed25519 consensus key of a validator. The seed is the private key
/// material and is wiped on drop.
#[derive(Clone, ZeroizeOnDrop)]
pub struct ValidatorKey {
    seed: [u8; VALIDATOR_SEED_LEN],
    public_key: Vec<u8>,
}

impl ValidatorKey {
    /// Generate a key from a fresh random seed
    pub fn generate() -> Result<ValidatorKey> {
        let mut seed = [0u8; VALIDATOR_SEED_LEN];
        rand::thread_rng().fill_bytes(&mut seed);
        let key = Self::from_seed(seed);
        zeroize::Zeroize::zeroize(&mut seed);
        key
    }

    /// Deterministic key for tests that pin their key material
    pub fn from_seed(seed: [u8; VALIDATOR_SEED_LEN]) -> Result<ValidatorKey> {
        let key_pair = Ed25519KeyPair::from_seed_unchecked(&seed)
            .map_err(|e| TestEnvError::Crypto(format!("Invalid ed25519 seed: {e}")))?;
        let public_key = key_pair.public_key().as_ref().to_vec();
        Ok(ValidatorKey { seed, public_key })
    }

    pub fn seed(&self) -> &[u8; VALIDATOR_SEED_LEN] {
        &self.seed
    }

    pub fn pub_key(&self) -> PubKey {
        PubKey::Ed25519(self.public_key.clone())
    }

    pub fn cons_address(&self) -> ConsAddress {
        self.pub_key().cons_address()
    }

    pub fn operator_address(&self) -> ValAddress {
        ValAddress::from_bytes(self.pub_key().address_bytes())
    }

    /// Account that receives funds sent to this validator
    pub fn account_address(&self) -> AccAddress {
        AccAddress::from_bytes(self.pub_key().address_bytes())
    }
}

impl std::fmt::Debug for ValidatorKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorKey")
            .field("cons_address", &self.cons_address().to_string())
            .finish()
    }
}
