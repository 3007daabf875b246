use crate::consensus::{simple_hash_from_byte_vectors, PubKey};
use crate::error::{Result, TestEnvError};
use crate::types::ConsAddress;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashSet;

/// Upper bound on the summed voting power of a validator set
pub const MAX_TOTAL_VOTING_POWER: i64 = i64::MAX / 8;

/// A consensus validator: signing key plus voting power
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    pub address: ConsAddress,
    pub pub_key: PubKey,
    pub voting_power: i64,
    pub proposer_priority: i64,
}

impl Validator {
    pub fn new(pub_key: PubKey, voting_power: i64) -> Validator {
        Validator {
            address: pub_key.cons_address(),
            pub_key,
            voting_power,
            proposer_priority: 0,
        }
    }

    /// Bytes fed into the validator set hash: key type, key and power.
    /// Proposer priority is left out since it changes every block.
    pub fn hash_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(self.pub_key.type_url().as_bytes());
        bytes.extend_from_slice(self.pub_key.as_bytes());
        bytes.extend_from_slice(&self.voting_power.to_be_bytes());
        bytes
    }

    pub fn to_update(&self) -> ValidatorUpdate {
        ValidatorUpdate {
            pub_key: self.pub_key.clone(),
            power: self.voting_power,
        }
    }
}

/// (public key, power) pair handed to the application at InitChain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorUpdate {
    pub pub_key: PubKey,
    pub power: i64,
}

/// An ordered validator set. Validators are kept sorted by voting power
/// (descending) and then by address (ascending), which fixes the hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSet {
    validators: Vec<Validator>,
}

impl ValidatorSet {
    pub fn new(mut validators: Vec<Validator>) -> Result<ValidatorSet> {
        let mut seen = HashSet::new();
        let mut total: i64 = 0;
        for validator in &validators {
            if validator.voting_power <= 0 {
                return Err(TestEnvError::InvalidValidatorSet(format!(
                    "validator {} has non-positive voting power {}",
                    validator.address, validator.voting_power
                )));
            }
            if !seen.insert(validator.address) {
                return Err(TestEnvError::InvalidValidatorSet(format!(
                    "duplicate validator {}",
                    validator.address
                )));
            }
            total = total
                .checked_add(validator.voting_power)
                .filter(|sum| *sum <= MAX_TOTAL_VOTING_POWER)
                .ok_or_else(|| {
                    TestEnvError::InvalidValidatorSet(format!(
                        "total voting power exceeds {MAX_TOTAL_VOTING_POWER}"
                    ))
                })?;
        }

        validators.sort_by_key(|v| (Reverse(v.voting_power), v.address));
        Ok(ValidatorSet { validators })
    }

    /// Rebuild a validator set from InitChain-style updates
    pub fn from_updates(updates: &[ValidatorUpdate]) -> Result<ValidatorSet> {
        Self::new(
            updates
                .iter()
                .map(|u| Validator::new(u.pub_key.clone(), u.power))
                .collect(),
        )
    }

    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    pub fn total_voting_power(&self) -> i64 {
        self.validators.iter().map(|v| v.voting_power).sum()
    }

    pub fn validator(&self, address: &ConsAddress) -> Option<&Validator> {
        self.validators.iter().find(|v| &v.address == address)
    }

    pub fn hash(&self) -> Vec<u8> {
        let validator_bytes: Vec<Vec<u8>> =
            self.validators.iter().map(Validator::hash_bytes).collect();
        simple_hash_from_byte_vectors(&validator_bytes)
    }

    pub fn updates(&self) -> Vec<ValidatorUpdate> {
        self.validators.iter().map(Validator::to_update).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator(seed: u8, power: i64) -> Validator {
        Validator::new(PubKey::Ed25519(vec![seed; 32]), power)
    }

    #[test]
    fn test_sorted_by_power_then_address() {
        let set =
            ValidatorSet::new(vec![validator(1, 5), validator(2, 10), validator(3, 5)]).unwrap();
        let powers: Vec<i64> = set.validators().iter().map(|v| v.voting_power).collect();
        assert_eq!(powers, vec![10, 5, 5]);
        assert!(set.validators()[1].address < set.validators()[2].address);
        assert_eq!(set.total_voting_power(), 20);
    }

    #[test]
    fn test_hash_independent_of_input_order() {
        let a = ValidatorSet::new(vec![validator(1, 5), validator(2, 10)]).unwrap();
        let b = ValidatorSet::new(vec![validator(2, 10), validator(1, 5)]).unwrap();
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn test_hash_depends_on_power() {
        let a = ValidatorSet::new(vec![validator(1, 5)]).unwrap();
        let b = ValidatorSet::new(vec![validator(1, 6)]).unwrap();
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn test_rejects_invalid_sets() {
        assert!(ValidatorSet::new(vec![validator(1, 0)]).is_err());
        assert!(ValidatorSet::new(vec![validator(1, 1), validator(1, 2)]).is_err());
        assert!(
            ValidatorSet::new(vec![validator(1, MAX_TOTAL_VOTING_POWER), validator(2, 1)]).is_err()
        );
    }

    #[test]
    fn test_updates_round_trip() {
        let set = ValidatorSet::new(vec![validator(1, 5), validator(2, 10)]).unwrap();
        let rebuilt = ValidatorSet::from_updates(&set.updates()).unwrap();
        assert_eq!(rebuilt, set);
        assert_eq!(rebuilt.hash(), set.hash());
    }
}
