use crate::consensus::pubkey::ED25519_KEY_TYPE;
use crate::error::{Result, TestEnvError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockParams {
    pub max_bytes: i64,
    /// -1 means unlimited
    pub max_gas: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceParams {
    pub max_age_num_blocks: i64,
    pub max_age_duration: Duration,
    pub max_bytes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorParams {
    pub pub_key_types: Vec<String>,
}

/// Consensus parameters supplied at InitChain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusParams {
    pub block: BlockParams,
    pub evidence: EvidenceParams,
    pub validator: ValidatorParams,
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self {
            block: BlockParams {
                max_bytes: 200_000,
                max_gas: 100_000_000,
            },
            evidence: EvidenceParams {
                max_age_num_blocks: 302_400,
                max_age_duration: Duration::from_secs(504 * 60 * 60),
                max_bytes: 10_000,
            },
            validator: ValidatorParams {
                pub_key_types: vec![ED25519_KEY_TYPE.to_string()],
            },
        }
    }
}

impl ConsensusParams {
    pub fn validate(&self) -> Result<()> {
        if self.block.max_bytes <= 0 {
            return Err(TestEnvError::InvalidGenesis(format!(
                "block.max_bytes must be positive, got {}",
                self.block.max_bytes
            )));
        }
        if self.block.max_gas < -1 {
            return Err(TestEnvError::InvalidGenesis(format!(
                "block.max_gas must be >= -1, got {}",
                self.block.max_gas
            )));
        }
        if self.evidence.max_age_num_blocks <= 0 || self.evidence.max_bytes < 0 {
            return Err(TestEnvError::InvalidGenesis(
                "evidence params must be positive".to_string(),
            ));
        }
        if self.validator.pub_key_types.is_empty() {
            return Err(TestEnvError::InvalidGenesis(
                "at least one validator public key type is required".to_string(),
            ));
        }
        Ok(())
    }

    pub fn allows_key_type(&self, key_type: &str) -> bool {
        self.validator.pub_key_types.iter().any(|t| t == key_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_valid() {
        let params = ConsensusParams::default();
        assert!(params.validate().is_ok());
        assert!(params.allows_key_type("ed25519"));
        assert!(!params.allows_key_type("secp256r1"));
    }

    #[test]
    fn test_validation_failures() {
        let mut params = ConsensusParams::default();
        params.block.max_bytes = 0;
        assert!(params.validate().is_err());

        let mut params = ConsensusParams::default();
        params.validator.pub_key_types.clear();
        assert!(params.validate().is_err());
    }
}
