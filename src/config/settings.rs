use crate::error::{Result, TestEnvError};
use crate::types::validate_denom;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const DEFAULT_CHAIN_ID: &str = "neutron-1";
pub const DEFAULT_BOND_DENOM: &str = "untrn";

/// Balance credited to the genesis account, large enough that test scenarios
/// never hit insufficient funds by accident
pub const DEFAULT_GENESIS_ACCOUNT_BALANCE: u64 = 100_000_000_000_000;

pub const DEFAULT_VALIDATOR_POWER: i64 = 1;

/// Amount `fund_validators` hands each validator account
pub const DEFAULT_VALIDATOR_FUNDING_AMOUNT: u64 = i64::MAX as u64;

const DEFAULT_FUNDING_MODULE: &str = "tokenfactory";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestEnvConfig {
    pub chain_id: String,
    pub bond_denom: String,
    pub genesis_account_balance: u64,
    pub validator_power: i64,
    pub validator_funding_amount: u64,
    /// Module account that mints the coins handed out by `fund_account`
    pub funding_module: String,
    /// Block time of the genesis header, in seconds since the Unix epoch
    pub genesis_time_unix_secs: u64,
    pub trace: bool,
}

impl Default for TestEnvConfig {
    fn default() -> Self {
        Self {
            chain_id: DEFAULT_CHAIN_ID.to_string(),
            bond_denom: DEFAULT_BOND_DENOM.to_string(),
            genesis_account_balance: DEFAULT_GENESIS_ACCOUNT_BALANCE,
            validator_power: DEFAULT_VALIDATOR_POWER,
            validator_funding_amount: DEFAULT_VALIDATOR_FUNDING_AMOUNT,
            funding_module: DEFAULT_FUNDING_MODULE.to_string(),
            genesis_time_unix_secs: 0,
            trace: true,
        }
    }
}

impl TestEnvConfig {
    /// Parse a config from TOML; missing keys fall back to the defaults
    pub fn from_toml_str(raw: &str) -> Result<TestEnvConfig> {
        let config: TestEnvConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<TestEnvConfig> {
        let raw = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chain_id.trim().is_empty() {
            return Err(TestEnvError::Config("chain_id must not be empty".to_string()));
        }
        validate_denom(&self.bond_denom)
            .map_err(|e| TestEnvError::Config(format!("bond_denom: {e}")))?;
        if self.validator_power <= 0 {
            return Err(TestEnvError::Config(format!(
                "validator_power must be positive, got {}",
                self.validator_power
            )));
        }
        if self.funding_module.is_empty() {
            return Err(TestEnvError::Config(
                "funding_module must not be empty".to_string(),
            ));
        }
        self.genesis_time()?;
        Ok(())
    }

    /// Block time of the genesis header
    pub fn genesis_time(&self) -> Result<SystemTime> {
        UNIX_EPOCH
            .checked_add(Duration::from_secs(self.genesis_time_unix_secs))
            .ok_or_else(|| {
                TestEnvError::Config(format!(
                    "genesis_time_unix_secs {} is out of range",
                    self.genesis_time_unix_secs
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = TestEnvConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chain_id, "neutron-1");
        assert_eq!(config.genesis_account_balance, 100_000_000_000_000);
        assert_eq!(config.validator_funding_amount, 9_223_372_036_854_775_807);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = TestEnvConfig::from_toml_str(
            r#"
            chain_id = "testing-2"
            validator_power = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.chain_id, "testing-2");
        assert_eq!(config.validator_power, 10);
        assert_eq!(config.bond_denom, DEFAULT_BOND_DENOM);
        assert!(config.trace);
    }

    #[test]
    fn test_invalid_toml_values_are_rejected() {
        assert!(TestEnvConfig::from_toml_str("validator_power = 0").is_err());
        assert!(TestEnvConfig::from_toml_str("bond_denom = \"1x\"").is_err());
        assert!(TestEnvConfig::from_toml_str("chain_id = 5").is_err());
    }

    #[test]
    fn test_out_of_range_genesis_time_is_rejected() {
        let config = TestEnvConfig {
            genesis_time_unix_secs: u64::MAX,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(TestEnvError::Config(_))));
        assert!(matches!(config.genesis_time(), Err(TestEnvError::Config(_))));

        let config = TestEnvConfig {
            genesis_time_unix_secs: 1_000,
            ..Default::default()
        };
        assert_eq!(
            config.genesis_time().unwrap(),
            UNIX_EPOCH + Duration::from_secs(1_000)
        );
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("testenv.toml");
        fs::write(&path, "bond_denom = \"stake\"\n").unwrap();

        let config = TestEnvConfig::from_file(&path).unwrap();
        assert_eq!(config.bond_denom, "stake");
    }
}
