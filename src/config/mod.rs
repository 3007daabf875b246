//! Configuration management
//!
//! Test chain settings: chain identifier, bond denomination and the fixed
//! amounts used while bootstrapping. There is no ambient/global configuration;
//! every `TestEnv` owns its own copy.

pub mod settings;

pub use settings::{
    TestEnvConfig, DEFAULT_BOND_DENOM, DEFAULT_CHAIN_ID, DEFAULT_GENESIS_ACCOUNT_BALANCE,
    DEFAULT_VALIDATOR_FUNDING_AMOUNT, DEFAULT_VALIDATOR_POWER,
};
