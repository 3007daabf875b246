//! # Chain TestEnv - In-Process Test Chain
//!
//! A single-validator chain that runs inside the test process. It builds a
//! consistent genesis, initializes an embedded runtime with it and lets a test
//! advance the chain one block at a time.
//!
//! ## What Lives Where
//! - `genesis/`: genesis document and the validator-set genesis builder
//! - `testenv/`: the `TestEnv` harness, bootstrap and the param type registry
//! - `app/`: embedded runtime (store, block context, InitChain/BeginBlock)
//! - `modules/`: auth, bank, staking, slashing, wasm, tokenfactory, consumer
//! - `consensus/`: public keys, validator sets and their Merkle hash
//! - `types/`: coins, bounded integers, decimals, addresses
//! - `wallet/`: account and validator keys
//! - `config/`: harness configuration (TOML)
//! - `utils/`: hashing, base58 and the store codec
//!
//! ## Lifecycle
//! `TestEnv::new()` creates the app, runs InitChain with one validator and one
//! funded account and leaves the chain at height 1. Every
//! `begin_new_block(secs)` moves it one height forward. Failures come back as
//! [`TestEnvError`]; the harness never retries.

pub mod app;
pub mod config;
pub mod consensus;
pub mod error;
pub mod genesis;
pub mod modules;
pub mod testenv;
pub mod types;
pub mod utils;
pub mod wallet;

// Re-export commonly used types for convenience
pub use app::{App, AppOptions, Context};
pub use config::TestEnvConfig;
pub use consensus::{PubKey, Validator, ValidatorSet, ValidatorUpdate};
pub use error::{Result, TestEnvError};
pub use genesis::{
    genesis_state_with_val_set, new_default_genesis_state, GenesisState, DEFAULT_POWER_REDUCTION,
};
pub use modules::ParamSet;
pub use testenv::{Bank, ParamTypeRegistry, TestEnv, TokenFactory};
pub use types::{AccAddress, Coin, Coins, ConsAddress, Dec, Int, ValAddress};
pub use wallet::{SigningAccount, ValidatorKey};
