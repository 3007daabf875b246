//! Genesis document construction
//!
//! A [`GenesisState`] maps module names to their JSON encoded initial state.
//! [`new_default_genesis_state`] yields the defaults of every module and
//! [`genesis_state_with_val_set`] layers a consistent validator set, accounts
//! and balances on top of it.

pub mod builder;

pub use builder::{genesis_state_with_val_set, DEFAULT_POWER_REDUCTION};

use crate::error::{Result, TestEnvError};
use crate::modules::{auth, bank, consumer, slashing, staking, tokenfactory, wasm};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenesisState(BTreeMap<String, serde_json::Value>);

impl GenesisState {
    pub fn new() -> GenesisState {
        GenesisState::default()
    }

    pub fn set_module<T: Serialize>(&mut self, name: &str, state: &T) -> Result<()> {
        self.0.insert(name.to_string(), serde_json::to_value(state)?);
        Ok(())
    }

    /// Decode a module's state; modules missing from the document get their defaults
    pub fn module<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T> {
        match self.0.get(name) {
            Some(raw) => serde_json::from_value(raw.clone()).map_err(|e| {
                TestEnvError::InvalidGenesis(format!("failed to decode {name} genesis: {e}"))
            }),
            None => Ok(T::default()),
        }
    }

    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.0.get(name)
    }

    pub fn contains_module(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Indented JSON, the form handed to InitChain
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(&self.0)?)
    }

    pub fn from_json_bytes(bytes: &[u8]) -> Result<GenesisState> {
        serde_json::from_slice(bytes)
            .map_err(|e| TestEnvError::InvalidGenesis(format!("failed to parse genesis: {e}")))
    }
}

/// Default genesis of every module, staking bonded in `bond_denom`
pub fn new_default_genesis_state(bond_denom: &str) -> Result<GenesisState> {
    let mut genesis = GenesisState::new();
    genesis.set_module(auth::MODULE_NAME, &auth::GenesisState::default())?;
    genesis.set_module(bank::MODULE_NAME, &bank::GenesisState::default())?;

    let staking_params = staking::Params {
        bond_denom: bond_denom.to_string(),
        ..Default::default()
    };
    genesis.set_module(
        staking::MODULE_NAME,
        &staking::GenesisState::new(staking_params, vec![], vec![]),
    )?;

    genesis.set_module(slashing::MODULE_NAME, &slashing::GenesisState::default())?;
    genesis.set_module(wasm::MODULE_NAME, &wasm::GenesisState::default())?;
    genesis.set_module(tokenfactory::MODULE_NAME, &tokenfactory::GenesisState::default())?;
    genesis.set_module(
        consumer::MODULE_NAME,
        &consumer::create_minimal_consumer_test_genesis(),
    )?;
    Ok(genesis)
}
