//! Module keepers of the embedded runtime
//!
//! Each module owns its genesis state type, its parameters and a keeper that
//! reads and writes the module's trees in the [`Store`](crate::app::Store).
//! Keepers are cheap to clone; they share the underlying database handle.

pub mod auth;
pub mod bank;
pub mod consumer;
pub mod slashing;
pub mod staking;
pub mod tokenfactory;
pub mod wasm;

pub use auth::AccountKeeper;
pub use bank::BankKeeper;
pub use consumer::ConsumerKeeper;
pub use slashing::SlashingKeeper;
pub use staking::StakingKeeper;
pub use tokenfactory::TokenFactoryKeeper;
pub use wasm::WasmKeeper;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;

/// A module parameter set stored under its own subspace
pub trait ParamSet: Serialize + DeserializeOwned + Default + 'static {
    const SUBSPACE: &'static str;
}

impl ParamSet for auth::Params {
    const SUBSPACE: &'static str = auth::MODULE_NAME;
}

impl ParamSet for bank::Params {
    const SUBSPACE: &'static str = bank::MODULE_NAME;
}

impl ParamSet for staking::Params {
    const SUBSPACE: &'static str = staking::MODULE_NAME;
}

impl ParamSet for slashing::Params {
    const SUBSPACE: &'static str = slashing::MODULE_NAME;
}

impl ParamSet for wasm::Params {
    const SUBSPACE: &'static str = wasm::MODULE_NAME;
}

impl ParamSet for tokenfactory::Params {
    const SUBSPACE: &'static str = tokenfactory::MODULE_NAME;
}

impl ParamSet for consumer::Params {
    const SUBSPACE: &'static str = consumer::MODULE_NAME;
}

/// Module account permissions known to the runtime
pub fn module_account_permissions() -> BTreeMap<String, Vec<String>> {
    let mut permissions = BTreeMap::new();
    permissions.insert(auth::FEE_COLLECTOR_NAME.to_string(), vec![]);
    permissions.insert(
        staking::BONDED_POOL_NAME.to_string(),
        vec![auth::BURNER.to_string(), auth::STAKING.to_string()],
    );
    permissions.insert(
        staking::NOT_BONDED_POOL_NAME.to_string(),
        vec![auth::BURNER.to_string(), auth::STAKING.to_string()],
    );
    permissions.insert(
        tokenfactory::MODULE_NAME.to_string(),
        vec![auth::MINTER.to_string(), auth::BURNER.to_string()],
    );
    permissions
}
