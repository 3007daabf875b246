use crate::app::Store;
use crate::error::Result;
use crate::types::{ConsAddress, Dec};
use log::debug;
use serde::{Deserialize, Serialize};

pub const MODULE_NAME: &str = "slashing";

const SIGNING_INFO_TREE: &str = "slashing_signing_info";
const META_TREE: &str = "slashing_meta";
const PARAMS_KEY: &[u8] = b"params";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    pub signed_blocks_window: i64,
    pub min_signed_per_window: Dec,
    pub downtime_jail_duration_secs: u64,
    pub slash_fraction_double_sign: Dec,
    pub slash_fraction_downtime: Dec,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            signed_blocks_window: 100,
            min_signed_per_window: Dec::with_prec(5, 1),
            downtime_jail_duration_secs: 600,
            slash_fraction_double_sign: Dec::with_prec(5, 2),
            slash_fraction_downtime: Dec::with_prec(1, 2),
        }
    }
}

/// Liveness bookkeeping for one validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSigningInfo {
    pub address: ConsAddress,
    pub start_height: i64,
    pub index_offset: i64,
    pub jailed_until_unix_secs: u64,
    pub tombstoned: bool,
    pub missed_blocks_counter: i64,
}

impl ValidatorSigningInfo {
    pub fn new(
        address: ConsAddress,
        start_height: i64,
        index_offset: i64,
        jailed_until_unix_secs: u64,
        tombstoned: bool,
        missed_blocks_counter: i64,
    ) -> ValidatorSigningInfo {
        ValidatorSigningInfo {
            address,
            start_height,
            index_offset,
            jailed_until_unix_secs,
            tombstoned,
            missed_blocks_counter,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub params: Params,
    pub signing_infos: Vec<ValidatorSigningInfo>,
}

#[derive(Clone)]
pub struct SlashingKeeper {
    store: Store,
}

impl SlashingKeeper {
    pub fn new(store: Store) -> SlashingKeeper {
        SlashingKeeper { store }
    }

    pub fn init_genesis(&self, genesis: &GenesisState) -> Result<()> {
        self.store.set(META_TREE, PARAMS_KEY, &genesis.params)?;
        for info in &genesis.signing_infos {
            self.set_validator_signing_info(info)?;
        }
        debug!("slashing genesis: {} signing info(s)", genesis.signing_infos.len());
        Ok(())
    }

    pub fn params(&self) -> Result<Params> {
        Ok(self.store.get(META_TREE, PARAMS_KEY)?.unwrap_or_default())
    }

    pub fn set_validator_signing_info(&self, info: &ValidatorSigningInfo) -> Result<()> {
        self.store
            .set(SIGNING_INFO_TREE, info.address.as_bytes(), info)
    }

    pub fn validator_signing_info(
        &self,
        address: &ConsAddress,
    ) -> Result<Option<ValidatorSigningInfo>> {
        self.store.get(SIGNING_INFO_TREE, address.as_bytes())
    }

    pub fn has_validator_signing_info(&self, address: &ConsAddress) -> Result<bool> {
        self.store.contains(SIGNING_INFO_TREE, address.as_bytes())
    }
}
