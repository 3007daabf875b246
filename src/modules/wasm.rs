use crate::app::Store;
use crate::error::Result;
use crate::types::AccAddress;
use log::debug;
use serde::{Deserialize, Serialize};

pub const MODULE_NAME: &str = "wasm";

const META_TREE: &str = "wasm_meta";
const PARAMS_KEY: &[u8] = b"params";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessType {
    Unspecified,
    Nobody,
    Everybody,
    AnyOfAddresses,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessConfig {
    pub permission: AccessType,
    pub addresses: Vec<AccAddress>,
}

impl AccessConfig {
    pub fn everybody() -> AccessConfig {
        AccessConfig {
            permission: AccessType::Everybody,
            addresses: Vec::new(),
        }
    }

    pub fn nobody() -> AccessConfig {
        AccessConfig {
            permission: AccessType::Nobody,
            addresses: Vec::new(),
        }
    }

    pub fn any_of(addresses: Vec<AccAddress>) -> AccessConfig {
        AccessConfig {
            permission: AccessType::AnyOfAddresses,
            addresses,
        }
    }

    pub fn allowed(&self, actor: &AccAddress) -> bool {
        match self.permission {
            AccessType::Everybody => true,
            AccessType::AnyOfAddresses => self.addresses.contains(actor),
            AccessType::Nobody | AccessType::Unspecified => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    pub code_upload_access: AccessConfig,
    pub instantiate_default_permission: AccessType,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            code_upload_access: AccessConfig::nobody(),
            instantiate_default_permission: AccessType::Nobody,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub params: Params,
}

#[derive(Clone)]
pub struct WasmKeeper {
    store: Store,
}

impl WasmKeeper {
    pub fn new(store: Store) -> WasmKeeper {
        WasmKeeper { store }
    }

    pub fn init_genesis(&self, genesis: &GenesisState) -> Result<()> {
        debug!(
            "wasm genesis: upload {:?}, instantiate {:?}",
            genesis.params.code_upload_access.permission,
            genesis.params.instantiate_default_permission
        );
        self.store.set(META_TREE, PARAMS_KEY, &genesis.params)
    }

    pub fn params(&self) -> Result<Params> {
        Ok(self.store.get(META_TREE, PARAMS_KEY)?.unwrap_or_default())
    }

    pub fn can_upload(&self, actor: &AccAddress) -> Result<bool> {
        Ok(self.params()?.code_upload_access.allowed(actor))
    }

    /// Default instantiate permission. `AnyOfAddresses` falls back to the
    /// upload list.
    pub fn can_instantiate(&self, actor: &AccAddress) -> Result<bool> {
        let params = self.params()?;
        Ok(match params.instantiate_default_permission {
            AccessType::Everybody => true,
            AccessType::AnyOfAddresses => params.code_upload_access.allowed(actor),
            AccessType::Nobody | AccessType::Unspecified => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ADDRESS_LEN;

    #[test]
    fn test_default_params_deny_everyone() {
        let home = tempfile::tempdir().unwrap();
        let keeper = WasmKeeper::new(Store::open_temporary(home.path()).unwrap());
        keeper.init_genesis(&GenesisState::default()).unwrap();

        let actor = AccAddress::from_bytes([1; ADDRESS_LEN]);
        assert!(!keeper.can_upload(&actor).unwrap());
        assert!(!keeper.can_instantiate(&actor).unwrap());
    }

    #[test]
    fn test_any_of_addresses() {
        let allowed = AccAddress::from_bytes([1; ADDRESS_LEN]);
        let other = AccAddress::from_bytes([2; ADDRESS_LEN]);
        let config = AccessConfig::any_of(vec![allowed]);
        assert!(config.allowed(&allowed));
        assert!(!config.allowed(&other));
        assert!(AccessConfig::everybody().allowed(&other));
    }
}
