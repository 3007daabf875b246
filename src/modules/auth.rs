use crate::app::Store;
use crate::consensus::PubKey;
use crate::error::{Result, TestEnvError};
use crate::types::{AccAddress, ADDRESS_LEN};
use crate::utils::sha256_digest;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

pub const MODULE_NAME: &str = "auth";
pub const FEE_COLLECTOR_NAME: &str = "fee_collector";

pub const MINTER: &str = "minter";
pub const BURNER: &str = "burner";
pub const STAKING: &str = "staking";

const ACCOUNTS_TREE: &str = "auth_accounts";
const META_TREE: &str = "auth_meta";
const NEXT_ACCOUNT_NUMBER_KEY: &[u8] = b"next_account_number";
const PARAMS_KEY: &[u8] = b"params";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    pub max_memo_characters: u64,
    pub tx_sig_limit: u64,
    pub tx_size_cost_per_byte: u64,
    pub sig_verify_cost_ed25519: u64,
    pub sig_verify_cost_secp256k1: u64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            max_memo_characters: 256,
            tx_sig_limit: 7,
            tx_size_cost_per_byte: 10,
            sig_verify_cost_ed25519: 590,
            sig_verify_cost_secp256k1: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseAccount {
    pub address: AccAddress,
    pub pub_key: Option<PubKey>,
    pub account_number: u64,
    pub sequence: u64,
}

impl BaseAccount {
    pub fn new(
        address: AccAddress,
        pub_key: Option<PubKey>,
        account_number: u64,
        sequence: u64,
    ) -> BaseAccount {
        BaseAccount {
            address,
            pub_key,
            account_number,
            sequence,
        }
    }
}

/// Accounts listed in the auth genesis
pub type GenesisAccount = BaseAccount;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleAccount {
    pub base: BaseAccount,
    pub name: String,
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Account {
    Base(BaseAccount),
    Module(ModuleAccount),
}

impl Account {
    pub fn base(&self) -> &BaseAccount {
        match self {
            Account::Base(base) => base,
            Account::Module(module) => &module.base,
        }
    }

    pub fn address(&self) -> AccAddress {
        self.base().address
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub params: Params,
    pub accounts: Vec<Account>,
}

impl GenesisState {
    pub fn new(params: Params, accounts: &[GenesisAccount]) -> GenesisState {
        GenesisState {
            params,
            accounts: accounts.iter().cloned().map(Account::Base).collect(),
        }
    }
}

/// Address of a module account: the first 20 bytes of SHA-256 over its name
pub fn new_module_address(name: &str) -> AccAddress {
    let hash = sha256_digest(name.as_bytes());
    let mut bytes = [0u8; ADDRESS_LEN];
    bytes.copy_from_slice(&hash[..ADDRESS_LEN]);
    AccAddress::from_bytes(bytes)
}

#[derive(Clone)]
pub struct AccountKeeper {
    store: Store,
    permissions: BTreeMap<String, Vec<String>>,
}

impl AccountKeeper {
    pub fn new(store: Store, permissions: BTreeMap<String, Vec<String>>) -> AccountKeeper {
        AccountKeeper { store, permissions }
    }

    pub fn init_genesis(&self, genesis: &GenesisState) -> Result<()> {
        let mut seen = HashSet::new();
        let mut next_number = 0;
        for account in &genesis.accounts {
            let address = account.address();
            if !seen.insert(address) {
                return Err(TestEnvError::InvalidGenesis(format!(
                    "duplicate account found in genesis state; address: {address}"
                )));
            }
            next_number = next_number.max(account.base().account_number + 1);
            self.set_account(account)?;
        }
        self.store
            .set(META_TREE, NEXT_ACCOUNT_NUMBER_KEY, &next_number)?;
        self.store.set(META_TREE, PARAMS_KEY, &genesis.params)?;
        debug!("auth genesis: {} account(s)", genesis.accounts.len());
        Ok(())
    }

    pub fn params(&self) -> Result<Params> {
        Ok(self.store.get(META_TREE, PARAMS_KEY)?.unwrap_or_default())
    }

    pub fn account(&self, address: &AccAddress) -> Result<Option<Account>> {
        self.store.get(ACCOUNTS_TREE, address.as_bytes())
    }

    pub fn has_account(&self, address: &AccAddress) -> Result<bool> {
        self.store.contains(ACCOUNTS_TREE, address.as_bytes())
    }

    pub fn set_account(&self, account: &Account) -> Result<()> {
        self.store
            .set(ACCOUNTS_TREE, account.address().as_bytes(), account)
    }

    pub fn all_accounts(&self) -> Result<Vec<Account>> {
        self.store.values(ACCOUNTS_TREE)
    }

    fn next_account_number(&self) -> Result<u64> {
        let number: u64 = self
            .store
            .get(META_TREE, NEXT_ACCOUNT_NUMBER_KEY)?
            .unwrap_or(0);
        self.store
            .set(META_TREE, NEXT_ACCOUNT_NUMBER_KEY, &(number + 1))?;
        Ok(number)
    }

    /// Register a plain account under the next free account number.
    /// Returns the existing account untouched if one is already stored.
    pub fn new_account_with_address(
        &self,
        address: &AccAddress,
        pub_key: Option<PubKey>,
    ) -> Result<Account> {
        if let Some(existing) = self.account(address)? {
            return Ok(existing);
        }
        let account = Account::Base(BaseAccount::new(
            *address,
            pub_key,
            self.next_account_number()?,
            0,
        ));
        self.set_account(&account)?;
        Ok(account)
    }

    pub fn module_address(&self, name: &str) -> AccAddress {
        new_module_address(name)
    }

    pub fn is_module_registered(&self, name: &str) -> bool {
        self.permissions.contains_key(name)
    }

    pub fn has_permission(&self, name: &str, permission: &str) -> bool {
        self.permissions
            .get(name)
            .is_some_and(|perms| perms.iter().any(|p| p == permission))
    }

    /// Fetch a module account, creating it on first use.
    /// Fails with `NotFound` for modules that were never registered.
    pub fn module_account(&self, name: &str) -> Result<ModuleAccount> {
        let permissions = self.permissions.get(name).ok_or_else(|| {
            TestEnvError::NotFound(format!("module account {name} does not exist"))
        })?;
        let address = new_module_address(name);
        match self.account(&address)? {
            Some(Account::Module(module)) => Ok(module),
            Some(Account::Base(_)) => Err(TestEnvError::ChainState(format!(
                "account at {address} is not a module account"
            ))),
            None => {
                let module = ModuleAccount {
                    base: BaseAccount::new(address, None, self.next_account_number()?, 0),
                    name: name.to_string(),
                    permissions: permissions.clone(),
                };
                self.set_account(&Account::Module(module.clone()))?;
                Ok(module)
            }
        }
    }

    /// Create every registered module account that does not exist yet
    pub fn ensure_module_accounts(&self) -> Result<()> {
        for name in self.permissions.keys() {
            self.module_account(name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::module_account_permissions;

    fn keeper() -> (AccountKeeper, tempfile::TempDir) {
        let home = tempfile::tempdir().unwrap();
        let store = Store::open_temporary(home.path()).unwrap();
        (AccountKeeper::new(store, module_account_permissions()), home)
    }

    fn addr(byte: u8) -> AccAddress {
        AccAddress::from_bytes([byte; ADDRESS_LEN])
    }

    #[test]
    fn test_init_genesis_and_numbering() {
        let (keeper, _home) = keeper();
        let genesis =
            GenesisState::new(Params::default(), &[BaseAccount::new(addr(1), None, 4, 0)]);
        keeper.init_genesis(&genesis).unwrap();

        assert!(keeper.has_account(&addr(1)).unwrap());
        let fresh = keeper.new_account_with_address(&addr(2), None).unwrap();
        assert_eq!(fresh.base().account_number, 5);
        assert_eq!(keeper.params().unwrap(), Params::default());
    }

    #[test]
    fn test_duplicate_genesis_accounts_rejected() {
        let (keeper, _home) = keeper();
        let account = BaseAccount::new(addr(1), None, 0, 0);
        let genesis = GenesisState::new(Params::default(), &[account.clone(), account]);
        assert!(matches!(
            keeper.init_genesis(&genesis),
            Err(TestEnvError::InvalidGenesis(_))
        ));
    }

    #[test]
    fn test_new_account_keeps_existing() {
        let (keeper, _home) = keeper();
        let first = keeper.new_account_with_address(&addr(3), None).unwrap();
        let second = keeper.new_account_with_address(&addr(3), None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_module_accounts() {
        let (keeper, _home) = keeper();
        let module = keeper.module_account("tokenfactory").unwrap();
        assert_eq!(module.base.address, new_module_address("tokenfactory"));
        assert!(keeper.has_permission("tokenfactory", MINTER));
        assert!(!keeper.has_permission(FEE_COLLECTOR_NAME, MINTER));
        assert!(matches!(
            keeper.module_account("unknown"),
            Err(TestEnvError::NotFound(_))
        ));
    }

    #[test]
    fn test_module_address_is_truncated_hash() {
        let address = new_module_address("bonded_tokens_pool");
        assert_eq!(
            address.as_bytes().to_vec(),
            sha256_digest(b"bonded_tokens_pool")[..20].to_vec()
        );
    }
}
