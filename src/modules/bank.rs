use crate::app::Store;
use crate::error::{Result, TestEnvError};
use crate::modules::auth::{AccountKeeper, BURNER, MINTER};
use crate::types::{AccAddress, Coin, Coins, Int, ADDRESS_LEN};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const MODULE_NAME: &str = "bank";

const BALANCES_TREE: &str = "bank_balances";
const SUPPLY_TREE: &str = "bank_supply";
const METADATA_TREE: &str = "bank_metadata";
const META_TREE: &str = "bank_meta";
const PARAMS_KEY: &[u8] = b"params";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendEnabled {
    pub denom: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    pub send_enabled: Vec<SendEnabled>,
    pub default_send_enabled: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            send_enabled: Vec::new(),
            default_send_enabled: true,
        }
    }
}

impl Params {
    pub fn is_send_enabled(&self, denom: &str) -> bool {
        self.send_enabled
            .iter()
            .find(|s| s.denom == denom)
            .map_or(self.default_send_enabled, |s| s.enabled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub address: AccAddress,
    pub coins: Coins,
}

impl Balance {
    pub fn new(address: AccAddress, coins: Coins) -> Balance {
        Balance { address, coins }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenomUnit {
    pub denom: String,
    pub exponent: u32,
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub description: String,
    pub denom_units: Vec<DenomUnit>,
    pub base: String,
    pub display: String,
    pub name: String,
    pub symbol: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub params: Params,
    pub balances: Vec<Balance>,
    /// Total supply. Empty means "derive it from the balances".
    pub supply: Coins,
    pub denom_metadata: Vec<Metadata>,
    pub send_enabled: Vec<SendEnabled>,
}

impl GenesisState {
    pub fn new(
        params: Params,
        balances: Vec<Balance>,
        supply: Coins,
        denom_metadata: Vec<Metadata>,
        send_enabled: Vec<SendEnabled>,
    ) -> GenesisState {
        GenesisState {
            params,
            balances,
            supply,
            denom_metadata,
            send_enabled,
        }
    }
}

fn balance_key(address: &AccAddress, denom: &str) -> Vec<u8> {
    let mut key = address.to_bytes().to_vec();
    key.extend_from_slice(denom.as_bytes());
    key
}

#[derive(Clone)]
pub struct BankKeeper {
    store: Store,
    accounts: AccountKeeper,
}

impl BankKeeper {
    pub fn new(store: Store, accounts: AccountKeeper) -> BankKeeper {
        BankKeeper { store, accounts }
    }

    pub fn init_genesis(&self, genesis: &GenesisState) -> Result<()> {
        let mut seen = BTreeSet::new();
        let mut total = Coins::empty();
        for balance in &genesis.balances {
            if !seen.insert(balance.address) {
                return Err(TestEnvError::InvalidGenesis(format!(
                    "duplicate balance for address {}",
                    balance.address
                )));
            }
            total = total.add(&balance.coins)?;
        }
        if !genesis.supply.is_empty() && genesis.supply != total {
            return Err(TestEnvError::InvalidGenesis(format!(
                "genesis supply is incorrect, expected {}, got {}",
                genesis.supply, total
            )));
        }

        for balance in &genesis.balances {
            for coin in &balance.coins {
                self.set_balance(&balance.address, &coin.denom, &coin.amount)?;
            }
        }
        for coin in &total {
            self.store
                .set(SUPPLY_TREE, coin.denom.as_bytes(), &coin.amount)?;
        }
        for metadata in &genesis.denom_metadata {
            self.set_denom_metadata(metadata)?;
        }

        let mut params = genesis.params.clone();
        params.send_enabled.extend(genesis.send_enabled.iter().cloned());
        self.set_params(&params)?;

        debug!(
            "bank genesis: {} balance(s), supply {}",
            genesis.balances.len(),
            total
        );
        Ok(())
    }

    pub fn set_params(&self, params: &Params) -> Result<()> {
        self.store.set(META_TREE, PARAMS_KEY, params)
    }

    pub fn params(&self) -> Result<Params> {
        Ok(self.store.get(META_TREE, PARAMS_KEY)?.unwrap_or_default())
    }

    pub fn denom_metadata(&self, denom: &str) -> Result<Option<Metadata>> {
        self.store.get(METADATA_TREE, denom.as_bytes())
    }

    pub fn set_denom_metadata(&self, metadata: &Metadata) -> Result<()> {
        self.store
            .set(METADATA_TREE, metadata.base.as_bytes(), metadata)
    }

    fn set_balance(&self, address: &AccAddress, denom: &str, amount: &Int) -> Result<()> {
        let key = balance_key(address, denom);
        if amount.is_zero() {
            self.store.remove(BALANCES_TREE, &key)
        } else {
            self.store.set(BALANCES_TREE, &key, amount)
        }
    }

    pub fn balance(&self, address: &AccAddress, denom: &str) -> Result<Coin> {
        let amount: Option<Int> = self
            .store
            .get(BALANCES_TREE, &balance_key(address, denom))?;
        Ok(Coin::from_int(amount.unwrap_or_default(), denom))
    }

    pub fn all_balances(&self, address: &AccAddress) -> Result<Coins> {
        let entries: Vec<(Vec<u8>, Int)> =
            self.store.scan_prefix(BALANCES_TREE, address.as_bytes())?;
        let mut coins = Vec::with_capacity(entries.len());
        for (key, amount) in entries {
            let denom = String::from_utf8(key[ADDRESS_LEN..].to_vec()).map_err(|e| {
                TestEnvError::Database(format!("Corrupt balance key for {address}: {e}"))
            })?;
            coins.push(Coin::from_int(amount, denom));
        }
        Coins::new(coins)
    }

    pub fn supply_of(&self, denom: &str) -> Result<Coin> {
        let amount: Option<Int> = self.store.get(SUPPLY_TREE, denom.as_bytes())?;
        Ok(Coin::from_int(amount.unwrap_or_default(), denom))
    }

    pub fn total_supply(&self) -> Result<Coins> {
        let entries: Vec<(Vec<u8>, Int)> = self.store.scan_prefix(SUPPLY_TREE, &[])?;
        let mut coins = Vec::with_capacity(entries.len());
        for (key, amount) in entries {
            let denom = String::from_utf8(key)
                .map_err(|e| TestEnvError::Database(format!("Corrupt supply key: {e}")))?;
            coins.push(Coin::from_int(amount, denom));
        }
        Coins::new(coins)
    }

    fn subtract_coins(&self, address: &AccAddress, amounts: &Coins) -> Result<()> {
        let available = self.all_balances(address)?;
        let remaining = available.checked_sub(amounts).ok_or_else(|| {
            TestEnvError::InsufficientFunds {
                address: address.to_string(),
                required: amounts.to_string(),
                available: available.to_string(),
            }
        })?;
        for coin in amounts {
            self.set_balance(address, &coin.denom, &remaining.amount_of(&coin.denom))?;
        }
        Ok(())
    }

    fn add_coins(&self, address: &AccAddress, amounts: &Coins) -> Result<()> {
        for coin in amounts {
            let current = self.balance(address, &coin.denom)?.amount;
            self.set_balance(address, &coin.denom, &current.checked_add(&coin.amount)?)?;
        }
        Ok(())
    }

    /// Move coins between two accounts. The recipient account is created if
    /// it does not exist yet.
    pub fn send_coins(&self, from: &AccAddress, to: &AccAddress, amounts: &Coins) -> Result<()> {
        let params = self.params()?;
        if let Some(coin) = amounts.iter().find(|c| !params.is_send_enabled(&c.denom)) {
            return Err(TestEnvError::Unauthorized(format!(
                "{} transfers are currently disabled",
                coin.denom
            )));
        }
        // Check the recipient side before touching the sender
        for coin in amounts {
            self.balance(to, &coin.denom)?
                .amount
                .checked_add(&coin.amount)?;
        }
        self.subtract_coins(from, amounts)?;
        self.add_coins(to, amounts)?;
        self.accounts.new_account_with_address(to, None)?;
        Ok(())
    }

    pub fn mint_coins(&self, module: &str, amounts: &Coins) -> Result<()> {
        if !self.accounts.has_permission(module, MINTER) {
            return Err(TestEnvError::Unauthorized(format!(
                "module account {module} does not have permissions to mint tokens"
            )));
        }
        let module_address = self.accounts.module_account(module)?.base.address;
        let mut new_supply = Vec::with_capacity(amounts.len());
        for coin in amounts {
            let supply = self.supply_of(&coin.denom)?.amount.checked_add(&coin.amount)?;
            new_supply.push((coin.denom.clone(), supply));
        }
        self.add_coins(&module_address, amounts)?;
        for (denom, supply) in new_supply {
            self.store.set(SUPPLY_TREE, denom.as_bytes(), &supply)?;
        }
        debug!("minted {amounts} to module {module}");
        Ok(())
    }

    pub fn burn_coins(&self, module: &str, amounts: &Coins) -> Result<()> {
        if !self.accounts.has_permission(module, BURNER) {
            return Err(TestEnvError::Unauthorized(format!(
                "module account {module} does not have permissions to burn tokens"
            )));
        }
        let module_address = self.accounts.module_account(module)?.base.address;
        let mut new_supply = Vec::with_capacity(amounts.len());
        for coin in amounts {
            let supply = self
                .supply_of(&coin.denom)?
                .amount
                .checked_sub(&coin.amount)
                .ok_or_else(|| {
                    TestEnvError::ChainState(format!("burn of {coin} exceeds tracked supply"))
                })?;
            new_supply.push((coin.denom.clone(), supply));
        }
        self.subtract_coins(&module_address, amounts)?;
        for (denom, supply) in new_supply {
            if supply.is_zero() {
                self.store.remove(SUPPLY_TREE, denom.as_bytes())?;
            } else {
                self.store.set(SUPPLY_TREE, denom.as_bytes(), &supply)?;
            }
        }
        debug!("burned {amounts} from module {module}");
        Ok(())
    }

    pub fn send_coins_from_module_to_account(
        &self,
        module: &str,
        to: &AccAddress,
        amounts: &Coins,
    ) -> Result<()> {
        let module_address = self.accounts.module_account(module)?.base.address;
        self.send_coins(&module_address, to, amounts)
    }

    pub fn send_coins_from_account_to_module(
        &self,
        from: &AccAddress,
        module: &str,
        amounts: &Coins,
    ) -> Result<()> {
        let module_address = self.accounts.module_account(module)?.base.address;
        self.send_coins(from, &module_address, amounts)
    }
}
