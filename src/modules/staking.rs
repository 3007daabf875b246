use crate::app::{Context, Store};
use crate::consensus::PubKey;
use crate::error::{Result, TestEnvError};
use crate::modules::auth::new_module_address;
use crate::modules::bank::BankKeeper;
use crate::types::{AccAddress, Dec, Int, ValAddress};
use log::debug;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::UNIX_EPOCH;

pub const MODULE_NAME: &str = "staking";
pub const BONDED_POOL_NAME: &str = "bonded_tokens_pool";
pub const NOT_BONDED_POOL_NAME: &str = "not_bonded_tokens_pool";

const VALIDATORS_TREE: &str = "staking_validators";
const DELEGATIONS_TREE: &str = "staking_delegations";
const HISTORICAL_TREE: &str = "staking_historical_info";
const META_TREE: &str = "staking_meta";
const PARAMS_KEY: &[u8] = b"params";

/// Tokens per unit of consensus power
pub static DEFAULT_POWER_REDUCTION: Lazy<Int> = Lazy::new(|| Int::from(1_000_000u64));

/// Token amount that carries `power` units of consensus power
pub fn tokens_from_consensus_power(power: i64) -> Result<Int> {
    let power = u64::try_from(power).map_err(|_| {
        TestEnvError::InvalidValidatorSet(format!("negative consensus power {power}"))
    })?;
    DEFAULT_POWER_REDUCTION.checked_mul_u64(power)
}

const DEFAULT_UNBONDING_TIME_SECS: u64 = 21 * 24 * 60 * 60;
const DEFAULT_MAX_VALIDATORS: u32 = 100;
const DEFAULT_MAX_ENTRIES: u32 = 7;
const DEFAULT_HISTORICAL_ENTRIES: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BondStatus {
    Unspecified,
    Unbonded,
    Unbonding,
    Bonded,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    pub moniker: String,
    pub identity: String,
    pub website: String,
    pub security_contact: String,
    pub details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionRates {
    pub rate: Dec,
    pub max_rate: Dec,
    pub max_change_rate: Dec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commission {
    pub commission_rates: CommissionRates,
    pub update_time_unix_secs: u64,
}

impl Commission {
    pub fn new(rate: Dec, max_rate: Dec, max_change_rate: Dec) -> Commission {
        Commission {
            commission_rates: CommissionRates {
                rate,
                max_rate,
                max_change_rate,
            },
            update_time_unix_secs: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    pub operator_address: ValAddress,
    pub consensus_pubkey: PubKey,
    pub jailed: bool,
    pub status: BondStatus,
    pub tokens: Int,
    pub delegator_shares: Dec,
    pub description: Description,
    pub unbonding_height: i64,
    pub unbonding_time_unix_secs: u64,
    pub commission: Commission,
    pub min_self_delegation: Int,
}

impl Validator {
    pub fn is_bonded(&self) -> bool {
        self.status == BondStatus::Bonded
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    pub delegator_address: AccAddress,
    pub validator_address: ValAddress,
    pub shares: Dec,
}

impl Delegation {
    pub fn new(
        delegator_address: AccAddress,
        validator_address: ValAddress,
        shares: Dec,
    ) -> Delegation {
        Delegation {
            delegator_address,
            validator_address,
            shares,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    pub unbonding_time_secs: u64,
    pub max_validators: u32,
    pub max_entries: u32,
    pub historical_entries: u32,
    pub bond_denom: String,
    pub min_commission_rate: Dec,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            unbonding_time_secs: DEFAULT_UNBONDING_TIME_SECS,
            max_validators: DEFAULT_MAX_VALIDATORS,
            max_entries: DEFAULT_MAX_ENTRIES,
            historical_entries: DEFAULT_HISTORICAL_ENTRIES,
            bond_denom: crate::config::DEFAULT_BOND_DENOM.to_string(),
            min_commission_rate: Dec::zero(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastValidatorPower {
    pub address: ValAddress,
    pub power: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub params: Params,
    pub last_total_power: i64,
    pub last_validator_powers: Vec<LastValidatorPower>,
    pub validators: Vec<Validator>,
    pub delegations: Vec<Delegation>,
    pub exported: bool,
}

impl GenesisState {
    pub fn new(
        params: Params,
        validators: Vec<Validator>,
        delegations: Vec<Delegation>,
    ) -> GenesisState {
        GenesisState {
            params,
            validators,
            delegations,
            ..Default::default()
        }
    }
}

/// Header and validator set recorded at a height
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalInfo {
    pub height: i64,
    pub time_unix_secs: u64,
    pub valset: Vec<Validator>,
}

fn delegation_key(delegator: &AccAddress, validator: &ValAddress) -> Vec<u8> {
    let mut key = delegator.to_bytes().to_vec();
    key.extend_from_slice(validator.as_bytes());
    key
}

fn height_key(height: i64) -> [u8; 8] {
    height.to_be_bytes()
}

#[derive(Clone)]
pub struct StakingKeeper {
    store: Store,
    bank: BankKeeper,
}

impl StakingKeeper {
    pub fn new(store: Store, bank: BankKeeper) -> StakingKeeper {
        StakingKeeper { store, bank }
    }

    pub fn init_genesis(&self, genesis: &GenesisState) -> Result<()> {
        self.store.set(META_TREE, PARAMS_KEY, &genesis.params)?;
        let bond_denom = &genesis.params.bond_denom;

        let mut bonded_tokens = Int::zero();
        let mut not_bonded_tokens = Int::zero();
        let mut operators = HashSet::new();
        for validator in &genesis.validators {
            if !operators.insert(validator.operator_address) {
                return Err(TestEnvError::InvalidGenesis(format!(
                    "duplicate validator {} in staking genesis",
                    validator.operator_address
                )));
            }
            match validator.status {
                BondStatus::Bonded => bonded_tokens = bonded_tokens.checked_add(&validator.tokens)?,
                BondStatus::Unbonding | BondStatus::Unbonded => {
                    not_bonded_tokens = not_bonded_tokens.checked_add(&validator.tokens)?
                }
                BondStatus::Unspecified => {
                    return Err(TestEnvError::InvalidGenesis(format!(
                        "validator {} has unspecified bond status",
                        validator.operator_address
                    )))
                }
            }
            self.set_validator(validator)?;
        }

        for delegation in &genesis.delegations {
            if !operators.contains(&delegation.validator_address) {
                return Err(TestEnvError::InvalidGenesis(format!(
                    "delegation from {} to unknown validator {}",
                    delegation.delegator_address, delegation.validator_address
                )));
            }
            self.store.set(
                DELEGATIONS_TREE,
                &delegation_key(&delegation.delegator_address, &delegation.validator_address),
                delegation,
            )?;
        }

        self.check_pool(BONDED_POOL_NAME, bond_denom, &bonded_tokens)?;
        self.check_pool(NOT_BONDED_POOL_NAME, bond_denom, &not_bonded_tokens)?;

        debug!(
            "staking genesis: {} validator(s), {} delegation(s), {}{} bonded",
            genesis.validators.len(),
            genesis.delegations.len(),
            bonded_tokens,
            bond_denom
        );
        Ok(())
    }

    fn check_pool(&self, pool: &str, denom: &str, expected: &Int) -> Result<()> {
        let balance = self.bank.balance(&new_module_address(pool), denom)?.amount;
        if &balance != expected {
            return Err(TestEnvError::InvalidGenesis(format!(
                "{pool} balance is different from {pool} coins: {balance} and {expected}"
            )));
        }
        Ok(())
    }

    pub fn params(&self) -> Result<Params> {
        Ok(self.store.get(META_TREE, PARAMS_KEY)?.unwrap_or_default())
    }

    pub fn set_validator(&self, validator: &Validator) -> Result<()> {
        self.store
            .set(VALIDATORS_TREE, validator.operator_address.as_bytes(), validator)
    }

    pub fn validator(&self, operator: &ValAddress) -> Result<Option<Validator>> {
        self.store.get(VALIDATORS_TREE, operator.as_bytes())
    }

    /// Every registered validator, ordered by operator address
    pub fn all_validators(&self) -> Result<Vec<Validator>> {
        self.store.values(VALIDATORS_TREE)
    }

    pub fn bonded_validators(&self) -> Result<Vec<Validator>> {
        Ok(self
            .all_validators()?
            .into_iter()
            .filter(Validator::is_bonded)
            .collect())
    }

    pub fn delegation(
        &self,
        delegator: &AccAddress,
        validator: &ValAddress,
    ) -> Result<Option<Delegation>> {
        self.store
            .get(DELEGATIONS_TREE, &delegation_key(delegator, validator))
    }

    pub fn delegations(&self) -> Result<Vec<Delegation>> {
        self.store.values(DELEGATIONS_TREE)
    }

    pub fn delegator_delegations(&self, delegator: &AccAddress) -> Result<Vec<Delegation>> {
        Ok(self
            .store
            .scan_prefix(DELEGATIONS_TREE, delegator.as_bytes())?
            .into_iter()
            .map(|(_, delegation)| delegation)
            .collect())
    }

    pub fn historical_info(&self, height: i64) -> Result<Option<HistoricalInfo>> {
        self.store.get(HISTORICAL_TREE, &height_key(height))
    }

    pub fn begin_blocker(&self, ctx: &Context) -> Result<()> {
        self.track_historical_info(ctx)
    }

    /// Record the bonded set for the context height and drop entries that
    /// fall outside the `historical_entries` window
    pub fn track_historical_info(&self, ctx: &Context) -> Result<()> {
        let entries = i64::from(self.params()?.historical_entries);
        let height = ctx.block_height();

        let mut stale = height - entries;
        while stale >= 0 && self.store.contains(HISTORICAL_TREE, &height_key(stale))? {
            self.store.remove(HISTORICAL_TREE, &height_key(stale))?;
            stale -= 1;
        }
        if entries == 0 {
            return Ok(());
        }

        let time_unix_secs = ctx
            .block_time()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| TestEnvError::ChainState(format!("block time before unix epoch: {e}")))?
            .as_secs();
        let info = HistoricalInfo {
            height,
            time_unix_secs,
            valset: self.bonded_validators()?,
        };
        self.store.set(HISTORICAL_TREE, &height_key(height), &info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::auth::AccountKeeper;
    use crate::modules::bank::{self, Balance};
    use crate::modules::module_account_permissions;
    use crate::types::{Coin, Coins, ADDRESS_LEN};
    use std::time::Duration;

    fn keepers() -> (StakingKeeper, BankKeeper, tempfile::TempDir) {
        let home = tempfile::tempdir().unwrap();
        let store = Store::open_temporary(home.path()).unwrap();
        let accounts = AccountKeeper::new(store.clone(), module_account_permissions());
        let bank = BankKeeper::new(store.clone(), accounts);
        (StakingKeeper::new(store, bank.clone()), bank, home)
    }

    fn bonded_validator(byte: u8, tokens: u64) -> Validator {
        Validator {
            operator_address: ValAddress::from_bytes([byte; ADDRESS_LEN]),
            consensus_pubkey: PubKey::Ed25519(vec![byte; 32]),
            jailed: false,
            status: BondStatus::Bonded,
            tokens: Int::from(tokens),
            delegator_shares: Dec::one(),
            description: Description::default(),
            unbonding_height: 0,
            unbonding_time_unix_secs: 0,
            commission: Commission::default(),
            min_self_delegation: Int::zero(),
        }
    }

    fn fund_bonded_pool(bank: &BankKeeper, amount: u128) {
        let pool = Balance::new(
            new_module_address(BONDED_POOL_NAME),
            Coins::from_coin(Coin::new(amount, "untrn")).unwrap(),
        );
        bank.init_genesis(&bank::GenesisState {
            balances: vec![pool],
            ..Default::default()
        })
        .unwrap();
    }

    #[test]
    fn test_genesis_with_matching_pool() {
        let (staking, bank, _home) = keepers();
        fund_bonded_pool(&bank, 1_000_000);
        let validator = bonded_validator(1, 1_000_000);
        let delegation = Delegation::new(
            AccAddress::from_bytes([9; ADDRESS_LEN]),
            validator.operator_address,
            Dec::one(),
        );
        staking
            .init_genesis(&GenesisState::new(
                Params::default(),
                vec![validator.clone()],
                vec![delegation.clone()],
            ))
            .unwrap();

        assert_eq!(staking.all_validators().unwrap(), vec![validator]);
        assert_eq!(staking.delegations().unwrap(), vec![delegation]);
    }

    #[test]
    fn test_genesis_rejects_pool_mismatch() {
        let (staking, bank, _home) = keepers();
        fund_bonded_pool(&bank, 999_999);
        let genesis =
            GenesisState::new(Params::default(), vec![bonded_validator(1, 1_000_000)], vec![]);
        assert!(matches!(
            staking.init_genesis(&genesis),
            Err(TestEnvError::InvalidGenesis(_))
        ));
    }

    #[test]
    fn test_genesis_rejects_unknown_delegation_target() {
        let (staking, _bank, _home) = keepers();
        let delegation = Delegation::new(
            AccAddress::from_bytes([9; ADDRESS_LEN]),
            ValAddress::from_bytes([3; ADDRESS_LEN]),
            Dec::one(),
        );
        let genesis = GenesisState::new(Params::default(), vec![], vec![delegation]);
        assert!(matches!(
            staking.init_genesis(&genesis),
            Err(TestEnvError::InvalidGenesis(_))
        ));
    }

    #[test]
    fn test_historical_info_is_pruned() {
        let (staking, _bank, _home) = keepers();
        let params = Params {
            historical_entries: 2,
            ..Params::default()
        };
        staking
            .init_genesis(&GenesisState::new(params, vec![], vec![]))
            .unwrap();

        let ctx = Context::new("neutron-1", 1, UNIX_EPOCH);
        for height in 1..=4 {
            let ctx = ctx
                .with_block_height(height)
                .with_block_time(UNIX_EPOCH + Duration::from_secs(height as u64));
            staking.begin_blocker(&ctx).unwrap();
        }

        assert!(staking.historical_info(1).unwrap().is_none());
        assert!(staking.historical_info(2).unwrap().is_none());
        let latest = staking.historical_info(4).unwrap().unwrap();
        assert_eq!(latest.time_unix_secs, 4);
        assert!(staking.historical_info(3).unwrap().is_some());
    }
}
