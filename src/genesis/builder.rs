use crate::consensus::{ValidatorSet, ValidatorUpdate};
use crate::error::{Result, TestEnvError};
use crate::genesis::GenesisState;
use crate::modules::auth::{self, new_module_address, GenesisAccount};
use crate::modules::bank::{self, Balance};
use crate::modules::staking::{
    self, BondStatus, Commission, Delegation, Description, BONDED_POOL_NAME,
};
use crate::modules::{consumer, wasm};
use crate::types::{Coin, Coins, Dec, Int, ValAddress};
use log::{debug, error};

pub use crate::modules::staking::DEFAULT_POWER_REDUCTION;

/// Layer a validator set, its self-delegations and the given accounts and
/// balances on top of `genesis`.
///
/// Every validator is bonded with [`DEFAULT_POWER_REDUCTION`] tokens delegated
/// by the first genesis account. The bonded pool is credited with the sum of
/// those bonds and the bank supply covers the caller balances plus the pool.
/// The consumer module receives the validator powers and the matching
/// validator set hash.
pub fn genesis_state_with_val_set(
    mut genesis: GenesisState,
    valset: &ValidatorSet,
    genesis_accounts: &[GenesisAccount],
    balances: &[Balance],
) -> Result<GenesisState> {
    let delegator = genesis_accounts.first().ok_or_else(|| {
        error!("genesis construction needs at least one genesis account");
        TestEnvError::SetupInvariant("genesis accounts must not be empty".to_string())
    })?;

    let auth_genesis: auth::GenesisState = genesis.module(auth::MODULE_NAME)?;
    genesis.set_module(
        auth::MODULE_NAME,
        &auth::GenesisState::new(auth_genesis.params, genesis_accounts),
    )?;

    let bond_amt = DEFAULT_POWER_REDUCTION.clone();
    let mut validators = Vec::with_capacity(valset.len());
    let mut delegations = Vec::with_capacity(valset.len());
    let mut init_val_powers: Vec<ValidatorUpdate> = Vec::with_capacity(valset.len());

    for val in valset.validators() {
        let operator_address = ValAddress::from_bytes(val.address.to_bytes());
        validators.push(staking::Validator {
            operator_address,
            consensus_pubkey: val.pub_key.clone(),
            jailed: false,
            status: BondStatus::Bonded,
            tokens: bond_amt.clone(),
            delegator_shares: Dec::one(),
            description: Description::default(),
            unbonding_height: 0,
            unbonding_time_unix_secs: 0,
            commission: Commission::new(Dec::zero(), Dec::zero(), Dec::zero()),
            min_self_delegation: Int::zero(),
        });
        delegations.push(Delegation::new(delegator.address, operator_address, Dec::one()));
        init_val_powers.push(val.to_update());
    }

    let staking_genesis: staking::GenesisState = genesis.module(staking::MODULE_NAME)?;
    let bond_denom = staking_genesis.params.bond_denom.clone();
    genesis.set_module(
        staking::MODULE_NAME,
        &staking::GenesisState::new(staking_genesis.params, validators, delegations),
    )?;

    let bonded_total = bond_amt.checked_mul_u64(valset.len() as u64)?;
    let bonded_coins = Coins::from_coin(Coin::from_int(bonded_total, bond_denom.as_str()))?;

    let mut total_supply = Coins::empty();
    for balance in balances {
        total_supply = total_supply.add(&balance.coins)?;
    }
    total_supply = total_supply.add(&bonded_coins)?;

    let mut all_balances = balances.to_vec();
    all_balances.push(Balance::new(new_module_address(BONDED_POOL_NAME), bonded_coins));

    let bank_genesis: bank::GenesisState = genesis.module(bank::MODULE_NAME)?;
    genesis.set_module(
        bank::MODULE_NAME,
        &bank::GenesisState::new(
            bank_genesis.params,
            all_balances,
            total_supply.clone(),
            vec![],
            vec![],
        ),
    )?;

    // Test chains let anyone upload and instantiate contracts
    let wasm_genesis = wasm::GenesisState {
        params: wasm::Params {
            code_upload_access: wasm::AccessConfig::everybody(),
            instantiate_default_permission: wasm::AccessType::Everybody,
        },
    };
    genesis.set_module(wasm::MODULE_NAME, &wasm_genesis)?;

    let mut consumer_genesis: consumer::GenesisState = genesis.module(consumer::MODULE_NAME)?;
    consumer_genesis.provider_consensus_state.next_validators_hash = valset.hash();
    consumer_genesis.initial_val_set = init_val_powers;
    consumer_genesis.params.enabled = true;
    genesis.set_module(consumer::MODULE_NAME, &consumer_genesis)?;

    debug!(
        "built genesis: {} validator(s), {} account(s), total supply {total_supply}",
        valset.len(),
        genesis_accounts.len()
    );
    Ok(genesis)
}
