//! Test chain integration tests
//!
//! Drives the harness end to end: bootstrap, block advance, funding,
//! validator queries and the token factory flow.

use chain_testenv::consensus::{Validator, ValidatorSet};
use chain_testenv::modules::auth::{new_module_address, BaseAccount};
use chain_testenv::modules::bank::Balance;
use chain_testenv::modules::staking::{self, BONDED_POOL_NAME};
use chain_testenv::modules::{tokenfactory, wasm};
use chain_testenv::wallet::ValidatorKey;
use chain_testenv::{
    genesis_state_with_val_set, new_default_genesis_state, AccAddress, Coin, Coins, Int,
    TestEnv, TestEnvConfig, TestEnvError, DEFAULT_POWER_REDUCTION,
};
use std::time::Duration;
use tempfile::tempdir;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn new_env() -> (TestEnv, tempfile::TempDir) {
    init_logging();
    let home = tempdir().unwrap();
    let env = TestEnv::with_node_home(home.path(), TestEnvConfig::default()).unwrap();
    (env, home)
}

fn untrn(amount: u128) -> Coins {
    Coins::from_coin(Coin::new(amount, "untrn")).unwrap()
}

#[test]
fn test_init_chain_context() {
    let (env, _home) = new_env();

    // Chain starts at height 1 with the configured chain id
    assert_eq!(env.ctx().block_height(), 1);
    assert_eq!(env.ctx().chain_id(), "neutron-1");
    assert_eq!(env.val_privs().len(), 1);
}

#[test]
fn test_begin_new_block_k_times() {
    let (mut env, _home) = new_env();
    let initial = env.ctx().clone();

    let k = 7;
    let delta = 6;
    for _ in 0..k {
        env.begin_new_block(delta).unwrap();
    }

    assert_eq!(env.ctx().block_height(), initial.block_height() + k as i64);
    assert_eq!(
        env.ctx().block_time(),
        initial.block_time() + Duration::from_secs(delta * k)
    );
}

#[test]
fn test_begin_new_block_with_zero_delta() {
    let (mut env, _home) = new_env();
    let initial_time = env.ctx().block_time();
    env.begin_new_block(0).unwrap();
    assert_eq!(env.ctx().block_height(), 2);
    assert_eq!(env.ctx().block_time(), initial_time);
}

#[test]
fn test_fund_account_preserves_existing_balance() {
    let (env, _home) = new_env();
    let account = env.init_account(&untrn(250)).unwrap();
    let supply_before = env.bank().supply_of("untrn").unwrap().amount;

    env.fund_account(&account.address(), &untrn(1_000)).unwrap();

    let balance = env.bank().balance(&account.address(), "untrn").unwrap();
    assert_eq!(balance, Coin::new(1_250, "untrn"));

    // Only the mint step creates value
    let supply_after = env.bank().supply_of("untrn").unwrap().amount;
    assert_eq!(supply_after, supply_before.checked_add(&Int::from(1_000u64)).unwrap());
}

#[test]
fn test_fund_account_without_minter_permission_fails() {
    init_logging();
    let home = tempdir().unwrap();
    let config = TestEnvConfig {
        funding_module: "fee_collector".to_string(),
        ..Default::default()
    };
    let env = TestEnv::with_node_home(home.path(), config).unwrap();

    let result = env.fund_account(&AccAddress::from_bytes([1; 20]), &untrn(1));
    assert!(matches!(result, Err(TestEnvError::Unauthorized(_))));
}

#[test]
fn test_fund_account_failed_send_leaves_minted_coins_in_module() {
    let (env, _home) = new_env();
    let recipient = AccAddress::from_bytes([8; 20]);
    let supply_before = env.bank().supply_of("untrn").unwrap().amount;

    let mut params = env.app.bank_keeper.params().unwrap();
    params.default_send_enabled = false;
    env.app.bank_keeper.set_params(&params).unwrap();

    let result = env.fund_account(&recipient, &untrn(500));
    assert!(matches!(result, Err(TestEnvError::Unauthorized(_))));

    // The mint went through and is not rolled back
    assert!(env.bank().all_balances(&recipient).unwrap().is_empty());
    let module_balance = env
        .bank()
        .balance(&new_module_address("tokenfactory"), "untrn")
        .unwrap();
    assert_eq!(module_balance, Coin::new(500, "untrn"));
    let supply_after = env.bank().supply_of("untrn").unwrap().amount;
    assert_eq!(supply_after, supply_before.checked_add(&Int::from(500u64)).unwrap());
}

#[test]
fn test_validator_addresses_after_init() {
    let (env, _home) = new_env();
    let addresses = env.get_validator_addresses().unwrap();

    assert_eq!(addresses.len(), 1);
    assert_eq!(addresses[0], env.val_privs()[0].operator_address());

    // Staking registry agrees with the consumer view
    let staking_validators = env.app.staking_keeper.all_validators().unwrap();
    assert_eq!(staking_validators.len(), 1);
    assert_eq!(staking_validators[0].operator_address, addresses[0]);
}

#[test]
fn test_genesis_invariants_on_chain() {
    let (env, _home) = new_env();

    let pool = env
        .bank()
        .balance(&new_module_address(BONDED_POOL_NAME), "untrn")
        .unwrap();
    assert_eq!(pool.amount, *DEFAULT_POWER_REDUCTION);

    let expected_supply = Int::from(100_000_000_000_000u64)
        .checked_add(&DEFAULT_POWER_REDUCTION)
        .unwrap();
    assert_eq!(env.bank().supply_of("untrn").unwrap().amount, expected_supply);

    let delegations = env.app.staking_keeper.delegations().unwrap();
    assert_eq!(delegations.len(), 1);
    assert_eq!(delegations[0].shares.to_string(), "1.000000000000000000");
}

#[test]
fn test_setup_default_validator_writes_signing_info() {
    let (mut env, _home) = new_env();
    env.begin_new_block(3).unwrap();
    env.setup_default_validator().unwrap();

    let cons_address = env.val_privs()[0].cons_address();
    let info = env
        .app
        .slashing_keeper
        .validator_signing_info(&cons_address)
        .unwrap()
        .expect("signing info should exist");
    assert_eq!(info.start_height, env.ctx().block_height());
    assert_eq!(info.jailed_until_unix_secs, 0);
}

#[test]
fn test_fund_validators() {
    let (env, _home) = new_env();
    env.fund_validators().unwrap();

    let address = env.val_privs()[0].account_address();
    let balance = env.bank().balance(&address, "untrn").unwrap();
    assert_eq!(balance.amount, Int::from(9_223_372_036_854_775_807u64));
}

#[test]
fn test_wasm_is_open_to_everybody() {
    let (env, _home) = new_env();
    let anyone = AccAddress::from_bytes([42; 20]);
    assert!(env.app.wasm_keeper.can_upload(&anyone).unwrap());
    assert!(env.app.wasm_keeper.can_instantiate(&anyone).unwrap());
}

#[test]
fn test_tokenfactory_flow() {
    let (env, _home) = new_env();
    let signer = env.init_account(&untrn(2_000_000_000_000)).unwrap();
    let tokenfactory = env.token_factory();
    let bank = env.bank();

    let denom = tokenfactory.create_denom(&signer, "udenom").unwrap();
    assert_eq!(denom, format!("factory/{}/udenom", signer.address()));
    assert_eq!(
        tokenfactory.denoms_from_creator(&signer.address()).unwrap(),
        vec![denom.clone()]
    );

    let coin = Coin::new(1_000_000_000, denom.as_str());
    tokenfactory.mint(&signer, &coin, &signer.address()).unwrap();
    assert_eq!(bank.balance(&signer.address(), &denom).unwrap(), coin);

    tokenfactory.burn(&signer, &coin, &signer.address()).unwrap();
    assert!(bank.balance(&signer.address(), &denom).unwrap().amount.is_zero());

    let new_admin = env.init_account(&Coins::empty()).unwrap();
    tokenfactory
        .change_admin(&signer, &denom, &new_admin.address())
        .unwrap();
    assert_eq!(
        tokenfactory.authority_metadata(&denom).unwrap().admin,
        Some(new_admin.address())
    );
    assert!(matches!(
        tokenfactory.mint(&signer, &coin, &signer.address()),
        Err(TestEnvError::Unauthorized(_))
    ));
}

#[test]
fn test_param_registry_per_harness() {
    let (mut env, _home) = new_env();

    // Token factory params are registered during setup
    let params = env.query_params::<tokenfactory::Params>().unwrap();
    assert!(params.denom_creation_fee.is_empty());

    assert!(env.query_params_json("staking").is_err());
    assert!(env.register_param_type::<staking::Params>());
    assert_eq!(env.query_params_json("staking").unwrap()["bond_denom"], "untrn");

    // A second harness does not see the first one's registrations
    let (other, _other_home) = new_env();
    assert!(other.param_types().lookup("staking").is_none());
    assert!(!env.register_param_type::<staking::Params>());
    assert!(other.query_params::<wasm::Params>().is_err());
}

#[test]
fn test_custom_config() {
    init_logging();
    let home = tempdir().unwrap();
    let config = TestEnvConfig::from_toml_str(
        r#"
        chain_id = "pion-1"
        bond_denom = "ustake"
        validator_power = 5
        genesis_time_unix_secs = 1000
        "#,
    )
    .unwrap();
    let mut env = TestEnv::with_node_home(home.path(), config).unwrap();

    assert_eq!(env.ctx().chain_id(), "pion-1");
    assert_eq!(env.app.validator_set().unwrap().total_voting_power(), 5);
    env.begin_new_block(10).unwrap();
    assert_eq!(
        env.ctx()
            .block_time()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs(),
        1010
    );
}

#[test]
fn test_invalid_config_is_rejected() {
    let home = tempdir().unwrap();
    let config = TestEnvConfig {
        validator_power: 0,
        ..Default::default()
    };
    assert!(matches!(
        TestEnv::with_node_home(home.path(), config),
        Err(TestEnvError::Config(_))
    ));
}

#[test]
fn test_out_of_range_genesis_time_is_rejected() {
    let home = tempdir().unwrap();
    let config = TestEnvConfig {
        genesis_time_unix_secs: u64::MAX,
        ..Default::default()
    };
    assert!(matches!(
        TestEnv::with_node_home(home.path(), config),
        Err(TestEnvError::Config(_))
    ));
}

#[test]
fn test_builder_scenario_single_validator() {
    let key = ValidatorKey::from_seed([9; 32]).unwrap();
    let valset = ValidatorSet::new(vec![Validator::new(key.pub_key(), 1)]).unwrap();
    let account = BaseAccount::new(AccAddress::from_bytes([5; 20]), None, 0, 0);
    let balance = Balance::new(account.address, untrn(100));

    let genesis = genesis_state_with_val_set(
        new_default_genesis_state("untrn").unwrap(),
        &valset,
        &[account],
        &[balance],
    )
    .unwrap();

    let bank: chain_testenv::modules::bank::GenesisState = genesis.module("bank").unwrap();
    let expected = Int::from(100u64).checked_add(&DEFAULT_POWER_REDUCTION).unwrap();
    assert_eq!(bank.supply.amount_of("untrn"), expected);

    let staking: staking::GenesisState = genesis.module("staking").unwrap();
    assert_eq!(staking.delegations.len(), 1);
    assert_eq!(staking.validators[0].operator_address, key.operator_address());
}
