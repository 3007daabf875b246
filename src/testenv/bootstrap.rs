use crate::app::{App, AppOptions, Context, RequestInitChain};
use crate::config::TestEnvConfig;
use crate::consensus::{ConsensusParams, Validator, ValidatorSet};
use crate::error::Result;
use crate::genesis::{genesis_state_with_val_set, new_default_genesis_state};
use crate::modules::auth::BaseAccount;
use crate::modules::bank::Balance;
use crate::types::{Coin, Coins};
use crate::wallet::{SigningAccount, ValidatorKey};
use log::{debug, info};
use std::path::Path;

/// Application with the default configuration
pub fn new_app(node_home: &Path) -> Result<App> {
    new_app_with_config(node_home, &TestEnvConfig::default())
}

pub fn new_app_with_config(node_home: &Path, config: &TestEnvConfig) -> Result<App> {
    App::new(
        node_home,
        AppOptions {
            chain_id: config.chain_id.clone(),
            trace: config.trace,
        },
    )
}

/// Initialize `app` with the default configuration
pub fn init_chain(app: &mut App) -> Result<(Context, ValidatorKey)> {
    init_chain_with_config(app, &TestEnvConfig::default())
}

/// Run InitChain with a single fresh validator and a single funded account.
/// Returns the genesis context and the validator key.
pub fn init_chain_with_config(
    app: &mut App,
    config: &TestEnvConfig,
) -> Result<(Context, ValidatorKey)> {
    let val_key = ValidatorKey::generate()?;
    let valset = ValidatorSet::new(vec![Validator::new(
        val_key.pub_key(),
        config.validator_power,
    )])?;

    let sender = SigningAccount::generate()?;
    let account = BaseAccount::new(sender.address(), Some(sender.pub_key()), 0, 0);
    let balance = Balance::new(
        account.address,
        Coins::from_coin(Coin::new(
            u128::from(config.genesis_account_balance),
            config.bond_denom.as_str(),
        ))?,
    );

    let genesis = genesis_state_with_val_set(
        new_default_genesis_state(&config.bond_denom)?,
        &valset,
        &[account],
        &[balance],
    )?;
    let app_state_bytes = genesis.to_json_bytes()?;
    debug!("genesis document is {} bytes", app_state_bytes.len());

    app.init_chain(RequestInitChain {
        time: config.genesis_time()?,
        chain_id: config.chain_id.clone(),
        consensus_params: ConsensusParams::default(),
        validators: vec![],
        app_state_bytes,
        initial_height: 1,
    })?;

    let ctx = app.new_context();
    info!(
        "chain {} ready at height {} with validator {}",
        ctx.chain_id(),
        ctx.block_height(),
        val_key.cons_address()
    );
    Ok((ctx, val_key))
}
