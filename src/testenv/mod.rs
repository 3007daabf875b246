//! Test harness over the embedded chain
//!
//! [`TestEnv`] owns an initialized [`App`] and the context of its latest
//! block. Tests advance the chain with [`TestEnv::begin_new_block`], fund
//! accounts, inspect validators and decode module parameters through the
//! harness's own [`ParamTypeRegistry`].
//!
//! A `TestEnv` is single-writer: `begin_new_block` replaces the held context
//! wholesale, so references obtained from [`TestEnv::ctx`] must not be kept
//! across a block advance. Parallel tests each build their own harness.

pub mod bank;
pub mod bootstrap;
pub mod params;
pub mod tokenfactory;

pub use bank::Bank;
pub use bootstrap::{init_chain, init_chain_with_config, new_app, new_app_with_config};
pub use params::{ParamTypeDescriptor, ParamTypeRegistry};
pub use tokenfactory::TokenFactory;

use crate::app::{App, Context};
use crate::config::TestEnvConfig;
use crate::error::{Result, TestEnvError};
use crate::modules::slashing::ValidatorSigningInfo;
use crate::modules::{tokenfactory as tokenfactory_module, ParamSet};
use crate::types::{AccAddress, Coin, Coins, ValAddress};
use crate::wallet::{SigningAccount, ValidatorKey};
use log::{debug, error, info};
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

pub struct TestEnv {
    pub app: App,
    ctx: Context,
    param_types: ParamTypeRegistry,
    val_privs: Vec<ValidatorKey>,
    node_home: PathBuf,
    config: TestEnvConfig,
}

impl TestEnv {
    /// Harness with the default configuration under a fresh temporary node home
    pub fn new() -> Result<TestEnv> {
        Self::with_config(TestEnvConfig::default())
    }

    pub fn with_config(config: TestEnvConfig) -> Result<TestEnv> {
        let node_home = std::env::temp_dir().join(format!("chain-testenv-{}", Uuid::new_v4()));
        Self::with_node_home(node_home, config)
    }

    pub fn with_node_home(node_home: impl AsRef<Path>, config: TestEnvConfig) -> Result<TestEnv> {
        config.validate()?;
        let node_home = node_home.as_ref().to_path_buf();

        let mut app = bootstrap::new_app_with_config(&node_home, &config)?;
        let (ctx, val_priv) = bootstrap::init_chain_with_config(&mut app, &config)?;

        let mut env = TestEnv {
            app,
            ctx,
            param_types: ParamTypeRegistry::new(),
            val_privs: vec![val_priv],
            node_home,
            config,
        };
        env.setup_param_types();
        Ok(env)
    }

    /// Context of the latest block. Valid until the next block advance.
    pub fn ctx(&self) -> &Context {
        &self.ctx
    }

    pub fn node_home(&self) -> &Path {
        &self.node_home
    }

    pub fn config(&self) -> &TestEnvConfig {
        &self.config
    }

    pub fn val_privs(&self) -> &[ValidatorKey] {
        &self.val_privs
    }

    pub fn param_types(&self) -> &ParamTypeRegistry {
        &self.param_types
    }

    pub fn bank(&self) -> Bank<'_> {
        Bank::new(self)
    }

    pub fn token_factory(&self) -> TokenFactory<'_> {
        TokenFactory::new(self)
    }

    /// Begin the next block `time_increase_secs` after the current one.
    /// The held context is re-read from the app once the block has begun.
    pub fn begin_new_block(&mut self, time_increase_secs: u64) -> Result<()> {
        let new_time = self
            .ctx
            .block_time()
            .checked_add(Duration::from_secs(time_increase_secs))
            .ok_or_else(|| {
                TestEnvError::ChainState(format!(
                    "block time overflow adding {time_increase_secs}s"
                ))
            })?;
        let new_height = self.ctx.block_height().checked_add(1).ok_or_else(|| {
            TestEnvError::ChainState("block height overflow".to_string())
        })?;

        let next = self
            .ctx
            .with_block_time(new_time)
            .with_block_height(new_height);
        self.app.begin_blocker(&next)?;
        self.ctx = self.app.new_context();
        debug!("advanced to height {}", self.ctx.block_height());
        Ok(())
    }

    /// Mint `coins` through the funding module and hand them to `address`
    pub fn fund_account(&self, address: &AccAddress, coins: &Coins) -> Result<()> {
        let module = self.config.funding_module.as_str();
        self.app.bank_keeper.mint_coins(module, coins).map_err(|e| {
            error!("Failed to fund account {address}: {e}");
            e
        })?;
        self.app
            .bank_keeper
            .send_coins_from_module_to_account(module, address, coins)
            .map_err(|e| {
                error!("Failed to fund account {address}: {e}");
                e
            })
    }

    /// Fund the account of every held validator key
    pub fn fund_validators(&self) -> Result<()> {
        let coins = Coins::from_coin(Coin::new(
            u128::from(self.config.validator_funding_amount),
            self.config.bond_denom.as_str(),
        ))?;
        for val_priv in &self.val_privs {
            self.fund_account(&val_priv.account_address(), &coins)?;
        }
        Ok(())
    }

    /// Operator addresses of the validators known to the chain
    pub fn get_validator_addresses(&self) -> Result<Vec<ValAddress>> {
        Ok(self
            .app
            .consumer_keeper
            .all_validators()?
            .into_iter()
            .map(|v| v.operator_address)
            .collect())
    }

    /// Write a fresh signing info record for the first validator at the
    /// current height
    pub fn setup_default_validator(&self) -> Result<()> {
        let validators = self.app.consumer_keeper.all_validators()?;
        let validator = validators.first().ok_or_else(|| {
            TestEnvError::NotFound("chain has no validators".to_string())
        })?;
        let cons_address = validator.consensus_pubkey.cons_address();

        let signing_info =
            ValidatorSigningInfo::new(cons_address, self.ctx.block_height(), 0, 0, false, 0);
        self.app
            .slashing_keeper
            .set_validator_signing_info(&signing_info)?;
        info!("signing info set for validator {cons_address}");
        Ok(())
    }

    pub fn setup_param_types(&mut self) {
        self.param_types.register::<tokenfactory_module::Params>();
    }

    pub fn register_param_type<P: ParamSet>(&mut self) -> bool {
        self.param_types.register::<P>()
    }

    pub fn register_param_set<P: ParamSet>(&mut self, params: &P) -> bool {
        self.param_types.register_param_set(params)
    }

    /// Params of a module, decoded through its registered type.
    /// Fails with `NotFound` when the subspace was never registered.
    pub fn query_params_json(&self, subspace: &str) -> Result<serde_json::Value> {
        let descriptor = self.param_types.lookup(subspace).ok_or_else(|| {
            TestEnvError::NotFound(format!("no param type registered for {subspace}"))
        })?;
        descriptor.decode(self.app.module_params_json(subspace)?)
    }

    pub fn query_params<P: ParamSet>(&self) -> Result<P> {
        if self.param_types.lookup_type::<P>().is_none() {
            return Err(TestEnvError::NotFound(format!(
                "no param type registered for {}",
                P::SUBSPACE
            )));
        }
        let raw = self.app.module_params_json(P::SUBSPACE)?;
        serde_json::from_value(raw).map_err(|e| {
            TestEnvError::Serialization(format!("failed to decode {} params: {e}", P::SUBSPACE))
        })
    }

    /// New account registered on chain and funded with `coins`
    pub fn init_account(&self, coins: &Coins) -> Result<SigningAccount> {
        let account = SigningAccount::generate()?;
        self.app
            .account_keeper
            .new_account_with_address(&account.address(), Some(account.pub_key()))?;
        if !coins.is_empty() {
            self.fund_account(&account.address(), coins)?;
        }
        Ok(account)
    }

    pub fn init_accounts(&self, coins: &Coins, count: usize) -> Result<Vec<SigningAccount>> {
        (0..count).map(|_| self.init_account(coins)).collect()
    }
}
