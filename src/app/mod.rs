//! Embedded chain runtime
//!
//! [`App`] owns the store and the module keepers. It is initialized exactly
//! once through [`App::init_chain`] and then advanced one block at a time with
//! [`App::begin_blocker`]. The current block header is exposed as a
//! [`Context`] value through [`App::new_context`].

pub mod abci;
pub mod context;
pub mod store;

pub use abci::{RequestInitChain, ResponseInitChain};
pub use context::Context;
pub use store::Store;

use crate::config::DEFAULT_CHAIN_ID;
use crate::consensus::{ConsensusParams, ValidatorSet, ValidatorUpdate};
use crate::error::{Result, TestEnvError};
use crate::genesis::GenesisState;
use crate::modules::{
    auth, bank, consumer, module_account_permissions, slashing, staking, tokenfactory, wasm,
    AccountKeeper, BankKeeper, ConsumerKeeper, SlashingKeeper, StakingKeeper, TokenFactoryKeeper,
    WasmKeeper,
};
use log::{debug, error, info};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppOptions {
    pub chain_id: String,
    /// Log full error detail for rejected genesis and block calls
    pub trace: bool,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            chain_id: DEFAULT_CHAIN_ID.to_string(),
            trace: true,
        }
    }
}

pub struct App {
    store: Store,
    node_home: PathBuf,
    options: AppOptions,
    header: Option<Context>,
    consensus_params: Option<ConsensusParams>,
    validator_set: Option<ValidatorSet>,
    pub account_keeper: AccountKeeper,
    pub bank_keeper: BankKeeper,
    pub staking_keeper: StakingKeeper,
    pub slashing_keeper: SlashingKeeper,
    pub wasm_keeper: WasmKeeper,
    pub tokenfactory_keeper: TokenFactoryKeeper,
    pub consumer_keeper: ConsumerKeeper,
}

impl App {
    /// Create an uninitialized application with a temporary store under `node_home`
    pub fn new(node_home: impl AsRef<Path>, options: AppOptions) -> Result<App> {
        let node_home = node_home.as_ref().to_path_buf();
        let store = Store::open_temporary(&node_home)?;

        let account_keeper = AccountKeeper::new(store.clone(), module_account_permissions());
        let bank_keeper = BankKeeper::new(store.clone(), account_keeper.clone());
        let staking_keeper = StakingKeeper::new(store.clone(), bank_keeper.clone());
        let tokenfactory_keeper = TokenFactoryKeeper::new(store.clone(), bank_keeper.clone());

        debug!(
            "created app for chain {} at {}",
            options.chain_id,
            node_home.display()
        );
        Ok(App {
            slashing_keeper: SlashingKeeper::new(store.clone()),
            wasm_keeper: WasmKeeper::new(store.clone()),
            consumer_keeper: ConsumerKeeper::new(store.clone()),
            store,
            node_home,
            options,
            header: None,
            consensus_params: None,
            validator_set: None,
            account_keeper,
            bank_keeper,
            staking_keeper,
            tokenfactory_keeper,
        })
    }

    pub fn chain_id(&self) -> &str {
        &self.options.chain_id
    }

    pub fn node_home(&self) -> &Path {
        &self.node_home
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn is_initialized(&self) -> bool {
        self.header.is_some()
    }

    pub fn consensus_params(&self) -> Option<&ConsensusParams> {
        self.consensus_params.as_ref()
    }

    pub fn validator_set(&self) -> Option<&ValidatorSet> {
        self.validator_set.as_ref()
    }

    /// One-time chain initialization from a JSON genesis document
    pub fn init_chain(&mut self, req: RequestInitChain) -> Result<ResponseInitChain> {
        self.run_init_chain(req).map_err(|e| {
            if self.options.trace {
                error!("InitChain rejected: {e:?}");
            }
            e
        })
    }

    fn run_init_chain(&mut self, req: RequestInitChain) -> Result<ResponseInitChain> {
        if self.header.is_some() {
            return Err(TestEnvError::ChainState(
                "chain is already initialized".to_string(),
            ));
        }
        if req.chain_id != self.options.chain_id {
            return Err(TestEnvError::InvalidGenesis(format!(
                "invalid chain-id on InitChain; expected: {}, got: {}",
                self.options.chain_id, req.chain_id
            )));
        }
        req.consensus_params.validate()?;

        let genesis = GenesisState::from_json_bytes(&req.app_state_bytes)?;

        self.account_keeper
            .init_genesis(&genesis.module::<auth::GenesisState>(auth::MODULE_NAME)?)?;
        self.account_keeper.ensure_module_accounts()?;
        self.bank_keeper
            .init_genesis(&genesis.module::<bank::GenesisState>(bank::MODULE_NAME)?)?;
        self.staking_keeper
            .init_genesis(&genesis.module::<staking::GenesisState>(staking::MODULE_NAME)?)?;
        self.slashing_keeper
            .init_genesis(&genesis.module::<slashing::GenesisState>(slashing::MODULE_NAME)?)?;
        self.wasm_keeper
            .init_genesis(&genesis.module::<wasm::GenesisState>(wasm::MODULE_NAME)?)?;
        self.tokenfactory_keeper.init_genesis(
            &genesis.module::<tokenfactory::GenesisState>(tokenfactory::MODULE_NAME)?,
        )?;
        let updates = self
            .consumer_keeper
            .init_genesis(&genesis.module::<consumer::GenesisState>(consumer::MODULE_NAME)?)?;

        self.check_validator_updates(&req, &updates)?;
        let validator_set = ValidatorSet::from_updates(&updates)?;

        let height = req.initial_height.max(1);
        self.header = Some(Context::new(req.chain_id.clone(), height, req.time));
        self.validator_set = Some(validator_set);
        self.consensus_params = Some(req.consensus_params.clone());

        info!(
            "initialized chain {} at height {height} with {} validator(s)",
            req.chain_id,
            updates.len()
        );
        Ok(ResponseInitChain {
            consensus_params: req.consensus_params,
            validators: updates,
        })
    }

    fn check_validator_updates(
        &self,
        req: &RequestInitChain,
        updates: &[ValidatorUpdate],
    ) -> Result<()> {
        for update in updates {
            if !req.consensus_params.allows_key_type(update.pub_key.key_type()) {
                return Err(TestEnvError::InvalidGenesis(format!(
                    "validator key type {} is not allowed by consensus params",
                    update.pub_key.key_type()
                )));
            }
        }
        if !req.validators.is_empty()
            && ValidatorSet::from_updates(&req.validators)? != ValidatorSet::from_updates(updates)?
        {
            return Err(TestEnvError::InvalidGenesis(
                "genesis validators do not match the validators proposed by consensus"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Context for the latest block. Before InitChain this is height 0 at the
    /// Unix epoch.
    pub fn new_context(&self) -> Context {
        self.header
            .clone()
            .unwrap_or_else(|| Context::new(self.options.chain_id.clone(), 0, UNIX_EPOCH))
    }

    /// Begin a block at the height and time carried by `ctx`
    pub fn begin_blocker(&mut self, ctx: &Context) -> Result<()> {
        self.run_begin_blocker(ctx).map_err(|e| {
            if self.options.trace {
                error!("BeginBlock at height {} rejected: {e:?}", ctx.block_height());
            }
            e
        })
    }

    fn run_begin_blocker(&mut self, ctx: &Context) -> Result<()> {
        let header = self
            .header
            .as_ref()
            .ok_or_else(|| TestEnvError::ChainState("chain is not initialized".to_string()))?;
        if ctx.chain_id() != header.chain_id() {
            return Err(TestEnvError::ChainState(format!(
                "block for chain {} on chain {}",
                ctx.chain_id(),
                header.chain_id()
            )));
        }
        if ctx.block_height() != header.block_height() + 1 {
            return Err(TestEnvError::ChainState(format!(
                "invalid height {}, expected {}",
                ctx.block_height(),
                header.block_height() + 1
            )));
        }
        if ctx.block_time() < header.block_time() {
            return Err(TestEnvError::ChainState(format!(
                "block time {:?} is before the previous block time {:?}",
                ctx.block_time(),
                header.block_time()
            )));
        }

        self.staking_keeper.begin_blocker(ctx)?;
        self.header = Some(ctx.clone());
        debug!("began block {}", ctx.block_height());
        Ok(())
    }

    /// Current parameters of the module behind `subspace`, as JSON
    pub fn module_params_json(&self, subspace: &str) -> Result<serde_json::Value> {
        let value = match subspace {
            auth::MODULE_NAME => serde_json::to_value(self.account_keeper.params()?)?,
            bank::MODULE_NAME => serde_json::to_value(self.bank_keeper.params()?)?,
            staking::MODULE_NAME => serde_json::to_value(self.staking_keeper.params()?)?,
            slashing::MODULE_NAME => serde_json::to_value(self.slashing_keeper.params()?)?,
            wasm::MODULE_NAME => serde_json::to_value(self.wasm_keeper.params()?)?,
            tokenfactory::MODULE_NAME => serde_json::to_value(self.tokenfactory_keeper.params()?)?,
            consumer::MODULE_NAME => serde_json::to_value(self.consumer_keeper.params()?)?,
            other => {
                return Err(TestEnvError::NotFound(format!(
                    "no params subspace named {other}"
                )))
            }
        };
        Ok(value)
    }
}
