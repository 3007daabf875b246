//! Consumer-chain module
//!
//! Holds the validator set handed over by the provider chain. A new consumer
//! chain takes its initial validators from `initial_val_set`, which must hash
//! to the `next_validators_hash` recorded in the provider consensus state.

use crate::app::Store;
use crate::consensus::{simple_hash_from_byte_vectors, PubKey, ValidatorSet, ValidatorUpdate};
use crate::error::{Result, TestEnvError};
use crate::modules::staking::{
    self, tokens_from_consensus_power, BondStatus, Commission, Description,
};
use crate::types::{ConsAddress, Dec, Int, ValAddress};
use crate::utils::sha256_digest;
use log::{debug, info};
use serde::{Deserialize, Serialize};

pub const MODULE_NAME: &str = "ccvconsumer";
pub const PROVIDER_CHAIN_ID: &str = "provider";

const VALIDATORS_TREE: &str = "ccvconsumer_validators";
const META_TREE: &str = "ccvconsumer_meta";
const PARAMS_KEY: &[u8] = b"params";

const DEFAULT_CCV_TIMEOUT_PERIOD_SECS: u64 = 4 * 7 * 24 * 60 * 60;
const DEFAULT_TRANSFER_TIMEOUT_PERIOD_SECS: u64 = 60 * 60;
const DEFAULT_UNBONDING_PERIOD_SECS: u64 = 21 * 24 * 60 * 60;
const DEFAULT_RETRY_DELAY_PERIOD_SECS: u64 = 60 * 60;

mod hex_bytes {
    use serde::de::Error as DeError;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode_upper(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        hex::decode(raw).map_err(D::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    pub enabled: bool,
    pub blocks_per_distribution_transmission: i64,
    pub distribution_transmission_channel: String,
    pub provider_fee_pool_addr_str: String,
    pub ccv_timeout_period_secs: u64,
    pub transfer_timeout_period_secs: u64,
    pub consumer_redistribution_fraction: Dec,
    pub historical_entries: i64,
    pub unbonding_period_secs: u64,
    pub reward_denoms: Vec<String>,
    pub provider_reward_denoms: Vec<String>,
    pub retry_delay_period_secs: u64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            enabled: false,
            blocks_per_distribution_transmission: 1000,
            distribution_transmission_channel: String::new(),
            provider_fee_pool_addr_str: String::new(),
            ccv_timeout_period_secs: DEFAULT_CCV_TIMEOUT_PERIOD_SECS,
            transfer_timeout_period_secs: DEFAULT_TRANSFER_TIMEOUT_PERIOD_SECS,
            consumer_redistribution_fraction: Dec::with_prec(75, 2),
            historical_entries: 10_000,
            unbonding_period_secs: DEFAULT_UNBONDING_PERIOD_SECS,
            reward_denoms: Vec::new(),
            provider_reward_denoms: Vec::new(),
            retry_delay_period_secs: DEFAULT_RETRY_DELAY_PERIOD_SECS,
        }
    }
}

/// Light client of the provider chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientState {
    pub chain_id: String,
    pub trusting_period_secs: u64,
    pub unbonding_period_secs: u64,
    pub max_clock_drift_secs: u64,
    pub latest_height: u64,
}

impl Default for ClientState {
    fn default() -> Self {
        Self {
            chain_id: PROVIDER_CHAIN_ID.to_string(),
            trusting_period_secs: DEFAULT_UNBONDING_PERIOD_SECS * 2 / 3,
            unbonding_period_secs: DEFAULT_UNBONDING_PERIOD_SECS,
            max_clock_drift_secs: 10,
            latest_height: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusState {
    pub timestamp_unix_secs: u64,
    #[serde(with = "hex_bytes")]
    pub root: Vec<u8>,
    #[serde(with = "hex_bytes")]
    pub next_validators_hash: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub params: Params,
    pub provider_client_state: ClientState,
    pub provider_consensus_state: ConsensusState,
    pub new_chain: bool,
    pub initial_val_set: Vec<ValidatorUpdate>,
}

impl Default for GenesisState {
    fn default() -> Self {
        create_minimal_consumer_test_genesis()
    }
}

/// Genesis of a fresh consumer chain with an empty validator set and the
/// module still disabled. Callers fill in the validators, the matching
/// `next_validators_hash` and flip `params.enabled`.
pub fn create_minimal_consumer_test_genesis() -> GenesisState {
    GenesisState {
        params: Params::default(),
        provider_client_state: ClientState::default(),
        provider_consensus_state: ConsensusState {
            timestamp_unix_secs: 0,
            root: sha256_digest(b"apphash"),
            next_validators_hash: simple_hash_from_byte_vectors(&[]),
        },
        new_chain: true,
        initial_val_set: Vec::new(),
    }
}

/// Validator as tracked by the consumer chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossChainValidator {
    pub address: ConsAddress,
    pub power: i64,
    pub pubkey: PubKey,
}

#[derive(Clone)]
pub struct ConsumerKeeper {
    store: Store,
}

impl ConsumerKeeper {
    pub fn new(store: Store) -> ConsumerKeeper {
        ConsumerKeeper { store }
    }

    /// Store the provider-supplied validators and return them as the
    /// chain's initial validator updates
    pub fn init_genesis(&self, genesis: &GenesisState) -> Result<Vec<ValidatorUpdate>> {
        if !genesis.params.enabled {
            return Err(TestEnvError::InvalidGenesis(
                "ccvconsumer module is disabled".to_string(),
            ));
        }
        if !genesis.new_chain {
            return Err(TestEnvError::InvalidGenesis(
                "restarting a consumer chain requires an established provider channel".to_string(),
            ));
        }
        if genesis.initial_val_set.is_empty() {
            return Err(TestEnvError::InvalidGenesis(
                "initial validator set is empty".to_string(),
            ));
        }

        let valset = ValidatorSet::from_updates(&genesis.initial_val_set)?;
        let hash = valset.hash();
        if hash != genesis.provider_consensus_state.next_validators_hash {
            return Err(TestEnvError::InvalidGenesis(format!(
                "initial validator set does not match provider next validators hash: {} != {}",
                hex::encode_upper(&hash),
                hex::encode_upper(&genesis.provider_consensus_state.next_validators_hash)
            )));
        }

        self.store.set(META_TREE, PARAMS_KEY, &genesis.params)?;
        for update in &genesis.initial_val_set {
            let validator = CrossChainValidator {
                address: update.pub_key.cons_address(),
                power: update.power,
                pubkey: update.pub_key.clone(),
            };
            self.store
                .set(VALIDATORS_TREE, validator.address.as_bytes(), &validator)?;
        }

        info!(
            "consumer genesis: {} initial validator(s), valset hash {}",
            genesis.initial_val_set.len(),
            hex::encode_upper(&hash)
        );
        Ok(genesis.initial_val_set.clone())
    }

    pub fn params(&self) -> Result<Params> {
        Ok(self.store.get(META_TREE, PARAMS_KEY)?.unwrap_or_default())
    }

    pub fn cross_chain_validator(
        &self,
        address: &ConsAddress,
    ) -> Result<Option<CrossChainValidator>> {
        self.store.get(VALIDATORS_TREE, address.as_bytes())
    }

    pub fn all_cross_chain_validators(&self) -> Result<Vec<CrossChainValidator>> {
        self.store.values(VALIDATORS_TREE)
    }

    /// Cross-chain validators in staking shape. The operator address carries
    /// the consensus address bytes.
    pub fn all_validators(&self) -> Result<Vec<staking::Validator>> {
        let validators = self.all_cross_chain_validators()?;
        debug!("consumer keeper: {} validator(s)", validators.len());
        validators
            .into_iter()
            .map(|ccv| {
                Ok(staking::Validator {
                    operator_address: ValAddress::from_bytes(ccv.address.to_bytes()),
                    consensus_pubkey: ccv.pubkey,
                    jailed: false,
                    status: BondStatus::Bonded,
                    tokens: tokens_from_consensus_power(ccv.power)?,
                    delegator_shares: Dec::one(),
                    description: Description::default(),
                    unbonding_height: 0,
                    unbonding_time_unix_secs: 0,
                    commission: Commission::default(),
                    min_self_delegation: Int::zero(),
                })
            })
            .collect()
    }
}
