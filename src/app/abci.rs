use crate::consensus::{ConsensusParams, ValidatorUpdate};
use std::time::SystemTime;

/// Arguments of the one-time chain initialization call
#[derive(Debug, Clone)]
pub struct RequestInitChain {
    pub time: SystemTime,
    pub chain_id: String,
    pub consensus_params: ConsensusParams,
    /// Validators proposed by consensus. Empty means "take them from genesis".
    pub validators: Vec<ValidatorUpdate>,
    /// JSON encoded genesis state
    pub app_state_bytes: Vec<u8>,
    /// Height of the first block; values below 1 mean 1
    pub initial_height: i64,
}

#[derive(Debug, Clone)]
pub struct ResponseInitChain {
    pub consensus_params: ConsensusParams,
    /// Initial validator set as decided by the application
    pub validators: Vec<ValidatorUpdate>,
}
