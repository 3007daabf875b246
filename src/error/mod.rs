//! Error handling for the test chain
//!
//! Every harness and runtime operation reports failures through [`TestEnvError`].
//! The harness never retries: callers are expected to unwrap-or-abort.

use std::fmt;

/// Result type alias for test chain operations
pub type Result<T> = std::result::Result<T, TestEnvError>;

/// Error types for genesis construction, bootstrap and the embedded runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestEnvError {
    /// Malformed test setup (empty genesis accounts, missing validator, ...)
    SetupInvariant(String),
    /// Coin arithmetic that does not fit the 256-bit integer range
    ArithmeticOverflow(String),
    /// The runtime refused the genesis document
    InvalidGenesis(String),
    /// A validator set that consensus would not accept
    InvalidValidatorSet(String),
    /// Block lifecycle violations (double init, height gaps, time going backwards)
    ChainState(String),
    /// An account does not hold enough of a denomination
    InsufficientFunds {
        address: String,
        required: String,
        available: String,
    },
    /// The caller lacks the permission for the requested operation
    Unauthorized(String),
    /// Lookup of a missing account, validator, denom or parameter type
    NotFound(String),
    /// Creation of something that already exists
    AlreadyExists(String),
    /// Malformed denominations or coin sets
    InvalidCoins(String),
    /// Invalid address encoding
    InvalidAddress(String),
    /// Store errors
    Database(String),
    /// Key generation errors
    Crypto(String),
    /// Serialization/deserialization errors
    Serialization(String),
    /// Configuration errors
    Config(String),
    /// File I/O errors
    Io(String),
}

impl fmt::Display for TestEnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestEnvError::SetupInvariant(msg) => write!(f, "Setup invariant violated: {msg}"),
            TestEnvError::ArithmeticOverflow(msg) => write!(f, "Arithmetic overflow: {msg}"),
            TestEnvError::InvalidGenesis(msg) => write!(f, "Invalid genesis: {msg}"),
            TestEnvError::InvalidValidatorSet(msg) => write!(f, "Invalid validator set: {msg}"),
            TestEnvError::ChainState(msg) => write!(f, "Chain state error: {msg}"),
            TestEnvError::InsufficientFunds {
                address,
                required,
                available,
            } => {
                write!(
                    f,
                    "Insufficient funds for {address}: required {required}, available {available}"
                )
            }
            TestEnvError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            TestEnvError::NotFound(msg) => write!(f, "Not found: {msg}"),
            TestEnvError::AlreadyExists(msg) => write!(f, "Already exists: {msg}"),
            TestEnvError::InvalidCoins(msg) => write!(f, "Invalid coins: {msg}"),
            TestEnvError::InvalidAddress(addr) => write!(f, "Invalid address: {addr}"),
            TestEnvError::Database(msg) => write!(f, "Database error: {msg}"),
            TestEnvError::Crypto(msg) => write!(f, "Cryptographic error: {msg}"),
            TestEnvError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            TestEnvError::Config(msg) => write!(f, "Configuration error: {msg}"),
            TestEnvError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for TestEnvError {}

impl TestEnvError {
    /// True for errors that denote a malformed test rather than a runtime refusal
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            TestEnvError::SetupInvariant(_)
                | TestEnvError::ArithmeticOverflow(_)
                | TestEnvError::Serialization(_)
                | TestEnvError::Config(_)
        )
    }
}

impl From<std::io::Error> for TestEnvError {
    fn from(err: std::io::Error) -> Self {
        TestEnvError::Io(err.to_string())
    }
}

impl From<sled::Error> for TestEnvError {
    fn from(err: sled::Error) -> Self {
        TestEnvError::Database(err.to_string())
    }
}

impl From<bincode::error::EncodeError> for TestEnvError {
    fn from(err: bincode::error::EncodeError) -> Self {
        TestEnvError::Serialization(err.to_string())
    }
}

impl From<bincode::error::DecodeError> for TestEnvError {
    fn from(err: bincode::error::DecodeError) -> Self {
        TestEnvError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for TestEnvError {
    fn from(err: serde_json::Error) -> Self {
        TestEnvError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for TestEnvError {
    fn from(err: toml::de::Error) -> Self {
        TestEnvError::Config(err.to_string())
    }
}
