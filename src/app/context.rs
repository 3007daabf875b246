use std::time::SystemTime;

/// Height/time-scoped execution context (the block header as the runtime sees it).
///
/// A context is a value: the `with_*` methods return a new context and leave
/// the original untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    chain_id: String,
    block_height: i64,
    block_time: SystemTime,
}

impl Context {
    pub fn new(chain_id: impl Into<String>, block_height: i64, block_time: SystemTime) -> Context {
        Context {
            chain_id: chain_id.into(),
            block_height,
            block_time,
        }
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn block_height(&self) -> i64 {
        self.block_height
    }

    pub fn block_time(&self) -> SystemTime {
        self.block_time
    }

    pub fn with_block_height(&self, block_height: i64) -> Context {
        Context {
            block_height,
            ..self.clone()
        }
    }

    pub fn with_block_time(&self, block_time: SystemTime) -> Context {
        Context {
            block_time,
            ..self.clone()
        }
    }
}
