/// Execution environment: chain identity and the serial clock
use exchange_types::DEFAULT_CHAIN_ID;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Chain identifier bound into every permit domain
    pub chain_id: u64,
    /// Current time in seconds
    pub timestamp: u64,
}

impl Environment {
    pub fn new(chain_id: u64, timestamp: u64) -> Self {
        Self { chain_id, timestamp }
    }

    /// Clock truncated to 32 bits, the width pools record
    pub fn block_timestamp(&self) -> u32 {
        (self.timestamp % (1u64 << 32)) as u32
    }

    /// Move the clock forward, saturating at `u64::MAX`
    pub fn advance(&mut self, seconds: u64) {
        self.timestamp = self.timestamp.saturating_add(seconds);
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(DEFAULT_CHAIN_ID, 0)
    }
}
