/// Events emitted by the exchange
///
/// Every state change that an outside observer would index is recorded here,
/// in execution order. A failed operation leaves no events behind.
use exchange_types::{Address, AssetId};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    PoolCreated {
        asset0: AssetId,
        asset1: AssetId,
        pool: Address,
        /// Position in the registry's pool list
        index: u64,
    },
    /// Claim token movement. Mints come from and burns go to the null address.
    Transfer {
        ledger: Address,
        from: Address,
        to: Address,
        amount: u128,
    },
    Approval {
        ledger: Address,
        owner: Address,
        spender: Address,
        amount: u128,
    },
    Mint {
        pool: Address,
        sender: Address,
        amount0: u128,
        amount1: u128,
    },
    Burn {
        pool: Address,
        sender: Address,
        amount0: u128,
        amount1: u128,
        to: Address,
    },
    Swap {
        pool: Address,
        sender: Address,
        amount0_in: u128,
        amount1_in: u128,
        amount0_out: u128,
        amount1_out: u128,
        to: Address,
    },
    Sync {
        pool: Address,
        reserve0: u128,
        reserve1: u128,
    },
    FeeRecipientChanged {
        previous: Address,
        current: Address,
    },
    AdministratorChanged {
        previous: Address,
        current: Address,
    },
}

/// Ordered, append-only event buffer
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: Event) {
        debug!(?event, "event");
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn as_slice(&self) -> &[Event] {
        &self.events
    }

    /// Discard everything emitted after the first `len` events
    pub fn truncate(&mut self, len: usize) {
        self.events.truncate(len);
    }

    /// Take all events, leaving the log empty
    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}
