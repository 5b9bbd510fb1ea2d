//! Constant-product pools
//!
//! A pool holds two assets and trades between them along `x · y = k`. Its
//! recorded reserves lag its actual asset balances: callers first transfer
//! assets to the pool, then call an operation that measures the surplus
//! (balance minus reserve) and acts on it. The engine operations live in
//! [`engine`] and run through the [`Exchange`](crate::Exchange) runtime.

pub mod engine;
pub mod fees;
pub mod oracle;
pub mod reentrancy;

use exchange_math::U256;
use exchange_types::{Address, AssetId, ExchangeError, ExchangeResult, MAX_RESERVE};

use crate::events::{Event, EventLog};
use crate::ledger::ClaimLedger;
use oracle::price_increments;
use reentrancy::{ReentrancyGuard, ReentrancyStatus};

#[derive(Debug, Clone)]
pub struct Pool {
    address: Address,
    asset0: AssetId,
    asset1: AssetId,
    reserve0: u128,
    reserve1: u128,
    block_timestamp_last: u32,
    price0_cumulative_last: U256,
    price1_cumulative_last: U256,
    /// `reserve0 · reserve1` after the most recent liquidity event, kept only
    /// while the protocol fee is on
    k_last: U256,
    status: ReentrancyStatus,
    ledger: ClaimLedger,
}

impl Pool {
    /// Empty pool for a sorted asset pair
    pub(crate) fn new(address: Address, asset0: AssetId, asset1: AssetId, ledger: ClaimLedger) -> Self {
        debug_assert!(asset0 < asset1);
        Self {
            address,
            asset0,
            asset1,
            reserve0: 0,
            reserve1: 0,
            block_timestamp_last: 0,
            price0_cumulative_last: U256::ZERO,
            price1_cumulative_last: U256::ZERO,
            k_last: U256::ZERO,
            status: ReentrancyStatus::Unlocked,
            ledger,
        }
    }

    // ========================================================================
    // Read Surface
    // ========================================================================

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn asset0(&self) -> AssetId {
        self.asset0
    }

    pub fn asset1(&self) -> AssetId {
        self.asset1
    }

    pub fn assets(&self) -> (AssetId, AssetId) {
        (self.asset0, self.asset1)
    }

    /// `(reserve0, reserve1, last_update_timestamp)`
    pub fn get_reserves(&self) -> (u128, u128, u32) {
        (self.reserve0, self.reserve1, self.block_timestamp_last)
    }

    /// `(price0_cumulative_last, price1_cumulative_last)` in UQ112x112 seconds
    pub fn price_accumulators(&self) -> (U256, U256) {
        (self.price0_cumulative_last, self.price1_cumulative_last)
    }

    pub fn k_last(&self) -> U256 {
        self.k_last
    }

    pub fn ledger(&self) -> &ClaimLedger {
        &self.ledger
    }

    pub fn is_locked(&self) -> bool {
        ReentrancyGuard::is_locked(&self.status)
    }

    // ========================================================================
    // Internal State Transitions
    // ========================================================================

    pub(crate) fn ledger_mut(&mut self) -> &mut ClaimLedger {
        &mut self.ledger
    }

    pub(crate) fn status_mut(&mut self) -> &mut ReentrancyStatus {
        &mut self.status
    }

    pub(crate) fn set_k_last(&mut self, k_last: U256) {
        self.k_last = k_last;
    }

    /// Record new balances as reserves
    ///
    /// The price accumulators advance first, at the old reserves, for the time
    /// since the previous update.
    pub(crate) fn update(
        &mut self,
        balance0: u128,
        balance1: u128,
        now: u32,
        events: &mut EventLog,
    ) -> ExchangeResult<()> {
        if balance0 > MAX_RESERVE || balance1 > MAX_RESERVE {
            return Err(ExchangeError::ReserveOverflow);
        }

        let elapsed = now.wrapping_sub(self.block_timestamp_last);
        let (inc0, inc1) = price_increments(self.reserve0, self.reserve1, elapsed)?;
        self.price0_cumulative_last = self.price0_cumulative_last.wrapping_add(inc0);
        self.price1_cumulative_last = self.price1_cumulative_last.wrapping_add(inc1);

        self.reserve0 = balance0;
        self.reserve1 = balance1;
        self.block_timestamp_last = now;

        events.emit(Event::Sync {
            pool: self.address,
            reserve0: balance0,
            reserve1: balance1,
        });
        Ok(())
    }
}
