//! Exchange runtime
//!
//! [`Exchange`] owns every piece of state: asset balances, the registry with
//! its pools and their claim ledgers, the execution environment and the event
//! log. Operations are executed one at a time against it.
//!
//! Pool operations run atomically. Each call opens a journal frame: the asset
//! book and the registry record the original of every balance and pool the
//! call touches, and the event log length is noted. If the call fails the
//! originals are written back, undoing everything the call did, including
//! whatever a swap callback did in between. Calls made from a callback open
//! frames of their own. Ledger and registry operations validate fully before
//! writing and need no frame.

use exchange_math::U256;
use exchange_types::{Address, AssetId, ExchangeResult};
use tracing::{debug, info};

use crate::assets::{AssetBook, AssetTransfer};
use crate::config::ExchangeConfig;
use crate::environment::Environment;
use crate::events::{Event, EventLog};
use crate::ledger::permit::PermitSignature;
use crate::ledger::ClaimLedger;
use crate::pool::oracle::PriceObservation;
use crate::pool::Pool;
use crate::registry::PoolRegistry;

/// Settlement hook invoked in the middle of a swap
///
/// The pool has already sent the requested outputs to the recipient. Before
/// `on_swap` returns, the implementation must make sure the pool holds enough
/// input to satisfy the invariant, or the swap fails and is rolled back.
pub trait SwapCallback {
    fn on_swap(
        &mut self,
        exchange: &mut Exchange,
        sender: Address,
        amount0_out: u128,
        amount1_out: u128,
        data: &[u8],
    ) -> ExchangeResult<()>;
}

/// Everything a failed operation must leave untouched
#[derive(Debug)]
pub(crate) struct ExchangeState {
    pub(crate) assets: AssetBook,
    pub(crate) registry: PoolRegistry,
}

impl ExchangeState {
    fn begin(&mut self) {
        self.assets.begin();
        self.registry.begin();
    }

    fn commit(&mut self) {
        self.assets.commit();
        self.registry.commit();
    }

    fn rollback(&mut self) {
        self.assets.rollback();
        self.registry.rollback();
    }
}

pub struct Exchange {
    pub(crate) env: Environment,
    pub(crate) state: ExchangeState,
    pub(crate) events: EventLog,
}

impl Exchange {
    pub fn new(config: &ExchangeConfig) -> ExchangeResult<Self> {
        config.validate()?;

        let registry = PoolRegistry::new(
            config.registry_address,
            config.registry_config(),
            config.claim_token.clone(),
        );
        info!(
            chain_id = config.chain_id,
            registry = %config.registry_address,
            administrator = %config.administrator,
            fee_on = registry.config().fee_enabled(),
            "exchange initialized"
        );

        Ok(Self {
            env: Environment::new(config.chain_id, config.genesis_timestamp),
            state: ExchangeState {
                assets: AssetBook::new(),
                registry,
            },
            events: EventLog::new(),
        })
    }

    /// Run `op`, restoring all state and events if it fails
    pub(crate) fn atomic<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> ExchangeResult<T>,
    ) -> ExchangeResult<T> {
        let mark = self.events.len();
        self.state.begin();

        let result = op(self);
        match &result {
            Ok(_) => self.state.commit(),
            Err(error) => {
                debug!(%error, "operation failed, state restored");
                self.state.rollback();
                self.events.truncate(mark);
            }
        }
        result
    }

    // ========================================================================
    // Environment
    // ========================================================================

    pub fn environment(&self) -> Environment {
        self.env
    }

    pub fn chain_id(&self) -> u64 {
        self.env.chain_id
    }

    pub fn timestamp(&self) -> u64 {
        self.env.timestamp
    }

    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.env.timestamp = timestamp;
    }

    pub fn advance_time(&mut self, seconds: u64) {
        self.env.advance(seconds);
    }

    pub fn events(&self) -> &[Event] {
        self.events.as_slice()
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    // ========================================================================
    // Assets
    // ========================================================================

    pub fn assets(&self) -> &AssetBook {
        &self.state.assets
    }

    /// Credit newly created `amount` of `asset` to `to`
    pub fn mint_asset(&mut self, asset: AssetId, to: Address, amount: u128) -> ExchangeResult<()> {
        self.state.assets.mint(asset, to, amount)
    }

    pub fn transfer_asset(
        &mut self,
        asset: AssetId,
        from: Address,
        to: Address,
        amount: u128,
    ) -> ExchangeResult<()> {
        self.state.assets.transfer(asset, from, to, amount)
    }

    pub fn asset_balance(&self, asset: AssetId, holder: Address) -> u128 {
        self.state.assets.balance_of(asset, holder)
    }

    // ========================================================================
    // Registry
    // ========================================================================

    pub fn registry(&self) -> &PoolRegistry {
        &self.state.registry
    }

    pub fn create_pool(&mut self, asset_a: AssetId, asset_b: AssetId) -> ExchangeResult<Address> {
        self.state
            .registry
            .create_pool(asset_a, asset_b, self.env.chain_id, &mut self.events)
    }

    pub fn get_pool(&self, asset_a: AssetId, asset_b: AssetId) -> Option<Address> {
        self.state.registry.get_pool(asset_a, asset_b)
    }

    pub fn pool_count(&self) -> usize {
        self.state.registry.pool_count()
    }

    pub fn pool_at(&self, index: usize) -> Option<Address> {
        self.state.registry.pool_at(index)
    }

    pub fn set_fee_recipient(&mut self, caller: Address, fee_recipient: Address) -> ExchangeResult<()> {
        self.state
            .registry
            .set_fee_recipient(caller, fee_recipient, &mut self.events)
    }

    pub fn set_administrator(&mut self, caller: Address, administrator: Address) -> ExchangeResult<()> {
        self.state
            .registry
            .set_administrator(caller, administrator, &mut self.events)
    }

    // ========================================================================
    // Pool Reads
    // ========================================================================

    pub fn pool(&self, pool: Address) -> ExchangeResult<&Pool> {
        self.state.registry.pool(pool)
    }

    pub fn get_reserves(&self, pool: Address) -> ExchangeResult<(u128, u128, u32)> {
        Ok(self.pool(pool)?.get_reserves())
    }

    pub fn price_accumulators(&self, pool: Address) -> ExchangeResult<(U256, U256)> {
        Ok(self.pool(pool)?.price_accumulators())
    }

    /// Sample the pool's price accumulators as of the current time
    pub fn observe(&self, pool: Address) -> ExchangeResult<PriceObservation> {
        PriceObservation::observe(self.pool(pool)?, self.env.block_timestamp())
    }

    // ========================================================================
    // Claim Tokens
    // ========================================================================

    pub fn claim_ledger(&self, pool: Address) -> ExchangeResult<&ClaimLedger> {
        Ok(self.pool(pool)?.ledger())
    }

    pub fn claim_balance(&self, pool: Address, holder: Address) -> ExchangeResult<u128> {
        Ok(self.claim_ledger(pool)?.balance_of(holder))
    }

    pub fn claim_supply(&self, pool: Address) -> ExchangeResult<u128> {
        Ok(self.claim_ledger(pool)?.total_supply())
    }

    pub fn claim_allowance(&self, pool: Address, owner: Address, spender: Address) -> ExchangeResult<u128> {
        Ok(self.claim_ledger(pool)?.allowance(owner, spender))
    }

    pub fn claim_nonce(&self, pool: Address, owner: Address) -> ExchangeResult<u64> {
        Ok(self.claim_ledger(pool)?.current_nonce(owner))
    }

    pub fn transfer_claims(
        &mut self,
        pool: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> ExchangeResult<()> {
        let Self { state, events, .. } = self;
        state
            .registry
            .pool_mut(pool)?
            .ledger_mut()
            .transfer(from, to, amount, events)
    }

    pub fn approve_claims(
        &mut self,
        pool: Address,
        owner: Address,
        spender: Address,
        amount: u128,
    ) -> ExchangeResult<()> {
        let Self { state, events, .. } = self;
        state
            .registry
            .pool_mut(pool)?
            .ledger_mut()
            .approve(owner, spender, amount, events)
    }

    pub fn transfer_claims_from(
        &mut self,
        pool: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> ExchangeResult<()> {
        let Self { state, events, .. } = self;
        state
            .registry
            .pool_mut(pool)?
            .ledger_mut()
            .transfer_from(spender, from, to, amount, events)
    }

    /// Approve by signature at the current time
    pub fn authorize_claims(
        &mut self,
        pool: Address,
        owner: Address,
        spender: Address,
        amount: u128,
        deadline: u64,
        signature: &PermitSignature,
    ) -> ExchangeResult<()> {
        let Self { env, state, events } = self;
        state.registry.pool_mut(pool)?.ledger_mut().authorize(
            owner,
            spender,
            amount,
            deadline,
            signature,
            env.timestamp,
            events,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exchange_types::ExchangeError;

    const TOKEN_A: Address = Address::from_low_u64(0xa);
    const TOKEN_B: Address = Address::from_low_u64(0xb);
    const ALICE: Address = Address::from_low_u64(0x1);

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = ExchangeConfig::default();
        config.administrator = Address::ZERO;
        assert!(matches!(Exchange::new(&config), Err(ExchangeError::InvalidConfig(_))));
    }

    #[test]
    fn test_atomic_restores_state_and_events() {
        let mut exchange = Exchange::new(&ExchangeConfig::default()).unwrap();
        exchange.mint_asset(TOKEN_A, ALICE, 100).unwrap();
        let pool = exchange.create_pool(TOKEN_A, TOKEN_B).unwrap();
        let events_before = exchange.events().len();

        let result: ExchangeResult<()> = exchange.atomic(|ex| {
            ex.transfer_asset(TOKEN_A, ALICE, pool, 60)?;
            ex.create_pool(TOKEN_A, Address::from_low_u64(0xc))?;
            Err(ExchangeError::InsufficientInputAmount)
        });

        assert_eq!(result, Err(ExchangeError::InsufficientInputAmount));
        assert_eq!(exchange.asset_balance(TOKEN_A, ALICE), 100);
        assert_eq!(exchange.pool_count(), 1);
        assert_eq!(exchange.events().len(), events_before);
    }

    #[test]
    fn test_atomic_keeps_successful_work() {
        let mut exchange = Exchange::new(&ExchangeConfig::default()).unwrap();
        exchange.mint_asset(TOKEN_A, ALICE, 100).unwrap();

        let moved = exchange
            .atomic(|ex| ex.transfer_asset(TOKEN_A, ALICE, TOKEN_B, 60).map(|_| 60))
            .unwrap();
        assert_eq!(moved, 60);
        assert_eq!(exchange.asset_balance(TOKEN_A, TOKEN_B), 60);
    }

    #[test]
    fn test_clock() {
        let mut config = ExchangeConfig::default();
        config.genesis_timestamp = 1_000;
        let mut exchange = Exchange::new(&config).unwrap();
        assert_eq!(exchange.timestamp(), 1_000);

        exchange.advance_time(15);
        assert_eq!(exchange.timestamp(), 1_015);
        exchange.set_timestamp(7);
        assert_eq!(exchange.environment().block_timestamp(), 7);
    }
}
