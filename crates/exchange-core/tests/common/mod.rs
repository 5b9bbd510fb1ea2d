//! Shared fixtures for exchange integration tests
#![allow(dead_code)]

pub mod tracing;

pub use exchange_core::*;

pub const TOKEN_A: Address = Address::from_low_u64(0xa0);
pub const TOKEN_B: Address = Address::from_low_u64(0xb0);
pub const TOKEN_C: Address = Address::from_low_u64(0xc0);

pub const ALICE: Address = Address::from_low_u64(0x1001);
pub const BOB: Address = Address::from_low_u64(0x1002);
pub const FEE_TO: Address = Address::from_low_u64(0xfee);

pub const E18: u128 = 1_000_000_000_000_000_000;

/// Funding minted to every test account in every asset
pub const STARTING_BALANCE: u128 = 1_000_000 * E18;

/// An exchange with funded accounts and one empty TOKEN_A / TOKEN_B pool
pub struct TestContext {
    pub exchange: Exchange,
    pub pool: Address,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(ExchangeConfig::default())
    }

    /// Same as `new` with the protocol fee sent to `FEE_TO`
    pub fn with_protocol_fee() -> Self {
        let mut config = ExchangeConfig::default();
        config.fee_recipient = Some(FEE_TO);
        Self::with_config(config)
    }

    pub fn with_config(config: ExchangeConfig) -> Self {
        tracing::init_test_tracing();

        let mut exchange = Exchange::new(&config).unwrap();
        exchange.set_timestamp(1_000);
        for account in [ALICE, BOB] {
            for token in [TOKEN_A, TOKEN_B, TOKEN_C] {
                exchange.mint_asset(token, account, STARTING_BALANCE).unwrap();
            }
        }
        let pool = exchange.create_pool(TOKEN_A, TOKEN_B).unwrap();
        exchange.drain_events();

        Self { exchange, pool }
    }

    /// Send both assets to the pool and deposit for `provider`
    pub fn add_liquidity(&mut self, provider: Address, amount0: u128, amount1: u128) -> ExchangeResult<u128> {
        self.exchange.transfer_asset(TOKEN_A, provider, self.pool, amount0)?;
        self.exchange.transfer_asset(TOKEN_B, provider, self.pool, amount1)?;
        self.exchange.deposit(self.pool, provider)
    }

    /// Send `claims` to the pool and withdraw to `provider`
    pub fn remove_liquidity(&mut self, provider: Address, claims: u128) -> ExchangeResult<(u128, u128)> {
        self.exchange.transfer_claims(self.pool, provider, self.pool, claims)?;
        self.exchange.withdraw(self.pool, provider)
    }

    /// Trade exactly `amount_in` of TOKEN_A for the quoted TOKEN_B output
    pub fn swap_a_for_b(&mut self, trader: Address, amount_in: u128) -> ExchangeResult<u128> {
        let (reserve0, reserve1, _) = self.reserves();
        let out = amount_out(amount_in, reserve0, reserve1)?;
        self.exchange.transfer_asset(TOKEN_A, trader, self.pool, amount_in)?;
        self.exchange.swap(self.pool, trader, 0, out, trader, &[], None)?;
        Ok(out)
    }

    /// Trade exactly `amount_in` of TOKEN_B for the quoted TOKEN_A output
    pub fn swap_b_for_a(&mut self, trader: Address, amount_in: u128) -> ExchangeResult<u128> {
        let (reserve0, reserve1, _) = self.reserves();
        let out = amount_out(amount_in, reserve1, reserve0)?;
        self.exchange.transfer_asset(TOKEN_B, trader, self.pool, amount_in)?;
        self.exchange.swap(self.pool, trader, out, 0, trader, &[], None)?;
        Ok(out)
    }

    pub fn reserves(&self) -> (u128, u128, u32) {
        self.exchange.get_reserves(self.pool).unwrap()
    }

    pub fn claims(&self, holder: Address) -> u128 {
        self.exchange.claim_balance(self.pool, holder).unwrap()
    }

    pub fn supply(&self) -> u128 {
        self.exchange.claim_supply(self.pool).unwrap()
    }

    pub fn balance(&self, token: Address, holder: Address) -> u128 {
        self.exchange.asset_balance(token, holder)
    }

    /// Sum of claim balances equals the supply, and reserves equal balances
    pub fn assert_consistent(&self) {
        let ledger = self.exchange.claim_ledger(self.pool).unwrap();
        assert_eq!(ledger.balance_sum(), ledger.total_supply());

        let (reserve0, reserve1, _) = self.reserves();
        assert!(self.balance(TOKEN_A, self.pool) >= reserve0);
        assert!(self.balance(TOKEN_B, self.pool) >= reserve1);
    }
}
