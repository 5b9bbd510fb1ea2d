//! Time-weighted average prices
//!
//! Each pool integrates its marginal prices over time. At the start of every
//! reserve update, before the reserves change, it adds
//!
//! ```text
//! price0_cumulative += UQ112x112(reserve1 / reserve0) · elapsed
//! price1_cumulative += UQ112x112(reserve0 / reserve1) · elapsed
//! ```
//!
//! with 256-bit wrapping addition and `elapsed` taken modulo 2^32. A consumer
//! samples the accumulators twice and divides the difference by the elapsed
//! time to get the average price over the window. Wrapping is harmless as
//! long as the differences are also taken with wrapping arithmetic.

use exchange_math::{mul_decode, price_ratio, U256};
use exchange_types::{ExchangeError, ExchangeResult};

use super::Pool;

/// Accumulator increments for `elapsed` seconds at the given reserves
///
/// Zero when either reserve is empty or no time has passed.
pub fn price_increments(reserve0: u128, reserve1: u128, elapsed: u32) -> ExchangeResult<(U256, U256)> {
    if elapsed == 0 || reserve0 == 0 || reserve1 == 0 {
        return Ok((U256::ZERO, U256::ZERO));
    }

    let elapsed = U256::from(elapsed);
    // A ratio of two 112-bit reserves fits in 224 bits, times 32 bits of time
    let price0 = price_ratio(reserve1, reserve0)?
        .checked_mul(elapsed)
        .ok_or(ExchangeError::MathOverflow)?;
    let price1 = price_ratio(reserve0, reserve1)?
        .checked_mul(elapsed)
        .ok_or(ExchangeError::MathOverflow)?;
    Ok((price0, price1))
}

/// A sample of a pool's price accumulators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceObservation {
    pub price0_cumulative: U256,
    pub price1_cumulative: U256,
    pub timestamp: u32,
}

impl PriceObservation {
    /// Accumulators of `pool` as they would read after a sync at `now`
    ///
    /// Does not touch the pool; the time since its last update is accumulated
    /// at the current reserves.
    pub fn observe(pool: &Pool, now: u32) -> ExchangeResult<Self> {
        let (reserve0, reserve1, last) = pool.get_reserves();
        let (price0, price1) = pool.price_accumulators();
        let (inc0, inc1) = price_increments(reserve0, reserve1, now.wrapping_sub(last))?;

        Ok(Self {
            price0_cumulative: price0.wrapping_add(inc0),
            price1_cumulative: price1.wrapping_add(inc1),
            timestamp: now,
        })
    }

    /// Average UQ112x112 prices `(price0, price1)` between `earlier` and `self`
    pub fn average_since(&self, earlier: &PriceObservation) -> ExchangeResult<(U256, U256)> {
        let elapsed = self.timestamp.wrapping_sub(earlier.timestamp);
        if elapsed == 0 {
            return Err(ExchangeError::DivisionByZero);
        }

        let elapsed = U256::from(elapsed);
        Ok((
            self.price0_cumulative.wrapping_sub(earlier.price0_cumulative) / elapsed,
            self.price1_cumulative.wrapping_sub(earlier.price1_cumulative) / elapsed,
        ))
    }
}

/// Amount of the quote asset worth `amount` at a UQ112x112 average price
pub fn consult(average_price: U256, amount: u128) -> ExchangeResult<U256> {
    mul_decode(average_price, amount)
}
