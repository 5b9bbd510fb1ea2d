//! Constant product pricing (x·y=k) for a single pool
//!
//! The swap fee is taken from the input side:
//! - Δx_net = Δx_in · (1000 - 3) / 1000
//! - Δy_out = y0 · Δx_net / (x0 + Δx_net)
//!
//! All products are evaluated in 256 bits, so any pair of reserves up to
//! 2^112 - 1 and any u128 amount is handled without overflow.

use ethnum::U256;
use exchange_types::{ExchangeError, ExchangeResult, SWAP_FEE_DENOMINATOR, SWAP_FEE_NUMERATOR};

use crate::safe::{u256_to_u128, widening_mul};

/// Input multiplier after the fee (997)
const FEE_COMPLEMENT: u128 = SWAP_FEE_DENOMINATOR - SWAP_FEE_NUMERATOR;

/// Largest output a pool will release for `amount_in` of the other asset
///
/// # Formula
/// `floor(amount_in·997·reserve_out / (reserve_in·1000 + amount_in·997))`
pub fn amount_out(amount_in: u128, reserve_in: u128, reserve_out: u128) -> ExchangeResult<u128> {
    if amount_in == 0 {
        return Err(ExchangeError::InsufficientInputAmount);
    }
    if reserve_in == 0 || reserve_out == 0 {
        return Err(ExchangeError::InsufficientLiquidity);
    }

    let amount_in_with_fee = widening_mul(amount_in, FEE_COMPLEMENT);
    let numerator = amount_in_with_fee
        .checked_mul(U256::from(reserve_out))
        .ok_or(ExchangeError::MathOverflow)?;
    let denominator = widening_mul(reserve_in, SWAP_FEE_DENOMINATOR)
        .checked_add(amount_in_with_fee)
        .ok_or(ExchangeError::MathOverflow)?;

    u256_to_u128(numerator / denominator)
}

/// Smallest input that releases `amount_out` of the other asset
///
/// Rounds up, so `amount_out(amount_in(x)) >= x`.
pub fn amount_in(amount_out: u128, reserve_in: u128, reserve_out: u128) -> ExchangeResult<u128> {
    if amount_out == 0 {
        return Err(ExchangeError::InsufficientOutputAmount);
    }
    if reserve_in == 0 || amount_out >= reserve_out {
        return Err(ExchangeError::InsufficientLiquidity);
    }

    let numerator = widening_mul(reserve_in, amount_out)
        .checked_mul(U256::from(SWAP_FEE_DENOMINATOR))
        .ok_or(ExchangeError::MathOverflow)?;
    let denominator = widening_mul(reserve_out - amount_out, FEE_COMPLEMENT);

    u256_to_u128(numerator / denominator + U256::ONE)
}

/// Amount of the other asset worth `amount` at the current reserve ratio (no fee)
pub fn quote(amount: u128, reserve_a: u128, reserve_b: u128) -> ExchangeResult<u128> {
    if amount == 0 {
        return Err(ExchangeError::InsufficientInputAmount);
    }
    if reserve_a == 0 || reserve_b == 0 {
        return Err(ExchangeError::InsufficientLiquidity);
    }
    u256_to_u128(widening_mul(amount, reserve_b) / U256::from(reserve_a))
}

/// Balance scaled by 1000 with the fee portion of the input removed
pub fn fee_adjusted_balance(balance: u128, amount_in: u128) -> ExchangeResult<U256> {
    widening_mul(balance, SWAP_FEE_DENOMINATOR)
        .checked_sub(widening_mul(amount_in, SWAP_FEE_NUMERATOR))
        .ok_or(ExchangeError::MathUnderflow)
}

/// The `K` check: post-trade fee-adjusted product must not fall below the
/// pre-trade product.
///
/// `adjusted0 · adjusted1 >= reserve0 · reserve1 · 1000²`
pub fn check_invariant(
    balance0: u128,
    balance1: u128,
    amount0_in: u128,
    amount1_in: u128,
    reserve0: u128,
    reserve1: u128,
) -> ExchangeResult<()> {
    let adjusted0 = fee_adjusted_balance(balance0, amount0_in)?;
    let adjusted1 = fee_adjusted_balance(balance1, amount1_in)?;

    let after = adjusted0
        .checked_mul(adjusted1)
        .ok_or(ExchangeError::MathOverflow)?;
    let before = widening_mul(reserve0, reserve1)
        .checked_mul(U256::from(SWAP_FEE_DENOMINATOR * SWAP_FEE_DENOMINATOR))
        .ok_or(ExchangeError::MathOverflow)?;

    if after < before {
        return Err(ExchangeError::InvariantViolated);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use exchange_types::MAX_RESERVE;

    const E18: u128 = 1_000_000_000_000_000_000;

    #[test]
    fn test_amount_out_matches_formula() {
        // Reserves (1000, 1000), input 1: 997 * 1000 / (1_000_000 + 997) = 0
        assert_eq!(amount_out(1, 1000, 1000).unwrap(), 0);

        // 1 in, (100e18, 100e18) reserves: 997e18 * 100e18 / (100e21 + 997e18)
        let out = amount_out(E18, 100 * E18, 100 * E18).unwrap();
        assert_eq!(out, 987_158_034_397_061_298);

        let numerator = widening_mul(E18 * 997, 100 * E18);
        let denominator = U256::from(100 * E18 * 1000 + E18 * 997);
        assert_eq!(U256::from(out), numerator / denominator);
    }

    #[test]
    fn test_amount_out_errors() {
        assert_eq!(amount_out(0, 10, 10), Err(ExchangeError::InsufficientInputAmount));
        assert_eq!(amount_out(1, 0, 10), Err(ExchangeError::InsufficientLiquidity));
    }

    #[test]
    fn test_amount_in_round_trip() {
        let reserve_in = 5 * E18;
        let reserve_out = 10 * E18;
        let wanted = E18;

        let needed = amount_in(wanted, reserve_in, reserve_out).unwrap();
        assert!(amount_out(needed, reserve_in, reserve_out).unwrap() >= wanted);
        assert!(amount_out(needed - 1, reserve_in, reserve_out).unwrap() < wanted);

        assert_eq!(amount_in(reserve_out, reserve_in, reserve_out), Err(ExchangeError::InsufficientLiquidity));
    }

    #[test]
    fn test_quote_is_proportional() {
        assert_eq!(quote(10, 100, 200).unwrap(), 20);
        assert_eq!(quote(0, 100, 200), Err(ExchangeError::InsufficientInputAmount));
    }

    #[test]
    fn test_invariant_accepts_exact_quote_and_rejects_one_more() {
        let (reserve0, reserve1) = (1000u128, 1000u128);
        let input = 100u128;
        let out = amount_out(input, reserve0, reserve1).unwrap();

        assert!(check_invariant(reserve0 + input, reserve1 - out, input, 0, reserve0, reserve1).is_ok());
        assert_eq!(
            check_invariant(reserve0 + input, reserve1 - out - 1, input, 0, reserve0, reserve1),
            Err(ExchangeError::InvariantViolated)
        );
    }

    #[test]
    fn test_invariant_at_reserve_bounds() {
        assert!(check_invariant(MAX_RESERVE, MAX_RESERVE, 0, 0, MAX_RESERVE, MAX_RESERVE).is_ok());
    }
}
