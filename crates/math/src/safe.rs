/// Safe arithmetic operations with overflow protection
///
/// All operations return errors instead of panicking. 256-bit helpers cover
/// the products the pool engine compares (reserve products, fee-adjusted
/// balances) so that no intermediate value is ever truncated.

use ethnum::U256;
use exchange_types::{ExchangeError, ExchangeResult};

/// Macro to generate safe arithmetic functions
macro_rules! safe_arith {
    // Division operations with zero check
    (div, $fn_name:ident, $type:ty, $zero:expr) => {
        pub fn $fn_name(a: $type, b: $type) -> ExchangeResult<$type> {
            if b == $zero {
                return Err(ExchangeError::DivisionByZero);
            }
            Ok(a / b)
        }
    };

    // Binary operations with checked methods
    ($fn_name:ident, $type:ty, $checked_method:ident, $error:expr) => {
        pub fn $fn_name(a: $type, b: $type) -> ExchangeResult<$type> {
            a.$checked_method(b).ok_or($error)
        }
    };
}

// ============================================================================
// Safe Basic Arithmetic
// ============================================================================

safe_arith!(safe_add_u128, u128, checked_add, ExchangeError::MathOverflow);
safe_arith!(safe_sub_u128, u128, checked_sub, ExchangeError::MathUnderflow);
safe_arith!(safe_mul_u128, u128, checked_mul, ExchangeError::MathOverflow);
safe_arith!(div, safe_div_u128, u128, 0);

safe_arith!(safe_add_u256, U256, checked_add, ExchangeError::MathOverflow);
safe_arith!(safe_sub_u256, U256, checked_sub, ExchangeError::MathUnderflow);
safe_arith!(safe_mul_u256, U256, checked_mul, ExchangeError::MathOverflow);
safe_arith!(div, safe_div_u256, U256, U256::ZERO);

// ============================================================================
// Width Conversions
// ============================================================================

/// Narrow a 256-bit value, failing if it does not fit in 128 bits
pub fn u256_to_u128(value: U256) -> ExchangeResult<u128> {
    if value > U256::from(u128::MAX) {
        return Err(ExchangeError::MathOverflow);
    }
    Ok(value.as_u128())
}

/// Full-width product of two u128 values
pub fn widening_mul(a: u128, b: u128) -> U256 {
    // Cannot overflow: (2^128 - 1)^2 < 2^256
    U256::from(a) * U256::from(b)
}

/// `a * b / denominator` rounded down, with a 256-bit intermediate
pub fn mul_div_u128(a: u128, b: u128, denominator: u128) -> ExchangeResult<u128> {
    if denominator == 0 {
        return Err(ExchangeError::DivisionByZero);
    }
    u256_to_u128(widening_mul(a, b) / U256::from(denominator))
}

// ============================================================================
// Safe Square Root
// ============================================================================

/// Integer square root using the integer-sqrt crate
pub fn sqrt_u128(value: u128) -> u128 {
    use integer_sqrt::IntegerSquareRoot;
    value.integer_sqrt()
}

/// Floor of the square root of a 256-bit value.
///
/// Values that fit in 128 bits take the `integer-sqrt` path; larger values use
/// Newton's method, which decreases monotonically from `value / 2 + 1` and stops
/// at the floor.
pub fn sqrt_u256(value: U256) -> U256 {
    if value <= U256::from(u128::MAX) {
        return U256::from(sqrt_u128(value.as_u128()));
    }

    let mut z = value;
    let mut x = value / U256::new(2) + U256::ONE;
    while x < z {
        z = x;
        x = (value / x + x) / U256::new(2);
    }
    z
}
