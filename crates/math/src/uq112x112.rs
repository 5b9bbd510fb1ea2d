/// UQ112x112 fixed-point prices
///
/// A price is stored as a 256-bit value with 112 fractional bits. Reserves are
/// bounded by 2^112 - 1, so an encoded reserve fits in 224 bits and a ratio of
/// two reserves times a 32-bit elapsed time fits in 256 bits.

use ethnum::U256;
use exchange_types::{ExchangeError, ExchangeResult, RESOLUTION};

/// 1.0 in UQ112x112
pub const Q112: U256 = U256::new(1u128 << RESOLUTION);

/// Encode an integer as UQ112x112
pub fn encode(value: u128) -> U256 {
    U256::from(value) << RESOLUTION
}

/// Divide a UQ112x112 value by an integer, yielding UQ112x112
pub fn uqdiv(value: U256, divisor: u128) -> ExchangeResult<U256> {
    if divisor == 0 {
        return Err(ExchangeError::DivisionByZero);
    }
    Ok(value / U256::from(divisor))
}

/// `numerator / denominator` as a UQ112x112 price
pub fn price_ratio(numerator: u128, denominator: u128) -> ExchangeResult<U256> {
    uqdiv(encode(numerator), denominator)
}

/// Integer part of a UQ112x112 value
pub fn decode(value: U256) -> U256 {
    value >> RESOLUTION
}

/// Multiply a UQ112x112 value by an integer amount and truncate to an integer
pub fn mul_decode(value: U256, amount: u128) -> ExchangeResult<U256> {
    value
        .checked_mul(U256::from(amount))
        .map(decode)
        .ok_or(ExchangeError::MathOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use exchange_types::MAX_RESERVE;

    #[test]
    fn test_encode_decode() {
        assert_eq!(encode(1), Q112);
        assert_eq!(decode(encode(12345)), U256::new(12345));
    }

    #[test]
    fn test_price_ratio() {
        // 4 / 2 = 2.0
        assert_eq!(price_ratio(4, 2).unwrap(), Q112 * U256::new(2));

        // 1 / 4 = 0.25
        assert_eq!(price_ratio(1, 4).unwrap(), Q112 / U256::new(4));

        assert_eq!(price_ratio(1, 0), Err(ExchangeError::DivisionByZero));
    }

    #[test]
    fn test_extreme_ratio_fits_with_elapsed_time() {
        let ratio = price_ratio(MAX_RESERVE, 1).unwrap();
        assert!(ratio.checked_mul(U256::from(u32::MAX)).is_some());
    }

    #[test]
    fn test_mul_decode() {
        // 2.5 * 10 = 25
        let two_and_a_half = price_ratio(5, 2).unwrap();
        assert_eq!(mul_decode(two_and_a_half, 10).unwrap(), U256::new(25));
    }
}
