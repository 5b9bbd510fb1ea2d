/// Protocol fee collection
///
/// While a fee recipient is set, one sixth of the swap fees accrued since the
/// last liquidity event is minted to it as claims. Growth in `sqrt(k)` between
/// liquidity events is fee income, and the recipient receives
///
/// `supply · (√k - √k_last) / (5·√k + √k_last)`
///
/// Collection is lazy: it runs at the start of every deposit and withdrawal.
use exchange_math::{safe_add_u256, safe_mul_u256, sqrt_u256, u256_to_u128, widening_mul, U256};
use exchange_types::{Address, ExchangeResult, PROTOCOL_FEE_ROOT_K_WEIGHT};
use tracing::debug;

use super::Pool;
use crate::events::EventLog;

/// Claims owed to the protocol for the growth from `k_last` to `k`
pub fn protocol_fee_liquidity(total_supply: u128, k: U256, k_last: U256) -> ExchangeResult<u128> {
    let root_k = sqrt_u256(k);
    let root_k_last = sqrt_u256(k_last);
    if root_k <= root_k_last {
        return Ok(0);
    }

    let numerator = safe_mul_u256(U256::from(total_supply), root_k - root_k_last)?;
    let denominator = safe_add_u256(
        safe_mul_u256(root_k, U256::from(PROTOCOL_FEE_ROOT_K_WEIGHT))?,
        root_k_last,
    )?;
    u256_to_u128(numerator / denominator)
}

impl Pool {
    /// Mint the accrued protocol fee, returning whether collection is on
    ///
    /// With collection off, a stale `k_last` is cleared so that fees accrued
    /// while it was off are never charged later.
    pub(crate) fn mint_protocol_fee(
        &mut self,
        fee_recipient: Address,
        events: &mut EventLog,
    ) -> ExchangeResult<bool> {
        let fee_on = !fee_recipient.is_zero();

        if fee_on {
            if self.k_last != U256::ZERO {
                let k = widening_mul(self.reserve0, self.reserve1);
                let liquidity =
                    protocol_fee_liquidity(self.ledger.total_supply(), k, self.k_last)?;
                if liquidity > 0 {
                    self.ledger.mint(fee_recipient, liquidity, events)?;
                    debug!(pool = %self.address, %fee_recipient, liquidity, "protocol fee minted");
                }
            }
        } else if self.k_last != U256::ZERO {
            self.k_last = U256::ZERO;
        }

        Ok(fee_on)
    }
}
