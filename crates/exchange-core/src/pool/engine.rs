//! Pool operations: deposit, withdraw, swap, sync, skim
//!
//! Each operation locks its pool for its whole duration and runs inside an
//! atomic checkpoint, so a failure at any step (including inside a swap
//! callback) leaves no trace.

use exchange_math::{
    check_invariant, mul_div_u128, safe_sub_u128, sqrt_u256, u256_to_u128, widening_mul,
};
use exchange_types::{Address, ExchangeError, ExchangeResult, MINIMUM_LIQUIDITY};
use tracing::debug;

use super::reentrancy::ReentrancyGuard;
use crate::assets::AssetTransfer;
use crate::events::Event;
use crate::exchange::{Exchange, ExchangeState, SwapCallback};

impl Exchange {
    /// Issue claims for the assets sent to `pool` since its last update
    ///
    /// Returns the claims minted to `recipient`.
    pub fn deposit(&mut self, pool: Address, recipient: Address) -> ExchangeResult<u128> {
        self.atomic(|ex| ex.with_lock(pool, |ex| ex.deposit_locked(pool, recipient)))
    }

    /// Redeem the claims sent to `pool` for a proportional share of both reserves
    ///
    /// Returns the asset amounts sent to `recipient`.
    pub fn withdraw(&mut self, pool: Address, recipient: Address) -> ExchangeResult<(u128, u128)> {
        self.atomic(|ex| ex.with_lock(pool, |ex| ex.withdraw_locked(pool, recipient)))
    }

    /// Send `amount0_out` / `amount1_out` to `recipient` against input already
    /// sent to the pool, or sent by `callback` when `data` is non-empty
    #[allow(clippy::too_many_arguments)]
    pub fn swap(
        &mut self,
        pool: Address,
        sender: Address,
        amount0_out: u128,
        amount1_out: u128,
        recipient: Address,
        data: &[u8],
        callback: Option<&mut dyn SwapCallback>,
    ) -> ExchangeResult<()> {
        self.atomic(|ex| {
            ex.with_lock(pool, |ex| {
                ex.swap_locked(pool, sender, amount0_out, amount1_out, recipient, data, callback)
            })
        })
    }

    /// Force reserves to match balances
    pub fn sync(&mut self, pool: Address) -> ExchangeResult<()> {
        self.atomic(|ex| {
            ex.with_lock(pool, |ex| {
                let now = ex.env.block_timestamp();
                let ExchangeState { assets, registry } = &mut ex.state;
                let pool_state = registry.pool_mut(pool)?;
                let balance0 = assets.balance_of(pool_state.asset0, pool);
                let balance1 = assets.balance_of(pool_state.asset1, pool);
                pool_state.update(balance0, balance1, now, &mut ex.events)?;
                debug!(%pool, reserve0 = balance0, reserve1 = balance1, "pool synced");
                Ok(())
            })
        })
    }

    /// Send any balance above the reserves to `recipient`
    pub fn skim(&mut self, pool: Address, recipient: Address) -> ExchangeResult<()> {
        self.atomic(|ex| {
            ex.with_lock(pool, |ex| {
                let ExchangeState { assets, registry } = &mut ex.state;
                let pool_state = registry.pool(pool)?;
                let (asset0, asset1) = pool_state.assets();
                let (reserve0, reserve1, _) = pool_state.get_reserves();

                let excess0 = assets.balance_of(asset0, pool).saturating_sub(reserve0);
                let excess1 = assets.balance_of(asset1, pool).saturating_sub(reserve1);
                assets.transfer(asset0, pool, recipient, excess0)?;
                assets.transfer(asset1, pool, recipient, excess1)?;
                debug!(%pool, %recipient, excess0, excess1, "pool skimmed");
                Ok(())
            })
        })
    }

    /// Run `op` with `pool` locked, releasing the lock on every path
    fn with_lock<T>(
        &mut self,
        pool: Address,
        op: impl FnOnce(&mut Self) -> ExchangeResult<T>,
    ) -> ExchangeResult<T> {
        ReentrancyGuard::acquire(self.state.registry.pool_mut(pool)?.status_mut())?;
        let result = op(self);
        if let Ok(pool_state) = self.state.registry.pool_mut(pool) {
            ReentrancyGuard::release(pool_state.status_mut());
        }
        result
    }

    fn deposit_locked(&mut self, pool: Address, recipient: Address) -> ExchangeResult<u128> {
        let now = self.env.block_timestamp();
        let ExchangeState { assets, registry } = &mut self.state;
        let fee_recipient = registry.fee_recipient();
        let events = &mut self.events;
        let pool_state = registry.pool_mut(pool)?;

        let (reserve0, reserve1, _) = pool_state.get_reserves();
        let balance0 = assets.balance_of(pool_state.asset0, pool);
        let balance1 = assets.balance_of(pool_state.asset1, pool);
        let amount0 = safe_sub_u128(balance0, reserve0)?;
        let amount1 = safe_sub_u128(balance1, reserve1)?;

        let fee_on = pool_state.mint_protocol_fee(fee_recipient, events)?;
        let total_supply = pool_state.ledger.total_supply();

        let liquidity = if total_supply == 0 {
            let root = u256_to_u128(sqrt_u256(widening_mul(amount0, amount1)))?;
            if root <= MINIMUM_LIQUIDITY {
                return Err(ExchangeError::InsufficientInitialLiquidity);
            }
            // Locked forever so the supply never returns to zero
            pool_state.ledger.mint(Address::ZERO, MINIMUM_LIQUIDITY, events)?;
            root - MINIMUM_LIQUIDITY
        } else {
            std::cmp::min(
                mul_div_u128(amount0, total_supply, reserve0)?,
                mul_div_u128(amount1, total_supply, reserve1)?,
            )
        };
        if liquidity == 0 {
            return Err(ExchangeError::InsufficientLiquidityMinted);
        }
        pool_state.ledger.mint(recipient, liquidity, events)?;

        pool_state.update(balance0, balance1, now, events)?;
        if fee_on {
            pool_state.set_k_last(widening_mul(balance0, balance1));
        }

        debug!(
            %pool, %recipient, amount0, amount1, liquidity,
            reserve0 = balance0, reserve1 = balance1,
            "deposit"
        );
        events.emit(Event::Mint {
            pool,
            sender: recipient,
            amount0,
            amount1,
        });
        Ok(liquidity)
    }

    fn withdraw_locked(&mut self, pool: Address, recipient: Address) -> ExchangeResult<(u128, u128)> {
        let now = self.env.block_timestamp();
        let ExchangeState { assets, registry } = &mut self.state;
        let fee_recipient = registry.fee_recipient();
        let events = &mut self.events;
        let pool_state = registry.pool_mut(pool)?;

        let (asset0, asset1) = pool_state.assets();
        let (reserve0, reserve1, _) = pool_state.get_reserves();
        let liquidity = pool_state.ledger.balance_of(pool);

        let fee_on = pool_state.mint_protocol_fee(fee_recipient, events)?;
        let total_supply = pool_state.ledger.total_supply();
        if total_supply == 0 {
            return Err(ExchangeError::InsufficientLiquidityBurned);
        }

        let amount0 = mul_div_u128(liquidity, reserve0, total_supply)?;
        let amount1 = mul_div_u128(liquidity, reserve1, total_supply)?;
        if amount0 == 0 || amount1 == 0 {
            return Err(ExchangeError::InsufficientLiquidityBurned);
        }

        pool_state.ledger.burn(pool, liquidity, events)?;
        assets.transfer(asset0, pool, recipient, amount0)?;
        assets.transfer(asset1, pool, recipient, amount1)?;

        let balance0 = assets.balance_of(asset0, pool);
        let balance1 = assets.balance_of(asset1, pool);
        pool_state.update(balance0, balance1, now, events)?;
        if fee_on {
            pool_state.set_k_last(widening_mul(balance0, balance1));
        }

        debug!(
            %pool, %recipient, liquidity, amount0, amount1,
            reserve0 = balance0, reserve1 = balance1,
            "withdraw"
        );
        events.emit(Event::Burn {
            pool,
            sender: recipient,
            amount0,
            amount1,
            to: recipient,
        });
        Ok((amount0, amount1))
    }

    #[allow(clippy::too_many_arguments)]
    fn swap_locked(
        &mut self,
        pool: Address,
        sender: Address,
        amount0_out: u128,
        amount1_out: u128,
        recipient: Address,
        data: &[u8],
        callback: Option<&mut dyn SwapCallback>,
    ) -> ExchangeResult<()> {
        if amount0_out == 0 && amount1_out == 0 {
            return Err(ExchangeError::InsufficientOutputAmount);
        }

        let (asset0, asset1, reserve0, reserve1) = {
            let pool_state = self.state.registry.pool(pool)?;
            let (reserve0, reserve1, _) = pool_state.get_reserves();
            (pool_state.asset0, pool_state.asset1, reserve0, reserve1)
        };
        if amount0_out >= reserve0 || amount1_out >= reserve1 {
            return Err(ExchangeError::InsufficientLiquidity);
        }
        if recipient == asset0 || recipient == asset1 {
            return Err(ExchangeError::InvalidRecipient);
        }
        if !data.is_empty() && callback.is_none() {
            return Err(ExchangeError::MissingCallback);
        }

        // Optimistic transfer: outputs leave before the input is checked
        if amount0_out > 0 {
            self.state.assets.transfer(asset0, pool, recipient, amount0_out)?;
        }
        if amount1_out > 0 {
            self.state.assets.transfer(asset1, pool, recipient, amount1_out)?;
        }
        if let (false, Some(callback)) = (data.is_empty(), callback) {
            callback.on_swap(self, sender, amount0_out, amount1_out, data)?;
        }

        let balance0 = self.state.assets.balance_of(asset0, pool);
        let balance1 = self.state.assets.balance_of(asset1, pool);
        let amount0_in = balance0.saturating_sub(reserve0 - amount0_out);
        let amount1_in = balance1.saturating_sub(reserve1 - amount1_out);
        if amount0_in == 0 && amount1_in == 0 {
            return Err(ExchangeError::InsufficientInputAmount);
        }
        check_invariant(balance0, balance1, amount0_in, amount1_in, reserve0, reserve1)?;

        let now = self.env.block_timestamp();
        let events = &mut self.events;
        self.state.registry.pool_mut(pool)?.update(balance0, balance1, now, events)?;

        debug!(
            %pool, %sender, %recipient,
            amount0_in, amount1_in, amount0_out, amount1_out,
            reserve0 = balance0, reserve1 = balance1,
            "swap"
        );
        events.emit(Event::Swap {
            pool,
            sender,
            amount0_in,
            amount1_in,
            amount0_out,
            amount1_out,
            to: recipient,
        });
        Ok(())
    }
}
