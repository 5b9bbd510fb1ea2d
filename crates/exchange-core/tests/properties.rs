//! # Property Tests
//!
//! Invariants that must hold for arbitrary sequences of pool operations.

mod common;

use common::*;
use exchange_types::MINIMUM_LIQUIDITY;
use proptest::prelude::*;

// ============================================================================
// Test Strategies
// ============================================================================

#[derive(Debug, Clone)]
enum Action {
    Deposit { provider: Address, amount0: u128, amount1: u128 },
    Withdraw { provider: Address, share_bps: u128 },
    SwapAForB(u128),
    SwapBForA(u128),
    Donate(u128),
    Sync,
    Wait(u64),
}

/// Amounts between 10^-12 and 10^3 whole tokens
fn token_amount() -> impl Strategy<Value = u128> {
    1_000_000u128..=1_000 * E18
}

fn provider() -> impl Strategy<Value = Address> {
    prop_oneof![Just(ALICE), Just(BOB)]
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        (provider(), token_amount(), token_amount())
            .prop_map(|(provider, amount0, amount1)| Action::Deposit { provider, amount0, amount1 }),
        (provider(), 1u128..=10_000).prop_map(|(provider, share_bps)| Action::Withdraw { provider, share_bps }),
        token_amount().prop_map(Action::SwapAForB),
        token_amount().prop_map(Action::SwapBForA),
        token_amount().prop_map(Action::Donate),
        Just(Action::Sync),
        (1u64..86_400).prop_map(Action::Wait),
    ]
}

/// Apply an action, ignoring failures. Failed actions must not change anything.
fn apply(ctx: &mut TestContext, action: &Action) {
    let _ = match *action {
        Action::Deposit { provider, amount0, amount1 } => ctx.add_liquidity(provider, amount0, amount1).map(|_| ()),
        Action::Withdraw { provider, share_bps } => {
            let claims = ctx.claims(provider) * share_bps / 10_000;
            ctx.remove_liquidity(provider, claims).map(|_| ())
        }
        Action::SwapAForB(amount) => ctx.swap_a_for_b(BOB, amount).map(|_| ()),
        Action::SwapBForA(amount) => ctx.swap_b_for_a(ALICE, amount).map(|_| ()),
        Action::Donate(amount) => ctx.exchange.transfer_asset(TOKEN_A, BOB, ctx.pool, amount),
        Action::Sync => ctx.exchange.sync(ctx.pool),
        Action::Wait(seconds) => {
            ctx.exchange.advance_time(seconds);
            Ok(())
        }
    };
}

fn k(ctx: &TestContext) -> U256 {
    let (reserve0, reserve1, _) = ctx.reserves();
    U256::from(reserve0) * U256::from(reserve1)
}

// ============================================================================
// Conservation Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Claim balances always sum to the supply and reserves never exceed balances
    #[test]
    fn prop_ledger_and_reserves_stay_consistent(
        actions in prop::collection::vec(action(), 1..40),
        fee_on in any::<bool>(),
    ) {
        let mut ctx = if fee_on { TestContext::with_protocol_fee() } else { TestContext::new() };
        for action in &actions {
            apply(&mut ctx, action);
            ctx.assert_consistent();
            assert!(!ctx.exchange.pool(ctx.pool).unwrap().is_locked());

            let supply = ctx.supply();
            prop_assert!(supply == 0 || supply >= MINIMUM_LIQUIDITY);
        }
    }

    /// A deposit grows the supply by exactly the claims minted, plus any protocol fee
    #[test]
    fn prop_deposit_conserves_supply(
        seed in (token_amount(), token_amount()),
        swaps in prop::collection::vec(token_amount(), 0..5),
        deposit in (token_amount(), token_amount()),
    ) {
        let mut ctx = TestContext::with_protocol_fee();
        prop_assume!(ctx.add_liquidity(ALICE, seed.0, seed.1).is_ok());
        for amount in swaps {
            let _ = ctx.swap_a_for_b(BOB, amount);
        }

        let supply = ctx.supply();
        let fees = ctx.claims(FEE_TO);
        if let Ok(minted) = ctx.add_liquidity(BOB, deposit.0, deposit.1) {
            let fee_minted = ctx.claims(FEE_TO) - fees;
            prop_assert_eq!(ctx.supply(), supply + minted + fee_minted);
        }
    }

    /// Swaps alone never decrease reserve0 · reserve1
    #[test]
    fn prop_swaps_never_decrease_k(
        seed in (token_amount(), token_amount()),
        swaps in prop::collection::vec((any::<bool>(), token_amount()), 1..20),
    ) {
        let mut ctx = TestContext::new();
        prop_assume!(ctx.add_liquidity(ALICE, seed.0, seed.1).is_ok());

        let mut last = k(&ctx);
        for (a_for_b, amount) in swaps {
            let _ = if a_for_b { ctx.swap_a_for_b(BOB, amount) } else { ctx.swap_b_for_a(BOB, amount) };
            let next = k(&ctx);
            prop_assert!(next >= last);
            last = next;
        }
    }

    /// Depositing (x, x) into an empty pool and withdrawing everything returns
    /// between x - 1000 and x of each asset
    #[test]
    fn prop_round_trip_loses_at_most_minimum_liquidity(x in (MINIMUM_LIQUIDITY + 1)..=1_000 * E18) {
        let mut ctx = TestContext::new();
        let minted = ctx.add_liquidity(ALICE, x, x).unwrap();
        let (out0, out1) = ctx.remove_liquidity(ALICE, minted).unwrap();

        prop_assert!(out0 <= x && out0 >= x - MINIMUM_LIQUIDITY);
        prop_assert!(out1 <= x && out1 >= x - MINIMUM_LIQUIDITY);
    }

    /// Asking for more than the quoted output fails and changes nothing
    #[test]
    fn prop_overdrawn_swap_leaves_no_trace(
        seed in (token_amount(), token_amount()),
        amount in token_amount(),
        excess in 1u128..1_000_000,
    ) {
        let mut ctx = TestContext::new();
        prop_assume!(ctx.add_liquidity(ALICE, seed.0, seed.1).is_ok());
        let (reserve0, reserve1, _) = ctx.reserves();
        let quoted = amount_out(amount, reserve0, reserve1).unwrap();
        prop_assume!(quoted + excess < reserve1);

        ctx.exchange.transfer_asset(TOKEN_A, BOB, ctx.pool, amount).unwrap();
        ctx.exchange.drain_events();
        let bob_b = ctx.balance(TOKEN_B, BOB);

        let result = ctx.exchange.swap(ctx.pool, BOB, 0, quoted + excess, BOB, &[], None);
        prop_assert_eq!(result, Err(ExchangeError::InvariantViolated));
        prop_assert_eq!(ctx.balance(TOKEN_B, BOB), bob_b);
        prop_assert_eq!(ctx.reserves().1, reserve1);
        prop_assert!(ctx.exchange.events().is_empty());
    }
}
