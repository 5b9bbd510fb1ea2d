/// Reentrancy protection for pool operations.
/// Every mutating pool call holds the pool's lock for its whole duration,
/// including the swap callback, so untrusted code run from inside a swap
/// cannot enter the same pool again.
use exchange_types::{ExchangeError, ExchangeResult};
use tracing::warn;

// ============================================================================
// Reentrancy Status Types
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReentrancyStatus {
    /// Pool is idle and accepts operations
    #[default]
    Unlocked,
    /// An operation on the pool is in progress
    Locked,
}

// ============================================================================
// Reentrancy Guard Manager
// ============================================================================

pub struct ReentrancyGuard;

impl ReentrancyGuard {
    /// Acquire lock for pool operation
    pub fn acquire(status: &mut ReentrancyStatus) -> ExchangeResult<()> {
        match *status {
            ReentrancyStatus::Unlocked => {
                *status = ReentrancyStatus::Locked;
                Ok(())
            }
            ReentrancyStatus::Locked => {
                warn!("reentrant pool call rejected");
                Err(ExchangeError::Reentrant)
            }
        }
    }

    /// Release lock after operation completes
    pub fn release(status: &mut ReentrancyStatus) {
        if *status == ReentrancyStatus::Unlocked {
            warn!("release of an unlocked pool");
        }
        *status = ReentrancyStatus::Unlocked;
    }

    pub fn is_locked(status: &ReentrancyStatus) -> bool {
        *status != ReentrancyStatus::Unlocked
    }
}
