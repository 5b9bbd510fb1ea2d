use thiserror::Error;

use crate::address::Address;

// ============================================================================
// Main Error Enum
// ============================================================================

/// Every way an exchange operation can fail.
///
/// Failures are atomic: an operation that returns one of these leaves reserves,
/// balances, supply and accumulators exactly as they were before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    // ========================================================================
    // Registry Errors
    // ========================================================================

    /// A pool cannot pair an asset with itself
    #[error("Identical assets")]
    IdenticalAssets,

    /// The null identity is not an asset
    #[error("Zero asset")]
    ZeroAsset,

    /// A pool already exists for this pair
    #[error("Pool exists")]
    PoolExists,

    /// No pool is registered at this address
    #[error("Pool not found: {0}")]
    PoolNotFound(Address),

    /// Caller is not the registry administrator
    #[error("Forbidden")]
    Forbidden,

    // ========================================================================
    // Pool Errors
    // ========================================================================

    /// First deposit too small to cover the locked minimum
    #[error("Insufficient initial liquidity")]
    InsufficientInitialLiquidity,

    #[error("Insufficient liquidity minted")]
    InsufficientLiquidityMinted,

    #[error("Insufficient liquidity burned")]
    InsufficientLiquidityBurned,

    #[error("Insufficient output amount")]
    InsufficientOutputAmount,

    /// Requested output is not strictly below the reserve
    #[error("Insufficient liquidity")]
    InsufficientLiquidity,

    #[error("Insufficient input amount")]
    InsufficientInputAmount,

    /// The fee-adjusted product fell below the pre-trade product (the `K` check)
    #[error("Invariant violated (K)")]
    InvariantViolated,

    /// A mutating call arrived while the pool was busy
    #[error("Reentrant call")]
    Reentrant,

    /// Balance exceeds what a reserve can hold
    #[error("Reserve overflow")]
    ReserveOverflow,

    /// Swap carried callback data but no settlement callback was supplied
    #[error("Missing swap callback")]
    MissingCallback,

    // ========================================================================
    // Ledger Errors
    // ========================================================================

    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Insufficient allowance")]
    InsufficientAllowance,

    #[error("Invalid recipient")]
    InvalidRecipient,

    /// Permit deadline has passed
    #[error("Expired")]
    Expired,

    #[error("Invalid signature")]
    InvalidSignature,

    // ========================================================================
    // Math Errors
    // ========================================================================

    #[error("Math overflow")]
    MathOverflow,

    #[error("Math underflow")]
    MathUnderflow,

    #[error("Division by zero")]
    DivisionByZero,

    // ========================================================================
    // Configuration Errors
    // ========================================================================

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ExchangeError {
    /// Create an invalid configuration error
    pub fn invalid_config(parameter: &str, reason: &str) -> Self {
        Self::InvalidConfig(format!("'{}' {}", parameter, reason))
    }
}
