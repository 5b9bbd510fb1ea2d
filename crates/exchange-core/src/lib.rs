//! # Exchange Core - Constant-Product Pools
//!
//! This crate contains the state machine of a two-asset automated market
//! maker. It provides:
//!
//! - Pools trading along `x · y = k` with a 0.3% input fee, an optional
//!   protocol fee and time-weighted price accumulators
//! - A claim token ledger per pool with signature-based approvals (permits)
//! - A registry deriving one pool address per unordered asset pair
//! - The [`Exchange`] runtime that owns all state and runs every pool
//!   operation atomically
//!
//! Everything executes serially against one owned [`Exchange`] value.

pub mod assets;
pub mod config;
pub mod environment;
pub mod events;
pub mod exchange;
mod journal;
pub mod ledger;
pub mod pool;
pub mod registry;

// Re-export commonly used items
pub use assets::{AssetBook, AssetTransfer};
pub use config::{ClaimTokenConfig, ExchangeConfig};
pub use environment::Environment;
pub use events::{Event, EventLog};
pub use exchange::{Exchange, SwapCallback};
pub use ledger::permit::{sign_permit, signer_address, PermitSignature};
pub use ledger::ClaimLedger;
pub use pool::oracle::PriceObservation;
pub use pool::Pool;
pub use registry::{pool_address, sort_assets, PoolRegistry, RegistryConfig};

pub use exchange_math::{amount_in, amount_out, quote, U256};
pub use exchange_types::{Address, AssetId, ExchangeError, ExchangeResult};
