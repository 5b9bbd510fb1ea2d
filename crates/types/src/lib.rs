/// Shared types for the token exchange
/// 
/// This crate provides the address type, protocol constants and the error
/// taxonomy shared by the math crate and the exchange core.

pub mod address;
pub mod constants;
pub mod errors;

// Re-export all public types
pub use address::*;
pub use constants::*;
pub use errors::*;

/// Result type alias using the shared error type
pub type ExchangeResult<T> = std::result::Result<T, ExchangeError>;
