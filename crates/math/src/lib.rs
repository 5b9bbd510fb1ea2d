/// Mathematical utilities for the token exchange
/// 
/// This crate provides overflow-checked arithmetic, 256-bit helpers,
/// integer square roots, the UQ112x112 price format and single-pool
/// constant-product pricing. Everything is integer-only and bit-exact.

pub mod pricing;
pub mod safe;
pub mod uq112x112;

// Re-export commonly used functions
pub use pricing::*;
pub use safe::*;
pub use uq112x112::*;

/// 256-bit unsigned integer used for products and fixed-point values
pub use ethnum::U256;
