/// Protocol constants used across the token exchange

// ============================================================================
// Pool Constants
// ============================================================================

/// Claims permanently locked at the null identity on the first deposit
pub const MINIMUM_LIQUIDITY: u128 = 1_000;

/// Largest value a reserve can hold: 2^112 - 1
pub const MAX_RESERVE: u128 = (1u128 << 112) - 1;

/// Swap fee numerator, charged on the input side (0.3%)
pub const SWAP_FEE_NUMERATOR: u128 = 3;

/// Swap fee denominator
pub const SWAP_FEE_DENOMINATOR: u128 = 1_000;

/// Weight of the current root-k in the protocol fee denominator.
/// A value of 5 hands the protocol one sixth of the accrued fees.
pub const PROTOCOL_FEE_ROOT_K_WEIGHT: u128 = 5;

/// Fractional bits of the UQ112x112 price format
pub const RESOLUTION: u32 = 112;

// ============================================================================
// Claim Token Constants
// ============================================================================

/// Allowance value that is never decremented by `transfer_from`
pub const UNLIMITED_ALLOWANCE: u128 = u128::MAX;

pub const CLAIM_TOKEN_NAME: &str = "Exchange LP Token";

pub const CLAIM_TOKEN_SYMBOL: &str = "EX-LP";

pub const CLAIM_TOKEN_DECIMALS: u8 = 18;

/// Version string bound into every permit domain
pub const CLAIM_TOKEN_VERSION: &str = "1";

// ============================================================================
// Structured Data Signing
// ============================================================================

pub const DOMAIN_TYPE: &str =
    "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

pub const PERMIT_TYPE: &str =
    "Permit(address owner,address spender,uint256 value,uint256 nonce,uint256 deadline)";

/// Prefix of every signed digest
pub const STRUCTURED_DATA_PREFIX: [u8; 2] = [0x19, 0x01];

/// Prefix of pool address derivation
pub const POOL_ADDRESS_PREFIX: u8 = 0xff;

// ============================================================================
// Execution Environment Defaults
// ============================================================================

/// Chain identifier used when no configuration is supplied
pub const DEFAULT_CHAIN_ID: u64 = 31_337;
