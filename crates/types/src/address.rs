//! # Addresses
//!
//! 160-bit identities used for holders, assets, pools and the registry.
//! Ordering is numeric (big-endian), which is what pair canonicalization relies on.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::errors::ExchangeError;

/// Opaque 160-bit identity
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address([u8; Address::LEN]);

/// Assets are identified by the address of their ledger
pub type AssetId = Address;

impl Address {
    /// Length in bytes
    pub const LEN: usize = 20;

    /// The null identity
    pub const ZERO: Address = Address([0u8; Address::LEN]);

    pub const fn new(bytes: [u8; Address::LEN]) -> Self {
        Self(bytes)
    }

    /// Address whose low 8 bytes hold `value` (big-endian), the rest zero
    pub const fn from_low_u64(value: u64) -> Self {
        let be = value.to_be_bytes();
        let mut bytes = [0u8; Address::LEN];
        let mut i = 0;
        while i < 8 {
            bytes[Address::LEN - 8 + i] = be[i];
            i += 1;
        }
        Self(bytes)
    }

    /// Take the trailing 20 bytes of a 32-byte hash
    pub fn from_hash(hash: &[u8; 32]) -> Self {
        let mut bytes = [0u8; Address::LEN];
        bytes.copy_from_slice(&hash[32 - Address::LEN..]);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; Address::LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Left-padded 32-byte word, as used in structured-data hashing
    pub fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[32 - Address::LEN..].copy_from_slice(&self.0);
        word
    }
}

impl From<[u8; Address::LEN]> for Address {
    fn from(bytes: [u8; Address::LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let decoded = hex::decode(digits)
            .map_err(|e| ExchangeError::InvalidAddress(format!("{}: {}", s, e)))?;

        let bytes: [u8; Address::LEN] = decoded
            .try_into()
            .map_err(|_| ExchangeError::InvalidAddress(format!("{}: expected 20 bytes", s)))?;

        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Address::from_str(&s).map_err(serde::de::Error::custom)
    }
}
