use std::fs;
use std::path::Path;

use exchange_types::{
    Address, ExchangeError, ExchangeResult, CLAIM_TOKEN_DECIMALS, CLAIM_TOKEN_NAME,
    CLAIM_TOKEN_SYMBOL, CLAIM_TOKEN_VERSION, DEFAULT_CHAIN_ID,
};
use serde::{Deserialize, Serialize};

use crate::registry::RegistryConfig;

/// Exchange configuration loaded from a TOML file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExchangeConfig {
    /// Chain identifier bound into permit domains
    pub chain_id: u64,

    /// Address of the registry, the root of every pool address
    pub registry_address: Address,

    /// Identity allowed to change the fee recipient and the administrator
    pub administrator: Address,

    /// Protocol fee recipient. Absent means the protocol fee is off.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_recipient: Option<Address>,

    /// Clock value at startup, in seconds
    #[serde(default)]
    pub genesis_timestamp: u64,

    /// Metadata shared by every pool's claim token
    #[serde(default)]
    pub claim_token: ClaimTokenConfig,
}

/// Claim token metadata
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClaimTokenConfig {
    pub name: String,
    pub symbol: String,
    /// Version string bound into the permit domain
    pub version: String,
    pub decimals: u8,
}

impl ExchangeConfig {
    /// Load configuration from TOML file
    pub fn load(path: impl AsRef<Path>) -> ExchangeResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ExchangeError::InvalidConfig(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> ExchangeResult<Self> {
        let config: ExchangeConfig = toml::from_str(content).map_err(|e| {
            ExchangeError::InvalidConfig(format!("Failed to parse config: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> ExchangeResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| {
            ExchangeError::InvalidConfig(format!("Failed to serialize config: {}", e))
        })?;
        fs::write(path, content).map_err(|e| {
            ExchangeError::InvalidConfig(format!(
                "Failed to write config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> ExchangeResult<()> {
        if self.registry_address.is_zero() {
            return Err(ExchangeError::invalid_config(
                "registry_address",
                "must not be the null address",
            ));
        }

        if self.administrator.is_zero() {
            return Err(ExchangeError::invalid_config(
                "administrator",
                "must not be the null address",
            ));
        }

        self.claim_token.validate()
    }

    /// Registry administration settings described by this configuration
    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            administrator: self.administrator,
            fee_recipient: self.fee_recipient.unwrap_or(Address::ZERO),
        }
    }
}

impl ClaimTokenConfig {
    fn validate(&self) -> ExchangeResult<()> {
        if self.name.is_empty() {
            return Err(ExchangeError::invalid_config("claim_token.name", "must not be empty"));
        }

        if self.symbol.is_empty() {
            return Err(ExchangeError::invalid_config("claim_token.symbol", "must not be empty"));
        }

        Ok(())
    }
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            chain_id: DEFAULT_CHAIN_ID,
            registry_address: Address::from_low_u64(0xfac7),
            administrator: Address::from_low_u64(0xad),
            fee_recipient: None,
            genesis_timestamp: 0,
            claim_token: ClaimTokenConfig::default(),
        }
    }
}

impl Default for ClaimTokenConfig {
    fn default() -> Self {
        Self {
            name: CLAIM_TOKEN_NAME.to_string(),
            symbol: CLAIM_TOKEN_SYMBOL.to_string(),
            version: CLAIM_TOKEN_VERSION.to_string(),
            decimals: CLAIM_TOKEN_DECIMALS,
        }
    }
}
