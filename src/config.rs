// Ledger configuration
//
// A deployer supplies exactly one required value: the address of the stable
// token used for transfers. The custody account is derived from it unless
// overridden.

use crate::identity::{Address, AddressError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable holding the stable-token address
pub const ENV_TOKEN_ADDRESS: &str = "STABLE_TOKEN_ADDRESS";
/// Environment variable overriding the custody account
pub const ENV_CUSTODY_ADDRESS: &str = "CHARITY_CUSTODY_ADDRESS";
/// Environment variable overriding the store directory of the CLI
pub const ENV_DATA_DIR: &str = "CHARITY_DATA_DIR";
/// Store directory used when none is given
pub const DEFAULT_DATA_DIR: &str = "charity-data";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing stable-token address (set STABLE_TOKEN_ADDRESS)")]
    MissingTokenAddress,

    #[error("Invalid address in {key}: {source}")]
    InvalidAddress {
        key: &'static str,
        #[source]
        source: AddressError,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration for a campaign ledger
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Stable token the ledger moves funds with; immutable after deployment
    pub token_address: Address,
    /// Account that holds donations until withdrawal or refund
    pub custody_address: Address,
}

impl LedgerConfig {
    /// Create a config for the given token with the derived custody account
    pub fn new(token_address: Address) -> Self {
        Self {
            token_address,
            custody_address: Self::default_custody(&token_address),
        }
    }

    /// Custody account derived from the token address
    pub fn default_custody(token_address: &Address) -> Address {
        Address::from_label(&format!("charity-ledger:custody:{}", token_address))
    }

    /// Set the custody account
    pub fn with_custody(mut self, custody: Address) -> Self {
        self.custody_address = custody;
        self
    }

    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (environment, dotenv map, ...)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(ENV_TOKEN_ADDRESS)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingTokenAddress)?;
        let token = parse_address(ENV_TOKEN_ADDRESS, &token)?;

        let mut config = Self::new(token);

        if let Some(custody) = lookup(ENV_CUSTODY_ADDRESS).filter(|v| !v.trim().is_empty()) {
            config = config.with_custody(parse_address(ENV_CUSTODY_ADDRESS, &custody)?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token_address.is_zero() {
            return Err(ConfigError::Invalid(
                "token address cannot be the zero address".to_string(),
            ));
        }
        if self.custody_address.is_zero() {
            return Err(ConfigError::Invalid(
                "custody address cannot be the zero address".to_string(),
            ));
        }
        if self.custody_address == self.token_address {
            return Err(ConfigError::Invalid(
                "custody address must differ from the token address".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_address(key: &'static str, value: &str) -> Result<Address, ConfigError> {
    Address::parse(value.trim()).map_err(|source| ConfigError::InvalidAddress { key, source })
}
