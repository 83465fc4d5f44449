//! Bank deployment configuration
//!
//! Loaded once at construction. Field defaults follow a typical ETH/USD
//! deployment: 18-decimal native coin, one hour feed heartbeat.

use bank_types::numeric::{Amount, NATIVE_DECIMALS};
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

const DEFAULT_STALE_THRESHOLD_SECS: i64 = 3600;

/// Construction-time parameters of a bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BankConfig {
    /// Per-call native withdrawal limit; immutable after deployment.
    pub withdraw_threshold_native: Amount,
    /// Initial USD cap on native reserves, at the price feed's precision.
    pub bank_cap_usd_native: u128,
    /// Oldest acceptable price feed answer, in seconds.
    #[serde(default = "default_stale_threshold")]
    pub stale_threshold_secs: i64,
    #[serde(default = "default_native_decimals")]
    pub native_decimals: u8,
}

fn default_stale_threshold() -> i64 {
    DEFAULT_STALE_THRESHOLD_SECS
}

fn default_native_decimals() -> u8 {
    NATIVE_DECIMALS
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            // 0.1 coin
            withdraw_threshold_native: 100_000_000_000_000_000,
            // 100,000 USD at 8 decimals
            bank_cap_usd_native: 100_000 * 100_000_000,
            stale_threshold_secs: DEFAULT_STALE_THRESHOLD_SECS,
            native_decimals: NATIVE_DECIMALS,
        }
    }
}

impl BankConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: BankConfig =
            serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.withdraw_threshold_native == 0 {
            return Err(ConfigError::InvalidField {
                field: "withdraw_threshold_native",
                reason: "must be positive".to_string(),
            });
        }
        if self.bank_cap_usd_native == 0 {
            return Err(ConfigError::InvalidField {
                field: "bank_cap_usd_native",
                reason: "must be positive".to_string(),
            });
        }
        if self.stale_threshold_secs <= 0 {
            return Err(ConfigError::InvalidField {
                field: "stale_threshold_secs",
                reason: "must be positive".to_string(),
            });
        }
        if self.native_decimals > 38 {
            return Err(ConfigError::InvalidField {
                field: "native_decimals",
                reason: format!("{} does not fit 128-bit scaling", self.native_decimals),
            });
        }
        Ok(())
    }
}
