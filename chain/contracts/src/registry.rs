//! Asset Registry: per-asset limits and metadata
//!
//! Tokens carry an [`AssetConfig`] that only an admin rewrites, and only while
//! the bank is paused. Entries are never removed; a retired token is disabled.
//! The native coin has its own [`NativeParams`]: a withdrawal threshold fixed
//! at deployment and a cap expressed in USD.

use bank_types::ids::{AssetId, TokenId};
use bank_types::numeric::{Amount, DEFAULT_DECIMALS};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::BankError;

/// Admin-supplied limits for a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetParams {
    pub withdraw_threshold: Amount,
    pub deposit_cap: Amount,
    pub enabled: bool,
}

impl AssetParams {
    pub fn enabled(withdraw_threshold: Amount, deposit_cap: Amount) -> Self {
        Self {
            withdraw_threshold,
            deposit_cap,
            enabled: true,
        }
    }

    /// An enabled asset needs a positive threshold and cap.
    pub fn validate(&self) -> Result<(), BankError> {
        if !self.enabled {
            return Ok(());
        }
        if self.withdraw_threshold == 0 {
            return Err(BankError::InvalidParams {
                reason: "enabled asset needs a positive withdraw threshold".to_string(),
            });
        }
        if self.deposit_cap == 0 {
            return Err(BankError::InvalidParams {
                reason: "enabled asset needs a positive deposit cap".to_string(),
            });
        }
        Ok(())
    }
}

/// Stored configuration of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetConfig {
    pub withdraw_threshold: Amount,
    pub deposit_cap: Amount,
    pub enabled: bool,
    /// Cached token metadata; only used for reporting.
    pub decimals: u8,
}

impl AssetConfig {
    pub fn params(&self) -> AssetParams {
        AssetParams {
            withdraw_threshold: self.withdraw_threshold,
            deposit_cap: self.deposit_cap,
            enabled: self.enabled,
        }
    }
}

/// Parameters of the native coin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeParams {
    /// Fixed at deployment.
    pub withdraw_threshold: Amount,
    /// Ceiling on the USD value of native reserves, at feed precision.
    pub bank_cap_usd: u128,
    pub decimals: u8,
}

#[derive(Debug, Clone)]
pub struct AssetRegistry {
    native: NativeParams,
    tokens: HashMap<TokenId, AssetConfig>,
}

impl AssetRegistry {
    pub fn new(native: NativeParams) -> Self {
        Self {
            native,
            tokens: HashMap::new(),
        }
    }

    pub fn native(&self) -> &NativeParams {
        &self.native
    }

    /// Replace the USD cap; returns the previous one.
    pub fn set_bank_cap_usd(&mut self, cap: u128) -> u128 {
        std::mem::replace(&mut self.native.bank_cap_usd, cap)
    }

    pub fn get(&self, token: TokenId) -> Option<&AssetConfig> {
        self.tokens.get(&token)
    }

    /// Configuration of a token that currently accepts operations.
    pub fn enabled_config(&self, token: TokenId) -> Result<AssetConfig, BankError> {
        match self.tokens.get(&token) {
            Some(cfg) if cfg.enabled => Ok(*cfg),
            _ => Err(BankError::TokenDisabled { token }),
        }
    }

    /// Insert or overwrite a token entry. Returns `(previous, stored)`.
    pub fn upsert(
        &mut self,
        token: TokenId,
        params: AssetParams,
        decimals: u8,
    ) -> Result<(Option<AssetConfig>, AssetConfig), BankError> {
        params.validate()?;
        let cfg = AssetConfig {
            withdraw_threshold: params.withdraw_threshold,
            deposit_cap: params.deposit_cap,
            enabled: params.enabled,
            decimals,
        };
        let previous = self.tokens.insert(token, cfg);
        Ok((previous, cfg))
    }

    /// Reporting precision of an asset; unknown or zero falls back to 18.
    pub fn decimals_of(&self, asset: AssetId) -> u8 {
        let decimals = match asset {
            AssetId::Native => self.native.decimals,
            AssetId::Token(token) => self.tokens.get(&token).map_or(0, |cfg| cfg.decimals),
        };
        if decimals == 0 {
            DEFAULT_DECIMALS
        } else {
            decimals
        }
    }

    pub fn tokens(&self) -> impl Iterator<Item = (&TokenId, &AssetConfig)> {
        self.tokens.iter()
    }
}
