//! Bank error types
//!
//! One taxonomy for every entry point. Each variant belongs to exactly one
//! [`ErrorKind`] so callers can tell "nothing happened, retry later" apart
//! from "you asked for something the ledger will never accept".

use bank_types::ids::{AccountId, AssetId, TokenId};
use thiserror::Error;

use crate::security::Role;

/// Coarse classification of a [`BankError`], in check order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input. Checked first.
    Validation,
    /// Wrong role, wrong pause state, or a re-entrant call.
    Authorization,
    /// Threshold, cap, balance or surplus limits.
    Capacity,
    /// A collaborator (token, native custody, price feed) failed.
    External,
    /// Arithmetic that does not fit the ledger's integer width.
    Internal,
}

/// Price feed failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("Invalid oracle price: {price}")]
    InvalidPrice { price: i128 },

    #[error("Stale oracle price: updated at {updated_at}, now {now}, max age {max_age}s")]
    StalePrice {
        updated_at: i64,
        now: i64,
        max_age: i64,
    },

    #[error("Price feed unavailable: {reason}")]
    FeedUnavailable { reason: String },

    #[error("Arithmetic overflow converting to USD")]
    Overflow,
}

/// Configuration rejected at construction or load time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Malformed configuration: {0}")]
    Parse(String),
}

/// Errors raised by bank operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BankError {
    // ─── Validation ───
    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Null address supplied for {what}")]
    NullAddress { what: &'static str },

    #[error("Invalid asset parameters: {reason}")]
    InvalidParams { reason: String },

    #[error("Invalid batch: {ids} ids for {amounts} amounts")]
    InvalidBatch { ids: usize, amounts: usize },

    #[error("Token disabled: {token}")]
    TokenDisabled { token: TokenId },

    #[error("Direct native transfers are rejected (from {from})")]
    DirectTransferRejected { from: AccountId },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    // ─── Authorization ───
    #[error("Unauthorized: {caller} lacks role {role:?}")]
    Unauthorized { caller: AccountId, role: Role },

    #[error("Operation not allowed while paused")]
    EnforcedPause,

    #[error("Operation requires the paused state")]
    ExpectedPause,

    #[error("Reentrancy detected")]
    Reentrancy,

    // ─── Capacity ───
    #[error("Withdrawal threshold exceeded for {asset}: requested {requested}, threshold {threshold}")]
    ThresholdExceeded {
        asset: AssetId,
        requested: u128,
        threshold: u128,
    },

    #[error("Deposit cap exceeded for {asset}: attempted {attempted}, cap {cap}")]
    CapExceeded {
        asset: AssetId,
        attempted: u128,
        cap: u128,
    },

    #[error("Insufficient balance for {asset}: requested {requested}, available {available}")]
    InsufficientBalance {
        asset: AssetId,
        requested: u128,
        available: u128,
    },

    #[error("Recovery exceeds surplus for {asset}: requested {requested}, surplus {surplus}")]
    ExceedsSurplus {
        asset: AssetId,
        requested: u128,
        surplus: u128,
    },

    // ─── External ───
    #[error("Transfer of {asset} failed: {reason}")]
    TransferFailed { asset: AssetId, reason: String },

    #[error("No funds received for {token}")]
    NoFundsReceived { token: TokenId },

    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    // ─── Internal ───
    #[error("Arithmetic overflow in balance calculation")]
    Overflow,
}

impl BankError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BankError::InvalidAmount
            | BankError::NullAddress { .. }
            | BankError::InvalidParams { .. }
            | BankError::InvalidBatch { .. }
            | BankError::TokenDisabled { .. }
            | BankError::DirectTransferRejected { .. }
            | BankError::Config(_) => ErrorKind::Validation,
            BankError::Unauthorized { .. }
            | BankError::EnforcedPause
            | BankError::ExpectedPause
            | BankError::Reentrancy => ErrorKind::Authorization,
            BankError::ThresholdExceeded { .. }
            | BankError::CapExceeded { .. }
            | BankError::InsufficientBalance { .. }
            | BankError::ExceedsSurplus { .. } => ErrorKind::Capacity,
            BankError::TransferFailed { .. }
            | BankError::NoFundsReceived { .. }
            | BankError::Oracle(OracleError::InvalidPrice { .. })
            | BankError::Oracle(OracleError::StalePrice { .. })
            | BankError::Oracle(OracleError::FeedUnavailable { .. }) => ErrorKind::External,
            BankError::Oracle(OracleError::Overflow) | BankError::Overflow => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_error_display() {
        let token = TokenId::new();
        let err = BankError::TokenDisabled { token };
        assert_eq!(err.to_string(), format!("Token disabled: {}", token));
    }

    #[test]
    fn test_threshold_error_mentions_values() {
        let err = BankError::ThresholdExceeded {
            asset: AssetId::Native,
            requested: 11,
            threshold: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("native"));
        assert!(msg.contains("11"));
        assert!(msg.contains("10"));
    }

    #[test]
    fn test_oracle_error_converts() {
        let err: BankError = OracleError::InvalidPrice { price: -1 }.into();
        assert!(matches!(err, BankError::Oracle(OracleError::InvalidPrice { price: -1 })));
        assert_eq!(err.kind(), ErrorKind::External);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(BankError::InvalidAmount.kind(), ErrorKind::Validation);
        assert_eq!(BankError::EnforcedPause.kind(), ErrorKind::Authorization);
        assert_eq!(BankError::Reentrancy.kind(), ErrorKind::Authorization);
        assert_eq!(
            BankError::CapExceeded {
                asset: AssetId::Native,
                attempted: 2,
                cap: 1
            }
            .kind(),
            ErrorKind::Capacity
        );
        assert_eq!(BankError::Overflow.kind(), ErrorKind::Internal);
        assert_eq!(
            BankError::Oracle(OracleError::Overflow).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_config_error_converts() {
        let err: BankError = ConfigError::Parse("eof".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("eof"));
    }
}
