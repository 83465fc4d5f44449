//! Bank events
//!
//! Immutable records appended after an operation commits. Configuration
//! events carry both the previous and the new value.

use bank_types::ids::{AccountId, TokenId};
use bank_types::numeric::Amount;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::registry::AssetConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeDeposited {
    pub user: AccountId,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeWithdrawn {
    pub user: AccountId,
    pub to: AccountId,
    pub amount: Amount,
}

/// `requested` is what the depositor asked to move, `received` what the bank
/// actually gained; they differ for fee-on-transfer tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDeposited {
    pub user: AccountId,
    pub token: TokenId,
    pub requested: Amount,
    pub received: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenWithdrawn {
    pub user: AccountId,
    pub to: AccountId,
    pub token: TokenId,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEnabled {
    pub token: TokenId,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetParamsUpdated {
    pub token: TokenId,
    pub old: Option<AssetConfig>,
    pub new: AssetConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokensRecovered {
    pub token: TokenId,
    pub to: AccountId,
    pub amount: Amount,
    pub by: AccountId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueRecovered {
    pub collection: TokenId,
    pub to: AccountId,
    pub item: u128,
    pub by: AccountId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRecovered {
    pub collection: TokenId,
    pub to: AccountId,
    pub ids: Vec<u128>,
    pub amounts: Vec<Amount>,
    pub by: AccountId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeSurplusRecovered {
    pub to: AccountId,
    pub amount: Amount,
    pub by: AccountId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleUpdated {
    pub old: AccountId,
    pub new: AccountId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankCapUpdated {
    pub old: u128,
    pub new: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseChanged {
    pub by: AccountId,
}

/// Enum wrapper for all bank events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BankEvent {
    NativeDeposited(NativeDeposited),
    NativeWithdrawn(NativeWithdrawn),
    TokenDeposited(TokenDeposited),
    TokenWithdrawn(TokenWithdrawn),
    AssetEnabled(AssetEnabled),
    AssetParamsUpdated(AssetParamsUpdated),
    TokensRecovered(TokensRecovered),
    UniqueRecovered(UniqueRecovered),
    BatchRecovered(BatchRecovered),
    NativeSurplusRecovered(NativeSurplusRecovered),
    OracleUpdated(OracleUpdated),
    BankCapUpdated(BankCapUpdated),
    Paused(PauseChanged),
    Unpaused(PauseChanged),
}

/// Logged event with its identity and emission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: Uuid,
    pub emitted_at: i64,
    pub event: BankEvent,
}

impl EventRecord {
    pub fn new(event: BankEvent, emitted_at: i64) -> Self {
        Self {
            id: Uuid::now_v7(),
            emitted_at,
            event,
        }
    }
}
