//! Contracts the bank consumes from its host
//!
//! Everything the ledger does not own (token transfers, native custody, the
//! price feed, the role store, the pause flag and the clock) is reached
//! through these traits. Implementations may call back into the bank; the
//! bank never holds a store lock while calling them.

use bank_types::ids::{AccountId, TokenId};
use bank_types::numeric::Amount;
use thiserror::Error;

use crate::security::Role;

/// Failure reported by a collaborator call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct CallError {
    pub reason: String,
}

impl CallError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// One answer from the price feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundData {
    pub round_id: u128,
    /// Price at the feed's own precision; may be zero or negative on a broken feed.
    pub answer: i128,
    pub started_at: i64,
    /// Unix seconds of the last update.
    pub updated_at: i64,
    pub answered_in_round: u128,
}

/// Native-asset / USD price feed.
pub trait PriceFeed: Send + Sync {
    /// Address the feed is deployed at, reported in events.
    fn address(&self) -> AccountId;

    fn decimals(&self) -> u8;

    fn latest_round_data(&self) -> Result<RoundData, CallError>;
}

/// Fungible token contracts, addressed by [`TokenId`].
pub trait FungibleTokens: Send + Sync {
    /// Pull `amount` from `from` to `to`. May deliver less than `amount`.
    fn transfer_from(
        &self,
        token: TokenId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), CallError>;

    /// Send `amount` held by `holder` to `to`.
    fn transfer(
        &self,
        token: TokenId,
        holder: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), CallError>;

    fn balance_of(&self, token: TokenId, holder: AccountId) -> Amount;

    /// Token metadata; `None` when the token does not answer.
    fn decimals(&self, token: TokenId) -> Option<u8>;
}

/// Non-fungible token contracts.
pub trait UniqueTokens: Send + Sync {
    fn transfer_from(
        &self,
        collection: TokenId,
        from: AccountId,
        to: AccountId,
        item: u128,
    ) -> Result<(), CallError>;
}

/// Semi-fungible (multi-token) contracts.
pub trait MultiTokens: Send + Sync {
    fn batch_transfer_from(
        &self,
        collection: TokenId,
        from: AccountId,
        to: AccountId,
        ids: &[u128],
        amounts: &[Amount],
    ) -> Result<(), CallError>;
}

/// Native coin held by the host on behalf of addresses.
pub trait NativeCustody: Send + Sync {
    fn balance_of(&self, holder: AccountId) -> Amount;

    fn send(&self, from: AccountId, to: AccountId, amount: Amount) -> Result<(), CallError>;
}

/// Role store.
pub trait Authority: Send + Sync {
    fn has_role(&self, role: Role, principal: AccountId) -> bool;
}

/// Process-wide pause flag.
pub trait PauseSwitch: Send + Sync {
    fn is_paused(&self) -> bool;

    fn set_paused(&self, paused: bool);
}

/// Source of the current time in unix seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

/// Wall clock backed by `chrono`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}
