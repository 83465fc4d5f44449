//! Identifier types for ledger principals and assets
//!
//! Principals and token handles use UUID v7 so freshly created ids sort by
//! creation time. The nil UUID plays the role of the null address: it is a
//! valid value to hold, but every entry point that sends funds rejects it.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Address of a principal (user, contract, or the bank itself).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// The null address.
    pub const NULL: AccountId = AccountId(Uuid::nil());

    /// Create a new AccountId with current timestamp
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn is_null(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle of a token contract (fungible, unique or semi-fungible).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(Uuid);

impl TokenId {
    /// The null token handle.
    pub const NULL: TokenId = TokenId(Uuid::nil());

    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn is_null(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for TokenId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key for all per-asset state: either the chain's native coin or a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetId {
    Native,
    Token(TokenId),
}

impl AssetId {
    pub fn is_native(&self) -> bool {
        matches!(self, AssetId::Native)
    }

    /// Token handle, if this is not the native asset.
    pub fn token(&self) -> Option<TokenId> {
        match self {
            AssetId::Native => None,
            AssetId::Token(token) => Some(*token),
        }
    }
}

impl From<TokenId> for AssetId {
    fn from(token: TokenId) -> Self {
        AssetId::Token(token)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetId::Native => write!(f, "native"),
            AssetId::Token(token) => write!(f, "token:{}", token),
        }
    }
}
