//! Custodial Recovery
//!
//! Treasurer-only extraction of assets the ledger does not track: tokens sent
//! to the bank without a deposit, stray unique or semi-fungible items, and
//! native coin forced into custody. Only allowed while paused. Tracked
//! reserves are never reachable from here: fungible and native recovery are
//! bounded by `custody balance - reserves`.

use bank_types::ids::{AccountId, AssetId, TokenId};
use bank_types::numeric::Amount;
use tracing::{debug, info, warn};

use crate::bank::KipuBank;
use crate::errors::BankError;
use crate::events::{
    BankEvent, BatchRecovered, NativeSurplusRecovered, TokensRecovered, UniqueRecovered,
};
use crate::security::Role;

impl KipuBank {
    /// Untracked balance of `token` held by the bank.
    pub fn token_surplus(&self, token: TokenId) -> Amount {
        let custody = self.tokens.balance_of(token, self.address());
        custody.saturating_sub(self.total_reserves(AssetId::Token(token)))
    }

    /// Native coin held beyond tracked reserves (zero when custody is short).
    pub fn native_surplus(&self) -> Amount {
        let custody = self.native.balance_of(self.address());
        custody.saturating_sub(self.total_reserves(AssetId::Native))
    }

    /// Send `amount` of untracked `token` to `to`.
    pub fn recover_token(
        &self,
        caller: AccountId,
        token: TokenId,
        to: AccountId,
        amount: Amount,
    ) -> Result<BankEvent, BankError> {
        if amount == 0 {
            return Err(BankError::InvalidAmount);
        }
        validate_targets(token, to)?;
        self.gate.require_paused_with(Role::Treasurer, caller)?;
        let _lock = self.enter()?;

        let asset = AssetId::Token(token);
        let surplus = self.token_surplus(token);
        if amount > surplus {
            warn!(%token, amount, surplus, "Token recovery would touch reserves");
            return Err(BankError::ExceedsSurplus {
                asset,
                requested: amount,
                surplus,
            });
        }
        self.tokens
            .transfer(token, self.address(), to, amount)
            .map_err(|e| BankError::TransferFailed {
                asset,
                reason: e.reason,
            })?;

        info!(%caller, %token, %to, amount, "Recovered tokens");
        Ok(self.emit(BankEvent::TokensRecovered(TokensRecovered {
            token,
            to,
            amount,
            by: caller,
        })))
    }

    /// Send a non-fungible `item` of `collection` held by the bank to `to`.
    pub fn recover_unique(
        &self,
        caller: AccountId,
        collection: TokenId,
        to: AccountId,
        item: u128,
    ) -> Result<BankEvent, BankError> {
        validate_targets(collection, to)?;
        self.gate.require_paused_with(Role::Treasurer, caller)?;
        let _lock = self.enter()?;

        self.unique
            .transfer_from(collection, self.address(), to, item)
            .map_err(|e| BankError::TransferFailed {
                asset: AssetId::Token(collection),
                reason: e.reason,
            })?;

        info!(%caller, %collection, %to, item, "Recovered unique item");
        Ok(self.emit(BankEvent::UniqueRecovered(UniqueRecovered {
            collection,
            to,
            item,
            by: caller,
        })))
    }

    /// Send a batch of semi-fungible items of `collection` to `to`.
    pub fn recover_batch(
        &self,
        caller: AccountId,
        collection: TokenId,
        to: AccountId,
        ids: Vec<u128>,
        amounts: Vec<Amount>,
    ) -> Result<BankEvent, BankError> {
        validate_targets(collection, to)?;
        if ids.is_empty() || ids.len() != amounts.len() {
            return Err(BankError::InvalidBatch {
                ids: ids.len(),
                amounts: amounts.len(),
            });
        }
        self.gate.require_paused_with(Role::Treasurer, caller)?;
        let _lock = self.enter()?;

        self.multi
            .batch_transfer_from(collection, self.address(), to, &ids, &amounts)
            .map_err(|e| BankError::TransferFailed {
                asset: AssetId::Token(collection),
                reason: e.reason,
            })?;

        info!(%caller, %collection, %to, items = ids.len(), "Recovered item batch");
        Ok(self.emit(BankEvent::BatchRecovered(BatchRecovered {
            collection,
            to,
            ids,
            amounts,
            by: caller,
        })))
    }

    /// Send native coin held beyond reserves to `to`. Returns the amount sent;
    /// zero (and no transfer, no event) when there is no surplus.
    pub fn recover_native_surplus(&self, caller: AccountId, to: AccountId) -> Result<Amount, BankError> {
        if to.is_null() {
            return Err(BankError::NullAddress { what: "recipient" });
        }
        self.gate.require_paused_with(Role::Treasurer, caller)?;
        let _lock = self.enter()?;

        let surplus = self.native_surplus();
        if surplus == 0 {
            debug!(%caller, "No native surplus to recover");
            return Ok(0);
        }
        self.native
            .send(self.address(), to, surplus)
            .map_err(|e| BankError::TransferFailed {
                asset: AssetId::Native,
                reason: e.reason,
            })?;

        info!(%caller, %to, surplus, "Recovered native surplus");
        self.emit(BankEvent::NativeSurplusRecovered(NativeSurplusRecovered {
            to,
            amount: surplus,
            by: caller,
        }));
        Ok(surplus)
    }
}

fn validate_targets(token: TokenId, to: AccountId) -> Result<(), BankError> {
    if token.is_null() {
        return Err(BankError::NullAddress { what: "token" });
    }
    if to.is_null() {
        return Err(BankError::NullAddress { what: "recipient" });
    }
    Ok(())
}
