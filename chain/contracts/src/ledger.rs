//! Ledger: balances, reserves and counters, with a unit-of-work
//!
//! The ledger keeps one balance per `(asset, owner)` and one reserve counter
//! per asset. Every mutation goes through [`Ledger::credit`] or
//! [`Ledger::debit`], which move balance and reserve together, so for every
//! asset `Σ balance[asset, *] == reserves[asset]` holds between calls.
//!
//! Mutations record their prior values in a [`Journal`]. A [`UnitOfWork`]
//! owns that journal: committing forgets it, dropping it uncommitted writes
//! the prior values back. Operations apply effects, talk to the outside
//! world, and only then commit, so a failed transfer undoes everything.

use bank_types::ids::{AccountId, AssetId};
use bank_types::numeric::Amount;
use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;

use crate::errors::BankError;

/// Prior value of one piece of ledger state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Undo {
    Balance {
        asset: AssetId,
        owner: AccountId,
        prev: Option<Amount>,
    },
    Reserve {
        asset: AssetId,
        prev: Option<Amount>,
    },
    DepositCount(u64),
    WithdrawalCount(u64),
}

/// Undo log for the mutations of one operation.
#[derive(Debug, Default)]
pub struct Journal {
    entries: Vec<Undo>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Reserve counter that disagrees with the balances it should sum.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Reserve mismatch for {asset}: counter {reserves}, balances sum to {balances}")]
pub struct ReserveMismatch {
    pub asset: AssetId,
    pub reserves: Amount,
    pub balances: Amount,
}

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    balances: HashMap<(AssetId, AccountId), Amount>,
    reserves: HashMap<AssetId, Amount>,
    deposit_count: u64,
    withdrawal_count: u64,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, asset: AssetId, owner: AccountId) -> Amount {
        self.balances.get(&(asset, owner)).copied().unwrap_or(0)
    }

    pub fn reserves(&self, asset: AssetId) -> Amount {
        self.reserves.get(&asset).copied().unwrap_or(0)
    }

    pub fn deposit_count(&self) -> u64 {
        self.deposit_count
    }

    pub fn withdrawal_count(&self) -> u64 {
        self.withdrawal_count
    }

    /// Non-zero balances of `owner`, ordered by asset.
    pub fn holdings(&self, owner: AccountId) -> Vec<(AssetId, Amount)> {
        let mut out: Vec<_> = self
            .balances
            .iter()
            .filter(|((_, who), amount)| *who == owner && **amount > 0)
            .map(|((asset, _), amount)| (*asset, *amount))
            .collect();
        out.sort_by_key(|(asset, _)| *asset);
        out
    }

    /// Add `amount` to a balance and its reserve. Nothing changes on error.
    pub fn credit(
        &mut self,
        journal: &mut Journal,
        asset: AssetId,
        owner: AccountId,
        amount: Amount,
    ) -> Result<(), BankError> {
        let balance = self
            .balance(asset, owner)
            .checked_add(amount)
            .ok_or(BankError::Overflow)?;
        let reserves = self
            .reserves(asset)
            .checked_add(amount)
            .ok_or(BankError::Overflow)?;
        self.write(journal, asset, owner, balance, reserves);
        Ok(())
    }

    /// Remove `amount` from a balance and its reserve. Nothing changes on error.
    pub fn debit(
        &mut self,
        journal: &mut Journal,
        asset: AssetId,
        owner: AccountId,
        amount: Amount,
    ) -> Result<(), BankError> {
        let available = self.balance(asset, owner);
        let balance = available
            .checked_sub(amount)
            .ok_or(BankError::InsufficientBalance {
                asset,
                requested: amount,
                available,
            })?;
        let reserves = self
            .reserves(asset)
            .checked_sub(amount)
            .ok_or(BankError::Overflow)?;
        self.write(journal, asset, owner, balance, reserves);
        Ok(())
    }

    pub fn record_deposit(&mut self, journal: &mut Journal) {
        journal.entries.push(Undo::DepositCount(self.deposit_count));
        self.deposit_count += 1;
    }

    pub fn record_withdrawal(&mut self, journal: &mut Journal) {
        journal
            .entries
            .push(Undo::WithdrawalCount(self.withdrawal_count));
        self.withdrawal_count += 1;
    }

    fn write(
        &mut self,
        journal: &mut Journal,
        asset: AssetId,
        owner: AccountId,
        balance: Amount,
        reserves: Amount,
    ) {
        let prev_balance = self.balances.insert((asset, owner), balance);
        let prev_reserves = self.reserves.insert(asset, reserves);
        journal.entries.push(Undo::Balance {
            asset,
            owner,
            prev: prev_balance,
        });
        journal.entries.push(Undo::Reserve {
            asset,
            prev: prev_reserves,
        });
    }

    /// Restore every value recorded in `journal`, newest first.
    pub fn revert(&mut self, journal: Journal) {
        for undo in journal.entries.into_iter().rev() {
            match undo {
                Undo::Balance { asset, owner, prev } => match prev {
                    Some(v) => {
                        self.balances.insert((asset, owner), v);
                    }
                    None => {
                        self.balances.remove(&(asset, owner));
                    }
                },
                Undo::Reserve { asset, prev } => match prev {
                    Some(v) => {
                        self.reserves.insert(asset, v);
                    }
                    None => {
                        self.reserves.remove(&asset);
                    }
                },
                Undo::DepositCount(v) => self.deposit_count = v,
                Undo::WithdrawalCount(v) => self.withdrawal_count = v,
            }
        }
    }

    /// Check `Σ balance[asset, *] == reserves[asset]` for every asset seen.
    pub fn verify_reserves(&self) -> Result<(), ReserveMismatch> {
        let mut sums: HashMap<AssetId, Amount> = HashMap::new();
        for ((asset, _), amount) in &self.balances {
            let sum = sums.entry(*asset).or_insert(0);
            *sum = sum.saturating_add(*amount);
        }
        for asset in self.reserves.keys().chain(sums.keys()) {
            let reserves = self.reserves(*asset);
            let balances = sums.get(asset).copied().unwrap_or(0);
            if reserves != balances {
                return Err(ReserveMismatch {
                    asset: *asset,
                    reserves,
                    balances,
                });
            }
        }
        Ok(())
    }
}

/// All-or-nothing scope over a shared [`Ledger`].
///
/// The store lock is only held inside [`apply`](Self::apply); callers must
/// keep other writers out (the bank's reentrancy guard) until the unit of
/// work is committed or dropped, since rollback restores prior values.
pub struct UnitOfWork<'a> {
    store: &'a RwLock<Ledger>,
    journal: Journal,
    committed: bool,
}

impl<'a> UnitOfWork<'a> {
    pub fn begin(store: &'a RwLock<Ledger>) -> Self {
        Self {
            store,
            journal: Journal::new(),
            committed: false,
        }
    }

    /// Run `f` against the ledger under the write lock, journalling its effects.
    pub fn apply<R>(
        &mut self,
        f: impl FnOnce(&mut Ledger, &mut Journal) -> Result<R, BankError>,
    ) -> Result<R, BankError> {
        let mut ledger = self.store.write();
        f(&mut ledger, &mut self.journal)
    }

    /// Keep the applied effects.
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for UnitOfWork<'_> {
    fn drop(&mut self) {
        if self.committed || self.journal.is_empty() {
            return;
        }
        let journal = std::mem::take(&mut self.journal);
        tracing::debug!(entries = journal.len(), "Rolling back uncommitted ledger effects");
        self.store.write().revert(journal);
    }
}
