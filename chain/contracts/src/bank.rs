//! KipuBank: multi-asset custodial ledger service
//!
//! Every user holds an isolated vault balance per asset. Deposits are bounded
//! by per-asset caps (the native cap is priced in USD through the oracle),
//! withdrawals by per-call thresholds.
//!
//! All mutating entry points follow the same order:
//! 1. Input validation
//! 2. Pause state and role (via [`AccessGate`])
//! 3. Reentrancy guard
//! 4. Capacity checks
//! 5. Ledger effects inside a [`UnitOfWork`]
//! 6. External interaction (transfer), then commit and event
//!
//! A failure in step 6 drops the unit of work and restores the ledger.

use bank_types::ids::{AccountId, AssetId, TokenId};
use bank_types::numeric::{Amount, CanonicalAmount, UsdAmount, DEFAULT_DECIMALS};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::canonical::asset_to_canonical;
use crate::config::BankConfig;
use crate::errors::BankError;
use crate::events::{
    AssetEnabled, AssetParamsUpdated, BankCapUpdated, BankEvent, EventRecord, NativeDeposited,
    NativeWithdrawn, OracleUpdated, PauseChanged, TokenDeposited, TokenWithdrawn,
};
use crate::gate::AccessGate;
use crate::interfaces::{
    Authority, Clock, FungibleTokens, MultiTokens, NativeCustody, PauseSwitch, PriceFeed,
    UniqueTokens,
};
use crate::ledger::{Ledger, ReserveMismatch, UnitOfWork};
use crate::oracle::OracleAdapter;
use crate::registry::{AssetConfig, AssetParams, AssetRegistry, NativeParams};
use crate::security::{ReentrancyGuard, ReentrancyLock, Role};

/// Collaborators the bank is deployed against.
#[derive(Clone)]
pub struct Host {
    pub authority: Arc<dyn Authority>,
    pub pause: Arc<dyn PauseSwitch>,
    pub feed: Arc<dyn PriceFeed>,
    pub native: Arc<dyn NativeCustody>,
    pub tokens: Arc<dyn FungibleTokens>,
    pub unique: Arc<dyn UniqueTokens>,
    pub multi: Arc<dyn MultiTokens>,
    pub clock: Arc<dyn Clock>,
}

/// How an asset's deposit cap is denominated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepositCap {
    /// Native units of the asset.
    Units(Amount),
    /// USD value, at the price feed's precision.
    Usd(UsdAmount),
}

/// Aggregate view of one asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetStats {
    pub asset: AssetId,
    pub total_reserves: Amount,
    pub withdraw_threshold: Amount,
    pub deposit_cap: DepositCap,
    pub enabled: bool,
    pub decimals: u8,
}

/// [`AssetStats`] in canonical units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalStats {
    pub asset: AssetId,
    pub total_reserves: CanonicalAmount,
    pub withdraw_threshold: CanonicalAmount,
    /// `None` for the native coin, whose cap is in USD.
    pub deposit_cap: Option<CanonicalAmount>,
    pub enabled: bool,
}

/// Mutable configuration, swapped only while paused.
struct Settings {
    registry: AssetRegistry,
    oracle: OracleAdapter,
}

pub struct KipuBank {
    address: AccountId,
    pub(crate) gate: AccessGate,
    guard: ReentrancyGuard,
    pub(crate) ledger: RwLock<Ledger>,
    settings: RwLock<Settings>,
    events: Mutex<Vec<EventRecord>>,
    pub(crate) native: Arc<dyn NativeCustody>,
    pub(crate) tokens: Arc<dyn FungibleTokens>,
    pub(crate) unique: Arc<dyn UniqueTokens>,
    pub(crate) multi: Arc<dyn MultiTokens>,
    clock: Arc<dyn Clock>,
}

impl KipuBank {
    /// Deploy a bank at `address`.
    pub fn new(address: AccountId, config: BankConfig, host: Host) -> Result<Self, BankError> {
        config.validate()?;
        if address.is_null() {
            return Err(BankError::NullAddress { what: "bank" });
        }
        if host.feed.address().is_null() {
            return Err(BankError::NullAddress { what: "price feed" });
        }

        let registry = AssetRegistry::new(NativeParams {
            withdraw_threshold: config.withdraw_threshold_native,
            bank_cap_usd: config.bank_cap_usd_native,
            decimals: config.native_decimals,
        });
        let oracle = OracleAdapter::new(
            host.feed,
            config.stale_threshold_secs,
            config.native_decimals,
        );

        info!(
            %address,
            feed = %oracle.feed_address(),
            withdraw_threshold_native = config.withdraw_threshold_native,
            bank_cap_usd = config.bank_cap_usd_native,
            "KipuBank deployed"
        );

        Ok(Self {
            address,
            gate: AccessGate::new(host.authority, host.pause),
            guard: ReentrancyGuard::new(),
            ledger: RwLock::new(Ledger::new()),
            settings: RwLock::new(Settings { registry, oracle }),
            events: Mutex::new(Vec::new()),
            native: host.native,
            tokens: host.tokens,
            unique: host.unique,
            multi: host.multi,
            clock: host.clock,
        })
    }

    /// Address the bank holds custody under.
    pub fn address(&self) -> AccountId {
        self.address
    }

    // ───────────────────────── Native Asset ─────────────────────────

    /// Credit `amount` of native coin that arrived with the call.
    ///
    /// The post-deposit USD value of all native reserves must stay within
    /// the bank cap; the price is read from the feed on every call.
    pub fn deposit_native(&self, caller: AccountId, amount: Amount) -> Result<BankEvent, BankError> {
        if amount == 0 {
            return Err(BankError::InvalidAmount);
        }
        self.gate.require_not_paused()?;
        let _lock = self.enter()?;

        let new_total = self
            .ledger
            .read()
            .reserves(AssetId::Native)
            .checked_add(amount)
            .ok_or(BankError::Overflow)?;
        let (oracle, cap) = {
            let settings = self.settings.read();
            (settings.oracle.clone(), settings.registry.native().bank_cap_usd)
        };
        let usd = oracle
            .price_to_usd(new_total, self.clock.now())
            .inspect_err(|e| warn!(%caller, amount, error = %e, "Native deposit blocked by oracle"))?;
        if usd > cap {
            warn!(%caller, amount, usd, cap, "Native deposit exceeds bank cap");
            return Err(BankError::CapExceeded {
                asset: AssetId::Native,
                attempted: usd,
                cap,
            });
        }

        let mut uow = UnitOfWork::begin(&self.ledger);
        uow.apply(|ledger, journal| {
            ledger.credit(journal, AssetId::Native, caller, amount)?;
            ledger.record_deposit(journal);
            Ok(())
        })?;
        uow.commit();

        info!(%caller, amount, usd_after = usd, "Native deposit");
        Ok(self.emit(BankEvent::NativeDeposited(NativeDeposited {
            user: caller,
            amount,
        })))
    }

    /// Send `amount` of the caller's native balance to `to`.
    pub fn withdraw_native(
        &self,
        caller: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<BankEvent, BankError> {
        if amount == 0 {
            return Err(BankError::InvalidAmount);
        }
        if to.is_null() {
            return Err(BankError::NullAddress { what: "recipient" });
        }
        self.gate.require_not_paused()?;
        let _lock = self.enter()?;

        let threshold = self.settings.read().registry.native().withdraw_threshold;
        if amount > threshold {
            return Err(BankError::ThresholdExceeded {
                asset: AssetId::Native,
                requested: amount,
                threshold,
            });
        }

        let mut uow = UnitOfWork::begin(&self.ledger);
        uow.apply(|ledger, journal| {
            ledger.debit(journal, AssetId::Native, caller, amount)?;
            ledger.record_withdrawal(journal);
            Ok(())
        })?;
        self.native
            .send(self.address, to, amount)
            .map_err(|e| BankError::TransferFailed {
                asset: AssetId::Native,
                reason: e.reason,
            })?;
        uow.commit();

        info!(%caller, %to, amount, "Native withdrawal");
        Ok(self.emit(BankEvent::NativeWithdrawn(NativeWithdrawn {
            user: caller,
            to,
            amount,
        })))
    }

    /// Unsolicited native transfers are refused; value only enters through
    /// [`deposit_native`](Self::deposit_native).
    pub fn receive_native(&self, from: AccountId, amount: Amount) -> Result<(), BankError> {
        warn!(%from, amount, "Rejected direct native transfer");
        Err(BankError::DirectTransferRejected { from })
    }

    // ───────────────────────── Tokens ─────────────────────────

    /// Pull up to `amount` of `token` from the caller and credit what arrived.
    ///
    /// The credited amount is the custody balance delta, so fee-on-transfer
    /// tokens credit less than requested. The cap is checked against that
    /// delta; on rejection the received tokens are returned.
    pub fn deposit_token(
        &self,
        caller: AccountId,
        token: TokenId,
        amount: Amount,
    ) -> Result<BankEvent, BankError> {
        if amount == 0 {
            return Err(BankError::InvalidAmount);
        }
        if token.is_null() {
            return Err(BankError::NullAddress { what: "token" });
        }
        self.gate.require_not_paused()?;
        let _lock = self.enter()?;

        let cfg = self.settings.read().registry.enabled_config(token)?;
        let asset = AssetId::Token(token);

        let before = self.tokens.balance_of(token, self.address);
        self.tokens
            .transfer_from(token, caller, self.address, amount)
            .map_err(|e| BankError::TransferFailed {
                asset,
                reason: e.reason,
            })?;
        let after = self.tokens.balance_of(token, self.address);
        let received = after.saturating_sub(before);
        if received == 0 {
            return Err(BankError::NoFundsReceived { token });
        }

        let reserves = self.ledger.read().reserves(asset);
        let within_cap = reserves
            .checked_add(received)
            .is_some_and(|total| total <= cfg.deposit_cap);
        if !within_cap {
            warn!(%caller, %token, received, reserves, cap = cfg.deposit_cap, "Token deposit exceeds cap, refunding");
            self.tokens
                .transfer(token, self.address, caller, received)
                .map_err(|e| {
                    // Left in custody as untracked surplus, recoverable by the treasurer.
                    warn!(%caller, %token, stranded = received, reason = %e.reason, "Refund of rejected token deposit failed");
                    BankError::TransferFailed {
                        asset,
                        reason: e.reason,
                    }
                })?;
            return Err(BankError::CapExceeded {
                asset,
                attempted: reserves.saturating_add(received),
                cap: cfg.deposit_cap,
            });
        }

        let mut uow = UnitOfWork::begin(&self.ledger);
        uow.apply(|ledger, journal| {
            ledger.credit(journal, asset, caller, received)?;
            ledger.record_deposit(journal);
            Ok(())
        })?;
        uow.commit();

        if received < amount {
            warn!(%caller, %token, requested = amount, received, "Token delivered less than requested");
        }
        info!(%caller, %token, requested = amount, received, "Token deposit");
        Ok(self.emit(BankEvent::TokenDeposited(TokenDeposited {
            user: caller,
            token,
            requested: amount,
            received,
        })))
    }

    /// Send `amount` of the caller's `token` balance to `to`.
    pub fn withdraw_token(
        &self,
        caller: AccountId,
        token: TokenId,
        to: AccountId,
        amount: Amount,
    ) -> Result<BankEvent, BankError> {
        if amount == 0 {
            return Err(BankError::InvalidAmount);
        }
        if to.is_null() {
            return Err(BankError::NullAddress { what: "recipient" });
        }
        self.gate.require_not_paused()?;
        let _lock = self.enter()?;

        let cfg = self.settings.read().registry.enabled_config(token)?;
        let asset = AssetId::Token(token);
        if amount > cfg.withdraw_threshold {
            return Err(BankError::ThresholdExceeded {
                asset,
                requested: amount,
                threshold: cfg.withdraw_threshold,
            });
        }

        let mut uow = UnitOfWork::begin(&self.ledger);
        uow.apply(|ledger, journal| {
            ledger.debit(journal, asset, caller, amount)?;
            ledger.record_withdrawal(journal);
            Ok(())
        })?;
        self.tokens
            .transfer(token, self.address, to, amount)
            .map_err(|e| BankError::TransferFailed {
                asset,
                reason: e.reason,
            })?;
        uow.commit();

        info!(%caller, %token, %to, amount, "Token withdrawal");
        Ok(self.emit(BankEvent::TokenWithdrawn(TokenWithdrawn {
            user: caller,
            to,
            token,
            amount,
        })))
    }

    // ───────────────────────── Administration ─────────────────────────

    /// Create or overwrite a token's limits. Admin only, while paused.
    ///
    /// Refreshes the cached decimals from token metadata, falling back to 18
    /// when the token does not report any.
    pub fn configure_token(
        &self,
        caller: AccountId,
        token: TokenId,
        params: AssetParams,
    ) -> Result<AssetConfig, BankError> {
        if token.is_null() {
            return Err(BankError::NullAddress { what: "token" });
        }
        params.validate()?;
        self.gate.require_paused_with(Role::DefaultAdmin, caller)?;
        let _lock = self.enter()?;

        let decimals = self.tokens.decimals(token).unwrap_or(DEFAULT_DECIMALS);
        let (old, new) = self
            .settings
            .write()
            .registry
            .upsert(token, params, decimals)?;

        info!(
            %token,
            withdraw_threshold = new.withdraw_threshold,
            deposit_cap = new.deposit_cap,
            enabled = new.enabled,
            decimals,
            "Token parameters updated"
        );
        let was_enabled = old.is_some_and(|cfg| cfg.enabled);
        self.emit(BankEvent::AssetParamsUpdated(AssetParamsUpdated {
            token,
            old,
            new,
        }));
        if was_enabled != new.enabled {
            self.emit(BankEvent::AssetEnabled(AssetEnabled {
                token,
                enabled: new.enabled,
            }));
        }
        Ok(new)
    }

    /// Stop accepting deposits and withdrawals of a configured token.
    pub fn disable_token(&self, caller: AccountId, token: TokenId) -> Result<AssetConfig, BankError> {
        self.gate.require_paused_with(Role::DefaultAdmin, caller)?;
        let current = self
            .asset_config(token)
            .ok_or(BankError::TokenDisabled { token })?;
        let params = AssetParams {
            enabled: false,
            ..current.params()
        };
        self.configure_token(caller, token, params)
    }

    /// Point the oracle adapter at another feed. Admin only, while paused.
    pub fn set_price_feed(&self, caller: AccountId, feed: Arc<dyn PriceFeed>) -> Result<(), BankError> {
        let new = feed.address();
        if new.is_null() {
            return Err(BankError::NullAddress { what: "price feed" });
        }
        self.gate.require_paused_with(Role::DefaultAdmin, caller)?;
        let _lock = self.enter()?;

        let old = {
            let mut settings = self.settings.write();
            let old = settings.oracle.feed_address();
            settings.oracle = settings.oracle.with_feed(feed);
            old
        };

        info!(%old, %new, "Price feed updated");
        self.emit(BankEvent::OracleUpdated(OracleUpdated { old, new }));
        Ok(())
    }

    /// Replace the USD cap on native reserves. Admin only, while paused.
    pub fn set_bank_cap_usd(&self, caller: AccountId, cap: u128) -> Result<(), BankError> {
        if cap == 0 {
            return Err(BankError::InvalidParams {
                reason: "bank cap must be positive".to_string(),
            });
        }
        self.gate.require_paused_with(Role::DefaultAdmin, caller)?;
        let _lock = self.enter()?;

        let old = self.settings.write().registry.set_bank_cap_usd(cap);

        info!(old, new = cap, "Bank cap updated");
        self.emit(BankEvent::BankCapUpdated(BankCapUpdated { old, new: cap }));
        Ok(())
    }

    /// Enter the paused state. Pauser only.
    pub fn pause(&self, caller: AccountId) -> Result<(), BankError> {
        self.gate.set_paused(caller, true)?;
        info!(%caller, "Bank paused");
        self.emit(BankEvent::Paused(PauseChanged { by: caller }));
        Ok(())
    }

    /// Leave the paused state. Pauser only.
    pub fn unpause(&self, caller: AccountId) -> Result<(), BankError> {
        self.gate.set_paused(caller, false)?;
        info!(%caller, "Bank unpaused");
        self.emit(BankEvent::Unpaused(PauseChanged { by: caller }));
        Ok(())
    }

    // ───────────────────────── Views ─────────────────────────

    pub fn is_paused(&self) -> bool {
        self.gate.is_paused()
    }

    pub fn balance_of(&self, asset: AssetId, user: AccountId) -> Amount {
        self.ledger.read().balance(asset, user)
    }

    /// Non-zero balances held by `user`, ordered by asset.
    pub fn vault_of(&self, user: AccountId) -> Vec<(AssetId, Amount)> {
        self.ledger.read().holdings(user)
    }

    pub fn total_reserves(&self, asset: AssetId) -> Amount {
        self.ledger.read().reserves(asset)
    }

    pub fn deposit_count(&self) -> u64 {
        self.ledger.read().deposit_count()
    }

    pub fn withdrawal_count(&self) -> u64 {
        self.ledger.read().withdrawal_count()
    }

    pub fn withdraw_threshold_native(&self) -> Amount {
        self.settings.read().registry.native().withdraw_threshold
    }

    pub fn bank_cap_usd(&self) -> u128 {
        self.settings.read().registry.native().bank_cap_usd
    }

    pub fn price_feed_address(&self) -> AccountId {
        self.settings.read().oracle.feed_address()
    }

    pub fn asset_config(&self, token: TokenId) -> Option<AssetConfig> {
        self.settings.read().registry.get(token).copied()
    }

    /// Tokens that have ever been configured.
    pub fn registered_tokens(&self) -> Vec<TokenId> {
        let mut tokens: Vec<_> = self
            .settings
            .read()
            .registry
            .tokens()
            .map(|(token, _)| *token)
            .collect();
        tokens.sort();
        tokens
    }

    /// Live USD valuation of all native reserves.
    pub fn native_reserves_usd(&self) -> Result<UsdAmount, BankError> {
        let reserves = self.total_reserves(AssetId::Native);
        let oracle = self.settings.read().oracle.clone();
        Ok(oracle.value_of(reserves, self.clock.now())?)
    }

    pub fn asset_stats(&self, asset: AssetId) -> AssetStats {
        let total_reserves = self.total_reserves(asset);
        let (native, oracle, token_cfg, decimals) = {
            let settings = self.settings.read();
            (
                *settings.registry.native(),
                settings.oracle.clone(),
                asset.token().and_then(|t| settings.registry.get(t).copied()),
                settings.registry.decimals_of(asset),
            )
        };
        match asset {
            AssetId::Native => AssetStats {
                asset,
                total_reserves,
                withdraw_threshold: native.withdraw_threshold,
                deposit_cap: DepositCap::Usd(UsdAmount::new(
                    native.bank_cap_usd,
                    oracle.usd_decimals(),
                )),
                enabled: true,
                decimals,
            },
            AssetId::Token(_) => {
                let cfg = token_cfg.unwrap_or(AssetConfig {
                    withdraw_threshold: 0,
                    deposit_cap: 0,
                    enabled: false,
                    decimals,
                });
                AssetStats {
                    asset,
                    total_reserves,
                    withdraw_threshold: cfg.withdraw_threshold,
                    deposit_cap: DepositCap::Units(cfg.deposit_cap),
                    enabled: cfg.enabled,
                    decimals,
                }
            }
        }
    }

    pub fn balance_of_canonical(
        &self,
        asset: AssetId,
        user: AccountId,
    ) -> Result<CanonicalAmount, BankError> {
        let balance = self.balance_of(asset, user);
        asset_to_canonical(&self.settings.read().registry, asset, balance)
    }

    pub fn asset_stats_canonical(&self, asset: AssetId) -> Result<CanonicalStats, BankError> {
        let stats = self.asset_stats(asset);
        let settings = self.settings.read();
        let registry = &settings.registry;
        let deposit_cap = match stats.deposit_cap {
            DepositCap::Units(cap) => Some(asset_to_canonical(registry, asset, cap)?),
            DepositCap::Usd(_) => None,
        };
        Ok(CanonicalStats {
            asset,
            total_reserves: asset_to_canonical(registry, asset, stats.total_reserves)?,
            withdraw_threshold: asset_to_canonical(registry, asset, stats.withdraw_threshold)?,
            deposit_cap,
            enabled: stats.enabled,
        })
    }

    /// Verify that every reserve counter equals the sum of its balances.
    pub fn audit(&self) -> Result<(), ReserveMismatch> {
        self.ledger.read().verify_reserves()
    }

    // ───────────────────────── Events ─────────────────────────

    pub fn events(&self) -> Vec<EventRecord> {
        self.events.lock().clone()
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&self) -> Vec<EventRecord> {
        std::mem::take(&mut *self.events.lock())
    }

    // ───────────────────────── Internal ─────────────────────────

    pub(crate) fn enter(&self) -> Result<ReentrancyLock<'_>, BankError> {
        self.guard.lock().ok_or_else(|| {
            warn!("Rejected re-entrant call");
            BankError::Reentrancy
        })
    }

    pub(crate) fn emit(&self, event: BankEvent) -> BankEvent {
        let record = EventRecord::new(event.clone(), self.clock.now());
        self.events.lock().push(record);
        event
    }
}
