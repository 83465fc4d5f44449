//! Mock host for integration tests
//!
//! `MockChain` plays every asset collaborator at once: native custody,
//! fungible tokens (optionally fee-on-transfer), unique and semi-fungible
//! collections. Receive hooks let a test run code when an address is paid,
//! which is how re-entrant calls are simulated.

#![allow(dead_code)]

use bank_types::ids::{AccountId, TokenId};
use bank_types::numeric::Amount;
use kipu_bank::bank::{Host, KipuBank};
use kipu_bank::config::BankConfig;
use kipu_bank::errors::BankError;
use kipu_bank::events::BankEvent;
use kipu_bank::interfaces::{
    CallError, Clock, FungibleTokens, MultiTokens, NativeCustody, PriceFeed, RoundData,
    UniqueTokens,
};
use kipu_bank::registry::AssetParams;
use kipu_bank::security::{PauseFlag, RoleRegistry};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

pub const ETH: Amount = 1_000_000_000_000_000_000;
pub const USD: u128 = 100_000_000;
pub const START: i64 = 1_700_000_000;

pub type Hook = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
pub struct MockChain {
    native: Mutex<HashMap<AccountId, Amount>>,
    balances: Mutex<HashMap<(TokenId, AccountId), Amount>>,
    fee_bps: Mutex<HashMap<TokenId, u128>>,
    decimals: Mutex<HashMap<TokenId, u8>>,
    failing_tokens: Mutex<HashSet<TokenId>>,
    rejecting: Mutex<HashSet<AccountId>>,
    hooks: Mutex<HashMap<AccountId, Hook>>,
    uniques: Mutex<HashMap<(TokenId, u128), AccountId>>,
    multi: Mutex<HashMap<(TokenId, u128, AccountId), Amount>>,
}

impl MockChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    // ─── setup ───

    pub fn create_token(&self, decimals: Option<u8>, fee_bps: u128) -> TokenId {
        let token = TokenId::new();
        if let Some(d) = decimals {
            self.decimals.lock().insert(token, d);
        }
        if fee_bps > 0 {
            self.fee_bps.lock().insert(token, fee_bps);
        }
        token
    }

    pub fn mint(&self, token: TokenId, to: AccountId, amount: Amount) {
        *self.balances.lock().entry((token, to)).or_insert(0) += amount;
    }

    pub fn mint_native(&self, to: AccountId, amount: Amount) {
        *self.native.lock().entry(to).or_insert(0) += amount;
    }

    pub fn burn_native(&self, from: AccountId, amount: Amount) {
        let mut native = self.native.lock();
        let bal = native.entry(from).or_insert(0);
        *bal = bal.saturating_sub(amount);
    }

    pub fn mint_unique(&self, collection: TokenId, item: u128, to: AccountId) {
        self.uniques.lock().insert((collection, item), to);
    }

    pub fn mint_multi(&self, collection: TokenId, id: u128, to: AccountId, amount: Amount) {
        *self.multi.lock().entry((collection, id, to)).or_insert(0) += amount;
    }

    pub fn set_token_failing(&self, token: TokenId, failing: bool) {
        let mut set = self.failing_tokens.lock();
        if failing {
            set.insert(token);
        } else {
            set.remove(&token);
        }
    }

    /// Native and token transfers to `account` fail.
    pub fn reject_payments_to(&self, account: AccountId) {
        self.rejecting.lock().insert(account);
    }

    pub fn on_receive(&self, account: AccountId, hook: Hook) {
        self.hooks.lock().insert(account, hook);
    }

    // ─── queries ───

    pub fn native_balance(&self, holder: AccountId) -> Amount {
        self.native.lock().get(&holder).copied().unwrap_or(0)
    }

    pub fn token_balance(&self, token: TokenId, holder: AccountId) -> Amount {
        self.balances.lock().get(&(token, holder)).copied().unwrap_or(0)
    }

    pub fn owner_of(&self, collection: TokenId, item: u128) -> Option<AccountId> {
        self.uniques.lock().get(&(collection, item)).copied()
    }

    pub fn multi_balance(&self, collection: TokenId, id: u128, holder: AccountId) -> Amount {
        self.multi.lock().get(&(collection, id, holder)).copied().unwrap_or(0)
    }

    // ─── internals ───

    fn check_recipient(&self, to: AccountId) -> Result<(), CallError> {
        if self.rejecting.lock().contains(&to) {
            return Err(CallError::new("recipient rejected payment"));
        }
        Ok(())
    }

    /// Run the receive hook of `to`, with no chain lock held.
    fn notify(&self, to: AccountId) {
        let hook = self.hooks.lock().get(&to).cloned();
        if let Some(hook) = hook {
            hook();
        }
    }

    fn move_tokens(
        &self,
        token: TokenId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), CallError> {
        if self.failing_tokens.lock().contains(&token) {
            return Err(CallError::new("token paused"));
        }
        self.check_recipient(to)?;
        let fee = amount * self.fee_bps.lock().get(&token).copied().unwrap_or(0) / 10_000;
        {
            let mut balances = self.balances.lock();
            let from_bal = balances.entry((token, from)).or_insert(0);
            if *from_bal < amount {
                return Err(CallError::new("insufficient token balance"));
            }
            *from_bal -= amount;
            *balances.entry((token, to)).or_insert(0) += amount - fee;
        }
        self.notify(to);
        Ok(())
    }
}

impl FungibleTokens for MockChain {
    fn transfer_from(
        &self,
        token: TokenId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), CallError> {
        self.move_tokens(token, from, to, amount)
    }

    fn transfer(
        &self,
        token: TokenId,
        holder: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), CallError> {
        self.move_tokens(token, holder, to, amount)
    }

    fn balance_of(&self, token: TokenId, holder: AccountId) -> Amount {
        self.token_balance(token, holder)
    }

    fn decimals(&self, token: TokenId) -> Option<u8> {
        self.decimals.lock().get(&token).copied()
    }
}

impl NativeCustody for MockChain {
    fn balance_of(&self, holder: AccountId) -> Amount {
        self.native_balance(holder)
    }

    fn send(&self, from: AccountId, to: AccountId, amount: Amount) -> Result<(), CallError> {
        self.check_recipient(to)?;
        {
            let mut native = self.native.lock();
            let from_bal = native.entry(from).or_insert(0);
            if *from_bal < amount {
                return Err(CallError::new("insufficient native balance"));
            }
            *from_bal -= amount;
            *native.entry(to).or_insert(0) += amount;
        }
        self.notify(to);
        Ok(())
    }
}

impl UniqueTokens for MockChain {
    fn transfer_from(
        &self,
        collection: TokenId,
        from: AccountId,
        to: AccountId,
        item: u128,
    ) -> Result<(), CallError> {
        self.check_recipient(to)?;
        let mut uniques = self.uniques.lock();
        match uniques.get(&(collection, item)) {
            Some(owner) if *owner == from => {
                uniques.insert((collection, item), to);
                Ok(())
            }
            _ => Err(CallError::new("not the owner of item")),
        }
    }
}

impl MultiTokens for MockChain {
    fn batch_transfer_from(
        &self,
        collection: TokenId,
        from: AccountId,
        to: AccountId,
        ids: &[u128],
        amounts: &[Amount],
    ) -> Result<(), CallError> {
        self.check_recipient(to)?;
        let mut multi = self.multi.lock();
        for (id, amount) in ids.iter().zip(amounts) {
            if multi.get(&(collection, *id, from)).copied().unwrap_or(0) < *amount {
                return Err(CallError::new("insufficient batch balance"));
            }
        }
        for (id, amount) in ids.iter().zip(amounts) {
            *multi.entry((collection, *id, from)).or_insert(0) -= *amount;
            *multi.entry((collection, *id, to)).or_insert(0) += *amount;
        }
        Ok(())
    }
}

/// Price feed with a settable answer, 8 decimals.
pub struct MockFeed {
    address: AccountId,
    round: Mutex<RoundData>,
    broken: Mutex<bool>,
}

impl MockFeed {
    pub fn new(price: i128, updated_at: i64) -> Arc<Self> {
        Arc::new(Self {
            address: AccountId::new(),
            round: Mutex::new(RoundData {
                round_id: 1,
                answer: price,
                started_at: updated_at,
                updated_at,
                answered_in_round: 1,
            }),
            broken: Mutex::new(false),
        })
    }

    pub fn set_price(&self, price: i128, updated_at: i64) {
        let mut round = self.round.lock();
        round.round_id += 1;
        round.answered_in_round = round.round_id;
        round.answer = price;
        round.started_at = updated_at;
        round.updated_at = updated_at;
    }

    pub fn set_broken(&self, broken: bool) {
        *self.broken.lock() = broken;
    }

    pub fn addr(&self) -> AccountId {
        self.address
    }
}

impl PriceFeed for MockFeed {
    fn address(&self) -> AccountId {
        self.address
    }

    fn decimals(&self) -> u8 {
        8
    }

    fn latest_round_data(&self) -> Result<RoundData, CallError> {
        if *self.broken.lock() {
            return Err(CallError::new("feed reverted"));
        }
        Ok(*self.round.lock())
    }
}

pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(now: i64) -> Arc<Self> {
        Arc::new(Self {
            now: AtomicI64::new(now),
        })
    }

    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// A deployed bank with its whole mock environment.
pub struct Harness {
    pub bank: Arc<KipuBank>,
    pub chain: Arc<MockChain>,
    pub feed: Arc<MockFeed>,
    pub clock: Arc<ManualClock>,
    pub roles: Arc<RoleRegistry>,
    pub pause: Arc<PauseFlag>,
    pub admin: AccountId,
}

/// 0.1 ETH threshold, 100,000 USD cap, ETH at 3,000 USD.
pub fn scenario_config() -> BankConfig {
    BankConfig {
        withdraw_threshold_native: ETH / 10,
        bank_cap_usd_native: 100_000 * USD,
        stale_threshold_secs: 3600,
        native_decimals: 18,
    }
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(scenario_config(), 3_000 * USD as i128)
    }

    pub fn with_config(config: BankConfig, price: i128) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let admin = AccountId::new();
        let chain = MockChain::new();
        let feed = MockFeed::new(price, START);
        let clock = ManualClock::new(START);
        let roles = Arc::new(RoleRegistry::new(admin));
        let pause = Arc::new(PauseFlag::new());
        let host = Host {
            authority: roles.clone(),
            pause: pause.clone(),
            feed: feed.clone(),
            native: chain.clone(),
            tokens: chain.clone(),
            unique: chain.clone(),
            multi: chain.clone(),
            clock: clock.clone(),
        };
        let bank = Arc::new(KipuBank::new(AccountId::new(), config, host).expect("valid deployment"));
        Self {
            bank,
            chain,
            feed,
            clock,
            roles,
            pause,
            admin,
        }
    }

    /// Deposit with the coin attached to the call; the host takes it back
    /// when the call fails.
    pub fn deposit_native(&self, user: AccountId, amount: Amount) -> Result<BankEvent, BankError> {
        self.chain.mint_native(self.bank.address(), amount);
        let result = self.bank.deposit_native(user, amount);
        if result.is_err() {
            self.chain.burn_native(self.bank.address(), amount);
        }
        result
    }

    /// Run `f` with the bank paused, then unpause.
    pub fn while_paused<R>(&self, f: impl FnOnce() -> R) -> R {
        self.bank.pause(self.admin).expect("pause");
        let out = f();
        self.bank.unpause(self.admin).expect("unpause");
        out
    }

    /// Create and enable a token.
    pub fn listed_token(&self, decimals: Option<u8>, fee_bps: u128, threshold: Amount, cap: Amount) -> TokenId {
        let token = self.chain.create_token(decimals, fee_bps);
        self.while_paused(|| {
            self.bank
                .configure_token(self.admin, token, AssetParams::enabled(threshold, cap))
                .expect("configure token")
        });
        token
    }

    /// Fresh user holding `amount` of `token`.
    pub fn funded_user(&self, token: TokenId, amount: Amount) -> AccountId {
        let user = AccountId::new();
        self.chain.mint(token, user, amount);
        user
    }
}
