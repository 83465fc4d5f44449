//! Shared security primitives
//!
//! Reentrancy guard, roles, and in-process implementations of the role store
//! and pause flag collaborators.

use bank_types::ids::AccountId;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::interfaces::{Authority, PauseSwitch};

/// Reentrancy guard preventing nested calls into protected functions.
///
/// A mutating entry point takes a [`ReentrancyLock`] before touching state;
/// the lock releases the guard when dropped, on success and failure alike.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    locked: AtomicBool,
}

impl ReentrancyGuard {
    /// Create a new unlocked guard.
    pub fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
        }
    }

    /// Acquire the guard. Returns `false` if already locked (reentrancy attempt).
    pub fn acquire(&self) -> bool {
        self.locked
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn release(&self) {
        self.locked.store(false, Ordering::Release);
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    /// Acquire the guard for the lifetime of the returned lock.
    pub fn lock(&self) -> Option<ReentrancyLock<'_>> {
        // Built lazily: a discarded lock would release the guard on drop.
        self.acquire().then(|| ReentrancyLock { guard: self })
    }
}

/// Held reentrancy guard; releases on drop.
#[derive(Debug)]
pub struct ReentrancyLock<'a> {
    guard: &'a ReentrancyGuard,
}

impl Drop for ReentrancyLock<'_> {
    fn drop(&mut self) {
        self.guard.release();
    }
}

/// Roles consulted by the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Configuration of assets, oracle and caps; manages other roles
    DefaultAdmin,
    /// Toggles the pause flag
    Pauser,
    /// Extracts untracked assets while paused
    Treasurer,
}

/// In-process role store.
///
/// A principal may hold several roles. Only holders of `DefaultAdmin` grant
/// or revoke, and the founding admin cannot lose `DefaultAdmin`.
#[derive(Debug)]
pub struct RoleRegistry {
    roles: RwLock<HashMap<AccountId, HashSet<Role>>>,
    admin: AccountId,
}

impl RoleRegistry {
    /// Create a registry whose `admin` holds every role.
    pub fn new(admin: AccountId) -> Self {
        let all = HashSet::from([Role::DefaultAdmin, Role::Pauser, Role::Treasurer]);
        Self {
            roles: RwLock::new(HashMap::from([(admin, all)])),
            admin,
        }
    }

    pub fn is_admin(&self, caller: AccountId) -> bool {
        self.has_role(Role::DefaultAdmin, caller)
    }

    /// Assign a role. Only admin can assign roles.
    pub fn grant_role(&self, admin_caller: AccountId, target: AccountId, role: Role) -> bool {
        if !self.is_admin(admin_caller) {
            return false;
        }
        self.roles.write().entry(target).or_default().insert(role);
        true
    }

    /// Remove a role. Only admin can revoke.
    pub fn revoke_role(&self, admin_caller: AccountId, target: AccountId, role: Role) -> bool {
        if !self.is_admin(admin_caller) {
            return false;
        }
        if target == self.admin && role == Role::DefaultAdmin {
            return false;
        }
        if let Some(held) = self.roles.write().get_mut(&target) {
            held.remove(&role);
        }
        true
    }

    pub fn admin(&self) -> AccountId {
        self.admin
    }
}

impl Authority for RoleRegistry {
    fn has_role(&self, role: Role, principal: AccountId) -> bool {
        self.roles
            .read()
            .get(&principal)
            .is_some_and(|held| held.contains(&role))
    }
}

/// In-process pause flag. Starts unpaused.
#[derive(Debug, Default)]
pub struct PauseFlag {
    paused: AtomicBool,
}

impl PauseFlag {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PauseSwitch for PauseFlag {
    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Release);
    }
}
