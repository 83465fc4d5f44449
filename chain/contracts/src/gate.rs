//! Access/pause gate evaluated before any accounting logic runs.

use bank_types::ids::AccountId;
use std::sync::Arc;

use crate::errors::BankError;
use crate::interfaces::{Authority, PauseSwitch};
use crate::security::Role;

/// Entry conditions shared by every mutating operation.
///
/// Balance operations need the live (unpaused) state; configuration and
/// recovery need the paused state plus a role.
#[derive(Clone)]
pub struct AccessGate {
    authority: Arc<dyn Authority>,
    pause: Arc<dyn PauseSwitch>,
}

impl AccessGate {
    pub fn new(authority: Arc<dyn Authority>, pause: Arc<dyn PauseSwitch>) -> Self {
        Self { authority, pause }
    }

    pub fn is_paused(&self) -> bool {
        self.pause.is_paused()
    }

    pub fn require_not_paused(&self) -> Result<(), BankError> {
        if self.pause.is_paused() {
            return Err(BankError::EnforcedPause);
        }
        Ok(())
    }

    pub fn require_paused(&self) -> Result<(), BankError> {
        if !self.pause.is_paused() {
            return Err(BankError::ExpectedPause);
        }
        Ok(())
    }

    pub fn require_role(&self, role: Role, caller: AccountId) -> Result<(), BankError> {
        if !self.authority.has_role(role, caller) {
            return Err(BankError::Unauthorized { caller, role });
        }
        Ok(())
    }

    /// Paused state plus `role`.
    pub fn require_paused_with(&self, role: Role, caller: AccountId) -> Result<(), BankError> {
        self.require_paused()?;
        self.require_role(role, caller)
    }

    /// Flip the pause flag. Pauser only; the flag must change.
    pub fn set_paused(&self, caller: AccountId, paused: bool) -> Result<(), BankError> {
        self.require_role(Role::Pauser, caller)?;
        if paused {
            self.require_not_paused()?;
        } else {
            self.require_paused()?;
        }
        self.pause.set_paused(paused);
        Ok(())
    }
}
