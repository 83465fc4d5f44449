//! KipuBank: multi-asset custodial ledger
//!
//! Users hold isolated vault balances per asset (native coin or fungible
//! token). Withdrawals are bounded per call, deposits by per-asset caps, and
//! native deposits by a USD cap priced through an external oracle.
//!
//! # Modules
//! - `config`: Deployment configuration
//! - `errors`: Error taxonomy
//! - `events`: Bank events
//! - `interfaces`: Collaborator traits (tokens, native custody, feed, roles, pause, clock)
//! - `security`: Reentrancy guard, roles, in-process role store and pause flag
//! - `gate`: Pause/role entry conditions
//! - `oracle`: Price feed adapter with staleness checks
//! - `registry`: Per-asset limits and metadata
//! - `ledger`: Balances, reserves, counters and the unit-of-work
//! - `canonical`: Conversion to the 6-digit reporting unit
//! - `bank`: Deposits, withdrawals, administration and views
//! - `recovery`: Treasurer extraction of untracked assets

pub mod bank;
pub mod canonical;
pub mod config;
pub mod errors;
pub mod events;
pub mod gate;
pub mod interfaces;
pub mod ledger;
pub mod oracle;
pub mod recovery;
pub mod registry;
pub mod security;

pub use bank::{AssetStats, CanonicalStats, DepositCap, Host, KipuBank};
pub use config::BankConfig;
pub use errors::{BankError, ErrorKind, OracleError};

/// Bank ABI version, frozen after release
pub const BANK_ABI_VERSION: &str = "2.0.0";
