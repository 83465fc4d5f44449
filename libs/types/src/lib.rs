//! Types library for the KipuBank custodial ledger
//!
//! Shared identifiers and integer amount helpers used by the bank contract
//! and by anything that reads its reports.
//!
//! # Modules
//! - `ids`: Principal, token and asset identifiers
//! - `numeric`: Integer amounts, precision constants, truncating rescale

pub mod ids;
pub mod numeric;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
}
