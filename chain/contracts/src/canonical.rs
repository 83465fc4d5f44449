//! Canonicalization into the 6-digit accounting unit.
//!
//! Reporting only. Caps and thresholds are always compared in native units.

use bank_types::ids::AssetId;
use bank_types::numeric::{rescale, Amount, CanonicalAmount, CANONICAL_DECIMALS, DEFAULT_DECIMALS};

use crate::errors::BankError;
use crate::registry::AssetRegistry;

/// Scale `amount` from `decimals` to canonical precision, truncating.
///
/// Zero decimals means "unknown" and is read as 18.
pub fn to_canonical(amount: Amount, decimals: u8) -> Result<CanonicalAmount, BankError> {
    let decimals = if decimals == 0 {
        DEFAULT_DECIMALS
    } else {
        decimals
    };
    rescale(amount, decimals, CANONICAL_DECIMALS)
        .map(CanonicalAmount)
        .ok_or(BankError::Overflow)
}

/// Canonical value of `amount` of `asset`, using the registry's cached decimals.
pub fn asset_to_canonical(
    registry: &AssetRegistry,
    asset: AssetId,
    amount: Amount,
) -> Result<CanonicalAmount, BankError> {
    to_canonical(amount, registry.decimals_of(asset))
}
