//! Integer amounts and fixed-point scaling
//!
//! Every quantity on the ledger is a `u128` in the asset's smallest unit.
//! Scaling between precisions always truncates. `rust_decimal` is only used
//! to render amounts for humans; no accounting decision goes through it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Quantity in an asset's smallest unit.
pub type Amount = u128;

/// Precision of the native coin.
pub const NATIVE_DECIMALS: u8 = 18;

/// Precision substituted when a token reports none (or zero).
pub const DEFAULT_DECIMALS: u8 = 18;

/// Precision of the cross-asset accounting unit.
pub const CANONICAL_DECIMALS: u8 = 6;

/// `10^exp`, or `None` when it does not fit in a `u128`.
pub fn pow10(exp: u8) -> Option<u128> {
    10u128.checked_pow(u32::from(exp))
}

/// Rescale `amount` from `from` fractional digits to `to` fractional digits.
///
/// Narrowing divides and drops the remainder. Widening multiplies and
/// returns `None` on overflow.
pub fn rescale(amount: Amount, from: u8, to: u8) -> Option<Amount> {
    if amount == 0 {
        return Some(0);
    }
    match from.cmp(&to) {
        Ordering::Equal => Some(amount),
        // A divisor wider than u128 leaves nothing behind.
        Ordering::Greater => Some(pow10(from - to).map_or(0, |factor| amount / factor)),
        Ordering::Less => pow10(to - from).and_then(|factor| amount.checked_mul(factor)),
    }
}

/// Render `value` with `decimals` fractional digits, when it fits a Decimal.
pub fn to_decimal(value: u128, decimals: u8) -> Option<Decimal> {
    let mantissa = i128::try_from(value).ok()?;
    Decimal::try_from_i128_with_scale(mantissa, u32::from(decimals)).ok()
}

fn write_fixed(f: &mut fmt::Formatter<'_>, value: u128, decimals: u8) -> fmt::Result {
    match to_decimal(value, decimals) {
        Some(d) => write!(f, "{}", d),
        None => write!(f, "{}e-{}", value, decimals),
    }
}

/// Amount expressed in the canonical accounting unit (6 fractional digits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalAmount(pub Amount);

impl CanonicalAmount {
    pub const ZERO: CanonicalAmount = CanonicalAmount(0);

    pub fn units(&self) -> Amount {
        self.0
    }

    pub fn to_decimal(&self) -> Option<Decimal> {
        to_decimal(self.0, CANONICAL_DECIMALS)
    }
}

impl fmt::Display for CanonicalAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_fixed(f, self.0, CANONICAL_DECIMALS)
    }
}

/// USD value at the price feed's precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UsdAmount {
    pub value: u128,
    pub decimals: u8,
}

impl UsdAmount {
    pub fn new(value: u128, decimals: u8) -> Self {
        Self { value, decimals }
    }

    pub fn to_decimal(&self) -> Option<Decimal> {
        to_decimal(self.value, self.decimals)
    }
}

impl fmt::Display for UsdAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_fixed(f, self.value, self.decimals)?;
        write!(f, " USD")
    }
}
