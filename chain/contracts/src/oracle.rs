//! Price Oracle Adapter
//!
//! Wraps the external native/USD feed. Every call reads the feed afresh, so a
//! stale or broken price blocks the operation that needed it instead of
//! falling back to an older value.

use bank_types::ids::AccountId;
use bank_types::numeric::{pow10, Amount, UsdAmount};
use std::fmt;
use std::sync::Arc;

use crate::errors::OracleError;
use crate::interfaces::PriceFeed;

/// Validated feed answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuote {
    /// USD per whole native coin, at `decimals` precision.
    pub price: u128,
    pub decimals: u8,
    pub updated_at: i64,
}

#[derive(Clone)]
pub struct OracleAdapter {
    feed: Arc<dyn PriceFeed>,
    /// Maximum accepted age of a feed answer, in seconds.
    stale_threshold: i64,
    native_decimals: u8,
}

impl OracleAdapter {
    pub fn new(feed: Arc<dyn PriceFeed>, stale_threshold: i64, native_decimals: u8) -> Self {
        Self {
            feed,
            stale_threshold,
            native_decimals,
        }
    }

    /// Same limits, different feed.
    pub fn with_feed(&self, feed: Arc<dyn PriceFeed>) -> Self {
        Self {
            feed,
            ..self.clone()
        }
    }

    pub fn feed_address(&self) -> AccountId {
        self.feed.address()
    }

    pub fn usd_decimals(&self) -> u8 {
        self.feed.decimals()
    }

    pub fn stale_threshold(&self) -> i64 {
        self.stale_threshold
    }

    /// Read and validate the current feed answer.
    ///
    /// An answer exactly `stale_threshold` seconds old is still fresh.
    pub fn latest_price(&self, now: i64) -> Result<PriceQuote, OracleError> {
        let round = self
            .feed
            .latest_round_data()
            .map_err(|e| OracleError::FeedUnavailable { reason: e.reason })?;

        if round.answer <= 0 {
            return Err(OracleError::InvalidPrice {
                price: round.answer,
            });
        }

        if now.saturating_sub(round.updated_at) > self.stale_threshold {
            return Err(OracleError::StalePrice {
                updated_at: round.updated_at,
                now,
                max_age: self.stale_threshold,
            });
        }

        Ok(PriceQuote {
            price: round.answer.unsigned_abs(),
            decimals: self.feed.decimals(),
            updated_at: round.updated_at,
        })
    }

    /// USD value of `native_qty` at the feed's precision, truncated.
    pub fn price_to_usd(&self, native_qty: Amount, now: i64) -> Result<u128, OracleError> {
        let quote = self.latest_price(now)?;
        let scale = pow10(self.native_decimals).ok_or(OracleError::Overflow)?;
        native_qty
            .checked_mul(quote.price)
            .map(|v| v / scale)
            .ok_or(OracleError::Overflow)
    }

    /// Same as [`price_to_usd`](Self::price_to_usd), tagged with its precision.
    pub fn value_of(&self, native_qty: Amount, now: i64) -> Result<UsdAmount, OracleError> {
        let value = self.price_to_usd(native_qty, now)?;
        Ok(UsdAmount::new(value, self.usd_decimals()))
    }
}

impl fmt::Debug for OracleAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OracleAdapter")
            .field("feed", &self.feed.address())
            .field("stale_threshold", &self.stale_threshold)
            .field("native_decimals", &self.native_decimals)
            .finish()
    }
}
