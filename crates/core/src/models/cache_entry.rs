use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::holding::HoldingSnapshot;

/// Default key under which the holdings snapshot is cached.
pub const DEFAULT_CACHE_KEY: &str = "stock_holdings_cache";

/// Default lifetime of a cache entry, in seconds (5 minutes).
pub const DEFAULT_EXPIRY_SECS: f64 = 300.0;

/// Entries older than this are purged by cleanup regardless of their own expiry.
pub const DEFAULT_RETENTION_HOURS: i64 = 24;

/// Elapsed wall-clock seconds between two instants (negative if `to` is earlier).
pub fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 1_000.0
}

/// The validity rule shared by every cache representation:
/// `is_valid AND (now − created_at) < expiry`.
///
/// An age exactly equal to the expiry is already invalid, and an expired
/// entry stays invalid no matter what the flag says.
pub fn is_cache_valid(
    is_valid: bool,
    created_at: DateTime<Utc>,
    expiry_interval_secs: f64,
    now: DateTime<Utc>,
) -> bool {
    is_valid && seconds_between(created_at, now) < expiry_interval_secs
}

/// Read-only view of the current cache session for one key, with its holdings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub created_at: DateTime<Utc>,
    pub expiry_interval_secs: f64,
    /// Explicit validity flag; cleared by `invalidate`
    pub is_valid: bool,
    pub holdings: HoldingSnapshot,
}

impl CacheEntry {
    /// Age of the entry in seconds at `now`.
    pub fn age_secs(&self, now: DateTime<Utc>) -> f64 {
        seconds_between(self.created_at, now)
    }

    pub fn is_cache_valid(&self, now: DateTime<Utc>) -> bool {
        is_cache_valid(self.is_valid, self.created_at, self.expiry_interval_secs, now)
    }

    /// Whether the entry actually holds any records.
    pub fn has_data(&self) -> bool {
        !self.holdings.is_empty()
    }
}
