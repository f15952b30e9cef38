use async_trait::async_trait;

use crate::errors::CacheError;
use crate::models::cache_entry::CacheEntry;
use crate::models::holding::HoldingSnapshot;

/// Keyed, time-stamped storage for one holdings snapshot per key.
///
/// Implementations must make `write` atomic for concurrent readers: a reader
/// sees either the previous entry or the complete new one, never a mix.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Human-readable name of this store (for logs).
    fn name(&self) -> &str;

    /// True iff the current entry for `key` exists, carries the validity
    /// flag, and is younger than its expiry interval. No side effects.
    async fn is_valid(&self, key: &str) -> bool;

    /// Holdings of the current entry while it is valid.
    /// Expired or invalidated entries yield `Ok(None)`.
    async fn try_read(&self, key: &str) -> Result<Option<HoldingSnapshot>, CacheError>;

    /// Like [`try_read`](Self::try_read), but a failing read degrades to a miss.
    async fn read(&self, key: &str) -> Option<HoldingSnapshot> {
        match self.try_read(key).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(store = self.name(), key, error = %e, "cache read failed, treating as miss");
                None
            }
        }
    }

    /// Holdings of the most recent entry for `key`, ignoring expiry and the
    /// validity flag. Used for fallback after a network failure.
    async fn read_latest(&self, key: &str) -> Result<Option<HoldingSnapshot>, CacheError>;

    /// Replace (or create) the entry for `key`, resetting its creation time
    /// and validity. On error nothing is changed.
    async fn write(
        &self,
        key: &str,
        snapshot: &HoldingSnapshot,
        expiry_interval_secs: f64,
    ) -> Result<(), CacheError>;

    /// Clear the validity flag without deleting data.
    async fn invalidate(&self, key: &str) -> Result<(), CacheError>;

    /// Delete every entry for `key`.
    async fn clear(&self, key: &str) -> Result<(), CacheError>;

    /// Delete entries that are invalid or past the retention ceiling, across
    /// all keys. Returns how many were removed.
    async fn cleanup(&self) -> Result<usize, CacheError>;

    /// Diagnostic view of the current entry for `key`, valid or not.
    async fn entry(&self, key: &str) -> Option<CacheEntry>;
}
