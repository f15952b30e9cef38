use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::path::PathBuf;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::errors::CacheError;
use crate::models::cache_entry::{CacheEntry, DEFAULT_RETENTION_HOURS};
use crate::models::holding::HoldingSnapshot;
use super::backend::{FileBackend, MemoryBackend, TableBackend};
use super::table::CacheTable;
use super::traits::CacheStore;

/// The production [`CacheStore`]: a [`CacheTable`] behind a lock, mirrored to a
/// [`TableBackend`].
///
/// Every mutation is staged on a copy of the table, persisted, and only then
/// swapped in under the write lock. A failed persist drops the copy, which is
/// the rollback: readers keep seeing the previous table.
pub struct SessionCacheStore {
    table: RwLock<CacheTable>,
    backend: Box<dyn TableBackend>,
    clock: Arc<dyn Clock>,
    retention: Duration,
}

impl std::fmt::Debug for SessionCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (sessions, rows) = self
            .read_table()
            .map(|t| (t.session_count(), t.row_count()))
            .unwrap_or_default();
        f.debug_struct("SessionCacheStore")
            .field("backend", &self.backend.name())
            .field("sessions", &sessions)
            .field("rows", &rows)
            .field("retention", &self.retention)
            .finish()
    }
}

impl SessionCacheStore {
    /// A store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            table: RwLock::new(CacheTable::new()),
            backend: Box::new(MemoryBackend),
            clock: Arc::new(SystemClock),
            retention: Duration::hours(DEFAULT_RETENTION_HOURS),
        }
    }

    /// Open (or start) a file-backed store.
    ///
    /// A missing file is an empty cache. A corrupt or unreadable file is
    /// logged and treated as empty; the next write either replaces it or
    /// reports its own [`CacheError::Write`].
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        Self::with_backend(Box::new(FileBackend::new(path)))
    }

    /// Build a store over any backend, loading whatever it already holds.
    /// A failed load starts the store empty.
    pub fn with_backend(backend: Box<dyn TableBackend>) -> Result<Self, CacheError> {
        let table = backend.load().unwrap_or_else(|e| {
            warn!(backend = backend.name(), error = %e, "discarding unreadable cache");
            CacheTable::new()
        });
        debug!(
            backend = backend.name(),
            sessions = table.session_count(),
            "cache store opened"
        );
        Ok(Self {
            table: RwLock::new(table),
            backend,
            clock: Arc::new(SystemClock),
            retention: Duration::hours(DEFAULT_RETENTION_HOURS),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Override the cleanup retention ceiling (default 24 hours).
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    /// Copy of the whole table, for diagnostics and tests.
    pub fn snapshot_table(&self) -> Result<CacheTable, CacheError> {
        Ok(self.read_table()?.clone())
    }

    fn read_table(&self) -> Result<RwLockReadGuard<'_, CacheTable>, CacheError> {
        self.table
            .read()
            .map_err(|_| CacheError::Read("cache table lock poisoned".into()))
    }

    fn write_table(&self) -> Result<RwLockWriteGuard<'_, CacheTable>, CacheError> {
        self.table
            .write()
            .map_err(|_| CacheError::Write("cache table lock poisoned".into()))
    }

    /// Stage `change` on a copy, persist it, then publish it.
    /// Returns whatever `change` returned.
    fn commit<T>(&self, change: impl FnOnce(&mut CacheTable) -> T) -> Result<T, CacheError> {
        let mut table = self.write_table()?;
        let mut staged = table.clone();
        let out = change(&mut staged);
        if staged != *table {
            self.persist(&staged)?;
            *table = staged;
        }
        Ok(out)
    }

    /// Backend persists are synchronous file I/O. On a multi-threaded runtime
    /// the worker thread is handed off while it runs; a current-thread
    /// runtime (or no runtime) calls it inline.
    fn persist(&self, staged: &CacheTable) -> Result<(), CacheError> {
        let on_multi_thread = Handle::try_current()
            .is_ok_and(|h| h.runtime_flavor() == RuntimeFlavor::MultiThread);
        if on_multi_thread {
            tokio::task::block_in_place(|| self.backend.persist(staged))
        } else {
            self.backend.persist(staged)
        }
    }

    fn cleanup_at(&self, now: DateTime<Utc>) -> Result<usize, CacheError> {
        let retention = self.retention;
        let removed = self.commit(|table| table.cleanup(now, retention))?;
        if removed > 0 {
            info!(removed, "cleaned up stale cache sessions");
        }
        Ok(removed)
    }
}

impl Default for SessionCacheStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[async_trait]
impl CacheStore for SessionCacheStore {
    fn name(&self) -> &str {
        self.backend.name()
    }

    async fn is_valid(&self, key: &str) -> bool {
        let now = self.clock.now();
        let valid = match self.read_table() {
            Ok(table) => table.is_valid(key, now),
            Err(e) => {
                warn!(key, error = %e, "cache validity check failed");
                false
            }
        };
        debug!(key, valid, "cache validity check");
        valid
    }

    async fn try_read(&self, key: &str) -> Result<Option<HoldingSnapshot>, CacheError> {
        let now = self.clock.now();
        let snapshot = self.read_table()?.read(key, now);
        match &snapshot {
            Some(s) => debug!(key, holdings = s.len(), "read valid cache entry"),
            None => debug!(key, "no valid cache entry"),
        }
        Ok(snapshot)
    }

    async fn read_latest(&self, key: &str) -> Result<Option<HoldingSnapshot>, CacheError> {
        Ok(self.read_table()?.read_latest(key))
    }

    async fn write(
        &self,
        key: &str,
        snapshot: &HoldingSnapshot,
        expiry_interval_secs: f64,
    ) -> Result<(), CacheError> {
        let now = self.clock.now();
        self.commit(|table| table.upsert(key, snapshot, expiry_interval_secs, now))
            .map_err(|e| match e {
                CacheError::Write(_) => e,
                other => CacheError::Write(other.to_string()),
            })?;
        info!(key, holdings = snapshot.len(), "cached holdings snapshot");

        if let Err(e) = self.cleanup_at(now) {
            warn!(error = %e, "cache cleanup after write failed");
        }
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        if self.commit(|table| table.invalidate(key))? {
            info!(key, "cache entry invalidated");
        }
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<(), CacheError> {
        let removed = self.commit(|table| table.remove_key(key))?;
        info!(key, removed, "cache cleared");
        Ok(())
    }

    async fn cleanup(&self) -> Result<usize, CacheError> {
        self.cleanup_at(self.clock.now())
    }

    async fn entry(&self, key: &str) -> Option<CacheEntry> {
        self.read_table().ok()?.entry(key)
    }
}
