use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use crate::models::cache_entry::{self, CacheEntry};
use crate::models::holding::{HoldingRecord, HoldingSnapshot};

/// One cached snapshot's metadata. Its holdings live in
/// [`CachedHoldingRow`]s pointing back at `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSession {
    pub id: Uuid,
    pub key: String,
    pub created_at: DateTime<Utc>,
    pub expiry_interval_secs: f64,
    pub is_valid: bool,
}

impl CacheSession {
    pub fn is_cache_valid(&self, now: DateTime<Utc>) -> bool {
        cache_entry::is_cache_valid(self.is_valid, self.created_at, self.expiry_interval_secs, now)
    }

    pub fn age_secs(&self, now: DateTime<Utc>) -> f64 {
        cache_entry::seconds_between(self.created_at, now)
    }
}

/// A single holding belonging to a session. `position` preserves display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedHoldingRow {
    pub session_id: Uuid,
    pub position: u32,
    pub symbol: String,
    pub quantity: i64,
    pub last_traded_price: f64,
    pub average_price: f64,
    pub previous_close: f64,
}

impl CachedHoldingRow {
    fn from_record(session_id: Uuid, position: u32, record: &HoldingRecord) -> Self {
        Self {
            session_id,
            position,
            symbol: record.symbol.clone(),
            quantity: record.quantity,
            last_traded_price: record.last_traded_price,
            average_price: record.average_price,
            previous_close: record.previous_close,
        }
    }

    fn to_record(&self) -> HoldingRecord {
        HoldingRecord {
            symbol: self.symbol.clone(),
            quantity: self.quantity,
            last_traded_price: self.last_traded_price,
            average_price: self.average_price,
            previous_close: self.previous_close,
        }
    }
}

/// The whole persisted cache: a sessions table and a holding-rows table.
///
/// All methods are pure in-memory transformations; durability and locking
/// are the store's job. Every delete of a session removes its rows in the
/// same call, so the two tables never disagree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheTable {
    pub sessions: Vec<CacheSession>,
    pub rows: Vec<CachedHoldingRow>,
}

impl CacheTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current session for `key`: the most recently created one.
    pub fn current(&self, key: &str) -> Option<&CacheSession> {
        self.current_index(key).map(|idx| &self.sessions[idx])
    }

    fn current_index(&self, key: &str) -> Option<usize> {
        self.sessions
            .iter()
            .enumerate()
            .filter(|(_, s)| s.key == key)
            .max_by_key(|(_, s)| s.created_at)
            .map(|(idx, _)| idx)
    }

    /// Rebuild a session's snapshot in position order.
    /// Rows without a symbol are skipped.
    pub fn holdings_for(&self, session_id: Uuid) -> HoldingSnapshot {
        let mut rows: Vec<&CachedHoldingRow> = self
            .rows
            .iter()
            .filter(|r| r.session_id == session_id)
            .collect();
        rows.sort_by_key(|r| r.position);

        let holdings = rows
            .into_iter()
            .filter_map(|row| {
                if row.symbol.trim().is_empty() {
                    tracing::warn!(session = %session_id, "skipping cached holding with empty symbol");
                    None
                } else {
                    Some(row.to_record())
                }
            })
            .collect();
        HoldingSnapshot::new(holdings)
    }

    pub fn is_valid(&self, key: &str, now: DateTime<Utc>) -> bool {
        self.current(key).is_some_and(|s| s.is_cache_valid(now))
    }

    /// Holdings of the current session, only while it is valid.
    pub fn read(&self, key: &str, now: DateTime<Utc>) -> Option<HoldingSnapshot> {
        let session = self.current(key)?;
        if !session.is_cache_valid(now) {
            return None;
        }
        Some(self.holdings_for(session.id))
    }

    /// Holdings of the current session whether or not it is still valid.
    pub fn read_latest(&self, key: &str) -> Option<HoldingSnapshot> {
        let session = self.current(key)?;
        Some(self.holdings_for(session.id))
    }

    pub fn entry(&self, key: &str) -> Option<CacheEntry> {
        let session = self.current(key)?;
        Some(CacheEntry {
            key: session.key.clone(),
            created_at: session.created_at,
            expiry_interval_secs: session.expiry_interval_secs,
            is_valid: session.is_valid,
            holdings: self.holdings_for(session.id),
        })
    }

    /// Replace the current session's holdings, or create a session if the key
    /// has none. Either way the session ends up with `created_at = now`,
    /// `is_valid = true` and the given expiry. Returns the session id.
    pub fn upsert(
        &mut self,
        key: &str,
        snapshot: &HoldingSnapshot,
        expiry_interval_secs: f64,
        now: DateTime<Utc>,
    ) -> Uuid {
        let session_id = match self.current_index(key) {
            Some(idx) => {
                let session = &mut self.sessions[idx];
                session.created_at = now;
                session.is_valid = true;
                session.expiry_interval_secs = expiry_interval_secs;
                let id = session.id;
                self.rows.retain(|r| r.session_id != id);
                id
            }
            None => {
                let id = Uuid::new_v4();
                self.sessions.push(CacheSession {
                    id,
                    key: key.to_string(),
                    created_at: now,
                    expiry_interval_secs,
                    is_valid: true,
                });
                id
            }
        };

        self.rows.extend(
            snapshot
                .iter()
                .enumerate()
                .map(|(pos, record)| CachedHoldingRow::from_record(session_id, pos as u32, record)),
        );
        session_id
    }

    /// Clear the validity flag on the current session. Data is kept.
    /// Returns `false` if the key has no session.
    pub fn invalidate(&mut self, key: &str) -> bool {
        match self.current_index(key) {
            Some(idx) => {
                self.sessions[idx].is_valid = false;
                true
            }
            None => false,
        }
    }

    /// Delete every session stored under `key`, with its rows.
    pub fn remove_key(&mut self, key: &str) -> usize {
        self.delete_sessions(|s| s.key == key)
    }

    /// Delete sessions that are flagged invalid or older than `retention`,
    /// across all keys. Returns the number of sessions removed.
    pub fn cleanup(&mut self, now: DateTime<Utc>, retention: Duration) -> usize {
        self.delete_sessions(|s| !s.is_valid || now - s.created_at > retention)
    }

    fn delete_sessions(&mut self, doomed: impl Fn(&CacheSession) -> bool) -> usize {
        let ids: HashSet<Uuid> = self
            .sessions
            .iter()
            .filter(|s| doomed(s))
            .map(|s| s.id)
            .collect();
        if ids.is_empty() {
            return 0;
        }
        self.sessions.retain(|s| !ids.contains(&s.id));
        self.rows.retain(|r| !ids.contains(&r.session_id));
        ids.len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Distinct keys with at least one session, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.sessions.iter().map(|s| s.key.as_str()).collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }
}
