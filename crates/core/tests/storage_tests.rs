// ═══════════════════════════════════════════════════════════════════
// Storage Tests: CacheTable, file format, backends, SessionCacheStore
// ═══════════════════════════════════════════════════════════════════

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use holdings_core::clock::ManualClock;
use holdings_core::errors::CacheError;
use holdings_core::models::holding::{HoldingRecord, HoldingSnapshot};
use holdings_core::storage::backend::{FileBackend, TableBackend};
use holdings_core::storage::format::{self, CURRENT_VERSION, HEADER_SIZE, MAGIC};
use holdings_core::storage::session_store::SessionCacheStore;
use holdings_core::storage::table::CacheTable;
use holdings_core::storage::traits::CacheStore;

const KEY: &str = "stock_holdings_cache";

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 8, 15, 9, 30, 0).unwrap()
}

fn snapshot_of(symbols: &[&str]) -> HoldingSnapshot {
    HoldingSnapshot::new(
        symbols
            .iter()
            .enumerate()
            .map(|(i, s)| HoldingRecord::new(*s, (i as i64 + 1) * 10, 100.0 + i as f64, 90.0, 95.0))
            .collect(),
    )
}

fn store_at(clock: &Arc<ManualClock>) -> SessionCacheStore {
    SessionCacheStore::in_memory().with_clock(clock.clone())
}

/// Backend that fails every persist while `fail` is set.
struct SwitchableBackend {
    fail: Arc<AtomicBool>,
}

impl TableBackend for SwitchableBackend {
    fn name(&self) -> &str {
        "switchable"
    }

    fn load(&self) -> Result<CacheTable, CacheError> {
        Ok(CacheTable::new())
    }

    fn persist(&self, _table: &CacheTable) -> Result<(), CacheError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(CacheError::Write("disk full".into()))
        } else {
            Ok(())
        }
    }
}

/// Backend that fails exactly the n-th persist (1-based).
struct FailNthBackend {
    calls: AtomicUsize,
    fail_on: usize,
}

impl TableBackend for FailNthBackend {
    fn name(&self) -> &str {
        "fail-nth"
    }

    fn load(&self) -> Result<CacheTable, CacheError> {
        Ok(CacheTable::new())
    }

    fn persist(&self, _table: &CacheTable) -> Result<(), CacheError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on {
            Err(CacheError::Write(format!("persist #{call} failed")))
        } else {
            Ok(())
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// CacheTable
// ═══════════════════════════════════════════════════════════════════

mod table {
    use super::*;

    #[test]
    fn upsert_then_read_preserves_order() {
        let mut table = CacheTable::new();
        let snap = snapshot_of(&["AAPL", "TSLA", "MSFT"]);
        table.upsert(KEY, &snap, 300.0, t0());

        assert_eq!(table.read(KEY, t0()), Some(snap.clone()));
        assert_eq!(table.read_latest(KEY), Some(snap));
        assert_eq!(table.session_count(), 1);
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn upsert_reuses_session_and_replaces_rows() {
        let mut table = CacheTable::new();
        let first = table.upsert(KEY, &snapshot_of(&["A", "B", "C"]), 300.0, t0());
        table.invalidate(KEY);

        let later = t0() + Duration::minutes(10);
        let second = table.upsert(KEY, &snapshot_of(&["Z"]), 60.0, later);

        assert_eq!(first, second);
        assert_eq!(table.session_count(), 1);
        assert_eq!(table.row_count(), 1);

        let session = table.current(KEY).unwrap();
        assert!(session.is_valid);
        assert_eq!(session.created_at, later);
        assert_eq!(session.expiry_interval_secs, 60.0);
    }

    #[test]
    fn current_is_most_recently_created() {
        let mut table = CacheTable::new();
        table.upsert(KEY, &snapshot_of(&["OLD"]), 300.0, t0());

        // A stray older-looking duplicate should never shadow the newest session.
        let mut dup = table.sessions[0].clone();
        dup.id = uuid::Uuid::new_v4();
        dup.created_at = t0() - Duration::hours(1);
        table.sessions.push(dup);

        assert_eq!(table.current(KEY).unwrap().created_at, t0());
        assert_eq!(table.read_latest(KEY), Some(snapshot_of(&["OLD"])));
    }

    #[test]
    fn read_hides_expired_but_read_latest_does_not() {
        let mut table = CacheTable::new();
        table.upsert(KEY, &snapshot_of(&["AAPL"]), 300.0, t0());

        let later = t0() + Duration::seconds(300);
        assert!(!table.is_valid(KEY, later));
        assert_eq!(table.read(KEY, later), None);
        assert_eq!(table.read_latest(KEY), Some(snapshot_of(&["AAPL"])));
    }

    #[test]
    fn rows_without_symbol_are_skipped() {
        let mut table = CacheTable::new();
        let snap = HoldingSnapshot::new(vec![
            HoldingRecord::new("AAPL", 1, 1.0, 1.0, 1.0),
            HoldingRecord::new("", 2, 2.0, 2.0, 2.0),
            HoldingRecord::new("MSFT", 3, 3.0, 3.0, 3.0),
        ]);
        table.upsert(KEY, &snap, 300.0, t0());

        let read = table.read(KEY, t0()).unwrap();
        let symbols: Vec<&str> = read.iter().map(|h| h.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn invalidate_unknown_key_is_noop() {
        let mut table = CacheTable::new();
        assert!(!table.invalidate("nope"));
        assert_eq!(table, CacheTable::new());
    }

    #[test]
    fn remove_key_cascades_to_rows() {
        let mut table = CacheTable::new();
        table.upsert("a", &snapshot_of(&["A1", "A2"]), 300.0, t0());
        table.upsert("b", &snapshot_of(&["B1"]), 300.0, t0());

        assert_eq!(table.remove_key("a"), 1);
        assert_eq!(table.keys(), vec!["b"]);
        assert_eq!(table.row_count(), 1);
        assert!(table.rows.iter().all(|r| table.sessions.iter().any(|s| s.id == r.session_id)));
    }

    #[test]
    fn cleanup_removes_invalid_and_over_retention() {
        let mut table = CacheTable::new();
        table.upsert("K1", &snapshot_of(&["A"]), 86_400.0 * 2.0, t0());
        let later = t0() + Duration::hours(24);
        table.upsert("K2", &snapshot_of(&["B"]), 300.0, later);
        table.upsert("K3", &snapshot_of(&["C"]), 300.0, later);
        table.invalidate("K2");

        let now = t0() + Duration::hours(25);
        assert_eq!(table.cleanup(now, Duration::hours(24)), 2);
        assert_eq!(table.keys(), vec!["K3"]);
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn cleanup_keeps_entry_exactly_at_retention() {
        let mut table = CacheTable::new();
        table.upsert(KEY, &snapshot_of(&["A"]), 300.0, t0());
        assert_eq!(table.cleanup(t0() + Duration::hours(24), Duration::hours(24)), 0);
        assert_eq!(table.cleanup(t0() + Duration::hours(24) + Duration::seconds(1), Duration::hours(24)), 1);
    }
}

// ═══════════════════════════════════════════════════════════════════
// File format
// ═══════════════════════════════════════════════════════════════════

mod file_format {
    use super::*;

    #[test]
    fn header_layout() {
        let bytes = format::write_file(CURRENT_VERSION, b"payload");
        assert_eq!(&bytes[0..4], MAGIC);
        assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), CURRENT_VERSION);
        assert_eq!(u64::from_le_bytes(bytes[6..14].try_into().unwrap()), 7);
        assert_eq!(bytes.len(), HEADER_SIZE + 7);

        let (version, payload) = format::read_file(&bytes).unwrap();
        assert_eq!(version, CURRENT_VERSION);
        assert_eq!(payload, b"payload");
    }

    #[test]
    fn table_survives_encoding() {
        let mut table = CacheTable::new();
        table.upsert(KEY, &snapshot_of(&["AAPL", "TSLA"]), 300.0, t0());
        let decoded = format::decode_table(&format::encode_table(&table).unwrap()).unwrap();
        assert_eq!(decoded, table);
    }

    #[test]
    fn too_small() {
        let err = format::read_file(b"HLDC").unwrap_err();
        assert!(matches!(err, CacheError::InvalidFileFormat(_)));
    }

    #[test]
    fn bad_magic() {
        let mut bytes = format::write_file(CURRENT_VERSION, b"x");
        bytes[0] = b'X';
        let err = format::read_file(&bytes).unwrap_err();
        assert!(matches!(err, CacheError::InvalidFileFormat(_)));
    }

    #[test]
    fn unsupported_versions() {
        let err = format::read_file(&format::write_file(0, b"x")).unwrap_err();
        assert!(matches!(err, CacheError::UnsupportedVersion(0)));
        let err = format::read_file(&format::write_file(CURRENT_VERSION + 1, b"x")).unwrap_err();
        assert!(matches!(err, CacheError::UnsupportedVersion(v) if v == CURRENT_VERSION + 1));
    }

    #[test]
    fn truncated_payload() {
        let mut bytes = format::write_file(CURRENT_VERSION, b"0123456789");
        bytes.truncate(HEADER_SIZE + 4);
        let err = format::read_file(&bytes).unwrap_err();
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn garbage_payload_is_invalid_format() {
        let bytes = format::write_file(CURRENT_VERSION, &[0xFF; 3]);
        assert!(matches!(
            format::decode_table(&bytes),
            Err(CacheError::InvalidFileFormat(_))
        ));
    }
}

// ═══════════════════════════════════════════════════════════════════
// SessionCacheStore: validity and reads
// ═══════════════════════════════════════════════════════════════════

mod store_validity {
    use super::*;

    #[tokio::test]
    async fn empty_store() {
        let store = SessionCacheStore::in_memory();
        assert!(!store.is_valid(KEY).await);
        assert_eq!(store.read(KEY).await, None);
        assert_eq!(store.read_latest(KEY).await.unwrap(), None);
        assert!(store.entry(KEY).await.is_none());
    }

    #[tokio::test]
    async fn write_then_read_round_trip() {
        let clock = Arc::new(ManualClock::new(t0()));
        let store = store_at(&clock);
        let snap = snapshot_of(&["AAPL", "GOOGL", "TSLA"]);

        store.write(KEY, &snap, 300.0).await.unwrap();
        assert!(store.is_valid(KEY).await);
        assert_eq!(store.read(KEY).await, Some(snap));
    }

    #[tokio::test]
    async fn expiry_boundary_is_exclusive() {
        let clock = Arc::new(ManualClock::new(t0()));
        let store = store_at(&clock);
        store.write(KEY, &snapshot_of(&["AAPL"]), 300.0).await.unwrap();

        clock.advance(Duration::milliseconds(299_999));
        assert!(store.is_valid(KEY).await);

        clock.advance(Duration::milliseconds(1));
        assert!(!store.is_valid(KEY).await);
        assert_eq!(store.read(KEY).await, None);
        assert_eq!(store.read_latest(KEY).await.unwrap(), Some(snapshot_of(&["AAPL"])));
    }

    #[tokio::test]
    async fn second_write_replaces_first() {
        let clock = Arc::new(ManualClock::new(t0()));
        let store = store_at(&clock);
        store.write(KEY, &snapshot_of(&["A", "B", "C"]), 300.0).await.unwrap();
        clock.advance(Duration::seconds(30));
        store.write(KEY, &snapshot_of(&["D"]), 300.0).await.unwrap();

        assert_eq!(store.read(KEY).await, Some(snapshot_of(&["D"])));
        let table = store.snapshot_table().unwrap();
        assert_eq!(table.session_count(), 1);
        assert_eq!(table.row_count(), 1);
        assert_eq!(store.entry(KEY).await.unwrap().created_at, t0() + Duration::seconds(30));
    }

    #[tokio::test]
    async fn rewrite_after_expiry_restores_validity() {
        let clock = Arc::new(ManualClock::new(t0()));
        let store = store_at(&clock);
        store.write(KEY, &snapshot_of(&["A"]), 300.0).await.unwrap();
        clock.advance(Duration::minutes(10));
        assert!(!store.is_valid(KEY).await);

        store.write(KEY, &snapshot_of(&["B"]), 300.0).await.unwrap();
        assert!(store.is_valid(KEY).await);
    }

    #[tokio::test]
    async fn invalidate_keeps_data_for_fallback() {
        let clock = Arc::new(ManualClock::new(t0()));
        let store = store_at(&clock);
        store.write(KEY, &snapshot_of(&["AAPL"]), 300.0).await.unwrap();

        store.invalidate(KEY).await.unwrap();
        assert!(!store.is_valid(KEY).await);
        assert_eq!(store.read(KEY).await, None);
        assert_eq!(store.read_latest(KEY).await.unwrap(), Some(snapshot_of(&["AAPL"])));

        let entry = store.entry(KEY).await.unwrap();
        assert!(!entry.is_valid);
        assert!(entry.has_data());
    }

    #[tokio::test]
    async fn clear_removes_everything_for_key() {
        let clock = Arc::new(ManualClock::new(t0()));
        let store = store_at(&clock);
        store.write(KEY, &snapshot_of(&["A", "B"]), 300.0).await.unwrap();
        store.write("other", &snapshot_of(&["X"]), 300.0).await.unwrap();

        store.clear(KEY).await.unwrap();
        assert_eq!(store.read_latest(KEY).await.unwrap(), None);
        assert_eq!(store.read("other").await, Some(snapshot_of(&["X"])));
        assert_eq!(store.snapshot_table().unwrap().row_count(), 1);

        // Clearing an absent key is fine.
        store.clear(KEY).await.unwrap();
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let clock = Arc::new(ManualClock::new(t0()));
        let store = store_at(&clock);
        store.write("short", &snapshot_of(&["A"]), 10.0).await.unwrap();
        store.write("long", &snapshot_of(&["B"]), 3600.0).await.unwrap();

        clock.advance(Duration::seconds(60));
        assert!(!store.is_valid("short").await);
        assert!(store.is_valid("long").await);
    }
}

// ═══════════════════════════════════════════════════════════════════
// SessionCacheStore: cleanup
// ═══════════════════════════════════════════════════════════════════

mod store_cleanup {
    use super::*;

    #[tokio::test]
    async fn removes_old_and_invalid_keeps_recent() {
        let clock = Arc::new(ManualClock::new(t0()));
        let store = store_at(&clock);

        store.write("K1", &snapshot_of(&["A"]), 300.0).await.unwrap();
        clock.advance(Duration::hours(24));
        // K1 is exactly 24h old here, so the cleanup run by these writes keeps it.
        store.write("K2", &snapshot_of(&["B"]), 300.0).await.unwrap();
        store.write("K3", &snapshot_of(&["C"]), 300.0).await.unwrap();
        store.invalidate("K2").await.unwrap();
        assert_eq!(store.snapshot_table().unwrap().session_count(), 3);

        clock.advance(Duration::hours(1));
        assert_eq!(store.cleanup().await.unwrap(), 2);

        let table = store.snapshot_table().unwrap();
        assert_eq!(table.keys(), vec!["K3"]);
        assert_eq!(table.row_count(), 1);
    }

    #[tokio::test]
    async fn write_triggers_cleanup() {
        let clock = Arc::new(ManualClock::new(t0()));
        let store = store_at(&clock);
        store.write("stale", &snapshot_of(&["A"]), 300.0).await.unwrap();
        store.invalidate("stale").await.unwrap();

        store.write(KEY, &snapshot_of(&["B"]), 300.0).await.unwrap();
        assert_eq!(store.snapshot_table().unwrap().keys(), vec![KEY]);
    }

    #[tokio::test]
    async fn custom_retention() {
        let clock = Arc::new(ManualClock::new(t0()));
        let store = store_at(&clock).with_retention(Duration::hours(1));
        store.write(KEY, &snapshot_of(&["A"]), 300.0).await.unwrap();

        clock.advance(Duration::minutes(61));
        assert_eq!(store.cleanup().await.unwrap(), 1);
        assert_eq!(store.read_latest(KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn nothing_to_clean() {
        let store = SessionCacheStore::in_memory();
        assert_eq!(store.cleanup().await.unwrap(), 0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// SessionCacheStore: failure atomicity
// ═══════════════════════════════════════════════════════════════════

mod store_atomicity {
    use super::*;

    #[tokio::test]
    async fn failed_persist_leaves_previous_entry() {
        let fail = Arc::new(AtomicBool::new(false));
        let store = SessionCacheStore::with_backend(Box::new(SwitchableBackend { fail: fail.clone() }))
            .unwrap()
            .with_clock(Arc::new(ManualClock::new(t0())));

        store.write(KEY, &snapshot_of(&["A", "B"]), 300.0).await.unwrap();
        fail.store(true, Ordering::SeqCst);

        let err = store.write(KEY, &snapshot_of(&["C"]), 300.0).await.unwrap_err();
        assert!(matches!(err, CacheError::Write(_)));
        assert_eq!(store.read(KEY).await, Some(snapshot_of(&["A", "B"])));
        assert_eq!(store.snapshot_table().unwrap().row_count(), 2);

        assert!(store.invalidate(KEY).await.is_err());
        assert!(store.is_valid(KEY).await);
        assert!(store.clear(KEY).await.is_err());
        assert!(store.read_latest(KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn failed_cleanup_does_not_fail_write() {
        let store = SessionCacheStore::with_backend(Box::new(FailNthBackend {
            calls: AtomicUsize::new(0),
            fail_on: 4,
        }))
        .unwrap()
        .with_clock(Arc::new(ManualClock::new(t0())));

        store.write("K2", &snapshot_of(&["B"]), 300.0).await.unwrap(); // persist 1
        store.invalidate("K2").await.unwrap(); // persist 2
        store.write(KEY, &snapshot_of(&["A"]), 300.0).await.unwrap(); // persist 3, cleanup is 4

        assert_eq!(store.read(KEY).await, Some(snapshot_of(&["A"])));
        assert_eq!(store.snapshot_table().unwrap().keys(), vec!["K2", KEY]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn readers_never_see_partial_writes() {
        let store = Arc::new(SessionCacheStore::in_memory());
        let a = snapshot_of(&["A", "A", "A"]);
        let b = snapshot_of(&["B", "B", "B", "B", "B"]);
        store.write(KEY, &a, 3600.0).await.unwrap();

        let writer = {
            let store = store.clone();
            let (a, b) = (a.clone(), b.clone());
            tokio::spawn(async move {
                for i in 0..200 {
                    let next = if i % 2 == 0 { &b } else { &a };
                    store.write(KEY, next, 3600.0).await.unwrap();
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                let (a, b) = (a.clone(), b.clone());
                tokio::spawn(async move {
                    for _ in 0..200 {
                        let seen = store.read_latest(KEY).await.unwrap().unwrap();
                        assert!(seen == a || seen == b, "torn read: {seen:?}");
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        writer.await.unwrap();
        for r in readers {
            r.await.unwrap();
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// File-backed store
// ═══════════════════════════════════════════════════════════════════

mod file_store {
    use super::*;

    #[tokio::test]
    async fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holdings.cache");
        let clock = Arc::new(ManualClock::new(t0()));
        let snap = snapshot_of(&["AAPL", "TSLA"]);

        {
            let store = SessionCacheStore::open(&path).unwrap().with_clock(clock.clone());
            store.write(KEY, &snap, 300.0).await.unwrap();
        }
        assert!(path.exists());
        assert!(!dir.path().join("holdings.cache.tmp").exists());

        let reopened = SessionCacheStore::open(&path).unwrap().with_clock(clock.clone());
        assert_eq!(reopened.name(), "file");
        assert!(reopened.is_valid(KEY).await);
        assert_eq!(reopened.read(KEY).await, Some(snap));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn file_writes_on_multi_thread_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holdings.cache");
        let store = Arc::new(SessionCacheStore::open(&path).unwrap());

        let writers: Vec<_> = ["AAPL", "TSLA", "MSFT"]
            .into_iter()
            .map(|symbol| {
                let store = store.clone();
                tokio::spawn(async move {
                    store.write(KEY, &snapshot_of(&[symbol]), 300.0).await.unwrap();
                })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap();
        }

        let on_disk = FileBackend::new(&path).load().unwrap();
        assert_eq!(on_disk.session_count(), 1);
        assert_eq!(on_disk, store.snapshot_table().unwrap());
        assert!(store.read_latest(KEY).await.unwrap().is_some());
    }

    #[test]
    fn failed_rename_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("holdings.cache");
        std::fs::create_dir(&target).unwrap();

        let err = FileBackend::new(&target).persist(&CacheTable::new()).unwrap_err();
        assert!(matches!(err, CacheError::Write(_)));
        assert!(!dir.path().join("holdings.cache.tmp").exists());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn failed_temp_write_leaves_no_temp_file() {
        if !std::path::Path::new("/dev/full").exists() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("holdings.cache");
        let tmp = dir.path().join("holdings.cache.tmp");
        // Every write through this link fails with ENOSPC.
        std::os::unix::fs::symlink("/dev/full", &tmp).unwrap();

        let err = FileBackend::new(&target).persist(&CacheTable::new()).unwrap_err();
        assert!(matches!(err, CacheError::Write(_)));
        assert!(std::fs::symlink_metadata(&tmp).is_err());
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("holdings.cache");

        let store = SessionCacheStore::open(&path).unwrap();
        store.write(KEY, &snapshot_of(&["A"]), 300.0).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn corrupt_file_is_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holdings.cache");
        std::fs::write(&path, b"definitely not a cache file").unwrap();

        let store = SessionCacheStore::open(&path).unwrap();
        assert_eq!(store.read_latest(KEY).await.unwrap(), None);

        store.write(KEY, &snapshot_of(&["A"]), 300.0).await.unwrap();
        let table = FileBackend::new(&path).load().unwrap();
        assert_eq!(table.session_count(), 1);
    }

    #[tokio::test]
    async fn unreadable_path_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be read as a file.
        assert!(matches!(
            FileBackend::new(dir.path()).load(),
            Err(CacheError::Read(_))
        ));

        let store = SessionCacheStore::open(dir.path()).unwrap();
        assert_eq!(store.read_latest(KEY).await.unwrap(), None);
        assert!(!store.is_valid(KEY).await);

        let err = store.write(KEY, &snapshot_of(&["A"]), 300.0).await.unwrap_err();
        assert!(matches!(err, CacheError::Write(_)));
        assert_eq!(store.read_latest(KEY).await.unwrap(), None);
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("absent.cache"));
        assert_eq!(backend.load().unwrap(), CacheTable::new());
    }
}
