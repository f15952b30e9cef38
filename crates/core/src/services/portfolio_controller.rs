use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

use crate::errors::{CoreError, OrchestrationError};
use crate::models::holding::{HoldingRecord, HoldingSnapshot};
use crate::models::settings::Settings;
use crate::models::snapshot::{DataSource, TaggedSnapshot};
use crate::providers::http::HttpRemoteSource;
use crate::providers::traits::RemoteSource;
use crate::services::data_orchestrator::{DataOrchestrator, OrchestratorConfig};
use crate::storage::session_store::SessionCacheStore;
use crate::storage::traits::CacheStore;

/// What happened to a fetch request issued through the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The state was replaced with this snapshot.
    Loaded(TaggedSnapshot),
    /// Another fetch was already in flight; this one was dropped.
    Skipped,
}

/// Presentation-facing state holder.
///
/// Owns the loading flag that debounces fetch requests, the last snapshot
/// received, and the last error. Portfolio totals are recomputed from the
/// current holdings on every call.
pub struct PortfolioController {
    orchestrator: DataOrchestrator,
    loading: AtomicBool,
    current: RwLock<Option<TaggedSnapshot>>,
    last_error: RwLock<Option<OrchestrationError>>,
}

impl std::fmt::Debug for PortfolioController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioController")
            .field("orchestrator", &self.orchestrator)
            .field("loading", &self.is_loading())
            .field("holdings", &self.holdings().len())
            .field("source", &self.current_source())
            .finish()
    }
}

/// Clears the loading flag when the in-flight request ends, however it ends.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl PortfolioController {
    pub fn new(orchestrator: DataOrchestrator) -> Self {
        Self {
            orchestrator,
            loading: AtomicBool::new(false),
            current: RwLock::new(None),
            last_error: RwLock::new(None),
        }
    }

    /// Wire the full stack from settings: HTTP source, session cache
    /// (file-backed when `cache_path` is set), orchestrator.
    /// Must be called from within a Tokio runtime.
    pub fn from_settings(settings: &Settings) -> Result<Self, CoreError> {
        settings.validate()?;

        let remote: Arc<dyn RemoteSource> = Arc::new(HttpRemoteSource::new(
            &settings.endpoint,
            settings.request_timeout(),
        )?);

        let store = match &settings.cache_path {
            Some(path) => SessionCacheStore::open(path)?,
            None => SessionCacheStore::in_memory(),
        };
        let cache: Arc<dyn CacheStore> =
            Arc::new(store.with_retention(settings.cache_retention()));

        let orchestrator = DataOrchestrator::spawn(remote, cache, OrchestratorConfig::from(settings));
        Ok(Self::new(orchestrator))
    }

    pub fn orchestrator(&self) -> &DataOrchestrator {
        &self.orchestrator
    }

    // ── Requests ────────────────────────────────────────────────────

    /// Load holdings (cache first when valid). Dropped if a request is in flight.
    pub async fn fetch_holdings(&self) -> Result<FetchOutcome, OrchestrationError> {
        let Some(_guard) = self.begin_loading() else {
            debug!("fetch already in progress, ignoring duplicate request");
            return Ok(FetchOutcome::Skipped);
        };
        let result = self.orchestrator.fetch().await;
        self.apply(result)
    }

    /// Reload from the network. Dropped if a request is in flight.
    pub async fn force_refresh(&self) -> Result<FetchOutcome, OrchestrationError> {
        let Some(_guard) = self.begin_loading() else {
            debug!("force refresh already in progress, ignoring duplicate request");
            return Ok(FetchOutcome::Skipped);
        };
        let result = self.orchestrator.force_refresh().await;
        self.apply(result)
    }

    /// Drop the cached snapshot. The holdings on screen stay as they are.
    pub fn clear_cache(&self) {
        self.orchestrator.clear_cache();
        info!("cache clear requested");
    }

    fn begin_loading(&self) -> Option<LoadingGuard<'_>> {
        self.loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| LoadingGuard(&self.loading))
    }

    fn apply(
        &self,
        result: Result<TaggedSnapshot, OrchestrationError>,
    ) -> Result<FetchOutcome, OrchestrationError> {
        match result {
            Ok(snapshot) => {
                info!(source = %snapshot.source, holdings = snapshot.holdings.len(), "holdings loaded");
                *self.current.write().unwrap_or_else(|p| p.into_inner()) = Some(snapshot.clone());
                *self.last_error.write().unwrap_or_else(|p| p.into_inner()) = None;
                Ok(FetchOutcome::Loaded(snapshot))
            }
            Err(e) => {
                warn!(error = %e, "failed to load holdings");
                *self.last_error.write().unwrap_or_else(|p| p.into_inner()) = Some(e.clone());
                Err(e)
            }
        }
    }

    // ── State ───────────────────────────────────────────────────────

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// The last snapshot received, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<TaggedSnapshot> {
        self.current.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    #[must_use]
    pub fn holdings(&self) -> Vec<HoldingRecord> {
        self.with_holdings(|h| h.holdings.clone())
    }

    #[must_use]
    pub fn current_source(&self) -> Option<DataSource> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|s| s.source)
    }

    #[must_use]
    pub fn is_data_stale(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|s| s.is_stale_at(self.orchestrator.now()))
    }

    /// "Live Data", "Cached Data (Stale)", ... or "No Data" before the first load.
    #[must_use]
    pub fn data_source_description(&self) -> &'static str {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map_or("No Data", |s| s.describe_at(self.orchestrator.now()))
    }

    #[must_use]
    pub fn last_error(&self) -> Option<OrchestrationError> {
        self.last_error.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    // ── Portfolio totals ────────────────────────────────────────────

    #[must_use]
    pub fn total_current_value(&self) -> f64 {
        self.with_holdings(HoldingSnapshot::total_current_value)
    }

    #[must_use]
    pub fn total_investment(&self) -> f64 {
        self.with_holdings(HoldingSnapshot::total_investment)
    }

    #[must_use]
    pub fn total_pnl(&self) -> f64 {
        self.with_holdings(HoldingSnapshot::total_pnl)
    }

    #[must_use]
    pub fn todays_total_pnl(&self) -> f64 {
        self.with_holdings(HoldingSnapshot::todays_total_pnl)
    }

    fn with_holdings<T: Default>(&self, f: impl FnOnce(&HoldingSnapshot) -> T) -> T {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|s| f(&s.holdings))
            .unwrap_or_default()
    }
}
