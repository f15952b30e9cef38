use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn, Instrument, Span};

use crate::clock::{Clock, SystemClock};
use crate::errors::{OrchestrationError, TransportError};
use crate::models::cache_entry::{DEFAULT_CACHE_KEY, DEFAULT_EXPIRY_SECS};
use crate::models::holding::HoldingSnapshot;
use crate::models::settings::{Settings, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::models::snapshot::{DataSource, TaggedSnapshot};
use crate::providers::traits::RemoteSource;
use crate::storage::traits::CacheStore;

/// Knobs for a [`DataOrchestrator`].
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// Key the snapshot is cached under.
    pub cache_key: String,

    /// Expiry written with every fresh snapshot, in seconds.
    pub expiry_interval_secs: f64,

    /// Upper bound on one remote call; exceeding it is a `Timeout`.
    pub request_timeout: Duration,

    /// Surface `AllSourcesFailed` instead of `NoDataAvailable` when the
    /// fallback cache read fails with its own error.
    pub detailed_errors: bool,

    /// Last-resort data, tagged `Fallback`, served when neither the network
    /// nor the cache produced anything.
    pub fallback: Option<HoldingSnapshot>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            cache_key: DEFAULT_CACHE_KEY.to_string(),
            expiry_interval_secs: DEFAULT_EXPIRY_SECS,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            detailed_errors: false,
            fallback: None,
        }
    }
}

impl From<&Settings> for OrchestratorConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            cache_key: settings.cache_key.clone(),
            expiry_interval_secs: settings.cache_expiry_secs,
            request_timeout: settings.request_timeout(),
            detailed_errors: settings.detailed_errors,
            fallback: None,
        }
    }
}

type Reply = oneshot::Sender<Result<TaggedSnapshot, OrchestrationError>>;

enum Command {
    Fetch(Reply),
    ForceRefresh(Reply),
    ClearCache(Option<oneshot::Sender<()>>),
    Invalidate,
}

/// Decides between network and cache and keeps the cache up to date.
///
/// Each orchestrator owns one background task. Every request is queued to
/// that task and handled strictly one at a time, in call order, so cache
/// writes never interleave and a `force_refresh` issued during a `fetch`
/// simply runs after it. Handles are cheap to clone; the task stops once the
/// last handle is dropped.
///
/// Serving rules:
/// - `fetch`: valid cache → cache, no network call. Otherwise network,
///   written through to the cache.
/// - `force_refresh`: always network first.
/// - On network failure both fall back to the latest cached snapshot, even an
///   expired one, then to the configured static fallback, and only then fail.
#[derive(Clone)]
pub struct DataOrchestrator {
    tx: mpsc::UnboundedSender<Command>,
    cache_key: Arc<str>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for DataOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataOrchestrator")
            .field("cache_key", &self.cache_key)
            .field("running", &self.is_running())
            .finish()
    }
}

/// Builder for [`DataOrchestrator`]; finish with [`spawn`](Self::spawn).
pub struct OrchestratorBuilder {
    remote: Arc<dyn RemoteSource>,
    cache: Arc<dyn CacheStore>,
    config: OrchestratorConfig,
    clock: Arc<dyn Clock>,
    span: Option<Span>,
}

impl OrchestratorBuilder {
    pub fn config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Span the background task runs in. Defaults to
    /// `holdings_orchestrator{cache_key}`.
    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn fallback(mut self, snapshot: HoldingSnapshot) -> Self {
        self.config.fallback = Some(snapshot);
        self
    }

    /// Start the background task. Must be called from within a Tokio runtime.
    pub fn spawn(self) -> DataOrchestrator {
        let (tx, rx) = mpsc::unbounded_channel();
        let cache_key: Arc<str> = Arc::from(self.config.cache_key.as_str());
        let span = self.span.unwrap_or_else(|| {
            tracing::info_span!("holdings_orchestrator", cache_key = %cache_key)
        });

        let worker = Worker {
            remote: self.remote,
            cache: self.cache,
            clock: self.clock.clone(),
            config: self.config,
        };
        tokio::spawn(worker.run(rx).instrument(span));

        DataOrchestrator {
            tx,
            cache_key,
            clock: self.clock,
        }
    }
}

impl DataOrchestrator {
    pub fn builder(remote: Arc<dyn RemoteSource>, cache: Arc<dyn CacheStore>) -> OrchestratorBuilder {
        OrchestratorBuilder {
            remote,
            cache,
            config: OrchestratorConfig::default(),
            clock: Arc::new(SystemClock),
            span: None,
        }
    }

    /// Shorthand for `builder(remote, cache).config(config).spawn()`.
    pub fn spawn(
        remote: Arc<dyn RemoteSource>,
        cache: Arc<dyn CacheStore>,
        config: OrchestratorConfig,
    ) -> Self {
        Self::builder(remote, cache).config(config).spawn()
    }

    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    /// The clock snapshots are stamped with.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Serve from a valid cache, otherwise from the network with cache fallback.
    pub async fn fetch(&self) -> Result<TaggedSnapshot, OrchestrationError> {
        self.request(Command::Fetch).await
    }

    /// Go to the network regardless of cache validity, with cache fallback.
    pub async fn force_refresh(&self) -> Result<TaggedSnapshot, OrchestrationError> {
        self.request(Command::ForceRefresh).await
    }

    /// Queue deletion of the cached snapshot and return immediately.
    /// Requests issued afterwards observe the cleared cache.
    pub fn clear_cache(&self) {
        if self.tx.send(Command::ClearCache(None)).is_err() {
            warn!(cache_key = %self.cache_key, "clear_cache ignored: orchestrator stopped");
        }
    }

    /// Like [`clear_cache`](Self::clear_cache), but resolves once the cache is cleared.
    pub async fn clear_cache_and_wait(&self) -> Result<(), OrchestrationError> {
        let (done_tx, done_rx) = oneshot::channel();
        self.tx
            .send(Command::ClearCache(Some(done_tx)))
            .map_err(|_| OrchestrationError::WorkerStopped)?;
        done_rx.await.map_err(|_| OrchestrationError::WorkerStopped)
    }

    /// Queue invalidation of the cached snapshot; its data stays available
    /// for fallback until the next cleanup.
    pub fn invalidate_cache(&self) {
        if self.tx.send(Command::Invalidate).is_err() {
            warn!(cache_key = %self.cache_key, "invalidate_cache ignored: orchestrator stopped");
        }
    }

    async fn request(
        &self,
        command: impl FnOnce(Reply) -> Command,
    ) -> Result<TaggedSnapshot, OrchestrationError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(command(reply_tx))
            .map_err(|_| OrchestrationError::WorkerStopped)?;
        reply_rx.await.map_err(|_| OrchestrationError::WorkerStopped)?
    }
}

// ── Background task ─────────────────────────────────────────────────

struct Worker {
    remote: Arc<dyn RemoteSource>,
    cache: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    config: OrchestratorConfig,
}

impl Worker {
    async fn run(self, mut rx: mpsc::UnboundedReceiver<Command>) {
        debug!(remote = self.remote.name(), cache = self.cache.name(), "orchestrator started");

        while let Some(command) = rx.recv().await {
            match command {
                Command::Fetch(reply) => {
                    // The caller may have gone away; the work still counts.
                    let _ = reply.send(self.fetch().await);
                }
                Command::ForceRefresh(reply) => {
                    let _ = reply.send(self.force_refresh().await);
                }
                Command::ClearCache(done) => {
                    self.clear_cache().await;
                    if let Some(done) = done {
                        let _ = done.send(());
                    }
                }
                Command::Invalidate => self.invalidate().await,
            }
        }

        debug!("orchestrator stopped");
    }

    async fn fetch(&self) -> Result<TaggedSnapshot, OrchestrationError> {
        let key = self.config.cache_key.as_str();

        if self.cache.is_valid(key).await {
            match self.cache.read(key).await {
                Some(holdings) => {
                    info!(holdings = holdings.len(), "using valid cache, skipping network");
                    return Ok(self.tag(holdings, DataSource::Cache));
                }
                None => warn!("cache reported valid but returned nothing, going to network"),
            }
        }

        self.network_with_fallback().await
    }

    async fn force_refresh(&self) -> Result<TaggedSnapshot, OrchestrationError> {
        info!("force refresh requested");
        self.network_with_fallback().await
    }

    async fn network_with_fallback(&self) -> Result<TaggedSnapshot, OrchestrationError> {
        match self.call_remote().await {
            Ok(holdings) => {
                let key = self.config.cache_key.as_str();
                if let Err(e) = self
                    .cache
                    .write(key, &holdings, self.config.expiry_interval_secs)
                    .await
                {
                    warn!(error = %e, "failed to cache fresh holdings");
                }
                info!(holdings = holdings.len(), "network fetch successful");
                Ok(self.tag(holdings, DataSource::Network))
            }
            Err(network) => {
                warn!(error = %network, "network fetch failed");
                self.fall_back(network).await
            }
        }
    }

    async fn call_remote(&self) -> Result<HoldingSnapshot, TransportError> {
        match tokio::time::timeout(self.config.request_timeout, self.remote.fetch_holdings()).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout),
        }
    }

    async fn fall_back(&self, network: TransportError) -> Result<TaggedSnapshot, OrchestrationError> {
        let key = self.config.cache_key.as_str();

        let cache_error = match self.cache.read_latest(key).await {
            Ok(Some(holdings)) => {
                info!(holdings = holdings.len(), "serving cached holdings after network failure");
                return Ok(self.tag(holdings, DataSource::Cache));
            }
            Ok(None) => {
                info!("no cached holdings to fall back on");
                None
            }
            Err(e) => {
                warn!(error = %e, "cache fallback read failed");
                Some(e)
            }
        };

        if let Some(fallback) = &self.config.fallback {
            info!(holdings = fallback.len(), "serving static fallback holdings");
            return Ok(self.tag(fallback.clone(), DataSource::Fallback));
        }

        Err(match cache_error {
            Some(cache) if self.config.detailed_errors => {
                OrchestrationError::AllSourcesFailed { network, cache }
            }
            _ => OrchestrationError::NoDataAvailable {
                network: Some(network),
            },
        })
    }

    async fn clear_cache(&self) {
        match self.cache.clear(&self.config.cache_key).await {
            Ok(()) => info!("cache cleared"),
            Err(e) => warn!(error = %e, "failed to clear cache"),
        }
    }

    async fn invalidate(&self) {
        if let Err(e) = self.cache.invalidate(&self.config.cache_key).await {
            warn!(error = %e, "failed to invalidate cache");
        }
    }

    fn tag(&self, holdings: HoldingSnapshot, source: DataSource) -> TaggedSnapshot {
        TaggedSnapshot::new(holdings, source, self.clock.now())
    }
}
