use thiserror::Error;

// ── Transport / Network ─────────────────────────────────────────────

/// Failures raised by a [`RemoteSource`](crate::providers::traits::RemoteSource).
///
/// Every variant is retryable by calling `fetch` again; the orchestrator
/// routes all of them into the cache fallback path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("No data received")]
    NoData,

    #[error("Failed to decode response: {0}")]
    Decoding(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Request timed out")]
    Timeout,

    #[error("No internet connection")]
    NoInternetConnection,
}

impl TransportError {
    /// Transport failures never poison the caller; a later call may succeed.
    pub fn is_retryable(&self) -> bool {
        true
    }
}

// ── Cache / Persistence ─────────────────────────────────────────────

/// Failures raised by a [`CacheStore`](crate::storage::traits::CacheStore).
///
/// A cache failure is never fatal: readers treat it as "no cached data".
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CacheError {
    #[error("Cache write failed: {0}")]
    Write(String),

    #[error("Cache read failed: {0}")]
    Read(String),

    #[error("Invalid cache file format: {0}")]
    InvalidFileFormat(String),

    #[error("Unsupported cache file version: {0}")]
    UnsupportedVersion(u16),
}

// ── Orchestration ───────────────────────────────────────────────────

/// Terminal outcome of a single `fetch` / `force_refresh` call once every
/// fallback has been exhausted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrchestrationError {
    #[error("No data available from any source")]
    NoDataAvailable {
        #[source]
        network: Option<TransportError>,
    },

    #[error("All data sources failed: {network}; {cache}")]
    AllSourcesFailed {
        network: TransportError,
        cache: CacheError,
    },

    #[error("Holdings orchestrator is no longer running")]
    WorkerStopped,
}

impl OrchestrationError {
    /// Whether the presentation layer should offer a retry affordance.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, OrchestrationError::WorkerStopped)
    }

    /// The network failure that led here, if there was one.
    pub fn network_error(&self) -> Option<&TransportError> {
        match self {
            OrchestrationError::NoDataAvailable { network } => network.as_ref(),
            OrchestrationError::AllSourcesFailed { network, .. } => Some(network),
            OrchestrationError::WorkerStopped => None,
        }
    }
}

// ── Construction / Configuration ────────────────────────────────────

/// Umbrella error for wiring paths (settings, constructors).
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Orchestration(#[from] OrchestrationError),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Config(e.to_string())
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return TransportError::Timeout;
        }
        if e.is_connect() {
            return TransportError::NoInternetConnection;
        }
        if let Some(status) = e.status() {
            return TransportError::Http {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            };
        }

        // reqwest errors often carry the full URL; keep query strings out of logs.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };

        if e.is_builder() {
            TransportError::InvalidUrl(sanitized)
        } else if e.is_decode() {
            TransportError::Decoding(sanitized)
        } else {
            TransportError::Server(sanitized)
        }
    }
}
