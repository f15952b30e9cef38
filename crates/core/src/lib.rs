//! Data-access layer for a holdings display.
//!
//! Fetches the user's stock holdings from a remote endpoint, keeps the last
//! response in an expiring local cache, and hands the presentation layer a
//! snapshot tagged with where it came from.
//!
//! - [`providers`]: the remote endpoint ([`RemoteSource`], [`HttpRemoteSource`]).
//! - [`storage`]: the keyed, expiring cache ([`CacheStore`], [`SessionCacheStore`]).
//! - [`services`]: the serialized [`DataOrchestrator`] and the
//!   [`PortfolioController`] that debounces requests and exposes totals.
//!
//! The library installs no global logger; it emits `tracing` events and the
//! host application picks the subscriber.

pub mod clock;
pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::{CacheError, CoreError, OrchestrationError, TransportError};
pub use models::cache_entry::CacheEntry;
pub use models::holding::{HoldingRecord, HoldingSnapshot};
pub use models::settings::Settings;
pub use models::snapshot::{DataSource, TaggedSnapshot};
pub use providers::http::HttpRemoteSource;
pub use providers::traits::RemoteSource;
pub use services::data_orchestrator::{DataOrchestrator, OrchestratorBuilder, OrchestratorConfig};
pub use services::portfolio_controller::{FetchOutcome, PortfolioController};
pub use storage::session_store::SessionCacheStore;
pub use storage::traits::CacheStore;
