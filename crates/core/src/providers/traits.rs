use async_trait::async_trait;

use crate::errors::TransportError;
use crate::models::holding::HoldingSnapshot;

/// Trait abstraction for the remote holdings endpoint.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Human-readable name of this source (for logs/errors).
    fn name(&self) -> &str;

    /// Perform one request and decode the holdings it returns.
    async fn fetch_holdings(&self) -> Result<HoldingSnapshot, TransportError>;
}
