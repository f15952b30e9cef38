use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::errors::TransportError;
use crate::models::holding::{HoldingRecord, HoldingSnapshot};
use crate::models::settings::{DEFAULT_ENDPOINT, DEFAULT_REQUEST_TIMEOUT_SECS};
use super::traits::RemoteSource;

/// Holdings endpoint over HTTP.
///
/// - One `GET` per call, no retries; the caller decides what to do on failure.
/// - Timeout defaults to 30 seconds and surfaces as [`TransportError::Timeout`].
/// - Non-2xx responses become [`TransportError::Http`] with the canonical reason.
pub struct HttpRemoteSource {
    client: Client,
    endpoint: Url,
}

impl HttpRemoteSource {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, TransportError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| TransportError::InvalidUrl(format!("{endpoint}: {e}")))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(TransportError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                endpoint.scheme()
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Server(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, endpoint })
    }

    /// Source pointed at the default endpoint with the default timeout.
    pub fn with_defaults() -> Result<Self, TransportError> {
        Self::new(
            DEFAULT_ENDPOINT,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

// ── Wire format ─────────────────────────────────────────────────────
//
// {"data": {"userHolding": [{"symbol", "quantity", "ltp", "avgPrice", "close"}]}}

#[derive(Deserialize)]
struct HoldingsEnvelope {
    data: HoldingsData,
}

#[derive(Deserialize)]
struct HoldingsData {
    #[serde(rename = "userHolding")]
    user_holding: Vec<WireHolding>,
}

#[derive(Deserialize)]
struct WireHolding {
    symbol: String,
    quantity: i64,
    ltp: f64,
    #[serde(rename = "avgPrice")]
    avg_price: f64,
    close: f64,
}

impl From<WireHolding> for HoldingRecord {
    fn from(w: WireHolding) -> Self {
        HoldingRecord {
            symbol: w.symbol,
            quantity: w.quantity,
            last_traded_price: w.ltp,
            average_price: w.avg_price,
            previous_close: w.close,
        }
    }
}

/// Decode a response body into a snapshot, preserving order.
/// Records without a symbol are dropped.
pub fn decode_holdings(body: &[u8]) -> Result<HoldingSnapshot, TransportError> {
    if body.is_empty() {
        return Err(TransportError::NoData);
    }

    let envelope: HoldingsEnvelope =
        serde_json::from_slice(body).map_err(|e| TransportError::Decoding(e.to_string()))?;

    let holdings = envelope
        .data
        .user_holding
        .into_iter()
        .map(HoldingRecord::from)
        .filter(|h| {
            if h.has_symbol() {
                true
            } else {
                warn!("dropping holding with empty symbol from response");
                false
            }
        })
        .collect();

    Ok(HoldingSnapshot::new(holdings))
}

#[async_trait]
impl RemoteSource for HttpRemoteSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_holdings(&self) -> Result<HoldingSnapshot, TransportError> {
        debug!(endpoint = %self.endpoint, "requesting holdings");

        let resp = self
            .client
            .get(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Http {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = resp.bytes().await?;
        let snapshot = decode_holdings(&body)?;
        debug!(holdings = snapshot.len(), "decoded holdings response");
        Ok(snapshot)
    }
}
