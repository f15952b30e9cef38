use serde::{Deserialize, Serialize};

/// A single stock position as reported by the holdings endpoint.
///
/// Only the four market fields are stored. Every derived figure
/// (`current_value`, `pnl`, ...) is recomputed from them on each call.
///
/// Negative quantities are carried through as data; the arithmetic simply
/// follows the sign and no short-position meaning is attached to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingRecord {
    /// Ticker symbol, never empty (e.g., "AAPL", "RELIANCE")
    pub symbol: String,

    /// Net quantity held
    pub quantity: i64,

    /// Last traded price
    pub last_traded_price: f64,

    /// Average acquisition price per unit
    pub average_price: f64,

    /// Previous session's closing price
    pub previous_close: f64,
}

impl HoldingRecord {
    pub fn new(
        symbol: impl Into<String>,
        quantity: i64,
        last_traded_price: f64,
        average_price: f64,
        previous_close: f64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            last_traded_price,
            average_price,
            previous_close,
        }
    }

    /// A record is usable only when it carries a symbol.
    pub fn has_symbol(&self) -> bool {
        !self.symbol.trim().is_empty()
    }

    /// `quantity × last_traded_price`
    pub fn current_value(&self) -> f64 {
        self.quantity as f64 * self.last_traded_price
    }

    /// `quantity × average_price`
    pub fn total_investment(&self) -> f64 {
        self.quantity as f64 * self.average_price
    }

    /// `current_value − total_investment`
    pub fn pnl(&self) -> f64 {
        self.current_value() - self.total_investment()
    }

    /// `quantity × (previous_close − last_traded_price)`
    pub fn todays_pnl(&self) -> f64 {
        self.quantity as f64 * (self.previous_close - self.last_traded_price)
    }
}

/// An immutable, ordered set of holdings at one point in time.
///
/// Order is display order only; equality compares records in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HoldingSnapshot {
    pub holdings: Vec<HoldingRecord>,
}

impl HoldingSnapshot {
    pub fn new(holdings: Vec<HoldingRecord>) -> Self {
        Self { holdings }
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HoldingRecord> {
        self.holdings.iter()
    }

    // ── Aggregates (recomputed on every call) ───────────────────────

    pub fn total_current_value(&self) -> f64 {
        self.holdings.iter().map(HoldingRecord::current_value).sum()
    }

    pub fn total_investment(&self) -> f64 {
        self.holdings.iter().map(HoldingRecord::total_investment).sum()
    }

    pub fn total_pnl(&self) -> f64 {
        self.total_current_value() - self.total_investment()
    }

    pub fn todays_total_pnl(&self) -> f64 {
        self.holdings.iter().map(HoldingRecord::todays_pnl).sum()
    }
}

impl From<Vec<HoldingRecord>> for HoldingSnapshot {
    fn from(holdings: Vec<HoldingRecord>) -> Self {
        Self::new(holdings)
    }
}

impl<'a> IntoIterator for &'a HoldingSnapshot {
    type Item = &'a HoldingRecord;
    type IntoIter = std::slice::Iter<'a, HoldingRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.holdings.iter()
    }
}
