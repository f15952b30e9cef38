//! Currency strings for the presentation layer.
//!
//! Non-finite amounts (NaN, ±∞) render as `₹0.00` instead of leaking
//! "NaN" into the UI.

const ZERO: &str = "₹0.00";

// -0.0 would otherwise print as "-0.00".
fn normalize(amount: f64) -> f64 {
    if amount == 0.0 {
        0.0
    } else {
        amount
    }
}

/// `₹1234.50`
pub fn format_amount(amount: f64) -> String {
    if !amount.is_finite() {
        return ZERO.to_string();
    }
    format!("₹{:.2}", normalize(amount))
}

/// Like [`format_amount`], but losses carry the sign before the symbol: `-₹12.00`.
pub fn format_pnl(amount: f64) -> String {
    if !amount.is_finite() {
        return ZERO.to_string();
    }
    let amount = normalize(amount);
    if amount >= 0.0 {
        format!("₹{amount:.2}")
    } else {
        format!("-₹{:.2}", amount.abs())
    }
}
