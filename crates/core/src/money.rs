//! Currency rounding and formatting.
//!
//! Monetary amounts are carried as `f64` at full precision while
//! accumulating; rounding to cents happens once, at the totals stage.

/// Round to two decimal places, half-up (standard currency rounding).
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Fixed two-decimal rendering for export.
pub fn format_amount(value: f64) -> String {
    format!("{value:.2}")
}
