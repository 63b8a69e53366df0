use serde::{Deserialize, Serialize};

use ordertally_core::Sku;
use ordertally_tax::{RateTable, TaxError, VatCode};

/// One order line joined against product and stock data: the unit of
/// valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineRow {
    pub sku: Sku,
    pub qty: i64,
    /// Gross (tax-inclusive) price per unit.
    pub unit_price: f64,
    pub vat_code: VatCode,
    pub qty_on_hand: i64,
}

/// Valuation of a single line, carried at full precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineValuation {
    /// `unit_price * qty`, unrounded.
    pub gross_value: f64,
    /// Gross with the VAT share backed out: `gross / (1 + rate)`.
    pub net_value: f64,
    /// `gross - net`. Derived from the other two rather than rounded
    /// independently, so `net + vat == gross` holds exactly.
    pub vat_value: f64,
    /// Strict check: `qty < qty_on_hand`. A line that exactly matches
    /// on-hand stock counts as NOT sufficient.
    pub sufficient: bool,
}

/// Value one line against the rate table.
///
/// Pure; safe to run concurrently across lines. An unknown VAT code fails
/// the line (and with it the whole order) rather than skipping it.
pub fn value_line(line: &OrderLineRow, rates: &RateTable) -> Result<LineValuation, TaxError> {
    let rate = rates.rate(&line.vat_code)?;
    let gross_value = line.unit_price * line.qty as f64;
    let net_value = gross_value / (1.0 + rate);
    Ok(LineValuation {
        gross_value,
        net_value,
        vat_value: gross_value - net_value,
        sufficient: line.qty < line.qty_on_hand,
    })
}
