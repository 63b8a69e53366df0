use serde::{Deserialize, Serialize};
use thiserror::Error;

use ordertally_core::{OrderId, round_to_cents};
use ordertally_tax::{RateTable, TaxError};

use crate::valuation::{OrderLineRow, value_line};

/// Order identity as returned by the store (orders joined to customers).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderHeader {
    pub order_id: OrderId,
    pub customer_name: String,
}

/// Aggregated financial and fulfillment result for one order.
///
/// A value object, derived fresh per run and never mutated after
/// construction. Totals are rounded to cents; everything upstream of them
/// is full-precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub order_id: OrderId,
    pub customer_name: String,
    pub net_total: f64,
    pub vat_total: f64,
    pub gross_total: f64,
    pub is_fully_in_stock: bool,
}

/// One order's aggregation failed; no partial summary is produced for it.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("order {order_id}: {source}")]
pub struct AggregationError {
    pub order_id: OrderId,
    #[source]
    pub source: TaxError,
}

/// Aggregate one order's line rows into an [`OrderSummary`].
///
/// Lines must be supplied in ascending-SKU order; accumulation follows
/// that order so rounding at the totals stage is reproducible run-to-run.
/// Gross and net totals accumulate at full precision and are rounded
/// half-up to cents only at the end; `vat_total` is the difference of the
/// *rounded* totals, which can differ by one cent from an independently
/// rounded VAT sum. An order with no lines is vacuously fully in stock.
pub fn summarize_order(
    header: &OrderHeader,
    lines: &[OrderLineRow],
    rates: &RateTable,
) -> Result<OrderSummary, AggregationError> {
    let mut gross_total = 0.0_f64;
    let mut net_total = 0.0_f64;
    let mut is_fully_in_stock = true;

    for line in lines {
        let valuation = value_line(line, rates).map_err(|source| AggregationError {
            order_id: header.order_id,
            source,
        })?;
        gross_total += valuation.gross_value;
        net_total += valuation.net_value;
        is_fully_in_stock &= valuation.sufficient;
    }

    let gross_total = round_to_cents(gross_total);
    let net_total = round_to_cents(net_total);
    // Both operands are cent-rounded already; rounding the difference again
    // only clears binary representation dust, never moves a cent.
    let vat_total = round_to_cents(gross_total - net_total);

    Ok(OrderSummary {
        order_id: header.order_id,
        customer_name: header.customer_name.clone(),
        net_total,
        vat_total,
        gross_total,
        is_fully_in_stock,
    })
}
