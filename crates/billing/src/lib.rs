//! `ordertally-billing` — order line valuation and order aggregation.
//!
//! The only crate containing business rules: VAT-inclusive prices are
//! backed out to net values per line, accumulated per order in a fixed
//! line order, and rounded once at the totals stage.

pub mod summary;
pub mod valuation;

pub use summary::{AggregationError, OrderHeader, OrderSummary, summarize_order};
pub use valuation::{LineValuation, OrderLineRow, value_line};
