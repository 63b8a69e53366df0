//! `ordertally-tax` — VAT codes and the rate table.

pub mod rates;

pub use rates::{RateTable, TaxError, VatCode};
