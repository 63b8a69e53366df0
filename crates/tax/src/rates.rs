use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// VAT category label attached to a product (`STANDARD`, `REDUCED`, `ZERO`
/// by convention).
///
/// Codes are open-ended strings: whether a code is usable is decided by the
/// rate table at lookup time, not by the type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VatCode(String);

impl VatCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for VatCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<&str> for VatCode {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Tax-rule failures.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TaxError {
    /// A line references a code with no rate entry. Never treated as rate
    /// zero; the order carrying the line must fail.
    #[error("unknown VAT code: {0}")]
    UnknownVatCode(VatCode),

    /// A configured rate is negative or not a finite number.
    #[error("invalid rate {rate} for VAT code {code}")]
    InvalidRate { code: VatCode, rate: f64 },
}

/// Immutable mapping from VAT code to rate fraction (0.20 means 20%).
///
/// Built once at process start from configuration; shared read-only across
/// concurrent valuation work.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RateTable {
    rates: BTreeMap<VatCode, f64>,
}

impl RateTable {
    /// Build a table from `(code, rate)` pairs. Rejects negative and
    /// non-finite rates.
    pub fn from_fractions(
        entries: impl IntoIterator<Item = (VatCode, f64)>,
    ) -> Result<Self, TaxError> {
        let mut rates = BTreeMap::new();
        for (code, rate) in entries {
            if !rate.is_finite() || rate < 0.0 {
                return Err(TaxError::InvalidRate { code, rate });
            }
            rates.insert(code, rate);
        }
        Ok(Self { rates })
    }

    /// Look up the rate fraction for a code.
    pub fn rate(&self, code: &VatCode) -> Result<f64, TaxError> {
        self.rates
            .get(code)
            .copied()
            .ok_or_else(|| TaxError::UnknownVatCode(code.clone()))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}
