//! Tax-rule configuration loading.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use ordertally_tax::{RateTable, TaxError, VatCode};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read tax rules from {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("failed to parse tax rules in {path}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },

    #[error("invalid tax rules in {path}: {source}")]
    Invalid { path: PathBuf, source: TaxError },
}

/// On-disk shape of `tax_rules.json`: `{"vat": {"STANDARD": 0.2, ...}}`.
#[derive(Debug, Deserialize)]
struct TaxRulesFile {
    vat: BTreeMap<String, f64>,
}

/// Load the VAT rate table.
///
/// A missing, malformed, or invalid file is fatal; aggregation never
/// starts with a partial table.
pub fn load_rate_table(path: &Path) -> Result<RateTable, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let file: TaxRulesFile = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    RateTable::from_fractions(
        file.vat
            .into_iter()
            .map(|(code, rate)| (VatCode::new(code), rate)),
    )
    .map_err(|source| ConfigError::Invalid {
        path: path.to_path_buf(),
        source,
    })
}
