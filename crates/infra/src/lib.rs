//! Infrastructure layer: SQLite store, flat-file ingest, configuration,
//! report export.

pub mod config;
pub mod export;
pub mod ingest;
pub mod store;

pub use config::{ConfigError, load_rate_table};
pub use export::{ExportError, write_report};
pub use ingest::{IngestError, IngestReport, ingest_csv_dir};
pub use store::{OrderSource, SqliteStore, StoreError};
