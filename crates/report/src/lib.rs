//! `ordertally-report` — shaping order summaries into the export schema.

pub mod row;

pub use row::{REPORT_HEADER, ReportRow, build_rows};
