//! `ordertally-cli` — the run-once reconciliation binary.

pub mod run;

pub use run::{RunConfig, RunOutcome, execute};
