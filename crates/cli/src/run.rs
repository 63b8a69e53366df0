//! One reconciliation run: ingest, aggregate, export.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tokio::task::JoinSet;
use tracing::info;

use ordertally_billing::{OrderHeader, OrderSummary, summarize_order};
use ordertally_infra::config::load_rate_table;
use ordertally_infra::export::write_report;
use ordertally_infra::ingest::ingest_csv_dir;
use ordertally_infra::store::{OrderSource, SqliteStore};
use ordertally_report::build_rows;
use ordertally_tax::RateTable;

/// File locations for one run, resolved from `ORDERTALLY_*` environment
/// variables with conventional defaults relative to the data directory.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory holding the five source CSVs.
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub tax_rules_path: PathBuf,
    pub report_path: PathBuf,
}

impl RunConfig {
    pub fn from_env() -> Self {
        let data_dir = PathBuf::from(env_or("ORDERTALLY_DATA_DIR", "."));
        let db_path = path_or(&data_dir, "ORDERTALLY_DB", "ordertally.db");
        let tax_rules_path = path_or(&data_dir, "ORDERTALLY_TAX_RULES", "tax_rules.json");
        let report_path = path_or(&data_dir, "ORDERTALLY_REPORT", "order_totals.csv");
        Self {
            data_dir,
            db_path,
            tax_rules_path,
            report_path,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn path_or(data_dir: &Path, key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .map(PathBuf::from)
        .unwrap_or_else(|_| data_dir.join(default))
}

/// What a successful run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub orders: usize,
    pub rows_written: usize,
}

/// Execute one full reconciliation run.
///
/// Any failure aborts the whole run; the report is only written once every
/// order has aggregated cleanly. Partial reports never reach the sink.
pub async fn execute(config: &RunConfig) -> anyhow::Result<RunOutcome> {
    let rates = Arc::new(load_rate_table(&config.tax_rules_path)?);

    let store = SqliteStore::connect(&config.db_path)
        .await
        .with_context(|| format!("failed to open database at {}", config.db_path.display()))?;
    store
        .init_schema()
        .await
        .context("failed to initialize schema")?;

    ingest_csv_dir(&store, &config.data_dir)
        .await
        .context("ingest failed")?;

    let orders = store.fetch_orders().await.context("failed to fetch orders")?;
    info!(orders = orders.len(), "aggregating orders");

    let summaries = aggregate_all(&store, &rates, orders).await?;

    let rows = build_rows(summaries);
    write_report(&config.report_path, &rows)?;

    Ok(RunOutcome {
        orders: rows.len(),
        rows_written: rows.len(),
    })
}

/// Fan out one task per order: fetch its line rows, then aggregate.
///
/// Completion order does not matter; the report builder imposes the final
/// ordering. The first failed order fails the run, and the remaining tasks
/// are dropped with the set.
async fn aggregate_all(
    store: &SqliteStore,
    rates: &Arc<RateTable>,
    orders: Vec<OrderHeader>,
) -> anyhow::Result<Vec<OrderSummary>> {
    let mut tasks = JoinSet::new();
    for header in orders {
        let store = store.clone();
        let rates = Arc::clone(rates);
        tasks.spawn(async move {
            let lines = store.fetch_order_lines(header.order_id).await?;
            let summary = summarize_order(&header, &lines, &rates)?;
            Ok::<OrderSummary, anyhow::Error>(summary)
        });
    }

    let mut summaries = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        let summary = joined.context("aggregation task panicked")??;
        summaries.push(summary);
    }
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn write_sources(dir: &Path) {
        fs::write(
            dir.join("tax_rules.json"),
            r#"{"vat": {"STANDARD": 0.2, "REDUCED": 0.05, "ZERO": 0.0}}"#,
        )
        .unwrap();
        fs::write(
            dir.join("customers.csv"),
            "customer_id,customer_name\n1,Acme Ltd\n2,Globex\n",
        )
        .unwrap();
        fs::write(
            dir.join("products.csv"),
            "sku,product_name,unit_price,vat_code\nSKU-001,Widget,10.00,STANDARD\nSKU-002,Gadget,5.00,ZERO\n",
        )
        .unwrap();
        fs::write(
            dir.join("stock_levels.csv"),
            "sku,qty_on_hand\nSKU-001,5\nSKU-002,0\n",
        )
        .unwrap();
        fs::write(dir.join("orders.csv"), "order_id,customer_id\n2,2\n1,1\n").unwrap();
        fs::write(
            dir.join("order_lines.csv"),
            "order_id,sku,qty\n1,SKU-001,2\n1,SKU-002,1\n",
        )
        .unwrap();
    }

    fn config_for(dir: &Path) -> RunConfig {
        RunConfig {
            data_dir: dir.to_path_buf(),
            db_path: dir.join("ordertally.db"),
            tax_rules_path: dir.join("tax_rules.json"),
            report_path: dir.join("order_totals.csv"),
        }
    }

    #[tokio::test]
    async fn full_run_writes_the_expected_report() {
        let dir = tempfile::tempdir().unwrap();
        write_sources(dir.path());
        let config = config_for(dir.path());

        let outcome = execute(&config).await.unwrap();
        assert_eq!(
            outcome,
            RunOutcome {
                orders: 2,
                rows_written: 2,
            }
        );

        let report = fs::read_to_string(&config.report_path).unwrap();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(
            lines,
            vec![
                "order_id,customer_name,net_total,vat_total,gross_total,is_fully_in_stock",
                "1,Acme Ltd,21.67,3.33,25.00,false",
                "2,Globex,0.00,0.00,0.00,true",
            ]
        );
    }

    #[tokio::test]
    async fn unknown_vat_code_fails_the_run_without_a_report() {
        let dir = tempfile::tempdir().unwrap();
        write_sources(dir.path());
        fs::write(
            dir.path().join("products.csv"),
            "sku,product_name,unit_price,vat_code\nSKU-001,Widget,10.00,LUXURY\nSKU-002,Gadget,5.00,ZERO\n",
        )
        .unwrap();
        let config = config_for(dir.path());

        let err = execute(&config).await.unwrap_err();
        assert!(err.to_string().contains("order 1"));
        assert!(!config.report_path.exists());
    }

    #[tokio::test]
    async fn missing_tax_rules_aborts_before_ingest() {
        let dir = tempfile::tempdir().unwrap();
        write_sources(dir.path());
        fs::remove_file(dir.path().join("tax_rules.json")).unwrap();
        let config = config_for(dir.path());

        assert!(execute(&config).await.is_err());
        assert!(!config.db_path.exists());
    }

    #[tokio::test]
    async fn empty_order_set_writes_a_header_only_report() {
        let dir = tempfile::tempdir().unwrap();
        write_sources(dir.path());
        fs::write(dir.path().join("orders.csv"), "order_id,customer_id\n").unwrap();
        fs::write(dir.path().join("order_lines.csv"), "order_id,sku,qty\n").unwrap();
        let config = config_for(dir.path());

        let outcome = execute(&config).await.unwrap();
        assert_eq!(outcome.rows_written, 0);

        let report = fs::read_to_string(&config.report_path).unwrap();
        assert_eq!(
            report.trim_end(),
            "order_id,customer_name,net_total,vat_total,gross_total,is_fully_in_stock"
        );
    }
}
