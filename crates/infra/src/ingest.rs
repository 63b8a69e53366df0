//! Flat-file ingest: CSV records batch-inserted into the store.
//!
//! Each table loads inside its own transaction, so a table is either fully
//! loaded or untouched. Whitespace around CSV cells is trimmed before
//! parsing.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::store::SqliteStore;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("invalid record in {table}: {reason}")]
    InvalidRecord { table: &'static str, reason: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to record ingest run: {0}")]
    Audit(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct CustomerRecord {
    customer_id: i64,
    customer_name: String,
}

#[derive(Debug, Deserialize)]
struct ProductRecord {
    sku: String,
    product_name: String,
    unit_price: f64,
    vat_code: String,
}

#[derive(Debug, Deserialize)]
struct StockLevelRecord {
    sku: String,
    qty_on_hand: i64,
}

#[derive(Debug, Deserialize)]
struct OrderRecord {
    order_id: i64,
    customer_id: i64,
}

#[derive(Debug, Deserialize)]
struct OrderLineRecord {
    order_id: i64,
    sku: String,
    qty: i64,
}

/// Per-table row counts for one ingest run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub customers: usize,
    pub products: usize,
    pub stock_levels: usize,
    pub orders: usize,
    pub order_lines: usize,
}

/// Load the five source CSVs from `dir` into the store and record an audit
/// row in `ingest_runs`.
pub async fn ingest_csv_dir(store: &SqliteStore, dir: &Path) -> Result<IngestReport, IngestError> {
    let started_at = Utc::now();

    let report = IngestReport {
        customers: load_customers(store, &dir.join("customers.csv")).await?,
        products: load_products(store, &dir.join("products.csv")).await?,
        stock_levels: load_stock_levels(store, &dir.join("stock_levels.csv")).await?,
        orders: load_orders(store, &dir.join("orders.csv")).await?,
        order_lines: load_order_lines(store, &dir.join("order_lines.csv")).await?,
    };

    let finished_at = Utc::now();
    sqlx::query("INSERT INTO ingest_runs (started_at, finished_at, row_counts) VALUES (?1, ?2, ?3)")
        .bind(started_at.to_rfc3339())
        .bind(finished_at.to_rfc3339())
        .bind(serde_json::to_string(&report)?)
        .execute(store.pool())
        .await?;

    info!(
        customers = report.customers,
        products = report.products,
        stock_levels = report.stock_levels,
        orders = report.orders,
        order_lines = report.order_lines,
        "ingest complete"
    );
    Ok(report)
}

fn read_records<T>(path: &Path) -> Result<Vec<T>, IngestError>
where
    T: serde::de::DeserializeOwned,
{
    let wrap = |source: csv::Error| IngestError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(wrap)?;

    let mut records = Vec::new();
    for result in reader.deserialize() {
        records.push(result.map_err(wrap)?);
    }
    Ok(records)
}

async fn load_customers(store: &SqliteStore, path: &Path) -> Result<usize, IngestError> {
    let records: Vec<CustomerRecord> = read_records(path)?;
    let mut tx = store.pool().begin().await?;
    for record in &records {
        sqlx::query("INSERT INTO customers (customer_id, customer_name) VALUES (?1, ?2)")
            .bind(record.customer_id)
            .bind(&record.customer_name)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(records.len())
}

async fn load_products(store: &SqliteStore, path: &Path) -> Result<usize, IngestError> {
    let records: Vec<ProductRecord> = read_records(path)?;
    let mut tx = store.pool().begin().await?;
    for record in &records {
        if record.unit_price < 0.0 {
            return Err(IngestError::InvalidRecord {
                table: "products",
                reason: format!("negative unit_price for sku {}", record.sku),
            });
        }
        sqlx::query(
            "INSERT INTO products (sku, product_name, unit_price, vat_code) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&record.sku)
        .bind(&record.product_name)
        .bind(record.unit_price)
        .bind(&record.vat_code)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(records.len())
}

async fn load_stock_levels(store: &SqliteStore, path: &Path) -> Result<usize, IngestError> {
    let records: Vec<StockLevelRecord> = read_records(path)?;
    let mut tx = store.pool().begin().await?;
    for record in &records {
        sqlx::query("INSERT INTO stock_levels (sku, qty_on_hand) VALUES (?1, ?2)")
            .bind(&record.sku)
            .bind(record.qty_on_hand)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(records.len())
}

async fn load_orders(store: &SqliteStore, path: &Path) -> Result<usize, IngestError> {
    let records: Vec<OrderRecord> = read_records(path)?;
    let mut tx = store.pool().begin().await?;
    for record in &records {
        sqlx::query("INSERT INTO orders (order_id, customer_id) VALUES (?1, ?2)")
            .bind(record.order_id)
            .bind(record.customer_id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(records.len())
}

async fn load_order_lines(store: &SqliteStore, path: &Path) -> Result<usize, IngestError> {
    let records: Vec<OrderLineRecord> = read_records(path)?;
    let mut tx = store.pool().begin().await?;
    for record in &records {
        if record.qty <= 0 {
            return Err(IngestError::InvalidRecord {
                table: "order_lines",
                reason: format!(
                    "non-positive qty for order {} sku {}",
                    record.order_id, record.sku
                ),
            });
        }
        sqlx::query("INSERT INTO order_lines (order_id, sku, qty) VALUES (?1, ?2, ?3)")
            .bind(record.order_id)
            .bind(&record.sku)
            .bind(record.qty)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(records.len())
}
