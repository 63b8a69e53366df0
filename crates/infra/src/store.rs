//! SQLite-backed relational store for the reconciliation pipeline.

use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use thiserror::Error;

use ordertally_billing::{OrderHeader, OrderLineRow};
use ordertally_core::{OrderId, Sku};
use ordertally_tax::VatCode;

/// Store failures (connection, query, row decoding).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Read side of the relational store, as the aggregation pipeline consumes
/// it. The pipeline never sees SQL; it sees ordered sequences.
#[async_trait]
pub trait OrderSource {
    /// All orders joined to their customer, ascending by order id.
    async fn fetch_orders(&self) -> Result<Vec<OrderHeader>, StoreError>;

    /// Join rows for one order (order_lines joined to products and
    /// stock_levels), ascending by SKU so accumulation order is fixed.
    async fn fetch_order_lines(&self, order_id: OrderId) -> Result<Vec<OrderLineRow>, StoreError>;
}

const SCHEMA_SQL: &str = r#"
DROP TABLE IF EXISTS order_lines;
DROP TABLE IF EXISTS orders;
DROP TABLE IF EXISTS stock_levels;
DROP TABLE IF EXISTS products;
DROP TABLE IF EXISTS customers;

CREATE TABLE customers (
    customer_id   INTEGER PRIMARY KEY,
    customer_name TEXT NOT NULL
);

CREATE TABLE products (
    sku          TEXT PRIMARY KEY,
    product_name TEXT NOT NULL,
    unit_price   REAL NOT NULL,
    vat_code     TEXT NOT NULL
);

CREATE TABLE stock_levels (
    sku         TEXT PRIMARY KEY,
    qty_on_hand INTEGER NOT NULL
);

CREATE TABLE orders (
    order_id    INTEGER PRIMARY KEY,
    customer_id INTEGER NOT NULL REFERENCES customers (customer_id)
);

CREATE TABLE order_lines (
    order_id INTEGER NOT NULL REFERENCES orders (order_id),
    sku      TEXT NOT NULL REFERENCES products (sku),
    qty      INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS ingest_runs (
    started_at  TEXT NOT NULL,
    finished_at TEXT NOT NULL,
    row_counts  TEXT NOT NULL
);
"#;

/// SQLite-backed store. Cloning shares the underlying pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) a database file.
    pub async fn connect(path: &Path) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;
        Ok(Self { pool })
    }

    /// Private in-memory database.
    ///
    /// Capped at one connection: each pooled connection to `:memory:`
    /// would otherwise see its own empty database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Drop and recreate the five source tables. Every run starts from a
    /// clean, fully re-loaded store; only the ingest audit log survives
    /// across runs.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl OrderSource for SqliteStore {
    async fn fetch_orders(&self) -> Result<Vec<OrderHeader>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT orders.order_id, customers.customer_name
            FROM orders
            JOIN customers ON orders.customer_id = customers.customer_id
            ORDER BY orders.order_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut headers = Vec::with_capacity(rows.len());
        for row in rows {
            headers.push(OrderHeader {
                order_id: OrderId::new(row.try_get("order_id")?),
                customer_name: row.try_get("customer_name")?,
            });
        }
        Ok(headers)
    }

    async fn fetch_order_lines(&self, order_id: OrderId) -> Result<Vec<OrderLineRow>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT order_lines.sku, order_lines.qty, products.unit_price,
                   products.vat_code, stock_levels.qty_on_hand
            FROM order_lines
            JOIN products ON order_lines.sku = products.sku
            JOIN stock_levels ON order_lines.sku = stock_levels.sku
            WHERE order_lines.order_id = ?1
            ORDER BY order_lines.sku ASC
            "#,
        )
        .bind(order_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        let mut lines = Vec::with_capacity(rows.len());
        for row in rows {
            let sku: String = row.try_get("sku")?;
            let vat_code: String = row.try_get("vat_code")?;
            lines.push(OrderLineRow {
                sku: Sku::new(sku),
                qty: row.try_get("qty")?,
                unit_price: row.try_get("unit_price")?,
                vat_code: VatCode::new(vat_code),
                qty_on_hand: row.try_get("qty_on_hand")?,
            });
        }
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded_store() -> SqliteStore {
        let store = SqliteStore::in_memory().await.unwrap();
        store.init_schema().await.unwrap();

        for statement in [
            "INSERT INTO customers (customer_id, customer_name) VALUES (1, 'Acme Ltd'), (2, 'Globex')",
            "INSERT INTO products (sku, product_name, unit_price, vat_code) VALUES
                ('SKU-001', 'Widget', 10.0, 'STANDARD'),
                ('SKU-002', 'Gadget', 5.0, 'ZERO')",
            "INSERT INTO stock_levels (sku, qty_on_hand) VALUES ('SKU-001', 5), ('SKU-002', 0)",
            "INSERT INTO orders (order_id, customer_id) VALUES (20, 2), (10, 1)",
            "INSERT INTO order_lines (order_id, sku, qty) VALUES
                (10, 'SKU-002', 1),
                (10, 'SKU-001', 2),
                (20, 'SKU-001', 1)",
        ] {
            sqlx::query(statement).execute(store.pool()).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn fetch_orders_joins_customers_in_order_id_order() {
        let store = seeded_store().await;
        let orders = store.fetch_orders().await.unwrap();

        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].order_id, OrderId::new(10));
        assert_eq!(orders[0].customer_name, "Acme Ltd");
        assert_eq!(orders[1].order_id, OrderId::new(20));
        assert_eq!(orders[1].customer_name, "Globex");
    }

    #[tokio::test]
    async fn fetch_order_lines_joins_and_orders_by_sku() {
        let store = seeded_store().await;
        let lines = store.fetch_order_lines(OrderId::new(10)).await.unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].sku, Sku::new("SKU-001"));
        assert_eq!(lines[0].qty, 2);
        assert_eq!(lines[0].unit_price, 10.0);
        assert_eq!(lines[0].vat_code, VatCode::new("STANDARD"));
        assert_eq!(lines[0].qty_on_hand, 5);
        assert_eq!(lines[1].sku, Sku::new("SKU-002"));
        assert_eq!(lines[1].qty_on_hand, 0);
    }

    #[tokio::test]
    async fn fetch_order_lines_is_empty_for_order_without_lines() {
        let store = seeded_store().await;
        sqlx::query("INSERT INTO orders (order_id, customer_id) VALUES (30, 1)")
            .execute(store.pool())
            .await
            .unwrap();

        let lines = store.fetch_order_lines(OrderId::new(30)).await.unwrap();
        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn init_schema_resets_source_tables() {
        let store = seeded_store().await;
        store.init_schema().await.unwrap();

        let orders = store.fetch_orders().await.unwrap();
        assert!(orders.is_empty());
    }
}
