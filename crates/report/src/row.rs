use serde::Serialize;

use ordertally_billing::OrderSummary;
use ordertally_core::{OrderId, format_amount};

/// Column order of the exported report.
pub const REPORT_HEADER: [&str; 6] = [
    "order_id",
    "customer_name",
    "net_total",
    "vat_total",
    "gross_total",
    "is_fully_in_stock",
];

/// One exported report row. Totals become fixed two-decimal strings; the
/// stock flag stays a native boolean for the sink to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub order_id: OrderId,
    pub customer_name: String,
    pub net_total: String,
    pub vat_total: String,
    pub gross_total: String,
    pub is_fully_in_stock: bool,
}

impl From<&OrderSummary> for ReportRow {
    fn from(summary: &OrderSummary) -> Self {
        Self {
            order_id: summary.order_id,
            customer_name: summary.customer_name.clone(),
            net_total: format_amount(summary.net_total),
            vat_total: format_amount(summary.vat_total),
            gross_total: format_amount(summary.gross_total),
            is_fully_in_stock: summary.is_fully_in_stock,
        }
    }
}

/// Project summaries into report rows, ordered ascending by order id
/// regardless of the order they were aggregated in.
pub fn build_rows(mut summaries: Vec<OrderSummary>) -> Vec<ReportRow> {
    summaries.sort_by_key(|summary| summary.order_id);
    summaries.iter().map(ReportRow::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(order_id: i64, gross: f64, net: f64, in_stock: bool) -> OrderSummary {
        OrderSummary {
            order_id: OrderId::new(order_id),
            customer_name: format!("Customer {order_id}"),
            net_total: net,
            vat_total: gross - net,
            gross_total: gross,
            is_fully_in_stock: in_stock,
        }
    }

    #[test]
    fn rows_are_ordered_by_order_id() {
        let rows = build_rows(vec![
            summary(3, 30.0, 25.0, true),
            summary(1, 10.0, 10.0, false),
            summary(2, 20.0, 16.67, true),
        ]);
        let ids: Vec<i64> = rows.iter().map(|r| r.order_id.as_i64()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn totals_render_with_two_decimals() {
        let rows = build_rows(vec![summary(1, 25.0, 21.67, false)]);
        assert_eq!(rows[0].gross_total, "25.00");
        assert_eq!(rows[0].net_total, "21.67");
        assert_eq!(rows[0].vat_total, "3.33");
        assert!(!rows[0].is_fully_in_stock);
    }

    #[test]
    fn zero_totals_render_as_zero_strings() {
        let rows = build_rows(vec![summary(1, 0.0, 0.0, true)]);
        assert_eq!(rows[0].net_total, "0.00");
        assert_eq!(rows[0].vat_total, "0.00");
        assert_eq!(rows[0].gross_total, "0.00");
        assert!(rows[0].is_fully_in_stock);
    }

    #[test]
    fn no_summaries_means_no_rows() {
        assert!(build_rows(Vec::new()).is_empty());
    }
}
