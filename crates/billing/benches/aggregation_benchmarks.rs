use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use ordertally_billing::{OrderHeader, OrderLineRow, summarize_order};
use ordertally_core::{OrderId, Sku};
use ordertally_tax::{RateTable, VatCode};

fn rate_table() -> RateTable {
    RateTable::from_fractions([
        (VatCode::new("STANDARD"), 0.20),
        (VatCode::new("REDUCED"), 0.05),
        (VatCode::new("ZERO"), 0.0),
    ])
    .expect("static rate table")
}

fn order_lines(count: usize) -> Vec<OrderLineRow> {
    let codes = ["STANDARD", "REDUCED", "ZERO"];
    (0..count)
        .map(|i| OrderLineRow {
            sku: Sku::new(format!("SKU-{i:05}")),
            qty: (i as i64 % 9) + 1,
            unit_price: 0.99 + (i as f64 % 50.0),
            vat_code: VatCode::new(codes[i % codes.len()]),
            qty_on_hand: 100,
        })
        .collect()
}

fn bench_summarize_order(c: &mut Criterion) {
    let rates = rate_table();
    let header = OrderHeader {
        order_id: OrderId::new(1),
        customer_name: "Benchmark Ltd".to_string(),
    };

    let mut group = c.benchmark_group("summarize_order");
    for size in [10usize, 100, 1_000, 10_000] {
        let lines = order_lines(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &lines, |b, lines| {
            b.iter(|| summarize_order(black_box(&header), black_box(lines), black_box(&rates)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_summarize_order);
criterion_main!(benches);
