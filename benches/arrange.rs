use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, SamplingMode, Throughput};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde_json::json;

use joinery::{Columnar, Join, Row, Tabular};

// Orders with a varying number of lines each, flattened like a SQL LEFT JOIN.
fn gen_rows(orders: usize, seed: u64) -> Vec<Row> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out: Vec<Row> = Vec::with_capacity(orders * 4);
    let mut line_id: i64 = 0;
    for o in 0..orders {
        let lines = rng.gen::<u32>() % 8;
        if lines == 0 {
            let v = json!({"Ord_T_ID": o, "Ord_T_Who": format!("c{}", o % 97), "Line_T_ID": null, "Line_T_Qty": null});
            out.push(v.as_object().cloned().unwrap_or_default());
        }
        for _ in 0..lines {
            line_id += 1;
            let v = json!({"Ord_T_ID": o, "Ord_T_Who": format!("c{}", o % 97), "Line_T_ID": line_id, "Line_T_Qty": rng.gen::<u8>()});
            out.push(v.as_object().cloned().unwrap_or_default());
        }
    }
    out
}

fn bench_arrange(c: &mut Criterion) {
    let ns = [1_000usize, 10_000usize];
    let mut group = c.benchmark_group("arrange");
    group.sampling_mode(SamplingMode::Flat);
    group.sample_size(20);

    let tabular = Tabular::new("Ord").with_join("Lines", Tabular::new("Line")).expect("tabular tree");
    let columnar = Columnar::new(["Ord_T_Who"])
        .with_keys(["Ord_T_ID"])
        .with_join("Lines", Columnar::new(["Line_T_Qty"]).with_keys(["Line_T_ID"]))
        .expect("columnar tree");

    for &n in &ns {
        let rows = gen_rows(n, 0xABCD_1234);
        group.throughput(Throughput::Elements(rows.len() as u64));
        group.bench_with_input(BenchmarkId::new("tabular_two_level", n.to_string()), &rows, |b, rows| {
            b.iter(|| tabular.arrange_flat_data(rows).expect("arrange"));
        });
        group.bench_with_input(BenchmarkId::new("columnar_two_level", n.to_string()), &rows, |b, rows| {
            b.iter(|| columnar.arrange_flat_data(rows).expect("arrange"));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_arrange);
criterion_main!(benches);
