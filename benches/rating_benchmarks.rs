//! Performance benchmarks for the rating engine.
//!
//! The per-shipment pipeline is a pure function over static reference data
//! and is expected to stay comfortably in the microsecond range, keeping
//! multi-million-shipment annual batches tractable on one core before any
//! parallelism. Run with: `cargo bench`. HTML reports are generated in
//! `target/criterion/`.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use rating_engine::config::{CarrierProfile, ConfigLoader};
use rating_engine::models::Shipment;
use rating_engine::optimizer::{GroupingConfig, build_groups, optimize};
use rating_engine::rating::{rate_shipment, rate_with_profile};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn load_profiles() -> Vec<CarrierProfile> {
    ConfigLoader::load_all("./config/carriers").expect("Failed to load carrier configs")
}

/// Generates a deterministic mixed fleet of shipments.
fn make_fleet(count: usize) -> Vec<Shipment> {
    let dests = ["60601", "90001", "10001", "30301", "59901"];
    let dims: [(&str, &str, &str, &str); 4] = [
        ("12", "9", "1", "0.8"),
        ("14", "10", "6", "4"),
        ("20", "20", "10", "15"),
        ("50", "10", "8", "55"),
    ];
    (0..count)
        .map(|i| {
            let (l, w, h, weight) = dims[i % dims.len()];
            Shipment {
                id: format!("bench_{i:06}"),
                ship_date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
                    + chrono::Duration::days((i % 180) as i64),
                origin: "ONT".to_string(),
                dest_postal: dests[i % dests.len()].to_string(),
                package_type: if i % 4 == 0 { "poly" } else { "carton" }.to_string(),
                length_in: dec(l),
                width_in: dec(w),
                height_in: dec(h),
                weight_lb: dec(weight),
            }
        })
        .collect()
}

fn bench_single_shipment(c: &mut Criterion) {
    let profiles = load_profiles();
    let apex = &profiles[0];
    let ground = apex.service("ground").unwrap();
    let shipment = &make_fleet(1)[0];

    c.bench_function("rate_shipment_single", |b| {
        b.iter(|| rate_shipment(black_box(shipment), black_box(ground)))
    });

    c.bench_function("rate_with_profile_single", |b| {
        b.iter(|| rate_with_profile(black_box(shipment), black_box(apex)))
    });
}

fn bench_batch_rating(c: &mut Criterion) {
    let profiles = load_profiles();
    let mut group = c.benchmark_group("batch_rating");

    for size in [100, 1000] {
        let fleet = make_fleet(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("all_carriers", size), &fleet, |b, fleet| {
            b.iter(|| {
                let mut rated = 0usize;
                for shipment in fleet {
                    for profile in &profiles {
                        if rate_with_profile(shipment, profile).is_some() {
                            rated += 1;
                        }
                    }
                }
                black_box(rated)
            })
        });
    }
    group.finish();
}

fn bench_optimizer(c: &mut Criterion) {
    let profiles = load_profiles();
    let fleet = make_fleet(1000);
    let grouping = GroupingConfig::new(3, vec![dec("1"), dec("5"), dec("10"), dec("20")]);
    let groups = build_groups(&fleet, &profiles, &grouping);

    c.bench_function("optimize_unconstrained", |b| {
        b.iter(|| optimize(black_box(&groups), &[], &profiles))
    });
}

criterion_group!(
    benches,
    bench_single_shipment,
    bench_batch_rating,
    bench_optimizer
);
criterion_main!(benches);
