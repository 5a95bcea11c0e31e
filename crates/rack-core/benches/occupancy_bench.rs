//! Criterion benchmarks for the rack elevation pipeline.
//!
//! The presentation layer recomputes occupancy, rows and utilization on every
//! edit, so these paths should stay well under a frame budget even for tall,
//! densely packed racks.
//!
//! Run with:
//! ```bash
//! cargo bench --package rack-core --bench occupancy_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rack_core::{
    build_render_rows, can_place, resolve_occupancy, utilization, Device, Rack,
};

// ── Rack fixture builders ─────────────────────────────────────────────────────

/// Creates a rack of `height` units filled bottom-up with 2U devices, leaving
/// every fifth slot empty.
///
/// Device i: 2U at U(1 + 5 * (i / 2) + 2 * (i % 2))
fn build_packed_rack(height: u32) -> Rack {
    let mut devices = Vec::new();
    let mut start = 1;
    let mut i = 0;
    while start < height {
        devices.push(
            Device::builder(format!("dev-{i}"), start, 2)
                .build()
                .expect("fixture devices must be valid"),
        );
        i += 1;
        start += if i % 2 == 0 { 3 } else { 2 };
    }
    Rack::new("bench", height, devices).expect("fixture rack must be valid")
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

/// Benchmarks [`resolve_occupancy`] scaling with rack height.
fn bench_resolve_occupancy(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_occupancy");

    for height in [42u32, 48, 200, 1000] {
        let rack = build_packed_rack(height);
        group.bench_with_input(BenchmarkId::new("height", height), &rack, |b, rack| {
            b.iter(|| resolve_occupancy(black_box(rack)).occupied_units())
        });
    }

    group.finish();
}

/// Benchmarks [`build_render_rows`], which resolves and clones each placed device.
fn bench_build_render_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_render_rows");

    for height in [42u32, 200] {
        let rack = build_packed_rack(height);
        group.bench_with_input(BenchmarkId::new("height", height), &rack, |b, rack| {
            b.iter(|| build_render_rows(black_box(rack)))
        });
    }

    group.finish();
}

/// Benchmarks the per-edit checks a form runs on every keystroke.
fn bench_edit_checks(c: &mut Criterion) {
    let rack = build_packed_rack(42);
    let candidate = Device::builder("probe", 5, 1).build().expect("valid probe");
    let mut group = c.benchmark_group("edit_checks");

    group.bench_function("can_place_free_unit", |b| {
        b.iter(|| can_place(black_box(&rack), black_box(&candidate), None))
    });

    group.bench_function("utilization_42u", |b| {
        b.iter(|| utilization(black_box(&rack)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_resolve_occupancy,
    bench_build_render_rows,
    bench_edit_checks,
);
criterion_main!(benches);
