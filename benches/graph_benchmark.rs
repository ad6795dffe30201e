//! Benchmarks for payload normalization and forest construction.
//!
//! Run with: cargo bench --bench graph_benchmark

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use inventory_enrich::model::SbomComponent;
use inventory_enrich::{normalize, DependencyGraphBuilder};
use serde_json::{json, Value};
use std::hint::black_box;

/// Components where each depends on the next few, with a back edge every tenth.
fn generate_components(count: usize) -> Vec<SbomComponent> {
    (0..count)
        .map(|i| {
            let mut comp = SbomComponent::new(format!("component-{i}"))
                .with_version(format!("1.{}.{}", i % 10, i % 100))
                .with_purl(format!("pkg:npm/component-{i}@1.{}.{}", i % 10, i % 100));
            for step in 1..=2 {
                if i + step < count {
                    comp = comp.depends_on(format!("component-{}", i + step));
                }
            }
            if i % 10 == 9 {
                comp = comp.depends_on(format!("component-{}", i - 9));
            }
            comp
        })
        .collect()
}

/// A CycloneDX-shaped payload with a top-level dependency list.
fn generate_payload(count: usize) -> Value {
    let components: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "bom-ref": format!("ref-{i}"),
                "name": format!("component-{i}"),
                "version": "1.0.0",
                "licenses": [{"license": {"id": "MIT"}}],
            })
        })
        .collect();
    let dependencies: Vec<Value> = (0..count.saturating_sub(1))
        .map(|i| json!({"ref": format!("ref-{i}"), "dependsOn": [format!("ref-{}", i + 1)]}))
        .collect();
    json!({"components": components, "dependencies": dependencies})
}

fn benchmark_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    for size in [100, 1000] {
        let payload = generate_payload(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &payload, |b, payload| {
            b.iter(|| normalize(black_box(payload)));
        });
    }
    group.finish();
}

fn benchmark_forest(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_forest");
    group.sample_size(20);
    // Overlapping paths expand per path, so sizes stay small
    for size in [10, 16, 20] {
        let components = generate_components(size);
        let builder = DependencyGraphBuilder::new();
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &components,
            |b, components| {
                b.iter(|| builder.build(black_box(components)));
            },
        );
    }
    group.finish();
}

criterion_group!(benches, benchmark_normalize, benchmark_forest);
criterion_main!(benches);
