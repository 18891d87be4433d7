//! # Registry Performance Benchmark
//!
//! Measures entity churn, component add/remove and view iteration over a
//! registry with a mix of common and rare component types.
//!
//! Run with: `cargo bench --package tessera_core`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tessera_core::{component_set, Entity, Registry, RegistryConfig};

/// Entity count for the iteration benchmarks.
const ENTITY_COUNT: usize = 100_000;

#[derive(Clone, Copy, Default)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Clone, Copy, Default)]
struct Velocity {
    dx: f32,
    dy: f32,
}

/// Carried by one entity in a hundred.
#[derive(Clone, Copy, Default)]
struct Frozen;

component_set! {
    struct Bench {
        positions: Position,
        velocities: Velocity,
        frozen: Frozen,
    }
}

fn populated(count: usize) -> (Registry<Bench>, Vec<Entity>) {
    let config = RegistryConfig::empty()
        .with_entity_capacity(count)
        .with_component_capacity(count);
    let mut registry = Registry::<Bench>::with_config(config).expect("benchmark config fits");
    let entities = registry.create_many(count);
    for (i, &entity) in entities.iter().enumerate() {
        let f = i as f32;
        registry.add(entity, Position { x: f, y: f });
        registry.add(entity, Velocity { dx: 0.1, dy: 0.2 });
        if i % 100 == 0 {
            registry.add(entity, Frozen);
        }
    }
    (registry, entities)
}

/// Benchmark: create N entities, then destroy them all.
fn bench_create_destroy(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_destroy");

    for count in [1_000, 10_000, ENTITY_COUNT] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut registry = Registry::<Bench>::new();
            b.iter(|| {
                let entities = registry.create_many(count);
                registry.destroy_many(entities);
                black_box(registry.retired_len())
            });
        });
    }

    group.finish();
}

/// Benchmark: add then remove one component on every entity.
fn bench_add_remove(c: &mut Criterion) {
    let (mut registry, entities) = populated(ENTITY_COUNT);
    for &entity in &entities {
        registry.remove::<Frozen>(entity);
    }

    c.bench_function("add_remove_100K", |b| {
        b.iter(|| {
            for &entity in &entities {
                registry.add(entity, Frozen);
            }
            for &entity in &entities {
                black_box(registry.remove::<Frozen>(entity));
            }
        });
    });
}

/// Benchmark: integrate positions through `each_mut` and `view`.
fn bench_view_iteration(c: &mut Criterion) {
    let (mut registry, _) = populated(ENTITY_COUNT);

    c.bench_function("each_mut_positions_100K", |b| {
        b.iter(|| {
            registry.each_mut::<Position, _>(|_, p| {
                p.x += 0.1;
                p.y += 0.2;
            });
        });
    });

    c.bench_function("view_get_position_velocity_100K", |b| {
        b.iter(|| {
            let mut sum = 0.0f32;
            for (_, (p, v)) in registry.view_get::<(Position, Velocity)>() {
                sum += p.x * v.dx + p.y * v.dy;
            }
            black_box(sum)
        });
    });

    // Rare type first: cost follows the frozen pool, not the position pool.
    c.bench_function("view_rare_first_100K", |b| {
        b.iter(|| black_box(registry.view::<(Frozen, Position)>().count()));
    });

    c.bench_function("view_common_first_100K", |b| {
        b.iter(|| black_box(registry.view::<(Position, Frozen)>().count()));
    });
}

/// Benchmark: steady-state churn that recycles slots.
fn bench_recycle_churn(c: &mut Criterion) {
    let (mut registry, mut entities) = populated(10_000);

    c.bench_function("recycle_churn_10K", |b| {
        b.iter(|| {
            for entity in entities.iter_mut().step_by(7) {
                registry.destroy(*entity);
                *entity = registry.create();
                registry.add(*entity, Position::default());
            }
            black_box(registry.len())
        });
    });
}

criterion_group!(
    benches,
    bench_create_destroy,
    bench_add_remove,
    bench_view_iteration,
    bench_recycle_churn,
);

criterion_main!(benches);
