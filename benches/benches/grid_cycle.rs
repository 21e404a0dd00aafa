// Copyright 2026 the Shoal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::ControlFlow;

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use shoal_grid::collectors::{KNearest, WithinRadius};
use shoal_grid::{Cell, Element, Point2, SpatialDatabase};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f32(&mut self) -> f32 {
        let v = self.next_u64() >> 40;
        (v as f32) / ((1u64 << 24) as f32)
    }
}

const HALF_EXTENT: f32 = 512.0;
const SUBDIVISIONS: u32 = 64;
const INITIAL_CAPACITY: u32 = 4;

fn gen_positions(count: usize, seed: u64) -> Vec<Point2<f32>> {
    let mut out = Vec::with_capacity(count);
    let mut rng = Rng::new(seed);
    for _ in 0..count {
        let x = (rng.next_f32() * 2.0 - 1.0) * HALF_EXTENT * 0.999;
        let y = (rng.next_f32() * 2.0 - 1.0) * HALF_EXTENT * 0.999;
        out.push(Point2::new(x, y));
    }
    out
}

type Buffers = (Vec<Cell>, Vec<Element<f32, u32>>);

fn populated(positions: &[Point2<f32>]) -> (SpatialDatabase<f32>, Buffers) {
    let mut cells = Vec::new();
    let mut elements = Vec::new();
    let db = SpatialDatabase::initialize(
        HALF_EXTENT,
        SUBDIVISIONS,
        INITIAL_CAPACITY,
        &mut cells,
        &mut elements,
    );
    // Warm-up cycles so grown capacities settle before measuring.
    for _ in 0..3 {
        db.clear_and_resize(&mut cells, &mut elements);
        for (i, &p) in positions.iter().enumerate() {
            db.insert(&mut cells, &mut elements, Element::new(i as u32, p));
        }
    }
    (db, (cells, elements))
}

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("rebuild");
    for &n in &[1_000_usize, 10_000, 100_000] {
        let positions = gen_positions(n, 0xCAFE_F00D_DEAD_BEEF);
        let (db, (mut cells, mut elements)) = populated(&positions);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("clear_insert_n{}", n), |b| {
            b.iter(|| {
                db.clear_and_resize(&mut cells, &mut elements);
                for (i, &p) in positions.iter().enumerate() {
                    db.insert(&mut cells, &mut elements, Element::new(i as u32, p));
                }
                black_box(cells.len())
            });
        });
    }
    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let positions = gen_positions(50_000, 0xBADC_F00D_1234_5678);
    let (db, (cells, elements)) = populated(&positions);
    let centers = gen_positions(256, 0xFACE_FEED_CAFE_BABE);

    let mut group = c.benchmark_group("query");
    group.throughput(Throughput::Elements(centers.len() as u64));

    group.bench_function("raster_radius_r16", |b| {
        let mut out = Vec::new();
        b.iter(|| {
            let mut total = 0_usize;
            for &center in &centers {
                out.clear();
                let mut collector = WithinRadius::new(center, 16.0, &mut out);
                db.query_range(&cells, &elements, center, Point2::new(16.0, 16.0), &mut collector);
                total += out.len();
            }
            black_box(total)
        });
    });

    group.bench_function("raster_count_r64", |b| {
        b.iter(|| {
            let mut total = 0_usize;
            for &center in &centers {
                db.query_range(
                    &cells,
                    &elements,
                    center,
                    Point2::new(64.0, 64.0),
                    &mut |_, bucket: &[Element<f32, u32>]| {
                        total += bucket.len();
                        ControlFlow::Continue(())
                    },
                );
            }
            black_box(total)
        });
    });

    group.bench_function("ring_knearest_k8", |b| {
        b.iter(|| {
            let mut total = 0_usize;
            for &center in &centers {
                let mut collector = KNearest::new(db.geometry(), center, 8);
                db.query_range_nearest_first(
                    &cells,
                    &elements,
                    center,
                    Point2::new(128.0, 128.0),
                    &mut collector,
                );
                total += collector.neighbors().len();
            }
            black_box(total)
        });
    });

    // The ring walk pays an ordering cost over the raster scan; this pins
    // the gap for the same visited set.
    group.bench_function("ring_count_r64", |b| {
        b.iter(|| {
            let mut total = 0_usize;
            for &center in &centers {
                db.query_range_nearest_first(
                    &cells,
                    &elements,
                    center,
                    Point2::new(64.0, 64.0),
                    &mut |_, bucket: &[Element<f32, u32>]| {
                        total += bucket.len();
                        ControlFlow::Continue(())
                    },
                );
            }
            black_box(total)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_rebuild, bench_queries);
criterion_main!(benches);
