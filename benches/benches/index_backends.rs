// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use bramble_index::{Aabb2D, Index, IndexGeneric, QuadTree};
use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};

const WORLD: Aabb2D<i64> = Aabb2D::new(-100_000, -100_000, 100_000, 100_000);

fn gen_tiles(n: usize, cell: i64) -> Vec<Aabb2D<i64>> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            out.push(Aabb2D::from_xywh(x as i64 * cell, y as i64 * cell, cell, cell));
        }
    }
    out
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn below(&mut self, bound: i64) -> i64 {
        (self.next_u64() % bound as u64) as i64
    }
}

/// Small sprites scattered over a level, the common actor case.
fn gen_sprites(count: usize, extent: i64, size: i64) -> Vec<Aabb2D<i64>> {
    let mut rng = Rng(0xB0A7_5EED_1234_ABCD);
    (0..count)
        .map(|_| Aabb2D::from_xywh(rng.below(extent), rng.below(extent), size, size))
        .collect()
}

fn quadtree() -> IndexGeneric<i64, QuadTree<i64>> {
    Index::<i64>::with_quadtree(WORLD, 8, 12)
}

fn bench_build_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_query");
    for &n in &[32_usize, 64, 128] {
        let tiles = gen_tiles(n, 16);
        let view = Aabb2D::from_xywh(256, 256, 320, 180);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("flatvec_n{n}"), |b| {
            b.iter_batched(
                Index::<i64>::new,
                |mut idx| {
                    for (key, r) in tiles.iter().copied().enumerate() {
                        idx.insert_or_update(key, r);
                    }
                    let _ = idx.commit();
                    black_box(idx.query_rect(view).count());
                },
                BatchSize::SmallInput,
            );
        });
        group.bench_function(format!("quadtree_n{n}"), |b| {
            b.iter_batched(
                quadtree,
                |mut idx| {
                    for (key, r) in tiles.iter().copied().enumerate() {
                        idx.insert_or_update(key, r);
                    }
                    let _ = idx.commit_and_optimize();
                    black_box(idx.query_rect(view).count());
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_moving_sprites(c: &mut Criterion) {
    let mut group = c.benchmark_group("moving_sprites");
    let sprites = gen_sprites(4096, 4096, 12);
    group.throughput(Throughput::Elements(sprites.len() as u64));

    let mut flat = Index::<i64>::new();
    let mut tree = quadtree();
    for (key, r) in sprites.iter().copied().enumerate() {
        flat.insert_or_update(key, r);
        tree.insert_or_update(key, r);
    }
    let _ = flat.commit();
    let _ = tree.commit_and_optimize();

    group.bench_function("flatvec_step", |b| {
        let mut dx = 0;
        b.iter(|| {
            dx = (dx + 1) % 8;
            for (key, r) in sprites.iter().enumerate() {
                flat.insert_or_update(key, r.translate(dx, 0));
            }
            let damage = flat.commit();
            black_box(damage.union());
        });
    });
    group.bench_function("quadtree_step", |b| {
        let mut dx = 0;
        b.iter(|| {
            dx = (dx + 1) % 8;
            for (key, r) in sprites.iter().enumerate() {
                tree.insert_or_update(key, r.translate(dx, 0));
            }
            let damage = tree.commit();
            black_box(damage.union());
        });
    });
    group.finish();
}

fn bench_point_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("point_queries");
    let sprites = gen_sprites(8192, 8192, 16);
    let mut flat = Index::<i64>::new();
    let mut tree = quadtree();
    for (key, r) in sprites.iter().copied().enumerate() {
        flat.insert_or_update(key, r);
        tree.insert_or_update(key, r);
    }
    let _ = flat.commit();
    let _ = tree.commit_and_optimize();

    let mut rng = Rng(0x0DDB_A11C_0FFE_E000);
    let points: Vec<(i64, i64)> = (0..1024)
        .map(|_| (rng.below(8192), rng.below(8192)))
        .collect();
    group.throughput(Throughput::Elements(points.len() as u64));
    group.bench_function("flatvec", |b| {
        b.iter(|| {
            let hits: usize = points
                .iter()
                .map(|&(x, y)| flat.query_point(x, y).count())
                .sum();
            black_box(hits);
        });
    });
    group.bench_function("quadtree", |b| {
        b.iter(|| {
            let hits: usize = points
                .iter()
                .map(|&(x, y)| tree.query_point(x, y).count())
                .sum();
            black_box(hits);
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_build_query,
    bench_moving_sprites,
    bench_point_queries
);
criterion_main!(benches);
