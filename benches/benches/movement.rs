// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use bramble_scene::{Node, NodeId, Tree};
use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Point, Vec2};

/// A floor of tiles with `actors` falling onto it.
fn level(actors: usize) -> (Tree, Vec<NodeId>, NodeId) {
    let mut tree = Tree::new();
    let root = tree.set_scene(Node::group("level")).unwrap();
    for i in 0..256 {
        let tile = Node::group("tile")
            .with_position(Point::new(f64::from(i) * 16.0, 200.0))
            .as_solid(Vec2::ZERO, Vec2::new(16.0, 16.0));
        tree.add_child(root, tile).ok();
    }
    let lift = tree
        .add_child(
            root,
            Node::group("lift")
                .with_position(Point::new(64.0, 120.0))
                .as_solid(Vec2::ZERO, Vec2::new(96.0, 8.0)),
        )
        .unwrap();
    let ids = (0..actors)
        .filter_map(|i| {
            let x = (i % 256) as f64 * 16.0;
            let y = 20.0 + (i / 256) as f64 * 24.0;
            tree.add_child(
                root,
                Node::group("crate")
                    .with_position(Point::new(x, y))
                    .as_actor(Vec2::ZERO, Vec2::new(10.0, 10.0)),
            )
            .ok()
        })
        .collect();
    (tree, ids, lift)
}

fn bench_actor_fall(c: &mut Criterion) {
    let mut group = c.benchmark_group("actor_fall");
    for &n in &[64_usize, 256, 1024] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("actors_n{n}"), |b| {
            b.iter_batched(
                || level(n),
                |(mut tree, actors, _)| {
                    for _ in 0..30 {
                        for &actor in &actors {
                            tree.move_actor(actor, Vec2::new(0.25, 6.5), None).ok();
                        }
                    }
                    black_box(tree.tick(0.0).ok());
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_lift_carry(c: &mut Criterion) {
    let mut group = c.benchmark_group("lift_carry");
    group.bench_function("lift_up_down", |b| {
        b.iter_batched(
            || level(256),
            |(mut tree, _, lift)| {
                for frame in 0..60 {
                    let dy = if frame < 30 { -1.5 } else { 1.5 };
                    tree.move_solid(lift, Vec2::new(0.0, dy)).ok();
                }
                black_box(tree.tick(0.0).ok());
            },
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_actor_fall, bench_lift_carry);
criterion_main!(benches);
