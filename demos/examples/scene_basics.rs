// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene basics.
//!
//! Build a hierarchy, move a parent, and watch globals and the index follow.
//!
//! Run:
//! - `cargo run -p bramble_demos --example scene_basics`

use bramble_scene::{Aabb2D, Behavior, Node, Tint, Tree, TreeConfig};
use kurbo::{Point, Vec2};

#[derive(Default)]
struct Coin;

impl Behavior for Coin {}

fn main() {
    env_logger::init();

    let config = TreeConfig::from_toml_str(
        r#"
        step_seconds = 0.02
        split_threshold = 4

        [world]
        x = -1000
        y = -1000
        width = 2000
        height = 2000
        "#,
    )
    .expect("valid config");
    let mut tree = Tree::with_config(config).expect("validated config");
    let root = tree.set_scene(Node::group("room")).expect("empty tree");

    let shelf = tree
        .add_child(
            root,
            Node::group("shelf")
                .with_position(Point::new(100.0, 50.0))
                .with_tint(Tint::rgba(200, 180, 160, 255)),
        )
        .expect("room is alive");
    for i in 0..3 {
        tree.add_child(
            shelf,
            Node::new(Coin)
                .with_position(Point::new(f64::from(i) * 10.0, 0.0))
                .with_hitbox(Vec2::ZERO, Vec2::new(4.0, 4.0)),
        )
        .expect("shelf is alive");
    }

    println!("coins: {:?}", tree.nodes_of::<Coin>().iter().collect::<Vec<_>>());
    println!("near shelf: {:?}", tree.query_rect(Aabb2D::new(95, 45, 125, 55)));

    tree.set_position(shelf, Point::new(-200.0, 0.0)).expect("shelf is alive");
    tree.set_rotation(shelf, core::f64::consts::FRAC_PI_2).expect("shelf is alive");
    for coin in tree.nodes_of::<Coin>().iter() {
        let node = tree.resolve(coin).expect("registry only yields live nodes");
        println!(
            "{} global {:?} tint {:?} box {:?}",
            coin,
            node.global_position(),
            node.global_tint(),
            tree.aabb(coin).ok()
        );
    }

    let hit = tree.get_at(Point::new(-200.0, 10.0), None, None);
    println!("coin under (-200, 10): {hit:?}");
    let report = tree.tick(0.05).expect("scene is loaded");
    println!("steps {} damage {:?}", report.steps, report.damage.union());
    println!(
        "repaint needed on screen: {}",
        report.damage.touches(tree.camera().bounds(640.0, 360.0))
    );
}
