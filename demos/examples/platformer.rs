// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Platformer.
//!
//! A falling player lands on a moving lift, rides it, and reports what it touched.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p bramble_demos --example platformer`

use std::cell::RefCell;
use std::rc::Rc;

use bramble_scene::{Behavior, CollisionData, DrawItem, Node, NodeId, SceneError, Tree};
use kurbo::{Point, Vec2};

const GRAVITY: f64 = 0.35;

struct Player {
    velocity: Vec2,
    grounded: bool,
}

impl Behavior for Player {
    fn update(&mut self, tree: &mut Tree, id: NodeId) -> Result<(), SceneError> {
        self.velocity.y = (self.velocity.y + GRAVITY).min(6.0);
        self.grounded = false;

        let mut landed = false;
        let mut on_collide =
            |_: &mut Tree, _: NodeId, hit: &CollisionData| -> Result<(), SceneError> {
                landed |= hit.direction > 0;
                Ok(())
            };
        tree.move_x(id, self.velocity.x, None)?;
        tree.move_y(id, self.velocity.y, Some(&mut on_collide))?;
        if landed {
            self.velocity.y = 0.0;
            self.grounded = true;
        }
        Ok(())
    }
}

/// A solid that sways up and down.
struct Lift {
    frame: u32,
}

impl Behavior for Lift {
    fn update(&mut self, tree: &mut Tree, id: NodeId) -> Result<(), SceneError> {
        self.frame += 1;
        let dy = if (self.frame / 40) % 2 == 0 { -0.75 } else { 0.75 };
        tree.move_solid(id, Vec2::new(0.5, dy))
    }
}

fn main() {
    env_logger::init();

    let mut tree = Tree::new();
    let root = tree
        .set_scene(Node::group("level"))
        .expect("fresh tree accepts a scene");
    let player = tree
        .add_child(
            root,
            Node::new(Player {
                velocity: Vec2::new(0.0, 0.0),
                grounded: false,
            })
            .with_position(Point::new(24.0, 0.0))
            .as_actor(Vec2::ZERO, Vec2::new(8.0, 12.0)),
        )
        .expect("root is alive");
    tree.add_child(
        root,
        Node::new(Lift { frame: 0 })
            .with_position(Point::new(24.0, 40.0))
            .as_solid(Vec2::ZERO, Vec2::new(32.0, 4.0)),
    )
    .expect("root is alive");

    let touched = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&touched);
    tree.subscribe_collisions(move |actor, hit| sink.borrow_mut().push((actor, hit.hitbox)));

    for frame in 0..120 {
        let report = tree.tick(1.0 / 60.0).expect("scene is loaded");
        if frame % 20 == 0 {
            let mut items: Vec<DrawItem> = Vec::new();
            tree.draw(&mut items);
            for item in &items {
                println!(
                    "frame {frame:3} steps {} {} at ({:.1}, {:.1})",
                    report.steps, item.id, item.position.x, item.position.y
                );
            }
        }
    }

    let state = tree.behavior::<Player>(player).expect("player is alive");
    println!("grounded: {}", state.grounded);
    println!("collisions reported: {}", touched.borrow().len());
    log::info!("final player position {:?}", tree.resolve(player).map(|n| n.position()));
}
