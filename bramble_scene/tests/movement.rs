// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use bramble_scene::{Aabb2D, ActorRules, CollisionData, Node, NodeId, SceneError, Tree};
use kurbo::{Point, Vec2};
use proptest::prelude::*;

fn level() -> (Tree, NodeId) {
    let mut tree = Tree::new();
    let root = tree.set_scene(Node::group("level")).unwrap();
    (tree, root)
}

fn actor(tree: &mut Tree, root: NodeId, at: Point, size: f64) -> NodeId {
    tree.add_child(
        root,
        Node::group("actor")
            .with_position(at)
            .as_actor(Vec2::ZERO, Vec2::new(size, size)),
    )
    .unwrap()
}

fn solid(tree: &mut Tree, root: NodeId, at: Point, size: Vec2) -> NodeId {
    tree.add_child(
        root,
        Node::group("solid")
            .with_position(at)
            .as_solid(Vec2::ZERO, size),
    )
    .unwrap()
}

fn position(tree: &Tree, id: NodeId) -> Point {
    tree.resolve(id).unwrap().position()
}

#[test]
fn fractional_moves_accumulate_to_whole_units() {
    let (mut tree, root) = level();
    let a = actor(&mut tree, root, Point::ORIGIN, 1.0);
    for _ in 0..10 {
        tree.move_x(a, 0.3, None).unwrap();
    }
    assert_eq!(position(&tree, a), Point::new(3.0, 0.0));
    let remainder = tree.resolve(a).unwrap().remainder().unwrap();
    assert!(remainder.x.abs() < 1e-9, "remainder {remainder:?} should be ~0");
}

#[test]
fn half_unit_moves_round_to_even() {
    let (mut tree, root) = level();
    let a = actor(&mut tree, root, Point::ORIGIN, 1.0);
    tree.move_x(a, 0.5, None).unwrap();
    assert_eq!(position(&tree, a), Point::ORIGIN);
    tree.move_x(a, 0.5, None).unwrap();
    assert_eq!(position(&tree, a), Point::new(1.0, 0.0));
    tree.move_y(a, -0.5, None).unwrap();
    assert_eq!(position(&tree, a), Point::new(1.0, 0.0));
}

proptest! {
    #[test]
    fn open_space_moves_track_the_summed_request(
        deltas in prop::collection::vec(-3.0_f64..3.0, 1..64),
    ) {
        let (mut tree, root) = level();
        let a = actor(&mut tree, root, Point::ORIGIN, 1.0);
        let s = solid(&mut tree, root, Point::new(0.0, 500.0), Vec2::new(4.0, 4.0));
        let mut sum = 0.0;
        for &delta in &deltas {
            sum += delta;
            tree.move_x(a, delta, None).unwrap();
            tree.move_solid(s, Vec2::new(delta, 0.0)).unwrap();
            for id in [a, s] {
                let remainder = tree.resolve(id).unwrap().remainder().unwrap();
                prop_assert!((-0.5..=0.5).contains(&remainder.x), "remainder {}", remainder.x);
            }
        }
        let actor_moved = position(&tree, a).x;
        let solid_moved = position(&tree, s).x;
        prop_assert!((actor_moved - sum.round()).abs() <= 1.0, "actor {actor_moved} vs {sum}");
        prop_assert!((solid_moved - sum.round()).abs() <= 1.0, "solid {solid_moved} vs {sum}");
    }
}

#[test]
fn actor_stops_before_solid_and_reports() {
    let (mut tree, root) = level();
    let a = actor(&mut tree, root, Point::new(-0.5, 0.5), 1.0);
    let wall = solid(&mut tree, root, Point::new(4.0, 0.5), Vec2::new(2.0, 2.0));
    assert_eq!(tree.aabb(a).unwrap(), Aabb2D::new(-1, 0, 0, 1));
    assert_eq!(tree.aabb(wall).unwrap().min_x, 3);

    let mut reports = Vec::new();
    let mut on_collide = |_: &mut Tree, _: NodeId, c: &CollisionData| -> Result<(), SceneError> {
        reports.push(*c);
        Ok(())
    };
    tree.move_x(a, 5.0, Some(&mut on_collide)).unwrap();

    assert_eq!(reports.len(), 1);
    let report = reports[0];
    assert_eq!(report.hitbox, wall);
    assert_eq!(report.direction, 1);
    assert_eq!(report.moved, Vec2::new(3.0, 0.0));
    assert_eq!(report.target, Point::new(4.5, 0.5));
    assert_eq!(position(&tree, a), Point::new(2.5, 0.5));
    assert_eq!(tree.aabb(a).unwrap().max_x, 3, "flush against the wall");
}

#[test]
fn blocked_moves_in_negative_direction_report_signed_displacement() {
    let (mut tree, root) = level();
    let a = actor(&mut tree, root, Point::new(10.0, 0.0), 2.0);
    let wall = solid(&mut tree, root, Point::new(0.0, 0.0), Vec2::new(2.0, 2.0));
    let mut seen = None;
    let mut on_collide = |_: &mut Tree, _: NodeId, c: &CollisionData| -> Result<(), SceneError> {
        seen = Some(*c);
        Ok(())
    };
    tree.move_x_exact(a, -20, Some(&mut on_collide)).unwrap();
    let c = seen.expect("wall blocks the move");
    assert_eq!(c.hitbox, wall);
    assert_eq!(c.direction, -1);
    assert_eq!(c.moved, Vec2::new(-8.0, 0.0));
    assert_eq!(position(&tree, a), Point::new(2.0, 0.0));
}

#[test]
fn non_collidable_hitboxes_do_not_block() {
    let (mut tree, root) = level();
    let a = actor(&mut tree, root, Point::ORIGIN, 2.0);
    let wall = solid(&mut tree, root, Point::new(4.0, 0.0), Vec2::new(2.0, 2.0));
    tree.set_collidable(wall, false).unwrap();
    tree.move_x_exact(a, 8, None).unwrap();
    assert_eq!(position(&tree, a), Point::new(8.0, 0.0));
    assert_eq!(tree.collide_at(a, Point::new(4.0, 0.0)).unwrap(), None);
    tree.set_collidable(wall, true).unwrap();
    assert_eq!(tree.collide_at(a, Point::new(4.0, 0.0)).unwrap(), Some(wall));
}

#[test]
fn plain_hitboxes_block_actors() {
    let (mut tree, root) = level();
    let a = actor(&mut tree, root, Point::ORIGIN, 2.0);
    let zone = tree
        .add_child(
            root,
            Node::group("zone")
                .with_position(Point::new(0.0, 5.0))
                .with_hitbox(Vec2::ZERO, Vec2::new(2.0, 2.0)),
        )
        .unwrap();
    tree.move_y_exact(a, 5, None).unwrap();
    assert_eq!(position(&tree, a), Point::new(0.0, 3.0));
    assert_eq!(tree.collide_at(a, Point::new(0.0, 4.0)).unwrap(), Some(zone));
}

#[derive(Debug)]
struct IgnoreNamed(&'static str);

impl ActorRules for IgnoreNamed {
    fn allow_collision(&self, tree: &Tree, _actor: NodeId, other: NodeId) -> bool {
        tree.resolve(other).is_ok_and(|n| n.name() != self.0)
    }
}

#[test]
fn rules_can_filter_collisions() {
    let (mut tree, root) = level();
    let a = tree
        .add_child(
            root,
            Node::group("player")
                .as_actor(Vec2::ZERO, Vec2::new(2.0, 2.0))
                .with_actor_rules(IgnoreNamed("one_way")),
        )
        .unwrap();
    tree.add_child(
        root,
        Node::group("one_way")
            .with_position(Point::new(4.0, 0.0))
            .as_solid(Vec2::ZERO, Vec2::new(2.0, 2.0)),
    )
    .unwrap();
    let wall = solid(&mut tree, root, Point::new(10.0, 0.0), Vec2::new(2.0, 2.0));
    let mut hit = None;
    let mut on_collide = |_: &mut Tree, _: NodeId, c: &CollisionData| -> Result<(), SceneError> {
        hit = Some(c.hitbox);
        Ok(())
    };
    tree.move_x_exact(a, 20, Some(&mut on_collide)).unwrap();
    assert_eq!(hit, Some(wall));
    assert_eq!(position(&tree, a), Point::new(8.0, 0.0));
}

#[test]
fn rider_is_carried_without_callbacks() {
    let (mut tree, root) = level();
    let platform = solid(&mut tree, root, Point::new(0.0, 10.0), Vec2::new(20.0, 2.0));
    let rider = actor(&mut tree, root, Point::new(0.0, 8.0), 2.0);
    let events = Rc::new(Cell::new(0));
    let counter = Rc::clone(&events);
    tree.subscribe_collisions(move |_, _| counter.set(counter.get() + 1));

    assert!(tree.is_attached(rider, platform).unwrap());
    tree.move_solid_exact(platform, 0, -2).unwrap();
    assert_eq!(position(&tree, rider), Point::new(0.0, 6.0));
    assert_eq!(position(&tree, platform), Point::new(0.0, 8.0));

    tree.move_solid_exact(platform, 3, 0).unwrap();
    assert_eq!(position(&tree, rider), Point::new(3.0, 6.0));
    assert_eq!(events.get(), 0);
    assert!(tree.is_attached(rider, platform).unwrap());
}

#[test]
fn actors_beside_a_platform_are_not_carried() {
    let (mut tree, root) = level();
    let platform = solid(&mut tree, root, Point::new(0.0, 10.0), Vec2::new(4.0, 2.0));
    let bystander = actor(&mut tree, root, Point::new(10.0, 8.0), 2.0);
    tree.move_solid_exact(platform, 1, 0).unwrap();
    assert_eq!(position(&tree, bystander), Point::new(10.0, 8.0));
}

#[test]
fn solid_pushes_by_overlap() {
    let (mut tree, root) = level();
    let pusher = solid(&mut tree, root, Point::new(1.0, 1.0), Vec2::new(2.0, 2.0));
    let a = actor(&mut tree, root, Point::new(4.0, 1.0), 2.0);
    assert_eq!(tree.aabb(a).unwrap(), Aabb2D::new(3, 0, 5, 2));

    tree.move_solid_exact(pusher, 2, 0).unwrap();
    assert_eq!(tree.aabb(pusher).unwrap(), Aabb2D::new(2, 0, 4, 2));
    assert_eq!(position(&tree, a), Point::new(5.0, 1.0));
    assert!(!tree.overlaps(a, pusher).unwrap());
}

#[test]
fn pushed_into_wall_is_squished_by_default() {
    let (mut tree, root) = level();
    let pusher = solid(&mut tree, root, Point::new(1.0, 1.0), Vec2::new(2.0, 2.0));
    let a = actor(&mut tree, root, Point::new(4.0, 1.0), 2.0);
    solid(&mut tree, root, Point::new(6.0, 1.0), Vec2::new(2.0, 2.0));

    tree.move_solid_exact(pusher, 2, 0).unwrap();
    assert!(!tree.is_alive(a));
    assert!(!tree.actors().contains(&a));
    assert!(tree.resolve(pusher).unwrap().hitbox().unwrap().collidable);
}

#[derive(Debug, Default)]
struct Tough {
    squishes: Rc<RefCell<Vec<CollisionData>>>,
}

impl ActorRules for Tough {
    fn squish(
        &self,
        _tree: &mut Tree,
        _actor: NodeId,
        collision: &CollisionData,
    ) -> Result<(), SceneError> {
        self.squishes.borrow_mut().push(*collision);
        Ok(())
    }
}

#[test]
fn squish_reaction_is_overridable() {
    let (mut tree, root) = level();
    let log = Rc::new(RefCell::new(Vec::new()));
    let pusher = solid(&mut tree, root, Point::new(1.0, 1.0), Vec2::new(2.0, 2.0));
    let a = tree
        .add_child(
            root,
            Node::group("tough")
                .with_position(Point::new(4.0, 1.0))
                .as_actor(Vec2::ZERO, Vec2::new(2.0, 2.0))
                .with_actor_rules(Tough {
                    squishes: Rc::clone(&log),
                }),
        )
        .unwrap();
    let wall = solid(&mut tree, root, Point::new(6.0, 1.0), Vec2::new(2.0, 2.0));

    tree.move_solid_exact(pusher, 2, 0).unwrap();
    assert!(tree.is_alive(a));
    let squishes = log.borrow();
    assert_eq!(squishes.len(), 1);
    assert_eq!(squishes[0].hitbox, wall);
    assert_eq!(squishes[0].moved, Vec2::ZERO);
}

#[test]
fn listeners_see_every_block_until_unsubscribed() {
    let (mut tree, root) = level();
    let a = actor(&mut tree, root, Point::ORIGIN, 2.0);
    solid(&mut tree, root, Point::new(4.0, 0.0), Vec2::new(2.0, 2.0));
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let sub = tree.subscribe_collisions(move |id, c| sink.borrow_mut().push((id, c.direction)));

    tree.move_x_exact(a, 5, None).unwrap();
    tree.move_x_exact(a, 1, None).unwrap();
    assert_eq!(seen.borrow().as_slice(), &[(a, 1), (a, 1)]);

    assert!(tree.unsubscribe_collisions(sub));
    tree.move_x_exact(a, 1, None).unwrap();
    assert_eq!(seen.borrow().len(), 2);
}

#[test]
fn callback_may_destroy_the_actor() {
    let (mut tree, root) = level();
    let a = actor(&mut tree, root, Point::ORIGIN, 2.0);
    solid(&mut tree, root, Point::new(4.0, 0.0), Vec2::new(2.0, 2.0));
    let mut on_collide = |tree: &mut Tree, id: NodeId, _: &CollisionData| -> Result<(), SceneError> {
        tree.destroy(id);
        Ok(())
    };
    tree.move_actor(a, Vec2::new(5.0, 5.0), Some(&mut on_collide)).unwrap();
    assert!(!tree.is_alive(a));
}

#[test]
fn scaled_parent_stretches_actor_box() {
    let (mut tree, root) = level();
    let holder = tree
        .add_child(root, Node::group("holder").with_scale(Vec2::new(2.0, 2.0)))
        .unwrap();
    let a = actor(&mut tree, holder, Point::ORIGIN, 2.0);
    assert_eq!(tree.aabb(a).unwrap(), Aabb2D::new(-2, -2, 2, 2));
}
