// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::f64::consts::FRAC_PI_2;

use approx::assert_relative_eq;
use bramble_scene::{Aabb2D, Camera, Node, NodeId, Tint, Tree, YSort};
use kurbo::{Point, Vec2};

fn level() -> (Tree, NodeId) {
    let mut tree = Tree::new();
    let root = tree.set_scene(Node::group("level")).unwrap();
    (tree, root)
}

fn assert_point_eq(actual: Point, expected: Point) {
    assert_relative_eq!(actual.x, expected.x, epsilon = 1e-9);
    assert_relative_eq!(actual.y, expected.y, epsilon = 1e-9);
}

#[test]
fn three_levels_compose() {
    let (mut tree, root) = level();
    let a = tree
        .add_child(
            root,
            Node::group("a")
                .with_position(Point::new(10.0, 0.0))
                .with_scale(Vec2::new(2.0, 2.0)),
        )
        .unwrap();
    let b = tree
        .add_child(
            a,
            Node::group("b")
                .with_position(Point::new(1.0, 0.0))
                .with_rotation(FRAC_PI_2),
        )
        .unwrap();
    let c = tree
        .add_child(b, Node::group("c").with_position(Point::new(1.0, 0.0)))
        .unwrap();

    let node = tree.resolve(c).unwrap();
    assert_point_eq(node.global_position(), Point::new(12.0, 2.0));
    assert_relative_eq!(node.global_scale().x, 2.0, epsilon = 1e-9);
    assert_relative_eq!(node.global_scale().y, 2.0, epsilon = 1e-9);
    assert_relative_eq!(node.global_rotation(), FRAC_PI_2, epsilon = 1e-9);
}

#[test]
fn setters_propagate_before_returning() {
    let (mut tree, root) = level();
    let a = tree.add_child(root, Node::group("a")).unwrap();
    let b = tree
        .add_child(a, Node::group("b").with_position(Point::new(3.0, 4.0)))
        .unwrap();

    tree.set_position(a, Point::new(20.0, 0.0)).unwrap();
    assert_point_eq(tree.resolve(b).unwrap().global_position(), Point::new(23.0, 4.0));

    tree.set_rotation(a, FRAC_PI_2).unwrap();
    assert_point_eq(tree.resolve(b).unwrap().global_position(), Point::new(16.0, 3.0));

    tree.set_scale(a, Vec2::new(2.0, 1.0)).unwrap();
    // scale applies before rotation: (3, 4) -> (6, 4) -> rotated (-4, 6)
    assert_point_eq(tree.resolve(b).unwrap().global_position(), Point::new(16.0, 6.0));

    tree.translate(a, Vec2::new(-16.0, 0.0)).unwrap();
    tree.rotate(a, -FRAC_PI_2).unwrap();
    tree.scale_by(a, Vec2::new(0.5, 1.0)).unwrap();
    assert_point_eq(tree.resolve(b).unwrap().global_position(), Point::new(7.0, 4.0));
}

#[test]
fn tint_multiplies_down_the_tree() {
    let (mut tree, root) = level();
    let grey = Tint::rgba(128, 128, 128, 255);
    let parent = tree
        .add_child(root, Node::group("parent").with_tint(grey))
        .unwrap();
    let child = tree.add_child(parent, Node::group("child")).unwrap();
    let grandchild = tree
        .add_child(child, Node::group("grandchild").with_tint(grey))
        .unwrap();

    assert_eq!(tree.resolve(child).unwrap().global_tint(), grey);
    assert_eq!(
        tree.resolve(grandchild).unwrap().global_tint(),
        Tint::rgba(64, 64, 64, 255)
    );

    tree.set_tint(parent, Tint::WHITE).unwrap();
    assert_eq!(tree.resolve(child).unwrap().global_tint(), Tint::WHITE);
    assert_eq!(tree.resolve(grandchild).unwrap().global_tint(), grey);
}

#[test]
fn depth_accumulates_and_follows_zoom() {
    let (mut tree, root) = level();
    let parent = tree
        .add_child(root, Node::group("parent").with_depth(1.0))
        .unwrap();
    let child = tree
        .add_child(parent, Node::group("child").with_depth(0.5))
        .unwrap();
    assert_relative_eq!(tree.resolve(child).unwrap().global_depth(), 1.5);

    tree.set_camera(Camera {
        zoom: 2.0,
        ..Camera::default()
    });
    assert_relative_eq!(tree.resolve(parent).unwrap().global_depth(), 0.5);
    assert_relative_eq!(tree.resolve(child).unwrap().global_depth(), 0.75);

    tree.set_depth(parent, 3.0).unwrap();
    assert_relative_eq!(tree.resolve(child).unwrap().global_depth(), 1.75);
}

#[test]
fn index_follows_moving_ancestors() {
    let (mut tree, root) = level();
    let holder = tree.add_child(root, Node::group("holder")).unwrap();
    let hitbox = tree
        .add_child(
            holder,
            Node::group("coin").with_hitbox(Vec2::ZERO, Vec2::new(2.0, 2.0)),
        )
        .unwrap();
    assert_eq!(tree.query_rect(Aabb2D::new(-1, -1, 1, 1)), vec![hitbox]);

    tree.set_position(holder, Point::new(100.0, 50.0)).unwrap();
    assert!(tree.query_rect(Aabb2D::new(-1, -1, 1, 1)).is_empty());
    assert_eq!(tree.query_rect(Aabb2D::new(99, 49, 101, 51)), vec![hitbox]);
    assert_eq!(tree.get_at(Point::new(100.0, 50.0), Some("coin"), None), Some(hitbox));
    assert_eq!(
        tree.subtree_aabb(holder).unwrap(),
        Aabb2D::new(99, 49, 101, 51)
    );
}

#[test]
fn ysort_orders_children_by_y_after_update() {
    let (mut tree, root) = level();
    let sorter = tree.add_child(root, Node::new(YSort)).unwrap();
    let low = tree
        .add_child(sorter, Node::group("low").with_position(Point::new(0.0, 40.0)))
        .unwrap();
    let high = tree
        .add_child(sorter, Node::group("high").with_position(Point::new(0.0, -40.0)))
        .unwrap();
    tree.step().unwrap();
    let low_depth = tree.resolve(low).unwrap().global_depth();
    let high_depth = tree.resolve(high).unwrap().global_depth();
    assert!(high_depth < low_depth, "{high_depth} < {low_depth}");
    assert_relative_eq!(low_depth, YSort::depth_for(40.0));
}

#[test]
fn look_at_turns_toward_target() {
    let (mut tree, root) = level();
    let turret = tree.add_child(root, Node::group("turret")).unwrap();
    tree.look_at(turret, Point::new(0.0, 10.0), 1.0).unwrap();
    assert_relative_eq!(tree.resolve(turret).unwrap().rotation(), FRAC_PI_2, epsilon = 1e-9);
    tree.look_at(turret, Point::new(10.0, 0.0), 0.5).unwrap();
    assert_relative_eq!(
        tree.resolve(turret).unwrap().rotation(),
        FRAC_PI_2 * 0.5,
        epsilon = 1e-9
    );
}
