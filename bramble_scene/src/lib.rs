// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bramble Scene: a Kurbo-native 2D scene graph for pixel-exact games.
//!
//! - Nodes live in an arena and are addressed by generational [`NodeId`]s; a handle to
//!   a destroyed node never resolves to whatever reused its slot.
//! - Position, scale, rotation, depth, and tint propagate eagerly down the hierarchy,
//!   so global values are current as soon as a setter returns.
//! - Active nodes keep an integer box in a [`bramble_index`] quadtree for broad-phase
//!   queries.
//! - Actors move in whole units and stop at hitboxes; solids push and carry actors.
//!
//! ## API overview
//!
//! - [`Tree`]: owns the nodes, the spatial index, registries, and the driver.
//! - [`Node`]: builder for a node's local state, hitbox, and [`Behavior`].
//! - [`Behavior`]: setup, ready, update, and draw hooks. [`Group`] and [`YSort`] are
//!   built in.
//! - [`ActorRules`]: per-actor collision filter and squish reaction.
//! - [`CollisionData`]: what an actor ran into.
//! - [`TreeConfig`]: step length and index tuning, loadable from TOML.
//! - [`StateMachine`]: enter/process/exit states for a behavior's update hook.
//!
//! Key operations:
//! - [`Tree::set_scene`] / [`Tree::change_scene`] and [`Tree::add_child`] → [`NodeId`]
//! - [`Tree::add_singleton`] for roots that outlive scene changes.
//! - [`Tree::set_position`] and friends, which propagate to the subtree.
//! - [`Tree::move_actor`] and [`Tree::move_solid`] for collision-aware movement.
//! - [`Tree::tick`] to run fixed updates and [`Tree::draw`] to collect draw work.
//!
//! ## Movement model
//!
//! Every actor and solid keeps a fractional remainder per axis. A move adds to the
//! remainder and applies only its rounded whole part, so `0.3` per step for ten steps
//! moves exactly three units. An actor's whole-unit move walks one unit at a time and
//! stops before the first unit that would overlap a collidable hitbox. A moving solid
//! pushes actors it overlaps out by exactly the overlap and carries actors standing on
//! it; an actor pushed into something else is squished.
//!
//! ### Minimal usage
//!
//! ```
//! use bramble_scene::{CollisionData, Node, NodeId, SceneError, Tree};
//! use kurbo::{Point, Vec2};
//!
//! let mut tree = Tree::new();
//! let root = tree.set_scene(Node::group("level")).unwrap();
//! let player = tree
//!     .add_child(root, Node::group("player").as_actor(Vec2::ZERO, Vec2::new(2.0, 2.0)))
//!     .unwrap();
//! let wall = tree
//!     .add_child(
//!         root,
//!         Node::group("wall")
//!             .with_position(Point::new(6.0, 0.0))
//!             .as_solid(Vec2::ZERO, Vec2::new(2.0, 2.0)),
//!     )
//!     .unwrap();
//!
//! let mut hit = None;
//! let mut on_collide = |_: &mut Tree, _: NodeId, c: &CollisionData| -> Result<(), SceneError> {
//!     hit = Some(c.hitbox);
//!     Ok(())
//! };
//! tree.move_x(player, 10.0, Some(&mut on_collide)).unwrap();
//!
//! assert_eq!(hit, Some(wall));
//! assert_eq!(tree.resolve(player).unwrap().position(), Point::new(4.0, 0.0));
//! ```

mod actor;
mod arena;
mod behavior;
mod camera;
mod collision;
mod config;
mod error;
mod hitbox;
pub mod math;
mod node;
mod registry;
mod solid;
mod state;
mod step;
mod tree;
mod types;

pub use actor::{ActorRules, Axis, Crushable};
pub use arena::Arena;
pub use behavior::{Behavior, DrawItem, DrawSink, Group, YSort};
pub use camera::Camera;
pub use collision::{CollisionData, OnCollide, SubscriptionId};
pub use config::{TreeConfig, WorldBounds};
pub use error::{ConfigError, SceneError};
pub use hitbox::Hitbox;
pub use node::Node;
pub use registry::Nodes;
pub use state::{Controller, State, StateMachine};
pub use step::{FixedStep, TickReport};
pub use tree::Tree;
pub use types::{Lifecycle, NodeFlags, NodeId, Tint};

pub use bramble_index::Aabb2D;
