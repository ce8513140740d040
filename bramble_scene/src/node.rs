// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node data: local state, cached global state, and the builder used to attach nodes.

use core::any::{TypeId, type_name};
use std::rc::Rc;

use kurbo::{Affine, Point, Vec2};

use crate::actor::ActorRules;
use crate::behavior::{Behavior, Group};
use crate::hitbox::{ActorState, Body, BodyKind, Hitbox, SolidState};
use crate::math::{compose, rotation_of, scale_of, translation_of};
use crate::types::{Lifecycle, NodeFlags, NodeId, Tint};

/// Local state set by callers.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Local {
    pub(crate) position: Point,
    pub(crate) scale: Vec2,
    pub(crate) rotation: f64,
    pub(crate) depth: f64,
    pub(crate) tint: Tint,
}

impl Default for Local {
    fn default() -> Self {
        Self {
            position: Point::ORIGIN,
            scale: Vec2::new(1.0, 1.0),
            rotation: 0.0,
            depth: 0.0,
            tint: Tint::WHITE,
        }
    }
}

/// Global state derived from the ancestors' local state.
#[derive(Clone, Copy, Debug)]
pub(crate) struct World {
    pub(crate) local_transform: Affine,
    pub(crate) transform: Affine,
    pub(crate) depth: f64,
    pub(crate) tint: Tint,
}

impl Default for World {
    fn default() -> Self {
        Self {
            local_transform: Affine::IDENTITY,
            transform: Affine::IDENTITY,
            depth: 0.0,
            tint: Tint::WHITE,
        }
    }
}

/// Which parts of the local transform changed since the cache was built.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Dirty {
    pub(crate) position: bool,
    pub(crate) scale: bool,
    pub(crate) rotation: bool,
}

impl Dirty {
    const ALL: Self = Self {
        position: true,
        scale: true,
        rotation: true,
    };

    fn any(self) -> bool {
        self.position || self.scale || self.rotation
    }
}

/// A scene node.
///
/// Build one with [`Node::new`] and the `with_*` methods, then attach it with
/// [`Tree::add_child`](crate::Tree::add_child) or [`Tree::set_scene`](crate::Tree::set_scene).
/// Once attached, read it through [`Tree::resolve`](crate::Tree::resolve) and change it
/// through the `Tree` setters so that global state stays in sync.
pub struct Node {
    pub(crate) name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) local: Local,
    pub(crate) world: World,
    pub(crate) dirty: Dirty,
    pub(crate) flags: NodeFlags,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) active: bool,
    pub(crate) body: Option<Body>,
    pub(crate) behavior: Option<Box<dyn Behavior>>,
    pub(crate) kind: TypeId,
    pub(crate) kind_name: &'static str,
}

impl core::fmt::Debug for Node {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("kind", &self.kind_name)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("local", &self.local)
            .field("flags", &self.flags)
            .field("lifecycle", &self.lifecycle)
            .field("active", &self.active)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new(Group)
    }
}

/// Last path segment of a type name, used as the default node name.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

impl Node {
    /// A node driven by `behavior`, named after the behavior's type.
    pub fn new<B: Behavior>(behavior: B) -> Self {
        Self {
            name: short_type_name::<B>().to_owned(),
            parent: None,
            children: Vec::new(),
            local: Local::default(),
            world: World::default(),
            dirty: Dirty::ALL,
            flags: NodeFlags::default(),
            lifecycle: Lifecycle::empty(),
            active: false,
            body: None,
            behavior: Some(Box::new(behavior)),
            kind: TypeId::of::<B>(),
            kind_name: type_name::<B>(),
        }
    }

    /// A plain grouping node.
    pub fn group(name: impl Into<String>) -> Self {
        Self::new(Group).with_name(name)
    }

    /// Set the name used by named lookups.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the local position.
    #[must_use]
    pub fn with_position(mut self, position: Point) -> Self {
        self.local.position = position;
        self
    }

    /// Set the local scale.
    #[must_use]
    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.local.scale = scale;
        self
    }

    /// Set the local rotation in radians.
    #[must_use]
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.local.rotation = rotation;
        self
    }

    /// Set the local depth.
    #[must_use]
    pub fn with_depth(mut self, depth: f64) -> Self {
        self.local.depth = depth;
        self
    }

    /// Set the local tint.
    #[must_use]
    pub fn with_tint(mut self, tint: Tint) -> Self {
        self.local.tint = tint;
        self
    }

    /// Whether the node is registered in the spatial index.
    #[must_use]
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Replace all flags.
    #[must_use]
    pub fn with_flags(mut self, flags: NodeFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Give the node a plain hitbox. Hitbox nodes start active.
    #[must_use]
    pub fn with_hitbox(mut self, offset: Vec2, size: Vec2) -> Self {
        self.body = Some(Body {
            hitbox: Hitbox::new(offset, size),
            kind: BodyKind::Hitbox,
        });
        self.active = true;
        self
    }

    /// Make the node an actor: a hitbox that moves in whole units and is blocked by
    /// other hitboxes.
    #[must_use]
    pub fn as_actor(mut self, offset: Vec2, size: Vec2) -> Self {
        self.body = Some(Body {
            hitbox: Hitbox::new(offset, size),
            kind: BodyKind::Actor(ActorState::default()),
        });
        self.active = true;
        self
    }

    /// Replace an actor's collision filter and squish reaction. Ignored for non-actors.
    #[must_use]
    pub fn with_actor_rules(mut self, rules: impl ActorRules + 'static) -> Self {
        if let Some(actor) = self.body.as_mut().and_then(Body::actor_mut) {
            actor.rules = Rc::new(rules);
        }
        self
    }

    /// Make the node a solid: a hitbox that moves without being blocked and pushes or
    /// carries actors.
    #[must_use]
    pub fn as_solid(mut self, offset: Vec2, size: Vec2) -> Self {
        self.body = Some(Body {
            hitbox: Hitbox::new(offset, size),
            kind: BodyKind::Solid(SolidState::default()),
        });
        self.active = true;
        self
    }

    /// Set whether the node survives its parent's [`Tree::reset_children`](crate::Tree::reset_children).
    #[must_use]
    pub fn persistent(mut self, persistent: bool) -> Self {
        self.flags.set(NodeFlags::PERSISTENT, persistent);
        self
    }

    pub(crate) fn refresh_local_transform(&mut self) {
        if self.dirty.any() {
            self.world.local_transform =
                compose(self.local.position, self.local.rotation, self.local.scale);
            self.dirty = Dirty::default();
        }
    }

    // --- accessors ---

    /// The node's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full type name of the node's behavior.
    pub fn kind_name(&self) -> &'static str {
        self.kind_name
    }

    /// Parent handle, `None` for the scene root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in attach order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Local position.
    pub fn position(&self) -> Point {
        self.local.position
    }

    /// Local scale.
    pub fn scale(&self) -> Vec2 {
        self.local.scale
    }

    /// Local rotation in radians.
    pub fn rotation(&self) -> f64 {
        self.local.rotation
    }

    /// Local depth.
    pub fn depth(&self) -> f64 {
        self.local.depth
    }

    /// Local tint.
    pub fn tint(&self) -> Tint {
        self.local.tint
    }

    /// Cached local transform.
    pub fn local_transform(&self) -> Affine {
        self.world.local_transform
    }

    /// Parent's global transform times the local transform.
    pub fn global_transform(&self) -> Affine {
        self.world.transform
    }

    /// Global position.
    pub fn global_position(&self) -> Point {
        translation_of(self.world.transform)
    }

    /// Global scale.
    pub fn global_scale(&self) -> Vec2 {
        scale_of(self.world.transform)
    }

    /// Global rotation in radians.
    pub fn global_rotation(&self) -> f64 {
        rotation_of(self.world.transform)
    }

    /// Local depth divided by camera zoom, plus the parent's global depth.
    pub fn global_depth(&self) -> f64 {
        self.world.depth
    }

    /// Local tint multiplied by the parent's global tint.
    pub fn global_tint(&self) -> Tint {
        self.world.tint
    }

    /// Traversal flags.
    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    /// Lifecycle progress.
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Whether the node is registered in the spatial index.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The node's hitbox, if it has one.
    pub fn hitbox(&self) -> Option<&Hitbox> {
        self.body.as_ref().map(|b| &b.hitbox)
    }

    /// Whether the node is an actor.
    pub fn is_actor(&self) -> bool {
        self.body.as_ref().and_then(Body::actor).is_some()
    }

    /// Whether the node is a solid.
    pub fn is_solid(&self) -> bool {
        self.body.as_ref().is_some_and(Body::is_solid)
    }

    /// Sub-unit movement an actor or solid has accumulated but not yet applied.
    pub fn remainder(&self) -> Option<Vec2> {
        match &self.body.as_ref()?.kind {
            BodyKind::Actor(a) => Some(a.remainder),
            BodyKind::Solid(s) => Some(s.remainder),
            BodyKind::Hitbox => None,
        }
    }
}
