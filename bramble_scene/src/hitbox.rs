// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hitboxes and the collision bodies built on them.

use std::rc::Rc;

use bramble_index::Aabb2D;
use kurbo::{Affine, Vec2};

use crate::actor::{ActorRules, Crushable};
use crate::math::{scale_of, snap, translation_of};

/// Rectangle attached to a node for collision.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Hitbox {
    /// Offset of the box center from the node's global position. Not scaled.
    pub offset: Vec2,
    /// Unscaled size. The node's global scale stretches it.
    pub size: Vec2,
    /// Whether other actors can collide with this hitbox.
    pub collidable: bool,
}

impl Hitbox {
    /// A collidable hitbox.
    pub fn new(offset: Vec2, size: Vec2) -> Self {
        Self {
            offset,
            size,
            collidable: true,
        }
    }

    /// Integer world box for a node with the given global transform.
    ///
    /// The box is centered on the global position plus the offset, with the size
    /// scaled by the global scale. Both corner and size are snapped to integers.
    pub fn aabb(&self, global: Affine) -> Aabb2D<i64> {
        let position = translation_of(global);
        let scale = scale_of(global);
        let w = self.size.x * scale.x;
        let h = self.size.y * scale.y;
        Aabb2D::from_xywh(
            snap(self.offset.x + position.x - w * 0.5),
            snap(self.offset.y + position.y - h * 0.5),
            snap(w),
            snap(h),
        )
    }
}

/// Zero-size box at the snapped global position, used for nodes without a hitbox.
pub(crate) fn point_aabb(global: Affine) -> Aabb2D<i64> {
    let position = translation_of(global);
    let (x, y) = (snap(position.x), snap(position.y));
    Aabb2D::new(x, y, x, y)
}

#[derive(Clone)]
pub(crate) struct ActorState {
    pub(crate) remainder: Vec2,
    pub(crate) collides_with_hitboxes: bool,
    pub(crate) rules: Rc<dyn ActorRules>,
}

impl Default for ActorState {
    fn default() -> Self {
        Self {
            remainder: Vec2::ZERO,
            collides_with_hitboxes: true,
            rules: Rc::new(Crushable),
        }
    }
}

impl core::fmt::Debug for ActorState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ActorState")
            .field("remainder", &self.remainder)
            .field("collides_with_hitboxes", &self.collides_with_hitboxes)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct SolidState {
    pub(crate) remainder: Vec2,
}

#[derive(Clone, Debug)]
pub(crate) enum BodyKind {
    Hitbox,
    Actor(ActorState),
    Solid(SolidState),
}

/// A hitbox plus the role it plays in the move engine.
#[derive(Clone, Debug)]
pub(crate) struct Body {
    pub(crate) hitbox: Hitbox,
    pub(crate) kind: BodyKind,
}

impl Body {
    pub(crate) fn actor(&self) -> Option<&ActorState> {
        match &self.kind {
            BodyKind::Actor(state) => Some(state),
            _ => None,
        }
    }

    pub(crate) fn actor_mut(&mut self) -> Option<&mut ActorState> {
        match &mut self.kind {
            BodyKind::Actor(state) => Some(state),
            _ => None,
        }
    }

    pub(crate) fn solid_mut(&mut self) -> Option<&mut SolidState> {
        match &mut self.kind {
            BodyKind::Solid(state) => Some(state),
            _ => None,
        }
    }

    pub(crate) fn is_solid(&self) -> bool {
        matches!(self.kind, BodyKind::Solid(_))
    }
}
