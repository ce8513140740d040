// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Solids: hitboxes that move without being blocked and push or carry actors.

use kurbo::Vec2;

use crate::actor::Axis;
use crate::collision::CollisionData;
use crate::error::SceneError;
use crate::hitbox::SolidState;
use crate::tree::Tree;
use crate::types::NodeId;

impl Tree {
    fn solid_state_mut(&mut self, id: NodeId) -> Result<&mut SolidState, SceneError> {
        self.resolve_mut(id)?
            .body
            .as_mut()
            .and_then(|b| b.solid_mut())
            .ok_or(SceneError::NotASolid { id })
    }

    /// Live actors standing on `solid`, in actor order.
    pub fn attached_actors(&self, solid: NodeId) -> Result<Vec<NodeId>, SceneError> {
        let mut out = Vec::new();
        for &actor in &self.actors {
            if self.is_alive(actor) && self.is_attached(actor, solid)? {
                out.push(actor);
            }
        }
        Ok(out)
    }

    /// Accumulate a fractional move and apply its whole-unit part.
    pub fn move_solid(&mut self, solid: NodeId, amount: Vec2) -> Result<(), SceneError> {
        let state = self.solid_state_mut(solid)?;
        let total = state.remainder + amount;
        let step = Vec2::new(total.x.round_ties_even(), total.y.round_ties_even());
        state.remainder = total - step;
        #[allow(
            clippy::cast_possible_truncation,
            reason = "rounded per-step movement"
        )]
        let (dx, dy) = (step.x as i64, step.y as i64);
        self.move_solid_exact(solid, dx, dy)
    }

    /// Move a solid by whole units, x then y.
    ///
    /// Riders are snapshotted before moving. While the solid moves it is not
    /// collidable. On each axis, every actor the solid now overlaps is pushed out by
    /// exactly the overlap, and squished if the push is blocked; every other rider is
    /// carried by the full amount without a blocking check, so a ride never reports
    /// a collision.
    pub fn move_solid_exact(&mut self, solid: NodeId, dx: i64, dy: i64) -> Result<(), SceneError> {
        self.solid_state_mut(solid)?;
        if dx == 0 && dy == 0 {
            return Ok(());
        }
        let riders = self.attached_actors(solid)?;
        self.set_collidable(solid, false)?;
        let result = self
            .move_solid_axis(solid, Axis::X, dx, &riders)
            .and_then(|()| self.move_solid_axis(solid, Axis::Y, dy, &riders));
        if self.is_alive(solid) {
            self.set_collidable(solid, true)?;
        }
        result
    }

    fn move_solid_axis(
        &mut self,
        solid: NodeId,
        axis: Axis,
        amount: i64,
        riders: &[NodeId],
    ) -> Result<(), SceneError> {
        if amount == 0 || !self.is_alive(solid) {
            return Ok(());
        }
        self.translate(solid, axis.vec(amount as f64))?;
        for actor in self.actors.clone() {
            if !self.is_alive(actor) || !self.is_alive(solid) {
                continue;
            }
            let bounds = self.aabb(solid)?;
            let body = self.aabb(actor)?;
            if bounds.overlaps(&body) {
                let push = match (axis, amount > 0) {
                    (Axis::X, true) => bounds.max_x - body.min_x,
                    (Axis::X, false) => bounds.min_x - body.max_x,
                    (Axis::Y, true) => bounds.max_y - body.min_y,
                    (Axis::Y, false) => bounds.min_y - body.max_y,
                };
                let rules = self.actor_state(actor)?.rules.clone();
                let mut squish = |tree: &mut Self, actor: NodeId, collision: &CollisionData| {
                    rules.squish(tree, actor, collision)
                };
                log::trace!("solid {solid} pushes {actor} by {push} on {axis:?}");
                self.move_exact(actor, axis, push, Some(&mut squish))?;
            } else if riders.contains(&actor) {
                log::trace!("solid {solid} carries {actor} by {amount} on {axis:?}");
                self.translate(actor, axis.vec(amount as f64))?;
            }
        }
        Ok(())
    }
}
