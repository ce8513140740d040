// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Actors: hitboxes that move in whole units and stop at other hitboxes.
//!
//! Moves accumulate fractional amounts per axis and apply only the rounded whole
//! part. Each applied unit is checked against the candidates found by one broad-phase
//! query over the swept box; the first blocking hitbox ends the move and is reported.

use bramble_index::Aabb2D;
use kurbo::{Point, Vec2};

use crate::collision::{CollisionData, OnCollide, reborrow};
use crate::error::SceneError;
use crate::hitbox::ActorState;
use crate::tree::Tree;
use crate::types::NodeId;

/// Per-actor collision policy.
///
/// Attach with [`Node::with_actor_rules`](crate::Node::with_actor_rules). Actors
/// without rules use [`Crushable`].
pub trait ActorRules {
    /// Whether `actor` may be blocked by `other`. Consulted for every candidate.
    fn allow_collision(&self, tree: &Tree, actor: NodeId, other: NodeId) -> bool {
        let _ = (tree, actor, other);
        true
    }

    /// Called when a solid pushes `actor` into another hitbox.
    ///
    /// The default destroys the actor.
    fn squish(
        &self,
        tree: &mut Tree,
        actor: NodeId,
        collision: &CollisionData,
    ) -> Result<(), SceneError> {
        log::debug!("actor {actor} squished against {}", collision.hitbox);
        tree.destroy(actor);
        Ok(())
    }
}

/// Default rules: collide with everything, die when squished.
#[derive(Copy, Clone, Debug, Default)]
pub struct Crushable;

impl ActorRules for Crushable {}

/// One of the two movement axes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal.
    X,
    /// Vertical.
    Y,
}

impl Axis {
    /// A vector of length `amount` along this axis.
    pub fn vec(self, amount: f64) -> Vec2 {
        match self {
            Self::X => Vec2::new(amount, 0.0),
            Self::Y => Vec2::new(0.0, amount),
        }
    }

    pub(crate) fn of(self, v: Vec2) -> f64 {
        match self {
            Self::X => v.x,
            Self::Y => v.y,
        }
    }

    fn set(self, v: &mut Vec2, value: f64) {
        match self {
            Self::X => v.x = value,
            Self::Y => v.y = value,
        }
    }
}

/// The box swept by `aabb` moving `amount` whole units along `axis`.
fn sweep(aabb: Aabb2D<i64>, axis: Axis, amount: i64) -> Aabb2D<i64> {
    let moved = match axis {
        Axis::X => aabb.translate(amount, 0),
        Axis::Y => aabb.translate(0, amount),
    };
    aabb.union(&moved)
}

fn to_units(amount: f64) -> i64 {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "callers pass rounded per-step movement"
    )]
    let units = amount as i64;
    units
}

impl Tree {
    pub(crate) fn actor_state(&self, id: NodeId) -> Result<&ActorState, SceneError> {
        self.resolve(id)?
            .body
            .as_ref()
            .and_then(|b| b.actor())
            .ok_or(SceneError::NotAnActor { id })
    }

    fn actor_state_mut(&mut self, id: NodeId) -> Result<&mut ActorState, SceneError> {
        self.resolve_mut(id)?
            .body
            .as_mut()
            .and_then(|b| b.actor_mut())
            .ok_or(SceneError::NotAnActor { id })
    }

    /// Set whether an actor checks for other hitboxes at all. Actors that don't
    /// always complete their moves.
    pub fn set_collides_with_hitboxes(
        &mut self,
        actor: NodeId,
        collides: bool,
    ) -> Result<(), SceneError> {
        self.actor_state_mut(actor)?.collides_with_hitboxes = collides;
        Ok(())
    }

    /// Move an actor by a fractional amount, x axis first.
    pub fn move_actor(
        &mut self,
        actor: NodeId,
        amount: Vec2,
        mut on_collide: OnCollide<'_>,
    ) -> Result<(), SceneError> {
        self.move_x(actor, amount.x, reborrow(&mut on_collide))?;
        if self.is_alive(actor) {
            self.move_y(actor, amount.y, on_collide)?;
        }
        Ok(())
    }

    /// Accumulate a horizontal move and apply its whole-unit part.
    pub fn move_x(
        &mut self,
        actor: NodeId,
        amount: f64,
        on_collide: OnCollide<'_>,
    ) -> Result<(), SceneError> {
        self.move_accumulated(actor, Axis::X, amount, on_collide)
    }

    /// Accumulate a vertical move and apply its whole-unit part.
    pub fn move_y(
        &mut self,
        actor: NodeId,
        amount: f64,
        on_collide: OnCollide<'_>,
    ) -> Result<(), SceneError> {
        self.move_accumulated(actor, Axis::Y, amount, on_collide)
    }

    fn move_accumulated(
        &mut self,
        actor: NodeId,
        axis: Axis,
        amount: f64,
        on_collide: OnCollide<'_>,
    ) -> Result<(), SceneError> {
        let state = self.actor_state_mut(actor)?;
        let total = axis.of(state.remainder) + amount;
        let step = total.round_ties_even();
        axis.set(&mut state.remainder, total - step);
        if step == 0.0 {
            return Ok(());
        }
        self.move_exact(actor, axis, to_units(step), on_collide)
    }

    /// Move an actor exactly `amount` units horizontally, bypassing the accumulator.
    pub fn move_x_exact(
        &mut self,
        actor: NodeId,
        amount: i64,
        on_collide: OnCollide<'_>,
    ) -> Result<(), SceneError> {
        self.move_exact(actor, Axis::X, amount, on_collide)
    }

    /// Move an actor exactly `amount` units vertically, bypassing the accumulator.
    pub fn move_y_exact(
        &mut self,
        actor: NodeId,
        amount: i64,
        on_collide: OnCollide<'_>,
    ) -> Result<(), SceneError> {
        self.move_exact(actor, Axis::Y, amount, on_collide)
    }

    /// Move an actor exactly `amount` units along `axis`, one unit at a time.
    ///
    /// Stops before the first unit that would overlap a collidable hitbox the actor's
    /// rules allow. The remaining movement is discarded, listeners are notified, and
    /// then `on_collide` runs.
    pub fn move_exact(
        &mut self,
        actor: NodeId,
        axis: Axis,
        amount: i64,
        on_collide: OnCollide<'_>,
    ) -> Result<(), SceneError> {
        let collides = self.actor_state(actor)?.collides_with_hitboxes;
        if amount == 0 {
            return Ok(());
        }
        let full = amount as f64;
        if !collides {
            return self.translate(actor, axis.vec(full));
        }

        let swept = sweep(self.aabb(actor)?, axis, amount);
        let candidates: Vec<NodeId> = self
            .index
            .query_rect(swept)
            .filter_map(|k| self.id_at(k))
            .filter(|&c| c != actor && self.resolve(c).is_ok_and(|n| n.hitbox().is_some()))
            .collect();
        if candidates.is_empty() {
            return self.translate(actor, axis.vec(full));
        }

        let sign = amount.signum();
        let unit = axis.vec(sign as f64);
        let start = self.resolve(actor)?.position();
        let target = start + axis.vec(full);
        let mut moved = 0_i64;
        while moved != amount {
            let next = self.resolve(actor)?.position() + unit;
            if let Some(hitbox) = self.first_blocker(actor, next, &candidates)? {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "sign of an i64 is -1 or 1"
                )]
                let direction = sign as i32;
                let collision = CollisionData {
                    hitbox,
                    direction,
                    moved: axis.vec(moved as f64),
                    target,
                };
                log::trace!("actor {actor} blocked by {hitbox} after {moved} units");
                self.listeners.emit(actor, &collision);
                if let Some(callback) = on_collide {
                    callback(self, actor, &collision)?;
                }
                return Ok(());
            }
            self.set_position(actor, next)?;
            moved += sign;
        }
        Ok(())
    }

    /// Move an actor toward a local point by at most one unit per axis.
    pub fn move_toward(
        &mut self,
        actor: NodeId,
        target: Point,
        mut on_collide: OnCollide<'_>,
    ) -> Result<(), SceneError> {
        let delta = target - self.resolve(actor)?.position();
        let step = |d: f64| if d.abs() < 1.0 { 0 } else { to_units(d.signum()) };
        self.move_x_exact(actor, step(delta.x), reborrow(&mut on_collide))?;
        if self.is_alive(actor) {
            self.move_y_exact(actor, step(delta.y), on_collide)?;
        }
        Ok(())
    }

    /// The first hitbox `actor` would collide with at local `position`, searching the
    /// whole index.
    pub fn collide_at(&self, actor: NodeId, position: Point) -> Result<Option<NodeId>, SceneError> {
        let shifted = self.aabb_at(actor, position)?;
        let candidates: Vec<NodeId> = self
            .index
            .query_rect(shifted)
            .filter_map(|k| self.id_at(k))
            .filter(|&c| c != actor)
            .collect();
        self.first_blocker(actor, position, &candidates)
    }

    fn first_blocker(
        &self,
        actor: NodeId,
        position: Point,
        candidates: &[NodeId],
    ) -> Result<Option<NodeId>, SceneError> {
        let shifted = self.aabb_at(actor, position)?;
        let rules = &self.actor_state(actor)?.rules;
        for &other in candidates {
            let Ok(node) = self.resolve(other) else {
                continue;
            };
            if !node.hitbox().is_some_and(|h| h.collidable) {
                continue;
            }
            if !rules.allow_collision(self, actor, other) {
                continue;
            }
            if shifted.overlaps(&self.aabb(other)?) {
                return Ok(Some(other));
            }
        }
        Ok(None)
    }

    /// Whether `actor` is standing on `solid`: its box, one unit lower, overlaps the solid.
    pub fn is_attached(&self, actor: NodeId, solid: NodeId) -> Result<bool, SceneError> {
        let below = self.aabb(actor)?.translate(0, 1);
        Ok(below.overlaps(&self.aabb(solid)?))
    }
}
