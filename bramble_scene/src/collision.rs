// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collision reports and subscriptions.

use kurbo::{Point, Vec2};

use crate::error::SceneError;
use crate::tree::Tree;
use crate::types::NodeId;

/// What an actor ran into while stepping along one axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CollisionData {
    /// The hitbox that blocked the move.
    pub hitbox: NodeId,
    /// Sign of the attempted move along the blocked axis: `-1` or `1`.
    pub direction: i32,
    /// Displacement actually applied before blocking. The other axis is zero.
    pub moved: Vec2,
    /// Local position the actor would have reached unobstructed.
    pub target: Point,
}

/// Optional per-call collision callback for actor moves.
///
/// The callback runs after the actor has stopped and may mutate the tree, including
/// destroying the actor itself.
pub type OnCollide<'a> =
    Option<&'a mut dyn FnMut(&mut Tree, NodeId, &CollisionData) -> Result<(), SceneError>>;

/// Reborrow a callback for one of several moves made with it.
pub(crate) fn reborrow<'s>(on_collide: &'s mut OnCollide<'_>) -> OnCollide<'s> {
    match on_collide {
        Some(f) => Some(&mut **f),
        None => None,
    }
}

/// Handle returned by [`Tree::subscribe_collisions`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);

pub(crate) type CollisionListener = Box<dyn FnMut(NodeId, &CollisionData)>;

/// Collision listeners, notified of every blocked actor step in subscription order.
#[derive(Default)]
pub(crate) struct Listeners {
    next: u64,
    entries: Vec<(SubscriptionId, CollisionListener)>,
}

impl core::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Listeners")
            .field("next", &self.next)
            .field("count", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl Listeners {
    pub(crate) fn subscribe(&mut self, listener: CollisionListener) -> SubscriptionId {
        let id = SubscriptionId(self.next);
        self.next += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(sub, _)| *sub != id);
        self.entries.len() != before
    }

    pub(crate) fn emit(&mut self, actor: NodeId, collision: &CollisionData) {
        for (_, listener) in &mut self.entries {
            listener(actor, collision);
        }
    }
}

impl Tree {
    /// Observe every collision any actor reports, in addition to per-call callbacks.
    ///
    /// Listeners see the tree's events but cannot mutate the tree; use the
    /// [`OnCollide`] callback of a move for reactions that need it.
    pub fn subscribe_collisions(
        &mut self,
        listener: impl FnMut(NodeId, &CollisionData) + 'static,
    ) -> SubscriptionId {
        self.listeners.subscribe(Box::new(listener))
    }

    /// Stop a listener. Returns `false` if it was already removed.
    pub fn unsubscribe_collisions(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }
}
