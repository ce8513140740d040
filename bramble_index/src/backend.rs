// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The seam between [`IndexGeneric`](crate::IndexGeneric) and its spatial structure.
//!
//! The index owns keys, liveness, and damage. A backend only stores one box per slot
//! and answers [`Query`]s; it never sees a slot it was not given with [`Backend::set`].

use core::fmt::Debug;

use crate::types::Aabb2D;

/// A broad-phase question: which stored boxes touch this point or rectangle?
///
/// Both forms are closed, so a box touching the query on an edge is a hit.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Query<T> {
    /// Boxes containing the point.
    Point {
        /// Point x.
        x: T,
        /// Point y.
        y: T,
    },
    /// Boxes intersecting the rectangle.
    Rect(Aabb2D<T>),
}

impl<T: Copy + PartialOrd> Query<T> {
    /// Whether `aabb` answers the query.
    pub fn hits(&self, aabb: &Aabb2D<T>) -> bool {
        match *self {
            Self::Point { x, y } => aabb.contains_point(x, y),
            Self::Rect(rect) => !aabb.intersect(&rect).is_empty(),
        }
    }
}

/// Spatial structure behind an index.
pub trait Backend<T: Copy + PartialOrd + Debug> {
    /// Store `aabb` for `slot`, replacing any box it already had.
    fn set(&mut self, slot: usize, aabb: Aabb2D<T>);

    /// Forget `slot`. Slots that hold nothing are ignored.
    fn unset(&mut self, slot: usize);

    /// Forget every slot.
    fn clear(&mut self);

    /// Call `hit` once for each slot whose box answers `query`, in ascending slot order.
    fn visit(&self, query: Query<T>, hit: &mut dyn FnMut(usize));

    /// Reclaim space after a batch of changes. Results of `visit` must not change.
    fn optimize(&mut self) {}
}
