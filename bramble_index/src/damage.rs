// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Boxes that changed between two commits.

use alloc::vec::Vec;

use crate::types::{Aabb2D, Scalar, union_aabb};

/// What changed in an index since the previous [`commit`](crate::IndexGeneric::commit).
///
/// A key inserted and removed within one batch appears in neither list. A key
/// updated several times appears at most once in `moved`, from its committed box
/// to its latest one, and not at all if it ended where it started.
#[derive(Clone, Debug, PartialEq)]
pub struct Damage<T> {
    /// Boxes of keys that were not present at the previous commit.
    pub added: Vec<Aabb2D<T>>,
    /// Last committed boxes of keys that are now gone.
    pub removed: Vec<Aabb2D<T>>,
    /// `(before, after)` for keys whose box changed.
    pub moved: Vec<(Aabb2D<T>, Aabb2D<T>)>,
}

impl<T> Default for Damage<T> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            removed: Vec::new(),
            moved: Vec::new(),
        }
    }
}

impl<T: Copy + PartialOrd> Damage<T> {
    /// Whether nothing changed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of changed keys.
    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len() + self.moved.len()
    }

    /// Every box that needs repainting: added, removed, and both ends of a move.
    pub fn rects(&self) -> impl Iterator<Item = Aabb2D<T>> + '_ {
        let moved = self.moved.iter().flat_map(|&(before, after)| [before, after]);
        self.added
            .iter()
            .chain(&self.removed)
            .copied()
            .chain(moved)
    }

    /// Smallest box covering [`rects`](Self::rects), or `None` when empty.
    pub fn union(&self) -> Option<Aabb2D<T>> {
        self.rects().reduce(union_aabb)
    }

    /// Append another batch, for callers that commit more than once per frame.
    pub fn merge(&mut self, other: Self) {
        self.added.extend(other.added);
        self.removed.extend(other.removed);
        self.moved.extend(other.moved);
    }
}

impl<T: Scalar> Damage<T> {
    /// Whether any changed box touches `view`, e.g. a camera's visible rectangle.
    pub fn touches(&self, view: Aabb2D<T>) -> bool {
        self.rects().any(|r| !r.intersect(&view).is_empty())
    }
}
