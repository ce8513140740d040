// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public `Index` API and generic implementation over a pluggable backend.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::backend::{Backend, Query};
use crate::backends::flatvec::FlatVec;
use crate::backends::quadtree::QuadTree;
use crate::damage::Damage;
use crate::types::{Aabb2D, Scalar};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Mark {
    Added,
    Updated,
    Removed,
}

#[derive(Clone, Debug)]
struct Entry<T> {
    aabb: Aabb2D<T>,
    // Present while removed-but-uncommitted so damage can report it.
    live: bool,
    mark: Option<Mark>,
    prev_aabb: Option<Aabb2D<T>>, // for moved damage
}

/// A keyed AABB index parameterized by a spatial backend.
///
/// Keys are small integers chosen by the caller (typically an arena slot index).
/// The key space grows on demand; [`set_capacity_at_least`](Self::set_capacity_at_least)
/// reserves it up front. Backend state is updated eagerly, so queries always see the
/// latest boxes; [`commit`](Self::commit) only reports damage and compacts.
#[derive(Debug)]
pub struct IndexGeneric<T: Copy + PartialOrd + Debug, B: Backend<T>> {
    entries: Vec<Option<Entry<T>>>,
    len: usize,
    backend: B,
}

impl<T, B> IndexGeneric<T, B>
where
    T: Copy + PartialOrd + Debug,
    B: Backend<T> + Default,
{
    /// Create an empty index using the backend's default constructor.
    pub fn new() -> Self {
        Self::with_backend(B::default())
    }
}

impl<T, B> IndexGeneric<T, B>
where
    T: Copy + PartialOrd + Debug,
    B: Backend<T>,
{
    /// Create an empty index over an explicit backend.
    pub fn with_backend(backend: B) -> Self {
        Self {
            entries: Vec::new(),
            len: 0,
            backend,
        }
    }

    /// Borrow the backend, e.g. for inspection in tests.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Number of keys the index can hold without growing.
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Grow the key space so that every key `< n` is addressable.
    pub fn set_capacity_at_least(&mut self, n: usize) {
        if self.entries.len() < n {
            self.entries.resize_with(n, || None);
        }
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if no key is live.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert `key` with `aabb`, or move it if already present.
    pub fn insert_or_update(&mut self, key: usize, aabb: Aabb2D<T>) {
        self.set_capacity_at_least(key + 1);
        let slot = &mut self.entries[key];
        match slot {
            Some(e) if e.live => {
                if e.mark.is_none() {
                    e.prev_aabb = Some(e.aabb);
                }
                e.aabb = aabb;
                if e.mark != Some(Mark::Added) {
                    e.mark = Some(Mark::Updated);
                }
                self.backend.set(key, aabb);
            }
            Some(e) => {
                // Removed since the last commit and now back: report as a move.
                e.live = true;
                e.aabb = aabb;
                e.mark = Some(Mark::Updated);
                self.len += 1;
                self.backend.set(key, aabb);
            }
            None => {
                *slot = Some(Entry {
                    aabb,
                    live: true,
                    mark: Some(Mark::Added),
                    prev_aabb: None,
                });
                self.len += 1;
                self.backend.set(key, aabb);
            }
        }
    }

    /// Remove `key`. Returns `false` if it was not present.
    pub fn remove(&mut self, key: usize) -> bool {
        let Some(slot) = self.entries.get_mut(key) else {
            return false;
        };
        match slot {
            Some(e) if e.live => {
                self.backend.unset(key);
                self.len -= 1;
                if e.mark == Some(Mark::Added) {
                    *slot = None;
                } else {
                    if e.mark.is_none() {
                        e.prev_aabb = Some(e.aabb);
                    }
                    e.live = false;
                    e.mark = Some(Mark::Removed);
                }
                true
            }
            _ => false,
        }
    }

    /// Whether `key` is live in the index.
    pub fn contains(&self, key: usize) -> bool {
        matches!(self.entries.get(key), Some(Some(e)) if e.live)
    }

    /// Current box for `key`, if live.
    pub fn get(&self, key: usize) -> Option<Aabb2D<T>> {
        match self.entries.get(key) {
            Some(Some(e)) if e.live => Some(e.aabb),
            _ => None,
        }
    }

    /// Clear the index (without reporting damage).
    pub fn clear(&mut self) {
        self.entries.clear();
        self.len = 0;
        self.backend.clear();
    }

    /// Compute batched damage since the previous commit without compacting.
    pub fn commit(&mut self) -> Damage<T> {
        let mut dmg = Damage::default();
        for slot in &mut self.entries {
            let Some(entry) = slot.as_mut() else {
                continue;
            };
            match entry.mark.take() {
                Some(Mark::Added) => dmg.added.push(entry.aabb),
                Some(Mark::Removed) => {
                    dmg.removed.push(entry.prev_aabb.unwrap_or(entry.aabb));
                    *slot = None;
                }
                Some(Mark::Updated) => {
                    if let Some(prev) = entry.prev_aabb.take() {
                        if prev != entry.aabb {
                            dmg.moved.push((prev, entry.aabb));
                        }
                    } else {
                        dmg.added.push(entry.aabb);
                    }
                }
                None => {}
            }
        }
        dmg
    }

    /// [`commit`](Self::commit), then let the backend compact itself.
    pub fn commit_and_optimize(&mut self) -> Damage<T> {
        let dmg = self.commit();
        self.backend.optimize();
        dmg
    }

    /// Live keys answering `query`, in ascending key order.
    pub fn query(&self, query: Query<T>) -> Vec<usize> {
        let mut keys = Vec::new();
        self.backend.visit(query, &mut |k| {
            if self.contains(k) {
                keys.push(k);
            }
        });
        keys
    }

    /// Keys whose AABB contains the point, in ascending key order.
    pub fn query_point(&self, x: T, y: T) -> impl Iterator<Item = usize> {
        self.query(Query::Point { x, y }).into_iter()
    }

    /// Keys whose AABB intersects the rectangle (edges inclusive).
    ///
    /// Results are candidates: callers needing exact overlap should re-check.
    pub fn query_rect(&self, rect: Aabb2D<T>) -> impl Iterator<Item = usize> {
        self.query(Query::Rect(rect)).into_iter()
    }
}

/// Default index using a flat vector backend.
pub type Index<T> = IndexGeneric<T, FlatVec<T>>;

impl<T: Copy + PartialOrd + Debug> Default for Index<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> Index<T> {
    /// Create a quadtree-backed index covering `world`.
    pub fn with_quadtree(
        world: Aabb2D<T>,
        split_threshold: usize,
        max_depth: u8,
    ) -> IndexGeneric<T, QuadTree<T>> {
        IndexGeneric::with_backend(QuadTree::new(world, split_threshold, max_depth))
    }
}
