// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Region quadtree backend generic over scalar `T: Scalar`.
//!
//! The root covers a fixed world region. A node splits into four quadrants once it
//! holds more than `split_threshold` boxes, up to `max_depth` levels. A box is stored
//! at the deepest node whose region fully contains it, so boxes straddling a split
//! line (or lying outside the world region) stay higher up. Queries walk only the
//! nodes whose region touches the query and return slots in ascending order.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::backend::{Backend, Query};
use crate::types::{Aabb2D, Scalar};

/// Quadtree backend over a bounded region.
pub struct QuadTree<T: Scalar> {
    bounds: Aabb2D<T>,
    split_threshold: usize,
    max_depth: u8,
    nodes: Vec<QuadNode<T>>,
    slots: Vec<Option<Placed<T>>>,
}

/// Quadtree over `i64` coordinates.
pub type QuadTreeI64 = QuadTree<i64>;
/// Quadtree over `f64` coordinates.
pub type QuadTreeF64 = QuadTree<f64>;

#[derive(Clone, Debug)]
struct QuadNode<T> {
    bounds: Aabb2D<T>,
    depth: u8,
    items: Vec<usize>,
    children: Option<[usize; 4]>,
}

impl<T> QuadNode<T> {
    fn new(bounds: Aabb2D<T>, depth: u8) -> Self {
        Self {
            bounds,
            depth,
            items: Vec::new(),
            children: None,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Placed<T> {
    aabb: Aabb2D<T>,
    node: usize,
}

impl<T: Scalar> QuadTree<T> {
    /// Create a quadtree covering `bounds`.
    ///
    /// `split_threshold` is the number of boxes a leaf may hold before it splits;
    /// `max_depth` bounds how many times the region may be subdivided.
    pub fn new(bounds: Aabb2D<T>, split_threshold: usize, max_depth: u8) -> Self {
        Self {
            bounds,
            split_threshold: split_threshold.max(1),
            max_depth,
            nodes: vec![QuadNode::new(bounds, 0)],
            slots: Vec::new(),
        }
    }

    /// The region covered by the root node.
    pub fn bounds(&self) -> Aabb2D<T> {
        self.bounds
    }

    /// Number of tree nodes currently allocated (including the root).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Depth of the deepest node.
    pub fn depth(&self) -> u8 {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    fn place(&mut self, slot: usize, aabb: Aabb2D<T>) {
        let mut n = 0;
        while let Some(children) = self.nodes[n].children {
            match children
                .iter()
                .copied()
                .find(|&c| self.nodes[c].bounds.contains(&aabb))
            {
                Some(c) => n = c,
                None => break,
            }
        }
        self.nodes[n].items.push(slot);
        self.slots[slot] = Some(Placed { aabb, node: n });
        self.maybe_split(n);
    }

    fn unplace(&mut self, slot: usize) -> Option<Placed<T>> {
        let placed = self.slots.get_mut(slot)?.take()?;
        let items = &mut self.nodes[placed.node].items;
        if let Some(pos) = items.iter().position(|&s| s == slot) {
            items.swap_remove(pos);
        }
        Some(placed)
    }

    fn maybe_split(&mut self, n: usize) {
        let node = &self.nodes[n];
        if node.children.is_some()
            || node.items.len() <= self.split_threshold
            || node.depth >= self.max_depth
        {
            return;
        }
        let b = node.bounds;
        let depth = node.depth + 1;
        let mx = T::mid(b.min_x, b.max_x);
        let my = T::mid(b.min_y, b.max_y);
        let quads = [
            Aabb2D::new(b.min_x, b.min_y, mx, my),
            Aabb2D::new(mx, b.min_y, b.max_x, my),
            Aabb2D::new(b.min_x, my, mx, b.max_y),
            Aabb2D::new(mx, my, b.max_x, b.max_y),
        ];
        let first = self.nodes.len();
        for q in quads {
            self.nodes.push(QuadNode::new(q, depth));
        }
        let children = [first, first + 1, first + 2, first + 3];
        self.nodes[n].children = Some(children);

        let items = core::mem::take(&mut self.nodes[n].items);
        for slot in items {
            let Some(placed) = self.slots[slot] else {
                continue;
            };
            let target = children
                .iter()
                .copied()
                .find(|&c| self.nodes[c].bounds.contains(&placed.aabb))
                .unwrap_or(n);
            self.nodes[target].items.push(slot);
            self.slots[slot] = Some(Placed {
                aabb: placed.aabb,
                node: target,
            });
        }
        for c in children {
            self.maybe_split(c);
        }
    }

    /// Slots answering `query`, sorted. Only nodes whose region the query touches
    /// are entered.
    fn collect(&self, query: Query<T>) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack = vec![0_usize];
        while let Some(n) = stack.pop() {
            let node = &self.nodes[n];
            for &slot in &node.items {
                if let Some(Some(placed)) = self.slots.get(slot)
                    && query.hits(&placed.aabb)
                {
                    out.push(slot);
                }
            }
            if let Some(children) = node.children {
                for c in children {
                    if query.hits(&self.nodes[c].bounds) {
                        stack.push(c);
                    }
                }
            }
        }
        out.sort_unstable();
        out
    }
}

impl<T: Scalar> Debug for QuadTree<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let alive = self.slots.iter().filter(|s| s.is_some()).count();
        f.debug_struct("QuadTree")
            .field("bounds", &self.bounds)
            .field("split_threshold", &self.split_threshold)
            .field("max_depth", &self.max_depth)
            .field("nodes", &self.nodes.len())
            .field("alive", &alive)
            .finish_non_exhaustive()
    }
}

impl<T: Scalar> Backend<T> for QuadTree<T> {
    fn set(&mut self, slot: usize, aabb: Aabb2D<T>) {
        if self.slots.len() <= slot {
            self.slots.resize_with(slot + 1, || None);
        }
        let _ = self.unplace(slot);
        self.place(slot, aabb);
    }

    fn unset(&mut self, slot: usize) {
        let _ = self.unplace(slot);
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(QuadNode::new(self.bounds, 0));
        self.slots.clear();
    }

    fn visit(&self, query: Query<T>, hit: &mut dyn FnMut(usize)) {
        self.collect(query).into_iter().for_each(hit);
    }

    /// Rebuild from the live boxes, dropping subdivisions that are no longer needed.
    fn optimize(&mut self) {
        let live: Vec<(usize, Aabb2D<T>)> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.map(|p| (i, p.aabb)))
            .collect();
        let len = live.last().map_or(0, |(i, _)| i + 1);
        self.nodes.clear();
        self.nodes.push(QuadNode::new(self.bounds, 0));
        self.slots.clear();
        self.slots.resize_with(len, || None);
        for (slot, aabb) in live {
            self.place(slot, aabb);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn world() -> QuadTreeI64 {
        QuadTree::new(Aabb2D::new(0, 0, 1024, 1024), 2, 6)
    }

    fn hits(qt: &QuadTreeI64, query: Query<i64>) -> Vec<usize> {
        let mut out = Vec::new();
        qt.visit(query, &mut |slot| out.push(slot));
        out
    }

    fn at(x: i64, y: i64) -> Query<i64> {
        Query::Point { x, y }
    }

    #[test]
    fn splits_past_threshold_and_still_finds_everything() {
        let mut qt = world();
        for i in 0..16_i64 {
            qt.set(i as usize, Aabb2D::from_xywh(i * 60, i * 60, 10, 10));
        }
        assert!(qt.node_count() > 1, "tree should have subdivided");
        let all = hits(&qt, Query::Rect(Aabb2D::new(0, 0, 1024, 1024)));
        assert_eq!(all, (0..16).collect::<Vec<_>>());
        assert_eq!(hits(&qt, at(65, 65)), [1]);
    }

    #[test]
    fn straddling_box_stays_at_parent() {
        let mut qt = world();
        for i in 0..3 {
            qt.set(i, Aabb2D::from_xywh(10 + i as i64, 10, 5, 5));
        }
        // Crosses the vertical split at x = 512.
        qt.set(10, Aabb2D::new(500, 100, 520, 110));
        assert_eq!(hits(&qt, Query::Rect(Aabb2D::new(515, 100, 516, 101))), [10]);
    }

    #[test]
    fn boxes_outside_the_world_are_still_indexed() {
        let mut qt = world();
        qt.set(3, Aabb2D::from_xywh(-500, -500, 10, 10));
        assert_eq!(hits(&qt, at(-495, -495)), [3]);
    }

    #[test]
    fn set_moves_and_unset_forgets() {
        let mut qt = world();
        qt.set(0, Aabb2D::from_xywh(0, 0, 10, 10));
        qt.set(0, Aabb2D::from_xywh(900, 900, 10, 10));
        assert!(hits(&qt, at(5, 5)).is_empty());
        assert_eq!(hits(&qt, at(905, 905)), [0]);
        qt.unset(0);
        assert!(hits(&qt, at(905, 905)).is_empty());
        // A second unset is ignored.
        qt.unset(0);
        qt.unset(77);
    }

    #[test]
    fn optimize_collapses_empty_subdivisions() {
        let mut qt = world();
        for i in 0..32 {
            qt.set(i, Aabb2D::from_xywh(i as i64 * 30, 5, 4, 4));
        }
        let grown = qt.node_count();
        for i in 1..32 {
            qt.unset(i);
        }
        qt.optimize();
        assert!(qt.node_count() < grown);
        assert_eq!(hits(&qt, at(1, 6)), [0]);
    }
}
