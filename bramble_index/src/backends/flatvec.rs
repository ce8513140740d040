// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dense linear-scan backend.
//!
//! Boxes are packed into one contiguous array with a parallel array of owning slots,
//! so a scan touches only live entries no matter how sparse the keys are. Removal
//! swaps the last entry into the hole.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::backend::{Backend, Query};
use crate::types::Aabb2D;

/// Linear-scan backend. The default for [`Index`](crate::Index).
pub struct FlatVec<T> {
    boxes: Vec<Aabb2D<T>>,
    owners: Vec<usize>,
    // slot -> position in `boxes`
    dense: Vec<Option<usize>>,
}

impl<T> Default for FlatVec<T> {
    fn default() -> Self {
        Self {
            boxes: Vec::new(),
            owners: Vec::new(),
            dense: Vec::new(),
        }
    }
}

impl<T> Debug for FlatVec<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FlatVec")
            .field("live", &self.boxes.len())
            .field("slot_span", &self.dense.len())
            .finish_non_exhaustive()
    }
}

impl<T> FlatVec<T> {
    /// Number of stored boxes.
    pub fn live(&self) -> usize {
        self.boxes.len()
    }
}

impl<T: Copy + PartialOrd + Debug> Backend<T> for FlatVec<T> {
    fn set(&mut self, slot: usize, aabb: Aabb2D<T>) {
        if self.dense.len() <= slot {
            self.dense.resize(slot + 1, None);
        }
        match self.dense[slot] {
            Some(at) => self.boxes[at] = aabb,
            None => {
                self.dense[slot] = Some(self.boxes.len());
                self.boxes.push(aabb);
                self.owners.push(slot);
            }
        }
    }

    fn unset(&mut self, slot: usize) {
        let Some(at) = self.dense.get_mut(slot).and_then(Option::take) else {
            return;
        };
        self.boxes.swap_remove(at);
        self.owners.swap_remove(at);
        if let Some(&moved) = self.owners.get(at) {
            self.dense[moved] = Some(at);
        }
    }

    fn clear(&mut self) {
        self.boxes.clear();
        self.owners.clear();
        self.dense.clear();
    }

    fn visit(&self, query: Query<T>, hit: &mut dyn FnMut(usize)) {
        let mut found: Vec<usize> = self
            .boxes
            .iter()
            .zip(&self.owners)
            .filter(|(aabb, _)| query.hits(aabb))
            .map(|(_, &slot)| slot)
            .collect();
        found.sort_unstable();
        found.into_iter().for_each(hit);
    }

    fn optimize(&mut self) {
        let span = self.owners.iter().max().map_or(0, |&top| top + 1);
        self.dense.truncate(span);
        self.dense.shrink_to_fit();
    }
}
