// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Slot storage with a free list.

use crate::error::SceneError;

/// Growable slot storage that reuses freed slots.
///
/// The arena knows nothing about generations: it hands out raw slot indices and
/// reports free slots as [`SceneError::SlotEmpty`]. Handle validation lives with
/// the tree's generation table.
#[derive(Debug)]
pub struct Arena<T> {
    slots: Vec<Option<T>>,
    free_list: Vec<usize>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }
}

impl<T> Arena<T> {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, reusing the most recently freed slot if one exists.
    pub fn add(&mut self, value: T) -> usize {
        self.len += 1;
        if let Some(index) = self.free_list.pop() {
            self.slots[index] = Some(value);
            index
        } else {
            self.slots.push(Some(value));
            self.slots.len() - 1
        }
    }

    /// Borrow the value in a slot.
    pub fn get(&self, index: usize) -> Result<&T, SceneError> {
        self.slots
            .get(index)
            .and_then(Option::as_ref)
            .ok_or(SceneError::SlotEmpty { index })
    }

    /// Mutably borrow the value in a slot.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T, SceneError> {
        self.slots
            .get_mut(index)
            .and_then(Option::as_mut)
            .ok_or(SceneError::SlotEmpty { index })
    }

    /// Free a slot, returning its value. Freeing an empty slot is a no-op.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        let value = self.slots.get_mut(index)?.take()?;
        self.free_list.push(index);
        self.len -= 1;
        Some(value)
    }

    /// Free a slot without making it available for reuse.
    pub fn retire(&mut self, index: usize) -> Option<T> {
        let value = self.slots.get_mut(index)?.take()?;
        self.len -= 1;
        Some(value)
    }

    /// Whether the slot holds a value.
    pub fn has(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(Some(_)))
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no slots are occupied.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total slots ever allocated, occupied or not.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Occupied slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (i, v)))
    }
}
