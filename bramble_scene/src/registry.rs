// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-behavior-type node registries.

use core::any::TypeId;
use core::marker::PhantomData;
use std::collections::HashMap;

use crate::behavior::Behavior;
use crate::tree::Tree;
use crate::types::NodeId;

/// Live nodes grouped by behavior type, indexed by arena slot.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    by_type: HashMap<TypeId, Vec<Option<NodeId>>>,
}

impl Registry {
    pub(crate) fn add(&mut self, kind: TypeId, id: NodeId) {
        let slots = self.by_type.entry(kind).or_default();
        if slots.len() <= id.idx() {
            slots.resize(id.idx() + 1, None);
        }
        slots[id.idx()] = Some(id);
    }

    /// Remove `id` only if its slot still holds that exact handle.
    pub(crate) fn try_remove(&mut self, kind: TypeId, id: NodeId) -> bool {
        let Some(slot) = self
            .by_type
            .get_mut(&kind)
            .and_then(|slots| slots.get_mut(id.idx()))
        else {
            return false;
        };
        if *slot == Some(id) {
            *slot = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn slots(&self, kind: TypeId) -> &[Option<NodeId>] {
        self.by_type
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Live nodes whose behavior is `T`, in slot order.
///
/// Returned by [`Tree::nodes_of`]. Entries whose handle went stale are skipped.
pub struct Nodes<'a, T> {
    tree: &'a Tree,
    slots: &'a [Option<NodeId>],
    _kind: PhantomData<fn() -> T>,
}

impl<T> core::fmt::Debug for Nodes<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Nodes")
            .field("kind", &core::any::type_name::<T>())
            .field("slots", &self.slots.len())
            .finish_non_exhaustive()
    }
}

impl<'a, T: Behavior> Nodes<'a, T> {
    pub(crate) fn new(tree: &'a Tree, slots: &'a [Option<NodeId>]) -> Self {
        Self {
            tree,
            slots,
            _kind: PhantomData,
        }
    }

    /// Live handles in slot order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + use<'a, T> {
        let tree = self.tree;
        self.slots
            .iter()
            .flatten()
            .copied()
            .filter(move |&id| tree.is_alive(id))
    }

    /// The live node of this type in `slot`, if any.
    pub fn get(&self, slot: u32) -> Option<NodeId> {
        let id = (*self.slots.get(slot as usize)?)?;
        self.tree.is_alive(id).then_some(id)
    }

    /// Whether `id` is a live node of this type.
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id.index()) == Some(id)
    }

    /// Number of live nodes of this type.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether there are no live nodes of this type.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl Tree {
    /// Live nodes whose behavior is `T`.
    pub fn nodes_of<T: Behavior>(&self) -> Nodes<'_, T> {
        Nodes::new(self, self.registry.slots(TypeId::of::<T>()))
    }
}
