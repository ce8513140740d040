// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node behavior hooks and the built-in behaviors.

use core::any::Any;

use kurbo::{Point, Vec2};

use crate::error::SceneError;
use crate::tree::Tree;
use crate::types::{NodeId, Tint};

/// Game logic attached to a node.
///
/// Hooks receive the whole tree and the node's own handle. While a hook runs, the
/// node's behavior is checked out of the tree: [`Tree::behavior`] on the same node
/// reports [`SceneError::BehaviorInUse`], and the behavior is dropped afterwards if the
/// hook destroyed its node.
///
/// The node's concrete behavior type is its registry type; see [`Tree::nodes_of`].
pub trait Behavior: Any {
    /// Runs once, when the node is first attached. Typically adds children.
    fn setup(&mut self, tree: &mut Tree, id: NodeId) -> Result<(), SceneError> {
        let _ = (tree, id);
        Ok(())
    }

    /// Runs once the scene is ready, after the node's transform is computed and before
    /// its children are readied. Runs again after [`Tree::reset_children`].
    fn ready(&mut self, tree: &mut Tree, id: NodeId) -> Result<(), SceneError> {
        let _ = (tree, id);
        Ok(())
    }

    /// Runs every fixed step, before the node's children update.
    fn update(&mut self, tree: &mut Tree, id: NodeId) -> Result<(), SceneError> {
        let _ = (tree, id);
        Ok(())
    }

    /// Runs every fixed step, after the node's children update.
    fn late_update(&mut self, tree: &mut Tree, id: NodeId) -> Result<(), SceneError> {
        let _ = (tree, id);
        Ok(())
    }

    /// Submit draw work for this node. Children are drawn after their parent.
    fn draw(&self, tree: &Tree, id: NodeId, sink: &mut dyn DrawSink) {
        let _ = (tree, id, sink);
    }
}

/// A behavior that does nothing; used for grouping and plain containers.
#[derive(Copy, Clone, Debug, Default)]
pub struct Group;

impl Behavior for Group {}

/// Orders children by their `y` position through depth, after each update.
#[derive(Copy, Clone, Debug, Default)]
pub struct YSort;

impl YSort {
    /// Depth assigned to a child at local `y`.
    pub fn depth_for(y: f64) -> f64 {
        (y + 500_000.0) * 0.000_001
    }
}

impl Behavior for YSort {
    fn late_update(&mut self, tree: &mut Tree, id: NodeId) -> Result<(), SceneError> {
        let children = tree.children(id)?.to_vec();
        for child in children {
            let y = tree.resolve(child)?.position().y;
            tree.set_depth(child, Self::depth_for(y))?;
        }
        Ok(())
    }
}

/// Resolved global drawing state of one node.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DrawItem {
    /// The node being drawn.
    pub id: NodeId,
    /// Global position.
    pub position: Point,
    /// Global rotation in radians.
    pub rotation: f64,
    /// Global scale.
    pub scale: Vec2,
    /// Global depth; larger is drawn later by depth-sorting renderers.
    pub depth: f64,
    /// Global tint.
    pub tint: Tint,
}

/// Receiver for draw work. Rendering itself lives outside this crate.
pub trait DrawSink {
    /// Accept one item.
    fn submit(&mut self, item: DrawItem);
}

impl DrawSink for Vec<DrawItem> {
    fn submit(&mut self, item: DrawItem) {
        self.push(item);
    }
}
