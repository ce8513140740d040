// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for tree operations.

use crate::types::NodeId;

/// Errors returned by [`Tree`](crate::Tree) operations.
///
/// Lookups never fall back to a different live node: a stale handle, a freed slot,
/// or a missing named child is always reported. Destroying a node twice is not an
/// error, and neither is an actor being stopped by an obstacle.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    /// The arena slot is out of range or currently free.
    #[error("arena slot {index} is empty")]
    SlotEmpty {
        /// The slot that was looked up.
        index: usize,
    },
    /// The handle's generation no longer matches its slot.
    #[error("stale handle {id}: slot generation is now {current}")]
    StaleHandle {
        /// The handle that failed to resolve.
        id: NodeId,
        /// The slot's current generation.
        current: u32,
    },
    /// A parent has no child with the requested name or type.
    #[error("node `{parent}` has no child named `{name}`")]
    ChildNotFound {
        /// Name of the parent node.
        parent: String,
        /// Name (or type name) that was looked up.
        name: String,
    },
    /// The node's behavior is not of the requested type.
    #[error("node {id} is not a `{expected}`")]
    WrongType {
        /// The node that was looked up.
        id: NodeId,
        /// The requested type.
        expected: &'static str,
    },
    /// The node has no hitbox.
    #[error("node {id} has no hitbox")]
    NotAHitbox {
        /// The node that was looked up.
        id: NodeId,
    },
    /// The node is not an actor.
    #[error("node {id} is not an actor")]
    NotAnActor {
        /// The node that was looked up.
        id: NodeId,
    },
    /// The node is not a solid.
    #[error("node {id} is not a solid")]
    NotASolid {
        /// The node that was looked up.
        id: NodeId,
    },
    /// The node's behavior is checked out by one of its own running hooks.
    #[error("behavior of node {id} is in use by one of its own hooks")]
    BehaviorInUse {
        /// The node whose behavior was requested.
        id: NodeId,
    },
    /// An operation needed a loaded scene.
    #[error("no scene is loaded")]
    NoScene,
}

impl SceneError {
    /// True for lookups that found nothing: freed slots, stale handles, and missing children.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::SlotEmpty { .. } | Self::StaleHandle { .. } | Self::ChildNotFound { .. }
        )
    }
}

/// Errors loading a [`TreeConfig`](crate::TreeConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The contents are not valid TOML for the config schema.
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// The fixed step is zero, negative, or not finite.
    #[error("step_seconds must be positive and finite, got {step}")]
    InvalidStep {
        /// The rejected step length.
        step: f64,
    },
}
