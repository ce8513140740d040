// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the tree: node identifiers, flags, and tint.

use core::fmt;

/// Identifier for a node in the tree.
///
/// This is a small, copyable handle that stays stable across updates but becomes
/// invalid when the node is destroyed.
/// It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - Every slot starts at generation `0`.
/// - Destroying a node bumps its slot's generation; any existing `NodeId` for that
///   slot is now stale.
/// - The generation table outlives slot reuse, so a node attached into a reused slot
///   receives the bumped generation and a distinct `NodeId`.
///
/// Use [`Tree::is_alive`](crate::Tree::is_alive) or [`Tree::resolve`](crate::Tree::resolve)
/// to check a `NodeId`. Stale `NodeId`s never alias a different live node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Arena slot index. This is also the node's key in the spatial index.
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Generation of the slot when this handle was issued.
    pub const fn generation(self) -> u32 {
        self.1
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.0, self.1)
    }
}

bitflags::bitflags! {
    /// Per-node switches for traversal and scene resets.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// The node and its subtree receive update calls.
        const PROCESSING = 0b0000_0001;
        /// The node and its subtree receive draw calls.
        const VISIBLE    = 0b0000_0010;
        /// The node survives [`Tree::reset_children`](crate::Tree::reset_children) of its parent.
        ///
        /// Inherited from the parent when the node is attached.
        const PERSISTENT = 0b0000_0100;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::PROCESSING | Self::VISIBLE
    }
}

bitflags::bitflags! {
    /// Lifecycle progress of a node.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Lifecycle: u8 {
        /// Attached to the tree and holding a handle.
        const ADDED_TO_TREE = 0b0000_0001;
        /// One-time setup has run.
        const HAS_SETUP     = 0b0000_0010;
        /// Ready has run.
        const HAS_READIED   = 0b0000_0100;
        /// A reset is queued for the next update.
        const RESETTING     = 0b0000_1000;
    }
}

/// RGBA color multiplier applied down the hierarchy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tint {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Tint {
    /// Opaque white; the identity for [`Tint::multiply`].
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);

    /// Build a tint from its channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Per-channel product, treating each channel as a fraction of 255.
    #[must_use]
    pub fn multiply(self, other: Self) -> Self {
        fn channel(a: u8, b: u8) -> u8 {
            let product = (u16::from(a) * u16::from(b) + 127) / 255;
            #[allow(
                clippy::cast_possible_truncation,
                reason = "product of two fractions of 255 never exceeds 255"
            )]
            let out = product as u8;
            out
        }
        Self {
            r: channel(self.r, other.r),
            g: channel(self.g, other.g),
            b: channel(self.b, other.b),
            a: channel(self.a, other.a),
        }
    }
}

impl Default for Tint {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_is_multiplicative_identity() {
        let t = Tint::rgba(12, 200, 128, 77);
        assert_eq!(t.multiply(Tint::WHITE), t);
        assert_eq!(Tint::WHITE.multiply(t), t);
    }

    #[test]
    fn half_grey_halves_channels() {
        let grey = Tint::rgba(128, 128, 128, 255);
        assert_eq!(Tint::WHITE.multiply(grey), grey);
        assert_eq!(grey.multiply(grey), Tint::rgba(64, 64, 64, 255));
        assert_eq!(Tint::rgba(0, 10, 255, 0).multiply(grey), Tint::rgba(0, 5, 128, 0));
    }

    #[test]
    fn node_id_orders_and_prints() {
        let a = NodeId::new(3, 1);
        assert_eq!(a.index(), 3);
        assert_eq!(a.generation(), 1);
        assert_eq!(a.to_string(), "#3v1");
        assert!(NodeId::new(3, 2) > a);
    }
}
