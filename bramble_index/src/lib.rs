// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bramble Index: a keyed 2D AABB index for broad-phase queries.
//!
//! - Insert, move, and remove axis-aligned bounding boxes (AABBs) under caller-chosen
//!   integer keys (for example an arena slot index).
//! - Query by point or intersecting rectangle. Results are *candidates*: boxes touching
//!   the query on an edge are included, so narrow-phase code should re-check.
//! - Batch changes with [`Index::commit`] and receive coarse damage (added/removed/moved boxes).
//!
//! It is generic over the scalar type `T` and does not depend on any geometry crate.
//! Higher layers (like a scene tree) compute world-space AABBs and feed them here.
//!
//! The key space grows on demand, so sparse or high keys never need pre-sizing.
//! Backends plug in through the [`Backend`] trait, which stores one box per slot and
//! answers [`Query`]s. The default backend is a packed linear scan;
//! [`Index::with_quadtree`] selects a region quadtree.
//!
//! # Example
//!
//! ```rust
//! use bramble_index::{Aabb2D, Index};
//!
//! let mut idx: Index<i64> = Index::new();
//! idx.insert_or_update(1, Aabb2D::new(0, 0, 10, 10));
//! idx.insert_or_update(2, Aabb2D::new(5, 5, 15, 15));
//! let _damage0 = idx.commit();
//!
//! // Move the first box and commit a damage set.
//! idx.insert_or_update(1, Aabb2D::new(20, 0, 30, 10));
//! let damage = idx.commit();
//! assert!(!damage.is_empty());
//!
//! // Query a point inside the second box.
//! let hits: Vec<_> = idx.query_point(6, 6).collect();
//! assert_eq!(hits, [2]);
//! ```
//!
//! Quadtree-backed index over a bounded world:
//!
//! ```rust
//! use bramble_index::{Aabb2D, Index};
//!
//! let world = Aabb2D::from_xywh(-100_000_i64, -100_000, 200_000, 200_000);
//! let mut idx = Index::with_quadtree(world, 8, 12);
//! idx.insert_or_update(42, Aabb2D::from_xywh(0, 0, 16, 16));
//! assert!(idx.contains(42));
//! assert_eq!(idx.query_rect(Aabb2D::new(15, 15, 40, 40)).count(), 1);
//! ```
//!
//! ## Choosing a backend
//!
//! - `FlatVec` (default): packed boxes scanned linearly. Good for small sets or when
//!   updates vastly outnumber queries.
//! - `QuadTree`: good general-purpose choice for many small boxes spread over a large
//!   world. [`IndexGeneric::commit_and_optimize`] rebuilds it from the live boxes.
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for floating-point coordinates.

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod backend;
pub mod backends;
pub mod damage;
pub mod index;
pub mod types;

pub use backend::{Backend, Query};
pub use backends::flatvec::FlatVec;
pub use backends::quadtree::{QuadTree, QuadTreeF64, QuadTreeI64};
pub use damage::Damage;
pub use index::{Index, IndexGeneric};
pub use types::{Aabb2D, Scalar};
