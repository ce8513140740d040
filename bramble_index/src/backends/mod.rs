// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend implementations for different spatial strategies.
//!
//! - `flatvec`: flat vector with linear scans (small, simple).
//! - `quadtree`: region quadtree over a bounded world; boxes straddling a split
//!   line stay at the shallowest node that fully contains them.

pub mod flatvec;
pub mod quadtree;
