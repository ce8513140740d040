// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Camera state used for depth scaling and visibility queries.

use bramble_index::Aabb2D;
use kurbo::Point;

use crate::math::snap;

/// A 2D camera.
///
/// Zoom divides every node's local depth when global depth is computed. Change the
/// camera through [`Tree::set_camera`](crate::Tree::set_camera) so depths are refreshed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    /// World point at the center of the view.
    pub position: Point,
    /// Magnification; must be positive.
    pub zoom: f64,
    /// View rotation in radians.
    pub rotation: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Point::ORIGIN,
            zoom: 1.0,
            rotation: 0.0,
        }
    }
}

impl Camera {
    /// World box seen through a viewport of the given pixel size, ignoring rotation.
    pub fn bounds(&self, viewport_width: f64, viewport_height: f64) -> Aabb2D<i64> {
        let w = viewport_width / self.zoom;
        let h = viewport_height / self.zoom;
        Aabb2D::from_xywh(
            snap(self.position.x - w * 0.5),
            snap(self.position.y - h * 0.5),
            snap(w),
            snap(h),
        )
    }
}
