// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transform composition, decomposition, and integer snapping.

use core::f64::consts::{PI, TAU};

use kurbo::{Affine, Point, Vec2};

/// Local transform in translate, rotate, scale order.
pub fn compose(position: Point, rotation: f64, scale: Vec2) -> Affine {
    Affine::translate(position.to_vec2())
        * Affine::rotate(rotation)
        * Affine::scale_non_uniform(scale.x, scale.y)
}

/// Translation component of an affine.
pub fn translation_of(transform: Affine) -> Point {
    let [_, _, _, _, x, y] = transform.as_coeffs();
    Point::new(x, y)
}

/// Per-axis scale magnitudes of an affine.
pub fn scale_of(transform: Affine) -> Vec2 {
    let [a, b, c, d, _, _] = transform.as_coeffs();
    Vec2::new(a.hypot(b), c.hypot(d))
}

/// Rotation of an affine's x basis vector, in radians.
pub fn rotation_of(transform: Affine) -> f64 {
    let [a, b, _, _, _, _] = transform.as_coeffs();
    b.atan2(a)
}

/// Round to the nearest integer, halves toward positive infinity.
///
/// Unlike [`f64::round`], this commutes with integer translation, so a box snapped
/// at `x` and one snapped at `x + 1` are exactly one unit apart.
pub fn snap(value: f64) -> i64 {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "world coordinates stay far inside the i64 range"
    )]
    let out = (value + 0.5).floor() as i64;
    out
}

/// Wrap an angle into `(-PI, PI]`.
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Interpolate between two angles along the shortest arc.
pub fn lerp_angle(from: f64, to: f64, amount: f64) -> f64 {
    let delta = wrap_angle(to - from);
    wrap_angle(from + delta * amount)
}
