//! Scalar math utilities.
//!
//! Tolerances, sign helpers and cross products used by the analyzers.

use crate::basics::Point;

// ============================================================================
// Constants
// ============================================================================

/// Tolerance below which a scalar is treated as zero.
pub const SCALAR_NEARLY_ZERO: f32 = 1.0 / 4096.0;

/// Conic weight that turns a quarter of a unit square into a circular arc.
pub const SCALAR_ROOT2_OVER2: f32 = std::f32::consts::FRAC_1_SQRT_2;

// ============================================================================
// Comparisons
// ============================================================================

#[inline]
pub fn nearly_zero(x: f32) -> bool {
    x.abs() <= SCALAR_NEARLY_ZERO
}

#[inline]
pub fn nearly_equal(x: f32, y: f32) -> bool {
    (x - y).abs() <= SCALAR_NEARLY_ZERO
}

/// -1, 0 or 1. NaN maps to 0.
#[inline]
pub fn sign_as_int(x: f32) -> i32 {
    if x < 0.0 {
        -1
    } else if x > 0.0 {
        1
    } else {
        0
    }
}

/// True if `b` lies in the closed interval spanned by `a` and `c`, in either
/// order.
#[inline]
pub fn between(a: f32, b: f32, c: f32) -> bool {
    (a - b) * (c - b) <= 0.0
}

#[inline]
pub fn interp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// The next representable `f32` toward zero. Zero and non-finite values are
/// returned unchanged.
pub fn next_toward_zero(x: f32) -> f32 {
    if x == 0.0 || !x.is_finite() {
        return x;
    }
    f32::from_bits(x.to_bits() - 1)
}

// ============================================================================
// Cross products
// ============================================================================

/// Cross product of `(p1 - p0)` and `(p2 - p0)`.
///
/// The subtraction can underflow to an exact zero for tiny distinct
/// vectors; in that case the product is recomputed in `f64`.
pub fn cross_product(p0: Point, p1: Point, p2: Point) -> f32 {
    let cross = (p1 - p0).cross(p2 - p0);
    if cross != 0.0 {
        return cross;
    }
    let (p0x, p0y) = (p0.x as f64, p0.y as f64);
    let (p1x, p1y) = (p1.x as f64, p1.y as f64);
    let (p2x, p2y) = (p2.x as f64, p2.y as f64);
    ((p1x - p0x) * (p2y - p0y) - (p1y - p0y) * (p2x - p0x)) as f32
}
