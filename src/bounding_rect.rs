//! Bounding rectangle calculation.
//!
//! Computes the axis-aligned envelope of a point sequence together with a
//! finiteness flag.

use crate::basics::{Point, Rect};

/// Bounds of `points`, or `None` if any coordinate is NaN or infinite.
///
/// An empty slice yields an empty rectangle at the origin. Every point
/// counts, including lone move points.
pub fn bounding_rect(points: &[Point]) -> Option<Rect> {
    let Some(first) = points.first() else {
        return Some(Rect::empty());
    };

    let mut x1 = first.x;
    let mut y1 = first.y;
    let mut x2 = first.x;
    let mut y2 = first.y;
    // Accumulating `x * 0` turns into NaN as soon as a non-finite value shows up.
    let mut accum = 0.0_f32;

    for p in points {
        accum *= p.x;
        accum *= p.y;
        if p.x < x1 {
            x1 = p.x;
        }
        if p.y < y1 {
            y1 = p.y;
        }
        if p.x > x2 {
            x2 = p.x;
        }
        if p.y > y2 {
            y2 = p.y;
        }
    }

    if accum.is_nan() {
        None
    } else {
        Some(Rect::new(x1, y1, x2, y2))
    }
}
