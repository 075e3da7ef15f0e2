//! Quadratic, conic and cubic curve helpers.
//!
//! Root finding, de Casteljau subdivision, Y-extrema chopping and tangent
//! evaluation. Chopping at Y extrema produces Y-monotonic pieces, which the
//! containment analyzer relies on.

use crate::basics::{Point, Vector};
use crate::math::interp;
use crate::matrix::{Matrix, Point3};

// ============================================================================
// Roots
// ============================================================================

/// `numer / denom` when the ratio lies strictly inside (0, 1).
fn valid_unit_divide(mut numer: f32, mut denom: f32) -> Option<f32> {
    if numer < 0.0 {
        numer = -numer;
        denom = -denom;
    }
    if denom == 0.0 || numer == 0.0 || numer >= denom {
        return None;
    }
    let r = numer / denom;
    if r.is_nan() || r == 0.0 {
        return None;
    }
    Some(r)
}

/// Roots of `A*t^2 + B*t + C` in the open unit interval, sorted ascending,
/// with a double root reported once. Returns the number of roots written.
pub fn find_unit_quad_roots(a: f32, b: f32, c: f32, roots: &mut [f32; 2]) -> usize {
    if a == 0.0 {
        return match valid_unit_divide(-c, b) {
            Some(r) => {
                roots[0] = r;
                1
            }
            None => 0,
        };
    }

    // The discriminant is evaluated in f64 so it cannot overflow.
    let dr = (b as f64) * (b as f64) - 4.0 * (a as f64) * (c as f64);
    if dr < 0.0 {
        return 0;
    }
    let r = dr.sqrt() as f32;
    if !r.is_finite() {
        return 0;
    }

    let q = if b < 0.0 { -(b - r) / 2.0 } else { -(b + r) / 2.0 };
    let mut n = 0;
    if let Some(t) = valid_unit_divide(q, a) {
        roots[n] = t;
        n += 1;
    }
    if let Some(t) = valid_unit_divide(c, q) {
        roots[n] = t;
        n += 1;
    }
    if n == 2 {
        if roots[0] > roots[1] {
            roots.swap(0, 1);
        } else if roots[0] == roots[1] {
            n = 1;
        }
    }
    n
}

// ============================================================================
// Quadratics
// ============================================================================

fn lerp(a: Point, b: Point, t: f32) -> Point {
    Point::new(interp(a.x, b.x, t), interp(a.y, b.y, t))
}

/// Split a quad at `t` into `[p0, p01, p012, p12, p2]`.
pub fn chop_quad_at(src: &[Point; 3], t: f32) -> [Point; 5] {
    let p01 = lerp(src[0], src[1], t);
    let p12 = lerp(src[1], src[2], t);
    [src[0], p01, lerp(p01, p12, t), p12, src[2]]
}

fn is_not_monotonic(a: f32, b: f32, c: f32) -> bool {
    let ab = a - b;
    let mut bc = b - c;
    if ab < 0.0 {
        bc = -bc;
    }
    ab == 0.0 || bc < 0.0
}

/// Chop a quad at its Y extremum. Returns the number of chops (0 or 1); the
/// pieces start at `dst[0]` and `dst[2]`. When the extremum cannot be
/// located the control point is flattened so `dst[0..3]` is monotonic.
pub fn chop_quad_at_y_extrema(src: &[Point; 3], dst: &mut [Point; 5]) -> usize {
    let a = src[0].y;
    let mut b = src[1].y;
    let c = src[2].y;

    if is_not_monotonic(a, b, c) {
        if let Some(t) = valid_unit_divide(a - b, a - b - b + c) {
            *dst = chop_quad_at(src, t);
            // The extremum is flat by construction.
            dst[1].y = dst[2].y;
            dst[3].y = dst[2].y;
            return 1;
        }
        b = if (a - b).abs() < (b - c).abs() { a } else { c };
    }
    dst[0] = Point::new(src[0].x, a);
    dst[1] = Point::new(src[1].x, b);
    dst[2] = Point::new(src[2].x, c);
    0
}

/// Tangent of a quad at `t`. Falls back to the chord when the derivative
/// vanishes at an end point.
pub fn eval_quad_tangent_at(src: &[Point; 3], t: f32) -> Vector {
    if (t == 0.0 && src[0] == src[1]) || (t == 1.0 && src[1] == src[2]) {
        return src[2] - src[0];
    }
    let b = src[1] - src[0];
    let a = src[2] - src[1] - b;
    let tx = a.x * t + b.x;
    let ty = a.y * t + b.y;
    Vector::new(tx + tx, ty + ty)
}

// ============================================================================
// Cubics
// ============================================================================

/// Split a cubic at `t` into seven points sharing the middle point.
pub fn chop_cubic_at(src: &[Point; 4], t: f32) -> [Point; 7] {
    let ab = lerp(src[0], src[1], t);
    let bc = lerp(src[1], src[2], t);
    let cd = lerp(src[2], src[3], t);
    let abc = lerp(ab, bc, t);
    let bcd = lerp(bc, cd, t);
    let abcd = lerp(abc, bcd, t);
    [src[0], ab, abc, abcd, bcd, cd, src[3]]
}

pub fn chop_cubic_at_half(src: &[Point; 4]) -> [Point; 7] {
    chop_cubic_at(src, 0.5)
}

fn find_cubic_extrema(a: f32, b: f32, c: f32, d: f32, t_values: &mut [f32; 2]) -> usize {
    // Derivative coefficients divided by 3.
    let qa = d - a + 3.0 * (b - c);
    let qb = 2.0 * (a - b - b + c);
    let qc = b - a;
    find_unit_quad_roots(qa, qb, qc, t_values)
}

fn cubic_from(pts: &[Point], start: usize) -> [Point; 4] {
    [pts[start], pts[start + 1], pts[start + 2], pts[start + 3]]
}

/// Chop a cubic at up to two Y extrema. Returns the number of chops; piece
/// `i` starts at `dst[3 * i]`.
pub fn chop_cubic_at_y_extrema(src: &[Point; 4], dst: &mut [Point; 10]) -> usize {
    let mut t_values = [0.0; 2];
    let roots = find_cubic_extrema(src[0].y, src[1].y, src[2].y, src[3].y, &mut t_values);

    if roots == 0 {
        dst[..4].copy_from_slice(src);
        return 0;
    }

    let first = chop_cubic_at(src, t_values[0]);
    dst[..7].copy_from_slice(&first);
    if roots == 2 {
        let rest = cubic_from(&first, 3);
        match valid_unit_divide(t_values[1] - t_values[0], 1.0 - t_values[0]) {
            Some(t) => {
                let second = chop_cubic_at(&rest, t);
                dst[3..10].copy_from_slice(&second);
            }
            None => {
                dst[3..7].copy_from_slice(&rest);
                dst[7] = rest[3];
                dst[8] = rest[3];
                dst[9] = rest[3];
            }
        }
    }

    // Flatten the extrema so each piece is exactly monotonic.
    dst[2].y = dst[3].y;
    dst[4].y = dst[3].y;
    if roots == 2 {
        dst[5].y = dst[6].y;
        dst[7].y = dst[6].y;
    }
    roots
}

/// Solve for `t` where a Y-monotonic cubic crosses `y`, by bisection.
/// Returns `None` when the end points do not straddle `y`.
pub fn chop_mono_cubic_at_y(pts: &[Point; 4], y: f32) -> Option<f32> {
    let ycrv = [pts[0].y - y, pts[1].y - y, pts[2].y - y, pts[3].y - y];

    let mut t_neg: f32;
    let mut t_pos: f32;
    if ycrv[0] < 0.0 {
        if ycrv[3] < 0.0 {
            return None;
        }
        t_neg = 0.0;
        t_pos = 1.0;
    } else if ycrv[0] > 0.0 {
        if ycrv[3] > 0.0 {
            return None;
        }
        t_neg = 1.0;
        t_pos = 0.0;
    } else {
        return Some(0.0);
    }

    const TOLERANCE: f32 = 1.0 / 65536.0;
    loop {
        let t_mid = (t_pos + t_neg) / 2.0;
        let y01 = interp(ycrv[0], ycrv[1], t_mid);
        let y12 = interp(ycrv[1], ycrv[2], t_mid);
        let y23 = interp(ycrv[2], ycrv[3], t_mid);
        let y012 = interp(y01, y12, t_mid);
        let y123 = interp(y12, y23, t_mid);
        let y0123 = interp(y012, y123, t_mid);
        if y0123 == 0.0 {
            return Some(t_mid);
        }
        if y0123 < 0.0 {
            t_neg = t_mid;
        } else {
            t_pos = t_mid;
        }
        if (t_pos - t_neg).abs() <= TOLERANCE {
            break;
        }
    }
    Some((t_neg + t_pos) / 2.0)
}

/// One coordinate of a cubic at `t`.
pub fn eval_cubic_coord(c0: f32, c1: f32, c2: f32, c3: f32, t: f32) -> f32 {
    let a = c3 + 3.0 * (c1 - c2) - c0;
    let b = 3.0 * (c2 - c1 - c1 + c0);
    let c = 3.0 * (c1 - c0);
    ((a * t + b) * t + c) * t + c0
}

/// Tangent of a cubic at `t`, with fallbacks for degenerate end tangents.
pub fn eval_cubic_tangent_at(src: &[Point; 4], t: f32) -> Vector {
    if (t == 0.0 && src[0] == src[1]) || (t == 1.0 && src[2] == src[3]) {
        let tangent = if t == 0.0 { src[2] - src[0] } else { src[3] - src[1] };
        if tangent.is_zero() {
            return src[3] - src[0];
        }
        return tangent;
    }
    let p0 = src[0];
    let p1 = src[1];
    let p2 = src[2];
    let p3 = src[3];
    let ax = p3.x + 3.0 * (p1.x - p2.x) - p0.x;
    let ay = p3.y + 3.0 * (p1.y - p2.y) - p0.y;
    let bx = 2.0 * (p2.x - 2.0 * p1.x + p0.x);
    let by = 2.0 * (p2.y - 2.0 * p1.y + p0.y);
    let cx = p1.x - p0.x;
    let cy = p1.y - p0.y;
    Vector::new((ax * t + bx) * t + cx, (ay * t + by) * t + cy)
}

// ============================================================================
// Conics
// ============================================================================

/// A rational quadratic segment: three control points and a weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conic {
    pub pts: [Point; 3],
    pub w: f32,
}

fn project_down(p: Point3) -> Point {
    Point::new(p.x / p.z, p.y / p.z)
}

impl Conic {
    pub fn new(pts: [Point; 3], w: f32) -> Self {
        Self { pts, w }
    }

    /// Point on the conic at `t`.
    pub fn eval_at(&self, t: f32) -> Point {
        let w = self.w;
        let [p0, p1, p2] = self.pts;
        let coef = |c0: f32, c1: f32, c2: f32| {
            let c1w = c1 * w;
            let a = c2 - 2.0 * c1w + c0;
            let b = 2.0 * (c1w - c0);
            (a * t + b) * t + c0
        };
        let denom_b = 2.0 * (w - 1.0);
        let denom = (-denom_b * t + denom_b) * t + 1.0;
        Point::new(coef(p0.x, p1.x, p2.x) / denom, coef(p0.y, p1.y, p2.y) / denom)
    }

    /// Tangent at `t`, falling back to the chord at degenerate end points.
    pub fn eval_tangent_at(&self, t: f32) -> Vector {
        let [p0, p1, p2] = self.pts;
        if (t == 0.0 && p0 == p1) || (t == 1.0 && p1 == p2) {
            return p2 - p0;
        }
        let p20 = p2 - p0;
        let p10 = p1 - p0;
        let cx = self.w * p10.x;
        let cy = self.w * p10.y;
        let ax = self.w * p20.x - p20.x;
        let ay = self.w * p20.y - p20.y;
        let bx = p20.x - cx - cx;
        let by = p20.y - cy - cy;
        Vector::new((ax * t + bx) * t + cx, (ay * t + by) * t + cy)
    }

    /// Split at `t` in homogeneous space and renormalize the weights.
    /// Returns `None` if any resulting coordinate is not finite.
    pub fn chop_at(&self, t: f32) -> Option<[Conic; 2]> {
        let [p0, p1, p2] = self.pts;
        let w = self.w;
        let h = [
            Point3 { x: p0.x, y: p0.y, z: 1.0 },
            Point3 { x: p1.x * w, y: p1.y * w, z: w },
            Point3 { x: p2.x, y: p2.y, z: 1.0 },
        ];
        let mix = |a: Point3, b: Point3| Point3 {
            x: interp(a.x, b.x, t),
            y: interp(a.y, b.y, t),
            z: interp(a.z, b.z, t),
        };
        let ab = mix(h[0], h[1]);
        let bc = mix(h[1], h[2]);
        let abc = mix(ab, bc);

        let mid = project_down(abc);
        let root = abc.z.sqrt();
        let first = Conic::new([p0, project_down(ab), mid], ab.z / root);
        let second = Conic::new([mid, project_down(bc), p2], bc.z / root);

        let finite = first.pts.iter().chain(second.pts.iter()).all(|p| p.is_finite())
            && first.w.is_finite()
            && second.w.is_finite();
        if finite {
            Some([first, second])
        } else {
            None
        }
    }

    fn find_y_extrema(&self) -> Option<f32> {
        let p20 = self.pts[2].y - self.pts[0].y;
        let p10 = self.pts[1].y - self.pts[0].y;
        let wp10 = self.w * p10;
        let mut roots = [0.0; 2];
        let n = find_unit_quad_roots(self.w * p20 - p20, p20 - 2.0 * wp10, wp10, &mut roots);
        if n == 1 {
            Some(roots[0])
        } else {
            None
        }
    }

    /// Chop at the Y extremum, flattening it. `None` if there is no single
    /// extremum or the chop is not finite.
    pub fn chop_at_y_extrema(&self) -> Option<[Conic; 2]> {
        let t = self.find_y_extrema()?;
        let mut dst = self.chop_at(t)?;
        let value = dst[0].pts[2].y;
        dst[0].pts[1].y = value;
        dst[1].pts[0].y = value;
        dst[1].pts[1].y = value;
        Some(dst)
    }

    /// Weight of this conic after mapping its control points through a
    /// perspective matrix. Affine matrices keep the weight.
    pub fn transform_w(pts: &[Point; 3], w: f32, matrix: &Matrix) -> f32 {
        if !matrix.has_perspective() {
            return w;
        }
        let src = [
            Point3 { x: pts[0].x, y: pts[0].y, z: 1.0 },
            Point3 { x: pts[1].x * w, y: pts[1].y * w, z: w },
            Point3 { x: pts[2].x, y: pts[2].y, z: 1.0 },
        ];
        let w0 = matrix.map_homogeneous(src[0]).z as f64;
        let w1 = matrix.map_homogeneous(src[1]).z as f64;
        let w2 = matrix.map_homogeneous(src[2]).z as f64;
        ((w1 * w1) / (w0 * w2)).sqrt() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_unit_quad_roots() {
        // (t - 0.25)(t - 0.5) = t^2 - 0.75t + 0.125
        let mut roots = [0.0; 2];
        let n = find_unit_quad_roots(1.0, -0.75, 0.125, &mut roots);
        assert_eq!(n, 2);
        assert!((roots[0] - 0.25).abs() < 1e-6);
        assert!((roots[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_unit_quad_roots_outside_interval() {
        let mut roots = [0.0; 2];
        // t = 2 only.
        assert_eq!(find_unit_quad_roots(0.0, 1.0, -2.0, &mut roots), 0);
        // no real roots
        assert_eq!(find_unit_quad_roots(1.0, 0.0, 1.0, &mut roots), 0);
    }

    #[test]
    fn test_chop_quad_at_y_extrema() {
        let src = [p(0.0, 0.0), p(5.0, 10.0), p(10.0, 0.0)];
        let mut dst = [Point::zero(); 5];
        assert_eq!(chop_quad_at_y_extrema(&src, &mut dst), 1);
        assert!((dst[2].x - 5.0).abs() < 1e-6);
        assert!((dst[2].y - 5.0).abs() < 1e-6);
        assert_eq!(dst[1].y, dst[2].y);
        assert_eq!(dst[3].y, dst[2].y);
    }

    #[test]
    fn test_chop_quad_monotonic_is_copy() {
        let src = [p(0.0, 0.0), p(5.0, 5.0), p(10.0, 10.0)];
        let mut dst = [Point::zero(); 5];
        assert_eq!(chop_quad_at_y_extrema(&src, &mut dst), 0);
        assert_eq!(&dst[..3], &src[..]);
    }

    #[test]
    fn test_chop_cubic_at_half() {
        let src = [p(0.0, 0.0), p(0.0, 10.0), p(10.0, 10.0), p(10.0, 0.0)];
        let dst = chop_cubic_at_half(&src);
        assert_eq!(dst[0], src[0]);
        assert_eq!(dst[6], src[3]);
        assert!((dst[3].x - 5.0).abs() < 1e-6);
        assert!((dst[3].y - 7.5).abs() < 1e-6);
    }

    #[test]
    fn test_chop_cubic_at_y_extrema_s_curve() {
        // Goes up then down then up: two Y extrema.
        let src = [p(0.0, 0.0), p(3.0, 10.0), p(6.0, -10.0), p(9.0, 0.0)];
        let mut dst = [Point::zero(); 10];
        let n = chop_cubic_at_y_extrema(&src, &mut dst);
        assert_eq!(n, 2);
        assert_eq!(dst[0], src[0]);
        assert_eq!(dst[9], src[3]);
        assert_eq!(dst[2].y, dst[3].y);
        assert_eq!(dst[5].y, dst[6].y);
    }

    #[test]
    fn test_chop_mono_cubic_at_y() {
        let src = [p(0.0, 0.0), p(0.0, 3.0), p(0.0, 6.0), p(0.0, 9.0)];
        let t = chop_mono_cubic_at_y(&src, 4.5).unwrap();
        assert!((t - 0.5).abs() < 1e-4);
        assert!(chop_mono_cubic_at_y(&src, 20.0).is_none());
        assert_eq!(chop_mono_cubic_at_y(&src, 0.0), Some(0.0));
    }

    #[test]
    fn test_eval_cubic_coord() {
        assert!((eval_cubic_coord(0.0, 0.0, 10.0, 10.0, 0.5) - 5.0).abs() < 1e-6);
        assert_eq!(eval_cubic_coord(1.0, 2.0, 3.0, 4.0, 0.0), 1.0);
    }

    #[test]
    fn test_quad_tangent_degenerate_end() {
        let src = [p(0.0, 0.0), p(0.0, 0.0), p(10.0, 0.0)];
        assert_eq!(eval_quad_tangent_at(&src, 0.0), p(10.0, 0.0));
    }

    #[test]
    fn test_conic_quarter_circle_midpoint() {
        let w = crate::math::SCALAR_ROOT2_OVER2;
        let c = Conic::new([p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)], w);
        let mid = c.eval_at(0.5);
        let r = (mid.x * mid.x + mid.y * mid.y).sqrt();
        assert!((r - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_conic_chop_at_y_extrema() {
        let w = crate::math::SCALAR_ROOT2_OVER2;
        // Half circle bulging downward has a Y extremum at the middle.
        let c = Conic::new([p(-1.0, 0.0), p(0.0, 1.0), p(1.0, 0.0)], w);
        let halves = c.chop_at_y_extrema().unwrap();
        assert_eq!(halves[0].pts[0], c.pts[0]);
        assert_eq!(halves[1].pts[2], c.pts[2]);
        assert_eq!(halves[0].pts[2].y, halves[0].pts[1].y);
        assert!(halves[0].pts[2].y > 0.0);
    }

    #[test]
    fn test_transform_w_affine_is_identity() {
        let pts = [p(0.0, 0.0), p(1.0, 1.0), p(2.0, 0.0)];
        let m = Matrix::new_scaling(3.0, 2.0);
        assert_eq!(Conic::transform_w(&pts, 0.5, &m), 0.5);
    }
}
