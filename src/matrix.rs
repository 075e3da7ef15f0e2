//! 3×3 projective transformation matrix.
//!
//! Used by `Path::transform` and `add_path`. Affine matrices leave the
//! perspective row at `[0, 0, 1]`.

use crate::basics::{Point, Rect};

// ============================================================================
// Matrix
// ============================================================================

/// Projective 2D transformation.
///
/// ```text
/// | sx  shx tx |
/// | shy  sy ty |
/// | w0   w1 w2 |
/// ```
///
/// Transform: `m = 1/(x*w0 + y*w1 + w2)`, then
/// `x' = m*(x*sx + y*shx + tx)`, `y' = m*(x*shy + y*sy + ty)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub sx: f32,
    pub shy: f32,
    pub w0: f32,
    pub shx: f32,
    pub sy: f32,
    pub w1: f32,
    pub tx: f32,
    pub ty: f32,
    pub w2: f32,
}

/// A point in homogeneous coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Matrix {
    // ====================================================================
    // Construction
    // ====================================================================

    /// Identity matrix.
    pub const fn new() -> Self {
        Self {
            sx: 1.0,
            shy: 0.0,
            w0: 0.0,
            shx: 0.0,
            sy: 1.0,
            w1: 0.0,
            tx: 0.0,
            ty: 0.0,
            w2: 1.0,
        }
    }

    /// Affine matrix from six components.
    pub fn new_affine(sx: f32, shy: f32, shx: f32, sy: f32, tx: f32, ty: f32) -> Self {
        Self {
            sx,
            shy,
            shx,
            sy,
            tx,
            ty,
            ..Self::new()
        }
    }

    /// Full matrix in row order: `[sx, shx, tx, shy, sy, ty, w0, w1, w2]`.
    pub fn new_from_rows(m: [f32; 9]) -> Self {
        Self {
            sx: m[0],
            shx: m[1],
            tx: m[2],
            shy: m[3],
            sy: m[4],
            ty: m[5],
            w0: m[6],
            w1: m[7],
            w2: m[8],
        }
    }

    pub fn new_translation(tx: f32, ty: f32) -> Self {
        Self::new_affine(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub fn new_scaling(sx: f32, sy: f32) -> Self {
        Self::new_affine(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation by `degrees` about the origin. Sines and cosines that are
    /// nearly zero snap to exactly zero so right angles stay axis-aligned.
    pub fn new_rotation(degrees: f32) -> Self {
        let rad = degrees.to_radians();
        let snap = |v: f32| if v.abs() <= 1.0 / 4096.0 { 0.0 } else { v };
        let (s, c) = (snap(rad.sin()), snap(rad.cos()));
        Self::new_affine(c, s, -s, c, 0.0, 0.0)
    }

    // ====================================================================
    // Operations
    // ====================================================================

    /// `self = a * self` (apply `self` first, then `a`).
    pub fn multiply(&mut self, a: &Matrix) {
        let b = *self;
        self.sx = a.sx * b.sx + a.shx * b.shy + a.tx * b.w0;
        self.shx = a.sx * b.shx + a.shx * b.sy + a.tx * b.w1;
        self.tx = a.sx * b.tx + a.shx * b.ty + a.tx * b.w2;
        self.shy = a.shy * b.sx + a.sy * b.shy + a.ty * b.w0;
        self.sy = a.shy * b.shx + a.sy * b.sy + a.ty * b.w1;
        self.ty = a.shy * b.tx + a.sy * b.ty + a.ty * b.w2;
        self.w0 = a.w0 * b.sx + a.w1 * b.shy + a.w2 * b.w0;
        self.w1 = a.w0 * b.shx + a.w1 * b.sy + a.w2 * b.w1;
        self.w2 = a.w0 * b.tx + a.w1 * b.ty + a.w2 * b.w2;
    }

    /// Matrix that applies `self` and then `a`.
    pub fn then(&self, a: &Matrix) -> Matrix {
        let mut m = *self;
        m.multiply(a);
        m
    }

    // ====================================================================
    // Predicates
    // ====================================================================

    pub fn is_identity(&self) -> bool {
        *self == Self::new()
    }

    pub fn has_perspective(&self) -> bool {
        self.w0 != 0.0 || self.w1 != 0.0 || self.w2 != 1.0
    }

    /// No skew and no perspective.
    pub fn is_scale_translate(&self) -> bool {
        !self.has_perspective() && self.shx == 0.0 && self.shy == 0.0
    }

    /// True when axis-aligned rectangles map to axis-aligned rectangles:
    /// either the diagonal or the anti-diagonal of the 2×2 part is zero and
    /// the other pair is non-zero.
    pub fn rect_stays_rect(&self) -> bool {
        if self.has_perspective() {
            return false;
        }
        let diag = self.sx != 0.0 && self.sy != 0.0 && self.shx == 0.0 && self.shy == 0.0;
        let anti = self.sx == 0.0 && self.sy == 0.0 && self.shx != 0.0 && self.shy != 0.0;
        diag || anti
    }

    /// Determinant of the 2×2 linear part.
    pub fn determinant_2x2(&self) -> f32 {
        self.sx * self.sy - self.shx * self.shy
    }

    // ====================================================================
    // Mapping
    // ====================================================================

    pub fn map_point(&self, p: Point) -> Point {
        let x = p.x * self.sx + p.y * self.shx + self.tx;
        let y = p.x * self.shy + p.y * self.sy + self.ty;
        if self.has_perspective() {
            let w = p.x * self.w0 + p.y * self.w1 + self.w2;
            let m = if w != 0.0 { 1.0 / w } else { w };
            Point::new(x * m, y * m)
        } else {
            Point::new(x, y)
        }
    }

    pub fn map_points_in_place(&self, pts: &mut [Point]) {
        if self.is_identity() {
            return;
        }
        for p in pts.iter_mut() {
            *p = self.map_point(*p);
        }
    }

    /// Maps `(x, y, z)` without the perspective divide.
    pub fn map_homogeneous(&self, p: Point3) -> Point3 {
        Point3 {
            x: p.x * self.sx + p.y * self.shx + p.z * self.tx,
            y: p.x * self.shy + p.y * self.sy + p.z * self.ty,
            z: p.x * self.w0 + p.y * self.w1 + p.z * self.w2,
        }
    }

    /// Bounds of the four mapped corners of `r`.
    pub fn map_rect(&self, r: &Rect) -> Rect {
        let c = r.corners();
        let mut out = Rect::from_points(self.map_point(c[0]), self.map_point(c[1]));
        out.join_no_empty_check(&Rect::from_points(self.map_point(c[2]), self.map_point(c[3])));
        out
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let m = Matrix::new();
        assert!(m.is_identity());
        assert!(!m.has_perspective());
        assert!(m.rect_stays_rect());
        assert_eq!(m.map_point(Point::new(3.0, 4.0)), Point::new(3.0, 4.0));
    }

    #[test]
    fn test_translate_scale() {
        let m = Matrix::new_scaling(2.0, 3.0).then(&Matrix::new_translation(10.0, 20.0));
        let p = m.map_point(Point::new(1.0, 1.0));
        assert_eq!(p, Point::new(12.0, 23.0));
        assert!(m.is_scale_translate());
        assert!(m.determinant_2x2() > 0.0);
    }

    #[test]
    fn test_rotation_snaps_right_angles() {
        let m = Matrix::new_rotation(90.0);
        assert_eq!(m.sx, 0.0);
        assert_eq!(m.sy, 0.0);
        assert!(m.rect_stays_rect());
        assert!(!m.is_scale_translate());
        let p = m.map_point(Point::new(1.0, 0.0));
        assert!((p.x - 0.0).abs() < 1e-6);
        assert!((p.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_mirror_has_negative_determinant() {
        let m = Matrix::new_scaling(-1.0, 1.0);
        assert!(m.determinant_2x2() < 0.0);
        assert!(m.rect_stays_rect());
    }

    #[test]
    fn test_perspective_divide() {
        let m = Matrix::new_from_rows([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 2.0]);
        assert!(m.has_perspective());
        assert!(!m.rect_stays_rect());
        assert_eq!(m.map_point(Point::new(4.0, 6.0)), Point::new(2.0, 3.0));
    }

    #[test]
    fn test_map_rect() {
        let m = Matrix::new_scaling(-2.0, 1.0);
        let r = m.map_rect(&Rect::new(1.0, 1.0, 2.0, 3.0));
        assert_eq!(r, Rect::new(-4.0, 1.0, -2.0, 3.0));
    }
}
