//! Rounded rectangle model.
//!
//! A [`RoundRect`] is a sorted rectangle plus one elliptical radius pair per
//! corner. Every mutator leaves the value valid and classified with the
//! narrowest [`RoundRectType`] that describes it.

use log::trace;

use crate::basics::{Rect, Vector};
use crate::math::{nearly_equal, next_toward_zero};

/// Corner index into the radii array, clockwise from the upper left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    UpperLeft = 0,
    UpperRight = 1,
    LowerRight = 2,
    LowerLeft = 3,
}

/// Classification of a round rect, from most to least constrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum RoundRectType {
    /// Zero width or height.
    #[default]
    Empty,
    /// Non-empty with all corners square.
    Rect,
    /// All radii equal and filling half the width and height.
    Oval,
    /// All radii equal.
    Simple,
    /// Left radii share x, right radii share x, top radii share y and
    /// bottom radii share y.
    NinePatch,
    /// Anything else.
    Complex,
}

/// Rectangle with per-corner elliptical radii.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RoundRect {
    rect: Rect,
    radii: [Vector; 4],
    kind: RoundRectType,
}

impl RoundRect {
    /// Empty round rect at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rect(rect: &Rect) -> Self {
        let mut rr = Self::new();
        rr.set_rect(rect);
        rr
    }

    pub fn from_oval(oval: &Rect) -> Self {
        let mut rr = Self::new();
        rr.set_oval(oval);
        rr
    }

    pub fn from_rect_xy(rect: &Rect, x_rad: f32, y_rad: f32) -> Self {
        let mut rr = Self::new();
        rr.set_rect_xy(rect, x_rad, y_rad);
        rr
    }

    pub fn from_rect_radii(rect: &Rect, radii: &[Vector; 4]) -> Self {
        let mut rr = Self::new();
        rr.set_rect_radii(rect, radii);
        rr
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    pub fn bounds(&self) -> &Rect {
        &self.rect
    }

    pub fn radii(&self, corner: Corner) -> Vector {
        self.radii[corner as usize]
    }

    pub fn all_radii(&self) -> &[Vector; 4] {
        &self.radii
    }

    /// Radius representative of every corner for types up to Simple.
    pub fn simple_radii(&self) -> Vector {
        self.radii[0]
    }

    pub fn kind(&self) -> RoundRectType {
        self.kind
    }

    pub fn width(&self) -> f32 {
        self.rect.width()
    }

    pub fn height(&self) -> f32 {
        self.rect.height()
    }

    pub fn is_empty(&self) -> bool {
        self.kind == RoundRectType::Empty
    }

    pub fn is_rect(&self) -> bool {
        self.kind == RoundRectType::Rect
    }

    pub fn is_oval(&self) -> bool {
        self.kind == RoundRectType::Oval
    }

    pub fn is_simple(&self) -> bool {
        self.kind == RoundRectType::Simple
    }

    pub fn is_nine_patch(&self) -> bool {
        self.kind == RoundRectType::NinePatch
    }

    pub fn is_complex(&self) -> bool {
        self.kind == RoundRectType::Complex
    }

    // ========================================================================
    // Setters
    // ========================================================================

    pub fn set_empty(&mut self) {
        *self = Self::new();
    }

    /// Sorted `rect` with square corners.
    pub fn set_rect(&mut self, rect: &Rect) {
        if !self.initialize_rect(rect) {
            return;
        }
        self.radii = [Vector::zero(); 4];
        self.kind = RoundRectType::Rect;
    }

    /// Ellipse inscribed in `oval`.
    pub fn set_oval(&mut self, oval: &Rect) {
        if !self.initialize_rect(oval) {
            return;
        }
        let x_rad = self.rect.half_width();
        let y_rad = self.rect.half_height();
        if x_rad == 0.0 || y_rad == 0.0 {
            self.radii = [Vector::zero(); 4];
            self.kind = RoundRectType::Rect;
        } else {
            self.radii = [Vector::new(x_rad, y_rad); 4];
            self.kind = RoundRectType::Oval;
        }
        debug_assert!(self.is_valid());
    }

    /// Same radii on every corner, scaled down uniformly to fit.
    pub fn set_rect_xy(&mut self, rect: &Rect, x_rad: f32, y_rad: f32) {
        if !self.initialize_rect(rect) {
            return;
        }

        let (mut x_rad, mut y_rad) = if x_rad.is_finite() && y_rad.is_finite() {
            (x_rad, y_rad)
        } else {
            (0.0, 0.0)
        };

        let width = self.rect.width();
        let height = self.rect.height();
        if width < x_rad + x_rad || height < y_rad + y_rad {
            // At most one of these divides is by zero.
            let scale = (width / (x_rad + x_rad)).min(height / (y_rad + y_rad));
            trace!("round rect radii ({x_rad}, {y_rad}) scaled by {scale}");
            x_rad *= scale;
            y_rad *= scale;
        }

        if x_rad <= 0.0 || y_rad <= 0.0 {
            self.set_rect(rect);
            return;
        }

        self.radii = [Vector::new(x_rad, y_rad); 4];
        self.kind = if x_rad >= self.rect.width() * 0.5 && y_rad >= self.rect.height() * 0.5 {
            RoundRectType::Oval
        } else {
            RoundRectType::Simple
        };
    }

    /// Per-corner radii, in `Corner` order.
    ///
    /// Corners with a non-positive radius on either axis become square. If
    /// the radii on any side sum past that side's length, every radius is
    /// scaled by the smallest side ratio. Results that still fail validation
    /// fall back to a plain rectangle.
    pub fn set_rect_radii(&mut self, rect: &Rect, radii: &[Vector; 4]) {
        if !self.initialize_rect(rect) {
            return;
        }

        if !radii.iter().all(|r| r.is_finite()) {
            self.set_rect(rect);
            return;
        }

        self.radii = *radii;
        if clamp_to_zero(&mut self.radii) {
            self.set_rect(rect);
            return;
        }

        self.scale_radii();

        if !self.is_valid() {
            self.set_rect(rect);
        }
    }

    /// Sort and store `rect`. Returns false (leaving an empty or default
    /// value behind) when there is nothing to round.
    fn initialize_rect(&mut self, rect: &Rect) -> bool {
        // Sorting would hide NaNs, so check first.
        if !rect.is_finite() {
            *self = Self::new();
            return false;
        }
        self.rect = rect.sorted();
        if self.rect.is_empty() {
            self.radii = [Vector::zero(); 4];
            self.kind = RoundRectType::Empty;
            return false;
        }
        true
    }

    fn scale_radii(&mut self) -> bool {
        // Sides may not fit in an f32.
        let width = self.rect.x2 as f64 - self.rect.x1 as f64;
        let height = self.rect.y2 as f64 - self.rect.y1 as f64;

        let r = &self.radii;
        let mut scale = 1.0_f64;
        scale = compute_min_scale(r[0].x, r[1].x, width, scale);
        scale = compute_min_scale(r[1].y, r[2].y, height, scale);
        scale = compute_min_scale(r[2].x, r[3].x, width, scale);
        scale = compute_min_scale(r[3].y, r[0].y, height, scale);

        let [ul, ur, lr, ll] = &mut self.radii;
        flush_to_zero(&mut ul.x, &mut ur.x);
        flush_to_zero(&mut ur.y, &mut lr.y);
        flush_to_zero(&mut lr.x, &mut ll.x);
        flush_to_zero(&mut ll.y, &mut ul.y);

        if scale < 1.0 {
            trace!("round rect radii scaled by {scale}");
            adjust_radii(width, scale, &mut ul.x, &mut ur.x);
            adjust_radii(height, scale, &mut ur.y, &mut lr.y);
            adjust_radii(width, scale, &mut lr.x, &mut ll.x);
            adjust_radii(height, scale, &mut ll.y, &mut ul.y);
        }

        // Scaling may have zeroed one axis of a corner.
        clamp_to_zero(&mut self.radii);
        self.compute_type();

        scale < 1.0
    }

    fn compute_type(&mut self) {
        if self.rect.is_empty() {
            debug_assert!(self.radii.iter().all(|r| r.is_zero()));
            self.kind = RoundRectType::Empty;
            return;
        }

        let r = &self.radii;
        let mut all_radii_equal = true;
        let mut all_corners_square = r[0].x == 0.0 || r[0].y == 0.0;
        for i in 1..4 {
            if r[i].x != 0.0 && r[i].y != 0.0 {
                all_corners_square = false;
            }
            if r[i] != r[i - 1] {
                all_radii_equal = false;
            }
        }

        if all_corners_square {
            self.kind = RoundRectType::Rect;
            return;
        }

        if all_radii_equal {
            self.kind = if r[0].x >= self.rect.width() * 0.5 && r[0].y >= self.rect.height() * 0.5 {
                RoundRectType::Oval
            } else {
                RoundRectType::Simple
            };
            return;
        }

        self.kind = if radii_are_nine_patch(r) {
            RoundRectType::NinePatch
        } else {
            RoundRectType::Complex
        };

        if !self.is_valid() {
            let rect = self.rect;
            self.set_rect(&rect);
        }
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// True when the rect, radii and type are mutually consistent.
    pub fn is_valid(&self) -> bool {
        if !Self::are_rect_and_radii_valid(&self.rect, &self.radii) {
            return false;
        }

        let r = &self.radii;
        let mut all_radii_zero = r[0].is_zero();
        let mut all_corners_square = r[0].x == 0.0 || r[0].y == 0.0;
        let mut all_radii_same = true;
        for i in 1..4 {
            if !r[i].is_zero() {
                all_radii_zero = false;
            }
            if r[i] != r[i - 1] {
                all_radii_same = false;
            }
            if r[i].x != 0.0 && r[i].y != 0.0 {
                all_corners_square = false;
            }
        }
        let nine_patch = radii_are_nine_patch(r);
        let empty = self.rect.is_empty();

        match self.kind {
            RoundRectType::Empty => empty && all_radii_zero && all_radii_same && all_corners_square,
            RoundRectType::Rect => !empty && all_radii_zero && all_radii_same && all_corners_square,
            RoundRectType::Oval => {
                let half_w = self.rect.half_width();
                let half_h = self.rect.half_height();
                !empty
                    && !all_radii_zero
                    && all_radii_same
                    && !all_corners_square
                    && r.iter()
                        .all(|v| nearly_equal(v.x, half_w) && nearly_equal(v.y, half_h))
            }
            RoundRectType::Simple => {
                !empty && !all_radii_zero && all_radii_same && !all_corners_square
            }
            RoundRectType::NinePatch => {
                !empty && !all_radii_zero && !all_radii_same && !all_corners_square && nine_patch
            }
            RoundRectType::Complex => {
                !empty && !all_radii_zero && !all_radii_same && !all_corners_square && !nine_patch
            }
        }
    }

    /// True when `rect` is finite and sorted and every radius fits inside
    /// its axis without overflowing either edge.
    pub fn are_rect_and_radii_valid(rect: &Rect, radii: &[Vector; 4]) -> bool {
        if !rect.is_finite() || !rect.is_sorted() {
            return false;
        }
        radii.iter().all(|r| {
            radius_fits(r.x, rect.x1, rect.x2) && radius_fits(r.y, rect.y1, rect.y2)
        })
    }
}

fn radius_fits(rad: f32, min: f32, max: f32) -> bool {
    min <= max && rad <= max - min && min + rad <= max && max - rad >= min && rad >= 0.0
}

fn radii_are_nine_patch(r: &[Vector; 4]) -> bool {
    let (ul, ur, lr, ll) = (r[0], r[1], r[2], r[3]);
    ul.x == ll.x && ul.y == ur.y && ur.x == lr.x && ll.y == lr.y
}

/// Zero both axes of any corner with a non-positive radius. Returns true if
/// every corner ends up square.
fn clamp_to_zero(radii: &mut [Vector; 4]) -> bool {
    let mut all_square = true;
    for r in radii.iter_mut() {
        if r.x <= 0.0 || r.y <= 0.0 {
            // The other axis may still be non-zero here; it only matters
            // for the scale computed before clamping.
            *r = Vector::zero();
        } else {
            all_square = false;
        }
    }
    all_square
}

// Evaluated in f64: one huge radius can swamp a small one in f32.
fn compute_min_scale(rad1: f32, rad2: f32, limit: f64, cur_min: f64) -> f64 {
    let sum = rad1 as f64 + rad2 as f64;
    if sum > limit {
        cur_min.min(limit / sum)
    } else {
        cur_min
    }
}

/// A radius too small to change the sum of the pair is dropped.
fn flush_to_zero(a: &mut f32, b: &mut f32) {
    if *a + *b == *a {
        *b = 0.0;
    } else if *a + *b == *b {
        *a = 0.0;
    }
}

/// Scale a radius pair and, if rounding still leaves the pair longer than
/// `limit`, shrink the larger radius one ULP at a time until it fits.
fn adjust_radii(limit: f64, scale: f64, a: &mut f32, b: &mut f32) {
    *a = (*a as f64 * scale) as f32;
    *b = (*b as f64 * scale) as f32;

    if (*a + *b) as f64 > limit {
        let (min_radius, max_radius) = if *a > *b { (b, a) } else { (a, b) };
        let new_min = *min_radius;
        let mut new_max = (limit - new_min as f64) as f32;
        while (new_max + new_min) as f64 > limit {
            new_max = next_toward_zero(new_max);
        }
        *max_radius = new_max;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32) -> Vector {
        Vector::new(x, y)
    }

    #[test]
    fn test_default_is_empty() {
        let rr = RoundRect::new();
        assert!(rr.is_empty());
        assert!(rr.is_valid());
    }

    #[test]
    fn test_set_rect_sorts() {
        let rr = RoundRect::from_rect(&Rect::new(10.0, 10.0, 0.0, 0.0));
        assert!(rr.is_rect());
        assert_eq!(*rr.rect(), Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_non_finite_rect_is_default() {
        let rr = RoundRect::from_rect_xy(&Rect::new(0.0, 0.0, f32::NAN, 5.0), 1.0, 1.0);
        assert_eq!(rr, RoundRect::new());
    }

    #[test]
    fn test_oval() {
        let rr = RoundRect::from_oval(&Rect::new(0.0, 0.0, 10.0, 6.0));
        assert!(rr.is_oval());
        assert_eq!(rr.radii(Corner::LowerLeft), v(5.0, 3.0));
        let flat = RoundRect::from_oval(&Rect::new(0.0, 0.0, 10.0, 0.0));
        assert!(flat.is_empty());
    }

    #[test]
    fn test_rect_xy_scales_to_fit() {
        let rr = RoundRect::from_rect_xy(&Rect::new(0.0, 0.0, 10.0, 4.0), 8.0, 8.0);
        assert_eq!(rr.simple_radii(), v(2.0, 2.0));
        assert!(rr.is_simple());
    }

    #[test]
    fn test_rect_radii_uniform_scale() {
        let radii = [v(8.0, 8.0); 4];
        let rr = RoundRect::from_rect_radii(&Rect::new(0.0, 0.0, 10.0, 4.0), &radii);
        for r in rr.all_radii() {
            assert_eq!(*r, v(2.0, 2.0));
        }
        // Half the height, but less than half the width.
        assert_eq!(rr.kind(), RoundRectType::Simple);
    }

    #[test]
    fn test_negative_radius_squares_corner() {
        let radii = [v(2.0, 2.0), v(-1.0, 3.0), v(2.0, 2.0), v(2.0, 2.0)];
        let rr = RoundRect::from_rect_radii(&Rect::new(0.0, 0.0, 20.0, 20.0), &radii);
        assert_eq!(rr.radii(Corner::UpperRight), Vector::zero());
        assert_eq!(rr.kind(), RoundRectType::Complex);
    }

    #[test]
    fn test_all_square_is_rect() {
        let radii = [v(0.0, 2.0), v(3.0, 0.0), v(-1.0, 1.0), v(0.0, 0.0)];
        let rr = RoundRect::from_rect_radii(&Rect::new(0.0, 0.0, 20.0, 20.0), &radii);
        assert!(rr.is_rect());
    }

    #[test]
    fn test_non_finite_radii_become_rect() {
        let radii = [v(f32::INFINITY, 1.0), v(1.0, 1.0), v(1.0, 1.0), v(1.0, 1.0)];
        let rr = RoundRect::from_rect_radii(&Rect::new(0.0, 0.0, 20.0, 20.0), &radii);
        assert!(rr.is_rect());
    }

    #[test]
    fn test_nine_patch() {
        let radii = [v(1.0, 2.0), v(3.0, 2.0), v(3.0, 4.0), v(1.0, 4.0)];
        let rr = RoundRect::from_rect_radii(&Rect::new(0.0, 0.0, 20.0, 20.0), &radii);
        assert!(rr.is_nine_patch());
        assert!(rr.is_valid());
    }

    #[test]
    fn test_equal_radii_filling_rect_is_oval() {
        let radii = [v(5.0, 2.0); 4];
        let rr = RoundRect::from_rect_radii(&Rect::new(0.0, 0.0, 10.0, 4.0), &radii);
        assert!(rr.is_oval());
    }

    #[test]
    fn test_adjust_radii_fits_limit() {
        let mut a = 1.0e8_f32;
        let mut b = 1.0_f32;
        let limit = 3.0_f64;
        let scale = limit / (a as f64 + b as f64);
        adjust_radii(limit, scale, &mut a, &mut b);
        assert!((a + b) as f64 <= limit);
        assert!(b < a);
    }

    #[test]
    fn test_flush_to_zero() {
        let mut a = 1.0e10_f32;
        let mut b = 1.0_f32;
        flush_to_zero(&mut a, &mut b);
        assert_eq!(b, 0.0);
        assert_eq!(a, 1.0e10);
    }

    #[test]
    fn test_are_rect_and_radii_valid() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(RoundRect::are_rect_and_radii_valid(&r, &[v(5.0, 5.0); 4]));
        assert!(!RoundRect::are_rect_and_radii_valid(&r, &[v(11.0, 5.0); 4]));
        assert!(!RoundRect::are_rect_and_radii_valid(&r, &[v(-1.0, 5.0); 4]));
        let unsorted = Rect::new(10.0, 0.0, 0.0, 10.0);
        assert!(!RoundRect::are_rect_and_radii_valid(&unsorted, &[Vector::zero(); 4]));
    }
}
