//! Foundation types shared by every path module.
//!
//! Points, rectangles, verbs, fill rules and the small enums that describe
//! winding direction and convexity.

// ============================================================================
// Point
// ============================================================================

/// A 2D point (or vector) with `f32` coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Vectors share the point representation.
pub type Vector = Point;

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn set(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// `self × v` (z component of the 3D cross product).
    #[inline]
    pub fn cross(&self, v: Vector) -> f32 {
        self.x * v.y - self.y * v.x
    }

    #[inline]
    pub fn dot(&self, v: Vector) -> f32 {
        self.x * v.x + self.y * v.y
    }

    #[inline]
    pub fn length_sqd(&self) -> f32 {
        self.dot(*self)
    }

    pub fn offset(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }
}

impl core::ops::Sub for Point {
    type Output = Vector;
    fn sub(self, rhs: Point) -> Vector {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl core::ops::Add for Point {
    type Output = Point;
    fn add(self, rhs: Vector) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl core::ops::Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Point::new(x, y)
    }
}

// ============================================================================
// Rect
// ============================================================================

/// An axis-aligned rectangle defined by two corner points.
///
/// `x1,y1` is the left/top edge and `x2,y2` the right/bottom edge once the
/// rectangle is sorted. Constructors do not sort; call [`Rect::sorted`] when
/// the corners may be swapped.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Rect {
    pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn from_xywh(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(x, y, x + w, y + h)
    }

    pub const fn empty() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// The bounds of two points, in any order.
    pub fn from_points(a: Point, b: Point) -> Self {
        Self::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    pub fn center_x(&self) -> f32 {
        // Halve before adding so huge finite coordinates do not overflow.
        self.x1 * 0.5 + self.x2 * 0.5
    }

    pub fn center_y(&self) -> f32 {
        self.y1 * 0.5 + self.y2 * 0.5
    }

    pub fn half_width(&self) -> f32 {
        self.x2 * 0.5 - self.x1 * 0.5
    }

    pub fn half_height(&self) -> f32 {
        self.y2 * 0.5 - self.y1 * 0.5
    }

    /// True when the rectangle has no area or is unsorted. NaN edges count
    /// as empty.
    pub fn is_empty(&self) -> bool {
        !(self.x1 < self.x2 && self.y1 < self.y2)
    }

    pub fn is_sorted(&self) -> bool {
        self.x1 <= self.x2 && self.y1 <= self.y2
    }

    pub fn is_finite(&self) -> bool {
        self.x1.is_finite() && self.y1.is_finite() && self.x2.is_finite() && self.y2.is_finite()
    }

    /// Copy with `x1 <= x2` and `y1 <= y2`. NaN edges are kept.
    pub fn sorted(&self) -> Self {
        let (x1, x2) = if self.x1 > self.x2 { (self.x2, self.x1) } else { (self.x1, self.x2) };
        let (y1, y2) = if self.y1 > self.y2 { (self.y2, self.y1) } else { (self.y1, self.y2) };
        Self::new(x1, y1, x2, y2)
    }

    /// Grow to include `r` without checking either rectangle for emptiness.
    pub fn join_no_empty_check(&mut self, r: &Rect) {
        self.x1 = self.x1.min(r.x1);
        self.y1 = self.y1.min(r.y1);
        self.x2 = self.x2.max(r.x2);
        self.y2 = self.y2.max(r.y2);
    }

    /// Inclusive point test on all four edges.
    pub fn contains_inclusive(&self, x: f32, y: f32) -> bool {
        self.x1 <= x && x <= self.x2 && self.y1 <= y && y <= self.y2
    }

    /// Corners in path order: left-top, right-top, right-bottom, left-bottom.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x1, self.y1),
            Point::new(self.x2, self.y1),
            Point::new(self.x2, self.y2),
            Point::new(self.x1, self.y2),
        ]
    }
}

// ============================================================================
// Verbs and segment masks
// ============================================================================

/// A path construction instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Verb {
    Move = 0,
    Line = 1,
    Quad = 2,
    Conic = 3,
    Cubic = 4,
    Close = 5,
}

impl Verb {
    /// Points stored for this verb (the start point of a curve is the
    /// previous verb's last point and is not stored again).
    pub const fn points_consumed(self) -> usize {
        match self {
            Verb::Move | Verb::Line => 1,
            Verb::Quad | Verb::Conic => 2,
            Verb::Cubic => 3,
            Verb::Close => 0,
        }
    }

    /// Conic weights stored for this verb.
    pub const fn weights_consumed(self) -> usize {
        match self {
            Verb::Conic => 1,
            _ => 0,
        }
    }

    /// Segment mask bit contributed by this verb.
    pub const fn segment_mask(self) -> u8 {
        match self {
            Verb::Line => SEGMENT_MASK_LINE,
            Verb::Quad => SEGMENT_MASK_QUAD,
            Verb::Conic => SEGMENT_MASK_CONIC,
            Verb::Cubic => SEGMENT_MASK_CUBIC,
            Verb::Move | Verb::Close => 0,
        }
    }

    /// True for Line, Quad, Conic and Cubic.
    pub const fn is_drawing(self) -> bool {
        !matches!(self, Verb::Move | Verb::Close)
    }
}

pub const SEGMENT_MASK_LINE: u8 = 1 << 0;
pub const SEGMENT_MASK_QUAD: u8 = 1 << 1;
pub const SEGMENT_MASK_CONIC: u8 = 1 << 2;
pub const SEGMENT_MASK_CUBIC: u8 = 1 << 3;

// ============================================================================
// Fill rule and direction
// ============================================================================

/// Fill rule applied when deciding which points are inside a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FillType {
    #[default]
    Winding,
    EvenOdd,
    InverseWinding,
    InverseEvenOdd,
}

impl FillType {
    pub fn is_even_odd(self) -> bool {
        matches!(self, FillType::EvenOdd | FillType::InverseEvenOdd)
    }

    pub fn is_inverse(self) -> bool {
        matches!(self, FillType::InverseWinding | FillType::InverseEvenOdd)
    }

    /// The same rule with the inverse flag flipped.
    pub fn toggle_inverse(self) -> Self {
        match self {
            FillType::Winding => FillType::InverseWinding,
            FillType::EvenOdd => FillType::InverseEvenOdd,
            FillType::InverseWinding => FillType::Winding,
            FillType::InverseEvenOdd => FillType::EvenOdd,
        }
    }
}

/// Winding direction requested by the shape helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PathDirection {
    #[default]
    Cw,
    Ccw,
}

/// Cached winding direction of a path's first (outer) contour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FirstDirection {
    Cw = 0,
    Ccw = 1,
    Unknown = 2,
}

impl FirstDirection {
    pub(crate) fn from_u8(v: u8) -> Self {
        match v {
            0 => FirstDirection::Cw,
            1 => FirstDirection::Ccw,
            _ => FirstDirection::Unknown,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            FirstDirection::Cw => FirstDirection::Ccw,
            FirstDirection::Ccw => FirstDirection::Cw,
            FirstDirection::Unknown => FirstDirection::Unknown,
        }
    }
}

impl From<PathDirection> for FirstDirection {
    fn from(dir: PathDirection) -> Self {
        match dir {
            PathDirection::Cw => FirstDirection::Cw,
            PathDirection::Ccw => FirstDirection::Ccw,
        }
    }
}

/// Cached convexity of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Convexity {
    Convex = 0,
    Concave = 1,
    Unknown = 2,
}

impl Convexity {
    pub(crate) fn from_u8(v: u8) -> Self {
        match v {
            0 => Convexity::Convex,
            1 => Convexity::Concave,
            _ => Convexity::Unknown,
        }
    }
}

/// How `add_path` joins the source to the destination's last contour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddPathMode {
    /// Source contours are appended as new contours.
    #[default]
    Append,
    /// The first source contour continues the destination's last contour
    /// with a connecting line.
    Extend,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_sorted_and_empty() {
        let r = Rect::new(10.0, 20.0, 0.0, 5.0).sorted();
        assert_eq!(r, Rect::new(0.0, 5.0, 10.0, 20.0));
        assert!(!r.is_empty());
        assert!(Rect::new(0.0, 0.0, 0.0, 10.0).is_empty());
        assert!(Rect::new(f32::NAN, 0.0, 1.0, 1.0).is_empty());
    }

    #[test]
    fn test_rect_center_and_halves() {
        let r = Rect::new(0.0, 0.0, 10.0, 4.0);
        assert_eq!(r.center_x(), 5.0);
        assert_eq!(r.center_y(), 2.0);
        assert_eq!(r.half_width(), 5.0);
        assert_eq!(r.half_height(), 2.0);
    }

    #[test]
    fn test_point_finite() {
        assert!(Point::new(1.0, 2.0).is_finite());
        assert!(!Point::new(f32::NAN, 2.0).is_finite());
        assert!(!Point::new(1.0, f32::INFINITY).is_finite());
    }

    #[test]
    fn test_cross_sign_is_clockwise_in_y_down() {
        // Right then down is a clockwise turn on screen.
        let a = Point::new(1.0, 0.0);
        let b = Point::new(0.0, 1.0);
        assert!(a.cross(b) > 0.0);
    }

    #[test]
    fn test_verb_table() {
        let total: usize = [Verb::Move, Verb::Line, Verb::Quad, Verb::Conic, Verb::Cubic, Verb::Close]
            .iter()
            .map(|v| v.points_consumed())
            .sum();
        assert_eq!(total, 9);
        assert_eq!(Verb::Conic.weights_consumed(), 1);
        assert_eq!(Verb::Quad.weights_consumed(), 0);
        assert_eq!(Verb::Cubic.segment_mask(), SEGMENT_MASK_CUBIC);
    }

    #[test]
    fn test_fill_type_toggle() {
        assert_eq!(FillType::Winding.toggle_inverse(), FillType::InverseWinding);
        assert!(FillType::InverseEvenOdd.is_even_odd());
        assert!(FillType::InverseEvenOdd.is_inverse());
        assert!(!FillType::EvenOdd.is_inverse());
    }
}
