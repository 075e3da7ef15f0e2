//! Point generators for the rectangle, oval and round-rect helpers.
//!
//! Each generator holds the characteristic points of one shape and walks
//! them cyclically from a start index, clockwise or counter-clockwise.

use crate::basics::{PathDirection, Point, Rect};
use crate::round_rect::{Corner, RoundRect};

/// Cyclic walk over `N` precomputed points.
#[derive(Debug, Clone)]
pub struct PointCycle<const N: usize> {
    pts: [Point; N],
    current: usize,
    advance: usize,
}

impl<const N: usize> PointCycle<N> {
    fn new(pts: [Point; N], dir: PathDirection, start: u32) -> Self {
        Self {
            pts,
            current: start as usize % N,
            advance: match dir {
                PathDirection::Cw => 1,
                PathDirection::Ccw => N - 1,
            },
        }
    }

    pub fn current(&self) -> Point {
        self.pts[self.current]
    }

    /// Step once in the walk direction and return the new current point.
    pub fn advance(&mut self) -> Point {
        self.current = (self.current + self.advance) % N;
        self.current()
    }
}

/// Corners: left-top, right-top, right-bottom, left-bottom.
pub fn rect_points(rect: &Rect, dir: PathDirection, start: u32) -> PointCycle<4> {
    PointCycle::new(rect.corners(), dir, start)
}

/// Side midpoints: top, right, bottom, left.
pub fn oval_points(oval: &Rect, dir: PathDirection, start: u32) -> PointCycle<4> {
    let cx = oval.center_x();
    let cy = oval.center_y();
    let pts = [
        Point::new(cx, oval.y1),
        Point::new(oval.x2, cy),
        Point::new(cx, oval.y2),
        Point::new(oval.x1, cy),
    ];
    PointCycle::new(pts, dir, start)
}

/// Where each corner arc meets a straight side, two per side, starting at
/// the top edge next to the upper-left corner.
pub fn rrect_points(rrect: &RoundRect, dir: PathDirection, start: u32) -> PointCycle<8> {
    let b = rrect.bounds();
    let ul = rrect.radii(Corner::UpperLeft);
    let ur = rrect.radii(Corner::UpperRight);
    let lr = rrect.radii(Corner::LowerRight);
    let ll = rrect.radii(Corner::LowerLeft);
    let pts = [
        Point::new(b.x1 + ul.x, b.y1),
        Point::new(b.x2 - ur.x, b.y1),
        Point::new(b.x2, b.y1 + ur.y),
        Point::new(b.x2, b.y2 - lr.y),
        Point::new(b.x2 - lr.x, b.y2),
        Point::new(b.x1 + ll.x, b.y2),
        Point::new(b.x1, b.y2 - ll.y),
        Point::new(b.x1, b.y1 + ul.y),
    ];
    PointCycle::new(pts, dir, start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_cw_from_zero() {
        let mut it = rect_points(&Rect::new(0.0, 0.0, 10.0, 5.0), PathDirection::Cw, 0);
        assert_eq!(it.current(), Point::new(0.0, 0.0));
        assert_eq!(it.advance(), Point::new(10.0, 0.0));
        assert_eq!(it.advance(), Point::new(10.0, 5.0));
        assert_eq!(it.advance(), Point::new(0.0, 5.0));
        assert_eq!(it.advance(), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_rect_ccw_wraps_start() {
        let mut it = rect_points(&Rect::new(0.0, 0.0, 10.0, 5.0), PathDirection::Ccw, 5);
        assert_eq!(it.current(), Point::new(10.0, 0.0));
        assert_eq!(it.advance(), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_oval_points() {
        let it = oval_points(&Rect::new(0.0, 0.0, 10.0, 6.0), PathDirection::Cw, 1);
        assert_eq!(it.current(), Point::new(10.0, 3.0));
    }

    #[test]
    fn test_rrect_points() {
        let rr = RoundRect::from_rect_xy(&Rect::new(0.0, 0.0, 20.0, 10.0), 2.0, 3.0);
        let mut it = rrect_points(&rr, PathDirection::Cw, 0);
        assert_eq!(it.current(), Point::new(2.0, 0.0));
        assert_eq!(it.advance(), Point::new(18.0, 0.0));
        assert_eq!(it.advance(), Point::new(20.0, 3.0));
        let it = rrect_points(&rr, PathDirection::Ccw, 7);
        assert_eq!(it.current(), Point::new(0.0, 3.0));
    }
}
