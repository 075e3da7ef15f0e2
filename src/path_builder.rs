//! Append-only path construction.
//!
//! [`PathBuilder`] records verbs, points and conic weights in plain vectors
//! and hands them to a [`Path`] in one step. It remembers whether it has only
//! seen moves or a single oval or round rect so the finished path can carry
//! the shape hint and a known convexity.

use std::sync::Arc;

use log::trace;

use crate::basics::{Convexity, FillType, FirstDirection, PathDirection, Point, Rect, Verb};
use crate::bounding_rect::bounding_rect;
use crate::math::SCALAR_ROOT2_OVER2;
use crate::path::{Path, DEFAULT_OVAL_START};
use crate::path_storage::{PathEditor, PathStorage};
use crate::round_rect::RoundRect;
use crate::shape_points::{oval_points, rect_points, rrect_points};

/// What the builder has recorded so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IsA {
    /// Nothing but move verbs, possibly none.
    #[default]
    JustMoves,
    MoreThanMoves,
    /// Exactly one oval added to an otherwise empty builder.
    Oval,
    /// Exactly one round rect added to an otherwise empty builder.
    RRect,
}

#[derive(Debug, Clone)]
pub struct PathBuilder {
    points: Vec<Point>,
    verbs: Vec<Verb>,
    conic_weights: Vec<f32>,
    fill_type: FillType,
    segment_mask: u8,

    last_move_point: Point,
    /// Point index of the current contour's move, `-1` before any move.
    last_move_index: i32,
    /// Set after a close (and initially): the next drawing verb injects a
    /// move back to `last_move_point`.
    needs_move_verb: bool,

    is_a: IsA,
    is_a_start: u32,
    is_a_ccw: bool,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            verbs: Vec::new(),
            conic_weights: Vec::new(),
            fill_type: FillType::Winding,
            segment_mask: 0,
            last_move_point: Point::zero(),
            last_move_index: -1,
            needs_move_verb: true,
            is_a: IsA::JustMoves,
            is_a_start: 0,
            is_a_ccw: false,
        }
    }

    pub fn with_fill_type(fill_type: FillType) -> Self {
        let mut b = Self::new();
        b.fill_type = fill_type;
        b
    }

    // ------------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------------

    pub fn fill_type(&self) -> FillType {
        self.fill_type
    }

    pub fn set_fill_type(&mut self, fill_type: FillType) -> &mut Self {
        self.fill_type = fill_type;
        self
    }

    pub fn toggle_inverse_fill_type(&mut self) -> &mut Self {
        self.fill_type = self.fill_type.toggle_inverse();
        self
    }

    pub fn is_a(&self) -> IsA {
        self.is_a
    }

    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
    }

    pub fn count_points(&self) -> usize {
        self.points.len()
    }

    pub fn count_verbs(&self) -> usize {
        self.verbs.len()
    }

    /// Bounds of every recorded point, `None` if any is not finite.
    pub fn compute_bounds(&self) -> Option<Rect> {
        bounding_rect(&self.points)
    }

    pub fn inc_reserve(&mut self, extra_points: usize, extra_verbs: usize) -> &mut Self {
        self.points.reserve(extra_points);
        self.verbs.reserve(extra_verbs);
        self
    }

    /// Forget everything, including the fill rule.
    pub fn reset(&mut self) -> &mut Self {
        *self = Self::new();
        self
    }

    // ------------------------------------------------------------------------
    // Verb appends
    // ------------------------------------------------------------------------

    fn push_verb(&mut self, verb: Verb) {
        self.verbs.push(verb);
        self.segment_mask |= verb.segment_mask();
    }

    /// Every drawing verb goes through here.
    fn ensure_move(&mut self) {
        self.is_a = IsA::MoreThanMoves;
        if self.needs_move_verb {
            self.move_to_pt(self.last_move_point);
        }
    }

    pub fn move_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.move_to_pt(Point::new(x, y))
    }

    pub fn move_to_pt(&mut self, p: Point) -> &mut Self {
        // A trailing move would leave a hinted shape with the wrong bounds.
        if matches!(self.is_a, IsA::Oval | IsA::RRect) {
            self.is_a = IsA::MoreThanMoves;
        }
        self.last_move_index = self.points.len() as i32;
        self.last_move_point = p;
        self.points.push(p);
        self.push_verb(Verb::Move);
        self.needs_move_verb = false;
        self
    }

    pub fn line_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.line_to_pt(Point::new(x, y))
    }

    pub fn line_to_pt(&mut self, p: Point) -> &mut Self {
        self.ensure_move();
        self.points.push(p);
        self.push_verb(Verb::Line);
        self
    }

    pub fn quad_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> &mut Self {
        self.quad_to_pts(Point::new(x1, y1), Point::new(x2, y2))
    }

    pub fn quad_to_pts(&mut self, p1: Point, p2: Point) -> &mut Self {
        self.ensure_move();
        self.points.extend_from_slice(&[p1, p2]);
        self.push_verb(Verb::Quad);
        self
    }

    pub fn conic_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, w: f32) -> &mut Self {
        self.conic_to_pts(Point::new(x1, y1), Point::new(x2, y2), w)
    }

    /// Same demotion rules as [`Path::conic_to`].
    pub fn conic_to_pts(&mut self, p1: Point, p2: Point, w: f32) -> &mut Self {
        if !(w > 0.0) {
            trace!("conic weight {w} demoted to a line");
            return self.line_to_pt(p2);
        }
        if !w.is_finite() {
            trace!("infinite conic weight demoted to two lines");
            self.line_to_pt(p1);
            return self.line_to_pt(p2);
        }
        if w == 1.0 {
            return self.quad_to_pts(p1, p2);
        }
        self.ensure_move();
        self.points.extend_from_slice(&[p1, p2]);
        self.conic_weights.push(w);
        self.push_verb(Verb::Conic);
        self
    }

    pub fn cubic_to(
        &mut self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        x3: f32,
        y3: f32,
    ) -> &mut Self {
        self.cubic_to_pts(Point::new(x1, y1), Point::new(x2, y2), Point::new(x3, y3))
    }

    pub fn cubic_to_pts(&mut self, p1: Point, p2: Point, p3: Point) -> &mut Self {
        self.ensure_move();
        self.points.extend_from_slice(&[p1, p2, p3]);
        self.push_verb(Verb::Cubic);
        self
    }

    /// Close the current contour. No-op on an empty builder or right after
    /// another close.
    pub fn close(&mut self) -> &mut Self {
        match self.verbs.last() {
            None | Some(Verb::Close) => {}
            Some(_) => {
                self.ensure_move();
                self.push_verb(Verb::Close);
                self.needs_move_verb = true;
            }
        }
        self
    }

    /// Lines to each point in turn.
    pub fn polyline_to(&mut self, points: &[Point]) -> &mut Self {
        for &p in points {
            self.line_to_pt(p);
        }
        self
    }

    // ------------------------------------------------------------------------
    // Shapes
    // ------------------------------------------------------------------------

    /// Closed rectangle contour starting at corner `start` (0 = left-top,
    /// then clockwise).
    pub fn add_rect(&mut self, rect: &Rect, dir: PathDirection, start: u32) -> &mut Self {
        let mut corners = rect_points(rect, dir, start);
        self.inc_reserve(4, 5);
        self.move_to_pt(corners.current());
        for _ in 0..3 {
            self.line_to_pt(corners.advance());
        }
        self.close()
    }

    /// Closed oval of four quarter conics starting at side midpoint `start`
    /// (0 = top, then clockwise).
    pub fn add_oval(&mut self, oval: &Rect, dir: PathDirection, start: u32) -> &mut Self {
        let was_just_moves = self.is_a == IsA::JustMoves;

        let mut sides = oval_points(oval, dir, start);
        let corner_offset = match dir {
            PathDirection::Cw => 0,
            PathDirection::Ccw => 1,
        };
        let mut corners = rect_points(oval, dir, start + corner_offset);

        self.inc_reserve(9, 6);
        self.move_to_pt(sides.current());
        for _ in 0..4 {
            let ctrl = corners.advance();
            let end = sides.advance();
            self.conic_to_pts(ctrl, end, SCALAR_ROOT2_OVER2);
        }
        self.close();

        if was_just_moves {
            self.is_a = IsA::Oval;
            self.is_a_ccw = dir == PathDirection::Ccw;
            self.is_a_start = start % 4;
        }
        self
    }

    /// Circle as an oval. Negative radii add nothing.
    pub fn add_circle(&mut self, x: f32, y: f32, r: f32, dir: PathDirection) -> &mut Self {
        if r >= 0.0 {
            self.add_oval(
                &Rect::new(x - r, y - r, x + r, y + r),
                dir,
                DEFAULT_OVAL_START,
            );
        }
        self
    }

    /// Closed round rect starting at arc end point `start` (0 = top edge
    /// next to the upper-left arc, then clockwise). Rect and oval round
    /// rects use the simpler shapes.
    pub fn add_rrect(&mut self, rrect: &RoundRect, dir: PathDirection, start: u32) -> &mut Self {
        let bounds = *rrect.bounds();
        if rrect.is_rect() || rrect.is_empty() {
            return self.add_rect(&bounds, dir, (start + 1) / 2);
        }
        if rrect.is_oval() {
            return self.add_oval(&bounds, dir, start / 2);
        }

        let was_just_moves = self.is_a == IsA::JustMoves;
        let starts_with_conic = ((start & 1) == 1) == (dir == PathDirection::Cw);
        let weight = SCALAR_ROOT2_OVER2;

        let mut arcs = rrect_points(rrect, dir, start);
        let corner_offset = match dir {
            PathDirection::Cw => 0,
            PathDirection::Ccw => 1,
        };
        let mut corners = rect_points(&bounds, dir, start / 2 + corner_offset);

        self.inc_reserve(17, if starts_with_conic { 10 } else { 11 });
        self.move_to_pt(arcs.current());
        if starts_with_conic {
            for _ in 0..3 {
                let ctrl = corners.advance();
                let end = arcs.advance();
                self.conic_to_pts(ctrl, end, weight);
                self.line_to_pt(arcs.advance());
            }
            let ctrl = corners.advance();
            let end = arcs.advance();
            self.conic_to_pts(ctrl, end, weight);
        } else {
            for _ in 0..4 {
                self.line_to_pt(arcs.advance());
                let ctrl = corners.advance();
                let end = arcs.advance();
                self.conic_to_pts(ctrl, end, weight);
            }
        }
        self.close();

        if was_just_moves {
            self.is_a = IsA::RRect;
            self.is_a_ccw = dir == PathDirection::Ccw;
            self.is_a_start = start % 8;
        }
        self
    }

    /// One polyline contour through `points`, closed if requested. An empty
    /// slice adds nothing.
    pub fn add_polygon(&mut self, points: &[Point], close: bool) -> &mut Self {
        let Some((first, rest)) = points.split_first() else {
            return self;
        };
        self.inc_reserve(points.len(), points.len() + 1);
        self.move_to_pt(*first);
        self.polyline_to(rest);
        if close {
            self.close();
        }
        self
    }

    // ------------------------------------------------------------------------
    // Paths
    // ------------------------------------------------------------------------

    /// Append every verb of `src` unchanged.
    pub fn add_path(&mut self, src: &Path) -> &mut Self {
        let pts = src.points();
        let weights = src.conic_weights();
        self.inc_reserve(pts.len(), src.count_verbs());

        let mut pi = 0;
        let mut wi = 0;
        for &verb in src.verbs() {
            match verb {
                Verb::Move => {
                    self.move_to_pt(pts[pi]);
                }
                Verb::Line => {
                    self.line_to_pt(pts[pi]);
                }
                Verb::Quad => {
                    self.quad_to_pts(pts[pi], pts[pi + 1]);
                }
                Verb::Conic => {
                    self.conic_to_pts(pts[pi], pts[pi + 1], weights[wi]);
                    wi += 1;
                }
                Verb::Cubic => {
                    self.cubic_to_pts(pts[pi], pts[pi + 1], pts[pi + 2]);
                }
                Verb::Close => {
                    self.close();
                }
            }
            pi += verb.points_consumed();
        }
        self
    }

    /// Append every contour of `src` reversed, in reverse contour order.
    pub fn reverse_add_path(&mut self, src: &Path) -> &mut Self {
        let mut reversed = Path::new();
        reversed.reverse_add_path(src);
        self.add_path(&reversed)
    }

    /// Move every recorded point by `(dx, dy)`.
    pub fn offset(&mut self, dx: f32, dy: f32) -> &mut Self {
        let d = Point::new(dx, dy);
        for p in &mut self.points {
            *p = *p + d;
        }
        self.last_move_point = self.last_move_point + d;
        self
    }

    // ------------------------------------------------------------------------
    // Finishing
    // ------------------------------------------------------------------------

    /// A path holding everything recorded so far. The builder is unchanged.
    pub fn snapshot(&self) -> Path {
        self.clone().into_path()
    }

    /// A path holding everything recorded so far. The builder is reset.
    pub fn detach(&mut self) -> Path {
        std::mem::take(self).into_path()
    }

    fn into_path(self) -> Path {
        let last_move_to_index = if self.verbs.is_empty() {
            !0
        } else if self.needs_move_verb {
            !self.last_move_index
        } else {
            self.last_move_index
        };

        let mut storage = Arc::new(PathStorage::from_parts(
            self.verbs,
            self.points,
            self.conic_weights,
            self.segment_mask,
        ));

        let (convexity, first_direction) = match self.is_a {
            IsA::Oval | IsA::RRect => {
                let mut ed = PathEditor::new(&mut storage, 0, 0);
                if self.is_a == IsA::Oval {
                    ed.set_is_oval(true, self.is_a_ccw, self.is_a_start);
                } else {
                    ed.set_is_rrect(true, self.is_a_ccw, self.is_a_start);
                }
                let dir = if self.is_a_ccw {
                    FirstDirection::Ccw
                } else {
                    FirstDirection::Cw
                };
                (Convexity::Convex, dir)
            }
            IsA::JustMoves | IsA::MoreThanMoves => (Convexity::Unknown, FirstDirection::Unknown),
        };

        Path::from_storage(
            storage,
            self.fill_type,
            last_move_to_index,
            convexity,
            first_direction,
        )
    }
}

impl Default for PathBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&Path> for PathBuilder {
    fn from(path: &Path) -> Self {
        let mut b = Self::new();
        b.points = path.points().to_vec();
        b.verbs = path.verbs().to_vec();
        b.conic_weights = path.conic_weights().to_vec();
        b.fill_type = path.fill_type();
        b.segment_mask = path.segment_masks();

        let lmi = path.last_move_to_index();
        if !b.verbs.is_empty() {
            b.needs_move_verb = lmi < 0;
            b.last_move_index = if lmi < 0 { !lmi } else { lmi };
            b.last_move_point = path.point(b.last_move_index as usize);
        }

        let storage = path.storage();
        let hint = storage
            .oval_hint()
            .map(|h| (IsA::Oval, h))
            .or_else(|| storage.rrect_hint().map(|h| (IsA::RRect, h)));
        if let Some((is_a, (ccw, start))) = hint {
            b.is_a = is_a;
            b.is_a_ccw = ccw;
            b.is_a_start = start;
        } else if b.verbs.iter().any(|v| v.is_drawing()) {
            b.is_a = IsA::MoreThanMoves;
        }
        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let b = PathBuilder::new();
        assert!(b.is_empty());
        assert_eq!(b.is_a(), IsA::JustMoves);
        assert!(b.snapshot().is_empty());
    }

    #[test]
    fn test_moves_only() {
        let mut b = PathBuilder::new();
        b.move_to(1.0, 2.0).move_to(3.0, 4.0);
        assert_eq!(b.is_a(), IsA::JustMoves);
        b.line_to(5.0, 6.0);
        assert_eq!(b.is_a(), IsA::MoreThanMoves);
    }

    #[test]
    fn test_line_injects_move_at_origin() {
        let mut b = PathBuilder::new();
        b.line_to(5.0, 5.0);
        let p = b.snapshot();
        assert_eq!(p.verbs(), &[Verb::Move, Verb::Line]);
        assert_eq!(p.points(), &[Point::zero(), Point::new(5.0, 5.0)]);
    }

    #[test]
    fn test_line_after_close_injects_move_to_contour_start() {
        let mut b = PathBuilder::new();
        b.move_to(1.0, 1.0).line_to(5.0, 1.0).line_to(5.0, 5.0).close();
        b.line_to(9.0, 9.0);
        let p = b.snapshot();
        assert_eq!(
            p.verbs(),
            &[Verb::Move, Verb::Line, Verb::Line, Verb::Close, Verb::Move, Verb::Line]
        );
        assert_eq!(p.point(3), Point::new(1.0, 1.0));
    }

    #[test]
    fn test_close_on_empty_and_twice() {
        let mut b = PathBuilder::new();
        b.close();
        assert!(b.is_empty());
        b.move_to(0.0, 0.0).line_to(1.0, 0.0).close().close();
        assert_eq!(b.count_verbs(), 3);
    }

    #[test]
    fn test_conic_demotion() {
        let mut b = PathBuilder::new();
        b.move_to(0.0, 0.0)
            .conic_to(1.0, 1.0, 2.0, 0.0, 1.0)
            .conic_to(3.0, 1.0, 4.0, 0.0, 0.0)
            .conic_to(5.0, 1.0, 6.0, 0.0, f32::INFINITY)
            .conic_to(7.0, 1.0, 8.0, 0.0, 0.5);
        let p = b.snapshot();
        assert_eq!(
            p.verbs(),
            &[Verb::Move, Verb::Quad, Verb::Line, Verb::Line, Verb::Line, Verb::Conic]
        );
        assert_eq!(p.conic_weights(), &[0.5]);
    }

    #[test]
    fn test_snapshot_keeps_builder() {
        let mut b = PathBuilder::new();
        b.move_to(0.0, 0.0).line_to(10.0, 0.0);
        let first = b.snapshot();
        b.line_to(10.0, 10.0);
        let second = b.snapshot();
        assert_eq!(first.count_verbs(), 2);
        assert_eq!(second.count_verbs(), 3);
    }

    #[test]
    fn test_detach_resets() {
        let mut b = PathBuilder::with_fill_type(FillType::EvenOdd);
        b.add_rect(&Rect::new(0.0, 0.0, 1.0, 1.0), PathDirection::Cw, 0);
        let p = b.detach();
        assert_eq!(p.count_verbs(), 5);
        assert_eq!(p.fill_type(), FillType::EvenOdd);
        assert!(b.is_empty());
        assert_eq!(b.fill_type(), FillType::Winding);
        assert_eq!(b.is_a(), IsA::JustMoves);
    }

    #[test]
    fn test_matches_path_append_api() {
        let mut b = PathBuilder::new();
        b.move_to(0.0, 0.0)
            .quad_to(5.0, 5.0, 10.0, 0.0)
            .cubic_to(12.0, 2.0, 14.0, 2.0, 16.0, 0.0)
            .close();
        let mut p = Path::new();
        p.move_to(0.0, 0.0)
            .quad_to(5.0, 5.0, 10.0, 0.0)
            .cubic_to(12.0, 2.0, 14.0, 2.0, 16.0, 0.0)
            .close();
        assert_eq!(b.snapshot(), p);
        assert!(b.snapshot().is_last_contour_closed());
    }

    #[test]
    fn test_rect_matches_path() {
        let r = Rect::new(2.0, 3.0, 8.0, 9.0);
        let mut b = PathBuilder::new();
        b.add_rect(&r, PathDirection::Ccw, 1);
        let mut p = Path::new();
        p.add_rect(&r, PathDirection::Ccw, 1);
        assert_eq!(b.snapshot(), p);
        assert_eq!(b.is_a(), IsA::MoreThanMoves);
    }

    #[test]
    fn test_oval_hint_carried() {
        let oval = Rect::new(0.0, 0.0, 20.0, 10.0);
        let mut b = PathBuilder::new();
        b.add_oval(&oval, PathDirection::Ccw, 2);
        assert_eq!(b.is_a(), IsA::Oval);
        let p = b.snapshot();
        let info = p.is_oval().unwrap();
        assert_eq!(info.bounds, oval);
        assert_eq!(info.direction, PathDirection::Ccw);
        assert_eq!(info.start, 2);
        assert_eq!(p.convexity_or_unknown(), Convexity::Convex);
        assert_eq!(p.first_direction(), FirstDirection::Ccw);
    }

    #[test]
    fn test_oval_after_drawing_has_no_hint() {
        let mut b = PathBuilder::new();
        b.move_to(0.0, 0.0).line_to(3.0, 3.0);
        b.add_oval(&Rect::new(0.0, 0.0, 20.0, 10.0), PathDirection::Cw, 0);
        assert_eq!(b.is_a(), IsA::MoreThanMoves);
        assert!(b.snapshot().is_oval().is_none());
    }

    #[test]
    fn test_trailing_move_drops_hint() {
        let mut b = PathBuilder::new();
        b.add_circle(5.0, 5.0, 5.0, PathDirection::Cw);
        b.move_to(100.0, 100.0);
        assert_eq!(b.is_a(), IsA::MoreThanMoves);
        assert!(b.snapshot().is_oval().is_none());
    }

    #[test]
    fn test_rrect_hint_carried() {
        let rr = RoundRect::from_rect_xy(&Rect::new(0.0, 0.0, 40.0, 20.0), 5.0, 4.0);
        let mut b = PathBuilder::new();
        b.add_rrect(&rr, PathDirection::Cw, 6);
        assert_eq!(b.is_a(), IsA::RRect);
        let p = b.snapshot();
        let info = p.is_rrect().unwrap();
        assert_eq!(info.rrect, rr);
        assert_eq!(info.start, 6);
        assert!(p.is_convex());
    }

    #[test]
    fn test_circle_negative_radius() {
        let mut b = PathBuilder::new();
        b.add_circle(0.0, 0.0, -1.0, PathDirection::Cw);
        assert!(b.is_empty());
    }

    #[test]
    fn test_polygon() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(2.0, 3.0),
        ];
        let mut b = PathBuilder::new();
        b.add_polygon(&[], true);
        assert!(b.is_empty());
        b.add_polygon(&pts, true);
        let p = b.snapshot();
        assert_eq!(p.verbs(), &[Verb::Move, Verb::Line, Verb::Line, Verb::Close]);
        assert_eq!(p.points(), &pts);
    }

    #[test]
    fn test_offset() {
        let mut b = PathBuilder::new();
        b.move_to(1.0, 1.0).line_to(2.0, 2.0).close();
        b.offset(10.0, 20.0);
        b.line_to(0.0, 0.0);
        let p = b.snapshot();
        assert_eq!(p.point(0), Point::new(11.0, 21.0));
        assert_eq!(p.point(2), Point::new(11.0, 21.0));
    }

    #[test]
    fn test_add_path_and_from_path() {
        let mut src = Path::new();
        src.move_to(0.0, 0.0)
            .conic_to(5.0, 5.0, 10.0, 0.0, 0.5)
            .line_to(10.0, 10.0)
            .close();
        let mut b = PathBuilder::new();
        b.add_path(&src);
        assert_eq!(b.snapshot(), src);

        let b2 = PathBuilder::from(&src);
        assert_eq!(b2.snapshot(), src);
        assert_eq!(b2.is_a(), IsA::MoreThanMoves);
    }

    #[test]
    fn test_from_path_keeps_open_contour() {
        let mut src = Path::new();
        src.move_to(0.0, 0.0).line_to(1.0, 0.0).close().move_to(5.0, 5.0);
        let mut b = PathBuilder::from(&src);
        b.line_to(6.0, 5.0);
        let p = b.snapshot();
        assert_eq!(p.count_verbs(), 5);
        assert_eq!(p.point(3), Point::new(6.0, 5.0));
    }

    #[test]
    fn test_from_closed_path_injects_move() {
        let mut src = Path::new();
        src.move_to(2.0, 2.0).line_to(4.0, 2.0).close();
        let mut b = PathBuilder::from(&src);
        b.line_to(7.0, 7.0);
        let p = b.snapshot();
        assert_eq!(p.verbs()[3], Verb::Move);
        assert_eq!(p.point(2), Point::new(2.0, 2.0));
    }

    #[test]
    fn test_from_path_keeps_oval_hint() {
        let mut src = Path::new();
        src.add_oval(&Rect::new(0.0, 0.0, 4.0, 4.0), PathDirection::Cw, 1);
        let b = PathBuilder::from(&src);
        assert_eq!(b.is_a(), IsA::Oval);
        assert!(b.snapshot().is_oval().is_some());
    }

    #[test]
    fn test_reverse_add_path() {
        let mut src = Path::new();
        src.move_to(0.0, 0.0).line_to(10.0, 0.0).line_to(10.0, 10.0);
        let mut b = PathBuilder::new();
        b.reverse_add_path(&src);
        let p = b.snapshot();
        assert_eq!(
            p.points(),
            &[
                Point::new(10.0, 10.0),
                Point::new(10.0, 0.0),
                Point::new(0.0, 0.0)
            ]
        );
    }

    #[test]
    fn test_compute_bounds() {
        let mut b = PathBuilder::new();
        b.move_to(-1.0, 2.0).line_to(3.0, -4.0);
        assert_eq!(b.compute_bounds(), Some(Rect::new(-1.0, -4.0, 3.0, 2.0)));
        b.line_to(f32::NAN, 0.0);
        assert_eq!(b.compute_bounds(), None);
    }

    #[test]
    fn test_toggle_inverse() {
        let mut b = PathBuilder::new();
        b.toggle_inverse_fill_type();
        assert_eq!(b.fill_type(), FillType::InverseWinding);
        assert!(b.snapshot().is_inverse_fill_type());
    }
}
