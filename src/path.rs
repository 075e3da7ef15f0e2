//! The path value type.
//!
//! A [`Path`] is a cheap-to-clone handle to shared [`PathStorage`] plus the
//! per-value state that does not belong in storage: the fill rule, the index
//! of the current contour's move point and the lazily computed convexity and
//! first-direction caches. Clones share storage until one of them is edited.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use log::{debug, trace};

use crate::basics::{
    AddPathMode, Convexity, FillType, FirstDirection, PathDirection, Point, Rect, Verb,
};
use crate::contains;
use crate::convexity;
use crate::curves::{chop_cubic_at_half, Conic};
use crate::math::SCALAR_ROOT2_OVER2;
use crate::matrix::Matrix;
use crate::path_iter::{Iter, RawIter};
use crate::path_storage::{PathEditor, PathStorage};
use crate::round_rect::RoundRect;
use crate::shape::{self, OvalInfo, RRectInfo, RectInfo};
use crate::shape_points::{oval_points, rect_points, rrect_points};

/// Start index used by [`Path::add_oval`] callers that have no preference:
/// the right-hand side midpoint.
pub const DEFAULT_OVAL_START: u32 = 1;

/// Start index used for round rects when the caller has no preference. The
/// contour opens by walking the left edge toward the upper-left arc for CW
/// and toward the lower-left arc for CCW.
pub fn default_rrect_start(dir: PathDirection) -> u32 {
    match dir {
        PathDirection::Cw => 6,
        PathDirection::Ccw => 7,
    }
}

// ============================================================================
// Path
// ============================================================================

/// A sequence of contours built from lines and curves.
#[derive(Debug)]
pub struct Path {
    storage: Arc<PathStorage>,
    /// Point index of the current contour's move. Bitwise complemented once
    /// the contour is closed; `!0` before any move.
    last_move_to_index: i32,
    convexity: AtomicU8,
    first_direction: AtomicU8,
    fill_type: FillType,
}

impl Path {
    pub fn new() -> Self {
        Self {
            storage: PathStorage::empty(),
            last_move_to_index: !0,
            convexity: AtomicU8::new(Convexity::Unknown as u8),
            first_direction: AtomicU8::new(FirstDirection::Unknown as u8),
            fill_type: FillType::Winding,
        }
    }

    /// Wrap finished storage. Used by the builder.
    pub(crate) fn from_storage(
        storage: Arc<PathStorage>,
        fill_type: FillType,
        last_move_to_index: i32,
        convexity: Convexity,
        first_direction: FirstDirection,
    ) -> Self {
        Self {
            storage,
            last_move_to_index,
            convexity: AtomicU8::new(convexity as u8),
            first_direction: AtomicU8::new(first_direction as u8),
            fill_type,
        }
    }

    fn reset_fields(&mut self) {
        self.last_move_to_index = !0;
        self.fill_type = FillType::Winding;
        self.set_convexity(Convexity::Unknown);
        self.set_first_direction(FirstDirection::Unknown);
    }

    fn dirty_after_edit(&mut self) {
        self.set_convexity(Convexity::Unknown);
        self.set_first_direction(FirstDirection::Unknown);
    }

    // ------------------------------------------------------------------------
    // Storage access
    // ------------------------------------------------------------------------

    pub fn storage(&self) -> &PathStorage {
        &self.storage
    }

    pub(crate) fn last_move_to_index(&self) -> i32 {
        self.last_move_to_index
    }

    pub fn is_empty(&self) -> bool {
        self.storage.count_verbs() == 0
    }

    pub fn is_finite(&self) -> bool {
        self.storage.is_finite()
    }

    pub fn bounds(&self) -> Rect {
        self.storage.bounds()
    }

    pub fn count_points(&self) -> usize {
        self.storage.count_points()
    }

    pub fn count_verbs(&self) -> usize {
        self.storage.count_verbs()
    }

    pub fn points(&self) -> &[Point] {
        self.storage.points()
    }

    pub fn verbs(&self) -> &[Verb] {
        self.storage.verbs()
    }

    pub fn conic_weights(&self) -> &[f32] {
        self.storage.conic_weights()
    }

    /// Segment-mask bits of every drawing verb in the path.
    pub fn segment_masks(&self) -> u8 {
        self.storage.segment_mask()
    }

    pub fn gen_id(&self) -> u32 {
        self.storage.gen_id()
    }

    /// Point at `index`, or the origin when out of range.
    pub fn point(&self, index: usize) -> Point {
        self.storage
            .points()
            .get(index)
            .copied()
            .unwrap_or_default()
    }

    pub fn last_pt(&self) -> Option<Point> {
        self.storage.points().last().copied()
    }

    /// The two end points when the path is exactly one move and one line.
    pub fn is_line(&self) -> Option<[Point; 2]> {
        let verbs = self.storage.verbs();
        if verbs.len() == 2 && verbs[1] == Verb::Line {
            debug_assert_eq!(verbs[0], Verb::Move);
            Some([self.storage.at_point(0), self.storage.at_point(1)])
        } else {
            None
        }
    }

    pub fn is_last_contour_closed(&self) -> bool {
        self.storage.verbs().last() == Some(&Verb::Close)
    }

    pub(crate) fn leading_move_count(&self) -> usize {
        self.storage
            .verbs()
            .iter()
            .take_while(|&&v| v == Verb::Move)
            .count()
    }

    fn has_only_moves(&self) -> bool {
        !self.storage.verbs().iter().any(|v| v.is_drawing())
    }

    pub fn raw_iter(&self) -> RawIter<'_> {
        self.storage.raw_iter()
    }

    pub fn iter(&self, force_close: bool) -> Iter<'_> {
        Iter::new(self, force_close)
    }

    // ------------------------------------------------------------------------
    // Fill rule
    // ------------------------------------------------------------------------

    pub fn fill_type(&self) -> FillType {
        self.fill_type
    }

    pub fn set_fill_type(&mut self, fill_type: FillType) -> &mut Self {
        self.fill_type = fill_type;
        self
    }

    pub fn is_inverse_fill_type(&self) -> bool {
        self.fill_type.is_inverse()
    }

    pub fn toggle_inverse_fill_type(&mut self) -> &mut Self {
        self.fill_type = self.fill_type.toggle_inverse();
        self
    }

    // ------------------------------------------------------------------------
    // Cached properties
    // ------------------------------------------------------------------------

    /// Cached convexity without computing it.
    pub fn convexity_or_unknown(&self) -> Convexity {
        Convexity::from_u8(self.convexity.load(Ordering::Relaxed))
    }

    pub(crate) fn set_convexity(&self, convexity: Convexity) {
        self.convexity.store(convexity as u8, Ordering::Relaxed);
    }

    pub(crate) fn cached_first_direction(&self) -> FirstDirection {
        FirstDirection::from_u8(self.first_direction.load(Ordering::Relaxed))
    }

    pub(crate) fn set_first_direction(&self, dir: FirstDirection) {
        self.first_direction.store(dir as u8, Ordering::Relaxed);
    }

    /// Convexity, computed and cached on first use.
    pub fn convexity(&self) -> Convexity {
        match self.convexity_or_unknown() {
            Convexity::Unknown => convexity::compute_convexity(self),
            known => known,
        }
    }

    pub fn is_convex(&self) -> bool {
        self.convexity() == Convexity::Convex
    }

    /// Winding direction of the outermost contour, computed and cached on
    /// first use. `Unknown` for degenerate paths.
    pub fn first_direction(&self) -> FirstDirection {
        convexity::compute_first_direction(self)
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// True if `(x, y)` is inside the path under its fill rule. Points on
    /// an edge count as inside.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        contains::contains(self, x, y)
    }

    /// True only if the path is convex and `rect` is certainly inside it.
    /// May return false for rects that are inside.
    pub fn conservatively_contains_rect(&self, rect: &Rect) -> bool {
        contains::conservatively_contains_rect(self, rect)
    }

    pub fn is_rect(&self) -> Option<RectInfo> {
        shape::is_rect(self)
    }

    pub fn is_oval(&self) -> Option<OvalInfo> {
        shape::oval_info(self)
    }

    pub fn is_rrect(&self) -> Option<RRectInfo> {
        shape::rrect_info(self)
    }

    // ------------------------------------------------------------------------
    // Lifetime
    // ------------------------------------------------------------------------

    /// Drop all contours and release the storage.
    pub fn reset(&mut self) -> &mut Self {
        self.storage = PathStorage::empty();
        self.reset_fields();
        self
    }

    /// Drop all contours, keeping the storage's capacity when it is not
    /// shared.
    pub fn rewind(&mut self) -> &mut Self {
        PathStorage::rewind(&mut self.storage);
        self.reset_fields();
        self
    }

    pub fn swap(&mut self, other: &mut Path) {
        std::mem::swap(self, other);
    }

    /// Reserve room for `extra` more verbs and points.
    pub fn inc_reserve(&mut self, extra: usize) -> &mut Self {
        if extra > 0 {
            PathEditor::new(&mut self.storage, extra, extra);
        }
        self
    }

    // ------------------------------------------------------------------------
    // Point edits
    // ------------------------------------------------------------------------

    /// Overwrite the point at `index`. Out-of-range indices are ignored.
    pub fn set_pt(&mut self, index: usize, x: f32, y: f32) -> &mut Self {
        if index < self.count_points() {
            PathEditor::new(&mut self.storage, 0, 0).set_point(index, Point::new(x, y));
            self.dirty_after_edit();
        }
        self
    }

    /// Overwrite the last point, or start a contour there if the path is
    /// empty.
    pub fn set_last_pt(&mut self, x: f32, y: f32) -> &mut Self {
        match self.count_points() {
            0 => self.move_to(x, y),
            n => self.set_pt(n - 1, x, y),
        }
    }

    // ------------------------------------------------------------------------
    // Verb appends
    // ------------------------------------------------------------------------

    pub fn move_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.last_move_to_index = self.storage.count_points() as i32;
        PathEditor::new(&mut self.storage, 1, 1).grow_for_verb(Verb::Move, 1.0)[0] =
            Point::new(x, y);
        self.dirty_after_edit();
        self
    }

    fn inject_move_to_if_needed(&mut self) {
        if self.last_move_to_index < 0 {
            let p = if self.storage.count_verbs() == 0 {
                Point::zero()
            } else {
                self.storage.at_point(!self.last_move_to_index as usize)
            };
            self.move_to(p.x, p.y);
        }
    }

    pub fn line_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.inject_move_to_if_needed();
        PathEditor::new(&mut self.storage, 1, 1).grow_for_verb(Verb::Line, 1.0)[0] =
            Point::new(x, y);
        self.dirty_after_edit();
        self
    }

    pub fn quad_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> &mut Self {
        self.inject_move_to_if_needed();
        let mut ed = PathEditor::new(&mut self.storage, 1, 2);
        let pts = ed.grow_for_verb(Verb::Quad, 1.0);
        pts[0] = Point::new(x1, y1);
        pts[1] = Point::new(x2, y2);
        self.dirty_after_edit();
        self
    }

    /// Append a conic. Weights that do not describe a proper conic are
    /// demoted: `w <= 0` or NaN becomes a line to the end point, an infinite
    /// weight becomes two lines through the control point and `w == 1`
    /// becomes a quad.
    pub fn conic_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, w: f32) -> &mut Self {
        if !(w > 0.0) {
            trace!("conic weight {w} demoted to a line");
            return self.line_to(x2, y2);
        }
        if !w.is_finite() {
            trace!("infinite conic weight demoted to two lines");
            self.line_to(x1, y1);
            return self.line_to(x2, y2);
        }
        if w == 1.0 {
            return self.quad_to(x1, y1, x2, y2);
        }
        self.inject_move_to_if_needed();
        let mut ed = PathEditor::new(&mut self.storage, 1, 2);
        let pts = ed.grow_for_verb(Verb::Conic, w);
        pts[0] = Point::new(x1, y1);
        pts[1] = Point::new(x2, y2);
        self.dirty_after_edit();
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
        self.inject_move_to_if_needed();
        let mut ed = PathEditor::new(&mut self.storage, 1, 3);
        let pts = ed.grow_for_verb(Verb::Cubic, 1.0);
        pts[0] = Point::new(x1, y1);
        pts[1] = Point::new(x2, y2);
        pts[2] = Point::new(x3, y3);
        self.dirty_after_edit();
        self
    }

    /// Close the current contour. Nothing is appended after a `Close` or on
    /// an empty path, but the contour is always marked closed.
    pub fn close(&mut self) -> &mut Self {
        let last = self.storage.verbs().last().copied();
        if matches!(last, Some(verb) if verb != Verb::Close) {
            PathEditor::new(&mut self.storage, 1, 0).grow_for_verb(Verb::Close, 1.0);
        }
        // Complement a non-negative index; leave a negative one alone.
        self.last_move_to_index ^= !self.last_move_to_index >> 31;
        self
    }

    fn move_to_pt(&mut self, p: Point) -> &mut Self {
        self.move_to(p.x, p.y)
    }

    fn line_to_pt(&mut self, p: Point) -> &mut Self {
        self.line_to(p.x, p.y)
    }

    fn conic_to_pts(&mut self, p1: Point, p2: Point, w: f32) -> &mut Self {
        self.conic_to(p1.x, p1.y, p2.x, p2.y, w)
    }

    // ------------------------------------------------------------------------
    // Shape helpers
    // ------------------------------------------------------------------------

    fn begin_shape(&self, rect: &Rect) -> ShapeUpdate {
        let mut bounds = rect.sorted();
        let was_empty = self.is_empty();
        let had_valid_bounds = self.storage.has_computed_bounds() && self.storage.is_finite();
        if had_valid_bounds && !was_empty {
            bounds.join_no_empty_check(&self.storage.bounds());
        }
        ShapeUpdate {
            bounds,
            update_bounds: was_empty || had_valid_bounds,
            degenerate: self.count_verbs() == self.leading_move_count(),
            first_direction: FirstDirection::Unknown,
        }
    }

    fn finish_shape(&mut self, update: ShapeUpdate) {
        self.set_convexity(if update.degenerate {
            Convexity::Convex
        } else {
            Convexity::Unknown
        });
        if update.update_bounds && update.bounds.is_finite() {
            PathStorage::set_bounds(&mut self.storage, update.bounds);
        }
        self.set_first_direction(update.first_direction);
    }

    fn shape_direction(&self, dir: PathDirection) -> FirstDirection {
        if self.has_only_moves() {
            dir.into()
        } else {
            FirstDirection::Unknown
        }
    }

    /// Append a closed rectangle contour starting at corner `start`
    /// (0 = left-top, then clockwise).
    pub fn add_rect(&mut self, rect: &Rect, dir: PathDirection, start: u32) -> &mut Self {
        let mut update = self.begin_shape(rect);
        update.first_direction = self.shape_direction(dir);

        let mut corners = rect_points(rect, dir, start);
        self.inc_reserve(5);
        self.move_to_pt(corners.current());
        for _ in 0..3 {
            self.line_to_pt(corners.advance());
        }
        self.close();

        self.finish_shape(update);
        self
    }

    /// Append a closed oval inscribed in `oval` as four quarter conics,
    /// starting at side midpoint `start` (0 = top, then clockwise).
    pub fn add_oval(&mut self, oval: &Rect, dir: PathDirection, start: u32) -> &mut Self {
        // Only a path of nothing but moves can remember being an oval.
        let is_oval = self.has_only_moves();
        let mut update = self.begin_shape(oval);
        update.first_direction = self.shape_direction(dir);

        let mut sides = oval_points(oval, dir, start);
        let corner_offset = match dir {
            PathDirection::Cw => 0,
            PathDirection::Ccw => 1,
        };
        let mut corners = rect_points(oval, dir, start + corner_offset);

        self.inc_reserve(6);
        self.move_to_pt(sides.current());
        for _ in 0..4 {
            let ctrl = corners.advance();
            let end = sides.advance();
            self.conic_to_pts(ctrl, end, SCALAR_ROOT2_OVER2);
        }
        self.close();
        PathEditor::new(&mut self.storage, 0, 0).set_is_oval(
            is_oval,
            dir == PathDirection::Ccw,
            start % 4,
        );

        self.finish_shape(update);
        self
    }

    /// Append a circle. Non-positive radii add nothing.
    pub fn add_circle(&mut self, x: f32, y: f32, r: f32, dir: PathDirection) -> &mut Self {
        if r > 0.0 {
            self.add_oval(
                &Rect::new(x - r, y - r, x + r, y + r),
                dir,
                DEFAULT_OVAL_START,
            );
        }
        self
    }

    /// Append a closed round-rect contour starting at arc end point `start`
    /// (0 = top edge next to the upper-left arc, then clockwise). Rect and
    /// oval round rects are added with the simpler helpers.
    pub fn add_rrect(&mut self, rrect: &RoundRect, dir: PathDirection, start: u32) -> &mut Self {
        let is_rrect = self.has_only_moves();
        let bounds = *rrect.bounds();

        if rrect.is_rect() || rrect.is_empty() {
            return self.add_rect(&bounds, dir, (start + 1) / 2);
        }
        if rrect.is_oval() {
            return self.add_oval(&bounds, dir, start / 2);
        }

        let mut update = self.begin_shape(&bounds);
        update.first_direction = self.shape_direction(dir);

        // Odd starts sit at the beginning of an arc when walking CW, even
        // starts when walking CCW.
        let starts_with_conic = ((start & 1) == 1) == (dir == PathDirection::Cw);
        let weight = SCALAR_ROOT2_OVER2;

        let mut arcs = rrect_points(rrect, dir, start);
        let corner_offset = match dir {
            PathDirection::Cw => 0,
            PathDirection::Ccw => 1,
        };
        let mut corners = rect_points(&bounds, dir, start / 2 + corner_offset);

        self.inc_reserve(if starts_with_conic { 10 } else { 11 });
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
            // The final line is implied by close.
        } else {
            for _ in 0..4 {
                self.line_to_pt(arcs.advance());
                let ctrl = corners.advance();
                let end = arcs.advance();
                self.conic_to_pts(ctrl, end, weight);
            }
        }
        self.close();
        PathEditor::new(&mut self.storage, 0, 0).set_is_rrect(
            is_rrect,
            dir == PathDirection::Ccw,
            start % 8,
        );

        self.finish_shape(update);
        self
    }

    /// Append a round rect with the same radii at every corner. Negative
    /// radii add nothing.
    pub fn add_round_rect(&mut self, rect: &Rect, rx: f32, ry: f32, dir: PathDirection) -> &mut Self {
        if rx < 0.0 || ry < 0.0 {
            return self;
        }
        let rrect = RoundRect::from_rect_xy(rect, rx, ry);
        self.add_rrect(&rrect, dir, default_rrect_start(dir))
    }

    /// Append `points` as one polyline contour, closed if requested. An
    /// empty slice adds nothing.
    pub fn add_poly(&mut self, points: &[Point], close: bool) -> &mut Self {
        let Some((first, rest)) = points.split_first() else {
            return self;
        };

        self.last_move_to_index = self.storage.count_points() as i32;
        {
            let mut ed = PathEditor::new(&mut self.storage, points.len() + 1, points.len());
            ed.grow_for_verb(Verb::Move, 1.0)[0] = *first;
            let (pts, _) = ed.grow_for_repeated_verb(Verb::Line, rest.len());
            pts.copy_from_slice(rest);
            if close {
                ed.grow_for_verb(Verb::Close, 1.0);
            }
        }
        if close {
            self.last_move_to_index ^= !self.last_move_to_index >> 31;
        }
        self.dirty_after_edit();
        self
    }

    // ------------------------------------------------------------------------
    // Path appends
    // ------------------------------------------------------------------------

    /// Append `src` mapped through `matrix`.
    ///
    /// In [`AddPathMode::Extend`] mode the first contour of `src` continues
    /// this path's last contour: its move becomes a line, skipped when it
    /// would have zero length.
    pub fn add_path(&mut self, src: &Path, matrix: &Matrix, mode: AddPathMode) -> &mut Self {
        if src.is_empty() {
            return self;
        }

        if mode == AddPathMode::Append && !matrix.has_perspective() {
            // Rebase the source's move index, keeping its closed marker.
            let base = self.storage.count_points() as i32;
            self.last_move_to_index = if src.last_move_to_index >= 0 {
                base + src.last_move_to_index
            } else {
                !(base + !src.last_move_to_index)
            };
            {
                let mut ed = PathEditor::new(&mut self.storage, 0, 0);
                let (pts, weights) = ed.grow_for_verbs_in_path(&src.storage);
                pts.copy_from_slice(src.storage.points());
                matrix.map_points_in_place(pts);
                weights.copy_from_slice(src.storage.conic_weights());
            }
            if self.storage.verbs().last() == Some(&Verb::Close) {
                self.last_move_to_index ^= !self.last_move_to_index >> 31;
            }
            self.dirty_after_edit();
            return self;
        }

        let mut first_verb = true;
        for seg in src.storage.raw_iter() {
            let mut pts = seg.pts;
            let n = seg.points().len();
            for p in &mut pts[..n] {
                *p = matrix.map_point(*p);
            }
            match seg.verb {
                Verb::Move => {
                    let p = pts[0];
                    if first_verb && mode == AddPathMode::Extend && !self.is_empty() {
                        self.inject_move_to_if_needed();
                        let connect = self.last_move_to_index < 0
                            || self.last_pt().map_or(true, |last| last != p);
                        if connect {
                            self.line_to_pt(p);
                        }
                    } else {
                        self.move_to_pt(p);
                    }
                }
                Verb::Line => {
                    self.line_to_pt(pts[1]);
                }
                Verb::Quad => {
                    self.quad_to(pts[1].x, pts[1].y, pts[2].x, pts[2].y);
                }
                Verb::Conic => {
                    self.conic_to_pts(pts[1], pts[2], seg.weight);
                }
                Verb::Cubic => {
                    self.cubic_to(pts[1].x, pts[1].y, pts[2].x, pts[2].y, pts[3].x, pts[3].y);
                }
                Verb::Close => {
                    self.close();
                }
            }
            first_verb = false;
        }
        self
    }

    /// Append `src` offset by `(dx, dy)`.
    pub fn add_path_offset(&mut self, src: &Path, dx: f32, dy: f32, mode: AddPathMode) -> &mut Self {
        self.add_path(src, &Matrix::new_translation(dx, dy), mode)
    }

    /// Append every contour of `src` with its direction reversed, in
    /// reverse contour order.
    pub fn reverse_add_path(&mut self, src: &Path) -> &mut Self {
        let storage = &src.storage;
        let pts = storage.points();
        let weights = storage.conic_weights();
        let mut pt = pts.len();
        let mut wi = weights.len();

        let mut need_move = true;
        let mut need_close = false;
        for &verb in storage.verbs().iter().rev() {
            if need_move {
                pt -= 1;
                self.move_to_pt(pts[pt]);
                need_move = false;
            }
            // The move point was already consumed as the contour's end.
            if verb != Verb::Move {
                pt -= verb.points_consumed();
            }
            match verb {
                Verb::Move => {
                    if need_close {
                        self.close();
                        need_close = false;
                    }
                    need_move = true;
                }
                Verb::Line => {
                    self.line_to_pt(pts[pt]);
                }
                Verb::Quad => {
                    self.quad_to(pts[pt + 1].x, pts[pt + 1].y, pts[pt].x, pts[pt].y);
                }
                Verb::Conic => {
                    wi -= 1;
                    self.conic_to_pts(pts[pt + 1], pts[pt], weights[wi]);
                }
                Verb::Cubic => {
                    self.cubic_to(
                        pts[pt + 2].x,
                        pts[pt + 2].y,
                        pts[pt + 1].x,
                        pts[pt + 1].y,
                        pts[pt].x,
                        pts[pt].y,
                    );
                }
                Verb::Close => {
                    need_close = true;
                }
            }
        }
        self
    }

    /// Continue the current contour backwards along the last contour of
    /// `src`, skipping its final point (assumed to be this path's current
    /// point).
    pub fn reverse_path_to(&mut self, src: &Path) -> &mut Self {
        let storage = &src.storage;
        if storage.count_verbs() == 0 {
            return self;
        }
        let pts = storage.points();
        let weights = storage.conic_weights();
        let mut pt = pts.len() as isize - 1;
        let mut wi = weights.len();

        for &verb in storage.verbs().iter().rev() {
            pt -= verb.points_consumed() as isize;
            let at = |offset: isize| pts[(pt + offset) as usize];
            match verb {
                Verb::Move => break,
                Verb::Line => {
                    self.line_to_pt(at(0));
                }
                Verb::Quad => {
                    let (c, e) = (at(1), at(0));
                    self.quad_to(c.x, c.y, e.x, e.y);
                }
                Verb::Conic => {
                    wi -= 1;
                    self.conic_to_pts(at(1), at(0), weights[wi]);
                }
                Verb::Cubic => {
                    let (c1, c2, e) = (at(2), at(1), at(0));
                    self.cubic_to(c1.x, c1.y, c2.x, c2.y, e.x, e.y);
                }
                Verb::Close => {}
            }
        }
        self
    }

    // ------------------------------------------------------------------------
    // Transforms
    // ------------------------------------------------------------------------

    /// Map the path through `matrix` in place.
    pub fn transform(&mut self, matrix: &Matrix) -> &mut Self {
        if matrix.is_identity() {
            return self;
        }
        if matrix.has_perspective() {
            self.transform_perspective(matrix);
            return self;
        }

        let convexity = self.convexity_or_unknown();
        let first_direction = self.cached_first_direction();
        let keeps_convexity = convexity == Convexity::Convex
            && matrix.is_scale_translate()
            && shape::is_axis_aligned(self);

        PathStorage::transform(&mut self.storage, matrix);

        if !keeps_convexity {
            self.set_convexity(Convexity::Unknown);
        }
        let direction = match first_direction {
            FirstDirection::Unknown => FirstDirection::Unknown,
            dir => {
                let det = matrix.determinant_2x2();
                if det < 0.0 {
                    dir.opposite()
                } else if det > 0.0 {
                    dir
                } else {
                    FirstDirection::Unknown
                }
            }
        };
        self.set_first_direction(direction);
        self
    }

    // Curves cannot be mapped through a projection by their control points
    // alone: quads become conics with adjusted weights and cubics are split
    // before mapping.
    fn transform_perspective(&mut self, matrix: &Matrix) {
        debug!(
            "perspective transform of a path with {} verbs",
            self.count_verbs()
        );
        let mut tmp = Path::new();
        tmp.fill_type = self.fill_type;
        for seg in self.iter(false) {
            let p = seg.pts;
            match seg.verb {
                Verb::Move => {
                    tmp.move_to_pt(p[0]);
                }
                Verb::Line => {
                    tmp.line_to_pt(p[1]);
                }
                Verb::Quad => {
                    let w = Conic::transform_w(&[p[0], p[1], p[2]], 1.0, matrix);
                    tmp.conic_to_pts(p[1], p[2], w);
                }
                Verb::Conic => {
                    let w = Conic::transform_w(&[p[0], p[1], p[2]], seg.weight, matrix);
                    tmp.conic_to_pts(p[1], p[2], w);
                }
                Verb::Cubic => {
                    subdivide_cubic_to(&mut tmp, &p, 2);
                }
                Verb::Close => {
                    tmp.close();
                }
            }
        }

        if !tmp.is_empty() {
            let mut ed = PathEditor::new(&mut tmp.storage, 0, 0);
            matrix.map_points_in_place(ed.points_mut());
        }
        tmp.set_first_direction(FirstDirection::Unknown);
        *self = tmp;
    }

    /// A copy of the path mapped through `matrix`.
    pub fn with_transform(&self, matrix: &Matrix) -> Path {
        let mut out = self.clone();
        out.transform(matrix);
        out
    }

    /// A copy of the path moved by `(dx, dy)`.
    pub fn offset(&self, dx: f32, dy: f32) -> Path {
        self.with_transform(&Matrix::new_translation(dx, dy))
    }

    // ------------------------------------------------------------------------
    // Interpolation
    // ------------------------------------------------------------------------

    /// True if `other` has the same verbs, weights and point count, so the
    /// two can be interpolated.
    pub fn is_interpolatable(&self, other: &Path) -> bool {
        self.storage.is_interpolatable(&other.storage)
    }

    /// `self * weight + ending * (1 - weight)` point by point. `None` when
    /// the point counts differ. Verbs and weights come from `self`.
    pub fn interpolate(&self, ending: &Path, weight: f32) -> Option<Path> {
        if self.count_points() != ending.count_points() {
            return None;
        }
        let mut out = Path::new();
        out.fill_type = self.fill_type;
        if self.count_points() == 0 {
            return Some(out);
        }
        out.storage = Arc::new(self.storage.interpolate(&ending.storage, weight));
        out.last_move_to_index = self.last_move_to_index;
        Some(out)
    }
}

struct ShapeUpdate {
    bounds: Rect,
    update_bounds: bool,
    degenerate: bool,
    first_direction: FirstDirection,
}

fn subdivide_cubic_to(path: &mut Path, pts: &[Point; 4], level: u32) {
    if level == 0 {
        path.cubic_to(pts[1].x, pts[1].y, pts[2].x, pts[2].y, pts[3].x, pts[3].y);
        return;
    }
    let halves = chop_cubic_at_half(pts);
    subdivide_cubic_to(path, &[halves[0], halves[1], halves[2], halves[3]], level - 1);
    subdivide_cubic_to(path, &[halves[3], halves[4], halves[5], halves[6]], level - 1);
}

impl Default for Path {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Path {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            last_move_to_index: self.last_move_to_index,
            convexity: AtomicU8::new(self.convexity.load(Ordering::Relaxed)),
            first_direction: AtomicU8::new(self.first_direction.load(Ordering::Relaxed)),
            fill_type: self.fill_type,
        }
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.fill_type == other.fill_type
            && (Arc::ptr_eq(&self.storage, &other.storage) || *self.storage == *other.storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Path {
        let mut p = Path::new();
        p.add_rect(&Rect::new(0.0, 0.0, 10.0, 10.0), PathDirection::Cw, 0);
        p
    }

    #[test]
    fn test_new_path_is_empty() {
        let p = Path::new();
        assert!(p.is_empty());
        assert_eq!(p.bounds(), Rect::empty());
        assert!(p.is_finite());
        assert_eq!(p.last_pt(), None);
        assert_eq!(p.point(3), Point::zero());
        assert_eq!(p.gen_id(), crate::path_storage::EMPTY_GEN_ID);
    }

    #[test]
    fn test_add_rect_layout() {
        let p = square();
        assert_eq!(
            p.verbs(),
            &[Verb::Move, Verb::Line, Verb::Line, Verb::Line, Verb::Close]
        );
        assert_eq!(
            p.points(),
            &[
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(0.0, 10.0)
            ]
        );
        assert_eq!(p.convexity_or_unknown(), Convexity::Convex);
        assert_eq!(p.cached_first_direction(), FirstDirection::Cw);
        assert!(p.storage().has_computed_bounds());
        assert_eq!(p.bounds(), Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_add_rect_after_contour_is_not_known_convex() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0).line_to(5.0, 5.0);
        p.add_rect(&Rect::new(0.0, 0.0, 1.0, 1.0), PathDirection::Ccw, 0);
        assert_eq!(p.convexity_or_unknown(), Convexity::Unknown);
        assert_eq!(p.cached_first_direction(), FirstDirection::Unknown);
    }

    #[test]
    fn test_line_injects_move() {
        let mut p = Path::new();
        p.line_to(3.0, 4.0);
        assert_eq!(p.verbs(), &[Verb::Move, Verb::Line]);
        assert_eq!(p.point(0), Point::zero());
        assert_eq!(p.is_line(), Some([Point::zero(), Point::new(3.0, 4.0)]));
    }

    #[test]
    fn test_line_after_close_restarts_at_contour_start() {
        let mut p = Path::new();
        p.move_to(1.0, 1.0).line_to(5.0, 1.0).line_to(5.0, 5.0).close();
        assert!(p.is_last_contour_closed());
        p.line_to(9.0, 9.0);
        assert_eq!(
            &p.verbs()[4..],
            &[Verb::Move, Verb::Line]
        );
        assert_eq!(p.point(3), Point::new(1.0, 1.0));
    }

    #[test]
    fn test_close_is_not_duplicated() {
        let mut p = Path::new();
        p.close();
        assert!(p.is_empty());
        p.move_to(0.0, 0.0).line_to(1.0, 0.0).close().close();
        assert_eq!(p.count_verbs(), 3);
    }

    #[test]
    fn test_conic_weight_canonicalization() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.conic_to(1.0, 0.0, 1.0, 1.0, 0.0);
        assert_eq!(p.verbs().last(), Some(&Verb::Line));
        p.conic_to(2.0, 0.0, 2.0, 2.0, f32::NAN);
        assert_eq!(p.verbs().last(), Some(&Verb::Line));
        p.conic_to(3.0, 0.0, 3.0, 3.0, f32::INFINITY);
        assert_eq!(&p.verbs()[3..], &[Verb::Line, Verb::Line]);
        p.conic_to(4.0, 0.0, 4.0, 4.0, 1.0);
        assert_eq!(p.verbs().last(), Some(&Verb::Quad));
        p.conic_to(5.0, 0.0, 5.0, 5.0, 0.5);
        assert_eq!(p.verbs().last(), Some(&Verb::Conic));
        assert_eq!(p.conic_weights(), &[0.5]);
    }

    #[test]
    fn test_copy_on_write() {
        let a = square();
        let mut b = a.clone();
        assert_eq!(a, b);
        b.line_to(20.0, 20.0);
        assert_eq!(a.count_verbs(), 5);
        assert_eq!(a.bounds(), Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(b.bounds(), Rect::new(0.0, 0.0, 20.0, 20.0));
        assert_ne!(a, b);
    }

    #[test]
    fn test_equality_uses_fill_type() {
        let a = square();
        let mut b = square();
        assert_eq!(a, b);
        b.set_fill_type(FillType::EvenOdd);
        assert_ne!(a, b);
    }

    #[test]
    fn test_gen_id_changes_on_edit() {
        let mut p = square();
        let id = p.gen_id();
        assert_eq!(p.gen_id(), id);
        p.set_pt(0, -1.0, -1.0);
        assert_ne!(p.gen_id(), id);
        assert_eq!(p.point(0), Point::new(-1.0, -1.0));
    }

    #[test]
    fn test_set_pt_out_of_range_is_ignored() {
        let mut p = square();
        let before = p.clone();
        p.set_pt(99, 1.0, 1.0);
        assert_eq!(p, before);
    }

    #[test]
    fn test_set_last_pt_on_empty_moves() {
        let mut p = Path::new();
        p.set_last_pt(2.0, 3.0);
        assert_eq!(p.verbs(), &[Verb::Move]);
        p.set_last_pt(4.0, 5.0);
        assert_eq!(p.last_pt(), Some(Point::new(4.0, 5.0)));
    }

    #[test]
    fn test_reset_and_rewind() {
        let mut p = square();
        p.set_fill_type(FillType::EvenOdd);
        p.rewind();
        assert!(p.is_empty());
        assert_eq!(p.fill_type(), FillType::Winding);
        let mut q = square();
        q.reset();
        assert_eq!(q, Path::new());
    }

    #[test]
    fn test_swap() {
        let mut a = square();
        let mut b = Path::new();
        a.swap(&mut b);
        assert!(a.is_empty());
        assert_eq!(b.count_verbs(), 5);
    }

    #[test]
    fn test_add_oval_records_hint() {
        let mut p = Path::new();
        p.add_oval(&Rect::new(0.0, 0.0, 20.0, 10.0), PathDirection::Ccw, 5);
        assert_eq!(p.verbs().iter().filter(|&&v| v == Verb::Conic).count(), 4);
        assert_eq!(p.storage().oval_hint(), Some((true, 1)));
        assert_eq!(p.point(0), Point::new(20.0, 5.0));
        assert_eq!(p.bounds(), Rect::new(0.0, 0.0, 20.0, 10.0));
        assert_eq!(p.convexity_or_unknown(), Convexity::Convex);
    }

    #[test]
    fn test_add_circle_rejects_zero_radius() {
        let mut p = Path::new();
        p.add_circle(5.0, 5.0, 0.0, PathDirection::Cw);
        assert!(p.is_empty());
        p.add_circle(5.0, 5.0, 2.0, PathDirection::Cw);
        assert_eq!(p.bounds(), Rect::new(3.0, 3.0, 7.0, 7.0));
    }

    #[test]
    fn test_add_rrect_layout() {
        let rr = RoundRect::from_rect_xy(&Rect::new(0.0, 0.0, 20.0, 10.0), 2.0, 2.0);
        let mut p = Path::new();
        p.add_rrect(&rr, PathDirection::Cw, 6);
        // Even CW start begins on a straight side.
        assert_eq!(p.verbs()[1], Verb::Line);
        assert_eq!(p.verbs().iter().filter(|&&v| v == Verb::Conic).count(), 4);
        assert_eq!(p.storage().rrect_hint(), Some((false, 6)));

        let mut q = Path::new();
        q.add_rrect(&rr, PathDirection::Cw, 7);
        assert_eq!(q.verbs()[1], Verb::Conic);
        assert_eq!(q.verbs().len(), 9);
    }

    #[test]
    fn test_add_rrect_degenerates() {
        let mut p = Path::new();
        p.add_rrect(
            &RoundRect::from_rect(&Rect::new(0.0, 0.0, 4.0, 4.0)),
            PathDirection::Cw,
            6,
        );
        assert!(p.is_rect().is_some());

        let mut q = Path::new();
        q.add_rrect(
            &RoundRect::from_oval(&Rect::new(0.0, 0.0, 4.0, 4.0)),
            PathDirection::Cw,
            6,
        );
        assert!(q.storage().oval_hint().is_some());
    }

    #[test]
    fn test_add_round_rect_negative_radius_is_noop() {
        let mut p = Path::new();
        p.add_round_rect(&Rect::new(0.0, 0.0, 4.0, 4.0), -1.0, 1.0, PathDirection::Cw);
        assert!(p.is_empty());
    }

    #[test]
    fn test_add_poly() {
        let mut p = Path::new();
        p.add_poly(&[], true);
        assert!(p.is_empty());
        let pts = [Point::new(0.0, 0.0), Point::new(4.0, 0.0), Point::new(0.0, 4.0)];
        p.add_poly(&pts, true);
        assert_eq!(
            p.verbs(),
            &[Verb::Move, Verb::Line, Verb::Line, Verb::Close]
        );
        p.line_to(1.0, 1.0);
        // Closed polygon: the next line restarts at its first point.
        assert_eq!(p.verbs()[4], Verb::Move);
    }

    #[test]
    fn test_add_path_append_maps_points() {
        let src = square();
        let mut dst = Path::new();
        dst.add_path(&src, &Matrix::new_translation(5.0, 0.0), AddPathMode::Append);
        assert_eq!(dst.count_verbs(), 5);
        assert_eq!(dst.point(0), Point::new(5.0, 0.0));
        assert!(dst.is_last_contour_closed());
        dst.line_to(0.0, 0.0);
        assert_eq!(dst.verbs()[5], Verb::Move);
    }

    #[test]
    fn test_add_path_extend_connects() {
        let mut dst = Path::new();
        dst.move_to(0.0, 0.0).line_to(1.0, 0.0);
        let mut src = Path::new();
        src.move_to(2.0, 0.0).line_to(3.0, 0.0);
        dst.add_path(&src, &Matrix::new(), AddPathMode::Extend);
        assert_eq!(dst.verbs(), &[Verb::Move, Verb::Line, Verb::Line, Verb::Line]);

        // A zero-length connection is skipped.
        let mut dst = Path::new();
        dst.move_to(0.0, 0.0).line_to(2.0, 0.0);
        dst.add_path(&src, &Matrix::new(), AddPathMode::Extend);
        assert_eq!(dst.count_verbs(), 3);
    }

    #[test]
    fn test_reverse_add_path() {
        let mut src = Path::new();
        src.move_to(0.0, 0.0).line_to(10.0, 0.0).quad_to(10.0, 10.0, 0.0, 10.0);
        let mut dst = Path::new();
        dst.reverse_add_path(&src);
        assert_eq!(dst.verbs(), &[Verb::Move, Verb::Quad, Verb::Line]);
        assert_eq!(
            dst.points(),
            &[
                Point::new(0.0, 10.0),
                Point::new(10.0, 10.0),
                Point::new(10.0, 0.0),
                Point::new(0.0, 0.0)
            ]
        );
    }

    #[test]
    fn test_reverse_add_path_keeps_close() {
        let mut dst = Path::new();
        dst.reverse_add_path(&square());
        assert_eq!(
            dst.verbs(),
            &[Verb::Move, Verb::Line, Verb::Line, Verb::Line, Verb::Close]
        );
        assert_eq!(dst.point(0), Point::new(0.0, 10.0));
        assert_eq!(dst.point(3), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_reverse_path_to() {
        let mut src = Path::new();
        src.move_to(0.0, 0.0).line_to(5.0, 0.0).line_to(5.0, 5.0);
        let mut dst = Path::new();
        dst.move_to(5.0, 5.0);
        dst.reverse_path_to(&src);
        assert_eq!(
            dst.points(),
            &[Point::new(5.0, 5.0), Point::new(5.0, 0.0), Point::new(0.0, 0.0)]
        );
    }

    #[test]
    fn test_transform_affine_updates_direction() {
        let mut p = square();
        p.transform(&Matrix::new_scaling(-1.0, 1.0));
        assert_eq!(p.cached_first_direction(), FirstDirection::Ccw);
        assert_eq!(p.convexity_or_unknown(), Convexity::Convex);
        assert_eq!(p.bounds(), Rect::new(-10.0, 0.0, 0.0, 10.0));

        let mut q = square();
        q.transform(&Matrix::new_rotation(30.0));
        assert_eq!(q.convexity_or_unknown(), Convexity::Unknown);
        assert_eq!(q.cached_first_direction(), FirstDirection::Cw);
    }

    #[test]
    fn test_transform_perspective_promotes_quads() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0).quad_to(5.0, 5.0, 10.0, 0.0).cubic_to(10.0, 5.0, 5.0, 10.0, 0.0, 10.0);
        let persp = Matrix::new_from_rows([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.001, 0.0, 1.0]);
        p.transform(&persp);
        assert_eq!(p.verbs()[1], Verb::Conic);
        assert_eq!(p.verbs().iter().filter(|&&v| v == Verb::Cubic).count(), 4);
        assert_eq!(p.cached_first_direction(), FirstDirection::Unknown);
    }

    #[test]
    fn test_with_transform_and_offset_leave_source() {
        let p = square();
        let moved = p.offset(1.0, 2.0);
        assert_eq!(p.point(0), Point::zero());
        assert_eq!(moved.point(0), Point::new(1.0, 2.0));
        let scaled = p.with_transform(&Matrix::new_scaling(2.0, 2.0));
        assert_eq!(scaled.bounds(), Rect::new(0.0, 0.0, 20.0, 20.0));
    }

    #[test]
    fn test_interpolate() {
        let a = square();
        let b = a.offset(10.0, 0.0);
        assert!(a.is_interpolatable(&b));
        let mid = a.interpolate(&b, 0.25).unwrap();
        assert_eq!(mid.point(0), Point::new(7.5, 0.0));

        let mut c = Path::new();
        c.move_to(0.0, 0.0);
        assert!(a.interpolate(&c, 0.5).is_none());
    }

    #[test]
    fn test_segment_masks() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0).line_to(1.0, 1.0).cubic_to(2.0, 2.0, 3.0, 3.0, 4.0, 4.0);
        assert_eq!(
            p.segment_masks(),
            crate::basics::SEGMENT_MASK_LINE | crate::basics::SEGMENT_MASK_CUBIC
        );
    }
}
