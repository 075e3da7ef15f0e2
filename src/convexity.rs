//! Convexity and winding-direction analysis.
//!
//! A path is convex when it has at most one contour with drawing verbs and
//! that contour turns the same way at every vertex. Collinear runs are
//! allowed, and so are up to two reversals so a line drawn out and back still
//! counts as convex. The analysis also yields the contour's winding direction,
//! which both analyzers cache on the path.

use log::debug;

use crate::basics::{Convexity, FirstDirection, Point, Vector, Verb};
use crate::math::{cross_product, sign_as_int};
use crate::path::Path;

// ============================================================================
// Turn tracker
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Turn {
    /// The cross product was not finite.
    Unknown,
    Left,
    Right,
    Straight,
    Backwards,
    /// No turn seen yet.
    Invalid,
}

/// Follows one contour vertex by vertex, checking that every turn has the
/// same sense.
struct TurnTracker {
    first_pt: Point,
    first_vec: Vector,
    last_pt: Point,
    last_vec: Vector,
    expected: Turn,
    first_direction: FirstDirection,
    reversals: u32,
    is_finite: bool,
}

impl TurnTracker {
    fn new() -> Self {
        Self {
            first_pt: Point::zero(),
            first_vec: Vector::zero(),
            last_pt: Point::zero(),
            last_vec: Vector::zero(),
            expected: Turn::Invalid,
            first_direction: FirstDirection::Unknown,
            reversals: 0,
            is_finite: true,
        }
    }

    fn set_move_pt(&mut self, pt: Point) {
        self.first_pt = pt;
        self.last_pt = pt;
        self.expected = Turn::Invalid;
    }

    fn add_pt(&mut self, pt: Point) -> bool {
        if self.last_pt == pt {
            return true;
        }
        // The first non-zero vector after a move only seeds the tracker.
        if self.first_pt == self.last_pt && self.expected == Turn::Invalid {
            self.last_vec = pt - self.last_pt;
            self.first_vec = self.last_vec;
        } else if !self.add_vec(pt - self.last_pt) {
            return false;
        }
        self.last_pt = pt;
        true
    }

    /// Re-add the first point and the first vector so the turns at the
    /// closing vertex and at the start are checked too.
    fn close(&mut self) -> bool {
        let (first_pt, first_vec) = (self.first_pt, self.first_vec);
        self.add_pt(first_pt) && self.add_vec(first_vec)
    }

    fn turn(&self, cur: Vector) -> Turn {
        let cross = self.last_vec.cross(cur);
        if !cross.is_finite() {
            return Turn::Unknown;
        }
        if cross == 0.0 {
            return if self.last_vec.dot(cur) < 0.0 {
                Turn::Backwards
            } else {
                Turn::Straight
            };
        }
        if sign_as_int(cross) == 1 {
            Turn::Right
        } else {
            Turn::Left
        }
    }

    fn add_vec(&mut self, cur: Vector) -> bool {
        match self.turn(cur) {
            turn @ (Turn::Left | Turn::Right) => {
                if self.expected == Turn::Invalid {
                    self.expected = turn;
                    self.first_direction = if turn == Turn::Right {
                        FirstDirection::Cw
                    } else {
                        FirstDirection::Ccw
                    };
                } else if turn != self.expected {
                    self.first_direction = FirstDirection::Unknown;
                    return false;
                }
                self.last_vec = cur;
                true
            }
            Turn::Straight => true,
            Turn::Backwards => {
                self.last_vec = cur;
                self.reversals += 1;
                self.reversals < 3
            }
            Turn::Unknown => {
                self.is_finite = false;
                false
            }
            Turn::Invalid => unreachable!("turn() never reports Invalid"),
        }
    }
}

// ============================================================================
// Sign-change pre-pass
// ============================================================================

/// Quick rejection: a convex polygon changes the sign of its dx (and of its
/// dy) at most three times going once around, including the wrap back to
/// the first point. Returns `Unknown` on a non-finite edge.
fn convexity_by_sign(points: &[Point]) -> Convexity {
    if points.len() <= 3 {
        return Convexity::Convex;
    }

    // 2 never matches a real sign, so the first edge always counts.
    let mut last_sx = 2;
    let mut last_sy = 2;
    let mut dxes = 0;
    let mut dyes = 0;

    let wrap = std::iter::once(&points[0]);
    let mut curr = points[0];
    for &pt in points[1..].iter().chain(wrap) {
        let vec = pt - curr;
        if !vec.is_zero() {
            if !vec.is_finite() {
                return Convexity::Unknown;
            }
            let sx = (vec.x < 0.0) as i32;
            let sy = (vec.y < 0.0) as i32;
            dxes += (sx != last_sx) as i32;
            dyes += (sy != last_sy) as i32;
            if dxes > 3 || dyes > 3 {
                return Convexity::Concave;
            }
            last_sx = sx;
            last_sy = sy;
        }
        curr = pt;
    }
    Convexity::Convex
}

// ============================================================================
// Convexity
// ============================================================================

/// Compute the path's convexity and cache it (and, when found, the first
/// direction) on the path.
pub(crate) fn compute_convexity(path: &Path) -> Convexity {
    let result = convexity_of(path);
    path.set_convexity(result);
    result
}

fn convexity_of(path: &Path) -> Convexity {
    if !path.is_finite() {
        debug!("convexity of a non-finite path is concave");
        return Convexity::Concave;
    }

    let storage = path.storage();
    let verbs = storage.verbs();

    // Only the last of the leading moves matters, and trailing moves are
    // ignored.
    let mut point_count = storage.count_points();
    let skip = path.leading_move_count().saturating_sub(1);

    let last_move = path.last_move_to_index();
    if last_move >= 0 {
        if last_move as usize + 1 == point_count {
            let mut i = verbs.len() - 1;
            while i > 0 && verbs[i] == Verb::Move {
                i -= 1;
                point_count -= 1;
            }
        } else if last_move as usize != skip {
            // A move between two blocks of drawing verbs: several contours.
            return Convexity::Concave;
        }
    }

    let points = &storage.points()[skip.min(point_count)..point_count];
    if convexity_by_sign(points) != Convexity::Convex {
        return Convexity::Concave;
    }

    let mut contour_count = 0;
    let mut needs_close = false;
    let mut tracker = TurnTracker::new();

    for seg in storage.raw_iter() {
        if contour_count == 0 {
            if seg.verb == Verb::Move {
                tracker.set_move_pt(seg.pts[0]);
                continue;
            }
            contour_count = 1;
            needs_close = true;
        }
        if contour_count == 1 {
            if matches!(seg.verb, Verb::Close | Verb::Move) {
                if !tracker.close() {
                    return Convexity::Concave;
                }
                needs_close = false;
                contour_count += 1;
            } else {
                for &pt in &seg.points()[1..] {
                    if !tracker.add_pt(pt) {
                        return Convexity::Concave;
                    }
                }
            }
        } else if seg.verb != Verb::Move {
            // Drawing after the first contour closed.
            return Convexity::Concave;
        }
    }

    if needs_close && !tracker.close() {
        return Convexity::Concave;
    }

    if path.cached_first_direction() == FirstDirection::Unknown {
        if tracker.first_direction == FirstDirection::Unknown && !path.bounds().is_empty() {
            // Collinear: convex unless it doubled back too often.
            return if tracker.reversals < 3 {
                Convexity::Convex
            } else {
                Convexity::Concave
            };
        }
        path.set_first_direction(tracker.first_direction);
    }
    Convexity::Convex
}

// ============================================================================
// First direction
// ============================================================================

/// Contours as `(first point index, point count)` where the count includes
/// the move point.
fn contours(verbs: &[Verb]) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < verbs.len() {
        let mut count = 1;
        i += 1;
        while i < verbs.len() && verbs[i] != Verb::Move {
            count += verbs[i].points_consumed();
            i += 1;
        }
        out.push((start, count));
        start += count;
    }
    out
}

fn find_max_y(pts: &[Point]) -> usize {
    let mut max = pts[0].y;
    let mut index = 0;
    for (i, p) in pts.iter().enumerate().skip(1) {
        if p.y > max {
            max = p.y;
            index = i;
        }
    }
    index
}

/// Step from `index` by `inc` (mod n) until a point different from
/// `pts[index]` is found. Returns `index` itself if every point is equal.
fn find_diff_pt(pts: &[Point], index: usize, inc: usize) -> usize {
    let n = pts.len();
    let mut i = index;
    loop {
        i = (i + inc) % n;
        if i == index || pts[index] != pts[i] {
            return i;
        }
    }
}

/// `(min_index, max_index)` of x over the run of points that share
/// `pts[index].y`, walking forward from `index`.
fn find_min_max_x_at_y(pts: &[Point], index: usize) -> (usize, usize) {
    let y = pts[index].y;
    let mut min = pts[index].x;
    let mut max = min;
    let mut min_index = index;
    let mut max_index = index;
    for (i, p) in pts.iter().enumerate().skip(index + 1) {
        if p.y != y {
            break;
        }
        if p.x < min {
            min = p.x;
            min_index = i;
        } else if p.x > max {
            max = p.x;
            max_index = i;
        }
    }
    (min_index, max_index)
}

fn cross_at(pts: &[Point], index: usize) -> Option<f32> {
    let n = pts.len();
    let prev = find_diff_pt(pts, index, n - 1);
    if prev == index {
        // Every point coincides.
        return None;
    }
    let next = find_diff_pt(pts, index, 1);
    let mut cross = cross_product(pts[prev], pts[index], pts[next]);
    if cross == 0.0 && pts[prev].y == pts[index].y && pts[next].y == pts[index].y {
        cross = pts[index].x - pts[next].x;
    }
    Some(cross)
}

/// Winding direction of the contour holding the path's lowest point on
/// screen (largest y), which is an outer contour. Computed only when not
/// cached and the path is not already known to be convex; a known result is
/// cached on the path.
pub(crate) fn compute_first_direction(path: &Path) -> FirstDirection {
    let cached = path.cached_first_direction();
    if cached != FirstDirection::Unknown {
        return cached;
    }
    // A convex path would have cached its direction along with convexity.
    if path.convexity_or_unknown() == Convexity::Convex {
        return cached;
    }

    let storage = path.storage();
    let points = storage.points();
    let mut ymax = path.bounds().y1;
    let mut ymax_cross = 0.0_f32;

    for (start, count) in contours(storage.verbs()) {
        if count < 3 {
            continue;
        }
        let pts = &points[start..start + count];
        let index = find_max_y(pts);
        if pts[index].y < ymax {
            continue;
        }

        let mut cross = None;
        if pts[(index + 1) % count].y == pts[index].y {
            let (min_index, max_index) = find_min_max_x_at_y(pts, index);
            if min_index != max_index {
                // Only the sign matters.
                cross = Some(min_index as f32 - max_index as f32);
            }
        }
        let cross = match cross {
            Some(c) => c,
            None => match cross_at(pts, index) {
                Some(c) => c,
                None => continue,
            },
        };

        if cross != 0.0 {
            ymax = pts[index].y;
            ymax_cross = cross;
        }
    }

    if ymax_cross == 0.0 {
        return FirstDirection::Unknown;
    }
    let dir = if ymax_cross > 0.0 {
        FirstDirection::Cw
    } else {
        FirstDirection::Ccw
    };
    path.set_first_direction(dir);
    dir
}
