//! Shape recognition.
//!
//! Rectangles are recognized structurally from the verb and point streams.
//! Ovals and round rects are only reported when the storage still carries the
//! hint left by the helper that built them; any later edit drops the hint.

use crate::basics::{PathDirection, Point, Rect, Vector, Verb};
use crate::path::Path;
use crate::path_storage::PathStorage;
use crate::round_rect::{Corner, RoundRect};

/// Result of a successful rectangle match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectInfo {
    pub rect: Rect,
    /// The contour ended with an explicit close verb.
    pub is_closed: bool,
    pub direction: PathDirection,
}

/// Result of a successful oval match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OvalInfo {
    pub bounds: Rect,
    pub direction: PathDirection,
    /// Side midpoint the oval starts at, 0..4.
    pub start: u32,
}

/// Result of a successful round-rect match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RRectInfo {
    pub rrect: RoundRect,
    pub direction: PathDirection,
    /// Arc end point the round rect starts at, 0..8.
    pub start: u32,
}

fn direction_from_ccw(ccw: bool) -> PathDirection {
    if ccw {
        PathDirection::Ccw
    } else {
        PathDirection::Cw
    }
}

fn is_diagonal(v: Vector) -> bool {
    v.x != 0.0 && v.y != 0.0
}

// ============================================================================
// Rectangles
// ============================================================================

/// Match a single axis-aligned rectangle contour.
///
/// Edges are classified into four directions encoded as
/// `bit0 = horizontal`, `bit1 = positive`. Consecutive collinear edges in the
/// same direction merge into one side, opposite sides must differ only in
/// bit1, and at most four turns are allowed. Three sides are accepted when
/// the missing fourth side is axis-aligned. Leading and trailing moves are
/// ignored; a second contour with real edges is rejected.
pub fn is_rect(path: &Path) -> Option<RectInfo> {
    let storage = path.storage();
    let points = storage.points();

    let mut corners = 0usize;
    let mut directions = [-1i32; 5];
    let mut first_pt: Option<Point> = None;
    let mut last_pt: Option<Point> = None;
    let mut line_start = Point::zero();
    let mut first_corner = Point::zero();
    let mut third_corner = Point::zero();
    let mut closed_or_moved = false;
    let mut auto_close = false;
    let mut pi = 0usize;

    for &verb in storage.verbs() {
        match verb {
            Verb::Line | Verb::Close => {
                let line_end = if verb == Verb::Close {
                    auto_close = true;
                    first_pt?
                } else {
                    let pt = *points.get(pi)?;
                    pi += 1;
                    last_pt = Some(pt);
                    pt
                };

                let delta = line_end - line_start;
                if is_diagonal(delta) || !delta.is_finite() {
                    return None;
                }
                if line_start == line_end {
                    continue;
                }

                let dir = (delta.x != 0.0) as i32 | (((delta.x > 0.0 || delta.y > 0.0) as i32) << 1);
                if corners == 0 {
                    directions[0] = dir;
                    corners = 1;
                    closed_or_moved = false;
                    line_start = line_end;
                    continue;
                }
                if closed_or_moved {
                    return None;
                }
                if auto_close && dir == directions[0] {
                    // Closing edge continues the first side.
                    continue;
                }
                closed_or_moved = auto_close;

                if directions[corners - 1] == dir {
                    if corners == 3 && verb == Verb::Line {
                        third_corner = line_end;
                    }
                    line_start = line_end;
                    continue;
                }

                directions[corners] = dir;
                corners += 1;
                match corners {
                    2 => first_corner = line_start,
                    3 => {
                        if (directions[0] ^ directions[2]) != 2 {
                            return None;
                        }
                        third_corner = line_end;
                    }
                    4 => {
                        if (directions[1] ^ directions[3]) != 2 {
                            return None;
                        }
                    }
                    _ => return None,
                }
                line_start = line_end;
            }
            Verb::Quad | Verb::Conic | Verb::Cubic => return None,
            Verb::Move => {
                let pt = *points.get(pi)?;
                if corners == 0 {
                    first_pt = Some(pt);
                } else {
                    let (first, last) = (first_pt?, last_pt?);
                    if is_diagonal(first - last) {
                        return None;
                    }
                }
                line_start = pt;
                pi += 1;
                closed_or_moved = true;
            }
        }
    }

    if !(3..=4).contains(&corners) {
        return None;
    }
    let (first, last) = (first_pt?, last_pt?);
    if is_diagonal(first - last) {
        return None;
    }

    let direction = if directions[0] == ((directions[1] + 1) & 3) {
        PathDirection::Cw
    } else {
        PathDirection::Ccw
    };
    Some(RectInfo {
        rect: Rect::from_points(first_corner, third_corner),
        is_closed: auto_close,
        direction,
    })
}

/// Every consecutive pair of points shares an x or a y.
pub(crate) fn is_axis_aligned(path: &Path) -> bool {
    path.points()
        .windows(2)
        .all(|w| w[0].x == w[1].x || w[0].y == w[1].y)
}

// ============================================================================
// Hinted shapes
// ============================================================================

pub fn oval_info(path: &Path) -> Option<OvalInfo> {
    let storage = path.storage();
    storage.oval_hint().map(|(ccw, start)| OvalInfo {
        bounds: storage.bounds(),
        direction: direction_from_ccw(ccw),
        start,
    })
}

pub fn rrect_info(path: &Path) -> Option<RRectInfo> {
    let storage = path.storage();
    storage.rrect_hint().map(|(ccw, start)| RRectInfo {
        rrect: rrect_from_storage(storage),
        direction: direction_from_ccw(ccw),
        start,
    })
}

/// Rebuild the round rect from its corner conics. Each conic's control point
/// sits on a bounds corner; the radii come from the legs on either side.
fn rrect_from_storage(storage: &PathStorage) -> RoundRect {
    let bounds = storage.bounds();
    let mut radii = [Vector::zero(); 4];

    for seg in storage.raw_iter() {
        if seg.verb != Verb::Conic {
            continue;
        }
        let (p0, p1, p2) = (seg.pts[0], seg.pts[1], seg.pts[2]);
        let v10 = p1 - p0;
        let v21 = p2 - p1;
        let radius = if v10.x != 0.0 {
            Vector::new(v10.x.abs(), v21.y.abs())
        } else if v10.y == 0.0 {
            Vector::new(v21.x.abs(), v21.y.abs())
        } else {
            Vector::new(v21.x.abs(), v10.y.abs())
        };
        let corner = if p1.x == bounds.x1 {
            if p1.y == bounds.y1 {
                Corner::UpperLeft
            } else {
                Corner::LowerLeft
            }
        } else if p1.y == bounds.y1 {
            Corner::UpperRight
        } else {
            Corner::LowerRight
        };
        radii[corner as usize] = radius;
    }

    RoundRect::from_rect_radii(&bounds, &radii)
}

// ============================================================================
// Tests
// ============================================================================
