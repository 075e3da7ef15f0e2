//! Point-in-path containment.
//!
//! Winding numbers are accumulated by casting a ray from the test point
//! toward negative x over Y-monotonic pieces of every edge. Points that land
//! exactly on edges are counted separately and resolved afterwards: an odd
//! number of touches means inside, and for an even number under the
//! non-zero rule the edge tangents at the point decide whether the touching
//! edges cancel out (coincident, opposite) or enclose the point.

use smallvec::SmallVec;

use crate::basics::{FirstDirection, Point, Rect, Vector, Verb};
use crate::curves::{
    chop_cubic_at_y_extrema, chop_mono_cubic_at_y, chop_quad_at_y_extrema, eval_cubic_coord,
    eval_cubic_tangent_at, eval_quad_tangent_at, find_unit_quad_roots, Conic,
};
use crate::math::{between, nearly_equal, nearly_zero, sign_as_int};
use crate::path::Path;

// ============================================================================
// Winding
// ============================================================================

/// Running totals for one containment query.
#[derive(Debug, Default)]
struct Winding {
    winding: i32,
    on_curve: u32,
}

/// For a horizontal piece, `x` strictly before the end point along the
/// span; otherwise the exact start point.
fn check_on_curve(x: f32, y: f32, start: Point, end: Point) -> bool {
    if start.y == end.y {
        between(start.x, x, end.x) && x != end.x
    } else {
        x == start.x && y == start.y
    }
}

/// Sort the end-point Ys of a monotonic piece. Returns `(y_min, y_max,
/// direction)` with direction `1` for a downward piece.
fn sort_ends(y0: f32, y1: f32) -> (f32, f32, i32) {
    if y0 > y1 {
        (y1, y0, -1)
    } else {
        (y0, y1, 1)
    }
}

impl Winding {
    /// Common end-point handling. `None` when the piece's contribution is
    /// already decided (zero).
    fn enter(&mut self, x: f32, y: f32, start: Point, end: Point) -> Option<i32> {
        let (y0, y1, dir) = sort_ends(start.y, end.y);
        if y < y0 || y > y1 {
            return None;
        }
        if check_on_curve(x, y, start, end) {
            self.on_curve += 1;
            return None;
        }
        if y == y1 {
            return None;
        }
        Some(dir)
    }

    /// Final step for a curve piece whose x at `y` is `xt`.
    fn resolve(&mut self, x: f32, y: f32, xt: f32, end: Point, dir: i32) -> i32 {
        // End points are the next piece's start points.
        if nearly_equal(xt, x) && (x != end.x || y != end.y) {
            self.on_curve += 1;
            return 0;
        }
        if xt < x {
            dir
        } else {
            0
        }
    }

    fn line(&mut self, pts: &[Point], x: f32, y: f32) -> i32 {
        let (p0, p1) = (pts[0], pts[1]);
        let Some(mut dir) = self.enter(x, y, p0, p1) else {
            return 0;
        };
        let dy = p1.y - p0.y;
        let cross = (p1.x - p0.x) * (y - p0.y) - dy * (x - p0.x);
        if cross == 0.0 {
            // On the line, and not at its end point (handled by `enter`).
            if x != p1.x || y != p1.y {
                self.on_curve += 1;
            }
            dir = 0;
        } else if sign_as_int(cross) == dir {
            dir = 0;
        }
        dir
    }

    fn mono_quad(&mut self, pts: &[Point], x: f32, y: f32) -> i32 {
        let Some(dir) = self.enter(x, y, pts[0], pts[2]) else {
            return 0;
        };
        let mut roots = [0.0; 2];
        let n = find_unit_quad_roots(
            pts[0].y - 2.0 * pts[1].y + pts[2].y,
            2.0 * (pts[1].y - pts[0].y),
            pts[0].y - y,
            &mut roots,
        );
        let xt = if n == 0 {
            // Only when y is the start Y: the start point in walk order.
            pts[(1 - dir) as usize].x
        } else {
            let t = roots[0];
            let c = pts[0].x;
            let a = pts[2].x - 2.0 * pts[1].x + c;
            let b = 2.0 * (pts[1].x - c);
            (a * t + b) * t + c
        };
        self.resolve(x, y, xt, pts[2], dir)
    }

    fn quad(&mut self, pts: &[Point; 3], x: f32, y: f32) -> i32 {
        if is_mono_quad(pts[0].y, pts[1].y, pts[2].y) {
            return self.mono_quad(pts, x, y);
        }
        let mut dst = [Point::zero(); 5];
        let n = chop_quad_at_y_extrema(pts, &mut dst);
        let mut w = self.mono_quad(&dst[..3], x, y);
        if n > 0 {
            w += self.mono_quad(&dst[2..], x, y);
        }
        w
    }

    fn mono_conic(&mut self, conic: &Conic, x: f32, y: f32) -> i32 {
        let pts = &conic.pts;
        let Some(dir) = self.enter(x, y, pts[0], pts[2]) else {
            return 0;
        };
        let mut roots = [0.0; 2];
        let (a, b, c) = conic_y_coefficients(pts, conic.w, y);
        let n = find_unit_quad_roots(a, b, c, &mut roots);
        let xt = if n == 0 {
            pts[(1 - dir) as usize].x
        } else {
            conic_eval_x(pts, conic.w, roots[0])
        };
        self.resolve(x, y, xt, pts[2], dir)
    }

    fn conic(&mut self, pts: &[Point; 3], weight: f32, x: f32, y: f32) -> i32 {
        let conic = Conic::new(*pts, weight);
        // Huge coordinates can fail to chop; such a conic is treated as
        // monotonic.
        let chopped = if is_mono_quad(pts[0].y, pts[1].y, pts[2].y) {
            None
        } else {
            conic.chop_at_y_extrema()
        };
        match chopped {
            Some([first, second]) => self.mono_conic(&first, x, y) + self.mono_conic(&second, x, y),
            None => self.mono_conic(&conic, x, y),
        }
    }

    fn mono_cubic(&mut self, pts: &[Point], x: f32, y: f32) -> i32 {
        let Some(dir) = self.enter(x, y, pts[0], pts[3]) else {
            return 0;
        };

        let (min, max) = pts[..4]
            .iter()
            .fold((pts[0].x, pts[0].x), |(lo, hi), p| (lo.min(p.x), hi.max(p.x)));
        if x < min {
            return 0;
        }
        if x > max {
            return dir;
        }

        let mono = [pts[0], pts[1], pts[2], pts[3]];
        let Some(t) = chop_mono_cubic_at_y(&mono, y) else {
            return 0;
        };
        let xt = eval_cubic_coord(pts[0].x, pts[1].x, pts[2].x, pts[3].x, t);
        self.resolve(x, y, xt, pts[3], dir)
    }

    fn cubic(&mut self, pts: &[Point; 4], x: f32, y: f32) -> i32 {
        let mut dst = [Point::zero(); 10];
        let n = chop_cubic_at_y_extrema(pts, &mut dst);
        (0..=n).map(|i| self.mono_cubic(&dst[i * 3..], x, y)).sum()
    }
}

fn is_mono_quad(y0: f32, y1: f32, y2: f32) -> bool {
    if y0 == y1 {
        return true;
    }
    if y0 < y1 {
        y1 <= y2
    } else {
        y1 >= y2
    }
}

/// Coefficients of the quadratic in `t` whose roots are where the conic
/// crosses `y`.
fn conic_y_coefficients(pts: &[Point; 3], w: f32, y: f32) -> (f32, f32, f32) {
    let mut a = pts[2].y;
    let mut b = pts[1].y * w - y * w + y;
    let mut c = pts[0].y;
    a += c - 2.0 * b;
    b -= c;
    c -= y;
    (a, 2.0 * b, c)
}

fn conic_eval_x(pts: &[Point; 3], w: f32, t: f32) -> f32 {
    let src2w = pts[1].x * w;
    let c = pts[0].x;
    let a = pts[2].x - 2.0 * src2w + c;
    let b = 2.0 * (src2w - c);
    let numer = ((a * t + b) * t + c) as f64;

    let db = 2.0 * (w - 1.0);
    let denom = ((-db * t + db) * t + 1.0) as f64;
    (numer / denom) as f32
}

// ============================================================================
// Tangents
// ============================================================================

type Tangents = SmallVec<[Vector; 4]>;

fn tangent_line(pts: &[Point], x: f32, y: f32, tangents: &mut Tangents) {
    let (p0, p1) = (pts[0], pts[1]);
    if !between(p0.y, y, p1.y) || !between(p0.x, x, p1.x) {
        return;
    }
    let dx = p1.x - p0.x;
    let dy = p1.y - p0.y;
    if !nearly_equal((x - p0.x) * dy, dx * (y - p0.y)) {
        return;
    }
    tangents.push(Vector::new(dx, dy));
}

/// True if `v` lies within the span of some consecutive pair of `coords`.
fn spans(coords: impl Iterator<Item = f32> + Clone, v: f32) -> bool {
    coords
        .clone()
        .zip(coords.skip(1))
        .any(|(a, b)| between(a, v, b))
}

fn tangent_quad(pts: &[Point; 3], x: f32, y: f32, tangents: &mut Tangents) {
    if !spans(pts.iter().map(|p| p.y), y) || !spans(pts.iter().map(|p| p.x), x) {
        return;
    }
    let mut roots = [0.0; 2];
    let n = find_unit_quad_roots(
        pts[0].y - 2.0 * pts[1].y + pts[2].y,
        2.0 * (pts[1].y - pts[0].y),
        pts[0].y - y,
        &mut roots,
    );
    for &t in &roots[..n] {
        let c = pts[0].x;
        let a = pts[2].x - 2.0 * pts[1].x + c;
        let b = 2.0 * (pts[1].x - c);
        let xt = (a * t + b) * t + c;
        if nearly_equal(x, xt) {
            tangents.push(eval_quad_tangent_at(pts, t));
        }
    }
}

fn tangent_conic(pts: &[Point; 3], w: f32, x: f32, y: f32, tangents: &mut Tangents) {
    if !spans(pts.iter().map(|p| p.y), y) || !spans(pts.iter().map(|p| p.x), x) {
        return;
    }
    let mut roots = [0.0; 2];
    let (a, b, c) = conic_y_coefficients(pts, w, y);
    let n = find_unit_quad_roots(a, b, c, &mut roots);
    for &t in &roots[..n] {
        if nearly_equal(x, conic_eval_x(pts, w, t)) {
            tangents.push(Conic::new(*pts, w).eval_tangent_at(t));
        }
    }
}

fn tangent_cubic(pts: &[Point; 4], x: f32, y: f32, tangents: &mut Tangents) {
    if !spans(pts.iter().map(|p| p.y), y) || !spans(pts.iter().map(|p| p.x), x) {
        return;
    }
    let mut dst = [Point::zero(); 10];
    let n = chop_cubic_at_y_extrema(pts, &mut dst);
    for i in 0..=n {
        let c = [dst[i * 3], dst[i * 3 + 1], dst[i * 3 + 2], dst[i * 3 + 3]];
        let Some(t) = chop_mono_cubic_at_y(&c, y) else {
            continue;
        };
        let xt = eval_cubic_coord(c[0].x, c[1].x, c[2].x, c[3].x, t);
        if nearly_equal(x, xt) {
            tangents.push(eval_cubic_tangent_at(&c, t));
        }
    }
}

/// Drop the newest tangent if it is degenerate, or together with an older
/// one that runs along the same line in the opposite direction.
fn cancel_newest_tangent(tangents: &mut Tangents) {
    let Some(&tangent) = tangents.last() else {
        return;
    };
    if nearly_zero(tangent.length_sqd()) {
        tangents.pop();
        return;
    }
    let last = tangents.len() - 1;
    for index in 0..last {
        let test = tangents[index];
        if nearly_zero(test.cross(tangent))
            && sign_as_int(tangent.x * test.x) <= 0
            && sign_as_int(tangent.y * test.y) <= 0
        {
            tangents.pop();
            tangents.swap_remove(index);
            break;
        }
    }
}

// ============================================================================
// Queries
// ============================================================================

/// True if `(x, y)` is inside `path` under its fill rule. Points on the
/// boundary are inside.
pub(crate) fn contains(path: &Path, x: f32, y: f32) -> bool {
    let is_inverse = path.is_inverse_fill_type();
    if path.is_empty() || !path.bounds().contains_inclusive(x, y) {
        return is_inverse;
    }

    let mut acc = Winding::default();
    for seg in path.iter(true) {
        let p = &seg.pts;
        let w = match seg.verb {
            Verb::Move | Verb::Close => 0,
            Verb::Line => acc.line(&p[..2], x, y),
            Verb::Quad => acc.quad(&[p[0], p[1], p[2]], x, y),
            Verb::Conic => acc.conic(&[p[0], p[1], p[2]], seg.weight, x, y),
            Verb::Cubic => acc.cubic(p, x, y),
        };
        acc.winding += w;
    }

    let even_odd = path.fill_type().is_even_odd();
    let mut w = acc.winding;
    if even_odd {
        w &= 1;
    }
    if w != 0 {
        return !is_inverse;
    }
    let on_curve = acc.on_curve;
    if on_curve <= 1 {
        return (on_curve != 0) ^ is_inverse;
    }
    if on_curve & 1 == 1 || even_odd {
        return (on_curve & 1 == 1) ^ is_inverse;
    }

    // An even number of touches under the non-zero rule: the point is on
    // the boundary unless every touching edge is cancelled by a coincident
    // one running the other way.
    let mut tangents = Tangents::new();
    for seg in path.iter(true) {
        let before = tangents.len();
        let p = &seg.pts;
        match seg.verb {
            Verb::Move | Verb::Close => {}
            Verb::Line => tangent_line(&p[..2], x, y, &mut tangents),
            Verb::Quad => tangent_quad(&[p[0], p[1], p[2]], x, y, &mut tangents),
            Verb::Conic => tangent_conic(&[p[0], p[1], p[2]], seg.weight, x, y, &mut tangents),
            Verb::Cubic => tangent_cubic(p, x, y, &mut tangents),
        }
        if tangents.len() > before {
            cancel_newest_tangent(&mut tangents);
        }
    }
    !tangents.is_empty() ^ is_inverse
}

/// True if every rect corner is on the inner side of `p0 -> p1` for a
/// contour wound in `dir`.
fn check_edge_against_rect(p0: Point, p1: Point, rect: &Rect, dir: FirstDirection) -> bool {
    let (v, begin) = if dir == FirstDirection::Cw {
        (p1 - p0, p0)
    } else {
        (p0 - p1, p1)
    };
    if v.x == 0.0 && v.y == 0.0 {
        return true;
    }
    let y_l = v.y * (rect.x1 - begin.x);
    let x_t = v.x * (rect.y1 - begin.y);
    let y_r = v.y * (rect.x2 - begin.x);
    let x_b = v.x * (rect.y2 - begin.y);
    !(x_t < y_l || x_t < y_r || x_b < y_l || x_b < y_r)
}

/// Conservative rect containment for convex paths of known direction.
pub(crate) fn conservatively_contains_rect(path: &Path, rect: &Rect) -> bool {
    if !path.is_convex() {
        return false;
    }
    let direction = path.first_direction();
    if direction == FirstDirection::Unknown {
        return false;
    }

    let mut first_pt = Point::zero();
    let mut prev_pt = Point::zero();
    let mut segment_count = 0;

    for seg in path.raw_iter() {
        if seg.verb == Verb::Close || (segment_count > 0 && seg.verb == Verb::Move) {
            segment_count += 1;
            break;
        }
        if seg.verb == Verb::Move {
            first_pt = seg.pts[0];
            prev_pt = first_pt;
            continue;
        }

        let pts = seg.points();
        if pts.iter().all(|&p| p == pts[0]) {
            continue;
        }
        segment_count += 1;
        let end = pts[pts.len() - 1];
        if seg.verb == Verb::Conic {
            let conic = Conic::new([pts[0], pts[1], pts[2]], seg.weight);
            let mid = conic.eval_at(0.5);
            if !check_edge_against_rect(pts[0], mid, rect, direction)
                || !check_edge_against_rect(mid, end, rect, direction)
            {
                return false;
            }
        } else if !check_edge_against_rect(prev_pt, end, rect, direction) {
            return false;
        }
        prev_pt = end;
    }

    segment_count > 0 && check_edge_against_rect(prev_pt, first_pt, rect, direction)
}
