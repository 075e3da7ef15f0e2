//! Path iteration.
//!
//! [`RawIter`] walks storage exactly as recorded. [`Iter`] reports contours
//! the way consumers draw them: each segment carries its start point, and in
//! force-close mode every open contour ends with a synthesized closing line
//! and a `Close`.

use crate::basics::{Point, Verb};
use crate::path::Path;
use crate::path_storage::PathStorage;

// ============================================================================
// Segment
// ============================================================================

/// One verb with its points. For drawing verbs `pts[0]` is the start point
/// (the previous verb's end). Unused slots are zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub verb: Verb,
    pub pts: [Point; 4],
    /// Conic weight; 1 for every other verb.
    pub weight: f32,
}

impl Segment {
    fn new(verb: Verb) -> Self {
        Self {
            verb,
            pts: [Point::zero(); 4],
            weight: 1.0,
        }
    }

    /// The meaningful points: 1 for Move, 2 for Line, 3 for Quad and Conic,
    /// 4 for Cubic, none for Close.
    pub fn points(&self) -> &[Point] {
        let n = match self.verb {
            Verb::Move => 1,
            Verb::Line => 2,
            Verb::Quad | Verb::Conic => 3,
            Verb::Cubic => 4,
            Verb::Close => 0,
        };
        &self.pts[..n]
    }
}

// ============================================================================
// RawIter
// ============================================================================

/// Storage-order iteration with no synthesized segments. Non-finite storage
/// yields nothing.
pub struct RawIter<'a> {
    verbs: &'a [Verb],
    points: &'a [Point],
    weights: &'a [f32],
    verb_index: usize,
    point_index: usize,
    weight_index: usize,
}

impl<'a> RawIter<'a> {
    pub fn new(storage: &'a PathStorage) -> Self {
        let verbs = if storage.is_finite() {
            storage.verbs()
        } else {
            &[]
        };
        Self {
            verbs,
            points: storage.points(),
            weights: storage.conic_weights(),
            verb_index: 0,
            point_index: 0,
            weight_index: 0,
        }
    }

    /// The verb `next` would return.
    pub fn peek(&self) -> Option<Verb> {
        self.verbs.get(self.verb_index).copied()
    }
}

impl Iterator for RawIter<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        let verb = *self.verbs.get(self.verb_index)?;
        self.verb_index += 1;

        let mut seg = Segment::new(verb);
        let n = verb.points_consumed();
        let src = &self.points[self.point_index..self.point_index + n];
        if verb == Verb::Move {
            seg.pts[0] = src[0];
        } else if n > 0 {
            seg.pts[0] = self.points[self.point_index.saturating_sub(1)];
            seg.pts[1..=n].copy_from_slice(src);
        }
        if verb == Verb::Conic {
            seg.weight = self.weights[self.weight_index];
            self.weight_index += 1;
        }
        self.point_index += n;
        Some(seg)
    }
}

// ============================================================================
// Iter
// ============================================================================

/// Contour iteration with optional forced closing.
///
/// With `force_close`, an open contour is finished with a line back to its
/// start (when the last point differs) and a `Close`. A trailing `Move`
/// ends iteration.
pub struct Iter<'a> {
    verbs: &'a [Verb],
    points: &'a [Point],
    weights: &'a [f32],
    verb_index: usize,
    point_index: usize,
    weight_index: usize,
    move_to: Point,
    last_pt: Point,
    force_close: bool,
    need_close: bool,
    close_line: bool,
}

impl<'a> Iter<'a> {
    pub fn new(path: &'a Path, force_close: bool) -> Self {
        let storage = path.storage();
        Self {
            verbs: storage.verbs(),
            points: storage.points(),
            weights: storage.conic_weights(),
            verb_index: 0,
            point_index: 0,
            weight_index: 0,
            move_to: Point::zero(),
            last_pt: Point::zero(),
            force_close,
            need_close: false,
            close_line: false,
        }
    }

    /// True if the last `Line` returned was synthesized (or recorded) to
    /// close the contour rather than drawn by the caller.
    pub fn is_close_line(&self) -> bool {
        self.close_line
    }

    /// True if the contour about to be iterated ends with a `Close`, or if
    /// iteration forces closing.
    pub fn is_closed_contour(&self) -> bool {
        if self.verb_index >= self.verbs.len() {
            return false;
        }
        if self.force_close {
            return true;
        }
        let mut rest = &self.verbs[self.verb_index..];
        if rest.first() == Some(&Verb::Move) {
            rest = &rest[1..];
        }
        for &verb in rest {
            match verb {
                Verb::Move => break,
                Verb::Close => return true,
                _ => {}
            }
        }
        false
    }

    fn auto_close(&mut self, seg: &mut Segment) -> Verb {
        if self.last_pt != self.move_to {
            // NaN never compares equal; treat it as already closed.
            let nan = self.last_pt.x.is_nan()
                || self.last_pt.y.is_nan()
                || self.move_to.x.is_nan()
                || self.move_to.y.is_nan();
            if nan {
                return Verb::Close;
            }
            seg.pts[0] = self.last_pt;
            seg.pts[1] = self.move_to;
            self.last_pt = self.move_to;
            self.close_line = true;
            Verb::Line
        } else {
            seg.pts[0] = self.move_to;
            Verb::Close
        }
    }

    fn closing_segment(&mut self) -> Segment {
        let mut seg = Segment::new(Verb::Close);
        seg.verb = self.auto_close(&mut seg);
        seg
    }
}

impl Iterator for Iter<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        let Some(&verb) = self.verbs.get(self.verb_index) else {
            if self.need_close {
                let seg = self.closing_segment();
                if seg.verb == Verb::Close {
                    self.need_close = false;
                }
                return Some(seg);
            }
            return None;
        };

        let mut seg = Segment::new(verb);
        let src = self.point_index;
        match verb {
            Verb::Move => {
                if self.need_close {
                    // Finish the previous contour before starting this one.
                    let seg = self.closing_segment();
                    if seg.verb == Verb::Close {
                        self.need_close = false;
                    }
                    return Some(seg);
                }
                self.verb_index += 1;
                if self.verb_index == self.verbs.len() {
                    return None;
                }
                self.move_to = self.points[src];
                seg.pts[0] = self.move_to;
                self.last_pt = self.move_to;
                self.need_close = self.force_close;
                self.point_index += 1;
            }
            Verb::Line => {
                self.verb_index += 1;
                seg.pts[0] = self.last_pt;
                seg.pts[1] = self.points[src];
                self.last_pt = seg.pts[1];
                self.close_line = false;
                self.point_index += 1;
            }
            Verb::Quad | Verb::Conic => {
                self.verb_index += 1;
                if verb == Verb::Conic {
                    seg.weight = self.weights[self.weight_index];
                    self.weight_index += 1;
                }
                seg.pts[0] = self.last_pt;
                seg.pts[1..3].copy_from_slice(&self.points[src..src + 2]);
                self.last_pt = seg.pts[2];
                self.point_index += 2;
            }
            Verb::Cubic => {
                self.verb_index += 1;
                seg.pts[0] = self.last_pt;
                seg.pts[1..4].copy_from_slice(&self.points[src..src + 3]);
                self.last_pt = seg.pts[3];
                self.point_index += 3;
            }
            Verb::Close => {
                seg.verb = self.auto_close(&mut seg);
                if seg.verb == Verb::Close {
                    // A closing line leaves the Close to be reported next.
                    self.verb_index += 1;
                    self.need_close = false;
                }
                self.last_pt = self.move_to;
            }
        }
        Some(seg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::{PathDirection, Rect};

    fn verbs_of<I: Iterator<Item = Segment>>(iter: I) -> Vec<Verb> {
        iter.map(|s| s.verb).collect()
    }

    fn open_triangle() -> Path {
        let mut p = Path::new();
        p.move_to(0.0, 0.0).line_to(10.0, 0.0).line_to(10.0, 10.0);
        p
    }

    #[test]
    fn test_raw_iter_reports_storage_order() {
        let p = open_triangle();
        let segs: Vec<Segment> = p.storage().raw_iter().collect();
        assert_eq!(segs.len(), 3);
        assert_eq!(segs[1].verb, Verb::Line);
        assert_eq!(segs[1].points(), &[Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
    }

    #[test]
    fn test_raw_iter_skips_non_finite() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0).line_to(f32::INFINITY, 0.0);
        assert_eq!(p.storage().raw_iter().count(), 0);
    }

    #[test]
    fn test_force_close_synthesizes_line() {
        let p = open_triangle();
        let mut iter = Iter::new(&p, true);
        let verbs: Vec<Verb> = iter.by_ref().take(4).map(|s| s.verb).collect();
        assert_eq!(verbs, vec![Verb::Move, Verb::Line, Verb::Line, Verb::Line]);
        assert!(iter.is_close_line());
        assert_eq!(iter.next().map(|s| s.verb), Some(Verb::Close));
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_no_force_close_leaves_contour_open() {
        let p = open_triangle();
        assert_eq!(
            verbs_of(Iter::new(&p, false)),
            vec![Verb::Move, Verb::Line, Verb::Line]
        );
    }

    #[test]
    fn test_explicit_close_gets_closing_line() {
        let mut p = open_triangle();
        p.close();
        let segs: Vec<Segment> = Iter::new(&p, false).collect();
        let verbs: Vec<Verb> = segs.iter().map(|s| s.verb).collect();
        assert_eq!(
            verbs,
            vec![Verb::Move, Verb::Line, Verb::Line, Verb::Line, Verb::Close]
        );
        assert_eq!(segs[3].pts[1], Point::new(0.0, 0.0));
    }

    #[test]
    fn test_trailing_move_is_dropped() {
        let mut p = open_triangle();
        p.move_to(50.0, 50.0);
        assert_eq!(verbs_of(Iter::new(&p, true)).last(), Some(&Verb::Close));
        assert_eq!(verbs_of(Iter::new(&p, true)).len(), 5);
    }

    #[test]
    fn test_is_closed_contour() {
        let mut p = Path::new();
        p.add_rect(&Rect::new(0.0, 0.0, 5.0, 5.0), PathDirection::Cw, 0);
        assert!(Iter::new(&p, false).is_closed_contour());
        let open = open_triangle();
        assert!(!Iter::new(&open, false).is_closed_contour());
        assert!(Iter::new(&open, true).is_closed_contour());
    }
}
