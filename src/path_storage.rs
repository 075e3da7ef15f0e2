//! Shared path storage and its single mutation gateway.
//!
//! A [`PathStorage`] holds the verb, point and conic-weight arrays of a path
//! together with lazily computed bounds and a generation id. Paths share
//! storage through an `Arc`; every write goes through a [`PathEditor`], which
//! clones the storage first when another handle still refers to it.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};

use crate::basics::{Point, Rect, Verb};
use crate::bounding_rect::bounding_rect;
use crate::matrix::Matrix;
use crate::path_iter::RawIter;

// ============================================================================
// Generation ids
// ============================================================================

/// Id reported by storage with no verbs and no points.
pub const EMPTY_GEN_ID: u32 = 1;

#[cfg(not(feature = "narrow-gen-id"))]
const GEN_ID_BITS: u32 = 32;
#[cfg(feature = "narrow-gen-id")]
const GEN_ID_BITS: u32 = 30;

const GEN_ID_MASK: u32 = ((1u64 << GEN_ID_BITS) - 1) as u32;

static NEXT_GEN_ID: AtomicU32 = AtomicU32::new(EMPTY_GEN_ID + 1);

fn next_gen_id() -> u32 {
    loop {
        let id = NEXT_GEN_ID.fetch_add(1, Ordering::Relaxed) & GEN_ID_MASK;
        if id != 0 && id != EMPTY_GEN_ID {
            return id;
        }
    }
}

// ============================================================================
// PathStorage
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
struct BoundsCache {
    rect: Rect,
    is_finite: bool,
}

impl BoundsCache {
    fn compute(points: &[Point]) -> Self {
        match bounding_rect(points) {
            Some(rect) => Self {
                rect,
                is_finite: true,
            },
            None => Self {
                rect: Rect::empty(),
                is_finite: false,
            },
        }
    }
}

/// Verb, point and weight arrays plus derived caches.
///
/// Read access is free; write access requires a [`PathEditor`].
#[derive(Debug)]
pub struct PathStorage {
    verbs: Vec<Verb>,
    points: Vec<Point>,
    conic_weights: Vec<f32>,
    segment_mask: u8,
    bounds: OnceLock<BoundsCache>,
    gen_id: AtomicU32,
    is_oval: bool,
    is_rrect: bool,
    rrect_or_oval_is_ccw: bool,
    rrect_or_oval_start: u8,
}

static EMPTY_STORAGE: OnceLock<Arc<PathStorage>> = OnceLock::new();

impl PathStorage {
    fn new() -> Self {
        Self {
            verbs: Vec::new(),
            points: Vec::new(),
            conic_weights: Vec::new(),
            segment_mask: 0,
            bounds: OnceLock::new(),
            gen_id: AtomicU32::new(0),
            is_oval: false,
            is_rrect: false,
            rrect_or_oval_is_ccw: false,
            rrect_or_oval_start: 0,
        }
    }

    /// The process-wide empty storage. Its bounds are computed up front so
    /// concurrent readers never race to fill them.
    pub fn empty() -> Arc<PathStorage> {
        EMPTY_STORAGE
            .get_or_init(|| {
                let storage = PathStorage::new();
                storage.bounds_cache();
                storage.gen_id.store(EMPTY_GEN_ID, Ordering::Relaxed);
                Arc::new(storage)
            })
            .clone()
    }

    /// Fresh storage with room for `verbs` and `points` more entries.
    pub(crate) fn with_capacity(verbs: usize, points: usize) -> Self {
        let mut storage = Self::new();
        storage.reserve(verbs, points);
        storage
    }

    /// Deep copy with additional capacity.
    pub(crate) fn copy_with_reserve(&self, verbs: usize, points: usize) -> Self {
        let mut copy = self.clone();
        copy.reserve(verbs, points);
        copy
    }

    /// Storage over arrays recorded elsewhere. `segment_mask` must cover
    /// every verb in `verbs`.
    pub(crate) fn from_parts(
        verbs: Vec<Verb>,
        points: Vec<Point>,
        conic_weights: Vec<f32>,
        segment_mask: u8,
    ) -> Self {
        Self {
            verbs,
            points,
            conic_weights,
            segment_mask,
            ..Self::new()
        }
    }

    fn reserve(&mut self, verbs: usize, points: usize) {
        self.verbs.reserve(verbs);
        self.points.reserve(points);
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn verbs(&self) -> &[Verb] {
        &self.verbs
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn conic_weights(&self) -> &[f32] {
        &self.conic_weights
    }

    pub fn count_verbs(&self) -> usize {
        self.verbs.len()
    }

    pub fn count_points(&self) -> usize {
        self.points.len()
    }

    pub fn count_weights(&self) -> usize {
        self.conic_weights.len()
    }

    pub fn at_verb(&self, index: usize) -> Verb {
        self.verbs[index]
    }

    pub fn at_point(&self, index: usize) -> Point {
        self.points[index]
    }

    /// OR of the segment-mask bits of every verb ever appended.
    pub fn segment_mask(&self) -> u8 {
        self.segment_mask
    }

    fn bounds_cache(&self) -> &BoundsCache {
        self.bounds
            .get_or_init(|| BoundsCache::compute(&self.points))
    }

    /// Envelope of every stored point. Empty when any point is not finite.
    pub fn bounds(&self) -> Rect {
        self.bounds_cache().rect
    }

    pub fn is_finite(&self) -> bool {
        self.bounds_cache().is_finite
    }

    /// True once bounds have been computed since the last edit.
    pub fn has_computed_bounds(&self) -> bool {
        self.bounds.get().is_some()
    }

    /// Raw iteration in storage order. Yields nothing for non-finite storage.
    pub fn raw_iter(&self) -> RawIter<'_> {
        RawIter::new(self)
    }

    /// Generation id, assigned on first read after an edit. Storage with no
    /// verbs and no points always reads [`EMPTY_GEN_ID`].
    pub fn gen_id(&self) -> u32 {
        let id = self.gen_id.load(Ordering::Relaxed);
        if id != 0 {
            return id;
        }
        let fresh = if self.points.is_empty() && self.verbs.is_empty() {
            EMPTY_GEN_ID
        } else {
            next_gen_id()
        };
        match self
            .gen_id
            .compare_exchange(0, fresh, Ordering::Relaxed, Ordering::Relaxed)
        {
            Ok(_) => fresh,
            Err(existing) => existing,
        }
    }

    // ------------------------------------------------------------------------
    // Shape hints
    // ------------------------------------------------------------------------

    /// `(is_ccw, start_index)` when built by an oval helper.
    pub fn oval_hint(&self) -> Option<(bool, u32)> {
        self.is_oval
            .then_some((self.rrect_or_oval_is_ccw, self.rrect_or_oval_start as u32))
    }

    /// `(is_ccw, start_index)` when built by a round-rect helper.
    pub fn rrect_hint(&self) -> Option<(bool, u32)> {
        self.is_rrect
            .then_some((self.rrect_or_oval_is_ccw, self.rrect_or_oval_start as u32))
    }

    // ------------------------------------------------------------------------
    // Whole-storage operations
    // ------------------------------------------------------------------------

    /// Same verbs, same weights and the same number of points.
    pub fn is_interpolatable(&self, other: &PathStorage) -> bool {
        self.points.len() == other.points.len()
            && self.verbs == other.verbs
            && self.conic_weights == other.conic_weights
    }

    /// `self * weight + ending * (1 - weight)`, point by point.
    pub(crate) fn interpolate(&self, ending: &PathStorage, weight: f32) -> PathStorage {
        let mut out = self.clone();
        for (p, e) in out.points.iter_mut().zip(ending.points.iter()) {
            p.x = p.x * weight + e.x * (1.0 - weight);
            p.y = p.y * weight + e.y * (1.0 - weight);
        }
        out.bounds.take();
        out.is_oval = false;
        out.is_rrect = false;
        out
    }

    /// Map every point of the storage behind `handle` through an affine
    /// `matrix`, cloning first if the storage is shared.
    ///
    /// Known bounds are mapped instead of recomputed when the matrix keeps
    /// rectangles axis-aligned. Oval and round-rect hints survive only under
    /// such matrices, with direction and start index adjusted.
    pub(crate) fn transform(handle: &mut Arc<PathStorage>, matrix: &Matrix) {
        if matrix.is_identity() {
            return;
        }
        debug_assert!(!matrix.has_perspective());

        let src_bounds = handle.bounds.get().copied();
        let rect_stays_rect = matrix.rect_stays_rect();
        let can_xform_bounds = rect_stays_rect && handle.points.len() > 1;

        let storage = Arc::make_mut(handle);
        matrix.map_points_in_place(&mut storage.points);
        storage.gen_id = AtomicU32::new(0);
        storage.bounds.take();

        if let (true, Some(src)) = (can_xform_bounds, src_bounds) {
            let cache = if src.is_finite {
                let rect = matrix.map_rect(&src.rect);
                if rect.is_finite() {
                    BoundsCache {
                        rect,
                        is_finite: true,
                    }
                } else {
                    BoundsCache {
                        rect: Rect::empty(),
                        is_finite: false,
                    }
                }
            } else {
                BoundsCache {
                    rect: Rect::empty(),
                    is_finite: false,
                }
            };
            let _ = storage.bounds.set(cache);
        }

        storage.is_oval &= rect_stays_rect;
        storage.is_rrect &= rect_stays_rect;
        if storage.is_oval || storage.is_rrect {
            let (ccw, start) = transform_dir_and_start(
                matrix,
                storage.is_rrect,
                storage.rrect_or_oval_is_ccw,
                storage.rrect_or_oval_start as u32,
            );
            storage.rrect_or_oval_is_ccw = ccw;
            storage.rrect_or_oval_start = start as u8;
        }
    }

    /// Record `rect` as the finite bounds of the storage behind `handle`.
    /// Shared storage is left alone; its bounds are computed on demand.
    pub(crate) fn set_bounds(handle: &mut Arc<PathStorage>, rect: Rect) {
        if let Some(storage) = Arc::get_mut(handle) {
            storage.bounds.take();
            let _ = storage.bounds.set(BoundsCache {
                rect,
                is_finite: true,
            });
        }
    }

    /// Clear the storage behind `handle`, keeping its capacity when it is
    /// not shared.
    pub(crate) fn rewind(handle: &mut Arc<PathStorage>) {
        match Arc::get_mut(handle) {
            Some(storage) => {
                storage.verbs.clear();
                storage.points.clear();
                storage.conic_weights.clear();
                storage.segment_mask = 0;
                storage.bounds.take();
                storage.gen_id = AtomicU32::new(0);
                storage.is_oval = false;
                storage.is_rrect = false;
            }
            None => {
                let (verbs, points) = (handle.verbs.len(), handle.points.len());
                *handle = Arc::new(PathStorage::with_capacity(verbs, points));
            }
        }
    }
}

impl Clone for PathStorage {
    fn clone(&self) -> Self {
        Self {
            verbs: self.verbs.clone(),
            points: self.points.clone(),
            conic_weights: self.conic_weights.clone(),
            segment_mask: self.segment_mask,
            bounds: self.bounds.clone(),
            gen_id: AtomicU32::new(0),
            is_oval: self.is_oval,
            is_rrect: self.is_rrect,
            rrect_or_oval_is_ccw: self.rrect_or_oval_is_ccw,
            rrect_or_oval_start: self.rrect_or_oval_start,
        }
    }
}

impl PartialEq for PathStorage {
    fn eq(&self, other: &Self) -> bool {
        if self.segment_mask != other.segment_mask {
            return false;
        }
        let id = self.gen_id.load(Ordering::Relaxed);
        if id != 0 && id == other.gen_id.load(Ordering::Relaxed) {
            return true;
        }
        self.points == other.points
            && self.conic_weights == other.conic_weights
            && self.verbs == other.verbs
    }
}

/// New `(is_ccw, start)` for an oval or round-rect hint after mapping
/// through a rect-preserving matrix.
///
/// Ovals have one start index per side; round rects have two, so their
/// index is folded to a side, adjusted, then unfolded.
pub(crate) fn transform_dir_and_start(
    matrix: &Matrix,
    is_rrect: bool,
    is_ccw: bool,
    start: u32,
) -> (bool, u32) {
    let mut in_start = start;
    let mut rm = 0;
    if is_rrect {
        rm = in_start & 1;
        in_start /= 2;
    }

    // anti_diag: the diagonal is zero. top_neg: the non-zero entry of the
    // top row is negative. same_sign: both non-zero entries share a sign.
    let (anti_diag, top, bottom) = if matrix.sx != 0.0 {
        (0b00, matrix.sx, matrix.sy)
    } else {
        (0b01, matrix.shx, matrix.shy)
    };
    let (top_neg, same_sign) = if top > 0.0 {
        (0b00, if bottom > 0.0 { 0b01 } else { 0b00 })
    } else {
        (0b10, if bottom > 0.0 { 0b00 } else { 0b01 })
    };

    if same_sign != anti_diag {
        // Rotation, possibly with scale: direction is unchanged.
        let mut out = (in_start + 4 - (top_neg | anti_diag)) % 4;
        if is_rrect {
            out = 2 * out + rm;
        }
        (is_ccw, out)
    } else {
        // Mirror: direction flips.
        let mut out = (6 + (top_neg | anti_diag) - in_start) % 4;
        if is_rrect {
            out = 2 * out + if rm != 0 { 0 } else { 1 };
        }
        (!is_ccw, out)
    }
}

// ============================================================================
// PathEditor
// ============================================================================

/// Exclusive write access to the storage behind a path handle.
///
/// Acquiring an editor makes the storage unique (cloning it if shared),
/// resets the generation id and drops the cached bounds.
pub struct PathEditor<'a> {
    storage: &'a mut PathStorage,
}

impl<'a> PathEditor<'a> {
    pub fn new(handle: &'a mut Arc<PathStorage>, inc_verbs: usize, inc_points: usize) -> Self {
        if let Some(storage) = Arc::get_mut(handle) {
            storage.reserve(inc_verbs, inc_points);
        } else {
            *handle = Arc::new(handle.copy_with_reserve(inc_verbs, inc_points));
        }
        let storage = Arc::make_mut(handle);
        storage.gen_id = AtomicU32::new(0);
        storage.bounds.take();
        Self { storage }
    }

    pub fn storage(&self) -> &PathStorage {
        self.storage
    }

    fn note_append(&mut self, mask: u8) {
        self.storage.segment_mask |= mask;
        self.storage.is_oval = false;
        self.storage.is_rrect = false;
    }

    /// Append one verb and return its (zeroed) points for the caller to
    /// fill. `weight` is stored only for conics.
    pub fn grow_for_verb(&mut self, verb: Verb, weight: f32) -> &mut [Point] {
        self.note_append(verb.segment_mask());
        self.storage.verbs.push(verb);
        if verb == Verb::Conic {
            self.storage.conic_weights.push(weight);
        }
        let start = self.storage.points.len();
        let count = verb.points_consumed();
        self.storage.points.resize(start + count, Point::zero());
        &mut self.storage.points[start..]
    }

    /// Append `count` copies of `verb`. Returns the new points and, for
    /// conics, the new weight slots.
    pub fn grow_for_repeated_verb(&mut self, verb: Verb, count: usize) -> (&mut [Point], &mut [f32]) {
        self.note_append(verb.segment_mask());
        self.storage
            .verbs
            .extend(std::iter::repeat(verb).take(count));

        let weight_start = self.storage.conic_weights.len();
        if verb == Verb::Conic {
            self.storage.conic_weights.resize(weight_start + count, 1.0);
        }
        let point_start = self.storage.points.len();
        self.storage
            .points
            .resize(point_start + count * verb.points_consumed(), Point::zero());

        let storage = &mut *self.storage;
        (
            &mut storage.points[point_start..],
            &mut storage.conic_weights[weight_start..],
        )
    }

    /// Append every verb of `src`. Returns slots for its points and
    /// weights, which the caller fills (typically with mapped values).
    pub fn grow_for_verbs_in_path(&mut self, src: &PathStorage) -> (&mut [Point], &mut [f32]) {
        self.note_append(src.segment_mask);
        self.storage.verbs.extend_from_slice(&src.verbs);

        let point_start = self.storage.points.len();
        self.storage
            .points
            .resize(point_start + src.points.len(), Point::zero());
        let weight_start = self.storage.conic_weights.len();
        self.storage
            .conic_weights
            .resize(weight_start + src.conic_weights.len(), 1.0);

        let storage = &mut *self.storage;
        (
            &mut storage.points[point_start..],
            &mut storage.conic_weights[weight_start..],
        )
    }

    /// Writable points. Drops the oval and round-rect hints.
    pub fn points_mut(&mut self) -> &mut [Point] {
        self.storage.is_oval = false;
        self.storage.is_rrect = false;
        &mut self.storage.points
    }

    pub fn set_point(&mut self, index: usize, p: Point) {
        self.points_mut()[index] = p;
    }

    /// Mark the storage as an oval (or clear the mark) with the given
    /// direction and start index.
    pub fn set_is_oval(&mut self, is_oval: bool, is_ccw: bool, start: u32) {
        self.storage.is_oval = is_oval;
        self.storage.rrect_or_oval_is_ccw = is_ccw;
        self.storage.rrect_or_oval_start = start as u8;
    }

    pub fn set_is_rrect(&mut self, is_rrect: bool, is_ccw: bool, start: u32) {
        self.storage.is_rrect = is_rrect;
        self.storage.rrect_or_oval_is_ccw = is_ccw;
        self.storage.rrect_or_oval_start = start as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Arc<PathStorage> {
        let mut handle = PathStorage::empty();
        {
            let mut ed = PathEditor::new(&mut handle, 4, 3);
            ed.grow_for_verb(Verb::Move, 1.0)[0] = Point::new(0.0, 0.0);
            ed.grow_for_verb(Verb::Line, 1.0)[0] = Point::new(10.0, 0.0);
            ed.grow_for_verb(Verb::Line, 1.0)[0] = Point::new(10.0, 10.0);
            ed.grow_for_verb(Verb::Close, 1.0);
        }
        handle
    }

    #[test]
    fn test_empty_singleton() {
        let a = PathStorage::empty();
        let b = PathStorage::empty();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.gen_id(), EMPTY_GEN_ID);
        assert!(a.is_finite());
        assert!(a.has_computed_bounds());
    }

    #[test]
    fn test_editor_detaches_shared_storage() {
        let original = triangle();
        let mut copy = original.clone();
        assert!(Arc::ptr_eq(&original, &copy));
        {
            let mut ed = PathEditor::new(&mut copy, 1, 1);
            ed.grow_for_verb(Verb::Move, 1.0)[0] = Point::new(50.0, 50.0);
        }
        assert!(!Arc::ptr_eq(&original, &copy));
        assert_eq!(original.count_verbs(), 4);
        assert_eq!(copy.count_verbs(), 5);
        assert_eq!(original.bounds(), Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(copy.bounds(), Rect::new(0.0, 0.0, 50.0, 50.0));
    }

    #[test]
    fn test_editor_reuses_unique_storage() {
        let mut handle = triangle();
        let before = Arc::as_ptr(&handle);
        {
            let mut ed = PathEditor::new(&mut handle, 1, 1);
            ed.grow_for_verb(Verb::Line, 1.0)[0] = Point::new(0.0, 5.0);
        }
        assert_eq!(Arc::as_ptr(&handle), before);
    }

    #[test]
    fn test_gen_id_resets_on_edit_and_is_stable() {
        let mut handle = triangle();
        let id = handle.gen_id();
        assert!(id > EMPTY_GEN_ID);
        assert_eq!(handle.gen_id(), id);
        {
            let mut ed = PathEditor::new(&mut handle, 1, 1);
            ed.grow_for_verb(Verb::Line, 1.0)[0] = Point::new(0.0, 5.0);
        }
        let next = handle.gen_id();
        assert_ne!(next, id);
        assert_eq!(handle.gen_id(), next);
    }

    #[test]
    fn test_segment_mask_and_weights() {
        let mut handle = PathStorage::empty();
        {
            let mut ed = PathEditor::new(&mut handle, 3, 5);
            ed.grow_for_verb(Verb::Move, 1.0);
            ed.grow_for_verb(Verb::Conic, 0.5);
            ed.grow_for_verb(Verb::Cubic, 1.0);
        }
        assert_eq!(handle.segment_mask(), 4 | 8);
        assert_eq!(handle.conic_weights(), &[0.5]);
        assert_eq!(handle.count_points(), 6);
    }

    #[test]
    fn test_repeated_verb() {
        let mut handle = PathStorage::empty();
        {
            let mut ed = PathEditor::new(&mut handle, 4, 4);
            ed.grow_for_verb(Verb::Move, 1.0);
            let (pts, weights) = ed.grow_for_repeated_verb(Verb::Line, 3);
            assert_eq!(pts.len(), 3);
            assert!(weights.is_empty());
            pts[2] = Point::new(1.0, 2.0);
        }
        assert_eq!(handle.count_verbs(), 4);
        assert_eq!(handle.at_point(3), Point::new(1.0, 2.0));
    }

    #[test]
    fn test_non_finite_bounds_are_empty() {
        let mut handle = PathStorage::empty();
        {
            let mut ed = PathEditor::new(&mut handle, 2, 2);
            ed.grow_for_verb(Verb::Move, 1.0)[0] = Point::new(1.0, 1.0);
            ed.grow_for_verb(Verb::Line, 1.0)[0] = Point::new(f32::NAN, 3.0);
        }
        assert!(!handle.is_finite());
        assert_eq!(handle.bounds(), Rect::empty());
    }

    #[test]
    fn test_equality_ignores_gen_id_assignment() {
        let a = triangle();
        let b = triangle();
        assert_eq!(*a, *b);
        let _ = a.gen_id();
        assert_eq!(*a, *b);
    }

    #[test]
    fn test_transform_maps_known_bounds() {
        let mut handle = triangle();
        let _ = handle.bounds();
        PathStorage::transform(&mut handle, &Matrix::new_scaling(2.0, -1.0));
        assert!(handle.has_computed_bounds());
        assert_eq!(handle.bounds(), Rect::new(0.0, -10.0, 20.0, 0.0));
    }

    #[test]
    fn test_rewind_keeps_unique_storage() {
        let mut handle = triangle();
        let before = Arc::as_ptr(&handle);
        PathStorage::rewind(&mut handle);
        assert_eq!(Arc::as_ptr(&handle), before);
        assert_eq!(handle.count_verbs(), 0);
        assert_eq!(handle.gen_id(), EMPTY_GEN_ID);
    }

    #[test]
    fn test_transform_dir_and_start_rotation() {
        // Rotating 90 degrees carries the right-side start onto the bottom.
        let m = Matrix::new_rotation(90.0);
        assert_eq!(transform_dir_and_start(&m, false, false, 1), (false, 2));
    }

    #[test]
    fn test_transform_dir_and_start_mirror() {
        let m = Matrix::new_scaling(-1.0, 1.0);
        assert_eq!(transform_dir_and_start(&m, false, false, 1), (true, 3));
        // Round-rect indices come in pairs per side.
        assert_eq!(transform_dir_and_start(&m, true, false, 2), (true, 7));
    }

    #[test]
    fn test_interpolate() {
        let a = triangle();
        let mut b = triangle();
        PathStorage::transform(&mut b, &Matrix::new_translation(10.0, 0.0));
        assert!(a.is_interpolatable(&b));
        let mid = a.interpolate(&b, 0.5);
        assert_eq!(mid.at_point(0), Point::new(5.0, 0.0));
    }
}
