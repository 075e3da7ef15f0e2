//! # path-kernel
//!
//! Copy-on-write 2D vector paths with the geometric queries renderers need
//! before they rasterize anything.
//!
//! - Shared, immutable path storage with copy-on-write editing
//! - Lines, quadratic and cubic Béziers, and rational quadratics (conics)
//! - Rectangle, oval and round-rect helpers that remember what they built
//! - Convexity and first-direction analysis with per-path caching
//! - Point containment under all four fill rules
//! - Recognition of rectangles, ovals and round rects
//! - Affine and perspective transforms, interpolation and reversal
//!
//! ## Architecture
//!
//! 1. **Storage**: [`PathStorage`] owns verbs, points and conic weights and
//!    is shared between [`Path`] values through an `Arc`
//! 2. **Editing**: [`PathEditor`] makes storage unique before any write;
//!    [`PathBuilder`] accumulates a path without sharing at all
//! 3. **Queries**: convexity, containment and shape recognition read a
//!    [`Path`] and cache what they can

// Foundation types & math
pub mod basics;
pub mod bounding_rect;
pub mod curves;
pub mod math;
pub mod matrix;
pub mod round_rect;
pub mod shape_points;

// Storage & iteration
pub mod path_iter;
pub mod path_storage;

// Paths
pub mod path;
pub mod path_builder;

// Queries
pub mod contains;
pub mod convexity;
pub mod shape;

pub use basics::{
    AddPathMode, Convexity, FillType, FirstDirection, PathDirection, Point, Rect, Vector, Verb,
};
pub use matrix::Matrix;
pub use path::Path;
pub use path_builder::{IsA, PathBuilder};
pub use path_iter::{Iter, RawIter, Segment};
pub use path_storage::{PathEditor, PathStorage};
pub use round_rect::{Corner, RoundRect, RoundRectType};
pub use shape::{OvalInfo, RRectInfo, RectInfo};
