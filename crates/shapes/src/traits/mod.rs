use image::GrayImage;
use crate::{
    error::Result,
    types::{BinaryMask, Blob, Boundary, Point, ShapeKind},
};

/// Trait for intensity-domain preprocessing run before binarization
pub trait IntensityPreprocessor: Send + Sync {
    /// Transform the intensity buffer (e.g., blur)
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage>;
}

/// Trait for turning an intensity buffer into a foreground mask
pub trait Binarizer: Send + Sync {
    fn binarize(&self, image: &GrayImage) -> Result<BinaryMask>;
}

/// Trait for connected-component extraction
pub trait ComponentExtractor: Send + Sync {
    /// Partition the mask's foreground into blobs, ordered by their first
    /// pixel in row-major order.
    fn extract_components(&self, mask: &BinaryMask) -> Vec<Blob>;
}

/// Trait for outer-boundary tracing
pub trait BoundaryTracer: Send + Sync {
    fn trace(&self, blob: &Blob) -> Boundary;
}

/// Trait for polyline simplification
pub trait PolygonSimplifier: Send + Sync {
    /// Return a subsequence of `points` that keeps the first and last point.
    fn simplify(&self, points: &[Point], epsilon: f64) -> Vec<Point>;
}

/// Label with its confidence in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub kind: ShapeKind,
    pub confidence: f64,
}

/// Outcome of screening a blob on area and compactness alone
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Screening {
    /// Too few pixels to trust
    Noise,
    /// Thin or degenerate trace
    Degenerate,
    /// Accepted without looking at vertices
    Accepted(Classification),
    /// Needs the simplified outline to decide
    Polygonal { compactness: f64 },
}

/// Trait for shape classification
///
/// Split in two so the caller only pays for simplification when the
/// screening step asks for vertices.
pub trait ShapeClassifier: Send + Sync {
    fn screen(&self, area: f64, perimeter: f64) -> Screening;

    /// `vertices` is the simplified, closed outline (no repeated closing point).
    fn classify_polygon(&self, compactness: f64, vertices: &[Point]) -> Option<Classification>;
}
