//! # Shape Detection Library
//!
//! Finds simple geometric shapes (circle, triangle, rectangle, square,
//! pentagon, star) in raster images and reports a label, confidence,
//! bounding box, centroid and pixel area for each.
//!
//! Every stage sits behind a trait so it can be swapped:
//!
//! - **Binarization**: Otsu's global threshold (dark foreground on light background)
//! - **Components**: 8-connected breadth-first flood fill
//! - **Boundaries**: Moore-neighbor tracing
//! - **Simplification**: Ramer-Douglas-Peucker with a perimeter-relative tolerance
//! - **Classification**: compactness and vertex-count rules
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shapes::Pipeline;
//!
//! let pipeline = Pipeline::default();
//! let result = pipeline.detect_file("shapes.png")?;
//!
//! for shape in &result.shapes {
//!     println!("{} ({:.2})", shape.kind, shape.confidence);
//! }
//!
//! result.save_geojson("shapes.geojson")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Custom Pipeline
//!
//! ```rust,no_run
//! use shapes::{Pipeline, algorithms::*};
//!
//! let pipeline = Pipeline::builder()
//!     .with_gaussian_blur(1.0)
//!     .with_fixed_threshold(120)
//!     .with_epsilon_fraction(0.03)
//!     .with_parallel(true)
//!     .build();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod types;
pub mod traits;
pub mod algorithms;
pub mod config;
pub mod pipeline;
pub mod io;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::{DetectionError, Result};
pub use types::{BoundingBox, Center, DetectedShape, DetectionResult, ShapeKind};
pub use traits::*;
pub use algorithms::*;
pub use config::{DetectorConfig, ThresholdMode};
pub use pipeline::{Pipeline, builder::PipelineBuilder};
pub use io::*;
