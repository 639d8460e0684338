pub mod builder;

use std::{path::Path, time::Instant};

use image::{DynamicImage, GrayImage, RgbaImage};
use rayon::prelude::*;
use tracing::{debug, info, trace};
use crate::{
    algorithms::{close_ring, rgba_to_intensity, to_intensity},
    config::DetectorConfig,
    error::Result,
    traits::{
        Binarizer, BoundaryTracer, ComponentExtractor, IntensityPreprocessor, PolygonSimplifier,
        Screening, ShapeClassifier,
    },
    types::{Blob, Boundary, DetectedShape, DetectionResult, Point},
};

/// Shape detection pipeline: intensity preprocessing, binarization,
/// component extraction, then per-blob tracing, simplification and
/// classification.
pub struct Pipeline {
    preprocessors: Vec<Box<dyn IntensityPreprocessor>>,
    binarizer: Box<dyn Binarizer>,
    component_extractor: Box<dyn ComponentExtractor>,
    tracer: Box<dyn BoundaryTracer>,
    simplifier: Box<dyn PolygonSimplifier>,
    classifier: Box<dyn ShapeClassifier>,
    epsilon_fraction: f64,
    parallel: bool,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::PipelineBuilder {
        builder::PipelineBuilder::new()
    }

    /// Build the pipeline described by a loaded config
    pub fn from_config(config: &DetectorConfig) -> Self {
        builder::PipelineBuilder::from_config(config).build()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        preprocessors: Vec<Box<dyn IntensityPreprocessor>>,
        binarizer: Box<dyn Binarizer>,
        component_extractor: Box<dyn ComponentExtractor>,
        tracer: Box<dyn BoundaryTracer>,
        simplifier: Box<dyn PolygonSimplifier>,
        classifier: Box<dyn ShapeClassifier>,
        epsilon_fraction: f64,
        parallel: bool,
    ) -> Self {
        Self {
            preprocessors,
            binarizer,
            component_extractor,
            tracer,
            simplifier,
            classifier,
            epsilon_fraction,
            parallel,
        }
    }

    /// Detect shapes in a row-major interleaved RGBA buffer.
    ///
    /// Fails before any stage runs when `pixels.len() != width * height * 4`.
    /// An image without shapes is a successful, empty result.
    pub fn detect(&self, pixels: &[u8], width: u32, height: u32) -> Result<DetectionResult> {
        let started = Instant::now();
        let intensity = to_intensity(pixels, width, height)?;
        self.run(intensity, started)
    }

    /// Detect shapes in a decoded RGBA image
    pub fn detect_image(&self, image: &RgbaImage) -> Result<DetectionResult> {
        let started = Instant::now();
        self.run(rgba_to_intensity(image), started)
    }

    /// Detect shapes in an image of any pixel format
    pub fn detect_dynamic(&self, image: &DynamicImage) -> Result<DetectionResult> {
        self.detect_image(&image.to_rgba8())
    }

    /// Decode an image file and detect shapes in it
    pub fn detect_file<P: AsRef<Path>>(&self, path: P) -> Result<DetectionResult> {
        let path = path.as_ref();
        let image = image::open(path)?;
        debug!("Decoded {:?} ({}x{})", path, image.width(), image.height());
        self.detect_dynamic(&image)
    }

    /// Decode an in-memory encoded image and detect shapes in it
    pub fn detect_bytes(&self, bytes: &[u8]) -> Result<DetectionResult> {
        let image = image::load_from_memory(bytes)?;
        self.detect_dynamic(&image)
    }

    fn run(&self, intensity: GrayImage, started: Instant) -> Result<DetectionResult> {
        let (image_width, image_height) = intensity.dimensions();

        let mut processed = intensity;
        for preprocessor in &self.preprocessors {
            processed = preprocessor.preprocess(&processed)?;
        }

        let mask = self.binarizer.binarize(&processed)?;
        debug!(
            "Binarized {}x{} image at threshold {} ({} foreground pixels)",
            image_width,
            image_height,
            mask.threshold(),
            mask.foreground_count()
        );

        let blobs = self.component_extractor.extract_components(&mask);
        debug!("Extracted {} components", blobs.len());

        // Blobs are independent once extracted; ordered collect keeps discovery order
        let analyzed: Vec<Option<DetectedShape>> = if self.parallel {
            blobs.par_iter().map(|blob| self.analyze_blob(blob)).collect()
        } else {
            blobs.iter().map(|blob| self.analyze_blob(blob)).collect()
        };
        let shapes: Vec<DetectedShape> = analyzed.into_iter().flatten().collect();

        let processing_time = started.elapsed().as_secs_f64() * 1000.0;
        info!(
            "Detected {} shapes from {} components in {:.2}ms",
            shapes.len(),
            blobs.len(),
            processing_time
        );

        Ok(DetectionResult {
            shapes,
            processing_time,
            image_width,
            image_height,
        })
    }

    /// Trace, simplify and classify one blob; `None` when it is discarded.
    pub fn analyze_blob(&self, blob: &Blob) -> Option<DetectedShape> {
        let boundary = self.tracer.trace(blob);
        let area = blob.area();
        let perimeter = boundary.perimeter();

        let classification = match self.classifier.screen(area, perimeter) {
            Screening::Noise => {
                trace!("Discarding {} pixel blob as noise", blob.len());
                return None;
            }
            Screening::Degenerate => {
                trace!(
                    "Discarding degenerate blob (area {}, perimeter {})",
                    area,
                    perimeter
                );
                return None;
            }
            Screening::Accepted(classification) => classification,
            Screening::Polygonal { compactness } => {
                let vertices = self.outline_vertices(&boundary);
                trace!(
                    "Blob of {} pixels simplified to {} vertices (compactness {:.3})",
                    blob.len(),
                    vertices.len(),
                    compactness
                );
                self.classifier.classify_polygon(compactness, &vertices)?
            }
        };

        Some(DetectedShape {
            kind: classification.kind,
            confidence: classification.confidence,
            bounding_box: blob.bounding_box(),
            center: blob.centroid(),
            area,
        })
    }

    /// Simplified polygon of a traced boundary.
    ///
    /// Closed traces end on the pixel next to their start, so the trailing
    /// vertex is merged into the first; open traces keep every endpoint.
    pub fn outline_vertices(&self, boundary: &Boundary) -> Vec<Point> {
        let epsilon = self.epsilon_fraction * boundary.perimeter();
        let simplified = self.simplifier.simplify(&boundary.points, epsilon);
        if boundary.closed {
            close_ring(simplified, epsilon)
        } else {
            simplified
        }
    }

    /// Get information about the pipeline configuration
    pub fn info(&self) -> String {
        format!(
            "Pipeline: {} preprocessors, epsilon {:.3} of perimeter, {}",
            self.preprocessors.len(),
            self.epsilon_fraction,
            if self.parallel { "parallel" } else { "sequential" }
        )
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::{FixedThresholdBinarizer, FloodFillExtractor, MooreTracer};
    use image::{Rgba, RgbaImage};

    /// Square outline of side 20 as traced: clockwise from the top-left
    /// corner, ending on the pixel below it.
    fn square_trace(closed: bool) -> Boundary {
        let s = 19;
        let mut coords = Vec::new();
        for x in 0..s { coords.push((x, 0)); }
        for y in 0..s { coords.push((s, y)); }
        for x in (1..=s).rev() { coords.push((x, s)); }
        for y in (1..=s).rev() { coords.push((0, y)); }
        Boundary {
            points: coords
                .into_iter()
                .map(|(x, y)| Point { x: x as f64, y: y as f64 })
                .collect(),
            closed,
        }
    }

    #[test]
    fn test_closed_trace_merges_trailing_vertex() {
        let vertices = Pipeline::default().outline_vertices(&square_trace(true));
        assert_eq!(vertices.len(), 4);
        assert_eq!(vertices[0], Point { x: 0.0, y: 0.0 });
    }

    #[test]
    fn test_open_trace_keeps_last_vertex() {
        let vertices = Pipeline::default().outline_vertices(&square_trace(false));
        assert_eq!(vertices.len(), 5);
        assert_eq!(vertices.last(), Some(&Point { x: 0.0, y: 1.0 }));
    }

    #[test]
    fn test_detect_returns_on_unclosable_trace() {
        // Chevron whose Moore trace cycles between (3, 3) and (2, 4)
        let mut image = RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255]));
        for (x, y) in [(2, 2), (3, 3), (2, 4)] {
            image.put_pixel(x, y, Rgba([0, 0, 0, 255]));
        }

        let pipeline = Pipeline::builder().with_fixed_threshold(128).build();
        let mask = FixedThresholdBinarizer::default()
            .binarize(&rgba_to_intensity(&image))
            .unwrap();
        let blobs = FloodFillExtractor.extract_components(&mask);
        assert_eq!(blobs.len(), 1);
        assert!(!MooreTracer::default().trace(&blobs[0]).closed);

        let result = pipeline
            .detect(image.as_raw(), image.width(), image.height())
            .unwrap();
        assert!(result.shapes.is_empty());
    }
}
