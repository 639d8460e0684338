use std::f64::consts::PI;

use geo::EuclideanDistance;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use crate::{
    traits::{Classification, Screening, ShapeClassifier},
    types::{Point, ShapeKind},
};

const CIRCLE_MAX_CONFIDENCE: f64 = 1.0;
const STAR_CONFIDENCE: f64 = 0.85;
const PENTAGON_CONFIDENCE: f64 = 0.85;
const TRIANGLE_CONFIDENCE: f64 = 0.85;
/// A square whose simplified outline lost a corner
const TRIANGULAR_SQUARE_CONFIDENCE: f64 = 0.7;
const QUADRILATERAL_CONFIDENCE: f64 = 0.9;
const FALLBACK_CONFIDENCE: f64 = 0.65;

/// Isoperimetric ratio `4π·area / perimeter²`; 0 for a non-positive perimeter.
pub fn compactness(area: f64, perimeter: f64) -> f64 {
    if perimeter <= 0.0 {
        return 0.0;
    }
    4.0 * PI * area / (perimeter * perimeter)
}

/// Lengths of the closed polygon's edges, last vertex back to the first included.
pub fn side_lengths(vertices: &[Point]) -> Vec<f64> {
    let n = vertices.len();
    (0..n)
        .map(|i| {
            let a = geo_types::Point::from(vertices[i]);
            let b = geo_types::Point::from(vertices[(i + 1) % n]);
            a.euclidean_distance(&b)
        })
        .collect()
}

/// Decision thresholds of [`RuleBasedClassifier`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Blobs with fewer pixels are noise
    pub min_area: f64,
    /// Below this compactness a blob is a line artifact
    pub min_compactness: f64,
    /// Above this compactness a blob is a circle
    pub circle_compactness: f64,
    /// A 3-vertex outline this compact is read as a square
    pub triangle_square_compactness: f64,
    /// Quadrilaterals with `max side / min side` below this are squares
    pub square_side_ratio: f64,
    /// Any-other-vertex-count band for squares
    pub fallback_square_compactness: f64,
    /// Any-other-vertex-count band for rectangles
    pub fallback_rectangle_compactness: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_area: 100.0,
            min_compactness: 0.2,
            circle_compactness: 0.95,
            triangle_square_compactness: 0.75,
            square_side_ratio: 1.2,
            fallback_square_compactness: 0.76,
            fallback_rectangle_compactness: 0.5,
        }
    }
}

/// Compactness and vertex-count heuristics.
///
/// Rules run in a fixed order and the first match wins:
/// noise, degenerate, circle, then by simplified vertex count
/// (10 star, 5 pentagon, 3 triangle or square, 4 square or rectangle),
/// and finally compactness bands for every other count.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedClassifier {
    pub config: ClassifierConfig,
}

impl RuleBasedClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    fn quadrilateral(&self, vertices: &[Point]) -> Classification {
        let sides = side_lengths(vertices);
        let max = sides.iter().copied().fold(f64::MIN, f64::max);
        let min = sides.iter().copied().fold(f64::MAX, f64::min);

        let kind = if min > 0.0 && max / min < self.config.square_side_ratio {
            ShapeKind::Square
        } else {
            ShapeKind::Rectangle
        };
        Classification { kind, confidence: QUADRILATERAL_CONFIDENCE }
    }
}

impl ShapeClassifier for RuleBasedClassifier {
    fn screen(&self, area: f64, perimeter: f64) -> Screening {
        let config = &self.config;
        if area < config.min_area {
            return Screening::Noise;
        }

        let compactness = compactness(area, perimeter);
        if compactness < config.min_compactness {
            return Screening::Degenerate;
        }
        if compactness > config.circle_compactness {
            return Screening::Accepted(Classification {
                kind: ShapeKind::Circle,
                confidence: compactness.min(CIRCLE_MAX_CONFIDENCE),
            });
        }

        Screening::Polygonal { compactness }
    }

    fn classify_polygon(&self, compactness: f64, vertices: &[Point]) -> Option<Classification> {
        let config = &self.config;
        let labeled = |kind, confidence| Some(Classification { kind, confidence });

        match vertices.len() {
            10 => labeled(ShapeKind::Star, STAR_CONFIDENCE),
            5 => labeled(ShapeKind::Pentagon, PENTAGON_CONFIDENCE),
            3 if compactness > config.triangle_square_compactness => {
                labeled(ShapeKind::Square, TRIANGULAR_SQUARE_CONFIDENCE)
            }
            3 => labeled(ShapeKind::Triangle, TRIANGLE_CONFIDENCE),
            4 => Some(self.quadrilateral(vertices)),
            _ if compactness > config.fallback_square_compactness => {
                labeled(ShapeKind::Square, FALLBACK_CONFIDENCE)
            }
            _ if compactness > config.fallback_rectangle_compactness => {
                labeled(ShapeKind::Rectangle, FALLBACK_CONFIDENCE)
            }
            _ => None,
        }
    }
}
