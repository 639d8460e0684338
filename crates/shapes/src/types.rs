use std::collections::HashSet;

use geo_types::Coord;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};

/// Real-valued (x, y) coordinate. Pixel coordinates are integer-valued points.
pub type Point = Coord<f64>;

/// Binary foreground/background grid, stored flat and indexed by `y * width + x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    width: u32,
    height: u32,
    data: Vec<u8>,
    threshold: u8,
}

impl BinaryMask {
    /// Build a mask by evaluating `is_foreground` for every pixel.
    pub fn from_fn<F>(width: u32, height: u32, threshold: u8, mut is_foreground: F) -> Self
    where
        F: FnMut(u32, u32) -> bool,
    {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(u8::from(is_foreground(x, y)));
            }
        }
        Self {
            width,
            height,
            data,
            threshold,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Threshold the mask was produced with (0 for hand-built masks)
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Raw `{0, 1}` values in row-major order
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Bounds-checked foreground test; anything outside the grid is background.
    pub fn is_foreground(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        self.data[y as usize * self.width as usize + x as usize] == 1
    }

    pub fn foreground_count(&self) -> usize {
        self.data.iter().filter(|&&v| v == 1).count()
    }
}

/// A maximal 8-connected set of foreground pixels.
///
/// Pixels are kept in discovery order; membership queries go through a set of
/// packed `y * width + x` indices so the boundary tracer never has to scan.
#[derive(Debug, Clone)]
pub struct Blob {
    width: u32,
    height: u32,
    pixels: Vec<(u32, u32)>,
    members: HashSet<u32>,
}

impl Blob {
    /// `width`/`height` are the dimensions of the image the pixels belong to.
    pub fn new(width: u32, height: u32, pixels: Vec<(u32, u32)>) -> Self {
        let members = pixels.iter().map(|&(x, y)| y * width + x).collect();
        Self {
            width,
            height,
            pixels,
            members,
        }
    }

    pub fn pixels(&self) -> &[(u32, u32)] {
        &self.pixels
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Pixel count as a real-valued area
    pub fn area(&self) -> f64 {
        self.pixels.len() as f64
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        self.members.contains(&(y as u32 * self.width + x as u32))
    }

    /// Topmost member, leftmost among ties.
    pub fn start_pixel(&self) -> Option<(u32, u32)> {
        self.pixels.iter().copied().min_by_key(|&(x, y)| (y, x))
    }

    /// Inclusive pixel extent of the blob
    pub fn bounding_box(&self) -> BoundingBox {
        let mut min_x = u32::MAX;
        let mut min_y = u32::MAX;
        let mut max_x = 0;
        let mut max_y = 0;

        for &(x, y) in &self.pixels {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }

        if self.pixels.is_empty() {
            return BoundingBox::default();
        }

        BoundingBox {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        }
    }

    /// Mean pixel coordinate
    pub fn centroid(&self) -> Center {
        if self.pixels.is_empty() {
            return Center::default();
        }
        let (sum_x, sum_y) = self
            .pixels
            .iter()
            .fold((0.0, 0.0), |(sx, sy), &(x, y)| (sx + x as f64, sy + y as f64));
        let n = self.pixels.len() as f64;
        Center {
            x: sum_x / n,
            y: sum_y / n,
        }
    }
}

/// Ordered outer boundary of a blob.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    pub points: Vec<Point>,
    /// False when tracing stopped before returning to the start pixel
    pub closed: bool,
}

impl Boundary {
    /// Digital perimeter: one unit per traced boundary pixel.
    ///
    /// The classifier's compactness bands are calibrated against this step
    /// count rather than the Euclidean length of the pixel chain.
    pub fn perimeter(&self) -> f64 {
        self.points.len() as f64
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ShapeKind {
    Circle,
    Triangle,
    Rectangle,
    Square,
    Pentagon,
    Star,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Pixel-edge rectangle covering the box, for geometric export
    pub fn to_rect(&self) -> geo_types::Rect<f64> {
        geo_types::Rect::new(
            Coord {
                x: self.x as f64,
                y: self.y as f64,
            },
            Coord {
                x: (self.x + self.width) as f64,
                y: (self.y + self.height) as f64,
            },
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Center {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetectedShape {
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    /// In `[0, 1]`
    pub confidence: f64,
    pub bounding_box: BoundingBox,
    pub center: Center,
    /// Blob pixel count
    pub area: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    /// Shapes in blob discovery order
    pub shapes: Vec<DetectedShape>,
    /// Wall-clock milliseconds spent in the detect call
    pub processing_time: f64,
    pub image_width: u32,
    pub image_height: u32,
}

impl DetectionResult {
    /// JSON schema of the serialized result
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(DetectionResult)
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Highest-confidence shape; earliest discovered wins ties.
    pub fn best(&self) -> Option<&DetectedShape> {
        self.shapes.iter().fold(None, |best: Option<&DetectedShape>, shape| match best {
            Some(b) if b.confidence >= shape.confidence => Some(b),
            _ => Some(shape),
        })
    }

    pub fn count(&self, kind: ShapeKind) -> usize {
        self.shapes.iter().filter(|s| s.kind == kind).count()
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
