use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shapes::{DetectionResult, ShapeKind};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("Manifest lists no images")]
    Empty,
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// One labeled image of an evaluation set
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct LabeledImage {
    /// Image path, relative paths resolve against the manifest's directory
    pub path: PathBuf,
    /// Shape the image is expected to contain
    pub expected: ShapeKind,
}

/// Labeled test set for batch evaluation
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct EvaluationManifest {
    pub images: Vec<LabeledImage>,
}

impl EvaluationManifest {
    /// Load a manifest from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ManifestError> {
        let manifest: EvaluationManifest = toml::from_str(content)?;
        manifest.validated()
    }

    /// Load a manifest from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ManifestError> {
        let manifest: EvaluationManifest = serde_json::from_str(content)?;
        manifest.validated()
    }

    /// Auto-detect file format, load, and resolve image paths against the
    /// manifest's directory
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ManifestError> {
        let path_ref = path.as_ref();
        let manifest = match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path_ref)?,
            Some("json") => Self::from_json_file(path_ref)?,
            _ => return Err(ManifestError::UnsupportedFileFormat),
        };
        let base = path_ref.parent().unwrap_or_else(|| Path::new(""));
        Ok(manifest.resolved_against(base))
    }

    pub fn to_toml(&self) -> Result<String, ManifestError> {
        Ok(toml::to_string_pretty(&self)?)
    }

    pub fn to_json(&self) -> Result<String, ManifestError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    fn validated(self) -> Result<Self, ManifestError> {
        if self.images.is_empty() {
            return Err(ManifestError::Empty);
        }
        Ok(self)
    }

    /// Prefix every relative image path with `base`
    pub fn resolved_against(mut self, base: &Path) -> Self {
        for image in &mut self.images {
            if image.path.is_relative() {
                image.path = base.join(&image.path);
            }
        }
        self
    }
}

/// Result of evaluating one labeled image
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Outcome {
    pub path: PathBuf,
    pub expected: ShapeKind,
    /// Highest-confidence detection, if any
    pub detected: Option<ShapeKind>,
    pub confidence: Option<f64>,
    pub correct: bool,
}

impl Outcome {
    /// An image counts as correct when its highest-confidence shape has the expected kind
    pub fn score(image: &LabeledImage, result: &DetectionResult) -> Self {
        let best = result.best();
        let detected = best.map(|s| s.kind);
        Self {
            path: image.path.clone(),
            expected: image.expected,
            detected,
            confidence: best.map(|s| s.confidence),
            correct: detected == Some(image.expected),
        }
    }

    /// Image that failed to decode or process
    pub fn failed(image: &LabeledImage) -> Self {
        Self {
            path: image.path.clone(),
            expected: image.expected,
            detected: None,
            confidence: None,
            correct: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct EvaluationReport {
    pub outcomes: Vec<Outcome>,
}

impl EvaluationReport {
    pub fn record(&mut self, outcome: Outcome) {
        self.outcomes.push(outcome);
    }

    pub fn correct(&self) -> usize {
        self.outcomes.iter().filter(|o| o.correct).count()
    }

    /// Fraction of correct images; 0 for an empty report
    pub fn accuracy(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        self.correct() as f64 / self.outcomes.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapes::{BoundingBox, Center, DetectedShape};

    fn shape(kind: ShapeKind, confidence: f64) -> DetectedShape {
        DetectedShape {
            kind,
            confidence,
            bounding_box: BoundingBox::default(),
            center: Center::default(),
            area: 500.0,
        }
    }

    fn result(shapes: Vec<DetectedShape>) -> DetectionResult {
        DetectionResult {
            shapes,
            processing_time: 1.0,
            image_width: 10,
            image_height: 10,
        }
    }

    #[test]
    fn test_manifest_from_toml() {
        let manifest = EvaluationManifest::from_toml(
            r#"
            [[images]]
            path = "circle.png"
            expected = "circle"

            [[images]]
            path = "/data/star.png"
            expected = "star"
            "#,
        )
        .unwrap();

        assert_eq!(manifest.images.len(), 2);
        assert_eq!(manifest.images[1].expected, ShapeKind::Star);

        let resolved = manifest.resolved_against(Path::new("sets/basic"));
        assert_eq!(resolved.images[0].path, PathBuf::from("sets/basic/circle.png"));
        assert_eq!(resolved.images[1].path, PathBuf::from("/data/star.png"));
    }

    #[test]
    fn test_manifest_from_json() {
        let manifest = EvaluationManifest::from_json(
            r#"{ "images": [{ "path": "a.png", "expected": "pentagon" }] }"#,
        )
        .unwrap();
        assert_eq!(manifest.images[0].expected, ShapeKind::Pentagon);
        assert_eq!(EvaluationManifest::from_json(&manifest.to_json().unwrap()).unwrap(), manifest);
    }

    #[test]
    fn test_manifest_rejects_bad_input() {
        assert!(matches!(
            EvaluationManifest::from_json(r#"{ "images": [] }"#),
            Err(ManifestError::Empty)
        ));
        assert!(EvaluationManifest::from_json(r#"{ "images": [{ "path": "a.png", "expected": "hexagon" }] }"#).is_err());
        assert!(matches!(
            EvaluationManifest::from_file("set.yaml"),
            Err(ManifestError::UnsupportedFileFormat)
        ));
    }

    #[test]
    fn test_scoring_uses_best_shape() {
        let image = LabeledImage { path: "a.png".into(), expected: ShapeKind::Square };

        let hit = Outcome::score(&image, &result(vec![shape(ShapeKind::Circle, 0.7), shape(ShapeKind::Square, 0.9)]));
        assert!(hit.correct);
        assert_eq!(hit.confidence, Some(0.9));

        let miss = Outcome::score(&image, &result(vec![shape(ShapeKind::Rectangle, 0.9), shape(ShapeKind::Square, 0.9)]));
        assert!(!miss.correct);
        assert_eq!(miss.detected, Some(ShapeKind::Rectangle));

        let empty = Outcome::score(&image, &result(vec![]));
        assert!(!empty.correct);
        assert_eq!(empty.detected, None);
    }

    #[test]
    fn test_accuracy() {
        let image = LabeledImage { path: "a.png".into(), expected: ShapeKind::Star };
        let mut report = EvaluationReport::default();
        assert_eq!(report.accuracy(), 0.0);

        report.record(Outcome::score(&image, &result(vec![shape(ShapeKind::Star, 0.85)])));
        report.record(Outcome::failed(&image));
        report.record(Outcome::score(&image, &result(vec![shape(ShapeKind::Star, 0.85)])));
        report.record(Outcome::score(&image, &result(vec![shape(ShapeKind::Circle, 1.0)])));

        assert_eq!(report.correct(), 2);
        assert_eq!(report.accuracy(), 0.5);
    }
}
