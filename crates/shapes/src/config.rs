use std::{fs, path::Path};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use crate::{
    algorithms::ClassifierConfig,
    error::{DetectionError, Result},
    pipeline::builder::DEFAULT_EPSILON_FRACTION,
};

/// How the intensity buffer is split into foreground and background
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ThresholdMode {
    /// Otsu's automatic global threshold
    #[default]
    Otsu,
    /// Caller-chosen threshold; foreground is intensity strictly below `value`
    Fixed { value: u8 },
}

/// Detector configuration, loadable from TOML or JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DetectorConfig {
    pub threshold: ThresholdMode,
    /// Gaussian blur applied to the intensity buffer before thresholding
    pub blur_sigma: Option<f32>,
    /// RDP tolerance as a fraction of the traced perimeter
    #[schemars(range(min = 0.0, max = 1.0))]
    pub epsilon_fraction: f64,
    /// Trace and classify blobs on the rayon pool
    pub parallel: bool,
    pub classifier: ClassifierConfig,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold: ThresholdMode::Otsu,
            blur_sigma: None,
            epsilon_fraction: DEFAULT_EPSILON_FRACTION,
            parallel: false,
            classifier: ClassifierConfig::default(),
        }
    }
}

impl DetectorConfig {
    /// JSON schema for config files
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(DetectorConfig)
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load configuration from JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path_ref),
            Some("json") => Self::from_json_file(path_ref),
            other => Err(DetectionError::UnsupportedConfigFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = DetectorConfig::from_toml(
            r#"
            epsilon_fraction = 0.05
            parallel = true

            [threshold]
            mode = "fixed"
            value = 120

            [classifier]
            min_area = 250.0
            "#,
        )
        .unwrap();

        assert_eq!(config.epsilon_fraction, 0.05);
        assert!(config.parallel);
        assert_eq!(config.threshold, ThresholdMode::Fixed { value: 120 });
        assert_eq!(config.classifier.min_area, 250.0);
        assert_eq!(config.classifier.circle_compactness, 0.95);
        assert_eq!(config.blur_sigma, None);
    }

    #[test]
    fn test_round_trips() {
        let mut config = DetectorConfig::default();
        config.blur_sigma = Some(1.5);
        config.threshold = ThresholdMode::Fixed { value: 90 };

        let from_toml = DetectorConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(from_toml, config);
        let from_json = DetectorConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(from_json, config);
    }

    #[test]
    fn test_empty_documents_are_defaults() {
        assert_eq!(DetectorConfig::from_toml("").unwrap(), DetectorConfig::default());
        assert_eq!(DetectorConfig::from_json("{}").unwrap(), DetectorConfig::default());
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        match DetectorConfig::from_file("detector.yaml") {
            Err(DetectionError::UnsupportedConfigFormat(ext)) => assert_eq!(ext, "yaml"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
