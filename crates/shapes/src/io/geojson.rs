use std::path::Path;

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use crate::{
    error::Result,
    types::{DetectedShape, DetectionResult, ShapeKind},
};

/// Properties attached to each exported shape feature
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(description = "Properties for detected shape features")]
pub struct ShapeFeatureProperties {
    #[schemars(description = "Index of the shape in discovery order")]
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub confidence: f64,
    #[schemars(description = "Blob pixel count")]
    pub area: f64,
    pub center_x: f64,
    pub center_y: f64,
}

impl ShapeFeatureProperties {
    fn from_shape(id: u32, shape: &DetectedShape) -> Self {
        Self {
            id,
            kind: shape.kind,
            confidence: shape.confidence,
            area: shape.area,
            center_x: shape.center.x,
            center_y: shape.center.y,
        }
    }
}

fn number(value: f64) -> serde_json::Value {
    serde_json::Number::from_f64(value)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

impl DetectionResult {
    /// Export shapes as a FeatureCollection of bounding-box polygons
    pub fn to_geojson(&self) -> Result<FeatureCollection> {
        let mut features = Vec::with_capacity(self.shapes.len());

        for (i, shape) in self.shapes.iter().enumerate() {
            let rect = shape.bounding_box.to_rect().to_polygon();
            let ring = rect
                .exterior()
                .coords()
                .map(|c| vec![c.x, c.y])
                .collect();
            let geometry = Geometry::new(Value::Polygon(vec![ring]));

            let properties = ShapeFeatureProperties::from_shape(i as u32, shape);
            let properties: Option<JsonObject> = serde_json::to_value(properties)?
                .as_object()
                .cloned();

            features.push(Feature {
                bbox: None,
                geometry: Some(geometry),
                id: Some(geojson::feature::Id::Number(serde_json::Number::from(i))),
                properties,
                foreign_members: None,
            });
        }

        // Image metadata rides along as foreign members
        let mut foreign_members = JsonObject::new();
        foreign_members.insert("image_width".to_string(), serde_json::Value::from(self.image_width));
        foreign_members.insert("image_height".to_string(), serde_json::Value::from(self.image_height));
        foreign_members.insert("shape_count".to_string(), serde_json::Value::from(self.shapes.len()));
        foreign_members.insert("processing_time_ms".to_string(), number(self.processing_time));

        Ok(FeatureCollection {
            bbox: None,
            features,
            foreign_members: Some(foreign_members),
        })
    }

    /// Export to GeoJSON and serialize to JSON string
    pub fn to_geojson_string(&self) -> Result<String> {
        let geojson = self.to_geojson()?;
        Ok(serde_json::to_string_pretty(&geojson)?)
    }

    /// Save GeoJSON to file
    pub fn save_geojson<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_geojson_string()?)?;
        Ok(())
    }
}
