mod geojson;

pub use self::geojson::ShapeFeatureProperties;
