use crate::constants::BOUNDARIES_SOURCE;
use crate::domain::{PostalCode, ZipBoundary};
use crate::error::{PrepError, Result};
use crate::types::SourceReader;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

/// Reads zip-code boundary polygons from a GeoJSON FeatureCollection file.
pub struct BoundaryReader {
    path: PathBuf,
    key_property: String,
}

impl BoundaryReader {
    pub fn new(path: impl Into<PathBuf>, key_property: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key_property: key_property.into(),
        }
    }
}

#[async_trait::async_trait]
impl SourceReader for BoundaryReader {
    type Record = ZipBoundary;

    fn source_name(&self) -> &'static str {
        BOUNDARIES_SOURCE
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn read(&self) -> Result<Vec<ZipBoundary>> {
        let body = super::read_text_file(BOUNDARIES_SOURCE, &self.path)?;
        let boundaries = parse_boundaries(&body, &self.key_property)?;
        info!("Read {} zip boundaries", boundaries.len());
        Ok(boundaries)
    }
}

pub fn parse_boundaries(body: &str, key_property: &str) -> Result<Vec<ZipBoundary>> {
    let data: Value = serde_json::from_str(body)?;
    let features = data["features"].as_array().ok_or_else(|| {
        PrepError::source_unavailable(BOUNDARIES_SOURCE, "file is not a FeatureCollection")
    })?;

    let mut out = Vec::with_capacity(features.len());
    for (i, feature) in features.iter().enumerate() {
        let key = match &feature["properties"][key_property] {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => {
                warn!("Boundary feature {} has no '{}' property, skipping", i, key_property);
                continue;
            }
        };
        match PostalCode::parse(&key) {
            Ok(postal_code) => out.push(ZipBoundary {
                postal_code,
                feature: feature.clone(),
            }),
            Err(e) => warn!("Boundary feature {} skipped: {}", i, e),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reads_key_property() {
        let body = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"name": "90001", "external_id": "90001"},
                 "geometry": {"type": "Polygon", "coordinates": [[[-118.2, 33.9], [-118.3, 33.9], [-118.3, 34.0], [-118.2, 33.9]]]}},
                {"type": "Feature", "properties": {"name": 2134},
                 "geometry": null},
                {"type": "Feature", "properties": {"label": "x"}, "geometry": null}
            ]
        })
        .to_string();

        let boundaries = parse_boundaries(&body, "name").unwrap();
        assert_eq!(boundaries.len(), 2);
        assert_eq!(boundaries[0].postal_code.as_str(), "90001");
        assert_eq!(boundaries[0].feature["properties"]["external_id"], "90001");
        assert_eq!(boundaries[1].postal_code.as_str(), "02134");
    }

    #[test]
    fn test_not_a_feature_collection() {
        let err = parse_boundaries("[1, 2, 3]", "name").unwrap_err();
        assert!(matches!(err, PrepError::SourceUnavailable { .. }));
    }
}
