use crate::domain::{PostalCode, ShelterAggregate, ZipBoundary};
use crate::error::Result;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{info, instrument};

/// Keep the boundaries whose postal code appears in the shelter/population aggregate.
#[instrument(skip(boundaries, shelters), fields(boundaries = boundaries.len()))]
pub fn filter_boundaries(boundaries: &[ZipBoundary], shelters: &[ShelterAggregate]) -> Vec<ZipBoundary> {
    let wanted: HashSet<&PostalCode> = shelters.iter().map(|s| &s.postal_code).collect();
    let kept: Vec<ZipBoundary> = boundaries
        .iter()
        .filter(|b| wanted.contains(&b.postal_code))
        .cloned()
        .collect();
    info!(kept = kept.len(), "Filtered zip boundaries");
    kept
}

pub fn feature_collection(boundaries: &[ZipBoundary]) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": boundaries.iter().map(|b| b.feature.clone()).collect::<Vec<_>>(),
    })
}

/// Pretty JSON with sorted keys and four-space indentation.
pub fn to_pretty_json(value: &Value) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn write_feature_collection(path: &Path, boundaries: &[ZipBoundary]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, to_pretty_json(&feature_collection(boundaries))?)?;
    info!("Wrote {} boundaries to {}", boundaries.len(), path.display());
    Ok(())
}
