use crate::constants::SHELTERS_SOURCE;
use crate::error::Result;
use crate::types::SourceReader;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{info, instrument};

/// One shelter row. In this dataset `X` holds latitude and `Y` longitude.
#[derive(Debug, Clone, Deserialize)]
pub struct RawShelterRow {
    #[serde(rename = "ZIP")]
    pub zip: String,
    #[serde(rename = "EVAC_CAP")]
    pub evac_cap: Option<String>,
    #[serde(rename = "X")]
    pub x: Option<String>,
    #[serde(rename = "Y")]
    pub y: Option<String>,
    #[serde(rename = "NAME")]
    pub name: Option<String>,
}

pub struct SheltersReader {
    path: PathBuf,
}

impl SheltersReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl SourceReader for SheltersReader {
    type Record = RawShelterRow;

    fn source_name(&self) -> &'static str {
        SHELTERS_SOURCE
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn read(&self) -> Result<Vec<RawShelterRow>> {
        let rows: Vec<RawShelterRow> = super::read_csv(SHELTERS_SOURCE, &self.path)?;
        info!("Read {} shelter rows", rows.len());
        Ok(rows)
    }
}
