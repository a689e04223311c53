use crate::constants::HOUSING_SOURCE;
use crate::error::Result;
use crate::types::SourceReader;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{info, instrument};

/// One row of the housing CSV, still in its textual form
#[derive(Debug, Clone, Deserialize)]
pub struct RawHousingRow {
    #[serde(rename = "ZIP CODE")]
    pub zip_code: String,
    #[serde(rename = "HOUSING UNITS")]
    pub housing_units: Option<String>,
    #[serde(rename = "MEDIAN HOME VALUE")]
    pub median_home_value: Option<String>,
}

pub struct HousingReader {
    path: PathBuf,
}

impl HousingReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl SourceReader for HousingReader {
    type Record = RawHousingRow;

    fn source_name(&self) -> &'static str {
        HOUSING_SOURCE
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn read(&self) -> Result<Vec<RawHousingRow>> {
        let rows: Vec<RawHousingRow> = super::read_csv(HOUSING_SOURCE, &self.path)?;
        info!("Read {} housing rows", rows.len());
        Ok(rows)
    }
}
