use crate::constants::POPULATION_SOURCE;
use crate::error::Result;
use crate::types::SourceReader;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{info, instrument};

#[derive(Debug, Clone, Deserialize)]
pub struct RawPopulationRow {
    #[serde(rename = "ZIP")]
    pub zip: String,
    #[serde(rename = "COUNTY")]
    pub county: Option<String>,
    #[serde(rename = "POP")]
    pub pop: Option<String>,
    #[serde(rename = "CITY")]
    pub city: Option<String>,
}

pub struct PopulationReader {
    path: PathBuf,
}

impl PopulationReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl SourceReader for PopulationReader {
    type Record = RawPopulationRow;

    fn source_name(&self) -> &'static str {
        POPULATION_SOURCE
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn read(&self) -> Result<Vec<RawPopulationRow>> {
        let rows: Vec<RawPopulationRow> = super::read_csv(POPULATION_SOURCE, &self.path)?;
        info!("Read {} population rows", rows.len());
        Ok(rows)
    }
}
