use super::{bottom_decile_cells, event_cells, present_final};
use crate::constants::*;
use crate::domain::SeismicEvent;
use crate::engine::income::BottomDecile;
use crate::engine::merge::FinalTable;
use crate::error::Result;
use askama::Template;
use std::fs;
use std::path::Path;
use tracing::info;

/// Styled HTML table document
#[derive(Template)]
#[template(path = "report_table.html")]
pub struct ReportTableTemplate {
    pub title: String,
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl ReportTableTemplate {
    pub fn past_events(events: &[SeismicEvent]) -> Self {
        Self {
            title: "Past earthquakes".to_string(),
            headers: vec![COL_ZIP_CODE, COL_MAGNITUDE, COL_DATETIME, COL_PLACE],
            rows: events.iter().map(event_cells).collect(),
        }
    }

    pub fn housing(table: &FinalTable) -> Self {
        Self {
            title: "Housing insurance cost and shelter capacity".to_string(),
            headers: vec![
                COL_ZIP_CODE,
                COL_HOUSING_UNITS,
                COL_MEDIAN_HOME_VALUE,
                COL_RAW_INSURANCE,
                COL_COVERAGE_COST,
                COL_SHELTER_CAPACITY,
                COL_POPULATION,
                COL_SHELTER_PCT,
            ],
            rows: present_final(table).iter().map(|r| r.cells()).collect(),
        }
    }

    pub fn bottom_decile(bottom: &BottomDecile) -> Self {
        Self {
            title: "Housing insurance cost for the lowest median income zip codes".to_string(),
            headers: vec![
                COL_ZIP_CODE,
                COL_HOUSING_UNITS,
                COL_MEDIAN_HOME_VALUE,
                COL_MEDIAN_INCOME,
                COL_RAW_INSURANCE,
                COL_COVERAGE_COST,
            ],
            rows: bottom.rows.iter().map(bottom_decile_cells).collect(),
        }
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.render()?)?;
        info!(rows = self.rows.len(), "Wrote {}", path.display());
        Ok(())
    }
}
