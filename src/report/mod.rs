//! Presentation copies of the pipeline results and the HTML report tables.
//!
//! Everything here works on borrowed decision-support data and produces strings,
//! so the joined values survive formatting untouched.

pub mod format;
pub mod tables;

use crate::domain::{FinalRow, IncomeJoinedRow, SeismicEvent};
use crate::engine::merge::FinalTable;

/// Display strings for one row of the full housing/insurance/shelter table.
/// Absent numerics are shown as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct PresentationRow {
    pub postal_code: String,
    pub housing_units: String,
    pub median_home_value: String,
    pub raw_insurance_per_house: String,
    pub coverage_cost_10pct: String,
    pub shelter_capacity: String,
    pub population: String,
    pub shelter_capacity_pct: String,
}

impl PresentationRow {
    pub fn from_final(row: &FinalRow) -> Self {
        let insurance = row.insurance.as_ref();
        let shelter = row.shelter.as_ref();
        Self {
            postal_code: row.postal_code.to_string(),
            housing_units: format::integer(insurance.map_or(0.0, |i| i.housing.housing_units)),
            median_home_value: format::currency_whole(
                insurance.map_or(0.0, |i| i.housing.median_home_value),
            ),
            raw_insurance_per_house: format::currency_cents(
                insurance.map_or(0.0, |i| i.raw_insurance_per_house),
            ),
            coverage_cost_10pct: format::currency_cents(insurance.map_or(0.0, |i| i.coverage_cost_10pct)),
            shelter_capacity: format::integer(
                shelter.and_then(|s| s.shelter_capacity).unwrap_or(0) as f64,
            ),
            population: format::integer(shelter.and_then(|s| s.population).unwrap_or(0) as f64),
            shelter_capacity_pct: format::percentage(row.shelter_capacity_pct()),
        }
    }

    pub fn cells(&self) -> Vec<String> {
        vec![
            self.postal_code.clone(),
            self.housing_units.clone(),
            self.median_home_value.clone(),
            self.raw_insurance_per_house.clone(),
            self.coverage_cost_10pct.clone(),
            self.shelter_capacity.clone(),
            self.population.clone(),
            self.shelter_capacity_pct.clone(),
        ]
    }
}

/// Presentation copy of the final table, most expensive coverage first.
pub fn present_final(table: &FinalTable) -> Vec<PresentationRow> {
    let mut rows: Vec<&FinalRow> = table.rows().iter().collect();
    rows.sort_by(|a, b| {
        let a = a.coverage_cost_10pct().unwrap_or(0.0);
        let b = b.coverage_cost_10pct().unwrap_or(0.0);
        b.total_cmp(&a)
    });
    rows.into_iter().map(PresentationRow::from_final).collect()
}

pub fn bottom_decile_cells(row: &IncomeJoinedRow) -> Vec<String> {
    let insurance = &row.insurance;
    vec![
        insurance.postal_code().to_string(),
        format::integer(insurance.housing.housing_units),
        format::currency_whole(insurance.housing.median_home_value),
        format::currency_whole(row.median_income),
        format::currency_cents(insurance.raw_insurance_per_house),
        format::currency_cents(insurance.coverage_cost_10pct),
    ]
}

pub fn event_cells(event: &SeismicEvent) -> Vec<String> {
    vec![
        event
            .postal_code
            .as_ref()
            .map(|c| c.to_string())
            .unwrap_or_default(),
        format!("{}", event.magnitude),
        event.time.format("%Y-%m-%d %H:%M:%S").to_string(),
        event.place.clone(),
    ]
}
