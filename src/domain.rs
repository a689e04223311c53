//! Record shapes shared by the readers, cleaners, engine and presentation layers.

use crate::constants::POSTAL_CODE_WIDTH;
use crate::error::{PrepError, Result};
use chrono::{DateTime, Utc};
use std::fmt;

/// Fixed-width postal code. Compared as an opaque string so leading zeros survive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PostalCode(String);

impl PostalCode {
    /// Normalize a raw postal code cell.
    ///
    /// Accepts `"90001"`, `" 90001 "`, `"90001.0"`, `"90001-1234"` and short all-digit
    /// values such as `"2134"` (padded to `"02134"`).
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let mut code = trimmed;
        if let Some(stripped) = code.strip_suffix(".0") {
            code = stripped;
        }
        if let Some((head, tail)) = code.split_once('-') {
            if tail.len() == 4 && tail.chars().all(|c| c.is_ascii_digit()) {
                code = head;
            }
        }
        if code.is_empty()
            || code.len() > POSTAL_CODE_WIDTH
            || !code.chars().all(|c| c.is_ascii_digit())
        {
            return Err(PrepError::parse("postal code", raw));
        }
        Ok(PostalCode(format!("{:0>width$}", code, width = POSTAL_CODE_WIDTH)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct SeismicEvent {
    pub id: String,
    pub magnitude: f64,
    pub time: DateTime<Utc>,
    pub place: String,
    pub latitude: f64,
    pub longitude: f64,
    pub postal_code: Option<PostalCode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HousingRecord {
    pub postal_code: PostalCode,
    pub housing_units: f64,
    pub median_home_value: f64,
    pub home_value_imputed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IncomeRecord {
    pub postal_code: PostalCode,
    pub community: Option<String>,
    pub median_income: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShelterRecord {
    pub postal_code: PostalCode,
    pub name: Option<String>,
    pub evacuation_capacity: u64,
    /// `(latitude, longitude)`
    pub location: Option<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopulationRecord {
    pub postal_code: PostalCode,
    pub county: String,
    pub city: Option<String>,
    pub population: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ZipBoundary {
    pub postal_code: PostalCode,
    pub feature: serde_json::Value,
}

/// A computed percentage, or an explicit marker for a non-representable result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Percentage {
    Known(f64),
    Unknown,
}

impl Percentage {
    pub fn from_ratio(value: f64) -> Self {
        if value.is_finite() {
            Percentage::Known(value)
        } else {
            Percentage::Unknown
        }
    }

    pub fn known(&self) -> Option<f64> {
        match self {
            Percentage::Known(v) => Some(*v),
            Percentage::Unknown => None,
        }
    }
}

/// Housing record with the insurance-cost fields appended.
#[derive(Debug, Clone, PartialEq)]
pub struct HousingInsurance {
    pub housing: HousingRecord,
    pub raw_insurance_per_house: f64,
    pub coverage_cost_10pct: f64,
}

impl HousingInsurance {
    pub fn postal_code(&self) -> &PostalCode {
        &self.housing.postal_code
    }
}

/// One postal code of the shelter/population outer join.
#[derive(Debug, Clone, PartialEq)]
pub struct ShelterAggregate {
    pub postal_code: PostalCode,
    pub shelter_capacity: Option<u64>,
    pub population: Option<u64>,
    pub shelter_capacity_pct: Option<Percentage>,
}

/// Housing joined with income, one row of the bottom-decile subset.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomeJoinedRow {
    pub insurance: HousingInsurance,
    pub median_income: f64,
}

/// Decision-support row of the final merge. Either side may be absent.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalRow {
    pub postal_code: PostalCode,
    pub insurance: Option<HousingInsurance>,
    pub shelter: Option<ShelterAggregate>,
}

impl FinalRow {
    pub fn coverage_cost_10pct(&self) -> Option<f64> {
        self.insurance.as_ref().map(|i| i.coverage_cost_10pct)
    }

    pub fn shelter_capacity_pct(&self) -> Option<Percentage> {
        self.shelter.as_ref().and_then(|s| s.shelter_capacity_pct)
    }
}
