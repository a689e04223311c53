use super::{impute_median, parse_optional_currency};
use crate::constants::{COL_HOUSING_UNITS, COL_MEDIAN_HOME_VALUE, HOUSING_SOURCE};
use crate::domain::{HousingRecord, PostalCode};
use crate::error::{PrepError, Result};
use crate::sources::housing::RawHousingRow;
use std::collections::HashSet;
use tracing::{info, instrument, warn};

/// Cleaned housing dataset plus the median used for imputation and insurance pricing
#[derive(Debug, Clone)]
pub struct CleanHousing {
    pub records: Vec<HousingRecord>,
    /// Median of the home values present before imputation
    pub median_home_value: f64,
}

#[instrument(skip(rows), fields(rows = rows.len()))]
pub fn clean_housing(rows: &[RawHousingRow]) -> Result<CleanHousing> {
    let mut codes = Vec::with_capacity(rows.len());
    let mut units = Vec::with_capacity(rows.len());
    let mut values = Vec::with_capacity(rows.len());

    let mut seen = HashSet::new();
    for row in rows {
        let code = PostalCode::parse(&row.zip_code)?;
        if !seen.insert(code.clone()) {
            warn!("Duplicate housing row for {}, keeping the first", code);
            continue;
        }
        codes.push(code);
        units.push(parse_optional_currency(COL_HOUSING_UNITS, row.housing_units.as_deref())?);
        values.push(parse_optional_currency(COL_MEDIAN_HOME_VALUE, row.median_home_value.as_deref())?);
    }

    let missing_values: Vec<bool> = values.iter().map(Option::is_none).collect();
    let imputed_values = missing_values.iter().filter(|m| **m).count();
    let imputed_units = units.iter().filter(|u| u.is_none()).count();

    let median_home_value = impute_median(&mut values).ok_or_else(|| {
        PrepError::source_unavailable(HOUSING_SOURCE, "dataset has no median home values")
    })?;
    impute_median(&mut units).ok_or_else(|| {
        PrepError::source_unavailable(HOUSING_SOURCE, "dataset has no housing unit counts")
    })?;

    info!(
        median_home_value,
        imputed_values, imputed_units, "Cleaned {} housing records", codes.len()
    );

    let records = codes
        .into_iter()
        .zip(units)
        .zip(values)
        .zip(missing_values)
        .map(|(((postal_code, units), value), imputed)| HousingRecord {
            postal_code,
            housing_units: units.unwrap_or_default(),
            median_home_value: value.unwrap_or_default(),
            home_value_imputed: imputed,
        })
        .collect();

    Ok(CleanHousing {
        records,
        median_home_value,
    })
}
