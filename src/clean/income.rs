use super::parse_currency;
use crate::constants::COL_MEDIAN_INCOME;
use crate::domain::{IncomeRecord, PostalCode};
use crate::error::Result;
use crate::sources::income::RawIncomeRow;
use tracing::{info, instrument, warn};

/// Rows whose income cell holds no number (footnote markers, "n/a") are dropped.
#[instrument(skip(rows), fields(rows = rows.len()))]
pub fn clean_income(rows: &[RawIncomeRow]) -> Result<Vec<IncomeRecord>> {
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let postal_code = PostalCode::parse(&row.zip_code)?;
        match parse_currency(COL_MEDIAN_INCOME, &row.median_income)? {
            Some(median_income) => records.push(IncomeRecord {
                postal_code,
                community: row.community.clone(),
                median_income,
            }),
            None => warn!(
                "Dropping income row for {} ({}): no numeric income '{}'",
                postal_code,
                row.community.as_deref().unwrap_or("unknown community"),
                row.median_income
            ),
        }
    }
    info!("Cleaned {} income records", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrepError;

    fn row(zip: &str, income: &str) -> RawIncomeRow {
        RawIncomeRow {
            zip_code: zip.to_string(),
            community: Some("Somewhere".to_string()),
            median_income: income.to_string(),
        }
    }

    #[test]
    fn test_non_numeric_rows_dropped() {
        let rows = vec![row("90002", "$37,146"), row("91210", "n/a")];
        let records = clean_income(&rows).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].median_income, 37_146.0);
    }

    #[test]
    fn test_malformed_income_is_fatal() {
        let err = clean_income(&[row("90002", "$37.146.00")]).unwrap_err();
        assert!(matches!(err, PrepError::Parse { .. }));
    }
}
