use crate::clean::quantile;
use crate::constants::INCOME_SOURCE;
use crate::domain::{HousingInsurance, IncomeJoinedRow, IncomeRecord, PostalCode};
use crate::error::{PrepError, Result};
use std::collections::HashMap;
use tracing::{info, instrument};

/// Housing rows in the lowest income band.
#[derive(Debug, Clone, PartialEq)]
pub struct BottomDecile {
    /// Income quantile computed over the income dataset alone
    pub threshold: f64,
    /// Sorted by ascending income
    pub rows: Vec<IncomeJoinedRow>,
}

impl BottomDecile {
    pub fn total_coverage_cost(&self) -> f64 {
        self.rows.iter().map(|r| r.insurance.coverage_cost_10pct).sum()
    }
}

/// Inner-join housing and income, keep rows whose income is strictly below the
/// `q` quantile of all incomes.
#[instrument(skip(insured, income), fields(housing = insured.len(), income = income.len()))]
pub fn bottom_decile(insured: &[HousingInsurance], income: &[IncomeRecord], q: f64) -> Result<BottomDecile> {
    let incomes: Vec<f64> = income.iter().map(|r| r.median_income).collect();
    let threshold = quantile(&incomes, q)
        .ok_or_else(|| PrepError::source_unavailable(INCOME_SOURCE, "no income records to rank"))?;

    let mut by_code: HashMap<&PostalCode, Vec<&IncomeRecord>> = HashMap::new();
    for record in income {
        by_code.entry(&record.postal_code).or_default().push(record);
    }

    let mut joined: Vec<IncomeJoinedRow> = insured
        .iter()
        .flat_map(|house| {
            by_code
                .get(house.postal_code())
                .into_iter()
                .flatten()
                .map(move |inc| IncomeJoinedRow {
                    insurance: house.clone(),
                    median_income: inc.median_income,
                })
        })
        .collect();
    let joined_count = joined.len();

    joined.sort_by(|a, b| a.median_income.total_cmp(&b.median_income));
    joined.retain(|row| row.median_income < threshold);

    info!(
        threshold,
        joined = joined_count,
        kept = joined.len(),
        "Selected bottom income rows"
    );
    Ok(BottomDecile {
        threshold,
        rows: joined,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HousingRecord;

    fn insured(zip: &str, coverage: f64) -> HousingInsurance {
        HousingInsurance {
            housing: HousingRecord {
                postal_code: PostalCode::parse(zip).unwrap(),
                housing_units: 100.0,
                median_home_value: 400_000.0,
                home_value_imputed: false,
            },
            raw_insurance_per_house: 900.0,
            coverage_cost_10pct: coverage,
        }
    }

    fn income(zip: &str, value: f64) -> IncomeRecord {
        IncomeRecord {
            postal_code: PostalCode::parse(zip).unwrap(),
            community: None,
            median_income: value,
        }
    }

    fn income_dataset() -> Vec<IncomeRecord> {
        // 11 incomes: 10th percentile lands exactly on the second value, 20,000
        (0..11)
            .map(|i| income(&format!("{:05}", 90001 + i), 10_000.0 * (i + 1) as f64))
            .collect()
    }

    #[test]
    fn test_threshold_from_income_only_and_strictly_below() {
        let housing = vec![insured("90003", 3.0), insured("90001", 1.0), insured("90002", 2.0)];
        let result = bottom_decile(&housing, &income_dataset(), 0.10).unwrap();
        assert_eq!(result.threshold, 20_000.0);
        // 90002 has income 20,000 which is not strictly below
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].insurance.postal_code().as_str(), "90001");
        assert_eq!(result.total_coverage_cost(), 1.0);
    }

    #[test]
    fn test_unmatched_rows_dropped_without_padding() {
        // low earners 90001 has no housing row; nothing is padded in
        let housing = vec![insured("90005", 5.0), insured("99999", 9.0)];
        let result = bottom_decile(&housing, &income_dataset(), 0.10).unwrap();
        assert!(result.rows.is_empty());
        assert_eq!(result.total_coverage_cost(), 0.0);
    }

    #[test]
    fn test_never_more_rows_than_below_threshold() {
        let incomes = income_dataset();
        let housing: Vec<HousingInsurance> = incomes
            .iter()
            .map(|r| insured(r.postal_code.as_str(), 1.0))
            .collect();
        let result = bottom_decile(&housing, &incomes, 0.10).unwrap();
        let below = incomes.iter().filter(|r| r.median_income < result.threshold).count();
        assert!(result.rows.len() <= below);
        assert!(result.rows.windows(2).all(|w| w[0].median_income <= w[1].median_income));
    }

    #[test]
    fn test_empty_income_is_error() {
        let err = bottom_decile(&[insured("90001", 1.0)], &[], 0.10).unwrap_err();
        assert!(matches!(err, PrepError::SourceUnavailable { .. }));
    }
}
