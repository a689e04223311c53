use crate::domain::{HousingInsurance, HousingRecord};
use tracing::{debug, instrument};

/// Prices insurance per house relative to the dataset's median home value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsuranceModel {
    /// Published regional median annual premium
    pub median_insurance_cost: f64,
    pub dataset_median_home_value: f64,
    pub coverage_share: f64,
}

impl InsuranceModel {
    /// Cost of insuring one dollar of home value
    pub fn cost_per_dollar(&self) -> f64 {
        self.median_insurance_cost / self.dataset_median_home_value
    }

    pub fn price(&self, record: &HousingRecord) -> HousingInsurance {
        let raw_insurance_per_house = record.median_home_value * self.cost_per_dollar();
        let coverage_cost_10pct = raw_insurance_per_house * record.housing_units * self.coverage_share;
        HousingInsurance {
            housing: record.clone(),
            raw_insurance_per_house,
            coverage_cost_10pct,
        }
    }
}

#[instrument(skip(records), fields(records = records.len()))]
pub fn derive_insurance(records: &[HousingRecord], model: &InsuranceModel) -> Vec<HousingInsurance> {
    debug!(cost_per_dollar = model.cost_per_dollar(), "Deriving insurance costs");
    records.iter().map(|r| model.price(r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PostalCode;

    fn model(median_home_value: f64) -> InsuranceModel {
        InsuranceModel {
            median_insurance_cost: 1177.0,
            dataset_median_home_value: median_home_value,
            coverage_share: 0.10,
        }
    }

    fn house(units: f64, value: f64) -> HousingRecord {
        HousingRecord {
            postal_code: PostalCode::parse("90001").unwrap(),
            housing_units: units,
            median_home_value: value,
            home_value_imputed: false,
        }
    }

    #[test]
    fn test_median_house_pays_median_premium() {
        let priced = model(500_000.0).price(&house(1000.0, 500_000.0));
        assert!((priced.raw_insurance_per_house - 1177.0).abs() < 1e-9);
        assert!((priced.coverage_cost_10pct - 117_700.0).abs() < 1e-6);
    }

    #[test]
    fn test_premium_scales_with_home_value() {
        let m = model(500_000.0);
        let priced = derive_insurance(&[house(10.0, 1_000_000.0), house(10.0, 250_000.0)], &m);
        assert!((priced[0].raw_insurance_per_house - 2354.0).abs() < 1e-9);
        assert!((priced[1].raw_insurance_per_house - 588.5).abs() < 1e-9);
        assert!((priced[1].coverage_cost_10pct - 588.5).abs() < 1e-9);
        assert_eq!(priced[0].housing.housing_units, 10.0);
    }
}
