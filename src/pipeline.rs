use crate::clean::{
    housing::clean_housing, income::clean_income, population::clean_population, shelters::clean_shelters,
};
use crate::config::Config;
use crate::domain::{PopulationRecord, PostalCode, SeismicEvent, ShelterAggregate, ShelterRecord, ZipBoundary};
use crate::engine::boundaries::{filter_boundaries, write_feature_collection};
use crate::engine::housing::{derive_insurance, InsuranceModel};
use crate::engine::income::{bottom_decile, BottomDecile};
use crate::engine::merge::{merge_final, FinalTable};
use crate::engine::shelter::aggregate_shelters;
use crate::error::Result;
use crate::infra::http_client::HttpFetcher;
use crate::map::{write_map, MapInputs};
use crate::report::format::currency_cents;
use crate::report::tables::ReportTableTemplate;
use crate::sources::{
    boundaries::BoundaryReader,
    housing::{HousingReader, RawHousingRow},
    income::{IncomeReader, RawIncomeRow},
    population::{PopulationReader, RawPopulationRow},
    seismic::SeismicReader,
    shelters::{RawShelterRow, SheltersReader},
};
use crate::types::SourceReader;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, instrument};

/// Every dataset as read, before cleaning
#[derive(Debug, Clone, Default)]
pub struct SourceData {
    pub events: Vec<SeismicEvent>,
    pub housing: Vec<RawHousingRow>,
    pub income: Vec<RawIncomeRow>,
    pub shelters: Vec<RawShelterRow>,
    pub population: Vec<RawPopulationRow>,
    pub boundaries: Vec<ZipBoundary>,
}

/// Result of a complete pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub events: Vec<SeismicEvent>,
    pub shelters: Vec<ShelterRecord>,
    pub model: InsuranceModel,
    pub bottom_decile: BottomDecile,
    pub shelter_aggregate: Vec<ShelterAggregate>,
    pub final_table: FinalTable,
    pub boundaries: Vec<ZipBoundary>,
    /// City name per postal code, from every population row regardless of county
    pub cities: HashMap<PostalCode, String>,
}

impl PipelineOutput {
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            median_insurance_cost: self.model.median_insurance_cost,
            median_home_value: self.model.dataset_median_home_value,
            cost_per_dollar: self.model.cost_per_dollar(),
            income_threshold: self.bottom_decile.threshold,
            bottom_decile_rows: self.bottom_decile.rows.len(),
            bottom_decile_total: self.bottom_decile.total_coverage_cost(),
            final_rows: self.final_table.len(),
            events: self.events.len(),
        }
    }
}

/// Headline numbers printed after a run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub median_insurance_cost: f64,
    pub median_home_value: f64,
    pub cost_per_dollar: f64,
    pub income_threshold: f64,
    pub bottom_decile_rows: usize,
    pub bottom_decile_total: f64,
    pub final_rows: usize,
    pub events: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Median cost of earthquake insurance: {}", currency_cents(self.median_insurance_cost))?;
        writeln!(f, "Median home value in the dataset: {}", currency_cents(self.median_home_value))?;
        writeln!(f, "Cost of insuring one dollar of home value: {:.5}", self.cost_per_dollar)?;
        writeln!(f, "Lowest-decile median income threshold: {}", currency_cents(self.income_threshold))?;
        writeln!(
            f,
            "Cost of insuring 10% of the houses in the {} lowest-income zip codes: {}",
            self.bottom_decile_rows,
            currency_cents(self.bottom_decile_total)
        )?;
        write!(f, "Zip codes in the final table: {} (past earthquakes: {})", self.final_rows, self.events)
    }
}

pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    async fn read_source<S: SourceReader>(reader: &S) -> Result<Vec<S::Record>> {
        let started = Instant::now();
        let records = reader.read().await?;
        info!(
            source = reader.source_name(),
            records = records.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Source read"
        );
        Ok(records)
    }

    /// Read every source in turn. The first unavailable source aborts the run.
    #[instrument(skip(self))]
    pub async fn read_sources(&self) -> Result<SourceData> {
        let fetcher = HttpFetcher::new(&self.config.http)?;
        let sources = &self.config.sources;

        let seismic = SeismicReader::new(fetcher.clone(), self.config.seismic.clone())?;
        let income = IncomeReader::new(fetcher, sources.income_url.clone(), sources.income_path.clone());

        Ok(SourceData {
            events: Self::read_source(&seismic).await?,
            housing: Self::read_source(&HousingReader::new(&sources.housing_path)).await?,
            income: Self::read_source(&income).await?,
            shelters: Self::read_source(&SheltersReader::new(&sources.shelters_path)).await?,
            population: Self::read_source(&PopulationReader::new(&sources.population_path)).await?,
            boundaries: Self::read_source(&BoundaryReader::new(
                &sources.boundaries_path,
                sources.boundary_key_property.clone(),
            ))
            .await?,
        })
    }

    /// Clean, derive and join. Pure over its input.
    #[instrument(skip(self, data))]
    pub fn process(&self, data: SourceData) -> Result<PipelineOutput> {
        let housing = clean_housing(&data.housing)?;
        let income = clean_income(&data.income)?;
        let shelters = clean_shelters(&data.shelters)?;
        let population = clean_population(&data.population)?;

        let model = InsuranceModel {
            median_insurance_cost: self.config.insurance.median_insurance_cost,
            dataset_median_home_value: housing.median_home_value,
            coverage_share: self.config.insurance.coverage_share,
        };
        let insured = derive_insurance(&housing.records, &model);
        let bottom_decile = bottom_decile(&insured, &income, self.config.insurance.income_quantile)?;
        let shelter_aggregate = aggregate_shelters(&shelters, &population, &self.config.sources.county);
        let final_table = merge_final(&insured, &shelter_aggregate);
        let boundaries = filter_boundaries(&data.boundaries, &shelter_aggregate);

        info!(
            final_rows = final_table.len(),
            bottom_decile = bottom_decile.rows.len(),
            boundaries = boundaries.len(),
            "Pipeline stages complete"
        );

        Ok(PipelineOutput {
            events: data.events,
            shelters,
            model,
            bottom_decile,
            shelter_aggregate,
            final_table,
            boundaries,
            cities: city_index(&population),
        })
    }

    pub async fn run(&self) -> Result<PipelineOutput> {
        let started = Instant::now();
        let data = self.read_sources().await?;
        let output = self.process(data)?;
        info!(elapsed_ms = started.elapsed().as_millis() as u64, "Pipeline finished");
        Ok(output)
    }

    /// Documents written by `write_outputs`, in the order they are shown to the user
    pub fn documents(&self) -> Vec<PathBuf> {
        let out = &self.config.output;
        vec![
            out.map_path(),
            out.events_path(),
            out.housing_path(),
            out.bottom_decile_path(),
            out.boundaries_path(),
        ]
    }

    #[instrument(skip(self, output))]
    pub fn write_outputs(&self, output: &PipelineOutput) -> Result<Vec<PathBuf>> {
        let out = &self.config.output;
        let inputs = MapInputs {
            boundaries: &output.boundaries,
            shelter_aggregate: &output.shelter_aggregate,
            final_table: &output.final_table,
            events: &output.events,
            shelters: &output.shelters,
        };
        write_map(&out.map_path(), &self.config.map, &inputs)?;
        ReportTableTemplate::past_events(&output.events).write_to(&out.events_path())?;
        ReportTableTemplate::housing(&output.final_table).write_to(&out.housing_path())?;
        ReportTableTemplate::bottom_decile(&output.bottom_decile).write_to(&out.bottom_decile_path())?;
        write_feature_collection(&out.boundaries_path(), &output.boundaries)?;
        Ok(self.documents())
    }
}

fn city_index(population: &[PopulationRecord]) -> HashMap<PostalCode, String> {
    let mut cities = HashMap::new();
    for record in population {
        if let Some(city) = &record.city {
            cities.entry(record.postal_code.clone()).or_insert_with(|| city.clone());
        }
    }
    cities
}

#[cfg(test)]
mod tests {
    use super::*;

    fn housing_row(zip: &str, units: &str, value: &str) -> RawHousingRow {
        RawHousingRow {
            zip_code: zip.to_string(),
            housing_units: Some(units.to_string()),
            median_home_value: Some(value.to_string()),
        }
    }

    fn income_row(zip: &str, income: &str) -> RawIncomeRow {
        RawIncomeRow {
            zip_code: zip.to_string(),
            community: None,
            median_income: income.to_string(),
        }
    }

    fn population_row(zip: &str, county: &str, pop: &str, city: &str) -> RawPopulationRow {
        RawPopulationRow {
            zip: zip.to_string(),
            county: Some(county.to_string()),
            pop: Some(pop.to_string()),
            city: Some(city.to_string()),
        }
    }

    fn sample() -> SourceData {
        SourceData {
            housing: vec![
                housing_row("90001", "1,000", "$500,000"),
                housing_row("90002", "2,000", "$250,000"),
                housing_row("90003", "500", "$750,000"),
            ],
            income: vec![
                income_row("90001", "$30,000"),
                income_row("90002", "$60,000"),
                income_row("90003", "$90,000"),
            ],
            shelters: vec![RawShelterRow {
                zip: "90001".to_string(),
                evac_cap: Some("100".to_string()),
                x: Some("34.0".to_string()),
                y: Some("-118.2".to_string()),
                name: Some("Gym".to_string()),
            }],
            population: vec![
                population_row("90001", "Los Angeles", "10,000", "Los Angeles"),
                population_row("90004", "Los Angeles", "5,000", "Los Angeles"),
                population_row("92101", "San Diego", "7,000", "San Diego"),
            ],
            ..SourceData::default()
        }
    }

    #[test]
    fn test_process_joins_all_stages() {
        let output = Pipeline::new(Config::default()).process(sample()).unwrap();

        assert_eq!(output.model.dataset_median_home_value, 500_000.0);
        // housing codes plus the population-only code, other counties excluded
        assert_eq!(output.final_table.len(), 4);
        let row = output.final_table.get(&PostalCode::parse("90001").unwrap()).unwrap();
        assert_eq!(row.coverage_cost_10pct(), Some(117_700.0));
        assert_eq!(row.shelter_capacity_pct().and_then(|p| p.known()), Some(1.0));
        assert!(output
            .final_table
            .get(&PostalCode::parse("92101").unwrap())
            .is_none());
        assert_eq!(
            output.cities.get(&PostalCode::parse("92101").unwrap()).map(String::as_str),
            Some("San Diego")
        );
    }

    #[test]
    fn test_summary_formatting() {
        let output = Pipeline::new(Config::default()).process(sample()).unwrap();
        let text = output.summary().to_string();
        assert!(text.contains("Median cost of earthquake insurance: $1,177.00"));
        assert!(text.contains("Median home value in the dataset: $500,000.00"));
        assert!(text.contains("Cost of insuring one dollar of home value: 0.00235"));
    }

    #[test]
    fn test_documents_follow_output_config() {
        let mut config = Config::default();
        config.output.dir = PathBuf::from("target/out");
        let docs = Pipeline::new(config).documents();
        assert_eq!(docs.len(), 5);
        assert!(docs.iter().all(|d| d.starts_with("target/out")));
    }
}
