use crate::constants;
use crate::error::{PrepError, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const MAX_HTTP_RETRIES: u32 = 10;

/// Run configuration. Every section falls back to the Los Angeles County defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub seismic: SeismicConfig,
    pub sources: SourcesConfig,
    pub insurance: InsuranceConfig,
    pub http: HttpConfig,
    pub map: MapConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SeismicConfig {
    pub endpoint: String,
    /// Read a saved GeoJSON response instead of querying the endpoint
    pub path: Option<PathBuf>,
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
    /// `YYYY-MM-DD`
    pub start_time: String,
    pub min_magnitude: f64,
    /// Postal codes assigned to events in response order
    pub postal_codes: Vec<String>,
}

impl Default for SeismicConfig {
    fn default() -> Self {
        Self {
            endpoint: constants::DEFAULT_SEISMIC_ENDPOINT.to_string(),
            path: None,
            min_latitude: 33.5,
            max_latitude: 35.1,
            min_longitude: -119.0,
            max_longitude: -117.5,
            start_time: "1970-01-01".to_string(),
            min_magnitude: 5.0,
            postal_codes: constants::DEFAULT_EVENT_POSTAL_CODES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl SeismicConfig {
    pub fn start_date(&self) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(&self.start_time, "%Y-%m-%d").map_err(|e| {
            PrepError::Config(format!("seismic.start_time '{}': {}", self.start_time, e))
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub housing_path: PathBuf,
    pub shelters_path: PathBuf,
    pub population_path: PathBuf,
    pub boundaries_path: PathBuf,
    pub income_url: String,
    /// Read a saved copy of the income page instead of fetching `income_url`
    pub income_path: Option<PathBuf>,
    /// Population rows are restricted to this county
    pub county: String,
    /// Feature property that holds the postal code in the boundary file
    pub boundary_key_property: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            housing_path: PathBuf::from("data/LA_housing_data.csv"),
            shelters_path: PathBuf::from("data/LA_shelters_data.csv"),
            population_path: PathBuf::from("data/LA_population_data.csv"),
            boundaries_path: PathBuf::from("data/la-zip-code-areas-2012.geojson"),
            income_url: constants::DEFAULT_INCOME_URL.to_string(),
            income_path: None,
            county: constants::DEFAULT_COUNTY.to_string(),
            boundary_key_property: "name".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InsuranceConfig {
    pub median_insurance_cost: f64,
    pub coverage_share: f64,
    pub income_quantile: f64,
}

impl Default for InsuranceConfig {
    fn default() -> Self {
        Self {
            median_insurance_cost: constants::MEDIAN_INSURANCE_COST,
            coverage_share: constants::COVERAGE_SHARE,
            income_quantile: constants::INCOME_QUANTILE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub backoff_ms: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            max_retries: 2,
            backoff_ms: 500,
            user_agent: format!("quake_prep/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub center_latitude: f64,
    pub center_longitude: f64,
    pub zoom: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center_latitude: 34.0522,
            center_longitude: -118.2437,
            zoom: 11,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub map_file: String,
    pub events_file: String,
    pub housing_file: String,
    pub bottom_decile_file: String,
    pub boundaries_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            map_file: "earthquake_shelter_map.html".to_string(),
            events_file: "past_earthquakes.html".to_string(),
            housing_file: "housing_insurance_cost.html".to_string(),
            bottom_decile_file: "housing_insurance_cost_bottom_10.html".to_string(),
            boundaries_file: "county-zipcode-areas.json".to_string(),
        }
    }
}

impl OutputConfig {
    pub fn map_path(&self) -> PathBuf {
        self.dir.join(&self.map_file)
    }

    pub fn events_path(&self) -> PathBuf {
        self.dir.join(&self.events_file)
    }

    pub fn housing_path(&self) -> PathBuf {
        self.dir.join(&self.housing_file)
    }

    pub fn bottom_decile_path(&self) -> PathBuf {
        self.dir.join(&self.bottom_decile_file)
    }

    pub fn boundaries_path(&self) -> PathBuf {
        self.dir.join(&self.boundaries_file)
    }
}

impl Config {
    /// Load configuration from an explicit path, `QUAKE_PREP_CONFIG`, or `quake_prep.toml`.
    ///
    /// Only the implicit default path may be missing; defaults are used in that case.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let (config_path, required) = match explicit {
            Some(p) => (p.to_path_buf(), true),
            None => match std::env::var(constants::CONFIG_PATH_ENV) {
                Ok(p) if !p.trim().is_empty() => (PathBuf::from(p), true),
                _ => (PathBuf::from(constants::DEFAULT_CONFIG_PATH), false),
            },
        };

        if !required && !config_path.exists() {
            info!("No config file at {}, using defaults", config_path.display());
            let config = Config::default();
            config.validate()?;
            return Ok(config);
        }

        let config_content = fs::read_to_string(&config_path).map_err(|e| {
            PrepError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        info!("Loaded config from {}", config_path.display());
        Self::from_toml_str(&config_content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.seismic.start_date()?;
        if self.seismic.min_latitude >= self.seismic.max_latitude
            || self.seismic.min_longitude >= self.seismic.max_longitude
        {
            return Err(PrepError::Config("seismic bounding box is empty".into()));
        }
        if self.insurance.median_insurance_cost <= 0.0 {
            return Err(PrepError::Config(
                "insurance.median_insurance_cost must be positive".into(),
            ));
        }
        if !(self.insurance.coverage_share > 0.0 && self.insurance.coverage_share <= 1.0) {
            return Err(PrepError::Config(
                "insurance.coverage_share must be in (0, 1]".into(),
            ));
        }
        if !(self.insurance.income_quantile > 0.0 && self.insurance.income_quantile < 1.0) {
            return Err(PrepError::Config(
                "insurance.income_quantile must be in (0, 1)".into(),
            ));
        }
        if self.http.max_retries > MAX_HTTP_RETRIES {
            return Err(PrepError::Config(format!(
                "http.max_retries must be at most {}",
                MAX_HTTP_RETRIES
            )));
        }
        Ok(())
    }
}
