/// Source names used in logs and `SourceUnavailable` errors
pub const SEISMIC_SOURCE: &str = "seismic";
pub const HOUSING_SOURCE: &str = "housing";
pub const INCOME_SOURCE: &str = "income";
pub const SHELTERS_SOURCE: &str = "shelters";
pub const POPULATION_SOURCE: &str = "population";
pub const BOUNDARIES_SOURCE: &str = "boundaries";

/// Width of a normalized postal code
pub const POSTAL_CODE_WIDTH: usize = 5;

// Published regional median annual premium (Statista)
pub const MEDIAN_INSURANCE_COST: f64 = 1177.0;
pub const COVERAGE_SHARE: f64 = 0.10;
pub const INCOME_QUANTILE: f64 = 0.10;

pub const DEFAULT_CONFIG_PATH: &str = "quake_prep.toml";
pub const CONFIG_PATH_ENV: &str = "QUAKE_PREP_CONFIG";

pub const DEFAULT_SEISMIC_ENDPOINT: &str = "https://earthquake.usgs.gov/fdsnws/event/1/query";
pub const DEFAULT_INCOME_URL: &str = "http://www.laalmanac.com/employment/em12c.php";
pub const DEFAULT_COUNTY: &str = "Los Angeles";

/// Postal codes assigned, in response order, to the default seismic query's events
pub const DEFAULT_EVENT_POSTAL_CODES: [&str; 25] = [
    "92821", "91709", "91381", "91383", "91343", "91326", "91381", "93040", "93063", "93063",
    "91381", "91344", "91335", "91011", "91711", "91106", "93203", "91776", "91770", "90292",
    "91351", "91351", "91351", "91351", "92358",
];

// Column headers shared by the report tables and the lookup output
pub const COL_ZIP_CODE: &str = "Zip Code";
pub const COL_HOUSING_UNITS: &str = "Housing Units";
pub const COL_MEDIAN_HOME_VALUE: &str = "Median Home Value";
pub const COL_RAW_INSURANCE: &str = "Raw cost of Insurance per House";
pub const COL_COVERAGE_COST: &str = "Cost of insuring 10% of the houses in the ZIP Code";
pub const COL_SHELTER_CAPACITY: &str = "Shelter Capacity";
pub const COL_POPULATION: &str = "Population";
pub const COL_SHELTER_PCT: &str = "Shelter Capacity Percentage";
pub const COL_MEDIAN_INCOME: &str = "Estimated Median Income";
pub const COL_MAGNITUDE: &str = "Magnitude";
pub const COL_DATETIME: &str = "Datetime";
pub const COL_PLACE: &str = "Place";
