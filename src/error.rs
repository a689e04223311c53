use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrepError {
    #[error("Source '{source_name}' unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    #[error("Failed to parse {field}: '{value}'")]
    Parse { field: String, value: String },

    #[error("Zip code not found: {0}")]
    LookupNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Template rendering failed: {0}")]
    Template(#[from] askama::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PrepError {
    pub fn source_unavailable(source_name: impl Into<String>, reason: impl ToString) -> Self {
        PrepError::SourceUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn parse(field: impl Into<String>, value: impl Into<String>) -> Self {
        PrepError::Parse {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Errors the interactive session reports and then keeps going after.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PrepError::LookupNotFound(_) | PrepError::InvalidInput(_))
    }
}

pub type Result<T> = std::result::Result<T, PrepError>;
