//! Readers for every raw dataset. Each implements [`SourceReader`](crate::types::SourceReader).

pub mod boundaries;
pub mod housing;
pub mod income;
pub mod population;
pub mod seismic;
pub mod shelters;

use crate::error::{PrepError, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Read a local text file, mapping any failure to `SourceUnavailable`.
pub(crate) fn read_text_file(source_name: &str, path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| PrepError::source_unavailable(source_name, format!("{}: {}", path.display(), e)))
}

/// Read a headed CSV file into `T`, matching columns by upper-cased header name.
pub(crate) fn read_csv<T: DeserializeOwned>(source_name: &str, path: &Path) -> Result<Vec<T>> {
    let file = File::open(path)
        .map_err(|e| PrepError::source_unavailable(source_name, format!("{}: {}", path.display(), e)))?;
    let rows = read_csv_from(source_name, file)?;
    debug!(source = source_name, rows = rows.len(), "read {}", path.display());
    Ok(rows)
}

pub(crate) fn read_csv_from<T: DeserializeOwned, R: Read>(source_name: &str, input: R) -> Result<Vec<T>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(input);

    let headers: StringRecord = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_uppercase())
        .collect();
    reader.set_headers(headers.clone());

    let mut rows = Vec::new();
    for (line_num, result) in reader.records().enumerate() {
        let record = result?;
        // +2 because: 1-indexed + header row
        let row = record.deserialize(Some(&headers)).map_err(|e| {
            PrepError::parse(format!("{} line {}", source_name, line_num + 2), e.to_string())
        })?;
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Row {
        #[serde(rename = "ZIP")]
        zip: String,
        #[serde(rename = "POP")]
        pop: Option<String>,
    }

    #[test]
    fn test_headers_matched_case_insensitively() {
        let data = "zip,Pop,extra\n90001,\"57,110\",x\n90002,,y\n";
        let rows: Vec<Row> = read_csv_from("test", data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].zip, "90001");
        assert_eq!(rows[0].pop.as_deref(), Some("57,110"));
        assert_eq!(rows[1].pop, None);
    }

    #[test]
    fn test_missing_file_is_source_unavailable() {
        let err = read_csv::<Row>("population", Path::new("/nonexistent/pop.csv")).unwrap_err();
        assert!(matches!(err, PrepError::SourceUnavailable { .. }));
    }
}
