use super::{impute_median, parse_count, parse_optional_currency};
use crate::constants::SHELTERS_SOURCE;
use crate::domain::{PostalCode, ShelterRecord};
use crate::error::{PrepError, Result};
use crate::sources::shelters::RawShelterRow;
use tracing::{info, instrument};

/// Missing capacities take the median of the known ones. A non-empty dataset with no
/// known capacity at all is unusable rather than a dataset of empty shelters.
#[instrument(skip(rows), fields(rows = rows.len()))]
pub fn clean_shelters(rows: &[RawShelterRow]) -> Result<Vec<ShelterRecord>> {
    let mut capacities = Vec::with_capacity(rows.len());
    for row in rows {
        let cap = match row.evac_cap.as_deref() {
            Some(raw) => parse_count("EVAC_CAP", raw)?,
            None => None,
        };
        capacities.push(cap.map(|c| c as f64));
    }
    let imputed = capacities.iter().filter(|c| c.is_none()).count();
    if impute_median(&mut capacities).is_none() && !rows.is_empty() {
        return Err(PrepError::source_unavailable(
            SHELTERS_SOURCE,
            "dataset has no evacuation capacities",
        ));
    }

    let mut records = Vec::with_capacity(rows.len());
    for (row, capacity) in rows.iter().zip(capacities.into_iter().flatten()) {
        let latitude = parse_optional_currency("X", row.x.as_deref())?;
        let longitude = parse_optional_currency("Y", row.y.as_deref())?;
        records.push(ShelterRecord {
            postal_code: PostalCode::parse(&row.zip)?,
            name: row.name.as_ref().map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            evacuation_capacity: capacity.round() as u64,
            location: latitude.zip(longitude),
        });
    }
    info!(imputed, "Cleaned {} shelter records", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(zip: &str, cap: Option<&str>, x: Option<&str>, y: Option<&str>) -> RawShelterRow {
        RawShelterRow {
            zip: zip.to_string(),
            evac_cap: cap.map(str::to_string),
            x: x.map(str::to_string),
            y: y.map(str::to_string),
            name: Some(" Recreation Center ".to_string()),
        }
    }

    #[test]
    fn test_capacity_and_location() {
        let rows = vec![
            row("90001", Some("150"), Some("33.97"), Some("-118.25")),
            row("90001", Some("1,250"), None, Some("-118.25")),
            row("90002", None, Some("33.95"), Some("-118.24")),
        ];
        let records = clean_shelters(&rows).unwrap();
        assert_eq!(records[0].evacuation_capacity, 150);
        assert_eq!(records[0].location, Some((33.97, -118.25)));
        assert_eq!(records[0].name.as_deref(), Some("Recreation Center"));
        assert_eq!(records[1].evacuation_capacity, 1_250);
        assert_eq!(records[1].location, None);
        // median of 150 and 1250
        assert_eq!(records[2].evacuation_capacity, 700);
    }

    #[test]
    fn test_no_known_capacity_is_unavailable() {
        let rows = vec![
            row("90001", Some("N/A"), Some("33.97"), Some("-118.25")),
            row("90002", None, None, None),
        ];
        let err = clean_shelters(&rows).unwrap_err();
        assert!(matches!(
            err,
            PrepError::SourceUnavailable { ref source_name, .. } if source_name == SHELTERS_SOURCE
        ));
    }

    #[test]
    fn test_empty_dataset_is_not_an_error() {
        assert!(clean_shelters(&[]).unwrap().is_empty());
    }
}
