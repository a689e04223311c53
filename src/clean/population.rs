use super::parse_count;
use crate::domain::{PopulationRecord, PostalCode};
use crate::error::Result;
use crate::sources::population::RawPopulationRow;
use tracing::{info, instrument};

/// Missing populations stay absent; the shelter step decides what that means.
#[instrument(skip(rows), fields(rows = rows.len()))]
pub fn clean_population(rows: &[RawPopulationRow]) -> Result<Vec<PopulationRecord>> {
    let records = rows
        .iter()
        .map(|row| {
            Ok(PopulationRecord {
                postal_code: PostalCode::parse(&row.zip)?,
                county: row.county.as_deref().unwrap_or_default().trim().to_string(),
                city: row
                    .city
                    .as_deref()
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string),
                population: match row.pop.as_deref() {
                    Some(raw) => parse_count("POP", raw)?,
                    None => None,
                },
            })
        })
        .collect::<Result<Vec<_>>>()?;
    info!("Cleaned {} population records", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_population_fields() {
        let rows = vec![
            RawPopulationRow {
                zip: "90001".to_string(),
                county: Some(" Los Angeles ".to_string()),
                pop: Some("57,110".to_string()),
                city: Some("Los Angeles".to_string()),
            },
            RawPopulationRow {
                zip: "92618".to_string(),
                county: Some("Orange".to_string()),
                pop: None,
                city: Some("  ".to_string()),
            },
        ];
        let records = clean_population(&rows).unwrap();
        assert_eq!(records[0].county, "Los Angeles");
        assert_eq!(records[0].population, Some(57_110));
        assert_eq!(records[1].population, None);
        assert_eq!(records[1].city, None);
    }
}
