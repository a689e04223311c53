use crate::domain::{FinalRow, HousingInsurance, PostalCode, ShelterAggregate};
use std::collections::BTreeMap;
use tracing::{info, instrument, warn};

/// Decision-support table: the outer join of housing and shelter data, sorted by postal code.
///
/// Absent values stay absent here; only the presentation copy fills them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinalTable {
    rows: Vec<FinalRow>,
}

impl FinalTable {
    pub fn rows(&self) -> &[FinalRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, postal_code: &PostalCode) -> Option<&FinalRow> {
        self.rows
            .binary_search_by(|row| row.postal_code.cmp(postal_code))
            .ok()
            .map(|i| &self.rows[i])
    }
}

#[instrument(skip(insured, shelters), fields(housing = insured.len(), shelters = shelters.len()))]
pub fn merge_final(insured: &[HousingInsurance], shelters: &[ShelterAggregate]) -> FinalTable {
    let mut merged: BTreeMap<PostalCode, FinalRow> = BTreeMap::new();

    for house in insured {
        let code = house.postal_code();
        if merged.contains_key(code) {
            warn!("Duplicate housing row for {}, keeping the first", code);
            continue;
        }
        merged.insert(
            code.clone(),
            FinalRow {
                postal_code: code.clone(),
                insurance: Some(house.clone()),
                shelter: None,
            },
        );
    }

    for aggregate in shelters {
        merged
            .entry(aggregate.postal_code.clone())
            .or_insert_with(|| FinalRow {
                postal_code: aggregate.postal_code.clone(),
                insurance: None,
                shelter: None,
            })
            .shelter = Some(aggregate.clone());
    }

    let rows: Vec<FinalRow> = merged.into_values().collect();
    let both = rows
        .iter()
        .filter(|r| r.insurance.is_some() && r.shelter.is_some())
        .count();
    info!(rows = rows.len(), matched = both, "Merged housing and shelter data");
    FinalTable { rows }
}
