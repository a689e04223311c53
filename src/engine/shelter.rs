use super::round2;
use crate::domain::{Percentage, PopulationRecord, PostalCode, ShelterAggregate, ShelterRecord};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, instrument, warn};

/// Sum shelter capacity by postal code and outer-join it with the county's population.
///
/// The percentage is only computed when both sides are present and the population
/// is non-zero; otherwise it stays `None`. It is never reported as zero.
#[instrument(skip(shelters, population), fields(shelters = shelters.len(), population = population.len()))]
pub fn aggregate_shelters(
    shelters: &[ShelterRecord],
    population: &[PopulationRecord],
    county: &str,
) -> Vec<ShelterAggregate> {
    let mut capacity: BTreeMap<&PostalCode, u64> = BTreeMap::new();
    for shelter in shelters {
        *capacity.entry(&shelter.postal_code).or_insert(0) += shelter.evacuation_capacity;
    }

    let mut people: BTreeMap<&PostalCode, Option<u64>> = BTreeMap::new();
    for record in population.iter().filter(|r| r.county == county) {
        if people.contains_key(&record.postal_code) {
            warn!("Duplicate population row for {}, keeping the first", record.postal_code);
            continue;
        }
        people.insert(&record.postal_code, record.population);
    }

    let codes: BTreeSet<&PostalCode> = capacity.keys().chain(people.keys()).copied().collect();
    let rows: Vec<ShelterAggregate> = codes
        .into_iter()
        .map(|code| {
            let shelter_capacity = capacity.get(code).copied();
            let population = people.get(code).copied().flatten();
            ShelterAggregate {
                postal_code: code.clone(),
                shelter_capacity,
                population,
                shelter_capacity_pct: capacity_percentage(shelter_capacity, population),
            }
        })
        .collect();

    info!(
        shelter_codes = capacity.len(),
        county_codes = people.len(),
        rows = rows.len(),
        "Aggregated shelter capacity for {}",
        county
    );
    rows
}

pub fn capacity_percentage(capacity: Option<u64>, population: Option<u64>) -> Option<Percentage> {
    match (capacity, population) {
        (Some(cap), Some(pop)) if pop != 0 => {
            Some(Percentage::from_ratio(round2(100.0 * cap as f64 / pop as f64)))
        }
        _ => None,
    }
}
