//! Join/derive engine: keys every cleaned dataset on postal code and computes
//! the insurance and shelter metrics.
//!
//! Steps must run in order: housing derivation, income filter, shelter
//! aggregation, final merge. Joins are exact string matches on [`PostalCode`];
//! a code seen on one side of an outer join only has `None` on the other side.
//!
//! [`PostalCode`]: crate::domain::PostalCode

pub mod boundaries;
pub mod housing;
pub mod income;
pub mod merge;
pub mod shelter;

/// Round to two decimals, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
