//! Per-dataset normalization: numeric coercion, currency stripping, median imputation.
//!
//! Cleaners turn the string rows produced by `sources` into typed domain records.
//! Missing numerics are imputed with the field median of the present values,
//! never zero and never the mean.

pub mod housing;
pub mod income;
pub mod population;
pub mod shelters;

use crate::error::{PrepError, Result};

/// Parse a currency or plain numeric cell (`"$1,234.50"`, `"1234.5"`, `" 1,200 "`).
///
/// Cells without any digit (`""`, `"N/A"`, `"-"`) are missing and yield `None`.
/// Anything else that fails to parse is a `ParseError` naming the field and value.
pub fn parse_currency(field: &str, raw: &str) -> Result<Option<f64>> {
    let trimmed = raw.trim();
    if !trimmed.chars().any(|c| c.is_ascii_digit()) {
        return Ok(None);
    }

    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };
    let unsigned = rest.strip_prefix('$').unwrap_or(rest);
    let digits: String = unsigned.chars().filter(|c| *c != ',').collect();

    let value: f64 = digits
        .trim()
        .parse()
        .map_err(|_| PrepError::parse(field, raw))?;
    if !value.is_finite() {
        return Err(PrepError::parse(field, raw));
    }
    Ok(Some(if negative { -value } else { value }))
}

/// Parse a non-negative whole count (`"1,200"`, `"1200.0"`).
pub fn parse_count(field: &str, raw: &str) -> Result<Option<u64>> {
    match parse_currency(field, raw)? {
        None => Ok(None),
        Some(v) if v >= 0.0 && v.fract() == 0.0 => Ok(Some(v as u64)),
        Some(_) => Err(PrepError::parse(field, raw)),
    }
}

/// Parse an optional cell, treating an absent cell like an empty one.
pub fn parse_optional_currency(field: &str, raw: Option<&str>) -> Result<Option<f64>> {
    match raw {
        Some(s) => parse_currency(field, s),
        None => Ok(None),
    }
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Linear-interpolation quantile: position `q * (n - 1)` over the sorted values.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

/// Fill missing entries with the median of the present ones.
///
/// Returns that median, or `None` (leaving the slice untouched) when nothing is present.
pub fn impute_median(values: &mut [Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let med = median(&present)?;
    for v in values.iter_mut() {
        if v.is_none() {
            *v = Some(med);
        }
    }
    Some(med)
}
