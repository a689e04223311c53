//! Number and currency display helpers. Presentation only: nothing here feeds back
//! into the decision-support data.

use crate::domain::Percentage;

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn with_separators(formatted: &str) -> String {
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };
    let mut out = format!("{}{}", sign, group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// `12345.9` -> `"12,345"` (truncated toward zero)
pub fn integer(value: f64) -> String {
    with_separators(&format!("{}", value.trunc() as i64))
}

/// `500000.0` -> `"$500,000"`
pub fn currency_whole(value: f64) -> String {
    format!("${}", integer(value))
}

/// `1177.0` -> `"$1,177.00"`
pub fn currency_cents(value: f64) -> String {
    format!("${}", with_separators(&format!("{:.2}", value)))
}

/// `12.3456` -> `"12.35%"`
pub fn percent(value: f64) -> String {
    format!("{:.2}%", value)
}

/// Display a percentage; absent shows as zero, a non-representable result as `unknown`.
pub fn percentage(value: Option<Percentage>) -> String {
    match value {
        Some(Percentage::Known(v)) => percent(v),
        Some(Percentage::Unknown) => "unknown".to_string(),
        None => percent(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_separators() {
        assert_eq!(integer(0.0), "0");
        assert_eq!(integer(999.0), "999");
        assert_eq!(integer(1000.0), "1,000");
        assert_eq!(integer(12_345.9), "12,345");
        assert_eq!(integer(1_234_567.0), "1,234,567");
        assert_eq!(integer(-4_500.0), "-4,500");
    }

    #[test]
    fn test_currency() {
        assert_eq!(currency_whole(500_000.0), "$500,000");
        assert_eq!(currency_cents(1177.0), "$1,177.00");
        assert_eq!(currency_cents(117_700.0), "$117,700.00");
        assert_eq!(currency_cents(0.126), "$0.13");
    }

    #[test]
    fn test_percentages() {
        assert_eq!(percent(11.666), "11.67%");
        assert_eq!(percentage(Some(Percentage::Known(3.0))), "3.00%");
        assert_eq!(percentage(None), "0.00%");
        assert_eq!(percentage(Some(Percentage::Unknown)), "unknown");
    }
}
