//! Per-field coercion of raw cells.
//!
//! Every function here is total: a cell that cannot be coerced yields `None`
//! (or, for dates, the raw text) and never aborts the surrounding row.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::extraction::{format_number, Cell};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d", "%d.%m.%Y"];
const TIME_SUFFIXES: &[&str] = &[" %H:%M:%S", " %H:%M", "T%H:%M:%S"];

/// Parse a weight or height. Text accepts a decimal comma ("9,5").
///
/// Whole values keep one fractional digit, so a measured 74 reads "74.0".
pub fn parse_decimal(cell: &Cell) -> Option<Decimal> {
    let mut value = match cell {
        Cell::Number(n) => f64_to_decimal(*n),
        Cell::Text(s) => decimal_from_text(s),
        _ => None,
    }?;
    if value.scale() == 0 {
        value.rescale(1);
    }
    Some(value)
}

/// Parse an age in months, truncating fractional values toward zero.
pub fn parse_age(cell: &Cell) -> Option<i32> {
    let value = match cell {
        Cell::Number(n) => *n,
        Cell::Text(s) => s.trim().replace(',', ".").parse::<f64>().ok()?,
        _ => return None,
    };
    if !value.is_finite() || value.abs() > i32::MAX as f64 {
        return None;
    }
    Some(value.trunc() as i32)
}

/// Parse the running number column.
pub fn parse_int(cell: &Cell) -> Option<i64> {
    let value = match cell {
        Cell::Number(n) => *n,
        Cell::Text(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !value.is_finite() || value.abs() >= 1e15 {
        return None;
    }
    Some(value.trunc() as i64)
}

/// Parse a date cell into `YYYY-MM-DD`.
///
/// Native date cells and recognized text dates are normalized; anything else
/// falls back to the trimmed raw text so no information is lost.
pub fn parse_date(cell: &Cell) -> Option<String> {
    match cell {
        Cell::DateTime(dt) => Some(dt.date().format("%Y-%m-%d").to_string()),
        Cell::Text(s) => {
            let raw = s.trim();
            if raw.is_empty() {
                return None;
            }
            Some(
                date_from_text(raw)
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| raw.to_string()),
            )
        }
        other => other.text(),
    }
}

/// Trimmed text of any cell; integral numbers render without a fraction.
pub fn parse_text(cell: &Cell) -> Option<String> {
    cell.text()
}

/// Trimmed, uppercased text (measurement method, gender tag).
pub fn parse_upper(cell: &Cell) -> Option<String> {
    cell.text().map(|s| s.to_uppercase())
}

fn decimal_from_text(s: &str) -> Option<Decimal> {
    let normalized = s.trim().replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .ok()
}

/// Convert through the shortest decimal text form so 9.5 stays 9.5 rather
/// than picking up binary noise.
pub fn f64_to_decimal(f: f64) -> Option<Decimal> {
    if !f.is_finite() {
        return None;
    }
    let s = format_number(f);
    s.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::try_from(f).ok())
}

fn date_from_text(s: &str) -> Option<NaiveDate> {
    for format in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, format) {
            return Some(d);
        }
        for suffix in TIME_SUFFIXES {
            let with_time = format!("{format}{suffix}");
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, &with_time) {
                return Some(dt.date());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decimal_from_number_keeps_short_form() {
        assert_eq!(parse_decimal(&Cell::Number(9.5)), Some(dec!(9.5)));
        assert_eq!(parse_decimal(&Cell::Number(75.2)), Some(dec!(75.2)));
        assert_eq!(parse_decimal(&Cell::Number(74.0)), Some(dec!(74)));
    }

    #[test]
    fn test_whole_measurements_render_one_fraction_digit() {
        let height = parse_decimal(&Cell::Number(74.0)).unwrap();
        assert_eq!(height.to_string(), "74.0");
        assert_eq!(parse_decimal(&Cell::from("80")).unwrap().to_string(), "80.0");
        assert_eq!(parse_decimal(&Cell::Number(9.5)).unwrap().to_string(), "9.5");
        assert_eq!(parse_decimal(&Cell::from("80.25")).unwrap().to_string(), "80.25");
    }

    #[test]
    fn test_decimal_from_text() {
        assert_eq!(parse_decimal(&Cell::from("9,5")), Some(dec!(9.5)));
        assert_eq!(parse_decimal(&Cell::from(" 80.25 ")), Some(dec!(80.25)));
        assert_eq!(parse_decimal(&Cell::from("sembilan")), None);
        assert_eq!(parse_decimal(&Cell::Empty), None);
        assert_eq!(parse_decimal(&Cell::Bool(true)), None);
    }

    #[test]
    fn test_age_truncates() {
        assert_eq!(parse_age(&Cell::Number(12.9)), Some(12));
        assert_eq!(parse_age(&Cell::from("13")), Some(13));
        assert_eq!(parse_age(&Cell::from("13.0")), Some(13));
        assert_eq!(parse_age(&Cell::from("tiga")), None);
        assert_eq!(parse_age(&Cell::Number(f64::NAN)), None);
    }

    #[test]
    fn test_int() {
        assert_eq!(parse_int(&Cell::Number(3.0)), Some(3));
        assert_eq!(parse_int(&Cell::from("4")), Some(4));
        assert_eq!(parse_int(&Cell::from("x")), None);
    }

    #[test]
    fn test_date_native_and_text() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(parse_date(&Cell::DateTime(dt)).as_deref(), Some("2024-01-15"));
        assert_eq!(parse_date(&Cell::from("15/01/2024")).as_deref(), Some("2024-01-15"));
        assert_eq!(parse_date(&Cell::from("15-01-2024")).as_deref(), Some("2024-01-15"));
        assert_eq!(
            parse_date(&Cell::from("2024-01-15 08:30:00")).as_deref(),
            Some("2024-01-15")
        );
    }

    #[test]
    fn test_date_falls_back_to_raw_text() {
        assert_eq!(parse_date(&Cell::from(" Januari ")).as_deref(), Some("Januari"));
        assert_eq!(parse_date(&Cell::Empty), None);
    }

    #[test]
    fn test_upper_trims() {
        assert_eq!(parse_upper(&Cell::from(" berdiri ")).as_deref(), Some("BERDIRI"));
        assert_eq!(parse_upper(&Cell::from("  ")), None);
    }

    #[test]
    fn test_text_of_numeric_nik() {
        assert_eq!(
            parse_text(&Cell::Number(3201012345678.0)).as_deref(),
            Some("3201012345678")
        );
    }
}
