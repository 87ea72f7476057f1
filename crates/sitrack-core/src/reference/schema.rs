use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One line of the semicolon-delimited reference resource.
///
/// Range cells are kept as text; a malformed range only affects its own field.
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceCsvRow {
    #[serde(rename = "Umur")]
    pub age_months: String,
    #[serde(rename = "BB Ideal (L)", default)]
    pub weight_male: String,
    #[serde(rename = "BB Ideal (P)", default)]
    pub weight_female: String,
    #[serde(rename = "PB Ideal (L)", default)]
    pub height_male: String,
    #[serde(rename = "PB Ideal (P)", default)]
    pub height_female: String,
}

/// Where a value falls relative to an inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Below,
    Within,
    Above,
}

/// An inclusive `min-max` interval parsed from the reference resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bounds {
    pub min: Decimal,
    pub max: Decimal,
}

impl Bounds {
    /// Parse `"min-max"`, e.g. `"7.7-12.0"`. Anything else yields `None`.
    pub fn parse(raw: &str) -> Option<Bounds> {
        let parts: Vec<&str> = raw.split('-').collect();
        let [min, max] = parts.as_slice() else {
            return None;
        };
        let min = parse_bound(min)?;
        let max = parse_bound(max)?;
        Some(Bounds { min, max })
    }

    pub fn band(&self, value: Decimal) -> Band {
        if value < self.min {
            Band::Below
        } else if value > self.max {
            Band::Above
        } else {
            Band::Within
        }
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

fn parse_bound(raw: &str) -> Option<Decimal> {
    let normalized = raw.trim().replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    Decimal::from_str(&normalized).ok()
}

/// Weight and height ranges for one age and one gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub weight: Option<Bounds>,
    pub height: Option<Bounds>,
}

/// All reference data for one age in months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReferenceRow {
    pub age_months: u8,
    pub male: Reference,
    pub female: Reference,
}

impl ReferenceRow {
    /// Build a row from its CSV form. Returns `None` when the age is not a
    /// month count within 0-59.
    pub fn from_csv(row: &ReferenceCsvRow) -> Option<ReferenceRow> {
        let age_months: u8 = row.age_months.trim().parse().ok()?;
        if age_months > super::MAX_AGE_MONTHS {
            return None;
        }
        Some(ReferenceRow {
            age_months,
            male: Reference {
                weight: Bounds::parse(&row.weight_male),
                height: Bounds::parse(&row.height_male),
            },
            female: Reference {
                weight: Bounds::parse(&row.weight_female),
                height: Bounds::parse(&row.height_female),
            },
        })
    }
}
