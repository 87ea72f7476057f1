use rust_decimal::Decimal;

use crate::model::{Gender, HeightStatus, Measurement, WeightStatus};
use crate::reference::{Band, Bounds, ReferenceTable};

/// Classify one measurement's weight and height against the reference.
///
/// - No gender or no age: both statuses `TIDAK LENGKAP`, no ranges.
/// - No reference for the age/gender: both statuses `OUT_OF_RANGE`.
/// - Otherwise the ideal ranges are attached even when the raw value is
///   missing, and a missing value is `TIDAK LENGKAP` for that field only.
pub fn classify_measurement(measurement: &mut Measurement, gender: Option<&str>, table: &ReferenceTable) {
    measurement.weight_range = None;
    measurement.height_range = None;

    let (Some(gender), Some(age)) = (gender, measurement.age_months) else {
        measurement.weight_status = WeightStatus::TidakLengkap;
        measurement.height_status = HeightStatus::TidakLengkap;
        return;
    };

    let Some(reference) = Gender::from_tag(gender).and_then(|g| table.lookup(age, g)) else {
        measurement.weight_status = WeightStatus::OutOfRange;
        measurement.height_status = HeightStatus::OutOfRange;
        return;
    };

    measurement.weight_range = reference.weight.map(|b| b.to_string());
    measurement.height_range = reference.height.map(|b| b.to_string());
    measurement.weight_status = weight_status(measurement.weight_kg, reference.weight);
    measurement.height_status = height_status(measurement.height_cm, reference.height);
}

pub fn weight_status(value: Option<Decimal>, bounds: Option<Bounds>) -> WeightStatus {
    match (value, bounds) {
        (Some(v), Some(b)) => match b.band(v) {
            Band::Below => WeightStatus::Kurang,
            Band::Within => WeightStatus::Normal,
            Band::Above => WeightStatus::Lebih,
        },
        _ => WeightStatus::TidakLengkap,
    }
}

pub fn height_status(value: Option<Decimal>, bounds: Option<Bounds>) -> HeightStatus {
    match (value, bounds) {
        (Some(v), Some(b)) => match b.band(v) {
            Band::Below => HeightStatus::Pendek,
            Band::Within => HeightStatus::Normal,
            Band::Above => HeightStatus::Tinggi,
        },
        _ => HeightStatus::TidakLengkap,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{Reference, ReferenceRow};
    use rust_decimal_macros::dec;

    fn table() -> ReferenceTable {
        ReferenceTable::from_rows([ReferenceRow {
            age_months: 12,
            male: Reference {
                weight: Bounds::parse("7.7-12.0"),
                height: Bounds::parse("71.0-80.5"),
            },
            female: Reference {
                weight: Bounds::parse("7.0-11.5"),
                height: None,
            },
        }])
    }

    fn measurement(age: Option<i32>, weight: Option<Decimal>, height: Option<Decimal>) -> Measurement {
        Measurement {
            age_months: age,
            weight_kg: weight,
            height_cm: height,
            ..Measurement::new("JAN 2024")
        }
    }

    #[test]
    fn test_normal_and_extremes() {
        let mut m = measurement(Some(12), Some(dec!(9.5)), Some(dec!(70.0)));
        classify_measurement(&mut m, Some("L"), &table());
        assert_eq!(m.weight_status, WeightStatus::Normal);
        assert_eq!(m.height_status, HeightStatus::Pendek);
        assert_eq!(m.weight_range.as_deref(), Some("7.7-12.0"));
        assert_eq!(m.height_range.as_deref(), Some("71.0-80.5"));

        let mut m = measurement(Some(12), Some(dec!(12.1)), Some(dec!(81)));
        classify_measurement(&mut m, Some("L"), &table());
        assert_eq!(m.weight_status, WeightStatus::Lebih);
        assert_eq!(m.height_status, HeightStatus::Tinggi);

        let mut m = measurement(Some(12), Some(dec!(7.6)), Some(dec!(80.5)));
        classify_measurement(&mut m, Some("L"), &table());
        assert_eq!(m.weight_status, WeightStatus::Kurang);
        assert_eq!(m.height_status, HeightStatus::Normal);
    }

    #[test]
    fn test_missing_gender_or_age_is_incomplete() {
        let mut m = measurement(Some(12), Some(dec!(9.5)), None);
        classify_measurement(&mut m, None, &table());
        assert_eq!(m.weight_status, WeightStatus::TidakLengkap);
        assert_eq!(m.height_status, HeightStatus::TidakLengkap);
        assert!(m.weight_range.is_none());

        let mut m = measurement(None, Some(dec!(9.5)), None);
        classify_measurement(&mut m, Some("L"), &table());
        assert_eq!(m.weight_status, WeightStatus::TidakLengkap);
        assert!(m.height_range.is_none());
    }

    #[test]
    fn test_lookup_miss_is_out_of_range() {
        let mut m = measurement(Some(72), Some(dec!(20)), None);
        classify_measurement(&mut m, Some("L"), &table());
        assert_eq!(m.weight_status, WeightStatus::OutOfRange);
        assert_eq!(m.height_status, HeightStatus::OutOfRange);

        let mut m = measurement(Some(12), Some(dec!(9)), None);
        classify_measurement(&mut m, Some("X"), &table());
        assert_eq!(m.weight_status, WeightStatus::OutOfRange);
    }

    #[test]
    fn test_range_attached_when_value_missing() {
        let mut m = measurement(Some(12), Some(dec!(9.5)), None);
        classify_measurement(&mut m, Some("L"), &table());
        assert_eq!(m.height_status, HeightStatus::TidakLengkap);
        assert_eq!(m.height_range.as_deref(), Some("71.0-80.5"));
    }

    #[test]
    fn test_partial_reference_only_affects_its_field() {
        let mut m = measurement(Some(12), Some(dec!(9)), Some(dec!(75)));
        classify_measurement(&mut m, Some("P"), &table());
        assert_eq!(m.weight_status, WeightStatus::Normal);
        assert_eq!(m.height_status, HeightStatus::TidakLengkap);
        assert!(m.height_range.is_none());
    }
}
