use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::extraction::Cell;

/// The six identity columns that open every child row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentityField {
    No,
    Tempat,
    Nik,
    NamaAnak,
    TanggalLahir,
    JenisKelamin,
}

impl IdentityField {
    /// Template order, columns 1-6.
    pub const ALL: [IdentityField; 6] = [
        IdentityField::No,
        IdentityField::Tempat,
        IdentityField::Nik,
        IdentityField::NamaAnak,
        IdentityField::TanggalLahir,
        IdentityField::JenisKelamin,
    ];

    /// Identity labels a compliant template must carry. TEMPAT is optional.
    pub const MANDATORY: [IdentityField; 5] = [
        IdentityField::No,
        IdentityField::Nik,
        IdentityField::NamaAnak,
        IdentityField::TanggalLahir,
        IdentityField::JenisKelamin,
    ];

    pub fn label(self) -> &'static str {
        match self {
            IdentityField::No => "NO",
            IdentityField::Tempat => "TEMPAT",
            IdentityField::Nik => "NIK",
            IdentityField::NamaAnak => "NAMA ANAK",
            IdentityField::TanggalLahir => "TANGGAL LAHIR",
            IdentityField::JenisKelamin => "JENIS KELAMIN",
        }
    }

    pub fn from_label(raw: &str) -> Option<IdentityField> {
        let label = normalize_label(raw);
        IdentityField::ALL.into_iter().find(|f| f.label() == label)
    }
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The five sub-columns of one measurement period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasurementField {
    Date,
    Age,
    Weight,
    Height,
    Method,
}

impl MeasurementField {
    pub const ALL: [MeasurementField; 5] = [
        MeasurementField::Date,
        MeasurementField::Age,
        MeasurementField::Weight,
        MeasurementField::Height,
        MeasurementField::Method,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MeasurementField::Date => "TGL UKUR",
            MeasurementField::Age => "UMUR",
            MeasurementField::Weight => "BERAT",
            MeasurementField::Height => "TINGGI",
            MeasurementField::Method => "CARA UKUR",
        }
    }

    pub fn from_label(raw: &str) -> Option<MeasurementField> {
        let label = normalize_label(raw);
        MeasurementField::ALL.into_iter().find(|f| f.label() == label)
    }
}

impl fmt::Display for MeasurementField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Normalize a header cell for label comparison: trim, collapse inner
/// whitespace, uppercase.
pub fn normalize_label(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Identity fields whose labels appear among `cells`.
pub fn identity_labels_in(cells: &[Cell]) -> HashSet<IdentityField> {
    cells
        .iter()
        .filter_map(|c| c.text())
        .filter_map(|t| IdentityField::from_label(&t))
        .collect()
}

/// Measurement fields whose labels appear among `cells`.
pub fn measurement_labels_in(cells: &[Cell]) -> HashSet<MeasurementField> {
    cells
        .iter()
        .filter_map(|c| c.text())
        .filter_map(|t| MeasurementField::from_label(&t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("  nama   anak "), "NAMA ANAK");
        assert_eq!(normalize_label("Tgl Ukur"), "TGL UKUR");
    }

    #[test]
    fn test_measurement_label_lookup() {
        assert_eq!(MeasurementField::from_label("BERAT"), Some(MeasurementField::Weight));
        assert_eq!(MeasurementField::from_label("cara ukur"), Some(MeasurementField::Method));
        assert_eq!(MeasurementField::from_label("BERAT (KG)"), None);
    }

    #[test]
    fn test_identity_labels_counted_once() {
        let cells: Vec<Cell> = ["NO", "NIK", "NIK", "NAMA ANAK", "", "X"]
            .into_iter()
            .map(Cell::from)
            .collect();
        let found = identity_labels_in(&cells);
        assert_eq!(found.len(), 3);
        assert!(found.contains(&IdentityField::NamaAnak));
    }
}
