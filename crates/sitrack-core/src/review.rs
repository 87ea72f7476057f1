//! Per-measurement review rows: a verdict and a short Indonesian note for
//! every measurement, ordered by age within each child.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;

use crate::error::SitrackError;
use crate::model::{ChildRecord, HeightStatus, HeightTrend, Measurement, WeightStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Ok,
    Warning,
    Danger,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Ok => write!(f, "OK"),
            Verdict::Warning => write!(f, "WARNING"),
            Verdict::Danger => write!(f, "DANGER"),
        }
    }
}

/// One reviewed measurement, flattened with its child's identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewRow {
    #[serde(rename = "No")]
    pub number: Option<i64>,
    #[serde(rename = "Tempat")]
    pub location: Option<String>,
    #[serde(rename = "NIK")]
    pub nik: Option<String>,
    #[serde(rename = "Nama Anak")]
    pub name: Option<String>,
    #[serde(rename = "Tanggal Lahir")]
    pub birth_date: Option<String>,
    #[serde(rename = "Bulan")]
    pub period: String,
    #[serde(rename = "Tanggal Ukur")]
    pub measured_on: Option<String>,
    #[serde(rename = "Umur (bulan)")]
    pub age_months: Option<i32>,
    #[serde(rename = "Berat (kg)")]
    pub weight_kg: Option<Decimal>,
    #[serde(rename = "Tinggi (cm)")]
    pub height_cm: Option<Decimal>,
    #[serde(rename = "Cara Ukur")]
    pub method: Option<String>,
    #[serde(rename = "Status Berat")]
    pub weight_status: WeightStatus,
    #[serde(rename = "Status Tinggi")]
    pub height_status: HeightStatus,
    #[serde(rename = "Validasi Input")]
    pub verdict: Verdict,
    #[serde(rename = "Keterangan")]
    pub note: String,
}

/// Review one child's measurements, sorted by age (missing age sorts as 0).
pub fn review_child(child: &ChildRecord) -> Vec<ReviewRow> {
    let mut sorted: Vec<&Measurement> = child.measurements.iter().collect();
    sorted.sort_by_key(|m| m.age_months.unwrap_or(0));

    let mut rows = Vec::with_capacity(sorted.len());
    let mut previous: Option<&Measurement> = None;
    for m in sorted {
        let (verdict, notes) = assess(m, previous);
        rows.push(ReviewRow {
            number: child.number,
            location: child.location.clone(),
            nik: child.nik.clone(),
            name: child.name.clone(),
            birth_date: child.birth_date.clone(),
            period: m.period.clone(),
            measured_on: m.measured_on.clone(),
            age_months: m.age_months,
            weight_kg: m.weight_kg,
            height_cm: m.height_cm,
            method: m.method.clone(),
            weight_status: m.weight_status,
            height_status: m.height_status,
            verdict,
            note: notes.join("; "),
        });
        previous = Some(m);
    }
    rows
}

/// Review every child in order.
pub fn review(children: &[ChildRecord]) -> Vec<ReviewRow> {
    children.iter().flat_map(review_child).collect()
}

fn assess(m: &Measurement, previous: Option<&Measurement>) -> (Verdict, Vec<String>) {
    let all_fields = m.measured_on.is_some()
        && m.age_months.is_some()
        && m.weight_kg.is_some()
        && m.height_cm.is_some()
        && m.method.is_some();

    if !all_fields {
        let mut notes = Vec::new();
        if m.weight_kg.is_none() && m.height_cm.is_none() {
            notes.push("Data berat dan tinggi kosong".to_string());
        }
        return (Verdict::Warning, notes);
    }

    if m.height_trend == HeightTrend::Danger {
        let note = match (previous.and_then(|p| p.height_cm), m.height_cm) {
            (Some(prev), Some(cur)) => format!("Tinggi menurun: {prev}cm → {cur}cm"),
            _ => "Tinggi badan menurun".to_string(),
        };
        return (Verdict::Danger, vec![note]);
    }

    let mut notes = Vec::new();
    if !matches!(m.weight_status, WeightStatus::Normal | WeightStatus::TidakLengkap) {
        notes.push(match (m.weight_kg, &m.weight_range) {
            (Some(w), Some(range)) => format!("Berat tidak ideal: {w}kg (ideal: {range})"),
            _ => format!("Berat tidak ideal: {}", m.weight_status),
        });
    }
    if !matches!(m.height_status, HeightStatus::Normal | HeightStatus::TidakLengkap) {
        notes.push(match (m.height_cm, &m.height_range) {
            (Some(h), Some(range)) => format!("Tinggi tidak ideal: {h}cm (ideal: {range})"),
            _ => format!("Tinggi tidak ideal: {}", m.height_status),
        });
    }
    if notes.is_empty() {
        (Verdict::Ok, notes)
    } else {
        (Verdict::Warning, notes)
    }
}

/// Write review rows as a comma-separated file with a header line.
pub fn write_csv<W: Write>(rows: &[ReviewRow], writer: W) -> Result<(), SitrackError> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}
