use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary gender tag used by the reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "L")]
    Male,
    #[serde(rename = "P")]
    Female,
}

impl Gender {
    /// Recognize the sheet's gender tag: "L" (laki-laki) or "P" (perempuan).
    pub fn from_tag(tag: &str) -> Option<Gender> {
        match tag.trim().to_uppercase().as_str() {
            "L" => Some(Gender::Male),
            "P" => Some(Gender::Female),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Gender::Male => "L",
            Gender::Female => "P",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Weight-for-age classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeightStatus {
    #[serde(rename = "KURANG")]
    Kurang,
    #[serde(rename = "NORMAL")]
    Normal,
    #[serde(rename = "LEBIH")]
    Lebih,
    #[serde(rename = "TIDAK LENGKAP")]
    #[default]
    TidakLengkap,
    #[serde(rename = "OUT_OF_RANGE")]
    OutOfRange,
}

impl fmt::Display for WeightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightStatus::Kurang => write!(f, "KURANG"),
            WeightStatus::Normal => write!(f, "NORMAL"),
            WeightStatus::Lebih => write!(f, "LEBIH"),
            WeightStatus::TidakLengkap => write!(f, "TIDAK LENGKAP"),
            WeightStatus::OutOfRange => write!(f, "OUT_OF_RANGE"),
        }
    }
}

/// Height-for-age classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeightStatus {
    #[serde(rename = "PENDEK")]
    Pendek,
    #[serde(rename = "NORMAL")]
    Normal,
    #[serde(rename = "TINGGI")]
    Tinggi,
    #[serde(rename = "TIDAK LENGKAP")]
    #[default]
    TidakLengkap,
    #[serde(rename = "OUT_OF_RANGE")]
    OutOfRange,
}

impl fmt::Display for HeightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeightStatus::Pendek => write!(f, "PENDEK"),
            HeightStatus::Normal => write!(f, "NORMAL"),
            HeightStatus::Tinggi => write!(f, "TINGGI"),
            HeightStatus::TidakLengkap => write!(f, "TIDAK LENGKAP"),
            HeightStatus::OutOfRange => write!(f, "OUT_OF_RANGE"),
        }
    }
}

/// Outcome of the height rationality check for one measurement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HeightTrend {
    #[default]
    NoBaseline,
    Normal,
    AmbiguMethodology,
    Danger,
}

impl fmt::Display for HeightTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeightTrend::NoBaseline => write!(f, "NO_BASELINE"),
            HeightTrend::Normal => write!(f, "NORMAL"),
            HeightTrend::AmbiguMethodology => write!(f, "AMBIGU_METHODOLOGY"),
            HeightTrend::Danger => write!(f, "DANGER"),
        }
    }
}

/// One period's measurement of one child.
///
/// The status fields are always present in serialized output; until a
/// measurement is annotated they hold their incomplete defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    #[serde(rename = "periode")]
    pub period: String,
    #[serde(rename = "tgl_ukur")]
    pub measured_on: Option<String>,
    #[serde(rename = "umur_bulan")]
    pub age_months: Option<i32>,
    #[serde(rename = "berat_kg")]
    pub weight_kg: Option<Decimal>,
    #[serde(rename = "tinggi_cm")]
    pub height_cm: Option<Decimal>,
    #[serde(rename = "cara_ukur")]
    pub method: Option<String>,
    pub has_complete_data: bool,
    pub is_incomplete: bool,
    #[serde(rename = "status_bb")]
    pub weight_status: WeightStatus,
    #[serde(rename = "status_tb")]
    pub height_status: HeightStatus,
    #[serde(rename = "rentang_bb_ideal")]
    pub weight_range: Option<String>,
    #[serde(rename = "rentang_tb_ideal")]
    pub height_range: Option<String>,
    #[serde(rename = "status_tb_rasional")]
    pub height_trend: HeightTrend,
    #[serde(rename = "catatan_tb_rasional")]
    pub height_note: String,
}

impl Measurement {
    pub fn new(period: impl Into<String>) -> Self {
        Measurement {
            period: period.into(),
            ..Default::default()
        }
    }

    /// Weight or height present.
    pub fn has_key_data(&self) -> bool {
        self.weight_kg.is_some() || self.height_cm.is_some()
    }
}

/// One data row: a child's identity and the periods measured for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChildRecord {
    #[serde(rename = "no")]
    pub number: Option<i64>,
    #[serde(rename = "tempat")]
    pub location: Option<String>,
    pub nik: Option<String>,
    #[serde(rename = "nama_anak")]
    pub name: Option<String>,
    #[serde(rename = "tanggal_lahir")]
    pub birth_date: Option<String>,
    #[serde(rename = "jenis_kelamin")]
    pub gender: Option<String>,
    pub measurements: Vec<Measurement>,
}

impl ChildRecord {
    /// A row identifies a child only through its name or NIK.
    pub fn is_identified(&self) -> bool {
        self.name.is_some() || self.nik.is_some()
    }

    pub fn gender_tag(&self) -> Option<Gender> {
        self.gender.as_deref().and_then(Gender::from_tag)
    }
}
