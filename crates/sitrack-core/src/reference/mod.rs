pub mod schema;

use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing::{info, warn};

use crate::error::SitrackError;
use crate::model::Gender;
pub use schema::{Band, Bounds, Reference, ReferenceCsvRow, ReferenceRow};

/// Location of the reference resource when none is configured.
pub const DEFAULT_REFERENCE_PATH: &str = "data/who_growth_reference.csv";
/// The table covers ages 0 through 59 months.
pub const MAX_AGE_MONTHS: u8 = 59;

static SHARED: OnceLock<ReferenceTable> = OnceLock::new();

/// Growth reference ranges keyed by age in months.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceTable {
    rows: BTreeMap<u8, ReferenceRow>,
}

impl ReferenceTable {
    /// A table with no rows; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: impl IntoIterator<Item = ReferenceRow>) -> Self {
        ReferenceTable {
            rows: rows.into_iter().map(|r| (r.age_months, r)).collect(),
        }
    }

    /// Parse the semicolon-delimited resource. Rows whose age is missing or
    /// outside 0-59 are skipped; the first row for an age wins.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SitrackError> {
        let mut csv = csv::ReaderBuilder::new()
            .delimiter(b';')
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut rows = BTreeMap::new();
        for record in csv.deserialize::<ReferenceCsvRow>() {
            let record = record?;
            match ReferenceRow::from_csv(&record) {
                Some(row) => {
                    rows.entry(row.age_months).or_insert(row);
                }
                None => warn!(age = %record.age_months, "reference row skipped"),
            }
        }
        Ok(ReferenceTable { rows })
    }

    /// Load the resource, failing on any I/O or format problem.
    pub fn try_load(path: &Path) -> Result<Self, SitrackError> {
        let file = std::fs::File::open(path).map_err(|e| SitrackError::ReferenceLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_reader(file).map_err(|e| SitrackError::ReferenceLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load the resource, degrading to an empty table when it is missing or
    /// unreadable. Lookups against an empty table report no reference.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(table) => {
                info!(path = %path.display(), ages = table.len(), "reference table loaded");
                table
            }
            Err(e) => {
                warn!(error = %e, "reference table unavailable, continuing without ranges");
                Self::empty()
            }
        }
    }

    /// Ranges for an age and gender. Misses for ages outside 0-59 and for
    /// ages the table has no row for.
    pub fn lookup(&self, age_months: i32, gender: Gender) -> Option<Reference> {
        let age = u8::try_from(age_months).ok().filter(|a| *a <= MAX_AGE_MONTHS)?;
        let row = self.rows.get(&age)?;
        Some(match gender {
            Gender::Male => row.male,
            Gender::Female => row.female,
        })
    }

    /// Lookup by the raw gender tag from a sheet ("L" or "P").
    pub fn lookup_tag(&self, age_months: i32, tag: &str) -> Option<Reference> {
        self.lookup(age_months, Gender::from_tag(tag)?)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &ReferenceRow> {
        self.rows.values()
    }
}

/// Install the process-wide table from `path`. The first call wins; later
/// calls return the already installed table without touching the disk.
pub fn init(path: impl Into<PathBuf>) -> &'static ReferenceTable {
    let path = path.into();
    SHARED.get_or_init(|| ReferenceTable::load(&path))
}

/// The process-wide table, loading it from [`DEFAULT_REFERENCE_PATH`] on
/// first use if [`init`] was never called.
pub fn shared() -> &'static ReferenceTable {
    SHARED.get_or_init(|| ReferenceTable::load(Path::new(DEFAULT_REFERENCE_PATH)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    const SAMPLE: &str = "\
Umur;BB Ideal (L);BB Ideal (P);PB Ideal (L);PB Ideal (P)
0;2.5-4.4;2.4-4.2;46.1-53.7;45.4-52.9
12;7.7-12.0;7.0-11.5;71.0-80.5;68.9-79.2
13;7.9-12.3;7.2-11.8;72.1-81.8;70.0-80.5
60;14.1-24.2;13.7-24.9;96.1-118.3;95.1-117.7
";

    #[test]
    fn test_from_reader_parses_rows() {
        let table = ReferenceTable::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(table.len(), 3);
        let r = table.lookup(12, Gender::Male).unwrap();
        assert_eq!(r.weight.unwrap().min, dec!(7.7));
        assert_eq!(r.height.unwrap().to_string(), "71.0-80.5");
    }

    #[test]
    fn test_lookup_fails_closed() {
        let table = ReferenceTable::from_reader(SAMPLE.as_bytes()).unwrap();
        assert!(table.lookup(-1, Gender::Male).is_none());
        assert!(table.lookup(60, Gender::Male).is_none());
        assert!(table.lookup(5, Gender::Female).is_none());
        assert!(table.lookup_tag(12, "X").is_none());
        assert!(table.lookup_tag(12, "p").is_some());
    }

    #[test]
    fn test_empty_table_misses() {
        assert!(ReferenceTable::empty().lookup(12, Gender::Male).is_none());
    }

    #[test]
    fn test_missing_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let table = ReferenceTable::load(&dir.path().join("missing.csv"));
        assert!(table.is_empty());
        let err = ReferenceTable::try_load(&dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, SitrackError::ReferenceLoad { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let table = ReferenceTable::load(file.path());
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_bundled_reference_covers_every_age() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/who_growth_reference.csv");
        let table = ReferenceTable::try_load(&path).unwrap();
        assert_eq!(table.len(), 60);
        for age in 0..=59 {
            for gender in [Gender::Male, Gender::Female] {
                let r = table.lookup(age, gender).unwrap();
                assert!(r.weight.is_some() && r.height.is_some(), "age {age} {gender}");
            }
        }
    }

    #[test]
    fn test_shared_table_loads_once() {
        let first = shared();
        let second = init("elsewhere.csv");
        assert!(std::ptr::eq(first, second));
    }
}
