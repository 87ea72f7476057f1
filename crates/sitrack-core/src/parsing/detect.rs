use serde::{Deserialize, Serialize};
use std::fmt;

use crate::extraction::{Cell, Sheet};
use crate::parsing::labels::{identity_labels_in, measurement_labels_in, IdentityField};

/// Row holding merged period captions (row 1 of the sheet).
pub const CAPTION_ROW: usize = 0;
/// Row holding identity and measurement labels (row 2 of the sheet).
pub const LABEL_ROW: usize = 1;
/// Period captions start at column F or later.
pub const FIRST_CAPTION_COLUMN: usize = 5;

const MIN_LABEL_MATCHES: usize = 3;

/// The layout of an uploaded sheet, as decided by [`detect`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SheetLayout {
    /// Merged period captions on row 1, labels on row 2, data from row 3.
    MergedHeader { periods: Vec<String> },
    /// Measurement labels on row 2 without usable captions, data from row 3.
    FlatHeader,
    /// No labels at all; fixed column offsets.
    Direct,
    /// Identity labels on row 2 without merged captions, data from row 3.
    TraditionalHeader,
    Unrecognized,
}

/// Serializable tag for a detected layout, including read failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    MergedHeader,
    FlatHeader,
    Direct,
    TraditionalHeader,
    Unrecognized,
    Error,
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FormatKind::MergedHeader => "merged_header",
            FormatKind::FlatHeader => "flat_header",
            FormatKind::Direct => "direct",
            FormatKind::TraditionalHeader => "traditional_header",
            FormatKind::Unrecognized => "unrecognized",
            FormatKind::Error => "error",
        };
        f.write_str(s)
    }
}

impl SheetLayout {
    pub fn kind(&self) -> FormatKind {
        match self {
            SheetLayout::MergedHeader { .. } => FormatKind::MergedHeader,
            SheetLayout::FlatHeader => FormatKind::FlatHeader,
            SheetLayout::Direct => FormatKind::Direct,
            SheetLayout::TraditionalHeader => FormatKind::TraditionalHeader,
            SheetLayout::Unrecognized => FormatKind::Unrecognized,
        }
    }

    /// Human-readable explanation of the detection outcome.
    pub fn description(&self) -> String {
        match self {
            SheetLayout::MergedHeader { periods } => format!(
                "PRD layout with merged period captions ({} periods detected)",
                periods.len()
            ),
            SheetLayout::FlatHeader => "Layout with measurement labels on the header row".into(),
            SheetLayout::Direct => "Direct data layout without headers".into(),
            SheetLayout::TraditionalHeader => {
                "PRD layout (identity labels on the header row, no merged captions)".into()
            }
            SheetLayout::Unrecognized => "Unrecognized layout".into(),
        }
    }

    /// Short layout name reported as `format_type` in processing results.
    pub fn format_name(&self) -> &'static str {
        match self {
            SheetLayout::MergedHeader { .. } => "PRD Format with Merged Cells",
            SheetLayout::FlatHeader => "Header Format",
            SheetLayout::Direct => "Direct Data Format",
            SheetLayout::TraditionalHeader => "PRD Format",
            SheetLayout::Unrecognized => "Unrecognized Format",
        }
    }
}

/// Classify the layout of a sheet.
///
/// Rules are tried in order and the first match wins:
/// 1. merged captions on row 1 plus at least 3 identity labels on row 2,
/// 2. at least 3 measurement labels on the header row,
/// 3. a data-like value among the first five header cells,
/// 4. at least 3 mandatory identity labels on the header row and a data row
///    below it.
///
/// Label-based rules come first because rule 3 is deliberately permissive.
pub fn detect(sheet: &Sheet) -> SheetLayout {
    if sheet.height() <= LABEL_ROW {
        return SheetLayout::Unrecognized;
    }
    let header = sheet.row(LABEL_ROW);

    let periods = merged_period_names(sheet);
    if !periods.is_empty() {
        let identity_cells = &header[..header.len().min(6)];
        if identity_labels_in(identity_cells).len() >= MIN_LABEL_MATCHES {
            return SheetLayout::MergedHeader { periods };
        }
    }

    if measurement_labels_in(header).len() >= MIN_LABEL_MATCHES {
        return SheetLayout::FlatHeader;
    }

    if header
        .iter()
        .take(5)
        .filter_map(|c| c.text())
        .any(|t| is_data_like(&t))
    {
        return SheetLayout::Direct;
    }

    if sheet.height() > LABEL_ROW + 1 && mandatory_label_count(header) >= MIN_LABEL_MATCHES {
        return SheetLayout::TraditionalHeader;
    }

    SheetLayout::Unrecognized
}

/// Mandatory identity labels on a header row. TEMPAT does not count.
fn mandatory_label_count(header: &[Cell]) -> usize {
    let found = identity_labels_in(header);
    IdentityField::MANDATORY
        .iter()
        .filter(|f| found.contains(*f))
        .count()
}

/// Period captions from single-row merges on the caption row, ordered by
/// the column where each merge starts.
pub fn merged_period_names(sheet: &Sheet) -> Vec<String> {
    let mut captions: Vec<(usize, String)> = sheet
        .merged_regions()
        .iter()
        .filter(|m| m.is_single_row(CAPTION_ROW) && m.first_col >= FIRST_CAPTION_COLUMN)
        .filter_map(|m| {
            sheet
                .cell(CAPTION_ROW, m.first_col)
                .text()
                .map(|t| (m.first_col, t))
        })
        .collect();
    captions.sort_by_key(|(col, _)| *col);
    captions.into_iter().map(|(_, name)| name).collect()
}

/// Whether a header cell looks like a data value rather than a label:
/// numeric, longer than three characters, or date-like.
fn is_data_like(text: &str) -> bool {
    let digits: String = text.chars().filter(|c| *c != '.' && *c != '-').collect();
    let numeric = !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit());
    numeric || text.chars().count() > 3 || text.contains('-') || text.contains('/')
}

/// Check that a sheet follows one of the recognized layouts.
pub fn validate_format(sheet: &Sheet) -> (bool, String) {
    match detect(sheet) {
        SheetLayout::Unrecognized => (
            false,
            "Unrecognized Excel layout. Use the PRD, header or direct data layout.".into(),
        ),
        layout => (true, format!("Format detected: {}", layout.description())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::{Cell, MergedRange};

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|s| Cell::from(*s)).collect()
    }

    fn caption_merge(first_col: usize) -> MergedRange {
        MergedRange {
            first_row: 0,
            first_col,
            last_row: 0,
            last_col: first_col + 4,
        }
    }

    fn merged_sheet(merges: Vec<MergedRange>) -> Sheet {
        let mut caption = row(&["", "", "", "", "", ""]);
        caption.extend(row(&["JAN 2024", "", "", "", "", "FEB 2024", "", "", "", ""]));
        let mut labels = row(&["NO", "TEMPAT", "NIK", "NAMA ANAK", "TANGGAL LAHIR", "JENIS KELAMIN"]);
        for _ in 0..2 {
            labels.extend(row(&["TGL UKUR", "UMUR", "BERAT", "TINGGI", "CARA UKUR"]));
        }
        Sheet::new("Sheet1", vec![caption, labels], merges)
    }

    #[test]
    fn test_merged_header_detected() {
        let sheet = merged_sheet(vec![caption_merge(6), caption_merge(11)]);
        assert_eq!(
            detect(&sheet),
            SheetLayout::MergedHeader {
                periods: vec!["JAN 2024".into(), "FEB 2024".into()]
            }
        );
    }

    #[test]
    fn test_merged_captions_ordered_by_column() {
        // Merge list order from the container must not leak into period order.
        let sheet = merged_sheet(vec![caption_merge(11), caption_merge(6)]);
        assert_eq!(merged_period_names(&sheet), vec!["JAN 2024", "FEB 2024"]);
    }

    #[test]
    fn test_merges_outside_caption_row_ignored() {
        let mut sheet_merges = vec![caption_merge(6)];
        sheet_merges.push(MergedRange {
            first_row: 0,
            first_col: 0,
            last_row: 1,
            last_col: 0,
        });
        let sheet = merged_sheet(sheet_merges);
        assert_eq!(merged_period_names(&sheet), vec!["JAN 2024"]);
    }

    #[test]
    fn test_merged_without_identity_labels_falls_through() {
        let caption = row(&["", "", "", "", "", "", "JAN 2024"]);
        let labels = row(&["A", "B", "C", "D", "E", "F", "TGL UKUR", "UMUR", "BERAT"]);
        let sheet = Sheet::new("Sheet1", vec![caption, labels], vec![caption_merge(6)]);
        assert_eq!(detect(&sheet), SheetLayout::FlatHeader);
    }

    #[test]
    fn test_flat_header_detected() {
        let mut labels = row(&["NO", "TEMPAT", "NIK", "NAMA ANAK", "TANGGAL LAHIR", "JENIS KELAMIN"]);
        labels.extend(row(&["TGL UKUR", "UMUR", "BERAT", "TINGGI", "CARA UKUR"]));
        let sheet = Sheet::new("Sheet1", vec![row(&["Data Balita"]), labels], vec![]);
        assert_eq!(detect(&sheet), SheetLayout::FlatHeader);
    }

    #[test]
    fn test_direct_detected_from_data_values() {
        let sheet = Sheet::new(
            "Sheet1",
            vec![
                row(&["1", "3201", "Andi", "2023-01-15", "L"]),
                vec![
                    Cell::from(2_i64),
                    Cell::from("3202"),
                    Cell::from("Budi Santoso"),
                    Cell::from("2023-02-01"),
                    Cell::from("L"),
                ],
            ],
            vec![],
        );
        assert_eq!(detect(&sheet), SheetLayout::Direct);
    }

    #[test]
    fn test_traditional_header_detected() {
        let sheet = Sheet::new(
            "Sheet1",
            vec![
                row(&["", ""]),
                row(&["NO", "NIK", "JK", "", "", "NO", "NIK"]),
                row(&["1", "3201"]),
            ],
            vec![],
        );
        // only two distinct identity labels on the header row
        assert_eq!(detect(&sheet), SheetLayout::Unrecognized);

        let sheet = Sheet::new(
            "Sheet1",
            vec![
                row(&[""]),
                row(&["NO", "NIK", "JK", "", "", "NAMA ANAK"]),
                row(&["1", "3201"]),
            ],
            vec![],
        );
        assert_eq!(detect(&sheet), SheetLayout::TraditionalHeader);
    }

    #[test]
    fn test_tempat_does_not_count_towards_traditional_header() {
        let sheet = Sheet::new(
            "Sheet1",
            vec![
                row(&[""]),
                row(&["NO", "NIK", "JK", "", "", "TEMPAT"]),
                row(&["1", "3201"]),
            ],
            vec![],
        );
        assert_eq!(detect(&sheet), SheetLayout::Unrecognized);
    }

    #[test]
    fn test_short_sheet_unrecognized() {
        let sheet = Sheet::new("Sheet1", vec![row(&["NO", "NIK"])], vec![]);
        assert_eq!(detect(&sheet), SheetLayout::Unrecognized);
        assert!(!validate_format(&sheet).0);
    }

    #[test]
    fn test_is_data_like() {
        assert!(is_data_like("12"));
        assert!(is_data_like("9.5"));
        assert!(is_data_like("Andi"));
        assert!(is_data_like("1/2"));
        assert!(!is_data_like("NO"));
        assert!(!is_data_like("NIK"));
        assert!(!is_data_like("JK"));
    }

    #[test]
    fn test_validate_format_message() {
        let sheet = merged_sheet(vec![caption_merge(6)]);
        let (ok, message) = validate_format(&sheet);
        assert!(ok);
        assert!(message.starts_with("Format detected:"));
    }
}
