pub mod columns;
pub mod detect;
pub mod labels;
pub mod values;

use tracing::{debug, info};

use crate::error::SitrackError;
use crate::extraction::{Cell, Sheet};
use crate::model::{ChildRecord, Measurement};
use columns::{ColumnPlan, PeriodColumnGroup};
use detect::SheetLayout;
use labels::{IdentityField, MeasurementField};

/// A sheet turned into child records, before annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSheet {
    pub layout: SheetLayout,
    pub periods: Vec<String>,
    pub children: Vec<ChildRecord>,
    /// Non-blank rows dropped because they carry neither a name nor a NIK.
    pub skipped_rows: usize,
}

/// Detect the layout, plan the columns and extract every child row.
pub fn parse_sheet(sheet: &Sheet) -> Result<ParsedSheet, SitrackError> {
    let layout = detect::detect(sheet);
    info!(sheet = %sheet.name, layout = %layout.kind(), "layout detected");

    let plan = columns::plan(sheet, &layout)?;
    let (children, skipped_rows) = extract_children(sheet, &plan);
    info!(
        children = children.len(),
        periods = plan.groups.len(),
        skipped_rows,
        "records extracted"
    );

    Ok(ParsedSheet {
        periods: plan.period_names(),
        layout,
        children,
        skipped_rows,
    })
}

/// Walk the data rows of a sheet. Returns the retained children and the
/// number of non-blank rows that identified no child.
pub fn extract_children(sheet: &Sheet, plan: &ColumnPlan) -> (Vec<ChildRecord>, usize) {
    let mut children = Vec::new();
    let mut skipped = 0;

    for row_idx in plan.first_data_row..sheet.height() {
        let row = sheet.row(row_idx);
        if row.iter().all(Cell::is_blank) {
            continue;
        }
        let child = extract_child(row, plan);
        if child.is_identified() {
            children.push(child);
        } else {
            debug!(row = row_idx + 1, "row without name or NIK skipped");
            skipped += 1;
        }
    }

    (children, skipped)
}

/// Build one child record from one data row.
pub fn extract_child(row: &[Cell], plan: &ColumnPlan) -> ChildRecord {
    let cell = |field: IdentityField| plan.identity_column(field).and_then(|c| row.get(c));

    ChildRecord {
        number: cell(IdentityField::No).and_then(values::parse_int),
        location: cell(IdentityField::Tempat).and_then(values::parse_text),
        nik: cell(IdentityField::Nik).and_then(values::parse_text),
        name: cell(IdentityField::NamaAnak).and_then(values::parse_text),
        birth_date: cell(IdentityField::TanggalLahir).and_then(values::parse_date),
        gender: cell(IdentityField::JenisKelamin).and_then(values::parse_upper),
        measurements: plan
            .groups
            .iter()
            .filter_map(|group| extract_measurement(row, group))
            .collect(),
    }
}

/// Build one period's measurement. Returns `None` when every cell of the
/// period is blank.
pub fn extract_measurement(row: &[Cell], group: &PeriodColumnGroup) -> Option<Measurement> {
    let mut measurement = Measurement::new(group.period_name.clone());
    let mut any_cell = false;

    for (col, field) in &group.columns {
        let Some(cell) = row.get(*col).filter(|c| !c.is_blank()) else {
            continue;
        };
        any_cell = true;
        match field {
            MeasurementField::Date => measurement.measured_on = values::parse_date(cell),
            MeasurementField::Age => measurement.age_months = values::parse_age(cell),
            MeasurementField::Weight => measurement.weight_kg = values::parse_decimal(cell),
            MeasurementField::Height => measurement.height_cm = values::parse_decimal(cell),
            MeasurementField::Method => measurement.method = values::parse_upper(cell),
        }
    }

    if !any_cell {
        return None;
    }
    measurement.has_complete_data = measurement.has_key_data();
    measurement.is_incomplete = !measurement.has_complete_data;
    Some(measurement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::MergedRange;
    use rust_decimal_macros::dec;

    fn text_row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|s| Cell::from(*s)).collect()
    }

    fn merged_fixture(data: Vec<Vec<Cell>>) -> Sheet {
        let mut caption = text_row(&["", "", "", "", "", ""]);
        caption.extend(text_row(&["JAN 2024", "", "", "", "", "FEB 2024"]));
        let mut labels = text_row(&["NO", "TEMPAT", "NIK", "NAMA ANAK", "TANGGAL LAHIR", "JENIS KELAMIN"]);
        for _ in 0..2 {
            labels.extend(MeasurementField::ALL.iter().map(|f| Cell::from(f.label())));
        }
        let mut rows = vec![caption, labels];
        rows.extend(data);
        let merges = [6, 11]
            .into_iter()
            .map(|c| MergedRange {
                first_row: 0,
                first_col: c,
                last_row: 0,
                last_col: c + 4,
            })
            .collect();
        Sheet::new("Sheet1", rows, merges)
    }

    fn child_row(name: &str, nik: &str, p1: [Cell; 5], p2: [Cell; 5]) -> Vec<Cell> {
        let mut row = vec![
            Cell::from(1_i64),
            Cell::from("Melati"),
            Cell::from(nik),
            Cell::from(name),
            Cell::from("2023-01-10"),
            Cell::from("l"),
        ];
        row.extend(p1);
        row.extend(p2);
        row
    }

    fn blank5() -> [Cell; 5] {
        [Cell::Empty, Cell::Empty, Cell::Empty, Cell::Empty, Cell::Empty]
    }

    #[test]
    fn test_parse_merged_sheet() {
        let sheet = merged_fixture(vec![child_row(
            "Andi",
            "3201",
            [
                Cell::from("2024-01-15"),
                Cell::from(12.0),
                Cell::from(9.5),
                Cell::from(75.2),
                Cell::from("berdiri"),
            ],
            [Cell::Empty, Cell::from(13.0), Cell::Empty, Cell::from(74.0), Cell::Empty],
        )]);
        let parsed = parse_sheet(&sheet).unwrap();
        assert_eq!(parsed.periods, vec!["JAN 2024", "FEB 2024"]);
        assert_eq!(parsed.children.len(), 1);

        let child = &parsed.children[0];
        assert_eq!(child.number, Some(1));
        assert_eq!(child.location.as_deref(), Some("Melati"));
        assert_eq!(child.gender.as_deref(), Some("L"));
        assert_eq!(child.birth_date.as_deref(), Some("2023-01-10"));
        assert_eq!(child.measurements.len(), 2);

        let first = &child.measurements[0];
        assert_eq!(first.period, "JAN 2024");
        assert_eq!(first.measured_on.as_deref(), Some("2024-01-15"));
        assert_eq!(first.age_months, Some(12));
        assert_eq!(first.weight_kg, Some(dec!(9.5)));
        assert_eq!(first.method.as_deref(), Some("BERDIRI"));
        assert!(first.has_complete_data);

        let second = &child.measurements[1];
        assert_eq!(second.weight_kg, None);
        assert_eq!(second.height_cm, Some(dec!(74)));
    }

    #[test]
    fn test_blank_period_omitted() {
        let sheet = merged_fixture(vec![child_row(
            "Andi",
            "3201",
            blank5(),
            [Cell::Empty, Cell::Empty, Cell::from(9.5), Cell::Empty, Cell::Empty],
        )]);
        let parsed = parse_sheet(&sheet).unwrap();
        let child = &parsed.children[0];
        assert_eq!(child.measurements.len(), 1);
        assert_eq!(child.measurements[0].period, "FEB 2024");
        assert!(child.measurements[0].has_complete_data);
        assert!(!child.measurements[0].is_incomplete);
    }

    #[test]
    fn test_unparseable_fields_become_null() {
        let sheet = merged_fixture(vec![child_row(
            "Andi",
            "3201",
            [
                Cell::from("kemarin"),
                Cell::from("dua belas"),
                Cell::from("berat?"),
                Cell::Empty,
                Cell::Empty,
            ],
            blank5(),
        )]);
        let parsed = parse_sheet(&sheet).unwrap();
        let m = &parsed.children[0].measurements[0];
        assert_eq!(m.measured_on.as_deref(), Some("kemarin"));
        assert_eq!(m.age_months, None);
        assert_eq!(m.weight_kg, None);
        assert!(!m.has_complete_data);
        assert!(m.is_incomplete);
    }

    #[test]
    fn test_period_kept_on_raw_cell_even_when_nothing_parses() {
        let sheet = merged_fixture(vec![child_row(
            "Andi",
            "3201",
            [Cell::Empty, Cell::from("dua belas"), Cell::Empty, Cell::Empty, Cell::Empty],
            blank5(),
        )]);
        let parsed = parse_sheet(&sheet).unwrap();
        let measurements = &parsed.children[0].measurements;
        assert_eq!(measurements.len(), 1);
        assert_eq!(measurements[0].age_months, None);
        assert!(measurements[0].is_incomplete);
    }

    #[test]
    fn test_blank_and_anonymous_rows_dropped() {
        let mut anonymous = vec![Cell::from(2_i64)];
        anonymous.extend(text_row(&["Mawar", "", "", "", "P"]));
        let sheet = merged_fixture(vec![
            vec![Cell::Empty; 16],
            anonymous,
            child_row("", "3202", blank5(), blank5()),
        ]);
        let parsed = parse_sheet(&sheet).unwrap();
        assert_eq!(parsed.children.len(), 1);
        assert_eq!(parsed.children[0].nik.as_deref(), Some("3202"));
        assert_eq!(parsed.children[0].name, None);
        assert!(parsed.children[0].measurements.is_empty());
        assert_eq!(parsed.skipped_rows, 1);
    }

    #[test]
    fn test_direct_layout_reads_from_second_row() {
        let mut first = vec![
            Cell::from(1_i64),
            Cell::from("3201"),
            Cell::from("Andi"),
            Cell::from("2023-01-10"),
            Cell::from("L"),
        ];
        first.extend([
            Cell::from("2025-01-05"),
            Cell::from(24.0),
            Cell::from(12.0),
            Cell::from(86.0),
            Cell::from("BERDIRI"),
        ]);
        let mut second = vec![
            Cell::from(2_i64),
            Cell::from("3202"),
            Cell::from("Sari"),
            Cell::from("2023-03-01"),
            Cell::from("P"),
        ];
        second.extend([
            Cell::from("2025-01-06"),
            Cell::from(22.0),
            Cell::from(10.5),
            Cell::from(83.5),
            Cell::from("BERDIRI"),
        ]);
        let sheet = Sheet::new("Sheet1", vec![first, second], vec![]);

        let parsed = parse_sheet(&sheet).unwrap();
        assert_eq!(parsed.layout, SheetLayout::Direct);
        assert_eq!(parsed.periods, vec!["Jan 2025"]);
        assert_eq!(parsed.children.len(), 1);
        let child = &parsed.children[0];
        assert_eq!(child.name.as_deref(), Some("Sari"));
        assert_eq!(child.location, None);
        assert_eq!(child.measurements[0].height_cm, Some(dec!(83.5)));
    }

    #[test]
    fn test_unrecognized_sheet_is_an_error() {
        let sheet = Sheet::new("Sheet1", vec![text_row(&["NO"])], vec![]);
        assert!(matches!(
            parse_sheet(&sheet),
            Err(SitrackError::FormatUnrecognized(_))
        ));
    }
}
