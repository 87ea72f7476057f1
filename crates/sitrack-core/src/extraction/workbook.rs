use std::io::Cursor;

use calamine::{Data, DataType, Dimensions, Range, Reader, Xls, Xlsx};

use crate::error::SitrackError;
use crate::extraction::{Cell, MergedRange, Sheet, SheetReader};

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const CFB_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Spreadsheet container formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// Office Open XML workbook (.xlsx).
    Xlsx,
    /// Legacy BIFF workbook (.xls).
    Xls,
}

impl Container {
    /// Identify the container from its leading magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Container> {
        if bytes.starts_with(ZIP_MAGIC) {
            Some(Container::Xlsx)
        } else if bytes.starts_with(CFB_MAGIC) {
            Some(Container::Xls)
        } else {
            None
        }
    }
}

/// Workbook backend built on calamine.
///
/// Only the first worksheet is read, together with its merged regions.
pub struct CalamineReader;

impl CalamineReader {
    pub fn new() -> Self {
        CalamineReader
    }
}

impl Default for CalamineReader {
    fn default() -> Self {
        Self::new()
    }
}

impl SheetReader for CalamineReader {
    fn read_sheet(&self, bytes: &[u8]) -> Result<Sheet, SitrackError> {
        match Container::sniff(bytes) {
            Some(Container::Xlsx) => read_xlsx(bytes),
            Some(Container::Xls) => read_xls(bytes),
            None => Err(SitrackError::Workbook(
                "not an Excel workbook (.xlsx or .xls)".into(),
            )),
        }
    }

    fn backend_name(&self) -> &str {
        "calamine"
    }
}

fn read_xlsx(bytes: &[u8]) -> Result<Sheet, SitrackError> {
    let mut workbook: Xlsx<_> = calamine::open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e| SitrackError::Workbook(format!("failed to open xlsx: {e}")))?;

    let name = first_sheet_name(workbook.sheet_names())?;
    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| SitrackError::Workbook(format!("sheet '{name}' unreadable: {e}")))?;

    workbook
        .load_merged_regions()
        .map_err(|e| SitrackError::Workbook(format!("failed to read merged cells: {e}")))?;
    let merged = merged_ranges(
        workbook
            .merged_regions_by_sheet(&name)
            .into_iter()
            .map(|(_, _, dims)| dims),
    );

    Ok(Sheet::new(name, range_to_rows(&range), merged))
}

fn read_xls(bytes: &[u8]) -> Result<Sheet, SitrackError> {
    let mut workbook: Xls<_> = calamine::open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e| SitrackError::Workbook(format!("failed to open xls: {e}")))?;

    let name = first_sheet_name(workbook.sheet_names())?;
    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| SitrackError::Workbook(format!("sheet '{name}' unreadable: {e}")))?;

    let merged = merged_ranges(
        workbook
            .worksheet_merge_cells(&name)
            .unwrap_or_default()
            .iter(),
    );

    Ok(Sheet::new(name, range_to_rows(&range), merged))
}

fn first_sheet_name(names: Vec<String>) -> Result<String, SitrackError> {
    names
        .into_iter()
        .next()
        .ok_or_else(|| SitrackError::Workbook("workbook contains no sheets".into()))
}

fn merged_ranges<'a>(dims: impl IntoIterator<Item = &'a Dimensions>) -> Vec<MergedRange> {
    dims.into_iter()
        .map(|d| MergedRange {
            first_row: d.start.0 as usize,
            first_col: d.start.1 as usize,
            last_row: d.end.0 as usize,
            last_col: d.end.1 as usize,
        })
        .collect()
}

/// Copy a calamine range into a grid anchored at A1.
///
/// calamine ranges start at the first used cell, so leading empty rows and
/// columns are restored to keep positional column rules valid.
fn range_to_rows(range: &Range<Data>) -> Vec<Vec<Cell>> {
    let Some((end_row, end_col)) = range.end() else {
        return Vec::new();
    };

    (0..=end_row)
        .map(|r| {
            (0..=end_col)
                .map(|c| range.get_value((r, c)).map(convert_cell).unwrap_or(Cell::Empty))
                .collect()
        })
        .collect()
}

fn convert_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map(Cell::DateTime)
            .unwrap_or_else(|| Cell::Text(cell.to_string())),
        Data::Error(e) => {
            tracing::debug!(error = %e, "spreadsheet error cell read as blank");
            Cell::Empty
        }
        _ => Cell::Text(cell.to_string()),
    }
}
