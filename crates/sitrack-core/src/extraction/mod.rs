pub mod workbook;

use chrono::NaiveDateTime;
use std::fmt;

use crate::error::SitrackError;

static BLANK: Cell = Cell::Empty;

/// A single spreadsheet cell, reduced to the value kinds the engine cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Cell {
    /// True for empty cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Trimmed textual form of the cell, `None` when blank.
    pub fn text(&self) -> Option<String> {
        if self.is_blank() {
            return None;
        }
        let s = self.to_string();
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Number(n) => write!(f, "{}", format_number(*n)),
            Cell::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Cell::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell::Number(n as f64)
    }
}

impl From<NaiveDateTime> for Cell {
    fn from(dt: NaiveDateTime) -> Self {
        Cell::DateTime(dt)
    }
}

/// Render a number the way a spreadsheet user would type it: integral
/// values (row numbers, NIKs stored as numbers) carry no trailing ".0".
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// A merged cell region, 0-based and inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergedRange {
    pub first_row: usize,
    pub first_col: usize,
    pub last_row: usize,
    pub last_col: usize,
}

impl MergedRange {
    pub fn is_single_row(&self, row: usize) -> bool {
        self.first_row == row && self.last_row == row
    }
}

/// The active worksheet of an uploaded workbook as a dense grid.
///
/// Rows are padded to a common width so positional access never has to
/// care about ragged rows. Coordinates are 0-based.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub name: String,
    rows: Vec<Vec<Cell>>,
    width: usize,
    merged: Vec<MergedRange>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, mut rows: Vec<Vec<Cell>>, merged: Vec<MergedRange>) -> Self {
        // Trailing fully blank rows carry no information and would count as data rows.
        while rows.last().is_some_and(|r| r.iter().all(Cell::is_blank)) {
            rows.pop();
        }
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, Cell::Empty);
        }
        Sheet {
            name: name.into(),
            rows,
            width,
            merged,
        }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&BLANK)
    }

    /// A full row, or an empty slice past the end of the sheet.
    pub fn row(&self, row: usize) -> &[Cell] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn merged_regions(&self) -> &[MergedRange] {
        &self.merged
    }

    pub fn is_blank(&self) -> bool {
        self.rows.iter().flatten().all(Cell::is_blank)
    }
}

/// Trait for workbook reading backends.
pub trait SheetReader: Send + Sync {
    /// Read the active sheet of a workbook from its raw bytes.
    fn read_sheet(&self, bytes: &[u8]) -> Result<Sheet, SitrackError>;

    /// Name of this reading backend (for diagnostics).
    fn backend_name(&self) -> &str;
}
