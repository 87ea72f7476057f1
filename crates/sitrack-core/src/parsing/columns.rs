use serde::Serialize;
use tracing::debug;

use crate::error::SitrackError;
use crate::extraction::{Cell, Sheet};
use crate::parsing::detect::{SheetLayout, LABEL_ROW};
use crate::parsing::labels::{IdentityField, MeasurementField};

/// Measurement columns start after the six identity columns (column G).
pub const FIRST_MEASUREMENT_COLUMN: usize = 6;
/// Sub-columns per period: date, age, weight, height, method.
pub const GROUP_WIDTH: usize = 5;

/// Period names assigned by position in the flat-header layout.
pub const FLAT_HEADER_CALENDAR: [&str; 24] = [
    "Jan 2025", "Feb 2025", "Mar 2025", "Apr 2025", "May 2025", "Jun 2025", "Jul 2025", "Aug 2025",
    "Sep 2025", "Oct 2025", "Nov 2025", "Dec 2025", "Jan 2024", "Feb 2024", "Mar 2024", "Apr 2024",
    "May 2024", "Jun 2024", "Jul 2024", "Aug 2024", "Sep 2024", "Oct 2024", "Nov 2024", "Dec 2024",
];

/// Period names of the fixed blocks in the direct layout.
pub const DIRECT_CALENDAR: [&str; 9] = [
    "Jan 2025", "Feb 2025", "Mar 2025", "Apr 2025", "May 2025", "Jun 2025", "Jul 2025", "Aug 2025",
    "Sep 2025",
];

/// In the direct layout the first block starts right after five identity columns.
const DIRECT_FIRST_BLOCK: usize = 5;

/// One measurement period: its name and the sub-columns that feed it,
/// in column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodColumnGroup {
    pub period_name: String,
    pub columns: Vec<(usize, MeasurementField)>,
}

impl PeriodColumnGroup {
    /// Column holding `field`, if this group has one.
    pub fn column(&self, field: MeasurementField) -> Option<usize> {
        self.columns
            .iter()
            .find(|(_, f)| *f == field)
            .map(|(col, _)| *col)
    }

    pub fn is_partial(&self) -> bool {
        self.columns.len() < GROUP_WIDTH
    }
}

/// Where period names come from while mapping labeled columns.
#[derive(Debug, Clone, Copy)]
pub enum PeriodNaming<'a> {
    /// Captions read from the sheet; missing ones become "Periode n".
    Captions(&'a [String]),
    /// A fixed calendar; groups beyond its length are dropped.
    Calendar(&'static [&'static str]),
}

impl PeriodNaming<'_> {
    fn name(&self, index: usize) -> Option<String> {
        match self {
            PeriodNaming::Captions(names) => Some(
                names
                    .get(index)
                    .cloned()
                    .unwrap_or_else(|| format!("Periode {}", index + 1)),
            ),
            PeriodNaming::Calendar(names) => names.get(index).map(|s| s.to_string()),
        }
    }
}

/// Partition labeled measurement columns into period groups.
///
/// Scans the label row from column G, collecting cells whose label is one of
/// the five measurement labels. Every fifth match closes a group; a trailing
/// partial group is kept so that a period missing e.g. CARA UKUR still yields
/// its other fields.
pub fn map_labeled_columns(label_row: &[Cell], naming: PeriodNaming<'_>) -> Vec<PeriodColumnGroup> {
    let mut groups = Vec::new();
    let mut pending: Vec<(usize, MeasurementField)> = Vec::with_capacity(GROUP_WIDTH);

    for (col, cell) in label_row.iter().enumerate().skip(FIRST_MEASUREMENT_COLUMN) {
        let Some(field) = cell.text().and_then(|t| MeasurementField::from_label(&t)) else {
            continue;
        };
        pending.push((col, field));
        if pending.len() == GROUP_WIDTH {
            let columns = std::mem::take(&mut pending);
            match naming.name(groups.len()) {
                Some(period_name) => groups.push(PeriodColumnGroup {
                    period_name,
                    columns,
                }),
                None => debug!(column = col, "measurement group beyond calendar dropped"),
            }
        }
    }

    if !pending.is_empty() {
        if let Some(period_name) = naming.name(groups.len()) {
            debug!(
                period = %period_name,
                sub_columns = pending.len(),
                "keeping partial measurement group"
            );
            groups.push(PeriodColumnGroup {
                period_name,
                columns: pending,
            });
        }
    }

    groups
}

/// Fixed five-column blocks of the direct layout that fit within `width`.
pub fn direct_groups(width: usize) -> Vec<PeriodColumnGroup> {
    DIRECT_CALENDAR
        .iter()
        .enumerate()
        .map(|(i, name)| (DIRECT_FIRST_BLOCK + i * GROUP_WIDTH, name))
        .take_while(|(base, _)| base + GROUP_WIDTH <= width)
        .map(|(base, name)| PeriodColumnGroup {
            period_name: name.to_string(),
            columns: MeasurementField::ALL
                .into_iter()
                .enumerate()
                .map(|(offset, field)| (base + offset, field))
                .collect(),
        })
        .collect()
}

/// Everything the record extractor needs to walk a sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPlan {
    /// Column of each identity field, in [`IdentityField::ALL`] order.
    pub identity: [Option<usize>; 6],
    pub groups: Vec<PeriodColumnGroup>,
    /// First 0-based row holding child data.
    pub first_data_row: usize,
}

impl ColumnPlan {
    pub fn identity_column(&self, field: IdentityField) -> Option<usize> {
        IdentityField::ALL
            .iter()
            .position(|f| *f == field)
            .and_then(|i| self.identity[i])
    }

    pub fn period_names(&self) -> Vec<String> {
        self.groups.iter().map(|g| g.period_name.clone()).collect()
    }
}

/// Build the column plan for a detected layout.
pub fn plan(sheet: &Sheet, layout: &SheetLayout) -> Result<ColumnPlan, SitrackError> {
    let label_row = sheet.row(LABEL_ROW);
    let mapped_identity = [Some(0), Some(1), Some(2), Some(3), Some(4), Some(5)];

    let plan = match layout {
        SheetLayout::MergedHeader { periods } => ColumnPlan {
            identity: mapped_identity,
            groups: map_labeled_columns(label_row, PeriodNaming::Captions(periods)),
            first_data_row: LABEL_ROW + 1,
        },
        SheetLayout::TraditionalHeader => ColumnPlan {
            identity: mapped_identity,
            groups: map_labeled_columns(label_row, PeriodNaming::Captions(&[])),
            first_data_row: LABEL_ROW + 1,
        },
        SheetLayout::FlatHeader => ColumnPlan {
            identity: mapped_identity,
            groups: map_labeled_columns(label_row, PeriodNaming::Calendar(&FLAT_HEADER_CALENDAR)),
            first_data_row: LABEL_ROW + 1,
        },
        SheetLayout::Direct => ColumnPlan {
            // NO, NIK, NAMA ANAK, TANGGAL LAHIR, JENIS KELAMIN; no TEMPAT column
            identity: [Some(0), None, Some(1), Some(2), Some(3), Some(4)],
            groups: direct_groups(sheet.width()),
            first_data_row: LABEL_ROW,
        },
        SheetLayout::Unrecognized => {
            return Err(SitrackError::FormatUnrecognized(layout.description()));
        }
    };

    debug!(
        layout = %layout.kind(),
        periods = plan.groups.len(),
        first_data_row = plan.first_data_row,
        "column plan built"
    );
    Ok(plan)
}
