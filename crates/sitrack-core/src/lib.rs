pub mod classify;
pub mod compliance;
pub mod error;
pub mod extraction;
pub mod model;
pub mod parsing;
pub mod reference;
pub mod review;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

use error::SitrackError;
use extraction::{Sheet, SheetReader};
use model::ChildRecord;
use parsing::detect::FormatKind;
use reference::ReferenceTable;

/// Upload ceiling enforced by [`process_file`]: 16 MiB.
pub const MAX_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Options for the file-level entry point.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub max_file_size: u64,
    /// Run the template compliance check before extracting and fail on
    /// sheets it rejects.
    pub enforce_template: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            max_file_size: MAX_FILE_SIZE,
            enforce_template: false,
        }
    }
}

/// A fully processed sheet: every child extracted and annotated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedSheet {
    pub file_name: String,
    pub format_type: String,
    pub total_children: usize,
    pub total_periods: usize,
    pub periods: Vec<String>,
    pub children: Vec<ChildRecord>,
}

/// Counts over a processed sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SheetSummary {
    pub children: usize,
    pub measurements: usize,
    pub complete_measurements: usize,
    pub weight_status: BTreeMap<String, usize>,
    pub height_status: BTreeMap<String, usize>,
    pub height_trend: BTreeMap<String, usize>,
}

impl ProcessedSheet {
    pub fn summary(&self) -> SheetSummary {
        let mut summary = SheetSummary {
            children: self.children.len(),
            ..Default::default()
        };
        for m in self.children.iter().flat_map(|c| &c.measurements) {
            summary.measurements += 1;
            if m.has_complete_data {
                summary.complete_measurements += 1;
            }
            *summary.weight_status.entry(m.weight_status.to_string()).or_default() += 1;
            *summary.height_status.entry(m.height_status.to_string()).or_default() += 1;
            *summary.height_trend.entry(m.height_trend.to_string()).or_default() += 1;
        }
        summary
    }
}

/// Result of the outermost processing call. Failures carry a user-facing
/// `error` message in place of the data fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProcessOutcome {
    Processed(ProcessedSheet),
    Failed {
        file_name: String,
        error: String,
        format_detected: FormatKind,
    },
}

impl ProcessOutcome {
    fn failed(file_name: &str, format_detected: FormatKind, error: &SitrackError) -> Self {
        warn!(file = file_name, format = %format_detected, error = %error, "processing failed");
        ProcessOutcome::Failed {
            file_name: file_name.to_string(),
            error: error.to_string(),
            format_detected,
        }
    }

    pub fn file_name(&self) -> &str {
        match self {
            ProcessOutcome::Processed(sheet) => &sheet.file_name,
            ProcessOutcome::Failed { file_name, .. } => file_name,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ProcessOutcome::Processed(_) => None,
            ProcessOutcome::Failed { error, .. } => Some(error),
        }
    }

    pub fn sheet(&self) -> Option<&ProcessedSheet> {
        match self {
            ProcessOutcome::Processed(sheet) => Some(sheet),
            ProcessOutcome::Failed { .. } => None,
        }
    }
}

/// Extract and annotate an already loaded sheet.
pub fn process_sheet(
    file_name: &str,
    sheet: &Sheet,
    table: &ReferenceTable,
) -> Result<ProcessedSheet, SitrackError> {
    let mut parsed = parsing::parse_sheet(sheet)?;
    classify::annotate(&mut parsed.children, table);

    info!(
        file = file_name,
        layout = %parsed.layout.kind(),
        children = parsed.children.len(),
        "sheet processed"
    );

    Ok(ProcessedSheet {
        file_name: file_name.to_string(),
        format_type: parsed.layout.format_name().to_string(),
        total_children: parsed.children.len(),
        total_periods: parsed.periods.len(),
        periods: parsed.periods,
        children: parsed.children,
    })
}

/// Main API entry point: process raw workbook bytes. Never fails; errors are
/// reported through [`ProcessOutcome::Failed`].
pub fn process_bytes(
    file_name: &str,
    bytes: &[u8],
    reader: &dyn SheetReader,
    table: &ReferenceTable,
    options: &EngineOptions,
) -> ProcessOutcome {
    let sheet = match reader.read_sheet(bytes) {
        Ok(sheet) => sheet,
        Err(e) => return ProcessOutcome::failed(file_name, FormatKind::Error, &e),
    };

    if options.enforce_template {
        if let Err(e) = compliance::check_sheet(&sheet).into_result() {
            let kind = parsing::detect::detect(&sheet).kind();
            return ProcessOutcome::failed(file_name, kind, &e);
        }
    }

    match process_sheet(file_name, &sheet, table) {
        Ok(processed) => ProcessOutcome::Processed(processed),
        Err(e) => ProcessOutcome::failed(file_name, FormatKind::Unrecognized, &e),
    }
}

/// Process a workbook on disk, enforcing the upload size ceiling.
pub fn process_file(
    path: &Path,
    reader: &dyn SheetReader,
    table: &ReferenceTable,
    options: &EngineOptions,
) -> ProcessOutcome {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    match read_bounded(path, options.max_file_size) {
        Ok(bytes) => process_bytes(&file_name, &bytes, reader, table, options),
        Err(e) => ProcessOutcome::failed(&file_name, FormatKind::Error, &e),
    }
}

fn read_bounded(path: &Path, limit: u64) -> Result<Vec<u8>, SitrackError> {
    let unreadable = |e: std::io::Error| SitrackError::FileUnreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };
    let size = std::fs::metadata(path).map_err(unreadable)?.len();
    if size > limit {
        return Err(SitrackError::FileTooLarge { size, limit });
    }
    std::fs::read(path).map_err(unreadable)
}
