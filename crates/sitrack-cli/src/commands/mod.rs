pub mod check;
pub mod detect;
pub mod parse;
pub mod reference;
pub mod review;

use sitrack_core::error::SitrackError;
use sitrack_core::extraction::workbook::CalamineReader;
use sitrack_core::reference::ReferenceTable;
use sitrack_core::{EngineOptions, ProcessOutcome, ProcessedSheet};
use std::path::Path;

/// Run the full engine on a workbook, turning a failed outcome into an error.
pub(crate) fn process(
    input_file: &Path,
    table: &ReferenceTable,
    options: &EngineOptions,
) -> Result<ProcessedSheet, SitrackError> {
    let reader = CalamineReader::new();
    match sitrack_core::process_file(input_file, &reader, table, options) {
        ProcessOutcome::Processed(sheet) => Ok(sheet),
        ProcessOutcome::Failed {
            file_name, error, ..
        } => Err(SitrackError::Processing {
            file_name,
            message: error,
        }),
    }
}
