use sitrack_core::compliance;
use sitrack_core::error::SitrackError;
use sitrack_core::extraction::workbook::CalamineReader;
use std::path::Path;

use crate::output;

/// Print the template report; an invalid workbook ends in an error so the
/// process exits non-zero.
pub fn run(input_file: &Path, output_format: &str) -> Result<(), SitrackError> {
    let (_, report) = compliance::check_file(input_file, &CalamineReader::new());

    match output_format {
        "json" => output::json::print(&report)?,
        _ => output::table::print_report(&report),
    }

    report.into_result().map(|_| ())
}
