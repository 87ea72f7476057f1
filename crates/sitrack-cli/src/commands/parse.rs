use sitrack_core::error::SitrackError;
use sitrack_core::{reference, EngineOptions};
use std::path::{Path, PathBuf};

use crate::output;

pub fn run(
    input_file: &Path,
    reference_path: &Path,
    output_format: &str,
    output_file: Option<PathBuf>,
    strict: bool,
) -> Result<(), SitrackError> {
    let table = reference::init(reference_path);
    let options = EngineOptions {
        enforce_template: strict,
        ..Default::default()
    };
    let processed = super::process(input_file, table, &options)?;

    match output_file {
        Some(path) => {
            // Always write JSON when saving to file
            let json = serde_json::to_string_pretty(&processed)?;
            std::fs::write(&path, json)?;
            eprintln!(
                "Processed {} child(ren) over {} period(s), written to {}",
                processed.total_children,
                processed.total_periods,
                path.display()
            );
        }
        None => match output_format {
            "json" => output::json::print(&processed)?,
            _ => output::table::print_processed(&processed),
        },
    }

    Ok(())
}
