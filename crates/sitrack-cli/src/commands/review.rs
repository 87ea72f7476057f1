use sitrack_core::error::SitrackError;
use sitrack_core::{reference, review, EngineOptions};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::output;

pub fn run(
    input_file: &Path,
    reference_path: &Path,
    csv_file: Option<PathBuf>,
) -> Result<(), SitrackError> {
    let table = reference::init(reference_path);
    let processed = super::process(input_file, table, &EngineOptions::default())?;
    let rows = review::review(&processed.children);

    output::table::print_review(&rows);

    if let Some(path) = csv_file {
        review::write_csv(&rows, BufWriter::new(File::create(&path)?))?;
        eprintln!("{} review row(s) written to {}", rows.len(), path.display());
    }
    Ok(())
}
