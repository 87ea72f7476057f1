use sitrack_core::error::SitrackError;
use sitrack_core::extraction::workbook::CalamineReader;
use sitrack_core::extraction::SheetReader;
use sitrack_core::parsing::detect::{self, SheetLayout};
use std::path::Path;

pub fn run(input_file: &Path) -> Result<(), SitrackError> {
    let bytes = std::fs::read(input_file)?;
    let sheet = CalamineReader::new().read_sheet(&bytes)?;
    let layout = detect::detect(&sheet);
    let (_, message) = detect::validate_format(&sheet);

    println!("Sheet:   {}", sheet.name);
    println!("Layout:  {}", layout.kind());
    println!("         {message}");
    if let SheetLayout::MergedHeader { periods } = &layout {
        println!("Periods: {}", periods.join(", "));
    }
    Ok(())
}
