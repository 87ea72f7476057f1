use sitrack_core::error::SitrackError;
use sitrack_core::reference::{Bounds, ReferenceTable};
use std::path::Path;

use crate::output;

pub fn run(reference_path: &Path, age: Option<i32>, gender: Option<&str>) -> Result<(), SitrackError> {
    let table = ReferenceTable::try_load(reference_path)?;

    let (Some(age), Some(tag)) = (age, gender) else {
        output::table::print_reference(&table);
        return Ok(());
    };

    let show = |b: Option<Bounds>| b.map(|b| b.to_string()).unwrap_or_else(|| "-".into());
    match table.lookup_tag(age, tag) {
        Some(entry) => {
            println!("Age {age} months, gender {}", tag.trim().to_uppercase());
            println!("  Weight (kg): {}", show(entry.weight));
            println!("  Height (cm): {}", show(entry.height));
        }
        None => println!("No reference for age {age} months, gender '{tag}' (ages 0-59, gender L or P)"),
    }
    Ok(())
}
