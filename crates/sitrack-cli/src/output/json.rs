use serde::Serialize;
use sitrack_core::error::SitrackError;

pub fn print<T: Serialize>(value: &T) -> Result<(), SitrackError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
