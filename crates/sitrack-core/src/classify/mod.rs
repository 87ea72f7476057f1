pub mod height;
pub mod nutrition;

pub use height::validate_height_trend;
pub use nutrition::classify_measurement;

use crate::model::ChildRecord;
use crate::reference::ReferenceTable;

/// Annotate every measurement of one child: height trend first, then
/// weight and height status against the reference table.
pub fn annotate_child(child: &mut ChildRecord, table: &ReferenceTable) {
    validate_height_trend(&mut child.measurements);
    let gender = child.gender.as_deref();
    for measurement in &mut child.measurements {
        classify_measurement(measurement, gender, table);
    }
}

/// Annotate all children of a sheet.
pub fn annotate(children: &mut [ChildRecord], table: &ReferenceTable) {
    for child in children {
        annotate_child(child, table);
    }
}
