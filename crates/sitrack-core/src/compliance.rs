use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::error::SitrackError;
use crate::extraction::{Sheet, SheetReader};
use crate::parsing::detect::{self, FormatKind, SheetLayout, LABEL_ROW};
use crate::parsing::labels::{identity_labels_in, measurement_labels_in, IdentityField};

const TEMPLATE_HINT: &str = "Use the reference template \"Data Test.xlsx\" for the correct layout.";

/// Result of the pre-flight template check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub format_detected: FormatKind,
    pub needs_template_download: bool,
}

impl ComplianceReport {
    fn rejected(format_detected: FormatKind, errors: Vec<String>) -> Self {
        ComplianceReport {
            valid: false,
            errors,
            warnings: Vec::new(),
            format_detected,
            needs_template_download: true,
        }
    }

    /// Convert a rejection into an error value for callers that use `?`.
    pub fn into_result(self) -> Result<Self, SitrackError> {
        if self.valid {
            Ok(self)
        } else {
            Err(SitrackError::TemplateNonCompliant {
                errors: self.errors,
            })
        }
    }
}

/// Check that a sheet follows one of the officially supported templates:
/// the merged-header or flat-header layout.
///
/// Direct and traditional sheets are rejected here even though the
/// extractor can read them.
pub fn check_sheet(sheet: &Sheet) -> ComplianceReport {
    if sheet.height() <= LABEL_ROW || sheet.is_blank() {
        return ComplianceReport::rejected(
            FormatKind::Unrecognized,
            vec!["The Excel file is empty".into()],
        );
    }

    let layout = detect::detect(sheet);
    let kind = layout.kind();
    let header = sheet.row(LABEL_ROW);
    let mut warnings = Vec::new();

    match layout {
        SheetLayout::MergedHeader { .. } => {
            let found = identity_labels_in(header);
            let missing: Vec<&str> = IdentityField::MANDATORY
                .iter()
                .filter(|f| !found.contains(*f))
                .map(|f| f.label())
                .collect();
            if !missing.is_empty() {
                return ComplianceReport::rejected(
                    kind,
                    vec![
                        format!(
                            "Template incomplete. Missing mandatory columns: {}",
                            missing.join(", ")
                        ),
                        TEMPLATE_HINT.into(),
                    ],
                );
            }
        }
        SheetLayout::FlatHeader => {
            let found = measurement_labels_in(header).len();
            if found < 3 {
                warnings.push(format!(
                    "Only {found} of the 5 expected measurement headers were found"
                ));
            }
        }
        _ => {
            return ComplianceReport::rejected(
                kind,
                vec![
                    "The file does not follow the agreed template.".into(),
                    TEMPLATE_HINT.into(),
                ],
            );
        }
    }

    if sheet.height() <= LABEL_ROW + 1 {
        return ComplianceReport::rejected(
            kind,
            vec![
                "The file must contain at least one child data row".into(),
                TEMPLATE_HINT.into(),
            ],
        );
    }

    ComplianceReport {
        valid: true,
        errors: Vec::new(),
        warnings,
        format_detected: kind,
        needs_template_download: false,
    }
}

/// Check raw workbook bytes. A workbook that cannot be opened yields a
/// report with format `error`.
pub fn check_bytes(bytes: &[u8], reader: &dyn SheetReader) -> ComplianceReport {
    match reader.read_sheet(bytes) {
        Ok(sheet) => check_sheet(&sheet),
        Err(e) => {
            warn!(backend = reader.backend_name(), error = %e, "workbook unreadable during check");
            ComplianceReport::rejected(FormatKind::Error, vec![format!("Error reading file: {e}")])
        }
    }
}

/// Check a workbook on disk. Returns the validity flag alongside the report.
pub fn check_file(path: &Path, reader: &dyn SheetReader) -> (bool, ComplianceReport) {
    let report = match std::fs::read(path) {
        Ok(bytes) => check_bytes(&bytes, reader),
        Err(e) => ComplianceReport::rejected(
            FormatKind::Error,
            vec![format!("Error reading file: {e}")],
        ),
    };
    info!(
        path = %path.display(),
        valid = report.valid,
        format = %report.format_detected,
        "template check finished"
    );
    (report.valid, report)
}
