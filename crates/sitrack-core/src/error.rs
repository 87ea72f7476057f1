use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SitrackError {
    #[error("failed to read {}: {reason}", path.display())]
    FileUnreadable { path: PathBuf, reason: String },

    #[error("failed to open workbook: {0}")]
    Workbook(String),

    #[error("file is {size} bytes, above the {limit} byte upload limit")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("unsupported spreadsheet layout: {0}")]
    FormatUnrecognized(String),

    #[error("file does not follow the template: {}", errors.join("; "))]
    TemplateNonCompliant { errors: Vec<String> },

    #[error("could not process {file_name}: {message}")]
    Processing { file_name: String, message: String },

    #[error("failed to load reference table from {}: {reason}", path.display())]
    ReferenceLoad { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
