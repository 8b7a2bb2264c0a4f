use std::path::PathBuf;

use thiserror::Error;

/// Library-level error type.
/// Every stage of the conversion pipeline returns `Result<T, CvError>`; the first
/// error aborts the run.
#[derive(Debug, Error)]
pub enum CvError {
    #[error("Line {line_number} looks like a section header but has extra content: \"{line}\"")]
    Format { line_number: usize, line: String },

    #[error("Couldn't find delimiter \"{delimiter}\" in rendered output")]
    DelimiterNotFound { delimiter: String },

    #[error("Unsupported writer for contact block: {0} (expected html or latex)")]
    UnsupportedWriter(String),

    #[error("File not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Invalid value for setting '{key}': \"{value}\"")]
    InvalidSetting { key: String, value: String },

    #[error("Template error: {0}")]
    Template(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("External collaborator error: {0}")]
    External(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CvError>;
