//! Error types for the report pipeline.
//!
//! Only run-level failures live here. Problems with individual rows are
//! collected as diagnostics in [`crate::loader::LoadReport`] and never abort
//! a load.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    /// The source file does not exist.
    #[error("Source file not found: {}", .0.display())]
    SourceMissing(PathBuf),

    /// The header lacks one or more required columns.
    #[error("Source is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// Every row was rejected or filtered out.
    #[error("No valid rows after cleaning ({total} rows read)")]
    NoValidRows { total: usize },

    /// Reports were requested before a successful load.
    #[error("No data loaded. Please load the file first")]
    NoDataLoaded,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Writing an export file failed. Earlier files are left in place.
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: Box<ReportError>,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReportError {
    /// Wrap an export failure with the path being written.
    pub fn writing(path: impl Into<PathBuf>, source: impl Into<ReportError>) -> Self {
        ReportError::Write {
            path: path.into(),
            source: Box::new(source.into()),
        }
    }

    /// Stable code the shell can branch on.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SourceMissing(_) => "SOURCE_MISSING",
            Self::MissingColumns(_) => "MISSING_COLUMNS",
            Self::NoValidRows { .. } => "NO_VALID_ROWS",
            Self::NoDataLoaded => "NO_DATA_LOADED",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Write { .. } => "WRITE_FAILED",
            Self::Csv(_) => "CSV_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
        }
    }

    /// True for failures the user can fix and retry from the menu.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::SourceMissing(_) | Self::NoDataLoaded | Self::NoValidRows { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
