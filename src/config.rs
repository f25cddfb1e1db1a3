//! Configuration for a pipeline run.

use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Inclusive funding-year window applied by the year filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self {
            start: 2021,
            end: 2023,
        }
    }
}

/// Settings shared by the loader, the exporters and the menu shell.
///
/// ```rust,ignore
/// let config = PipelineConfig::default()
///     .with_source_path("data/projects.csv")
///     .with_output_dir("reports");
/// config.validate()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// CSV file to load.
    /// Default: "dpwh_flood_control_projects.csv"
    pub source_path: PathBuf,

    /// Directory receiving the three report CSVs and `summary.json`.
    /// Created if absent.
    /// Default: "output"
    pub output_dir: PathBuf,

    /// Funding years kept after cleaning.
    /// Default: 2021..=2023
    pub year_range: YearRange,

    /// Rows shown per report in the console preview.
    /// Default: 5
    pub preview_rows: usize,

    /// Row errors listed after a load before collapsing into a count.
    /// Default: 10
    pub error_preview_limit: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from("dpwh_flood_control_projects.csv"),
            output_dir: PathBuf::from("output"),
            year_range: YearRange::default(),
            preview_rows: 5,
            error_preview_limit: 10,
        }
    }
}

impl PipelineConfig {
    pub fn with_source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = path.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_year_range(mut self, start: i32, end: i32) -> Self {
        self.year_range = YearRange::new(start, end);
        self
    }

    pub fn with_preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = rows;
        self
    }

    pub fn with_error_preview_limit(mut self, limit: usize) -> Self {
        self.error_preview_limit = limit;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.source_path.as_os_str().is_empty() {
            return Err(ReportError::InvalidConfig(
                "source path must not be empty".to_string(),
            ));
        }
        if self.year_range.start > self.year_range.end {
            return Err(ReportError::InvalidConfig(format!(
                "start year {} is after end year {}",
                self.year_range.start, self.year_range.end
            )));
        }
        Ok(())
    }
}
