//! Report generator for the DPWH flood control projects dataset.
//!
//! The pipeline runs in one direction:
//!
//! raw CSV rows → [`cleaning`] → [`transform`] (derive, impute, year filter)
//! → [`reports`] → [`output`] (three CSV reports and `summary.json`).
//!
//! [`loader::load`] and [`output::generate_reports`] are the two entry points;
//! [`session::Session`] keeps the loaded dataset between calls.

pub mod cleaning;
pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod reports;
pub mod session;
pub mod transform;
pub mod types;
pub mod util;

pub use config::{PipelineConfig, YearRange};
pub use error::{ReportError, Result};
pub use loader::{load, LoadReport, RowError};
pub use output::{generate_reports, GeneratedReports};
pub use session::Session;
pub use types::{CleanRecord, ProjectRecord, RawRow, SummaryStats, ValidationResult};
