//! State owned by the interactive shell between menu actions.

use crate::config::PipelineConfig;
use crate::error::{ReportError, Result};
use crate::loader::{self, LoadReport};
use crate::output::{self, GeneratedReports};
use crate::types::ProjectRecord;

/// Holds the configuration and the last successfully loaded dataset, so the
/// CSV is cleaned once and reports can be generated repeatedly.
#[derive(Debug, Default)]
pub struct Session {
    config: PipelineConfig,
    data: Option<Vec<ProjectRecord>>,
    last_load: Option<LoadReport>,
}

impl Session {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            data: None,
            last_load: None,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Change settings between actions, e.g. to point at another file.
    pub fn config_mut(&mut self) -> &mut PipelineConfig {
        &mut self.config
    }

    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }

    pub fn records(&self) -> Option<&[ProjectRecord]> {
        self.data.as_deref()
    }

    pub fn last_load(&self) -> Option<&LoadReport> {
        self.last_load.as_ref()
    }

    /// Load the configured source. A failed load keeps the previous dataset.
    pub fn load(&mut self) -> Result<&LoadReport> {
        self.config.validate()?;
        let (records, report) = loader::load(&self.config.source_path, self.config.year_range)?;
        self.data = Some(records);
        Ok(&*self.last_load.insert(report))
    }

    pub fn generate_reports(&self) -> Result<GeneratedReports> {
        let data = self.data.as_deref().ok_or(ReportError::NoDataLoaded)?;
        output::generate_reports(data, &self.config.output_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_before_load_fails() {
        let session = Session::default();
        assert!(!session.is_loaded());
        let err = session.generate_reports().unwrap_err();
        assert_eq!(err.error_code(), "NO_DATA_LOADED");
    }

    #[test]
    fn test_failed_load_leaves_session_empty() {
        let mut session =
            Session::new(PipelineConfig::default().with_source_path("/no/such/file.csv"));
        assert!(session.load().is_err());
        assert!(session.records().is_none());
        assert!(session.last_load().is_none());
    }
}
