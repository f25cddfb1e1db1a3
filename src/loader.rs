use crate::cleaning::{clean_row, validate_row};
use crate::config::YearRange;
use crate::error::{ReportError, Result};
use crate::transform::{add_derived_fields, filter_by_year_range, impute_coordinates};
use crate::types::{CleanRecord, ProjectRecord, RawRow, REQUIRED_COLUMNS};
use csv::ReaderBuilder;
use std::path::Path;
use tracing::{debug, info};

/// A rejected row and why. `row` is the 1-based line number in the file,
/// with the header on line 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub row: usize,
    pub reasons: Vec<String>,
}

/// Diagnostics from one load.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub total_rows: usize,
    pub valid_rows: usize,
    pub retained_rows: usize,
    pub imputed_coords: usize,
    pub row_errors: Vec<RowError>,
}

impl LoadReport {
    /// The first `limit` row errors as display lines, plus how many were left out.
    pub fn error_preview(&self, limit: usize) -> (Vec<String>, usize) {
        let lines = self
            .row_errors
            .iter()
            .take(limit)
            .map(|e| format!("Row {}: {}", e.row, e.reasons.join(", ")))
            .collect();
        (lines, self.row_errors.len().saturating_sub(limit))
    }
}

/// Column names must match exactly, since rows are decoded by header name.
fn check_headers(headers: &csv::StringRecord) -> Result<()> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ReportError::MissingColumns(missing))
    }
}

/// Load, clean, derive, impute and year-filter the source file.
///
/// Fails if the file is missing, lacks a required column, or leaves no rows
/// once cleaning and filtering are done. Bad rows are reported in the
/// returned [`LoadReport`] instead of failing the load.
pub fn load(path: &Path, years: YearRange) -> Result<(Vec<ProjectRecord>, LoadReport)> {
    if !path.is_file() {
        return Err(ReportError::SourceMissing(path.to_path_buf()));
    }
    info!("Reading file: {}", path.display());
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    check_headers(rdr.headers()?)?;

    let mut report = LoadReport::default();
    let mut cleaned: Vec<CleanRecord> = Vec::new();

    for (i, result) in rdr.deserialize::<RawRow>().enumerate() {
        report.total_rows += 1;
        let line = i + 2;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                debug!("Row {}: undecodable: {}", line, e);
                report.row_errors.push(RowError {
                    row: line,
                    reasons: vec![format!("CSV parse error: {}", e)],
                });
                continue;
            }
        };
        match clean_row(&row) {
            Some(rec) => cleaned.push(rec),
            None => {
                let validation = validate_row(&row);
                if validation.is_valid {
                    // Required numbers present but unparseable: dropped without a message.
                    debug!("Row {}: dropped, budget or cost not numeric", line);
                } else {
                    report.row_errors.push(RowError {
                        row: line,
                        reasons: validation.errors,
                    });
                }
            }
        }
    }
    report.valid_rows = cleaned.len();
    info!(
        "Raw records loaded: {}, valid: {}, invalid: {}",
        report.total_rows,
        report.valid_rows,
        report.row_errors.len()
    );

    let derived: Vec<ProjectRecord> = cleaned.into_iter().map(add_derived_fields).collect();
    let gaps: Vec<(bool, bool)> = derived
        .iter()
        .map(|r| (r.lat.is_none(), r.lon.is_none()))
        .collect();
    let imputed = impute_coordinates(derived);
    report.imputed_coords = imputed
        .iter()
        .zip(&gaps)
        .filter(|(r, (lat_gap, lon_gap))| {
            (*lat_gap && r.lat.is_some()) || (*lon_gap && r.lon.is_some())
        })
        .count();
    debug!("Imputed coordinates for {} rows", report.imputed_coords);

    let filtered = filter_by_year_range(imputed, years);
    report.retained_rows = filtered.len();
    info!(
        "{} rows retained for {}-{}",
        report.retained_rows, years.start, years.end
    );

    if filtered.is_empty() {
        return Err(ReportError::NoValidRows {
            total: report.total_rows,
        });
    }
    Ok((filtered, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "Region,MainIsland,FundingYear,ApprovedBudgetForContract,ContractCost,StartDate,ActualCompletionDate,ProjectLatitude,ProjectLongitude,Province,Contractor,TypeOfWork";

    fn csv_file(body: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "{}", HEADER).unwrap();
        write!(f, "{}", body).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn test_missing_source_is_distinct_error() {
        let err = load(Path::new("/definitely/not/here.csv"), YearRange::default()).unwrap_err();
        assert_eq!(err.error_code(), "SOURCE_MISSING");
    }

    #[test]
    fn test_no_valid_rows_is_distinct_error() {
        let f = csv_file(",Luzon,2021,100,90,,,,,,,\n");
        let err = load(f.path(), YearRange::default()).unwrap_err();
        assert_eq!(err.error_code(), "NO_VALID_ROWS");
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "Region,MainIsland,FundingYear").unwrap();
        writeln!(f, "NCR,Luzon,2021").unwrap();
        let err = load(f.path(), YearRange::default()).unwrap_err();
        match err {
            ReportError::MissingColumns(cols) => {
                assert!(cols.contains(&"ContractCost".to_string()));
                assert!(!cols.contains(&"Region".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_padded_header_is_missing_column() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, " {}", HEADER).unwrap();
        writeln!(f, "NCR,Luzon,2021,100,90,,,,,Metro Manila,A,Dike").unwrap();
        f.flush().unwrap();
        match load(f.path(), YearRange::default()).unwrap_err() {
            ReportError::MissingColumns(cols) => assert_eq!(cols, vec!["Region".to_string()]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_row_errors_carry_line_numbers() {
        let f = csv_file(
            "NCR,Luzon,2021,\"1,000\",900,2021-01-01,2021-01-11,,,Metro Manila,A,Dike\n\
             ,Luzon,2019,100,,,,,,,,\n\
             NCR,Luzon,2022,abc,900,,,,,Metro Manila,A,Dike\n",
        );
        let (records, report) = load(f.path(), YearRange::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(report.total_rows, 3);
        assert_eq!(report.valid_rows, 1);
        assert_eq!(report.retained_rows, 1);
        assert_eq!(report.row_errors.len(), 1);
        assert_eq!(report.row_errors[0].row, 3);
        assert_eq!(
            report.row_errors[0].reasons,
            vec!["Missing Region", "Invalid FundingYear: 2019", "Missing ContractCost"]
        );
    }

    #[test]
    fn test_error_preview_caps_lines() {
        let report = LoadReport {
            row_errors: (0..13)
                .map(|i| RowError {
                    row: i + 2,
                    reasons: vec!["Missing Region".into()],
                })
                .collect(),
            ..LoadReport::default()
        };
        let (lines, remaining) = report.error_preview(10);
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "Row 2: Missing Region");
        assert_eq!(remaining, 3);
    }
}
