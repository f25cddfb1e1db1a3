use crate::error::{ReportError, Result};
use crate::reports::{generate_report1, generate_report2, generate_report3, generate_summary};
use crate::types::{ContractorRankingRow, ProjectRecord, RegionSummaryRow, SummaryStats, TypeTrendRow};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::{info, warn};

pub const REPORT1_FILE: &str = "report1_regional_efficiency.csv";
pub const REPORT2_FILE: &str = "report2_contractor_ranking.csv";
pub const REPORT3_FILE: &str = "report3_cost_overrun_trends.csv";
pub const SUMMARY_FILE: &str = "summary.json";

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir),
        _ => Ok(()),
    }
}

/// Write rows as CSV. The header comes from the row type's column names
/// (`#[tabled(rename)]`, kept equal to the serde names), so an empty slice
/// still produces a header-only file.
pub fn write_csv<T: Serialize + Tabled>(path: &Path, rows: &[T]) -> Result<()> {
    let write = || -> Result<()> {
        ensure_parent(path)?;
        let mut wtr = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
        wtr.write_record(T::headers().iter().map(|h| h.as_bytes()))?;
        for r in rows {
            wtr.serialize(r)?;
        }
        wtr.flush()?;
        Ok(())
    };
    write().map_err(|e| ReportError::writing(path, e))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let write = || -> Result<()> {
        ensure_parent(path)?;
        let s = serde_json::to_string_pretty(value)?;
        fs::write(path, s)?;
        Ok(())
    };
    write().map_err(|e| ReportError::writing(path, e))
}

/// Everything produced by one report run.
#[derive(Debug, Clone)]
pub struct GeneratedReports {
    pub regional: Vec<RegionSummaryRow>,
    pub contractors: Vec<ContractorRankingRow>,
    pub trends: Vec<TypeTrendRow>,
    pub summary: SummaryStats,
    pub written: Vec<PathBuf>,
}

/// Build all three reports and the summary, and write them into `output_dir`.
///
/// Files are written in order; if one fails the error is returned and the
/// files already written stay on disk.
pub fn generate_reports(data: &[ProjectRecord], output_dir: &Path) -> Result<GeneratedReports> {
    info!("Generating reports for {} records", data.len());
    let regional = generate_report1(data);
    let contractors = generate_report2(data);
    let trends = generate_report3(data);
    let summary = generate_summary(data);

    let mut written = Vec::with_capacity(4);
    let mut record = |path: PathBuf, result: Result<()>| -> Result<()> {
        if let Err(e) = result {
            warn!("{}", e);
            return Err(e);
        }
        info!("Report written to: {}", path.display());
        written.push(path);
        Ok(())
    };

    let p1 = output_dir.join(REPORT1_FILE);
    let r = write_csv(&p1, &regional);
    record(p1, r)?;

    let p2 = output_dir.join(REPORT2_FILE);
    let r = write_csv(&p2, &contractors);
    record(p2, r)?;

    let p3 = output_dir.join(REPORT3_FILE);
    let r = write_csv(&p3, &trends);
    record(p3, r)?;

    let p4 = output_dir.join(SUMMARY_FILE);
    let r = write_json(&p4, &summary);
    record(p4, r)?;

    Ok(GeneratedReports {
        regional,
        contractors,
        trends,
        summary,
        written,
    })
}

/// Markdown table of the first `max_rows` rows, or `(no rows)`.
pub fn render_preview<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    let mut out = Table::new(slice).with(Style::markdown()).to_string();
    if rows.len() > max_rows {
        out.push_str(&format!("\n... ({} more rows)", rows.len() - max_rows));
    }
    out
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    println!("{}\n", render_preview(rows, max_rows));
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn row(region: &str) -> RegionSummaryRow {
        RegionSummaryRow {
            region: region.into(),
            main_island: "Luzon".into(),
            total_budget: "1,000".into(),
            median_savings: "10.00".into(),
            avg_delay: "1.00".into(),
            high_delay_pct: "0.00".into(),
            efficiency_score: "100.00".into(),
        }
    }

    #[test]
    fn test_write_csv_quotes_grouped_numbers_and_creates_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/out.csv");
        write_csv(&path, &[row("NCR")]).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Region,MainIsland,TotalBudget,MedianSavings,AvgDelay,HighDelayPct,EfficiencyScore")
        );
        assert_eq!(lines.next(), Some("NCR,Luzon,\"1,000\",10.00,1.00,0.00,100.00"));
    }

    #[test]
    fn test_write_csv_header_only_when_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.csv");
        write_csv::<TypeTrendRow>(&path, &[]).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap().trim(),
            "FundingYear,TypeOfWork,TotalProjects,AvgSavings,OverrunRate,YoYChange"
        );
    }

    /// Header as csv would derive it from the serde field names.
    fn serde_header<T: Serialize>(row: &T) -> String {
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.serialize(row).unwrap();
        let bytes = wtr.into_inner().unwrap();
        String::from_utf8(bytes).unwrap().lines().next().unwrap().to_string()
    }

    fn tabled_header<T: Tabled>() -> String {
        T::headers().join(",")
    }

    #[test]
    fn test_column_names_agree_with_serde_names() {
        assert_eq!(serde_header(&row("NCR")), tabled_header::<RegionSummaryRow>());

        let contractor = ContractorRankingRow {
            rank: 1,
            contractor: "A".into(),
            total_cost: "1,000".into(),
            num_projects: 5,
            avg_delay: "0.00".into(),
            total_savings: "0".into(),
            reliability_index: "100.00".into(),
            risk_flag: "Low Risk".into(),
        };
        assert_eq!(serde_header(&contractor), tabled_header::<ContractorRankingRow>());

        let trend = TypeTrendRow {
            funding_year: 2021,
            type_of_work: "Dike".into(),
            total_projects: 1,
            avg_savings: "0.00".into(),
            overrun_rate: "0.00".into(),
            yoy_change: "0.00".into(),
        };
        assert_eq!(serde_header(&trend), tabled_header::<TypeTrendRow>());
    }

    #[test]
    fn test_write_failure_names_the_path() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let err = write_json(&blocker.join("summary.json"), &1).unwrap_err();
        assert_eq!(err.error_code(), "WRITE_FAILED");
        assert!(err.to_string().contains("summary.json"));
    }

    #[test]
    fn test_render_preview_notes_hidden_rows() {
        let rows = vec![row("NCR"), row("CAR"), row("BARMM")];
        let text = render_preview(&rows, 2);
        assert!(text.contains("| NCR"));
        assert!(!text.contains("BARMM"));
        assert!(text.ends_with("... (1 more rows)"));
        assert_eq!(render_preview::<RegionSummaryRow>(&[], 5), "(no rows)");
    }
}
