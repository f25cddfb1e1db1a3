// Entry point and interactive menu.
//
// - Option [1] loads and cleans the CSV, printing diagnostics.
// - Option [2] generates three reports and a JSON summary.
// - After generating reports, the user can go back to the menu or exit.
use anyhow::Result;
use clap::Parser;
use dpwh_report::output::{self, GeneratedReports};
use dpwh_report::util::format_int;
use dpwh_report::{PipelineConfig, Session};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{error, warn};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "DPWH flood control project reports",
    long_about = "Loads the DPWH flood control projects CSV, cleans it and writes:\n  \
                  report1_regional_efficiency.csv\n  \
                  report2_contractor_ranking.csv\n  \
                  report3_cost_overrun_trends.csv\n  \
                  summary.json"
)]
struct Args {
    /// Path to the projects CSV file
    #[arg(short, long, default_value = "dpwh_flood_control_projects.csv")]
    input: PathBuf,

    /// Directory for the generated reports
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// First funding year kept
    #[arg(long, default_value = "2021")]
    start_year: i32,

    /// Last funding year kept
    #[arg(long, default_value = "2023")]
    end_year: i32,

    /// Rows shown per report preview
    #[arg(long, default_value = "5")]
    preview_rows: usize,

    /// Row errors listed after a load
    #[arg(long, default_value = "10")]
    error_preview: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Print `prompt` and read one trimmed line. `None` on end of input.
fn read_line(input: &mut impl BufRead, prompt: &str) -> io::Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut buf = String::new();
    if input.read_line(&mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(buf.trim().to_string()))
}

/// Ask whether to go back to the report selection menu.
///
/// Returns `true` for `Y`, `false` for `N` or end of input.
fn prompt_back_to_menu(input: &mut impl BufRead) -> io::Result<bool> {
    loop {
        match read_line(input, "Back to Report Selection (Y/N): ")? {
            None => return Ok(false),
            Some(resp) => match resp.to_uppercase().as_str() {
                "Y" => return Ok(true),
                "N" => return Ok(false),
                _ => println!("Invalid choice. Please enter Y or N."),
            },
        }
    }
}

/// Handle option [1]: load and clean the CSV file.
fn handle_load(session: &mut Session) {
    println!("Processing dataset...");
    let limit = session.config().error_preview_limit;
    let years = session.config().year_range;
    match session.load() {
        Ok(report) => {
            let (lines, remaining) = report.error_preview(limit);
            if !lines.is_empty() {
                println!(
                    "\nValidation errors detected: {} invalid records",
                    format_int(report.row_errors.len())
                );
                for line in &lines {
                    println!("  - {}", line);
                }
                if remaining > 0 {
                    println!("  ... and {} more errors", format_int(remaining));
                }
                println!(
                    "Valid records: {} out of {}",
                    format_int(report.valid_rows),
                    format_int(report.total_rows)
                );
            }
            if report.imputed_coords > 0 {
                println!(
                    "Info: Imputed coordinates for {} rows.",
                    format_int(report.imputed_coords)
                );
            }
            println!(
                "({} rows loaded, {} filtered for {}-{})\n",
                format_int(report.total_rows),
                format_int(report.retained_rows),
                years.start,
                years.end
            );
        }
        Err(e) if e.is_recoverable() => {
            warn!(code = e.error_code(), "load failed: {}", e);
            println!("Failed to load file: {}", e);
            println!("Check the file and choose [1] to try again.\n");
        }
        Err(e) => {
            error!(code = e.error_code(), "load failed: {}", e);
            println!("Failed to load file: {}\n", e);
        }
    }
}

fn print_reports(reports: &GeneratedReports, config: &PipelineConfig) -> Result<()> {
    let max_rows = config.preview_rows;
    let years = format!(
        "Filtered: {}-{} Projects",
        config.year_range.start, config.year_range.end
    );
    output::preview_table(
        "Report 1: Regional Flood Mitigation Efficiency Summary",
        Some(years.as_str()),
        &reports.regional,
        max_rows,
    );
    output::preview_table(
        "Report 2: Top Contractors Performance Ranking",
        Some("Top 15 by TotalCost, >=5 Projects"),
        &reports.contractors,
        max_rows,
    );
    output::preview_table(
        "Report 3: Annual Project Type Cost Overrun Trends",
        Some("Grouped by FundingYear and TypeOfWork"),
        &reports.trends,
        max_rows,
    );
    for path in &reports.written {
        println!("Saved: {}", path.display());
    }
    println!("\nSummary Stats (summary.json):");
    println!("{}\n", serde_json::to_string_pretty(&reports.summary)?);
    Ok(())
}

/// Handle option [2]: generate all reports and the JSON summary.
fn handle_generate_reports(session: &Session) -> Result<()> {
    if !session.is_loaded() {
        println!("Error: No data loaded. Please load the file first (option 1).\n");
        return Ok(());
    }
    println!("Generating reports...\n");
    match session.generate_reports() {
        Ok(reports) => print_reports(&reports, session.config())?,
        Err(e) => {
            error!(code = e.error_code(), "report generation failed: {}", e);
            println!("Write error: {}\n", e);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let config = PipelineConfig::default()
        .with_source_path(args.input)
        .with_output_dir(args.output)
        .with_year_range(args.start_year, args.end_year)
        .with_preview_rows(args.preview_rows)
        .with_error_preview_limit(args.error_preview);
    config.validate()?;

    let mut session = Session::new(config);
    let stdin = io::stdin();
    let mut input = stdin.lock();

    loop {
        println!("Select Language Implementation:");
        println!("[1] Load the file");
        println!("[2] Generate Reports\n");
        let Some(choice) = read_line(&mut input, "Enter choice: ")? else {
            break;
        };
        println!();
        match choice.as_str() {
            "1" => handle_load(&mut session),
            "2" => {
                handle_generate_reports(&session)?;
                if !prompt_back_to_menu(&mut input)? {
                    break;
                }
                println!();
            }
            _ => println!("Invalid choice. Please enter 1 or 2.\n"),
        }
    }
    println!("Exiting the program.");
    Ok(())
}
