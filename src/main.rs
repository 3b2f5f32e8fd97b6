// Entry point and high-level CLI flow.
//
// Loads the three facility exports, prints a short diagnostic and a preview
// of every summary, then writes the workbook (and optionally a JSON dump of
// the summaries).
use anyhow::{Context, Result};
use clap::Parser;
use overprod_report::loader::{self, LoadReport};
use overprod_report::types::{Facility, LineItem, REPORT_FILE_NAME, REPORT_MIME_TYPE};
use overprod_report::{output, reports, util, FacilityRecords, ReportConfig};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "overprod_report")]
#[command(about = "Residential over-production monthly report")]
struct Args {
    /// IRC export (CSV)
    #[arg(long)]
    irc: PathBuf,

    /// UV export (CSV)
    #[arg(long)]
    uv: PathBuf,

    /// EVK export (CSV)
    #[arg(long)]
    evk: PathBuf,

    /// Where to write the workbook
    #[arg(short, long, default_value = REPORT_FILE_NAME)]
    output: PathBuf,

    /// JSON file overriding report settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Also write the computed summaries as JSON
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// Skip the console previews
    #[arg(long)]
    no_preview: bool,
}

fn load(facility: Facility, path: &Path, config: &ReportConfig) -> Result<Vec<LineItem>> {
    let (items, report) = loader::load_facility(path, &config.columns)
        .with_context(|| format!("failed to load {} data from {}", facility, path.display()))?;
    print_load_report(facility, &report);
    Ok(items)
}

fn print_load_report(facility: Facility, report: &LoadReport) {
    println!(
        "{}: {} rows read, {} loaded",
        facility,
        util::format_int(report.total_rows),
        util::format_int(report.loaded_rows)
    );
    if report.rejected_rows > 0 {
        println!(
            "  Note: {} malformed rows skipped.",
            util::format_int(report.rejected_rows)
        );
    }
    if report.uncosted_rows > 0 {
        println!(
            "  Note: {} rows have an unparsable quantity or cost and add no cost.",
            util::format_int(report.uncosted_rows)
        );
    }
    if report.unlabeled_rows > 0 {
        println!(
            "  Note: {} rows have no category and are not counted.",
            util::format_int(report.unlabeled_rows)
        );
    }
    if report.unparsed_dates > 0 {
        println!(
            "  Note: {} rows have an unreadable event date.",
            util::format_int(report.unparsed_dates)
        );
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ReportConfig::load(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => ReportConfig::default(),
    };

    let irc = load(Facility::Irc, &args.irc, &config)?;
    let uv = load(Facility::Uv, &args.uv, &config)?;
    let evk = load(Facility::Evk, &args.evk, &config)?;
    println!();

    let records = FacilityRecords { evk: &evk, irc: &irc, uv: &uv };
    let report = overprod_report::generate_report(records, &config).context("report generation failed")?;

    if !args.no_preview {
        let period = report
            .date_range
            .map(|r| r.to_string())
            .unwrap_or_else(|| "no dated records".to_string());
        output::preview_table("Executive Summary", Some(period.as_str()), &reports::preview_rows(&report.executive));
        for summary in &report.summaries {
            output::preview_table(summary.facility.label(), None, &reports::preview_rows(summary));
        }
    }

    if let Some(path) = &args.summary_json {
        output::write_json(path, &report)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Summary saved to {}", path.display());
    }

    output::write_buffer(&args.output, report.buffer)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!(path = %args.output.display(), content_type = REPORT_MIME_TYPE, "report written");
    println!("Report saved to {}", args.output.display());
    Ok(())
}
