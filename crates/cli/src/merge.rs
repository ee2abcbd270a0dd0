//! `jdfmerge merge`: run the whole merge and write the output dataset.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Args;
use jdfmerge_io::{read_reference_stops, write_tables, ZipArchiveSource};
use jdfmerge_recon::pipeline::MergeMeta;
use jdfmerge_recon::report::{compute_summary, ReportSummary};
use jdfmerge_recon::{run, MergeConfig, MergeError, MergeReport};
use serde::Serialize;

use crate::exit_codes::{
    EXIT_ARCHIVE_UNREADABLE, EXIT_ERROR, EXIT_INVALID_SETTINGS, EXIT_REFERENCE_UNREADABLE,
    EXIT_STRICT_ISSUES, EXIT_WRITE_FAILED,
};
use crate::settings::{check_overrides, load_settings};
use crate::CliError;

#[derive(Args)]
pub struct MergeArgs {
    /// Container archive of batch archives (overrides source.archive)
    #[arg(long)]
    pub archive: Option<PathBuf>,

    /// Reference stop list (overrides source.reference_stops)
    #[arg(long)]
    pub stops: Option<PathBuf>,

    /// Output directory (overrides output.dir)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Dataset name for the version table (overrides output.dataset_name)
    #[arg(long)]
    pub name: Option<String>,

    /// Creation date for the version table, YYYY-MM-DD (default: today)
    #[arg(long)]
    pub date: Option<String>,

    /// Write the JSON report to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Print the JSON report to stdout
    #[arg(long)]
    pub json: bool,

    /// Exit with code 7 when any issue was reported
    #[arg(long)]
    pub strict: bool,
}

/// JSON report of one run.
#[derive(Serialize)]
struct RunReport<'a> {
    meta: &'a MergeMeta,
    output_dir: &'a Path,
    written: Vec<PathBuf>,
    summary: ReportSummary,
    report: &'a MergeReport,
}

fn parse_date(value: Option<&str>) -> Result<NaiveDate, CliError> {
    match value {
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map_err(|e| CliError::usage(format!("invalid --date '{value}': {e}")).with_hint("expected YYYY-MM-DD")),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

fn engine_err(err: MergeError) -> CliError {
    let code = match &err {
        MergeError::EmptyReferenceList => EXIT_REFERENCE_UNREADABLE,
        MergeError::ConfigValidation(_) => EXIT_INVALID_SETTINGS,
        MergeError::Source(_) | MergeError::BatchUnreadable { .. } => EXIT_ARCHIVE_UNREADABLE,
    };
    CliError::new(code, err.to_string())
}

pub fn cmd_merge(config: Option<&Path>, args: MergeArgs) -> Result<(), CliError> {
    let mut settings = load_settings(config)?;
    if let Some(archive) = args.archive {
        settings.source.archive = archive;
    }
    if let Some(stops) = args.stops {
        settings.source.reference_stops = stops;
    }
    if let Some(out) = args.out {
        settings.output.dir = out;
    }
    if let Some(name) = args.name {
        settings.output.dataset_name = name;
    }
    check_overrides(&settings)?;

    let created = parse_date(args.date.as_deref())?;
    let merge_config = MergeConfig::new(settings.output.dataset_name.clone(), created);

    let reference = read_reference_stops(&settings.source.reference_stops).map_err(|e| {
        CliError::new(EXIT_REFERENCE_UNREADABLE, e.to_string())
            .with_hint("set source.reference_stops or pass --stops")
    })?;
    let mut source = ZipArchiveSource::open(&settings.source.archive).map_err(|e| {
        CliError::new(EXIT_ARCHIVE_UNREADABLE, e.to_string()).with_hint("set source.archive or pass --archive")
    })?;

    let output = run(&merge_config, &mut source, &reference).map_err(engine_err)?;

    let written = write_tables(&settings.output.dir, &output.tables)
        .map_err(|e| CliError::new(EXIT_WRITE_FAILED, e.to_string()))?;

    let summary = compute_summary(&output.report);
    let run_report = RunReport {
        meta: &output.meta,
        output_dir: &settings.output.dir,
        written,
        summary,
        report: &output.report,
    };

    if args.report.is_some() || args.json {
        let json_str = serde_json::to_string_pretty(&run_report)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;

        if let Some(ref path) = args.report {
            std::fs::write(path, &json_str).map_err(|e| {
                CliError::new(EXIT_WRITE_FAILED, format!("cannot write report {}: {e}", path.display()))
            })?;
            eprintln!("wrote {}", path.display());
        }

        if args.json {
            println!("{json_str}");
        }
    }

    // Human summary to stderr
    let report = &output.report;
    eprintln!(
        "merged {} batches ({} skipped) into {}",
        report.batches_read,
        report.batches_skipped,
        settings.output.dir.display(),
    );
    for table in &output.tables {
        eprintln!("  {:<10} {:>7} rows", table.name, table.rows.len());
    }
    let s = &run_report.summary;
    eprintln!(
        "{} issues: {} batch failures, {} dropped rows, {} cleared fields",
        s.total_issues, s.batch_failures, s.dropped_rows, s.cleared_fields,
    );

    if args.strict && report.has_issues() {
        return Err(CliError::new(
            EXIT_STRICT_ISSUES,
            format!("{} issues reported (--strict)", report.issues.len()),
        ));
    }

    Ok(())
}
