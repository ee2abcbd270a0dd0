//! `jdfmerge batches`: list batches in merge order.

use std::path::{Path, PathBuf};

use jdfmerge_io::ZipArchiveSource;
use jdfmerge_recon::reader::read_version;
use jdfmerge_recon::MergeReport;
use serde::Serialize;

use crate::exit_codes::{EXIT_ARCHIVE_UNREADABLE, EXIT_ERROR};
use crate::settings::{check_overrides, load_settings};
use crate::CliError;

#[derive(Debug, Serialize)]
struct BatchEntry {
    batch: String,
    /// `1.X` when the batch will be merged.
    version: Option<String>,
    /// Why the batch will be skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    skipped: Option<String>,
}

pub fn cmd_batches(config: Option<&Path>, archive: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let mut settings = load_settings(config)?;
    if let Some(archive) = archive {
        settings.source.archive = archive;
    }
    check_overrides(&settings)?;

    let mut source = ZipArchiveSource::open(&settings.source.archive)
        .map_err(|e| CliError::new(EXIT_ARCHIVE_UNREADABLE, e.to_string()))?;

    let mut entries = Vec::new();
    for id in source.batch_ids() {
        // Issues raised here are only for display; nothing is merged.
        let mut report = MergeReport::default();
        let entry = match read_version(&mut source, &id, &mut report) {
            Ok(Some(version)) => BatchEntry {
                batch: id.to_string(),
                version: Some(format!("1.{version}")),
                skipped: None,
            },
            Ok(None) => BatchEntry {
                batch: id.to_string(),
                version: None,
                skipped: report.issues.first().map(ToString::to_string),
            },
            Err(e) => BatchEntry {
                batch: id.to_string(),
                version: None,
                skipped: Some(e.to_string()),
            },
        };
        entries.push(entry);
    }

    if json {
        let json_str = serde_json::to_string_pretty(&entries)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
        return Ok(());
    }

    for entry in &entries {
        match (&entry.version, &entry.skipped) {
            (Some(version), _) => println!("{}\t{}", entry.batch, version),
            (None, Some(reason)) => println!("{}\tskipped: {}", entry.batch, reason),
            (None, None) => println!("{}\tskipped", entry.batch),
        }
    }
    eprintln!(
        "{} batches, {} mergeable",
        entries.len(),
        entries.iter().filter(|e| e.version.is_some()).count()
    );
    Ok(())
}
