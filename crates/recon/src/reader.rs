use std::collections::HashMap;

use jdfmerge_core::record::split_records;
use jdfmerge_core::{BatchId, Row};

use crate::error::MergeError;
use crate::normalize::normalize;
use crate::report::{MergeIssue, MergeReport};
use crate::schema::{self, TableSpec};

/// Supplies batches and their decoded tables.
///
/// Implemented over the nested archive in `jdfmerge-io`; tests implement it
/// in memory.
pub trait BatchSource {
    /// Every batch in the source. An error here aborts the run.
    fn batches(&mut self) -> Result<Vec<BatchId>, MergeError>;

    /// Decoded text of `table` in `batch`, or `None` when the batch has no
    /// such table. An error here skips the batch.
    fn open_table(&mut self, batch: &BatchId, table: &str) -> Result<Option<String>, MergeError>;
}

/// One entry of the authoritative stop list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceStop {
    pub name: String,
    pub district: String,
    pub country: String,
}

impl ReferenceStop {
    pub fn new(name: impl Into<String>, district: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            district: district.into(),
            country: country.into(),
        }
    }
}

/// A batch read once, fully: its schema version and the normalized rows of
/// every merged table.
#[derive(Debug, Clone)]
pub struct LoadedBatch {
    pub id: BatchId,
    pub version: u8,
    tables: HashMap<&'static str, Vec<Row>>,
}

impl LoadedBatch {
    pub fn new(id: BatchId, version: u8) -> Self {
        Self {
            id,
            version,
            tables: HashMap::new(),
        }
    }

    /// Normalized rows of `spec`; empty when the table was absent.
    pub fn rows(&self, spec: &TableSpec) -> &[Row] {
        self.tables.get(spec.name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn set_rows(&mut self, spec: &TableSpec, rows: Vec<Row>) {
        self.tables.insert(spec.name, rows);
    }
}

/// Read one table of one batch as raw rows.
///
/// An absent mandatory table is reported and yields no rows; an absent
/// optional table silently yields no rows.
pub fn read_table<S: BatchSource + ?Sized>(
    source: &mut S,
    batch: &BatchId,
    spec: &TableSpec,
    report: &mut MergeReport,
) -> Result<Vec<Row>, MergeError> {
    match source.open_table(batch, spec.name)? {
        Some(text) => Ok(split_records(&text)),
        None => {
            if spec.mandatory {
                report.issue(MergeIssue::MissingTable {
                    batch: batch.clone(),
                    table: spec.name,
                });
            }
            Ok(Vec::new())
        }
    }
}

/// Schema version of a batch, or `None` (reported) when it is unusable.
pub fn read_version<S: BatchSource + ?Sized>(
    source: &mut S,
    batch: &BatchId,
    report: &mut MergeReport,
) -> Result<Option<u8>, MergeError> {
    let Some(text) = source.open_table(batch, schema::VERSION.name)? else {
        report.issue(MergeIssue::MissingTable {
            batch: batch.clone(),
            table: schema::VERSION.name,
        });
        return Ok(None);
    };

    let rows = split_records(&text);
    let value = rows.first().map(|row| row.field(0)).unwrap_or("");
    match schema::parse_version(value) {
        Some(version) => Ok(Some(version)),
        None => {
            report.issue(MergeIssue::InvalidVersion {
                batch: batch.clone(),
                value: value.to_string(),
            });
            Ok(None)
        }
    }
}

/// Read every merged table of a batch and normalize its rows.
///
/// Returns `None` when the batch must be skipped entirely: unusable version
/// or a read/decode failure. Both are reported.
pub fn load_batch<S: BatchSource + ?Sized>(
    source: &mut S,
    id: &BatchId,
    report: &mut MergeReport,
) -> Option<LoadedBatch> {
    match try_load_batch(source, id, report) {
        Ok(batch) => batch,
        Err(err) => {
            let reason = match err {
                MergeError::BatchUnreadable { reason, .. } => reason,
                other => other.to_string(),
            };
            report.issue(MergeIssue::BatchUnreadable {
                batch: id.clone(),
                reason,
            });
            None
        }
    }
}

fn try_load_batch<S: BatchSource + ?Sized>(
    source: &mut S,
    id: &BatchId,
    report: &mut MergeReport,
) -> Result<Option<LoadedBatch>, MergeError> {
    let Some(version) = read_version(source, id, report)? else {
        return Ok(None);
    };

    let mut batch = LoadedBatch::new(id.clone(), version);
    for spec in schema::MERGED_TABLES {
        let rows = read_table(source, id, spec, report)?
            .into_iter()
            .map(|row| normalize(row, version, spec))
            .collect();
        batch.set_rows(spec, rows);
    }

    log::debug!(
        "batch {id}: version 1.{version}, {} carriers, {} stops, {} lines",
        batch.rows(&schema::CARRIERS).len(),
        batch.rows(&schema::STOPS).len(),
        batch.rows(&schema::LINES).len(),
    );
    Ok(Some(batch))
}

/// List the source's batches in ascending order and load each of them.
/// Skipped batches are counted in the report.
pub fn load_batches<S: BatchSource + ?Sized>(
    source: &mut S,
    report: &mut MergeReport,
) -> Result<Vec<LoadedBatch>, MergeError> {
    let mut ids = source.batches()?;
    ids.sort();

    let mut batches = Vec::with_capacity(ids.len());
    for id in &ids {
        match load_batch(source, id, report) {
            Some(batch) => batches.push(batch),
            None => report.batches_skipped += 1,
        }
    }
    report.batches_read = batches.len();
    Ok(batches)
}
