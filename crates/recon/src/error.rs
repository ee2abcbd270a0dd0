use jdfmerge_core::BatchId;
use thiserror::Error;

/// Errors that abort a merge run, or that a [`crate::BatchSource`] raises for
/// a single batch.
///
/// Per-batch and per-row problems that do not stop the run are not errors;
/// they are collected as [`crate::MergeIssue`]s in the report.
#[derive(Debug, Error)]
pub enum MergeError {
    /// The source archive cannot be opened or listed.
    #[error("source archive unreadable: {0}")]
    Source(String),

    /// The reference stop list has no usable entries.
    #[error("reference stop list is empty")]
    EmptyReferenceList,

    /// Merge configuration rejected before the run started.
    #[error("config validation error: {0}")]
    ConfigValidation(String),

    /// One batch cannot be read or decoded. Raised by a batch source and
    /// downgraded to an issue by the reader; never ends a run.
    #[error("batch '{batch}' unreadable: {reason}")]
    BatchUnreadable { batch: BatchId, reason: String },
}
