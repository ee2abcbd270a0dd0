use std::path::PathBuf;

use jdfmerge_recon::MergeError;
use thiserror::Error;

/// Errors from reading the batch archive, the reference stop list, or
/// writing output tables.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{context}: {source}")]
    Zip {
        context: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("{context}: {source}")]
    Read {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{what} is not valid windows-1250 text")]
    Decode { what: String },

    #[error("table {table}: character {ch:?} cannot be written as windows-1250")]
    Encode { table: String, ch: char },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<ArchiveError> for MergeError {
    fn from(err: ArchiveError) -> Self {
        MergeError::Source(err.to_string())
    }
}
