//! The source container: a zip archive whose entries are per-batch zip
//! archives (`1.zip`, `2.zip`, ...), each holding `<Table>.txt` files.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use jdfmerge_core::BatchId;
use jdfmerge_recon::{BatchSource, MergeError};
use zip::ZipArchive;

use crate::encoding::decode;
use crate::error::ArchiveError;

type BatchArchive = ZipArchive<Cursor<Vec<u8>>>;

/// Upper bound on the buffer reserved from an entry's declared size.
const MAX_PREALLOCATION: u64 = 64 * 1024 * 1024;

/// [`BatchSource`] over a nested zip archive.
///
/// One batch archive is held in memory at a time; the reader asks for all
/// tables of a batch before moving to the next one.
pub struct ZipArchiveSource<R: Read + Seek = File> {
    archive: ZipArchive<R>,
    /// Batch id -> entry name in the container.
    entries: HashMap<BatchId, String>,
    current: Option<(BatchId, BatchArchive)>,
}

impl ZipArchiveSource<File> {
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        let file = File::open(path).map_err(|source| ArchiveError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(file).map_err(|err| match err {
            ArchiveError::Zip { source, .. } => ArchiveError::Zip {
                context: format!("cannot read {} as zip", path.display()),
                source,
            },
            other => other,
        })
    }
}

impl<R: Read + Seek> ZipArchiveSource<R> {
    pub fn new(reader: R) -> Result<Self, ArchiveError> {
        let archive = ZipArchive::new(reader).map_err(|source| ArchiveError::Zip {
            context: "cannot read source archive".to_string(),
            source,
        })?;

        let mut entries = HashMap::new();
        for name in archive.file_names() {
            if !is_batch_entry(name) {
                continue;
            }
            let id = BatchId::from_entry_name(name);
            if let Some(previous) = entries.get(&id) {
                log::warn!("entries {previous} and {name} share batch id {id}, keeping {previous}");
                continue;
            }
            entries.insert(id, name.to_string());
        }

        Ok(Self {
            archive,
            entries,
            current: None,
        })
    }

    /// Batch ids in merge order.
    pub fn batch_ids(&self) -> Vec<BatchId> {
        let mut ids: Vec<BatchId> = self.entries.keys().cloned().collect();
        ids.sort();
        ids
    }

    fn batch_archive(&mut self, batch: &BatchId) -> Result<&mut BatchArchive, ArchiveError> {
        let loaded = matches!(&self.current, Some((id, _)) if id == batch);
        if !loaded {
            self.current = None;
            let archive = self.read_batch_archive(batch)?;
            self.current = Some((batch.clone(), archive));
        }
        self.current
            .as_mut()
            .map(|(_, archive)| archive)
            .ok_or_else(|| unknown_batch(batch))
    }

    fn read_batch_archive(&mut self, batch: &BatchId) -> Result<BatchArchive, ArchiveError> {
        let Some(entry_name) = self.entries.get(batch) else {
            return Err(unknown_batch(batch));
        };

        let mut entry = self.archive.by_name(entry_name).map_err(|source| ArchiveError::Zip {
            context: format!("cannot open entry {entry_name}"),
            source,
        })?;
        let mut bytes = Vec::with_capacity(initial_capacity(entry.size()));
        entry.read_to_end(&mut bytes).map_err(|source| ArchiveError::Read {
            context: format!("cannot read entry {entry_name}"),
            source,
        })?;

        ZipArchive::new(Cursor::new(bytes)).map_err(|source| ArchiveError::Zip {
            context: format!("entry {entry_name} is not a zip archive"),
            source,
        })
    }

    /// Decoded text of `table` in `batch`, `None` when absent.
    pub fn read_table(&mut self, batch: &BatchId, table: &str) -> Result<Option<String>, ArchiveError> {
        let archive = self.batch_archive(batch)?;
        let Some(name) = find_table(archive, table) else {
            return Ok(None);
        };

        let mut file = archive.by_name(&name).map_err(|source| ArchiveError::Zip {
            context: format!("batch {batch}: cannot open {name}"),
            source,
        })?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(|source| ArchiveError::Read {
            context: format!("batch {batch}: cannot read {name}"),
            source,
        })?;

        decode(&bytes, &format!("batch {batch} table {table}")).map(Some)
    }
}

impl<R: Read + Seek> BatchSource for ZipArchiveSource<R> {
    fn batches(&mut self) -> Result<Vec<BatchId>, MergeError> {
        Ok(self.batch_ids())
    }

    fn open_table(&mut self, batch: &BatchId, table: &str) -> Result<Option<String>, MergeError> {
        self.read_table(batch, table).map_err(|err| MergeError::BatchUnreadable {
            batch: batch.clone(),
            reason: err.to_string(),
        })
    }
}

fn unknown_batch(batch: &BatchId) -> ArchiveError {
    ArchiveError::Zip {
        context: format!("batch {batch}"),
        source: zip::result::ZipError::FileNotFound,
    }
}

/// Buffer size to reserve for an entry. The declared size comes from the
/// zip header and is not trusted beyond [`MAX_PREALLOCATION`].
fn initial_capacity(declared: u64) -> usize {
    declared.min(MAX_PREALLOCATION) as usize
}

fn is_batch_entry(name: &str) -> bool {
    !name.ends_with('/') && name.to_ascii_lowercase().ends_with(".zip")
}

/// Entry holding `table`: `<table>.txt`, any letter case, at any depth.
fn find_table<R: Read + Seek>(archive: &ZipArchive<R>, table: &str) -> Option<String> {
    let wanted = format!("{table}.txt").to_ascii_lowercase();
    archive
        .file_names()
        .find(|name| {
            let base = name.rsplit('/').next().unwrap_or_default();
            base.to_ascii_lowercase() == wanted
        })
        .map(str::to_string)
}
