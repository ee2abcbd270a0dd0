use std::io;
use std::path::{Path, PathBuf};

use jdfmerge_core::record::format_records;
use jdfmerge_recon::OutputTable;

use crate::encoding::encode;
use crate::error::ArchiveError;

/// Write each table to `<dir>/<name>.txt`.
///
/// Every table is encoded and written to a staging directory inside `dir`
/// before any existing file is replaced. Tables then move into place one by
/// one; a failed move puts back the files already replaced, so `dir` holds
/// either the old dataset or the new one.
pub fn write_tables(dir: &Path, tables: &[OutputTable]) -> Result<Vec<PathBuf>, ArchiveError> {
    let encoded = tables
        .iter()
        .map(|table| -> Result<_, ArchiveError> {
            Ok((table.name, encode(&format_records(&table.rows), table.name)?))
        })
        .collect::<Result<Vec<_>, _>>()?;

    std::fs::create_dir_all(dir).map_err(|source| write_err(dir, source))?;

    let targets: Vec<PathBuf> = encoded
        .iter()
        .map(|(name, _)| dir.join(format!("{name}.txt")))
        .collect();
    if let Some(target) = targets.iter().find(|target| target.is_dir()) {
        return Err(write_err(
            target,
            io::Error::new(io::ErrorKind::AlreadyExists, "a directory is in the way"),
        ));
    }

    let staging = tempfile::Builder::new()
        .prefix(".jdfmerge-")
        .tempdir_in(dir)
        .map_err(|source| write_err(dir, source))?;

    let mut staged = Vec::with_capacity(encoded.len());
    for ((name, bytes), target) in encoded.iter().zip(&targets) {
        let path = staging.path().join(format!("{name}.txt"));
        std::fs::write(&path, bytes).map_err(|source| write_err(target, source))?;
        log::debug!("staged {} ({} bytes)", target.display(), bytes.len());
        staged.push(path);
    }

    commit(staging.path(), &staged, &targets)?;
    Ok(targets)
}

/// Move staged files over their targets, keeping replaced files in
/// `staging` until every move succeeded.
fn commit(staging: &Path, staged: &[PathBuf], targets: &[PathBuf]) -> Result<(), ArchiveError> {
    // (target, backup of the file it replaced)
    let mut done: Vec<(&Path, Option<PathBuf>)> = Vec::with_capacity(targets.len());

    for (idx, (from, target)) in staged.iter().zip(targets).enumerate() {
        match replace(staging, idx, from, target) {
            Ok(backup) => done.push((target.as_path(), backup)),
            Err(err) => {
                rollback(&done);
                return Err(err);
            }
        }
    }
    Ok(())
}

fn replace(staging: &Path, idx: usize, from: &Path, target: &Path) -> Result<Option<PathBuf>, ArchiveError> {
    let backup = if target.exists() {
        let backup = staging.join(format!("previous-{idx}"));
        std::fs::rename(target, &backup).map_err(|source| write_err(target, source))?;
        Some(backup)
    } else {
        None
    };

    if let Err(source) = std::fs::rename(from, target) {
        if let Some(backup) = &backup {
            if let Err(e) = std::fs::rename(backup, target) {
                log::error!("cannot restore {}: {e}", target.display());
            }
        }
        return Err(write_err(target, source));
    }
    Ok(backup)
}

fn rollback(done: &[(&Path, Option<PathBuf>)]) {
    for (target, backup) in done.iter().rev() {
        let restored = match backup {
            Some(backup) => std::fs::rename(backup, target),
            None => std::fs::remove_file(target),
        };
        if let Err(e) = restored {
            log::error!("cannot restore {}: {e}", target.display());
        }
    }
}

fn write_err(path: &Path, source: io::Error) -> ArchiveError {
    ArchiveError::Write {
        path: path.to_path_buf(),
        source,
    }
}
