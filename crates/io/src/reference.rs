use std::path::Path;

use jdfmerge_core::record::split_records;
use jdfmerge_recon::ReferenceStop;

use crate::encoding::decode;
use crate::error::ArchiveError;

/// Read the authoritative stop list.
///
/// The file uses the JDF record format and encoding, one stop per record:
/// name, district, country. Order is preserved; it fixes the stop numbering.
pub fn read_reference_stops(path: &Path) -> Result<Vec<ReferenceStop>, ArchiveError> {
    let bytes = std::fs::read(path).map_err(|source| ArchiveError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let text = decode(&bytes, &path.display().to_string())?;
    let stops = parse_reference_stops(&text);
    log::info!("{} reference stops read from {}", stops.len(), path.display());
    Ok(stops)
}

/// Parse decoded stop-list text. Records without a name are skipped.
pub fn parse_reference_stops(text: &str) -> Vec<ReferenceStop> {
    split_records(text)
        .into_iter()
        .filter(|row| !row.field(0).is_empty())
        .map(|row| ReferenceStop::new(row.field(0), row.field(1), row.field(2)))
        .collect()
}
