//! Byte encoding of JDF tables.
//!
//! Tables are windows-1250 text. Decoding and encoding live here, apart from
//! record splitting in `jdfmerge_core::record`.

use encoding_rs::WINDOWS_1250;

use crate::error::ArchiveError;

/// Bytes windows-1250 leaves unassigned. The WHATWG table still maps them
/// to C1 controls, so they are rejected before decoding.
const UNDEFINED_BYTES: [u8; 5] = [0x81, 0x83, 0x88, 0x90, 0x98];

/// Decode table bytes. `what` names the table in the error.
pub fn decode(bytes: &[u8], what: &str) -> Result<String, ArchiveError> {
    if bytes.iter().any(|b| UNDEFINED_BYTES.contains(b)) {
        return Err(ArchiveError::Decode {
            what: what.to_string(),
        });
    }

    WINDOWS_1250
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or_else(|| ArchiveError::Decode {
            what: what.to_string(),
        })
}

/// Encode table text. Fails on the first character windows-1250 cannot
/// represent; nothing is replaced.
pub fn encode(text: &str, table: &str) -> Result<Vec<u8>, ArchiveError> {
    let (bytes, _, had_unmappable) = WINDOWS_1250.encode(text);
    if !had_unmappable {
        return Ok(bytes.into_owned());
    }

    let ch = text
        .chars()
        .find(|ch| {
            let mut buf = [0u8; 4];
            WINDOWS_1250.encode(ch.encode_utf8(&mut buf)).2
        })
        .unwrap_or(char::REPLACEMENT_CHARACTER);
    Err(ArchiveError::Encode {
        table: table.to_string(),
        ch,
    })
}
