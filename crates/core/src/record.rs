//! The JDF record format.
//!
//! Every field is wrapped in double quotes, fields are separated by commas
//! and each record ends with `;` followed by CR LF:
//!
//! ```text
//! "123","Praha,Florenc","CZ";
//! ```
//!
//! Quotes inside a field are not escaped, so a record is split on the
//! literal `","` sequence. This module works on decoded text only; the
//! byte encoding of the source archive is handled by the I/O layer.

use crate::row::Row;

pub const FIELD_SEPARATOR: &str = "\",\"";
pub const RECORD_TERMINATOR: &str = ";\r\n";

/// Parse a single record line. The terminator is optional and a bare LF
/// line ending is accepted as well as CR LF. Empty fields are preserved.
pub fn parse_record(line: &str) -> Row {
    let line = line.trim_end_matches(['\r', '\n']);
    let line = line.strip_suffix(';').unwrap_or(line);
    let line = line.strip_prefix('"').unwrap_or(line);
    let line = line.strip_suffix('"').unwrap_or(line);
    line.split(FIELD_SEPARATOR).map(str::to_string).collect()
}

/// Parse every record of a decoded table. Blank lines are skipped.
pub fn split_records(text: &str) -> Vec<Row> {
    text.split('\n')
        .filter(|line| !line.trim_matches(['\r', '\u{1a}', ' ']).is_empty())
        .map(parse_record)
        .collect()
}

/// Format one row as a terminated record line.
pub fn format_record(row: &Row) -> String {
    let mut out = String::with_capacity(row.fields().iter().map(|f| f.len() + 3).sum::<usize>() + 4);
    out.push('"');
    out.push_str(&row.fields().join(FIELD_SEPARATOR));
    out.push('"');
    out.push_str(RECORD_TERMINATOR);
    out
}

/// Format a whole table.
pub fn format_records<'a>(rows: impl IntoIterator<Item = &'a Row>) -> String {
    rows.into_iter().map(format_record).collect()
}
