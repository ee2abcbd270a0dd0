use jdfmerge_core::Row;

use crate::schema::{Position, TableSpec, VersionRule};

/// Bring a row from a batch of schema `version` to the current layout of
/// `spec`, then pad it to the table width.
///
/// Rules apply in ascending threshold order, so an insert declared for a
/// later version addresses the row as already widened by earlier rules.
/// Rows are expected to be normalized exactly once.
pub fn normalize(row: Row, version: u8, spec: &TableSpec) -> Row {
    let mut rules: Vec<&VersionRule> = spec.rules.iter().collect();
    rules.sort_by_key(|rule| rule.threshold);

    let mut row = row;
    for rule in rules.into_iter().filter(|rule| version < rule.threshold) {
        for insert in rule.inserts {
            match insert.position {
                Position::At(idx) => row.insert(idx, insert.value),
                Position::End => row.push(insert.value),
            }
        }
    }
    row.pad(spec.width);
    row
}
