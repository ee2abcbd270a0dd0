use jdfmerge_core::Row;

use crate::canonical::CanonicalTable;

/// Rows of a canonical table, sorted for output.
pub fn flatten(table: &CanonicalTable) -> Vec<Row> {
    sort_rows(table.rows().cloned().collect())
}

/// Stable sort by the leading field read as an integer. Rows whose leading
/// field is not an integer keep their encounter order after the numeric ones.
pub fn sort_rows(rows: Vec<Row>) -> Vec<Row> {
    let mut numeric: Vec<(i64, Row)> = Vec::with_capacity(rows.len());
    let mut other = Vec::new();
    for row in rows {
        match leading_key(&row) {
            Some(key) => numeric.push((key, row)),
            None => other.push(row),
        }
    }

    numeric.sort_by_key(|(key, _)| *key);
    numeric.into_iter().map(|(_, row)| row).chain(other).collect()
}

fn leading_key(row: &Row) -> Option<i64> {
    row.field(0).trim().parse().ok()
}
