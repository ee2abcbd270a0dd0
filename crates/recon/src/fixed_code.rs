//! Fixed codes (timetable symbols). The output uses one fixed catalogue;
//! each batch's own numbering is linked into it by symbol.

use std::ops::RangeInclusive;

use jdfmerge_core::{BatchId, Row};

use crate::linker::{Linker, LocalKey};
use crate::reader::LoadedBatch;
use crate::report::{MergeIssue, MergeReport};
use crate::schema::{fixed_code, FIXED_CODES};

/// Catalogue symbols; a symbol's canonical number is its position + 1.
pub const CATALOGUE: [&str; 41] = [
    "X", "+", "1", "2", "3", "4", "5", "6", "7", "R", "#", "|", "<", "@", "%", "W", "w", "x", "~", "I",
    "(", ")", "$", "{", "}", "[", "O", "v", "s", "§", "A", "B", "C", "T", "!", "t", "b", "U", "S", "J",
    "P",
];

/// Canonical number of `symbol`, if it is in the catalogue.
pub fn catalogue_number(symbol: &str) -> Option<u32> {
    CATALOGUE
        .iter()
        .position(|s| *s == symbol)
        .map(|idx| idx as u32 + 1)
}

/// The output fixed-code table.
pub fn catalogue_rows() -> Vec<Row> {
    CATALOGUE
        .iter()
        .enumerate()
        .map(|(idx, symbol)| Row::from([(idx + 1).to_string().as_str(), symbol, ""]))
        .collect()
}

/// Link every batch's local fixed-code numbers to catalogue numbers.
pub fn merge_fixed_codes(batches: &[LoadedBatch], report: &mut MergeReport) -> Linker<u32> {
    let mut linker = Linker::new("fixed code");
    let mut rows_read = 0;

    for batch in batches {
        for (idx, row) in batch.rows(&FIXED_CODES).iter().enumerate() {
            rows_read += 1;
            let number = row.field(fixed_code::NUMBER);
            let symbol = row.field(fixed_code::SYMBOL).trim();

            let Some(canonical) = catalogue_number(symbol) else {
                report.issue(MergeIssue::UnknownFixedCodeSymbol {
                    batch: batch.id.clone(),
                    number: number.to_string(),
                    symbol: symbol.to_string(),
                });
                continue;
            };

            if let Some(previous) = linker.insert(LocalKey::new(&batch.id, number), canonical) {
                if previous != canonical {
                    report.issue(MergeIssue::DuplicateLocalId {
                        batch: batch.id.clone(),
                        table: FIXED_CODES.name,
                        row: idx + 1,
                        key: number.to_string(),
                    });
                }
            }
        }
    }

    let summary = report.table_mut(FIXED_CODES.name);
    summary.rows_read = rows_read;
    summary.canonical_rows = CATALOGUE.len();
    linker
}

/// Rewrite the fixed-code reference fields of one row. Empty fields stay
/// empty; unresolved codes are cleared and reported.
pub fn rewrite_codes(
    codes: &Linker<u32>,
    batch: &BatchId,
    table: &'static str,
    line: usize,
    row: &mut Row,
    fields: RangeInclusive<usize>,
    report: &mut MergeReport,
) {
    for field in fields {
        let code = row.field(field);
        if code.is_empty() {
            continue;
        }
        match codes.lookup(&LocalKey::new(batch, code)) {
            Some(canonical) => row.set(field, canonical.to_string()),
            None => {
                report.issue(MergeIssue::UnresolvedFixedCode {
                    batch: batch.clone(),
                    table,
                    row: line,
                    code: code.to_string(),
                });
                row.set(field, "");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::stop;

    fn batch_with_codes(name: &str, codes: &[(&str, &str)]) -> LoadedBatch {
        let mut batch = LoadedBatch::new(BatchId::new(name), 11);
        let rows = codes.iter().map(|(n, s)| Row::from([*n, *s, ""])).collect();
        batch.set_rows(&FIXED_CODES, rows);
        batch
    }

    #[test]
    fn catalogue_numbering() {
        assert_eq!(catalogue_number("X"), Some(1));
        assert_eq!(catalogue_number("§"), Some(30));
        assert_eq!(catalogue_number("P"), Some(41));
        assert_eq!(catalogue_number("?"), None);

        let rows = catalogue_rows();
        assert_eq!(rows.len(), 41);
        assert_eq!(rows[1], Row::from(["2", "+", ""]));
    }

    #[test]
    fn batch_numbers_linked_by_symbol() {
        let batches = vec![
            batch_with_codes("1", &[("1", "X"), ("2", "R")]),
            batch_with_codes("2", &[("1", "R")]),
        ];
        let mut report = MergeReport::default();
        let linker = merge_fixed_codes(&batches, &mut report);

        assert_eq!(linker.lookup(&LocalKey::new(&BatchId::new("1"), "1")), Some(&1));
        assert_eq!(linker.lookup(&LocalKey::new(&BatchId::new("1"), "2")), Some(&10));
        assert_eq!(linker.lookup(&LocalKey::new(&BatchId::new("2"), "1")), Some(&10));
        assert!(!report.has_issues());
    }

    #[test]
    fn unknown_symbol_reported() {
        let batches = vec![batch_with_codes("1", &[("1", "Ω")])];
        let mut report = MergeReport::default();
        let linker = merge_fixed_codes(&batches, &mut report);
        assert!(linker.is_empty());
        assert_eq!(report.issues_of_kind("unknown_fixed_code_symbol").count(), 1);
    }

    #[test]
    fn rewrite_clears_unresolved_codes() {
        let b = BatchId::new("1");
        let mut codes = Linker::new("fixed code");
        codes.insert(LocalKey::new(&b, "3"), 12);

        let mut row = Row::from(["5", "Praha", "", "", "", "CZ", "3", "", "9"]);
        let mut report = MergeReport::default();
        rewrite_codes(&codes, &b, "Zastavky", 1, &mut row, stop::FIXED_CODES, &mut report);

        assert_eq!(row.field(6), "12");
        assert_eq!(row.field(7), "");
        assert_eq!(row.field(8), "");
        assert_eq!(report.issues_of_kind("unresolved_fixed_code").count(), 1);
    }
}
