use std::collections::BTreeMap;
use std::fmt;

use jdfmerge_core::BatchId;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Issues
// ---------------------------------------------------------------------------

/// A problem that dropped part of a batch's contribution but did not stop
/// the run. Row numbers are 1-based positions within the batch table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MergeIssue {
    /// A mandatory table is absent; the entity type gets nothing from this batch.
    MissingTable { batch: BatchId, table: &'static str },
    /// The version table is missing a usable version; the whole batch is skipped.
    InvalidVersion { batch: BatchId, value: String },
    /// The batch could not be read or decoded; the whole batch is skipped.
    BatchUnreadable { batch: BatchId, reason: String },
    /// A foreign key did not resolve; the row is dropped.
    UnresolvedReference {
        batch: BatchId,
        table: &'static str,
        row: usize,
        entity: &'static str,
        key: String,
    },
    /// A batch stop whose name is not in the reference list; the row is dropped.
    UnknownStop {
        batch: BatchId,
        row: usize,
        local_id: String,
        name: String,
        district: String,
        country: String,
    },
    /// A batch fixed code whose symbol is not in the catalogue.
    UnknownFixedCodeSymbol {
        batch: BatchId,
        number: String,
        symbol: String,
    },
    /// A fixed-code reference that did not resolve; the field is cleared.
    UnresolvedFixedCode {
        batch: BatchId,
        table: &'static str,
        row: usize,
        code: String,
    },
    /// Two rows of one batch share a local identifier; the later one wins.
    DuplicateLocalId {
        batch: BatchId,
        table: &'static str,
        row: usize,
        key: String,
    },
}

impl MergeIssue {
    /// Stable snake_case name of the issue kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingTable { .. } => "missing_table",
            Self::InvalidVersion { .. } => "invalid_version",
            Self::BatchUnreadable { .. } => "batch_unreadable",
            Self::UnresolvedReference { .. } => "unresolved_reference",
            Self::UnknownStop { .. } => "unknown_stop",
            Self::UnknownFixedCodeSymbol { .. } => "unknown_fixed_code_symbol",
            Self::UnresolvedFixedCode { .. } => "unresolved_fixed_code",
            Self::DuplicateLocalId { .. } => "duplicate_local_id",
        }
    }

    pub fn batch(&self) -> &BatchId {
        match self {
            Self::MissingTable { batch, .. }
            | Self::InvalidVersion { batch, .. }
            | Self::BatchUnreadable { batch, .. }
            | Self::UnresolvedReference { batch, .. }
            | Self::UnknownStop { batch, .. }
            | Self::UnknownFixedCodeSymbol { batch, .. }
            | Self::UnresolvedFixedCode { batch, .. }
            | Self::DuplicateLocalId { batch, .. } => batch,
        }
    }
}

impl fmt::Display for MergeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTable { batch, table } => {
                write!(f, "batch {batch}: mandatory table {table} is missing")
            }
            Self::InvalidVersion { batch, value } => {
                write!(f, "batch {batch}: unsupported or unreadable version '{value}', batch skipped")
            }
            Self::BatchUnreadable { batch, reason } => {
                write!(f, "batch {batch}: unreadable ({reason}), batch skipped")
            }
            Self::UnresolvedReference { batch, table, row, entity, key } => {
                write!(f, "batch {batch}: {table} row {row} references unknown {entity} {key}, row dropped")
            }
            Self::UnknownStop { batch, row, local_id, name, district, country } => {
                write!(
                    f,
                    "batch {batch}: stop {local_id} (row {row}) '{name}' [{district}, {country}] is not in the reference list, row dropped"
                )
            }
            Self::UnknownFixedCodeSymbol { batch, number, symbol } => {
                write!(f, "batch {batch}: fixed code {number} has unknown symbol '{symbol}'")
            }
            Self::UnresolvedFixedCode { batch, table, row, code } => {
                write!(f, "batch {batch}: {table} row {row} uses undefined fixed code {code}, field cleared")
            }
            Self::DuplicateLocalId { batch, table, row, key } => {
                write!(f, "batch {batch}: {table} row {row} repeats local id {key}, later row wins")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub canonical_rows: usize,
}

/// Everything a run reports besides its output tables.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MergeReport {
    pub batches_read: usize,
    pub batches_skipped: usize,
    pub tables: BTreeMap<&'static str, TableSummary>,
    pub issues: Vec<MergeIssue>,
}

impl MergeReport {
    /// Record an issue and log it as a warning.
    pub fn issue(&mut self, issue: MergeIssue) {
        log::warn!("{issue}");
        self.issues.push(issue);
    }

    pub fn table_mut(&mut self, table: &'static str) -> &mut TableSummary {
        self.tables.entry(table).or_default()
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn issues_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a MergeIssue> + 'a {
        self.issues.iter().filter(move |issue| issue.kind() == kind)
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total_issues: usize,
    pub batch_failures: usize,
    pub dropped_rows: usize,
    pub cleared_fields: usize,
    pub issue_counts: BTreeMap<&'static str, usize>,
}

/// Count issues by severity class and kind.
pub fn compute_summary(report: &MergeReport) -> ReportSummary {
    let mut summary = ReportSummary {
        total_issues: report.issues.len(),
        ..Default::default()
    };

    for issue in &report.issues {
        *summary.issue_counts.entry(issue.kind()).or_insert(0) += 1;

        match issue {
            MergeIssue::MissingTable { .. }
            | MergeIssue::InvalidVersion { .. }
            | MergeIssue::BatchUnreadable { .. } => summary.batch_failures += 1,
            MergeIssue::UnresolvedReference { .. } | MergeIssue::UnknownStop { .. } => {
                summary.dropped_rows += 1
            }
            MergeIssue::UnresolvedFixedCode { .. } => summary.cleared_fields += 1,
            MergeIssue::UnknownFixedCodeSymbol { .. } | MergeIssue::DuplicateLocalId { .. } => {}
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch() -> BatchId {
        BatchId::new("3")
    }

    #[test]
    fn summary_counts() {
        let mut report = MergeReport::default();
        report.issue(MergeIssue::MissingTable { batch: batch(), table: "Linky" });
        report.issue(MergeIssue::UnresolvedReference {
            batch: batch(),
            table: "Linky",
            row: 2,
            entity: "carrier",
            key: "123/1".into(),
        });
        report.issue(MergeIssue::UnresolvedReference {
            batch: batch(),
            table: "Linky",
            row: 5,
            entity: "carrier",
            key: "456/1".into(),
        });
        report.issue(MergeIssue::UnresolvedFixedCode {
            batch: batch(),
            table: "Zastavky",
            row: 1,
            code: "9".into(),
        });

        let summary = compute_summary(&report);
        assert_eq!(summary.total_issues, 4);
        assert_eq!(summary.batch_failures, 1);
        assert_eq!(summary.dropped_rows, 2);
        assert_eq!(summary.cleared_fields, 1);
        assert_eq!(summary.issue_counts["unresolved_reference"], 2);
    }

    #[test]
    fn issue_serializes_with_kind_tag() {
        let issue = MergeIssue::MissingTable { batch: batch(), table: "Dopravci" };
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["kind"], "missing_table");
        assert_eq!(json["batch"], "3");
        assert_eq!(json["table"], "Dopravci");
    }

    #[test]
    fn display_names_batch_and_row() {
        let issue = MergeIssue::UnresolvedReference {
            batch: batch(),
            table: "Linky",
            row: 4,
            entity: "carrier",
            key: "123/2".into(),
        };
        let text = issue.to_string();
        assert!(text.contains("batch 3"));
        assert!(text.contains("row 4"));
        assert!(text.contains("row dropped"));
    }
}
