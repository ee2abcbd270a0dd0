//! Natural-key merge: folds the rows of one entity type from every batch
//! into a canonical table and records where each batch-local identifier
//! ended up.

use jdfmerge_core::{BatchId, Row};

use crate::canonical::{CanonicalTable, Slot};
use crate::linker::{Linker, LocalKey, Unresolved};
use crate::reader::LoadedBatch;
use crate::report::{MergeIssue, MergeReport};
use crate::schema::TableSpec;

/// How one entity type is keyed and linked.
pub trait EntityModel {
    /// Entity name used in linker lookups and reports.
    fn entity(&self) -> &'static str;

    fn spec(&self) -> &'static TableSpec;

    /// Rewrite foreign-key fields of `row` to canonical identifiers.
    /// An unresolved key drops the row.
    fn resolve_references(
        &self,
        _batch: &BatchId,
        _line: usize,
        _row: &mut Row,
        _report: &mut MergeReport,
    ) -> Result<(), Unresolved> {
        Ok(())
    }

    /// Value of the primary identifying field.
    fn primary(&self, row: &Row) -> String;

    /// Natural key followed by the identity-confirming fields. Two rows are
    /// the same canonical entity exactly when these are equal.
    fn identity(&self, row: &Row) -> Vec<String>;

    /// Local reference of the row as read from the batch, for entity types
    /// that other tables point at.
    fn local_key(&self, _batch: &BatchId, _original: &Row) -> Option<LocalKey> {
        None
    }

    /// Output field that receives the canonical disambiguator.
    fn disambiguator_field(&self) -> Option<usize> {
        None
    }
}

/// Result of one entity-type merge phase.
#[derive(Debug)]
pub struct EntityMerge {
    pub table: CanonicalTable,
    /// Local reference -> canonical disambiguator.
    pub linker: Linker<u32>,
}

/// Merge one entity type across all batches.
///
/// Rows are folded in batch order, then row order. Disambiguators are
/// assigned only after every row is consumed, so a primary-value group is
/// numbered 1..=k by first sighting.
pub fn merge_entities<M: EntityModel + ?Sized>(
    model: &M,
    batches: &[LoadedBatch],
    report: &mut MergeReport,
) -> EntityMerge {
    let spec = model.spec();
    let mut table = CanonicalTable::new();
    let mut slots: Linker<Slot> = Linker::new(model.entity());
    let mut rows_read = 0;
    let mut rows_dropped = 0;

    for batch in batches {
        for (idx, original) in batch.rows(spec).iter().enumerate() {
            let line = idx + 1;
            rows_read += 1;

            let mut row = original.clone();
            if let Err(unresolved) = model.resolve_references(&batch.id, line, &mut row, report) {
                report.issue(MergeIssue::UnresolvedReference {
                    batch: batch.id.clone(),
                    table: spec.name,
                    row: line,
                    entity: unresolved.entity,
                    key: unresolved.key.describe(),
                });
                rows_dropped += 1;
                continue;
            }

            let primary = model.primary(&row);
            let identity = model.identity(&row);
            let slot = table.fold(primary, identity, row).slot();

            if let Some(key) = model.local_key(&batch.id, original) {
                let described = key.describe();
                if let Some(previous) = slots.insert(key, slot) {
                    if previous != slot {
                        report.issue(MergeIssue::DuplicateLocalId {
                            batch: batch.id.clone(),
                            table: spec.name,
                            row: line,
                            key: described,
                        });
                    }
                }
            }
        }
    }

    table.assign_disambiguators(model.disambiguator_field());
    let linker = slots.map_values(|&slot| Some(table.disambiguator(slot)));

    log::info!(
        "{}: {} rows read, {} dropped, {} canonical",
        spec.name,
        rows_read,
        rows_dropped,
        table.len()
    );
    let summary = report.table_mut(spec.name);
    summary.rows_read = rows_read;
    summary.rows_dropped = rows_dropped;
    summary.canonical_rows = table.len();

    EntityMerge { table, linker }
}
