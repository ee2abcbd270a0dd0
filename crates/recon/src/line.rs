use jdfmerge_core::{BatchId, Row};

use crate::linker::{Linker, LocalKey, Unresolved};
use crate::merge::{merge_entities, EntityMerge, EntityModel};
use crate::reader::LoadedBatch;
use crate::report::MergeReport;
use crate::schema::{line, TableSpec, LINES};

/// Lines are keyed by number and timetable validity, confirmed by the
/// canonical carrier that operates them.
pub struct LineModel<'a> {
    pub carriers: &'a Linker<u32>,
}

impl EntityModel for LineModel<'_> {
    fn entity(&self) -> &'static str {
        "line"
    }

    fn spec(&self) -> &'static TableSpec {
        &LINES
    }

    fn resolve_references(
        &self,
        batch: &BatchId,
        _line: usize,
        row: &mut Row,
        _report: &mut MergeReport,
    ) -> Result<(), Unresolved> {
        let key = LocalKey::with_secondary(
            batch,
            row.field(line::CARRIER_TAX_ID),
            row.field(line::CARRIER_DISAMBIGUATOR),
        );
        let canonical = *self.carriers.resolve(&key)?;
        row.set(line::CARRIER_DISAMBIGUATOR, canonical.to_string());
        Ok(())
    }

    fn primary(&self, row: &Row) -> String {
        row.field(line::NUMBER).to_string()
    }

    fn identity(&self, row: &Row) -> Vec<String> {
        [
            line::NUMBER,
            line::VALID_FROM,
            line::VALID_TO,
            line::CARRIER_TAX_ID,
            line::CARRIER_DISAMBIGUATOR,
        ]
        .iter()
        .map(|&idx| row.field(idx).to_string())
        .collect()
    }

    fn local_key(&self, batch: &BatchId, original: &Row) -> Option<LocalKey> {
        Some(LocalKey::with_secondary(
            batch,
            original.field(line::NUMBER),
            original.field(line::DISAMBIGUATOR),
        ))
    }

    fn disambiguator_field(&self) -> Option<usize> {
        Some(line::DISAMBIGUATOR)
    }
}

/// Merge lines, rewriting each carrier reference through `carriers`.
pub fn merge_lines(batches: &[LoadedBatch], carriers: &Linker<u32>, report: &mut MergeReport) -> EntityMerge {
    merge_entities(&LineModel { carriers }, batches, report)
}
