use jdfmerge_core::{BatchId, Row};

use crate::fixed_code::rewrite_codes;
use crate::linker::{Linker, LocalKey, Unresolved};
use crate::merge::{merge_entities, EntityMerge, EntityModel};
use crate::reader::LoadedBatch;
use crate::report::MergeReport;
use crate::schema::{line_stop, TableSpec, LINE_STOPS};

/// A line's stop at one tariff position. Points at a line and a stop; has
/// no disambiguator of its own.
pub struct LineStopModel<'a> {
    pub lines: &'a Linker<u32>,
    pub stops: &'a Linker<u32>,
    pub fixed_codes: &'a Linker<u32>,
}

impl EntityModel for LineStopModel<'_> {
    fn entity(&self) -> &'static str {
        "line stop"
    }

    fn spec(&self) -> &'static TableSpec {
        &LINE_STOPS
    }

    fn resolve_references(
        &self,
        batch: &BatchId,
        line: usize,
        row: &mut Row,
        report: &mut MergeReport,
    ) -> Result<(), Unresolved> {
        let line_key = LocalKey::with_secondary(
            batch,
            row.field(line_stop::LINE_NUMBER),
            row.field(line_stop::LINE_DISAMBIGUATOR),
        );
        let line_d = *self.lines.resolve(&line_key)?;
        let stop_id = *self.stops.resolve(&LocalKey::new(batch, row.field(line_stop::STOP_ID)))?;

        row.set(line_stop::LINE_DISAMBIGUATOR, line_d.to_string());
        row.set(line_stop::STOP_ID, stop_id.to_string());
        rewrite_codes(
            self.fixed_codes,
            batch,
            LINE_STOPS.name,
            line,
            row,
            line_stop::FIXED_CODES,
            report,
        );
        Ok(())
    }

    fn primary(&self, row: &Row) -> String {
        row.field(line_stop::LINE_NUMBER).to_string()
    }

    fn identity(&self, row: &Row) -> Vec<String> {
        vec![
            row.field(line_stop::LINE_NUMBER).to_string(),
            row.field(line_stop::LINE_DISAMBIGUATOR).to_string(),
            row.field(line_stop::TARIFF_NUMBER).to_string(),
        ]
    }
}

pub fn merge_line_stops(
    batches: &[LoadedBatch],
    lines: &Linker<u32>,
    stops: &Linker<u32>,
    fixed_codes: &Linker<u32>,
    report: &mut MergeReport,
) -> EntityMerge {
    let model = LineStopModel {
        lines,
        stops,
        fixed_codes,
    };
    merge_entities(&model, batches, report)
}
