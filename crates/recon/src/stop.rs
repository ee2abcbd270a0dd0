//! Stop merge. Stops are keyed by (name, district, country) and must exist
//! in the reference list; batches only refine them.

use std::collections::HashMap;

use jdfmerge_core::Row;

use crate::canonical::refine;
use crate::fixed_code::rewrite_codes;
use crate::linker::{Linker, LocalKey};
use crate::reader::{LoadedBatch, ReferenceStop};
use crate::report::{MergeIssue, MergeReport};
use crate::schema::{stop, STOPS};

type StopKey = (String, String, String);

/// Result of the stop merge phase.
#[derive(Debug)]
pub struct StopMerge {
    /// Output rows, field 0 holding the final stop id.
    pub rows: Vec<Row>,
    /// Local stop id -> final stop id.
    pub linker: Linker<u32>,
}

/// Stop name as listed in the reference list: town, town part and nearby
/// place joined with commas, trailing empty parts dropped.
pub fn stop_name(row: &Row) -> String {
    let mut parts = vec![
        row.field(stop::TOWN),
        row.field(stop::TOWN_PART),
        row.field(stop::PLACE),
    ];
    while parts.last().is_some_and(|part| part.is_empty()) {
        parts.pop();
    }
    parts.join(",")
}

/// Merge the stops of every batch against the reference list.
///
/// Reference entries get provisional ids in list order. Only stops that
/// some batch uses are emitted, renumbered 1..=m in provisional order.
pub fn merge_stops(
    reference: &[ReferenceStop],
    batches: &[LoadedBatch],
    fixed_codes: &Linker<u32>,
    report: &mut MergeReport,
) -> StopMerge {
    let mut provisional: HashMap<StopKey, usize> = HashMap::with_capacity(reference.len());
    for (idx, entry) in reference.iter().enumerate() {
        let key = (entry.name.clone(), entry.district.clone(), entry.country.clone());
        provisional.entry(key).or_insert(idx);
    }

    let mut seen: Vec<Option<Row>> = vec![None; reference.len()];
    let mut locals: Linker<usize> = Linker::new("stop");
    let mut rows_read = 0;
    let mut rows_dropped = 0;

    for batch in batches {
        for (idx, original) in batch.rows(&STOPS).iter().enumerate() {
            let line = idx + 1;
            rows_read += 1;

            let name = stop_name(original);
            let district = original.field(stop::DISTRICT);
            let country = original.field(stop::COUNTRY);
            let key = (name, district.to_string(), country.to_string());

            let Some(&slot) = provisional.get(&key) else {
                let (name, district, country) = key;
                report.issue(MergeIssue::UnknownStop {
                    batch: batch.id.clone(),
                    row: line,
                    local_id: original.field(stop::ID).to_string(),
                    name,
                    district,
                    country,
                });
                rows_dropped += 1;
                continue;
            };

            let mut row = original.clone();
            rewrite_codes(fixed_codes, &batch.id, STOPS.name, line, &mut row, stop::FIXED_CODES, report);
            match &mut seen[slot] {
                Some(existing) => refine(existing, &row),
                empty => *empty = Some(row),
            }

            let local_id = original.field(stop::ID);
            if let Some(previous) = locals.insert(LocalKey::new(&batch.id, local_id), slot) {
                if previous != slot {
                    report.issue(MergeIssue::DuplicateLocalId {
                        batch: batch.id.clone(),
                        table: STOPS.name,
                        row: line,
                        key: local_id.to_string(),
                    });
                }
            }
        }
    }

    // Renumber the stops actually used
    let mut final_ids: Vec<Option<u32>> = vec![None; seen.len()];
    let mut rows = Vec::new();
    for (slot, entry) in seen.into_iter().enumerate() {
        if let Some(mut row) = entry {
            let id = rows.len() as u32 + 1;
            row.set(stop::ID, id.to_string());
            final_ids[slot] = Some(id);
            rows.push(row);
        }
    }
    let linker = locals.map_values(|&slot| final_ids[slot]);

    log::info!(
        "{}: {} rows read, {} dropped, {} of {} reference stops used",
        STOPS.name,
        rows_read,
        rows_dropped,
        rows.len(),
        reference.len()
    );
    let summary = report.table_mut(STOPS.name);
    summary.rows_read = rows_read;
    summary.rows_dropped = rows_dropped;
    summary.canonical_rows = rows.len();

    StopMerge { rows, linker }
}
