use jdfmerge_core::{BatchId, Row};

use crate::linker::LocalKey;
use crate::merge::{merge_entities, EntityMerge, EntityModel};
use crate::reader::LoadedBatch;
use crate::report::MergeReport;
use crate::schema::{carrier, TableSpec, CARRIERS};

/// Carriers are the same entity when tax id, registered address and legal
/// form agree. Carriers sharing a tax id otherwise are told apart by the
/// disambiguator.
pub struct CarrierModel;

impl EntityModel for CarrierModel {
    fn entity(&self) -> &'static str {
        "carrier"
    }

    fn spec(&self) -> &'static TableSpec {
        &CARRIERS
    }

    fn primary(&self, row: &Row) -> String {
        row.field(carrier::TAX_ID).to_string()
    }

    fn identity(&self, row: &Row) -> Vec<String> {
        vec![
            row.field(carrier::TAX_ID).to_string(),
            row.field(carrier::ADDRESS).to_string(),
            row.field(carrier::LEGAL_FORM).to_string(),
        ]
    }

    fn local_key(&self, batch: &BatchId, original: &Row) -> Option<LocalKey> {
        Some(LocalKey::with_secondary(
            batch,
            original.field(carrier::TAX_ID),
            original.field(carrier::DISAMBIGUATOR),
        ))
    }

    fn disambiguator_field(&self) -> Option<usize> {
        Some(carrier::DISAMBIGUATOR)
    }
}

pub fn merge_carriers(batches: &[LoadedBatch], report: &mut MergeReport) -> EntityMerge {
    merge_entities(&CarrierModel, batches, report)
}
