use jdfmerge_core::Row;
use serde::Serialize;

use crate::carrier::merge_carriers;
use crate::config::MergeConfig;
use crate::error::MergeError;
use crate::fixed_code::{catalogue_rows, merge_fixed_codes};
use crate::line::merge_lines;
use crate::line_stop::merge_line_stops;
use crate::reader::{load_batches, BatchSource, ReferenceStop};
use crate::report::MergeReport;
use crate::schema::{self, CARRIERS, FIXED_CODES, LINES, LINE_STOPS, STOPS};
use crate::stop::merge_stops;
use crate::writer::{flatten, sort_rows};

/// One output table, ready to serialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputTable {
    pub name: &'static str,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MergeMeta {
    pub dataset_name: String,
    pub created: chrono::NaiveDate,
    pub output_version: &'static str,
    pub engine_version: String,
}

/// Everything one run produces. Nothing is written by the engine itself.
#[derive(Debug, Clone, Serialize)]
pub struct MergeOutput {
    pub meta: MergeMeta,
    pub tables: Vec<OutputTable>,
    pub report: MergeReport,
}

impl MergeOutput {
    pub fn table(&self, name: &str) -> Option<&OutputTable> {
        self.tables.iter().find(|table| table.name == name)
    }
}

/// Merge every batch of `source` into one dataset.
///
/// Phases run in dependency order: fixed codes, carriers, stops, lines,
/// line stops. Each phase only reads the linkers of earlier phases.
pub fn run<S: BatchSource + ?Sized>(
    config: &MergeConfig,
    source: &mut S,
    reference: &[ReferenceStop],
) -> Result<MergeOutput, MergeError> {
    config.validate()?;
    if reference.is_empty() {
        return Err(MergeError::EmptyReferenceList);
    }

    let mut report = MergeReport::default();
    let batches = load_batches(source, &mut report)?;
    log::info!(
        "loaded {} batches ({} skipped), {} reference stops",
        report.batches_read,
        report.batches_skipped,
        reference.len()
    );

    let fixed_codes = merge_fixed_codes(&batches, &mut report);
    let carriers = merge_carriers(&batches, &mut report);
    let stops = merge_stops(reference, &batches, &fixed_codes, &mut report);
    let lines = merge_lines(&batches, &carriers.linker, &mut report);
    let line_stops = merge_line_stops(&batches, &lines.linker, &stops.linker, &fixed_codes, &mut report);

    let tables = vec![
        OutputTable {
            name: schema::VERSION.name,
            rows: vec![config.version_row()],
        },
        OutputTable {
            name: FIXED_CODES.name,
            rows: catalogue_rows(),
        },
        OutputTable {
            name: CARRIERS.name,
            rows: flatten(&carriers.table),
        },
        OutputTable {
            name: STOPS.name,
            rows: sort_rows(stops.rows),
        },
        OutputTable {
            name: LINES.name,
            rows: flatten(&lines.table),
        },
        OutputTable {
            name: LINE_STOPS.name,
            rows: flatten(&line_stops.table),
        },
    ];

    log::info!("merge finished with {} issues", report.issues.len());

    Ok(MergeOutput {
        meta: MergeMeta {
            dataset_name: config.dataset_name.clone(),
            created: config.created,
            output_version: schema::OUTPUT_VERSION,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
        },
        tables,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::tests::MemorySource;
    use chrono::NaiveDate;

    fn config() -> MergeConfig {
        MergeConfig::new("Autobusy", NaiveDate::from_ymd_opt(2015, 1, 2).unwrap())
    }

    #[test]
    fn empty_reference_list_aborts() {
        let mut source = MemorySource::default();
        let err = run(&config(), &mut source, &[]).unwrap_err();
        assert!(matches!(err, MergeError::EmptyReferenceList));
    }

    #[test]
    fn invalid_config_aborts() {
        let mut source = MemorySource::default();
        let reference = [ReferenceStop::new("Jihlava", "", "CZ")];
        let bad = MergeConfig::new("", NaiveDate::from_ymd_opt(2015, 1, 2).unwrap());
        assert!(matches!(
            run(&bad, &mut source, &reference),
            Err(MergeError::ConfigValidation(_))
        ));
    }

    #[test]
    fn no_batches_yields_fixed_tables_only() {
        let mut source = MemorySource::default();
        let reference = [ReferenceStop::new("Jihlava", "", "CZ")];
        let output = run(&config(), &mut source, &reference).unwrap();

        let names: Vec<&str> = output.tables.iter().map(|t| t.name).collect();
        assert_eq!(names, ["VerzeJDF", "Pevnykod", "Dopravci", "Zastavky", "Linky", "Zaslinky"]);
        assert_eq!(output.table("VerzeJDF").unwrap().rows[0].field(4), "02012015");
        assert_eq!(output.table("Pevnykod").unwrap().rows.len(), 41);
        assert!(output.table("Dopravci").unwrap().rows.is_empty());
        assert_eq!(output.meta.output_version, "1.11");
    }
}
