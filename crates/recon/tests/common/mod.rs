#![allow(dead_code)]

use chrono::NaiveDate;
use jdfmerge_core::record::format_records;
use jdfmerge_core::{BatchId, Row};
use jdfmerge_recon::{BatchSource, MergeConfig, MergeError};

/// Batch source over in-memory table texts.
#[derive(Default, Clone)]
pub struct MemorySource {
    batches: Vec<(BatchId, Vec<(String, String)>)>,
}

impl MemorySource {
    pub fn with(mut self, batch: TestBatch) -> Self {
        self.batches.push((BatchId::new(batch.name.as_str()), batch.tables));
        self
    }
}

impl BatchSource for MemorySource {
    fn batches(&mut self) -> Result<Vec<BatchId>, MergeError> {
        Ok(self.batches.iter().map(|(id, _)| id.clone()).collect())
    }

    fn open_table(&mut self, batch: &BatchId, table: &str) -> Result<Option<String>, MergeError> {
        Ok(self
            .batches
            .iter()
            .find(|(id, _)| id == batch)
            .and_then(|(_, tables)| tables.iter().find(|(name, _)| name == table))
            .map(|(_, text)| text.clone()))
    }
}

/// Builder for one batch. Every mandatory table is present (possibly empty).
pub struct TestBatch {
    name: String,
    tables: Vec<(String, String)>,
}

impl TestBatch {
    pub fn new(name: &str, version: &str) -> Self {
        let mut batch = Self {
            name: name.to_string(),
            tables: Vec::new(),
        };
        batch.table("VerzeJDF", vec![Row::from([version, "", "", "", "01012015", "test"])]);
        for table in ["Pevnykod", "Dopravci", "Zastavky", "Linky", "Zaslinky"] {
            batch.table(table, Vec::new());
        }
        batch
    }

    /// Replace the text of `table`.
    pub fn table(&mut self, table: &str, rows: Vec<Row>) -> &mut Self {
        let text = format_records(&rows);
        match self.tables.iter_mut().find(|(name, _)| name == table) {
            Some(entry) => entry.1 = text,
            None => self.tables.push((table.to_string(), text)),
        }
        self
    }

    pub fn without(mut self, table: &str) -> Self {
        self.tables.retain(|(name, _)| name != table);
        self
    }

    pub fn carriers(mut self, rows: Vec<Row>) -> Self {
        self.table("Dopravci", rows);
        self
    }

    pub fn stops(mut self, rows: Vec<Row>) -> Self {
        self.table("Zastavky", rows);
        self
    }

    pub fn lines(mut self, rows: Vec<Row>) -> Self {
        self.table("Linky", rows);
        self
    }

    pub fn line_stops(mut self, rows: Vec<Row>) -> Self {
        self.table("Zaslinky", rows);
        self
    }

    pub fn fixed_codes(mut self, rows: Vec<Row>) -> Self {
        self.table("Pevnykod", rows);
        self
    }
}

pub fn config() -> MergeConfig {
    MergeConfig::new("Autobusy", NaiveDate::from_ymd_opt(2015, 3, 1).unwrap())
}

/// Current-layout carrier row.
pub fn carrier(tax_id: &str, name: &str, legal_form: &str, address: &str, disambiguator: &str) -> Row {
    Row::from([
        tax_id, "", name, legal_form, "", address, "", "", "", "", "", "", disambiguator,
    ])
}

/// Current-layout line row.
pub fn line(number: &str, carrier: &str, carrier_d: &str, from: &str, to: &str, d: &str) -> Row {
    Row::from([
        number, "Linka", carrier, "N", "A", "0", "0", "0", "0", "", "LIC", "", "", from, to, carrier_d, d,
    ])
}

/// Current-layout stop row.
pub fn stop(id: &str, town: &str, part: &str, place: &str) -> Row {
    Row::from([id, town, part, place, "", "CZ", "", "", "", "", "", ""])
}

/// Current-layout line-stop row.
pub fn line_stop(line: &str, line_d: &str, tariff: &str, stop: &str) -> Row {
    Row::from([line, line_d, tariff, "", stop, "", "", "", ""])
}
