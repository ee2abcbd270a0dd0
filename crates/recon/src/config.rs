use chrono::NaiveDate;
use jdfmerge_core::record::FIELD_SEPARATOR;
use jdfmerge_core::Row;

use crate::error::MergeError;
use crate::schema::OUTPUT_VERSION;

/// Engine-level settings for one merge run.
///
/// The creation date is injected rather than read from the clock so that
/// merging the same batches twice yields identical tables.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Dataset name written to the version table.
    pub dataset_name: String,
    /// Creation date written to the version table.
    pub created: NaiveDate,
}

impl MergeConfig {
    pub fn new(dataset_name: impl Into<String>, created: NaiveDate) -> Self {
        Self {
            dataset_name: dataset_name.into(),
            created,
        }
    }

    pub fn validate(&self) -> Result<(), MergeError> {
        if self.dataset_name.trim().is_empty() {
            return Err(MergeError::ConfigValidation(
                "dataset name must not be empty".into(),
            ));
        }

        // Would split into two fields when the version table is read back
        if self.dataset_name.contains(FIELD_SEPARATOR) {
            return Err(MergeError::ConfigValidation(format!(
                "dataset name must not contain {FIELD_SEPARATOR}"
            )));
        }

        if self.dataset_name.contains(['\r', '\n']) {
            return Err(MergeError::ConfigValidation(
                "dataset name must be a single line".into(),
            ));
        }

        Ok(())
    }

    /// The single row of the output version table.
    pub fn version_row(&self) -> Row {
        Row::new(vec![
            OUTPUT_VERSION.to_string(),
            String::new(),
            String::new(),
            String::new(),
            self.created.format("%d%m%Y").to_string(),
            self.dataset_name.clone(),
        ])
    }
}
