use serde::{Deserialize, Serialize};

/// One record of one table: an ordered sequence of string fields.
///
/// Field access is total. Reading past the end yields `""` and writing past
/// the end pads with empty fields, so short rows never panic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Vec<String>);

impl Row {
    pub fn new(fields: Vec<String>) -> Self {
        Self(fields)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Field at `idx`, or `""` when the row is shorter.
    pub fn field(&self, idx: usize) -> &str {
        self.0.get(idx).map(String::as_str).unwrap_or("")
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }

    /// Overwrite the field at `idx`, padding the row first if needed.
    pub fn set(&mut self, idx: usize, value: impl Into<String>) {
        self.pad(idx + 1);
        self.0[idx] = value.into();
    }

    /// Insert a field before `idx`, shifting later fields right.
    pub fn insert(&mut self, idx: usize, value: impl Into<String>) {
        self.pad(idx);
        self.0.insert(idx, value.into());
    }

    pub fn push(&mut self, value: impl Into<String>) {
        self.0.push(value.into());
    }

    /// Grow the row to at least `width` fields with empty values.
    pub fn pad(&mut self, width: usize) {
        if self.0.len() < width {
            self.0.resize(width, String::new());
        }
    }
}

impl From<Vec<String>> for Row {
    fn from(fields: Vec<String>) -> Self {
        Self(fields)
    }
}

impl<const N: usize> From<[&str; N]> for Row {
    fn from(fields: [&str; N]) -> Self {
        Self(fields.iter().map(|f| f.to_string()).collect())
    }
}

impl FromIterator<String> for Row {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_past_end_is_empty() {
        let row = Row::from(["a", "b"]);
        assert_eq!(row.field(1), "b");
        assert_eq!(row.field(7), "");
    }

    #[test]
    fn set_pads_short_rows() {
        let mut row = Row::from(["a"]);
        row.set(3, "d");
        assert_eq!(row, Row::from(["a", "", "", "d"]));
    }

    #[test]
    fn insert_shifts_and_pads() {
        let mut row = Row::from(["a", "c"]);
        row.insert(1, "b");
        assert_eq!(row, Row::from(["a", "b", "c"]));

        let mut short = Row::from(["a"]);
        short.insert(3, "x");
        assert_eq!(short, Row::from(["a", "", "", "x"]));
    }

    #[test]
    fn serializes_as_plain_array() {
        let row = Row::from(["1", "Praha"]);
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"["1","Praha"]"#);
    }
}
