//! Schema-less tabular data model for harvested listings.
//!
//! A listing record is whatever the extractor set happened to return: a flat
//! map from field name to a tagged scalar. The dataset is a growable table
//! whose column set only ever widens — rows collected before a column first
//! appeared read back as null.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Field used as the logical row key for deduplication.
pub const URL_FIELD: &str = "url";

/// A tagged optional scalar, the only value shape a field can take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Parse a CSV cell back into a value. Cells carry no type tag, so the
    /// narrowest numeric interpretation wins; an empty cell is null.
    pub fn from_cell(cell: &str) -> Self {
        if cell.is_empty() {
            return Value::Null;
        }
        if let Ok(n) = cell.parse::<i64>() {
            return Value::Int(n);
        }
        if let Ok(f) = cell.parse::<f64>() {
            return Value::Float(f);
        }
        Value::Text(cell.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Null => Ok(()),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

/// One extracted listing: field name -> value.
pub type ListingRecord = BTreeMap<String, Value>;

/// Ordered collection of listing records accumulated across runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// Column names in order of first appearance. Only ever grows.
    columns: Vec<String>,
    rows: Vec<ListingRecord>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[ListingRecord] {
        &self.rows
    }

    /// Cell lookup; absent attributes in older rows read as null.
    pub fn get(&self, row: usize, column: &str) -> Value {
        self.rows
            .get(row)
            .and_then(|r| r.get(column).cloned())
            .unwrap_or(Value::Null)
    }

    /// True iff a non-null `url` equal to `url` exists in the dataset.
    /// A dataset without a `url` column contains nothing.
    pub fn contains_url(&self, url: &str) -> bool {
        if !self.columns.iter().any(|c| c == URL_FIELD) {
            return false;
        }
        self.rows
            .iter()
            .any(|row| row.get(URL_FIELD).and_then(Value::as_str) == Some(url))
    }

    /// Merge one record, keyed by its `url` field: an existing row sharing
    /// the url is replaced in place, otherwise the record is appended. New
    /// attribute names extend the column set; other rows are untouched.
    pub fn merge(&mut self, record: ListingRecord) {
        for field in record.keys() {
            if !self.columns.iter().any(|c| c == field) {
                self.columns.push(field.clone());
            }
        }

        let url = record.get(URL_FIELD).and_then(Value::as_str);
        if let Some(url) = url {
            if let Some(existing) = self
                .rows
                .iter_mut()
                .find(|row| row.get(URL_FIELD).and_then(Value::as_str) == Some(url))
            {
                *existing = record;
                return;
            }
        }
        self.rows.push(record);
    }

    /// Rebuild a dataset from a header and string rows (CSV read path).
    pub fn from_string_rows(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let parsed_rows = rows
            .into_iter()
            .map(|cells| {
                columns
                    .iter()
                    .zip(cells.iter())
                    .filter(|(_, cell)| !cell.is_empty())
                    .map(|(col, cell)| (col.clone(), Value::from_cell(cell)))
                    .collect::<ListingRecord>()
            })
            .collect();
        Self {
            columns,
            rows: parsed_rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[(&str, Value)]) -> ListingRecord {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn contains_url_without_url_column() {
        let mut dataset = Dataset::new();
        dataset.merge(record(&[("price", Value::Int(100))]));
        assert!(!dataset.contains_url("https://example.com/a"));
    }

    #[test]
    fn contains_url_matches_existing_row() {
        let mut dataset = Dataset::new();
        dataset.merge(record(&[("url", Value::from("https://example.com/a"))]));
        assert!(dataset.contains_url("https://example.com/a"));
        assert!(!dataset.contains_url("https://example.com/b"));
    }

    #[test]
    fn merge_disjoint_urls_appends() {
        let mut dataset = Dataset::new();
        dataset.merge(record(&[
            ("url", Value::from("https://example.com/a")),
            ("price", Value::Int(100)),
        ]));
        let before = dataset.rows()[0].clone();

        dataset.merge(record(&[("url", Value::from("https://example.com/b"))]));
        dataset.merge(record(&[("url", Value::from("https://example.com/c"))]));

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.rows()[0], before);
    }

    // Re-fetching a known listing must update the row, never duplicate it.
    #[test]
    fn merge_same_url_replaces_row() {
        let mut dataset = Dataset::new();
        dataset.merge(record(&[
            ("url", Value::from("https://example.com/a")),
            ("price", Value::Int(100)),
        ]));
        dataset.merge(record(&[
            ("url", Value::from("https://example.com/a")),
            ("price", Value::Int(90)),
        ]));

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.get(0, "price"), Value::Int(90));
    }

    #[test]
    fn columns_grow_monotonically_and_old_rows_read_null() {
        let mut dataset = Dataset::new();
        dataset.merge(record(&[("url", Value::from("https://example.com/a"))]));
        dataset.merge(record(&[
            ("url", Value::from("https://example.com/b")),
            ("floor", Value::Int(4)),
        ]));

        assert_eq!(dataset.columns(), &["url".to_string(), "floor".to_string()]);
        assert_eq!(dataset.get(0, "floor"), Value::Null);
        assert_eq!(dataset.get(1, "floor"), Value::Int(4));
    }

    #[test]
    fn cell_parsing_round_trip() {
        assert_eq!(Value::from_cell(""), Value::Null);
        assert_eq!(Value::from_cell("1500000"), Value::Int(1500000));
        assert_eq!(Value::from_cell("119.64"), Value::Float(119.64));
        assert_eq!(Value::from_cell("kamienica"), Value::Text("kamienica".into()));
    }
}
