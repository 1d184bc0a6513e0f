//! Uploaded datasets and their column schema

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Backend-assigned dataset identifier
pub type DatasetId = String;

/// One materialized row, keyed by column name in source order
pub type Row = IndexMap<String, CellValue>;

/// A single cell of tabular data
///
/// Variant order matters for decoding: strings that parse as RFC 3339
/// timestamps become `Date`, everything else stays `Text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(f64),
    Date(DateTime<Utc>),
    Text(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Numeric view of the cell, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Column types reported by the upload backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    String,
    Number,
    Date,
    Boolean,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Number => "number",
            ColumnType::Date => "date",
            ColumnType::Boolean => "boolean",
        }
    }
}

/// Schema entry for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,

    #[serde(rename = "type")]
    pub column_type: ColumnType,

    /// Detection confidence in `[0, 1]`
    pub confidence: f64,
}

impl ColumnSchema {
    /// Create a column schema, clamping confidence into `[0, 1]`
    pub fn new(name: impl Into<String>, column_type: ColumnType, confidence: f64) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };

        Self {
            name: name.into(),
            column_type,
            confidence,
        }
    }
}

/// A tabular dataset as delivered by the upload service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub id: DatasetId,
    pub name: String,

    /// Materialized rows; may be a prefix of the full dataset
    pub data: Vec<Row>,

    /// Columns in source file order
    pub columns: Vec<ColumnSchema>,

    /// Authoritative row count reported by the backend
    pub row_count: usize,

    pub uploaded_at: DateTime<Utc>,
}

impl Dataset {
    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Whether the backend sent fewer rows than the dataset holds
    pub fn is_truncated(&self) -> bool {
        self.row_count > self.data.len()
    }
}
