//! Upload service contract
//!
//! The upload backend parses the file and reports the schema. Its response is
//! taken as-is; the only normalization is mapping backend type spellings
//! onto [`ColumnType`] and filling in absent fields.

use bi_core::{ColumnSchema, ColumnType, Dataset, Row};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::config::ServiceConfig;
use crate::ServiceError;

/// A file the user picked for upload
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadRequest {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Reject files the backend would refuse anyway
    pub fn check(&self, config: &ServiceConfig) -> Result<(), ServiceError> {
        if self.bytes.is_empty() {
            return Err(ServiceError::EmptyFile);
        }
        if self.bytes.len() > config.max_upload_bytes {
            return Err(ServiceError::FileTooLarge {
                size: self.bytes.len(),
                limit: config.max_upload_bytes,
            });
        }
        Ok(())
    }
}

/// Column entry as sent by the upload backend
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedColumn {
    pub name: String,

    #[serde(default, rename = "type")]
    pub column_type: Option<String>,

    #[serde(default)]
    pub confidence: Option<f64>,
}

impl UploadedColumn {
    fn into_schema(self) -> ColumnSchema {
        let column_type = self
            .column_type
            .as_deref()
            .map(parse_column_type)
            .unwrap_or_default();

        ColumnSchema::new(self.name, column_type, self.confidence.unwrap_or(1.0))
    }
}

/// Successful upload response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub id: String,

    #[serde(alias = "filename")]
    pub name: String,

    #[serde(default, alias = "rows")]
    pub data: Option<Vec<Row>>,

    #[serde(default)]
    pub columns: Vec<UploadedColumn>,

    #[serde(default, alias = "row_count")]
    pub row_count: Option<usize>,

    #[serde(default, alias = "created_at")]
    pub uploaded_at: Option<String>,
}

impl UploadResult {
    pub fn from_json(bytes: &[u8]) -> Result<Self, ServiceError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Build the dataset; `received_at` stands in for a missing or
    /// unparseable upload timestamp
    pub fn into_dataset(self, received_at: DateTime<Utc>) -> Dataset {
        let data = self.data.unwrap_or_default();
        let row_count = self.row_count.unwrap_or(data.len());
        let uploaded_at = self
            .uploaded_at
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or(received_at);

        Dataset {
            id: self.id,
            name: self.name,
            data,
            columns: self.columns.into_iter().map(UploadedColumn::into_schema).collect(),
            row_count,
            uploaded_at,
        }
    }
}

/// Map a backend type name onto a column type; unknown names become `String`
pub fn parse_column_type(raw: &str) -> ColumnType {
    match raw.trim().to_lowercase().as_str() {
        "number" | "numeric" | "integer" | "int" | "float" | "double" | "decimal" => {
            ColumnType::Number
        }
        "date" | "datetime" | "timestamp" | "time" => ColumnType::Date,
        "boolean" | "bool" => ColumnType::Boolean,
        _ => ColumnType::String,
    }
}

/// Accept RFC 3339 or a naive ISO timestamp (taken as UTC)
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
