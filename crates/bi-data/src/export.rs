//! Export service contract

use bi_core::{ColumnSchema, DashboardState, Dataset, Widget};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ServiceError;

/// Export targets offered by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Raw data of the first dataset
    Csv,
    /// Power BI report file
    PowerBi,
    /// Power BI layout description as JSON
    PowerBiJson,
}

impl ExportFormat {
    /// Last segment of the export endpoint
    pub fn path_segment(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::PowerBi => "powerbi",
            ExportFormat::PowerBiJson => "powerbi/json",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::PowerBi => "pbix",
            ExportFormat::PowerBiJson => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::PowerBi => "application/octet-stream",
            ExportFormat::PowerBiJson => "application/json",
        }
    }

    /// File name to save under when the response names none
    pub fn default_file_name(&self, dataset_name: Option<&str>, at: DateTime<Utc>) -> String {
        let stamp = at.format("%Y%m%d-%H%M%S");
        let stem = match self {
            ExportFormat::Csv => dataset_name.unwrap_or("export").to_string(),
            ExportFormat::PowerBi => "dashboard".to_string(),
            ExportFormat::PowerBiJson => "powerbi-dashboard".to_string(),
        };
        format!("{stem}-{stamp}.{}", self.extension())
    }
}

/// Dataset metadata sent to collaborators; rows stay on the client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSummary {
    pub id: String,
    pub name: String,
    pub row_count: usize,
    pub columns: Vec<ColumnSchema>,
}

impl From<&Dataset> for DatasetSummary {
    fn from(dataset: &Dataset) -> Self {
        Self {
            id: dataset.id.clone(),
            name: dataset.name.clone(),
            row_count: dataset.row_count,
            columns: dataset.columns.clone(),
        }
    }
}

/// The part of dashboard state collaborators get to see
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatePayload {
    pub datasets: Vec<DatasetSummary>,
    pub widgets: Vec<Widget>,
}

impl From<&DashboardState> for StatePayload {
    fn from(state: &DashboardState) -> Self {
        Self {
            datasets: state
                .datasets()
                .iter()
                .map(|d| DatasetSummary::from(d.as_ref()))
                .collect(),
            widgets: state.widgets().iter().map(|w| Widget::clone(w)).collect(),
        }
    }
}

/// Body of an export call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRequest {
    #[serde(skip)]
    pub format: ExportFormat,

    #[serde(flatten)]
    pub payload: StatePayload,
}

impl ExportRequest {
    /// Every export target works from the first dataset, so an empty
    /// dashboard is refused up front
    pub fn new(format: ExportFormat, state: &DashboardState) -> Result<Self, ServiceError> {
        let payload = StatePayload::from(state);
        if payload.datasets.is_empty() {
            return Err(ServiceError::NothingToExport);
        }
        Ok(Self { format, payload })
    }

    pub fn default_file_name(&self, at: DateTime<Utc>) -> String {
        let dataset_name = self.payload.datasets.first().map(|d| d.name.as_str());
        self.format.default_file_name(dataset_name, at)
    }
}

/// Downloaded export, opaque to the dashboard
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Answer to a direct import into the Power BI service
///
/// The import runs asynchronously on the Power BI side; poll
/// [`ImportStatus`] with `import_id` to follow it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PowerBiImport {
    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub import_id: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    /// Power BI's id for the pushed dataset, not a dashboard dataset id
    #[serde(default)]
    pub dataset_id: Option<String>,

    #[serde(default)]
    pub instructions: Option<String>,
}

impl PowerBiImport {
    pub fn from_json(bytes: &[u8]) -> Result<Self, ServiceError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Progress of a Power BI import
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImportStatus {
    pub import_id: String,

    /// Power BI import state, e.g. `Publishing`, `Succeeded`, `Failed`
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub updated_at: Option<String>,

    #[serde(default)]
    pub report_id: Option<String>,

    #[serde(default)]
    pub dataset_id: Option<String>,
}

impl ImportStatus {
    pub fn from_json(bytes: &[u8]) -> Result<Self, ServiceError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status.as_deref(), Some("Succeeded") | Some("Failed"))
    }

    pub fn succeeded(&self) -> bool {
        self.status.as_deref() == Some("Succeeded")
    }
}
