//! Backend endpoint configuration

use serde::{Deserialize, Serialize};

use crate::evaluation::ResultsPage;
use crate::export::ExportFormat;
use crate::ServiceError;

pub const ENV_BASE_URL: &str = "BI_API_BASE_URL";
pub const ENV_MAX_UPLOAD_BYTES: &str = "BI_MAX_UPLOAD_BYTES";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "BI_REQUEST_TIMEOUT_SECS";

/// Where the collaborator services live and how to call them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Backend origin, e.g. `http://localhost:8000`
    pub base_url: String,

    pub upload_path: String,

    pub agent_path: String,

    /// Prefix for the export endpoints; the format adds the last segment
    pub export_path: String,

    pub evaluation_path: String,

    /// Largest file accepted for upload
    pub max_upload_bytes: usize,

    /// Per-request timeout for collaborator calls
    pub request_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            upload_path: "/api/v1/datasets/upload".to_string(),
            agent_path: "/api/v1/ai/process".to_string(),
            export_path: "/api/v1/export".to_string(),
            evaluation_path: "/api/v1/evaluation".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
            request_timeout_secs: 60,
        }
    }
}

impl ServiceConfig {
    /// Defaults overlaid with `BI_*` environment variables
    pub fn from_env() -> Result<Self, ServiceError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Parse a JSON config file; missing keys take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, ServiceError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the environment in production)
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ServiceError> {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = url;
        }

        if let Some(raw) = lookup(ENV_MAX_UPLOAD_BYTES) {
            self.max_upload_bytes = raw.trim().parse().map_err(|_| {
                ServiceError::Config(format!("{ENV_MAX_UPLOAD_BYTES} is not a number: {raw}"))
            })?;
        }

        if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT_SECS) {
            self.request_timeout_secs = raw.trim().parse().map_err(|_| {
                ServiceError::Config(format!("{ENV_REQUEST_TIMEOUT_SECS} is not a number: {raw}"))
            })?;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.base_url.trim().is_empty() {
            return Err(ServiceError::Config("base_url is empty".to_string()));
        }
        if self.max_upload_bytes == 0 {
            return Err(ServiceError::Config("max_upload_bytes must be positive".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ServiceError::Config("request_timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    /// Join the base URL and a path
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn upload_url(&self) -> String {
        self.endpoint(&self.upload_path)
    }

    pub fn agent_url(&self) -> String {
        self.endpoint(&self.agent_path)
    }

    pub fn export_url(&self, format: ExportFormat) -> String {
        self.export_endpoint(format.path_segment())
    }

    pub fn powerbi_import_url(&self) -> String {
        self.export_endpoint("powerbi/api")
    }

    pub fn powerbi_import_status_url(&self, import_id: &str) -> String {
        self.export_endpoint(&format!("powerbi/api/status/{import_id}"))
    }

    pub fn evaluation_summary_url(&self) -> String {
        self.evaluation_endpoint("summary")
    }

    pub fn evaluation_results_url(&self, page: ResultsPage) -> String {
        format!("{}?{}", self.evaluation_endpoint("results"), page.query())
    }

    fn export_endpoint(&self, segment: &str) -> String {
        self.endpoint(&format!("{}/{segment}", self.export_path.trim_end_matches('/')))
    }

    fn evaluation_endpoint(&self, segment: &str) -> String {
        self.endpoint(&format!("{}/{segment}", self.evaluation_path.trim_end_matches('/')))
    }
}
