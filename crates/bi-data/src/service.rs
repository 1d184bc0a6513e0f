//! Collaborator service traits
//!
//! Implementations talk to the real backend (or stand in for it in demos and
//! tests). Each call either resolves to a decoded result or a
//! [`ServiceError`]; nothing here touches dashboard state.

use async_trait::async_trait;

use crate::agent::{AgentCommand, AgentCommandResult};
use crate::evaluation::{EvaluationRecord, EvaluationSummary, ResultsPage};
use crate::export::{ExportRequest, ExportedFile, ImportStatus, PowerBiImport};
use crate::upload::{UploadRequest, UploadResult};
use crate::ServiceError;

/// Parses uploaded files into datasets
#[async_trait]
pub trait UploadService: Send + Sync {
    async fn upload(&self, request: UploadRequest) -> Result<UploadResult, ServiceError>;
}

/// Interprets natural-language dashboard commands
#[async_trait]
pub trait AgentService: Send + Sync {
    async fn process(&self, command: AgentCommand) -> Result<AgentCommandResult, ServiceError>;
}

/// Produces downloadable exports of the dashboard
#[async_trait]
pub trait ExportService: Send + Sync {
    async fn export(&self, request: ExportRequest) -> Result<ExportedFile, ServiceError>;

    /// Push the dashboard straight into the Power BI service
    ///
    /// Backends without Power BI credentials refuse this, which is also what
    /// the default does.
    async fn import_to_powerbi(
        &self,
        _request: ExportRequest,
    ) -> Result<PowerBiImport, ServiceError> {
        Err(powerbi_disabled())
    }

    async fn import_status(&self, _import_id: &str) -> Result<ImportStatus, ServiceError> {
        Err(powerbi_disabled())
    }
}

fn powerbi_disabled() -> ServiceError {
    ServiceError::Rejected {
        status: 400,
        message: "Power BI API is not enabled".to_string(),
    }
}

/// Reports how well the AI service has been doing
#[async_trait]
pub trait EvaluationService: Send + Sync {
    async fn summary(&self) -> Result<EvaluationSummary, ServiceError>;

    async fn results(&self, page: ResultsPage) -> Result<Vec<EvaluationRecord>, ServiceError>;
}
