//! Collaborator contracts for the dashboard
//!
//! The upload, AI command, export and evaluation backends are external
//! services. This
//! crate types their request/response payloads, describes them as async
//! traits, and turns their results into store dispatches.

pub mod agent;
pub mod config;
pub mod evaluation;
pub mod export;
pub mod service;
pub mod session;
pub mod upload;

use thiserror::Error;

// Re-exports
pub use agent::{AgentCommand, AgentCommandResult, AgentState, RemoveDirective, UpdateDirective};
pub use config::ServiceConfig;
pub use evaluation::{EvaluationRecord, EvaluationSummary, ResultsPage};
pub use export::{
    DatasetSummary, ExportFormat, ExportRequest, ExportedFile, ImportStatus, PowerBiImport,
    StatePayload,
};
pub use service::{AgentService, EvaluationService, ExportService, UploadService};
pub use session::DashboardSession;
pub use upload::{UploadRequest, UploadResult};

/// Errors that can occur when talking to a collaborator
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("service rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("command is empty")]
    EmptyCommand,

    #[error("file is empty")]
    EmptyFile,

    #[error("file is {size} bytes, limit is {limit}")]
    FileTooLarge { size: usize, limit: usize },

    #[error("no datasets to export")]
    NothingToExport,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0} service is not configured")]
    NotConfigured(&'static str),
}
