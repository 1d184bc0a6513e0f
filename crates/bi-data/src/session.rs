//! Glue between collaborator calls and the dashboard store
//!
//! A collaborator result reaches the store only after the call succeeded. A
//! failed or timed-out call is logged and returned to the caller; it never
//! dispatches anything.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bi_core::{AiMessage, DashboardStore, DatasetId};
use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::agent::{AgentCommand, AgentCommandResult};
use crate::config::ServiceConfig;
use crate::evaluation::{EvaluationRecord, EvaluationSummary, ResultsPage};
use crate::export::{ExportFormat, ExportRequest, ExportedFile, ImportStatus, PowerBiImport};
use crate::service::{AgentService, EvaluationService, ExportService, UploadService};
use crate::upload::UploadRequest;
use crate::ServiceError;

/// One user's dashboard session with its collaborators
pub struct DashboardSession {
    store: Arc<DashboardStore>,
    config: ServiceConfig,
    uploads: Arc<dyn UploadService>,
    agent: Arc<dyn AgentService>,
    exports: Arc<dyn ExportService>,
    evaluation: Option<Arc<dyn EvaluationService>>,
}

impl DashboardSession {
    pub fn new(
        store: Arc<DashboardStore>,
        config: ServiceConfig,
        uploads: Arc<dyn UploadService>,
        agent: Arc<dyn AgentService>,
        exports: Arc<dyn ExportService>,
    ) -> Self {
        Self {
            store,
            config,
            uploads,
            agent,
            exports,
            evaluation: None,
        }
    }

    /// Attach the service behind the evaluation view
    pub fn with_evaluation(mut self, evaluation: Arc<dyn EvaluationService>) -> Self {
        self.evaluation = Some(evaluation);
        self
    }

    pub fn store(&self) -> &Arc<DashboardStore> {
        &self.store
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Upload a file and add the resulting dataset
    pub async fn upload(&self, request: UploadRequest) -> Result<DatasetId, ServiceError> {
        request.check(&self.config)?;
        let file_name = request.file_name.clone();

        let url = self.config.upload_url();
        let result = self.call("upload", &url, self.uploads.upload(request)).await?;
        let dataset = result.into_dataset(Utc::now());
        let id = dataset.id.clone();

        info!(
            file = %file_name,
            dataset = %id,
            columns = dataset.columns.len(),
            "upload finished"
        );
        self.store.add_dataset(dataset);
        Ok(id)
    }

    /// Send a console command and apply the widgets it produced
    ///
    /// The command is logged as a user message before the round trip. Update
    /// and remove directives in the answer are reported but not applied.
    pub async fn send_command(&self, text: &str) -> Result<AgentCommandResult, ServiceError> {
        let command = AgentCommand::new(text, &self.store.state())?;
        self.store.add_ai_message(AiMessage::user(command.command.clone()));

        let url = self.config.agent_url();
        let result = self.call("ai_command", &url, self.agent.process(command)).await?;

        for widget in result.new_widgets() {
            self.store.add_widget(widget.clone());
        }

        if let Some(update) = &result.update {
            warn!(widget = %update.id, "ignoring update directive from AI service");
        }
        if let Some(remove) = &result.remove {
            warn!(widget = %remove.id, "ignoring remove directive from AI service");
        }

        self.store.add_ai_message(result.assistant_message());
        Ok(result)
    }

    /// Request an export of the current dashboard
    pub async fn export(&self, format: ExportFormat) -> Result<ExportedFile, ServiceError> {
        let request = ExportRequest::new(format, &self.store.state())?;
        let url = self.config.export_url(format);
        let file = self.call("export", &url, self.exports.export(request)).await?;

        info!(file = %file.file_name, bytes = file.bytes.len(), "export ready");
        Ok(file)
    }

    /// Import the current dashboard into the Power BI service
    pub async fn import_to_powerbi(&self) -> Result<PowerBiImport, ServiceError> {
        let request = ExportRequest::new(ExportFormat::PowerBi, &self.store.state())?;
        let url = self.config.powerbi_import_url();
        let import = self
            .call("powerbi_import", &url, self.exports.import_to_powerbi(request))
            .await?;

        info!(import_id = ?import.import_id, status = ?import.status, "Power BI import started");
        Ok(import)
    }

    pub async fn powerbi_import_status(
        &self,
        import_id: &str,
    ) -> Result<ImportStatus, ServiceError> {
        let url = self.config.powerbi_import_status_url(import_id);
        self.call("powerbi_import_status", &url, self.exports.import_status(import_id))
            .await
    }

    pub async fn evaluation_summary(&self) -> Result<EvaluationSummary, ServiceError> {
        let evaluation = self.evaluation()?;
        let url = self.config.evaluation_summary_url();
        self.call("evaluation_summary", &url, evaluation.summary()).await
    }

    pub async fn evaluation_results(
        &self,
        page: ResultsPage,
    ) -> Result<Vec<EvaluationRecord>, ServiceError> {
        let evaluation = self.evaluation()?;
        let url = self.config.evaluation_results_url(page);
        self.call("evaluation_results", &url, evaluation.results(page)).await
    }

    fn evaluation(&self) -> Result<&Arc<dyn EvaluationService>, ServiceError> {
        self.evaluation
            .as_ref()
            .ok_or(ServiceError::NotConfigured("evaluation"))
    }

    async fn call<T>(
        &self,
        operation: &'static str,
        url: &str,
        fut: impl Future<Output = Result<T, ServiceError>>,
    ) -> Result<T, ServiceError> {
        debug!(operation, url, "calling collaborator");

        let secs = self.config.request_timeout_secs;
        let outcome = match tokio::time::timeout(Duration::from_secs(secs), fut).await {
            Ok(result) => result,
            Err(_) => Err(ServiceError::Timeout(secs)),
        };

        if let Err(e) = &outcome {
            error!(operation, url, error = %e, "collaborator call failed");
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::UpdateDirective;
    use crate::upload::UploadResult;
    use async_trait::async_trait;
    use bi_core::{MessageRole, Widget, WidgetType};
    use parking_lot::Mutex;

    struct StaticUpload;

    #[async_trait]
    impl UploadService for StaticUpload {
        async fn upload(&self, request: UploadRequest) -> Result<UploadResult, ServiceError> {
            let body = format!(
                r#"{{"id": "ds-1", "name": "{}", "data": [], "columns": [{{"name": "amount", "type": "number"}}], "rowCount": 42}}"#,
                request.file_name.trim_end_matches(".csv")
            );
            UploadResult::from_json(body.as_bytes())
        }
    }

    struct FailingUpload;

    #[async_trait]
    impl UploadService for FailingUpload {
        async fn upload(&self, _request: UploadRequest) -> Result<UploadResult, ServiceError> {
            Err(ServiceError::Rejected {
                status: 400,
                message: "File contains no data rows".to_string(),
            })
        }
    }

    #[derive(Default)]
    struct ScriptedAgent {
        replies: Mutex<Vec<Result<AgentCommandResult, ServiceError>>>,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl AgentService for ScriptedAgent {
        async fn process(&self, command: AgentCommand) -> Result<AgentCommandResult, ServiceError> {
            self.seen.lock().push(command.command);
            self.replies.lock().remove(0)
        }
    }

    struct SlowAgent;

    #[async_trait]
    impl AgentService for SlowAgent {
        async fn process(&self, _command: AgentCommand) -> Result<AgentCommandResult, ServiceError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Err(ServiceError::Transport("unreachable".to_string()))
        }
    }

    struct EchoExport;

    #[async_trait]
    impl ExportService for EchoExport {
        async fn export(&self, request: ExportRequest) -> Result<ExportedFile, ServiceError> {
            Ok(ExportedFile {
                file_name: request.default_file_name(Utc::now()),
                content_type: request.format.content_type().to_string(),
                bytes: serde_json::to_vec(&request)?,
            })
        }
    }

    fn reply(widgets: Vec<Widget>, update: Option<UpdateDirective>) -> AgentCommandResult {
        AgentCommandResult {
            message: "done".to_string(),
            json: Some(serde_json::json!({"action": "add_component"})),
            widgets: Some(widgets),
            update,
            remove: None,
        }
    }

    fn session(
        uploads: Arc<dyn UploadService>,
        agent: Arc<dyn AgentService>,
        config: ServiceConfig,
    ) -> DashboardSession {
        DashboardSession::new(
            Arc::new(DashboardStore::new()),
            config,
            uploads,
            agent,
            Arc::new(EchoExport),
        )
    }

    #[tokio::test]
    async fn test_upload_adds_dataset() {
        let session = session(
            Arc::new(StaticUpload),
            Arc::new(ScriptedAgent::default()),
            ServiceConfig::default(),
        );

        let id = session
            .upload(UploadRequest::new("sales.csv", b"amount\n1\n".to_vec()))
            .await
            .unwrap();

        let state = session.store().state();
        assert_eq!(id, "ds-1");
        assert_eq!(state.dataset("ds-1").map(|d| d.name.as_str()), Some("sales"));
        assert_eq!(state.dataset("ds-1").map(|d| d.row_count), Some(42));
    }

    #[tokio::test]
    async fn test_failed_upload_leaves_state_alone() {
        let session = session(
            Arc::new(FailingUpload),
            Arc::new(ScriptedAgent::default()),
            ServiceConfig::default(),
        );
        let before = session.store().state();

        let result = session
            .upload(UploadRequest::new("empty.csv", b"header\n".to_vec()))
            .await;

        assert!(matches!(result, Err(ServiceError::Rejected { status: 400, .. })));
        assert!(Arc::ptr_eq(&before, &session.store().state()));
    }

    #[tokio::test]
    async fn test_command_adds_widgets_and_messages() {
        let agent = Arc::new(ScriptedAgent::default());
        agent.replies.lock().push(Ok(reply(
            vec![
                Widget::new("w1", WidgetType::Bar, "By region", "ds-1"),
                Widget::new("w2", WidgetType::Kpi, "Total", "ds-1"),
            ],
            None,
        )));
        let session = session(Arc::new(StaticUpload), agent.clone(), ServiceConfig::default());

        session.send_command("show sales by region").await.unwrap();

        let state = session.store().state();
        let titles: Vec<_> = state.widgets().iter().map(|w| w.title.as_str()).collect();
        assert_eq!(titles, ["By region", "Total"]);

        let roles: Vec<_> = state.ai_messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, [MessageRole::User, MessageRole::Assistant]);
        assert_eq!(*agent.seen.lock(), ["show sales by region"]);
    }

    #[tokio::test]
    async fn test_directives_are_not_applied() {
        let agent = Arc::new(ScriptedAgent::default());
        agent.replies.lock().push(Ok(reply(
            vec![Widget::new("w1", WidgetType::Line, "Trend", "ds-1")],
            None,
        )));
        agent.replies.lock().push(Ok(reply(
            Vec::new(),
            Some(UpdateDirective {
                id: "w1".to_string(),
                updates: serde_json::json!({
                    "type": "line_chart",
                    "config": {"x_axis": "region"}
                }),
            }),
        )));
        let session = session(Arc::new(StaticUpload), agent, ServiceConfig::default());

        session.send_command("add a trend line").await.unwrap();
        let result = session.send_command("rename it").await.unwrap();

        assert!(result.has_directives());
        let state = session.store().state();
        assert_eq!(state.widgets().len(), 1);
        assert_eq!(state.widgets()[0].title, "Trend");
        assert_eq!(state.ai_messages().len(), 4);
    }

    #[tokio::test]
    async fn test_failed_command_keeps_only_user_message() {
        let agent = Arc::new(ScriptedAgent::default());
        agent
            .replies
            .lock()
            .push(Err(ServiceError::Transport("connection refused".to_string())));
        let session = session(Arc::new(StaticUpload), agent, ServiceConfig::default());

        let result = session.send_command("add a pie chart").await;

        assert!(matches!(result, Err(ServiceError::Transport(_))));
        let state = session.store().state();
        assert!(state.widgets().is_empty());
        assert_eq!(state.ai_messages().len(), 1);
        assert_eq!(state.ai_messages()[0].role, MessageRole::User);
    }

    #[tokio::test]
    async fn test_blank_command_dispatches_nothing() {
        let session = session(
            Arc::new(StaticUpload),
            Arc::new(ScriptedAgent::default()),
            ServiceConfig::default(),
        );
        let before = session.store().state();

        assert!(matches!(
            session.send_command("  ").await,
            Err(ServiceError::EmptyCommand)
        ));
        assert!(Arc::ptr_eq(&before, &session.store().state()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_agent_times_out() {
        let config = ServiceConfig {
            request_timeout_secs: 1,
            ..ServiceConfig::default()
        };
        let session = session(Arc::new(StaticUpload), Arc::new(SlowAgent), config);

        let result = session.send_command("add a table").await;
        assert!(matches!(result, Err(ServiceError::Timeout(1))));
    }

    #[tokio::test]
    async fn test_export_sends_current_widgets() {
        let session = session(
            Arc::new(StaticUpload),
            Arc::new(ScriptedAgent::default()),
            ServiceConfig::default(),
        );
        session
            .store()
            .add_widget(Widget::new("w1", WidgetType::Table, "Raw rows", "ds-1"));

        for format in [ExportFormat::Csv, ExportFormat::PowerBi, ExportFormat::PowerBiJson] {
            assert!(matches!(
                session.export(format).await,
                Err(ServiceError::NothingToExport)
            ));
        }

        session
            .upload(UploadRequest::new("sales.csv", b"amount\n1\n".to_vec()))
            .await
            .unwrap();
        let file = session.export(ExportFormat::PowerBiJson).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&file.bytes).unwrap();

        assert_eq!(file.content_type, "application/json");
        assert!(file.file_name.starts_with("powerbi-dashboard-"));
        assert_eq!(body["widgets"][0]["title"], "Raw rows");
        assert_eq!(body["datasets"][0]["name"], "sales");
    }

    #[tokio::test]
    async fn test_powerbi_import_refused_without_credentials() {
        let session = session(
            Arc::new(StaticUpload),
            Arc::new(ScriptedAgent::default()),
            ServiceConfig::default(),
        );
        assert!(matches!(
            session.import_to_powerbi().await,
            Err(ServiceError::NothingToExport)
        ));

        session
            .upload(UploadRequest::new("sales.csv", b"amount\n1\n".to_vec()))
            .await
            .unwrap();
        let before = session.store().state();

        assert!(matches!(
            session.import_to_powerbi().await,
            Err(ServiceError::Rejected { status: 400, .. })
        ));
        assert!(matches!(
            session.powerbi_import_status("imp-1").await,
            Err(ServiceError::Rejected { status: 400, .. })
        ));
        assert!(Arc::ptr_eq(&before, &session.store().state()));
    }

    struct FixedEvaluation;

    #[async_trait]
    impl EvaluationService for FixedEvaluation {
        async fn summary(&self) -> Result<EvaluationSummary, ServiceError> {
            EvaluationSummary::from_json(br#"{"total_tasks": 3, "task_success_rate": 0.5}"#)
        }

        async fn results(&self, page: ResultsPage) -> Result<Vec<EvaluationRecord>, ServiceError> {
            let all = EvaluationRecord::list_from_json(
                br#"[
                    {"id": "r1", "task_id": "t1", "user_command": "add a bar chart"},
                    {"id": "r2", "task_id": "t2", "user_command": "remove it"},
                    {"id": "r3", "task_id": "t3", "user_command": "explain"}
                ]"#,
            )?;
            Ok(all
                .into_iter()
                .skip(page.offset as usize)
                .take(page.limit as usize)
                .collect())
        }
    }

    #[tokio::test]
    async fn test_evaluation_metrics() {
        let bare = session(
            Arc::new(StaticUpload),
            Arc::new(ScriptedAgent::default()),
            ServiceConfig::default(),
        );
        assert!(matches!(
            bare.evaluation_summary().await,
            Err(ServiceError::NotConfigured("evaluation"))
        ));

        let session = bare.with_evaluation(Arc::new(FixedEvaluation));
        let summary = session.evaluation_summary().await.unwrap();
        assert_eq!(summary.total_tasks, 3);

        let page = ResultsPage { limit: 2, offset: 0 };
        let first = session.evaluation_results(page).await.unwrap();
        let second = session.evaluation_results(page.next()).await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(second[0].id, "r3");
        assert!(session.store().state().ai_messages().is_empty());
    }
}
