//! Main application entry point
//!
//! Composition root of the dashboard: loads service configuration, provides
//! the session store and replays a short demo session against in-process
//! collaborators.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use bi_core::{DashboardProvider, DashboardState, StateSubscriber, WidgetUpdate};
use bi_data::{DashboardSession, ExportFormat, ResultsPage, ServiceConfig, UploadRequest};

mod demo;

use demo::{DemoAgentService, DemoEvaluationService, DemoExportService, DemoUploadService};

/// Logs every state change the store reports
struct StateLogger;

impl StateSubscriber for StateLogger {
    fn on_state_change(&self, state: &DashboardState, action: &'static str) {
        info!(
            action,
            datasets = state.datasets().len(),
            widgets = state.widgets().len(),
            messages = state.ai_messages().len(),
            history = ?state.current_history_index(),
            "dashboard changed"
        );
    }
}

fn load_config() -> Result<ServiceConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {path}"))?;
            Ok(ServiceConfig::from_json_str(&raw)?)
        }
        None => Ok(ServiceConfig::from_env()?),
    }
}

async fn run_demo(session: &DashboardSession) -> Result<()> {
    let store = session.store();

    session
        .upload(UploadRequest::new("quarterly_sales.csv", b"month,region,sales\n".to_vec()))
        .await?;

    session.send_command("show sales by region").await?;
    store.create_snapshot("Sales by region");

    session.send_command("add a sales trend line").await?;
    store.create_snapshot("Trend added");

    let state = store.state();
    if let Some(first) = state.widgets().first() {
        store.select_widget(Some(first.id.clone()));
        store.update_widget(first.id.clone(), WidgetUpdate::title("Revenue by region"));
        store.create_snapshot("Renamed");
    }

    store.undo();
    store.undo();
    store.redo();
    info!(
        can_undo = store.state().can_undo(),
        can_redo = store.state().can_redo(),
        "history navigation done"
    );

    if store.toggle_metadata_panel() {
        info!("metadata panel shown");
    }

    match session.export(ExportFormat::PowerBiJson).await {
        Ok(file) => info!(file = %file.file_name, bytes = file.bytes.len(), "exported"),
        Err(e) => warn!("Export failed: {}", e),
    }

    let import = session.import_to_powerbi().await?;
    if let Some(import_id) = import.import_id.as_deref() {
        let status = session.powerbi_import_status(import_id).await?;
        info!(import_id, status = ?status.status, "Power BI import checked");
    }

    let summary = session.evaluation_summary().await?;
    let recent = session.evaluation_results(ResultsPage::default()).await?;
    info!(
        tasks = summary.total_tasks,
        success_rate = summary.task_success_rate,
        recent = recent.len(),
        "AI evaluation"
    );

    Ok(())
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting BI dashboard session");

    let config = load_config()?;
    info!(base_url = %config.base_url, "service configuration loaded");

    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;

    let provider = DashboardProvider::new();
    let store = provider.provide();
    let logger: Arc<dyn StateSubscriber> = Arc::new(StateLogger);
    store.add_subscriber(Arc::clone(&logger));

    let session = DashboardSession::new(
        Arc::clone(&store),
        config,
        Arc::new(DemoUploadService),
        Arc::new(DemoAgentService),
        Arc::new(DemoExportService),
    )
    .with_evaluation(Arc::new(DemoEvaluationService));

    runtime.block_on(run_demo(&session))?;

    let state = provider.store()?.state();
    println!("{}", serde_json::to_string_pretty(&*state)?);

    provider.teardown();
    Ok(())
}
