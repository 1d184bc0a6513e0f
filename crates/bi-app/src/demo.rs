//! Demo mode for the dashboard
//! In-process stand-ins for the upload, AI and export backends

use async_trait::async_trait;
use bi_core::{ColumnType, Gradient, Position, Widget, WidgetConfig, WidgetType};
use bi_data::{
    AgentCommand, AgentCommandResult, AgentService, EvaluationRecord, EvaluationService,
    EvaluationSummary, ExportRequest, ExportService, ExportedFile, ImportStatus, PowerBiImport,
    ResultsPage, ServiceError, UploadRequest, UploadResult, UploadService,
};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

const REGIONS: [&str; 4] = ["North", "South", "East", "West"];
const MONTHS: [&str; 6] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun"];

/// Upload service that ignores the file body and returns synthetic sales data
pub struct DemoUploadService;

#[async_trait]
impl UploadService for DemoUploadService {
    async fn upload(&self, request: UploadRequest) -> Result<UploadResult, ServiceError> {
        let mut rows = Vec::new();
        for (m, month) in MONTHS.iter().enumerate() {
            for (r, region) in REGIONS.iter().enumerate() {
                let sales = 1000.0 + (m as f64) * 150.0 + (r as f64) * 85.5;
                rows.push(json!({
                    "month": month,
                    "region": region,
                    "sales": sales,
                    "returns": (sales * 0.04).round(),
                    "promo": m % 2 == 0,
                }));
            }
        }

        let row_count = rows.len();
        let name = request
            .file_name
            .trim_end_matches(".csv")
            .trim_end_matches(".xlsx");

        let body = json!({
            "id": Uuid::new_v4().to_string(),
            "name": name,
            "data": rows,
            "columns": [
                {"name": "month", "type": "string", "confidence": 0.95},
                {"name": "region", "type": "string", "confidence": 0.95},
                {"name": "sales", "type": "numeric", "confidence": 0.95},
                {"name": "returns", "type": "numeric", "confidence": 0.95},
                {"name": "promo", "type": "boolean", "confidence": 0.95},
            ],
            "rowCount": row_count,
            "uploadedAt": Utc::now().to_rfc3339(),
        });

        UploadResult::from_json(&serde_json::to_vec(&body)?)
    }
}

/// AI service that answers with canned widgets based on a few keywords
pub struct DemoAgentService;

impl DemoAgentService {
    fn widget_type_for(command: &str) -> WidgetType {
        let command = command.to_lowercase();
        if command.contains("pie") || command.contains("share") {
            WidgetType::Pie
        } else if command.contains("line") || command.contains("trend") {
            WidgetType::Line
        } else if command.contains("kpi") || command.contains("total") {
            WidgetType::Kpi
        } else if command.contains("table") {
            WidgetType::Table
        } else {
            WidgetType::Bar
        }
    }

    fn gradient_for(widget_type: WidgetType) -> Gradient {
        match widget_type {
            WidgetType::Line => Gradient::new("#a855f7", "#ec4899"),
            WidgetType::Pie | WidgetType::Kpi => Gradient::new("#10b981", "#059669"),
            WidgetType::Bar | WidgetType::Table => Gradient::new("#00d9ff", "#00a8cc"),
        }
    }
}

#[async_trait]
impl AgentService for DemoAgentService {
    async fn process(&self, command: AgentCommand) -> Result<AgentCommandResult, ServiceError> {
        let Some(dataset) = command.state.datasets.first() else {
            return Ok(AgentCommandResult {
                message: "Please upload a dataset first.".to_string(),
                json: None,
                widgets: None,
                update: None,
                remove: None,
            });
        };

        let first_of = |wanted: ColumnType| {
            dataset
                .columns
                .iter()
                .find(|c| c.column_type == wanted)
                .map(|c| c.name.clone())
        };

        let widget_type = Self::widget_type_for(&command.command);
        let slot = command.state.widgets.len() as u32;
        let widget = Widget::new(
            Uuid::new_v4().to_string(),
            widget_type,
            command.command.clone(),
            dataset.id.clone(),
        )
        .with_config(WidgetConfig {
            x_axis: first_of(ColumnType::String),
            y_axis: first_of(ColumnType::Number),
            gradient: Some(Self::gradient_for(widget_type)),
            ..WidgetConfig::default()
        })
        .with_position(Position {
            x: (slot % 2) * 6,
            y: (slot / 2) * 4,
            w: 6,
            h: 4,
        });

        Ok(AgentCommandResult {
            message: format!("Added a {} chart", widget_type.as_str()),
            json: Some(json!({"action": "add_component", "type": widget_type.as_str()})),
            widgets: Some(vec![widget]),
            update: None,
            remove: None,
        })
    }
}

/// Export service that hands back the request body as the file
pub struct DemoExportService;

#[async_trait]
impl ExportService for DemoExportService {
    async fn export(&self, request: ExportRequest) -> Result<ExportedFile, ServiceError> {
        Ok(ExportedFile {
            file_name: request.default_file_name(Utc::now()),
            content_type: request.format.content_type().to_string(),
            bytes: serde_json::to_vec_pretty(&request)?,
        })
    }

    async fn import_to_powerbi(
        &self,
        request: ExportRequest,
    ) -> Result<PowerBiImport, ServiceError> {
        let import_id = Uuid::new_v4().to_string();
        let widgets = request.payload.widgets.len();
        Ok(PowerBiImport {
            success: true,
            message: format!("Imported {widgets} visuals"),
            import_id: Some(import_id),
            status: Some("Publishing".to_string()),
            dataset_id: None,
            instructions: None,
        })
    }

    async fn import_status(&self, import_id: &str) -> Result<ImportStatus, ServiceError> {
        Ok(ImportStatus {
            import_id: import_id.to_string(),
            status: Some("Succeeded".to_string()),
            created_at: Some(Utc::now().to_rfc3339()),
            updated_at: Some(Utc::now().to_rfc3339()),
            report_id: Some(Uuid::new_v4().to_string()),
            dataset_id: None,
        })
    }
}

/// Evaluation service with a fixed scorecard
pub struct DemoEvaluationService;

#[async_trait]
impl EvaluationService for DemoEvaluationService {
    async fn summary(&self) -> Result<EvaluationSummary, ServiceError> {
        let body = json!({
            "total_tasks": 2,
            "task_success_rate": 1.0,
            "average_latency_ms": 12.0,
            "average_action_correctness": 1.0,
            "total_estimated_cost": 0.0,
            "tool_usage_accuracy": 1.0,
        });
        EvaluationSummary::from_json(&serde_json::to_vec(&body)?)
    }

    async fn results(&self, page: ResultsPage) -> Result<Vec<EvaluationRecord>, ServiceError> {
        let body = json!([
            {"id": "r1", "task_id": "t1", "user_command": "show sales by region", "success": true},
            {"id": "r2", "task_id": "t2", "user_command": "add a sales trend line", "success": true},
        ]);
        let records = EvaluationRecord::list_from_json(&serde_json::to_vec(&body)?)?;
        Ok(records
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .collect())
    }
}
