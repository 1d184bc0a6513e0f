//! AI command service contract

use std::sync::Arc;

use bi_core::{AiMessage, DashboardState, Dataset, Widget, WidgetId};
use serde::{Deserialize, Serialize};

use crate::ServiceError;

/// Dashboard context sent with a command
///
/// Unlike the export payload, datasets go out with their rows: the service
/// samples column values and answers data questions from them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentState {
    pub datasets: Vec<Arc<Dataset>>,
    pub widgets: Vec<Arc<Widget>>,
}

impl From<&DashboardState> for AgentState {
    fn from(state: &DashboardState) -> Self {
        Self {
            datasets: state.datasets().to_vec(),
            widgets: state.widgets().to_vec(),
        }
    }
}

/// Natural-language command plus the dashboard context the service reasons over
#[derive(Debug, Clone, Serialize)]
pub struct AgentCommand {
    pub command: String,
    pub state: AgentState,
}

impl AgentCommand {
    /// Build a command; blank input is refused before anything is sent
    pub fn new(command: &str, state: &DashboardState) -> Result<Self, ServiceError> {
        let command = command.trim();
        if command.is_empty() {
            return Err(ServiceError::EmptyCommand);
        }

        Ok(Self {
            command: command.to_string(),
            state: AgentState::from(state),
        })
    }
}

/// Request to change an existing widget
///
/// `updates` is kept as the service sent it. It uses the service's own
/// vocabulary (`line_chart`, `x_axis`), not the widget wire format.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpdateDirective {
    #[serde(alias = "widgetId", alias = "component_id")]
    pub id: WidgetId,

    #[serde(default)]
    pub updates: serde_json::Value,
}

/// Request to delete a widget
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoveDirective {
    #[serde(alias = "widgetId", alias = "component_id")]
    pub id: WidgetId,
}

/// What the AI service answered
///
/// Explanation and Q&A answers carry `json: null` and no widgets.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentCommandResult {
    pub message: String,

    #[serde(default)]
    pub json: Option<serde_json::Value>,

    #[serde(default)]
    pub widgets: Option<Vec<Widget>>,

    #[serde(default)]
    pub update: Option<UpdateDirective>,

    #[serde(default)]
    pub remove: Option<RemoveDirective>,
}

impl AgentCommandResult {
    pub fn from_json(bytes: &[u8]) -> Result<Self, ServiceError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Widgets the service wants added, in order
    pub fn new_widgets(&self) -> &[Widget] {
        self.widgets.as_deref().unwrap_or_default()
    }

    /// Conversation entry for the service's answer
    pub fn assistant_message(&self) -> AiMessage {
        AiMessage::assistant(self.message.clone()).with_json(self.json.clone())
    }

    pub fn has_directives(&self) -> bool {
        self.update.is_some() || self.remove.is_some()
    }
}
