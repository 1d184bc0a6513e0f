//! Aggregate dashboard state and undo snapshots

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AiMessage, Dataset, Widget, WidgetId};

pub type SnapshotId = String;

/// A labelled copy of the widget list at one point in time
///
/// `widgets` is owned; it never shares storage with the live widget list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub id: SnapshotId,
    pub timestamp: DateTime<Utc>,
    pub widgets: Vec<Widget>,
    pub label: String,
}

/// The whole dashboard for one session
///
/// Only the reducer builds new states. List elements sit behind `Arc` so a
/// transition shares every element it does not touch with the previous
/// state.
///
/// `current_history_index` is `None` exactly when `history` is empty and
/// otherwise always indexes into `history`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    pub(crate) datasets: Vec<Arc<Dataset>>,
    pub(crate) widgets: Vec<Arc<Widget>>,
    pub(crate) selected_widget: Option<WidgetId>,
    pub(crate) ai_messages: Vec<Arc<AiMessage>>,
    pub(crate) history: Vec<Arc<DashboardSnapshot>>,
    pub(crate) current_history_index: Option<usize>,
}

impl DashboardState {
    /// Empty session state
    pub fn new() -> Self {
        Self::default()
    }

    pub fn datasets(&self) -> &[Arc<Dataset>] {
        &self.datasets
    }

    pub fn widgets(&self) -> &[Arc<Widget>] {
        &self.widgets
    }

    pub fn selected_widget(&self) -> Option<&str> {
        self.selected_widget.as_deref()
    }

    pub fn ai_messages(&self) -> &[Arc<AiMessage>] {
        &self.ai_messages
    }

    pub fn history(&self) -> &[Arc<DashboardSnapshot>] {
        &self.history
    }

    pub fn current_history_index(&self) -> Option<usize> {
        self.current_history_index
    }

    /// Resolve a dataset reference; the first match wins when ids collide
    pub fn dataset(&self, id: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.id == id).map(Arc::as_ref)
    }

    pub fn widget(&self, id: &str) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.id == id).map(Arc::as_ref)
    }

    /// The selected widget, or `None` when the selection dangles
    pub fn selected(&self) -> Option<&Widget> {
        self.selected_widget.as_deref().and_then(|id| self.widget(id))
    }

    /// Dataset backing a widget, if it is loaded
    pub fn dataset_for(&self, widget: &Widget) -> Option<&Dataset> {
        self.dataset(&widget.dataset_id)
    }

    pub fn current_snapshot(&self) -> Option<&DashboardSnapshot> {
        self.current_history_index
            .and_then(|i| self.history.get(i))
            .map(Arc::as_ref)
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.current_history_index, Some(i) if i > 0)
    }

    pub fn can_redo(&self) -> bool {
        matches!(self.current_history_index, Some(i) if i + 1 < self.history.len())
    }

    /// Deep copy of the live widget list
    pub(crate) fn copy_widgets(&self) -> Vec<Widget> {
        self.widgets.iter().map(|w| Widget::clone(w)).collect()
    }
}
