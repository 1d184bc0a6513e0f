//! Session store wrapping the reducer

use std::sync::{Arc, Weak};

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::model::{AiMessage, DashboardState, Dataset, Widget, WidgetId, WidgetUpdate};
use crate::reducer::{reduce, Action};
use crate::subscriber::StateSubscriber;

/// Display settings that live outside undo/redo history
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewSettings {
    /// Whether the dataset metadata panel is shown
    pub show_metadata_panel: bool,
}

/// Owns the dashboard state for one session
///
/// Every dispatch runs to completion under the write lock, so readers always
/// see a complete state from before or after an action.
pub struct DashboardStore {
    state: RwLock<Arc<DashboardState>>,
    view: RwLock<ViewSettings>,
    subscribers: RwLock<Vec<Weak<dyn StateSubscriber>>>,
}

impl DashboardStore {
    /// Create a store holding an empty dashboard
    pub fn new() -> Self {
        Self {
            state: RwLock::new(Arc::new(DashboardState::new())),
            view: RwLock::new(ViewSettings::default()),
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Current state
    pub fn state(&self) -> Arc<DashboardState> {
        self.state.read().clone()
    }

    /// Apply an action and return the resulting state
    pub fn dispatch(&self, action: Action) -> Arc<DashboardState> {
        let kind = action.kind();

        let mut state = self.state.write();
        let next = reduce(&*state, action);
        let changed = !Arc::ptr_eq(&*state, &next);
        *state = Arc::clone(&next);
        drop(state);

        if changed {
            debug!(
                action = kind,
                widgets = next.widgets().len(),
                history = next.history().len(),
                "dashboard state updated"
            );
            self.notify_subscribers(&next, kind);
        } else {
            debug!(action = kind, "action left dashboard state unchanged");
        }

        next
    }

    pub fn add_dataset(&self, dataset: Dataset) {
        info!(dataset = %dataset.id, rows = dataset.row_count, "adding dataset");
        self.dispatch(Action::AddDataset(dataset));
    }

    pub fn add_widget(&self, widget: Widget) {
        self.dispatch(Action::AddWidget(widget));
    }

    pub fn update_widget(&self, id: impl Into<WidgetId>, updates: WidgetUpdate) {
        self.dispatch(Action::UpdateWidget {
            id: id.into(),
            updates,
        });
    }

    pub fn remove_widget(&self, id: impl Into<WidgetId>) {
        self.dispatch(Action::RemoveWidget(id.into()));
    }

    pub fn select_widget(&self, id: Option<WidgetId>) {
        self.dispatch(Action::SelectWidget(id));
    }

    pub fn add_ai_message(&self, message: AiMessage) {
        self.dispatch(Action::AddAiMessage(message));
    }

    /// Record the current widgets as a new history entry
    pub fn create_snapshot(&self, label: impl Into<String>) {
        let label = label.into();
        info!(label = %label, "creating snapshot");
        self.dispatch(Action::CreateSnapshot {
            id: Uuid::new_v4().to_string(),
            label,
            timestamp: Utc::now(),
        });
    }

    pub fn restore_snapshot(&self, index: usize) {
        self.dispatch(Action::RestoreSnapshot(index));
    }

    pub fn undo(&self) {
        self.dispatch(Action::Undo);
    }

    pub fn redo(&self) {
        self.dispatch(Action::Redo);
    }

    pub fn view_settings(&self) -> ViewSettings {
        self.view.read().clone()
    }

    /// Flip metadata panel visibility, returning the new value
    pub fn toggle_metadata_panel(&self) -> bool {
        let mut view = self.view.write();
        view.show_metadata_panel = !view.show_metadata_panel;
        view.show_metadata_panel
    }

    /// Add a subscriber; it is dropped automatically once its last `Arc` goes
    pub fn add_subscriber(&self, subscriber: Arc<dyn StateSubscriber>) {
        self.subscribers.write().push(Arc::downgrade(&subscriber));
    }

    fn notify_subscribers(&self, state: &DashboardState, action: &'static str) {
        let live: Vec<Arc<dyn StateSubscriber>> = {
            let mut subscribers = self.subscribers.write();
            subscribers.retain(|weak| weak.strong_count() > 0);
            subscribers.iter().filter_map(Weak::upgrade).collect()
        };

        for subscriber in live {
            subscriber.on_state_change(state, action);
        }
    }
}

impl Default for DashboardStore {
    fn default() -> Self {
        Self::new()
    }
}
