//! State transitions for the dashboard
//!
//! [`reduce`] is a pure function of the previous state and an action. It
//! never fails: actions that refer to missing widgets or snapshots leave the
//! state untouched and hand back the same `Arc`, so callers can detect
//! "nothing happened" with [`Arc::ptr_eq`].

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::model::{
    AiMessage, DashboardSnapshot, DashboardState, Dataset, SnapshotId, Widget, WidgetId,
    WidgetUpdate,
};

/// Everything that can change dashboard state
///
/// Ids and timestamps a transition needs are carried in the action so the
/// reducer reads no clock and no random source.
#[derive(Debug, Clone)]
pub enum Action {
    AddDataset(Dataset),
    AddWidget(Widget),
    UpdateWidget {
        id: WidgetId,
        updates: WidgetUpdate,
    },
    RemoveWidget(WidgetId),
    SelectWidget(Option<WidgetId>),
    AddAiMessage(AiMessage),
    CreateSnapshot {
        id: SnapshotId,
        label: String,
        timestamp: DateTime<Utc>,
    },
    RestoreSnapshot(usize),
    Undo,
    Redo,
}

impl Action {
    /// Short name used in logs and subscriber notifications
    pub fn kind(&self) -> &'static str {
        match self {
            Action::AddDataset(_) => "add_dataset",
            Action::AddWidget(_) => "add_widget",
            Action::UpdateWidget { .. } => "update_widget",
            Action::RemoveWidget(_) => "remove_widget",
            Action::SelectWidget(_) => "select_widget",
            Action::AddAiMessage(_) => "add_ai_message",
            Action::CreateSnapshot { .. } => "create_snapshot",
            Action::RestoreSnapshot(_) => "restore_snapshot",
            Action::Undo => "undo",
            Action::Redo => "redo",
        }
    }
}

/// Apply `action` to `state`, returning the next state
pub fn reduce(state: &Arc<DashboardState>, action: Action) -> Arc<DashboardState> {
    match action {
        Action::AddDataset(dataset) => modify(state, |next| {
            next.datasets.push(Arc::new(dataset));
        }),

        Action::AddWidget(widget) => modify(state, |next| {
            next.widgets.push(Arc::new(widget));
        }),

        Action::UpdateWidget { id, updates } => {
            if !state.widgets.iter().any(|w| w.id == id) {
                return Arc::clone(state);
            }

            modify(state, |next| {
                for widget in next.widgets.iter_mut().filter(|w| w.id == id) {
                    *widget = Arc::new(updates.apply_to(widget));
                }
            })
        }

        Action::RemoveWidget(id) => {
            if !state.widgets.iter().any(|w| w.id == id) {
                return Arc::clone(state);
            }

            modify(state, |next| {
                next.widgets.retain(|w| w.id != id);
                if next.selected_widget.as_deref() == Some(id.as_str()) {
                    next.selected_widget = None;
                }
            })
        }

        Action::SelectWidget(id) => {
            if state.selected_widget == id {
                return Arc::clone(state);
            }

            modify(state, |next| next.selected_widget = id)
        }

        Action::AddAiMessage(message) => modify(state, |next| {
            next.ai_messages.push(Arc::new(message));
        }),

        Action::CreateSnapshot {
            id,
            label,
            timestamp,
        } => modify(state, |next| {
            let snapshot = DashboardSnapshot {
                id,
                timestamp,
                widgets: state.copy_widgets(),
                label,
            };

            // Anything past the pointer is a redo branch that the new snapshot replaces
            let keep = state.current_history_index.map_or(0, |i| i + 1);
            next.history.truncate(keep);
            next.history.push(Arc::new(snapshot));
            next.current_history_index = Some(next.history.len() - 1);
        }),

        Action::RestoreSnapshot(index) => restore(state, index),

        Action::Undo => match state.current_history_index {
            Some(i) if i > 0 => restore(state, i - 1),
            _ => Arc::clone(state),
        },

        Action::Redo => match state.current_history_index {
            Some(i) => restore(state, i + 1),
            None => Arc::clone(state),
        },
    }
}

/// Replace live widgets with a copy of `history[index]`
fn restore(state: &Arc<DashboardState>, index: usize) -> Arc<DashboardState> {
    let Some(snapshot) = state.history.get(index) else {
        return Arc::clone(state);
    };

    let widgets: Vec<Arc<Widget>> = snapshot.widgets.iter().cloned().map(Arc::new).collect();
    modify(state, |next| {
        next.widgets = widgets;
        next.current_history_index = Some(index);
    })
}

fn modify(
    state: &Arc<DashboardState>,
    f: impl FnOnce(&mut DashboardState),
) -> Arc<DashboardState> {
    let mut next = DashboardState::clone(state);
    f(&mut next);
    Arc::new(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColumnSchema, ColumnType, MessageRole, WidgetConfig, WidgetType};

    fn empty() -> Arc<DashboardState> {
        Arc::new(DashboardState::new())
    }

    fn widget(id: &str, title: &str) -> Widget {
        Widget::new(id, WidgetType::Bar, title, "d1")
    }

    fn dataset(id: &str) -> Dataset {
        Dataset {
            id: id.to_string(),
            name: "sales".to_string(),
            data: Vec::new(),
            columns: vec![ColumnSchema::new("region", ColumnType::String, 0.95)],
            row_count: 0,
            uploaded_at: Utc::now(),
        }
    }

    fn snapshot(label: &str) -> Action {
        Action::CreateSnapshot {
            id: format!("snap-{label}"),
            label: label.to_string(),
            timestamp: Utc::now(),
        }
    }

    fn apply(state: Arc<DashboardState>, actions: impl IntoIterator<Item = Action>) -> Arc<DashboardState> {
        actions.into_iter().fold(state, |s, a| reduce(&s, a))
    }

    fn titles(state: &DashboardState) -> Vec<&str> {
        state.widgets().iter().map(|w| w.title.as_str()).collect()
    }

    #[test]
    fn test_add_dataset_keeps_duplicates() {
        let state = apply(
            empty(),
            [Action::AddDataset(dataset("d1")), Action::AddDataset(dataset("d1"))],
        );

        assert_eq!(state.datasets().len(), 2);
        assert!(state.dataset("d1").is_some());
    }

    #[test]
    fn test_add_widget_preserves_order() {
        let state = apply(
            empty(),
            [
                Action::AddWidget(widget("a", "A")),
                Action::AddWidget(widget("b", "B")),
                Action::AddWidget(widget("c", "C")),
            ],
        );

        assert_eq!(titles(&state), ["A", "B", "C"]);
    }

    #[test]
    fn test_add_widget_shares_untouched_elements() {
        let before = apply(empty(), [Action::AddWidget(widget("a", "A"))]);
        let after = reduce(&before, Action::AddWidget(widget("b", "B")));

        assert!(Arc::ptr_eq(&before.widgets()[0], &after.widgets()[0]));
    }

    #[test]
    fn test_update_changes_only_matching_widget() {
        let before = apply(
            empty(),
            [
                Action::AddWidget(widget("a", "A")),
                Action::AddWidget(widget("b", "B")),
            ],
        );
        let after = reduce(
            &before,
            Action::UpdateWidget {
                id: "a".to_string(),
                updates: WidgetUpdate::title("X"),
            },
        );

        assert_eq!(titles(&after), ["X", "B"]);
        assert_eq!(after.widgets()[0].config, before.widgets()[0].config);
        assert!(Arc::ptr_eq(&before.widgets()[1], &after.widgets()[1]));
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let before = apply(empty(), [Action::AddWidget(widget("a", "A"))]);
        let after = reduce(
            &before,
            Action::UpdateWidget {
                id: "zzz".to_string(),
                updates: WidgetUpdate::title("X"),
            },
        );

        assert!(Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_update_config_replaces_whole_object() {
        let configured = widget("a", "A").with_config(WidgetConfig {
            x_axis: Some("region".to_string()),
            y_axis: Some("sales".to_string()),
            ..WidgetConfig::default()
        });
        let state = apply(
            empty(),
            [
                Action::AddWidget(configured),
                Action::UpdateWidget {
                    id: "a".to_string(),
                    updates: WidgetUpdate::config(WidgetConfig {
                        y_axis: Some("profit".to_string()),
                        ..WidgetConfig::default()
                    }),
                },
            ],
        );

        let config = &state.widgets()[0].config;
        assert_eq!(config.x_axis, None);
        assert_eq!(config.y_axis.as_deref(), Some("profit"));
    }

    #[test]
    fn test_remove_clears_matching_selection() {
        let state = apply(
            empty(),
            [
                Action::AddWidget(widget("a", "A")),
                Action::AddWidget(widget("b", "B")),
                Action::SelectWidget(Some("a".to_string())),
                Action::RemoveWidget("a".to_string()),
            ],
        );

        assert_eq!(titles(&state), ["B"]);
        assert_eq!(state.selected_widget(), None);
    }

    #[test]
    fn test_remove_keeps_other_selection() {
        let state = apply(
            empty(),
            [
                Action::AddWidget(widget("a", "A")),
                Action::AddWidget(widget("b", "B")),
                Action::SelectWidget(Some("b".to_string())),
                Action::RemoveWidget("a".to_string()),
            ],
        );

        assert_eq!(state.selected_widget(), Some("b"));
    }

    #[test]
    fn test_remove_drops_every_duplicate() {
        let state = apply(
            empty(),
            [
                Action::AddWidget(widget("a", "first")),
                Action::AddWidget(widget("b", "B")),
                Action::AddWidget(widget("a", "second")),
                Action::RemoveWidget("a".to_string()),
            ],
        );

        assert_eq!(titles(&state), ["B"]);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let before = apply(
            empty(),
            [
                Action::AddWidget(widget("a", "A")),
                Action::SelectWidget(Some("a".to_string())),
            ],
        );
        let after = reduce(&before, Action::RemoveWidget("missing".to_string()));

        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(after.widgets().len(), 1);
        assert_eq!(after.selected_widget(), Some("a"));
    }

    #[test]
    fn test_select_dangling_id() {
        let state = reduce(&empty(), Action::SelectWidget(Some("ghost".to_string())));

        assert_eq!(state.selected_widget(), Some("ghost"));
        assert!(state.selected().is_none());

        let cleared = reduce(&state, Action::SelectWidget(None));
        assert_eq!(cleared.selected_widget(), None);
    }

    #[test]
    fn test_ai_messages_append() {
        let state = apply(
            empty(),
            [
                Action::AddAiMessage(AiMessage::user("add a bar chart")),
                Action::AddAiMessage(AiMessage::assistant("Added a bar chart")),
            ],
        );

        let roles: Vec<_> = state.ai_messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, [MessageRole::User, MessageRole::Assistant]);
    }

    #[test]
    fn test_first_snapshot_sets_pointer() {
        let state = reduce(&empty(), snapshot("initial"));

        assert_eq!(state.history().len(), 1);
        assert_eq!(state.current_history_index(), Some(0));
        assert!(state.history()[0].widgets.is_empty());
    }

    #[test]
    fn test_snapshot_truncates_redo_branch() {
        let mut state = empty();
        for label in ["s1", "s2", "s3", "s4"] {
            state = apply(
                state,
                [Action::AddWidget(widget(label, label)), snapshot(label)],
            );
        }
        state = apply(state, [Action::Undo, Action::Undo]);
        let before = state.current_history_index().unwrap();

        let state = reduce(&state, snapshot("branch"));

        assert_eq!(state.history().len(), before + 2);
        assert_eq!(state.current_history_index(), Some(state.history().len() - 1));
        let labels: Vec<_> = state.history().iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["s1", "s2", "branch"]);
    }

    #[test]
    fn test_snapshot_isolated_from_later_mutation() {
        let state = apply(
            empty(),
            [Action::AddWidget(widget("a", "Sales")), snapshot("s1")],
        );
        let stored = state.history()[0].widgets.clone();

        let state = apply(
            state,
            [
                Action::UpdateWidget {
                    id: "a".to_string(),
                    updates: WidgetUpdate::title("Changed"),
                },
                Action::AddWidget(widget("b", "B")),
                Action::RemoveWidget("a".to_string()),
            ],
        );

        assert_eq!(state.history()[0].widgets, stored);
        assert_eq!(state.history()[0].widgets[0].title, "Sales");
    }

    #[test]
    fn test_restore_out_of_range_is_noop() {
        let state = apply(empty(), [snapshot("s1")]);
        let after = reduce(&state, Action::RestoreSnapshot(5));

        assert!(Arc::ptr_eq(&state, &after));
    }

    #[test]
    fn test_restore_jumps_to_index() {
        let state = apply(
            empty(),
            [
                snapshot("empty"),
                Action::AddWidget(widget("a", "A")),
                snapshot("one"),
                Action::AddWidget(widget("b", "B")),
                snapshot("two"),
                Action::RestoreSnapshot(0),
            ],
        );

        assert!(state.widgets().is_empty());
        assert_eq!(state.current_history_index(), Some(0));
        assert!(state.can_redo());
        assert!(!state.can_undo());
    }

    #[test]
    fn test_undo_redo_on_empty_history() {
        let state = empty();

        assert!(Arc::ptr_eq(&state, &reduce(&state, Action::Undo)));
        assert!(Arc::ptr_eq(&state, &reduce(&state, Action::Redo)));
    }

    #[test]
    fn test_undo_at_start_and_redo_at_end_are_noops() {
        let state = apply(
            empty(),
            [
                Action::AddWidget(widget("a", "A")),
                snapshot("s1"),
                Action::AddWidget(widget("b", "B")),
                snapshot("s2"),
            ],
        );
        assert!(Arc::ptr_eq(&state, &reduce(&state, Action::Redo)));

        let start = reduce(&state, Action::Undo);
        assert_eq!(start.current_history_index(), Some(0));
        assert!(Arc::ptr_eq(&start, &reduce(&start, Action::Undo)));
    }

    #[test]
    fn test_undo_then_redo_restores_widgets() {
        let state = apply(
            empty(),
            [
                Action::AddWidget(widget("a", "A")),
                snapshot("s1"),
                Action::AddWidget(widget("b", "B")),
                snapshot("s2"),
            ],
        );
        let before: Vec<Widget> = state.widgets().iter().map(|w| Widget::clone(w)).collect();

        let round_trip = apply(state, [Action::Undo, Action::Redo]);
        let after: Vec<Widget> = round_trip.widgets().iter().map(|w| Widget::clone(w)).collect();

        assert_eq!(before, after);
        assert_eq!(round_trip.current_history_index(), Some(1));
    }
}
