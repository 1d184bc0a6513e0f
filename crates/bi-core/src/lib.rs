//! Core state engine for the BI dashboard
//!
//! This crate owns the dashboard entity model, the pure reducer that moves
//! the dashboard from one state to the next, and the session store that
//! the rest of the application dispatches into.

pub mod model;
pub mod provider;
pub mod reducer;
pub mod store;
pub mod subscriber;

use thiserror::Error;

// Re-export commonly used types
pub use model::{
    AiMessage, CellValue, ColumnSchema, ColumnType, DashboardSnapshot, DashboardState, Dataset,
    Gradient,
    DatasetId, MessageRole, Position, Row, Widget, WidgetConfig, WidgetId, WidgetType,
    WidgetUpdate,
};
pub use provider::DashboardProvider;
pub use reducer::{reduce, Action};
pub use store::{DashboardStore, ViewSettings};
pub use subscriber::StateSubscriber;

/// Errors raised by the store layer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("dashboard store used outside of a provided session")]
    NotProvided,
}
