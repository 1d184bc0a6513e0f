//! Dashboard entity model
//!
//! Plain data shapes shared by the reducer, the store and every consumer of
//! dashboard state. Nothing in here mutates state on its own.

mod dataset;
mod message;
mod state;
mod widget;

pub use dataset::{CellValue, ColumnSchema, ColumnType, Dataset, DatasetId, Row};
pub use message::{AiMessage, MessageId, MessageRole};
pub use state::{DashboardSnapshot, DashboardState, SnapshotId};
pub use widget::{
    Aggregation, FilterSpec, Gradient, Position, Widget, WidgetConfig, WidgetId, WidgetType,
    WidgetUpdate,
};
