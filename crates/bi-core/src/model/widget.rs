//! Chart widgets placed on the dashboard grid

use serde::{Deserialize, Serialize};

use super::DatasetId;

/// Unique identifier for a widget
pub type WidgetId = String;

/// Kinds of widget the dashboard can render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetType {
    Bar,
    Line,
    Pie,
    Kpi,
    Table,
}

impl WidgetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetType::Bar => "bar",
            WidgetType::Line => "line",
            WidgetType::Pie => "pie",
            WidgetType::Kpi => "kpi",
            WidgetType::Table => "table",
        }
    }
}

/// Aggregation applied to the value axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Sum,
    Avg,
    Count,
    Min,
    Max,
}

/// Two-stop color gradient, `["#from", "#to"]` on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gradient(pub String, pub String);

impl Gradient {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self(from.into(), to.into())
    }

    pub fn from_color(&self) -> &str {
        &self.0
    }

    pub fn to_color(&self) -> &str {
        &self.1
    }
}

/// Filter predicate attached to a widget.
///
/// Nothing evaluates filters yet, so the payload is kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSpec(pub serde_json::Value);

/// Rendering configuration of a widget
///
/// Axis names are not checked against the dataset; consumers decide what to
/// do with columns that do not exist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_axis: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_axis: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<Gradient>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<Aggregation>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FilterSpec>,
}

/// Grid placement in layout units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Default for Position {
    fn default() -> Self {
        Self { x: 0, y: 0, w: 4, h: 3 }
    }
}

/// A chart, KPI or table bound to one dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub id: WidgetId,

    #[serde(rename = "type")]
    pub widget_type: WidgetType,

    pub title: String,

    /// Weak reference; may name a dataset that is not loaded
    pub dataset_id: DatasetId,

    #[serde(default)]
    pub config: WidgetConfig,

    #[serde(default)]
    pub position: Position,
}

impl Widget {
    pub fn new(
        id: impl Into<WidgetId>,
        widget_type: WidgetType,
        title: impl Into<String>,
        dataset_id: impl Into<DatasetId>,
    ) -> Self {
        Self {
            id: id.into(),
            widget_type,
            title: title.into(),
            dataset_id: dataset_id.into(),
            config: WidgetConfig::default(),
            position: Position::default(),
        }
    }

    pub fn with_config(mut self, config: WidgetConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }
}

/// Partial update for a widget.
///
/// Every `Some` field overwrites the widget's field. `config` is replaced as
/// a whole: callers wanting a partial config change must start from the
/// widget's current config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetUpdate {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub widget_type: Option<WidgetType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<DatasetId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<WidgetConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl WidgetUpdate {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn config(config: WidgetConfig) -> Self {
        Self {
            config: Some(config),
            ..Self::default()
        }
    }

    pub fn with_widget_type(mut self, widget_type: WidgetType) -> Self {
        self.widget_type = Some(widget_type);
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.widget_type.is_none()
            && self.title.is_none()
            && self.dataset_id.is_none()
            && self.config.is_none()
            && self.position.is_none()
    }

    /// Shallow-merge this update over `widget`
    pub fn apply_to(&self, widget: &Widget) -> Widget {
        Widget {
            id: widget.id.clone(),
            widget_type: self.widget_type.unwrap_or(widget.widget_type),
            title: self.title.clone().unwrap_or_else(|| widget.title.clone()),
            dataset_id: self
                .dataset_id
                .clone()
                .unwrap_or_else(|| widget.dataset_id.clone()),
            config: self.config.clone().unwrap_or_else(|| widget.config.clone()),
            position: self.position.unwrap_or(widget.position),
        }
    }
}
