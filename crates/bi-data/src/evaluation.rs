//! Evaluation metrics contract
//!
//! The backend scores every AI command it handles. The evaluation view reads
//! the aggregate summary and a page of individual results; neither touches
//! dashboard state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ServiceError;

/// Aggregate AI command metrics
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EvaluationSummary {
    #[serde(default)]
    pub total_tasks: u64,

    /// Fraction of commands that succeeded, 0.0 to 1.0
    #[serde(default)]
    pub task_success_rate: f64,

    #[serde(default)]
    pub average_latency_ms: f64,

    #[serde(default)]
    pub average_action_correctness: f64,

    /// USD
    #[serde(default)]
    pub total_estimated_cost: f64,

    #[serde(default)]
    pub average_reasoning_length: BTreeMap<String, f64>,

    #[serde(default)]
    pub tool_usage_accuracy: f64,

    #[serde(default)]
    pub metrics_by_action_type: BTreeMap<String, serde_json::Value>,
}

impl EvaluationSummary {
    pub fn from_json(bytes: &[u8]) -> Result<Self, ServiceError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn is_empty(&self) -> bool {
        self.total_tasks == 0
    }
}

/// One scored AI command
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EvaluationRecord {
    pub id: String,
    pub task_id: String,

    #[serde(default)]
    pub timestamp: Option<String>,

    pub user_command: String,

    #[serde(default)]
    pub action_type: Option<String>,

    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub error_message: Option<String>,

    #[serde(default)]
    pub latency_ms: f64,

    #[serde(default)]
    pub prompt_tokens: u64,

    #[serde(default)]
    pub response_tokens: u64,

    #[serde(default)]
    pub estimated_cost: f64,

    #[serde(default)]
    pub action_correctness_score: f64,

    #[serde(default = "default_true")]
    pub tool_usage_correct: bool,

    #[serde(default)]
    pub llm_provider: Option<String>,

    #[serde(default)]
    pub execution_time_ms: f64,

    #[serde(default)]
    pub intent_parsed: Option<serde_json::Value>,

    #[serde(default)]
    pub action_generated: Option<serde_json::Value>,
}

fn default_true() -> bool {
    true
}

impl EvaluationRecord {
    /// Decode a results page, newest first
    pub fn list_from_json(bytes: &[u8]) -> Result<Vec<Self>, ServiceError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.response_tokens
    }
}

/// Pagination for evaluation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultsPage {
    pub limit: u32,
    pub offset: u32,
}

impl Default for ResultsPage {
    fn default() -> Self {
        Self { limit: 50, offset: 0 }
    }
}

impl ResultsPage {
    pub fn next(&self) -> Self {
        Self {
            limit: self.limit,
            offset: self.offset + self.limit,
        }
    }

    pub fn query(&self) -> String {
        format!("limit={}&offset={}", self.limit, self.offset)
    }
}
