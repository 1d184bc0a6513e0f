//! State subscriber trait

use crate::model::DashboardState;

/// Trait for components that need to respond to dashboard state changes
pub trait StateSubscriber: Send + Sync {
    /// Called after an action produced a new state
    fn on_state_change(&self, state: &DashboardState, action: &'static str);
}
