//! Session-scoped provisioning of the dashboard store

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::store::DashboardStore;
use crate::StoreError;

/// Holds the dashboard store while the dashboard view is mounted
///
/// The composition root owns one provider and hands references to whatever
/// needs the store. Reading the store before [`provide`](Self::provide) or
/// after [`teardown`](Self::teardown) is a wiring mistake and reports
/// [`StoreError::NotProvided`].
#[derive(Default)]
pub struct DashboardProvider {
    store: RwLock<Option<Arc<DashboardStore>>>,
}

impl DashboardProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh session, replacing any existing store
    pub fn provide(&self) -> Arc<DashboardStore> {
        let store = Arc::new(DashboardStore::new());
        let previous = self.store.write().replace(Arc::clone(&store));
        if previous.is_some() {
            info!("replacing existing dashboard session");
        } else {
            info!("dashboard session started");
        }
        store
    }

    /// End the session; all state is discarded
    pub fn teardown(&self) {
        if self.store.write().take().is_some() {
            info!("dashboard session ended");
        }
    }

    /// The store of the current session
    pub fn store(&self) -> Result<Arc<DashboardStore>, StoreError> {
        self.store.read().clone().ok_or(StoreError::NotProvided)
    }

    pub fn is_provided(&self) -> bool {
        self.store.read().is_some()
    }
}
