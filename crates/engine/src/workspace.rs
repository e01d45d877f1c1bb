//! Workspace: name plus the per-workspace service slots

use crate::observation::ObservationManager;
use crate::query::QueryManager;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A named workspace with its query manager and listener list
pub struct Workspace {
    name: String,
    query_manager: RwLock<Option<Arc<dyn QueryManager>>>,
    observation: ObservationManager,
}

impl Workspace {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            query_manager: RwLock::new(None),
            observation: ObservationManager::default(),
        }
    }

    /// Workspace name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Install the query manager, replacing any previous one
    pub fn set_query_manager(&self, manager: Arc<dyn QueryManager>) {
        debug!(target: "jcrmock::workspace", workspace = %self.name, "Query manager set");
        *self.query_manager.write() = Some(manager);
    }

    /// The installed query manager, if any
    pub fn query_manager(&self) -> Option<Arc<dyn QueryManager>> {
        self.query_manager.read().clone()
    }

    /// Listener registrations for this workspace
    pub fn observation_manager(&self) -> &ObservationManager {
        &self.observation
    }
}

impl fmt::Debug for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workspace")
            .field("name", &self.name)
            .field("has_query_manager", &self.query_manager.read().is_some())
            .finish()
    }
}
