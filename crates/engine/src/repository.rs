//! Repository: the session registry of one test context
//!
//! Logging into a workspace twice returns the same [`Session`] until the
//! workspace is reset (or the session logged out). Each test builds its own
//! `Repository`, so parallel tests never share content.
//!
//! ## Example
//!
//! ```
//! use jcrmock_engine::Repository;
//!
//! let repository = Repository::default();
//! let session = repository.login("website").unwrap();
//! session.root_node().add_node("page").unwrap();
//! assert!(repository.login("website").unwrap().node_exists("/page"));
//!
//! repository.reset("website");
//! assert!(!repository.login("website").unwrap().node_exists("/page"));
//! ```

use crate::session::Session;
use jcrmock_core::error::ensure_not_blank;
use jcrmock_core::{RepositoryConfig, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::info;

/// Registry of workspace sessions
#[derive(Debug)]
pub struct Repository {
    config: RepositoryConfig,
    sessions: Mutex<HashMap<String, Session>>,
}

impl Repository {
    /// Create a repository with a validated configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the configuration does not validate.
    pub fn new(config: RepositoryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            sessions: Mutex::new(HashMap::new()),
        })
    }

    /// Configuration the repository was built with
    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Session for a workspace, created on first use
    ///
    /// # Errors
    ///
    /// Returns a precondition error for a blank workspace name.
    pub fn login(&self, workspace: &str) -> Result<Session> {
        ensure_not_blank(workspace, "workspace name")?;
        let mut sessions = self.sessions.lock();
        if let Some(session) = sessions.get(workspace).filter(|s| s.is_live()) {
            return Ok(session.clone());
        }
        let session = Session::new(workspace, &self.config);
        sessions.insert(workspace.to_string(), session.clone());
        info!(target: "jcrmock::repository", workspace, user = %self.config.user_id, "Logged in");
        Ok(session)
    }

    /// Session for the configured default workspace
    pub fn login_default(&self) -> Result<Session> {
        self.login(&self.config.default_workspace)
    }

    /// Drop the session of one workspace, returning whether one existed
    ///
    /// Existing handles to the dropped session see empty indexes and report
    /// `is_live() == false`.
    pub fn reset(&self, workspace: &str) -> bool {
        let removed = self.sessions.lock().remove(workspace);
        match removed {
            Some(session) => {
                session.invalidate();
                info!(target: "jcrmock::repository", workspace, "Workspace reset");
                true
            }
            None => false,
        }
    }

    /// Drop every session
    pub fn reset_all(&self) {
        let drained: Vec<Session> = self.sessions.lock().drain().map(|(_, s)| s).collect();
        for session in &drained {
            session.invalidate();
        }
        info!(target: "jcrmock::repository", count = drained.len(), "All workspaces reset");
    }

    /// Workspaces with a cached session, sorted by name
    pub fn workspace_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sessions.lock().keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self {
            config: RepositoryConfig::default(),
            sessions: Mutex::new(HashMap::new()),
        }
    }
}
