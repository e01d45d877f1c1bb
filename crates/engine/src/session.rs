//! Session: the per-workspace entry point into the content tree
//!
//! A session owns the workspace root and the lookup indexes for everything
//! registered below it. Nodes keep a weak link back to the session: once the
//! last `Session` handle is gone, node handles still read their tree but
//! no longer resolve a session.
//!
//! A session that was logged out or reset rejects structural changes with a
//! precondition error; its tree stays readable.
//!
//! Persistence is not modeled: every change is visible immediately, `save()`
//! and `refresh()` do nothing and nothing is ever pending.

use crate::graph;
use crate::index::{IndexEntry, ItemIndex};
use crate::item::Item;
use crate::node::Node;
use crate::property::Property;
use crate::workspace::Workspace;
use jcrmock_core::{path, Error, RepositoryConfig, Result};
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

pub(crate) struct SessionShared {
    pub(crate) workspace: Arc<Workspace>,
    user_id: String,
    root: Node,
    pub(crate) index: RwLock<ItemIndex>,
    pub(crate) auto_identifiers: bool,
    pub(crate) default_primary_type: String,
    live: AtomicBool,
}

impl SessionShared {
    pub(crate) fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }
}

/// Handle to a workspace session
#[derive(Clone)]
pub struct Session(Arc<SessionShared>);

impl Session {
    /// Open a session on a fresh, empty workspace
    pub fn new(workspace: &str, config: &RepositoryConfig) -> Self {
        let shared = Arc::new_cyclic(|weak| SessionShared {
            workspace: Arc::new(Workspace::new(workspace)),
            user_id: config.user_id.clone(),
            root: Node::root(weak.clone(), &config.root_primary_type),
            index: RwLock::new(ItemIndex::default()),
            auto_identifiers: config.auto_identifiers,
            default_primary_type: config.default_primary_type.clone(),
            live: AtomicBool::new(true),
        });
        shared.index.write().insert_entries(&[IndexEntry {
            path: path::ROOT_PATH.to_string(),
            item: Item::Node(shared.root.clone()),
            identifier: None,
        }]);
        debug!(target: "jcrmock::session", workspace, user = %config.user_id, "Session opened");
        Session(shared)
    }

    pub(crate) fn from_shared(shared: Arc<SessionShared>) -> Self {
        Session(shared)
    }

    /// Check if two handles point at the same session
    pub fn is_same(&self, other: &Session) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Name of the workspace this session is bound to
    pub fn workspace_name(&self) -> &str {
        self.0.workspace.name()
    }

    /// The workspace this session is bound to
    pub fn workspace(&self) -> &Workspace {
        &self.0.workspace
    }

    /// User the session was opened for
    pub fn user_id(&self) -> &str {
        &self.0.user_id
    }

    /// Workspace root (path `/`)
    pub fn root_node(&self) -> Node {
        self.0.root.clone()
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Node or property at an absolute path
    pub fn item(&self, abs_path: &str) -> Option<Item> {
        if !path::is_absolute(abs_path) {
            return None;
        }
        let normalized = path::normalize(abs_path);
        self.0.index.read().item(&normalized)
    }

    /// Node at an absolute path
    pub fn node(&self, abs_path: &str) -> Option<Node> {
        self.item(abs_path).and_then(Item::into_node)
    }

    /// Property at an absolute path
    pub fn property(&self, abs_path: &str) -> Option<Property> {
        self.item(abs_path).and_then(Item::into_property)
    }

    /// Node registered under an identifier
    pub fn node_by_identifier(&self, identifier: &str) -> Option<Node> {
        self.0.index.read().node_by_identifier(identifier)
    }

    /// Alias of [`Session::node_by_identifier`]
    pub fn node_by_uuid(&self, uuid: &str) -> Option<Node> {
        self.node_by_identifier(uuid)
    }

    /// Check if an item exists at an absolute path
    pub fn item_exists(&self, abs_path: &str) -> bool {
        self.item(abs_path).is_some()
    }

    /// Check if a node exists at an absolute path
    pub fn node_exists(&self, abs_path: &str) -> bool {
        self.node(abs_path).is_some()
    }

    /// Check if a property exists at an absolute path
    pub fn property_exists(&self, abs_path: &str) -> bool {
        self.property(abs_path).is_some()
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Remove the node or property at an absolute path
    ///
    /// # Errors
    ///
    /// Precondition error if nothing exists there or the path is the root.
    pub fn remove_item(&self, abs_path: &str) -> Result<()> {
        match self.item(abs_path) {
            Some(Item::Node(node)) => node.remove(),
            Some(Item::Property(property)) => {
                property.remove();
                Ok(())
            }
            None => Err(Error::precondition(format!("no item at '{abs_path}'"))),
        }
    }

    /// Move the node at `src_abs_path` so that it ends up at `dest_abs_path`
    ///
    /// The parent of the destination must exist; the last segment becomes the
    /// node's new name.
    pub fn move_item(&self, src_abs_path: &str, dest_abs_path: &str) -> Result<()> {
        let node = self
            .node(src_abs_path)
            .ok_or_else(|| Error::precondition(format!("no node at '{src_abs_path}'")))?;
        let dest = path::normalize(dest_abs_path);
        let parent = path::parent_of(&dest)
            .and_then(|p| self.node(&p))
            .ok_or_else(|| {
                Error::precondition(format!("parent of '{dest_abs_path}' does not exist"))
            })?;
        graph::move_node(&node, &parent, path::name_of(&dest))
    }

    /// Persist pending changes (nothing is ever pending)
    pub fn save(&self) -> Result<()> {
        trace!(target: "jcrmock::session", workspace = self.workspace_name(), "save");
        Ok(())
    }

    /// Discard pending changes (nothing is ever pending)
    pub fn refresh(&self, keep_changes: bool) -> Result<()> {
        trace!(
            target: "jcrmock::session",
            workspace = self.workspace_name(),
            keep_changes,
            "refresh"
        );
        Ok(())
    }

    /// Always `false`: changes apply immediately
    pub fn has_pending_changes(&self) -> bool {
        false
    }

    /// Mark the session as closed
    ///
    /// The tree stays readable through existing handles; the repository hands
    /// out a fresh session on the next login.
    pub fn logout(&self) {
        self.0.live.store(false, Ordering::Release);
        debug!(target: "jcrmock::session", workspace = self.workspace_name(), "Session closed");
    }

    /// Check if the session has not been logged out or reset
    pub fn is_live(&self) -> bool {
        self.0.is_live()
    }

    /// Drop every index entry and close the session
    pub(crate) fn invalidate(&self) {
        self.0.index.write().clear();
        self.0.live.store(false, Ordering::Release);
    }

    /// Number of registered paths
    pub fn item_count(&self) -> usize {
        self.0.index.read().len()
    }
}

impl PartialEq for Session {
    fn eq(&self, other: &Self) -> bool {
        self.is_same(other)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("workspace", &self.workspace_name())
            .field("user_id", &self.user_id())
            .field("live", &self.is_live())
            .finish()
    }
}
