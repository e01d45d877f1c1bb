//! Structural mutations of the content tree
//!
//! Every change to the shape of the tree goes through this module so the
//! owning session's indexes stay consistent with the tree:
//!
//! - [`reparent`] is the single mechanism behind attaching, moving and
//!   renaming nodes (a rename is a reparent onto the same parent under a new
//!   name, keeping the sibling position).
//! - Identifier changes swap the identifier entry in one index write.
//! - Property attach/detach keep the `parentPath/name` entry current.
//!
//! Changes that would touch the indexes of a session that was logged out or
//! reset fail with a precondition error.
//!
//! ## Registration
//!
//! Re-registration walks the moved subtree with an explicit worklist. The
//! stale entries are captured before the tree changes and removed in the same
//! index write that installs the new entries, so a reader never sees both the
//! old and the new entry of one item.

use crate::index::IndexEntry;
use crate::item::Item;
use crate::node::Node;
use crate::property::Property;
use crate::session::SessionShared;
use jcrmock_core::error::{ensure, ensure_not_blank};
use jcrmock_core::{path, Error, Result};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

// =============================================================================
// Nodes
// =============================================================================

/// Attach or move `child` under `new_parent`
///
/// The child's subtree is unregistered from its previous session (if any) and
/// registered into the session of `new_parent` (if any).
///
/// # Errors
///
/// Precondition errors for self-parenting, cycles, moving a workspace root,
/// invalid names, sibling name clashes and identifier clashes in the target
/// session.
pub fn reparent(child: &Node, new_parent: &Node) -> Result<()> {
    relocate(child, new_parent, None)
}

/// Move `child` under `new_parent` and give it `new_name` in one step
pub(crate) fn move_node(child: &Node, new_parent: &Node, new_name: &str) -> Result<()> {
    relocate(child, new_parent, Some(new_name))
}

pub(crate) fn rename(node: &Node, new_name: &str) -> Result<()> {
    ensure(!node.is_root(), || "a workspace root cannot be renamed".to_string())?;
    validate_name(new_name)?;
    match node.parent() {
        Some(parent) => relocate(node, &parent, Some(new_name)),
        None => {
            node.write().name = new_name.to_string();
            Ok(())
        }
    }
}

fn relocate(child: &Node, new_parent: &Node, new_name: Option<&str>) -> Result<()> {
    ensure(!child.is_same(new_parent), || {
        format!("node '{}' cannot be its own parent", child.path())
    })?;
    ensure(!child.is_root(), || "a workspace root cannot be moved".to_string())?;
    ensure(!new_parent.is_descendant_of(child), || {
        format!(
            "moving '{}' under '{}' would create a cycle",
            child.path(),
            new_parent.path()
        )
    })?;

    let name = new_name.map(str::to_string).unwrap_or_else(|| child.name());
    validate_name(&name)?;
    if let Some(existing) = new_parent.child(&name) {
        ensure(existing.is_same(child), || {
            format!("'{}' already has a child named '{name}'", new_parent.path())
        })?;
    }

    let old_session = live_session(child)?;
    let target = live_session(new_parent)?;
    let before = subtree_entries(child)?;
    if let Some(target) = &target {
        check_identifiers(target, &before)?;
    }

    let old_path = child.path();
    let old_parent = child.parent();
    let same_parent = old_parent.as_ref().is_some_and(|p| p.is_same(new_parent));
    if let Some(old_parent) = old_parent.filter(|_| !same_parent) {
        old_parent.write().children.retain(|c| !c.is_same(child));
    }
    {
        let mut data = child.write();
        data.name = name;
        data.parent = Some(new_parent.clone());
    }
    if !same_parent {
        new_parent.write().children.push(child.clone());
    }

    let after = link_subtree(child, target.as_ref())?;
    apply(
        old_session.map(|s| (s, before)),
        target.map(|s| (s, after)),
    );

    debug!(target: "jcrmock::graph", from = %old_path, to = %child.path(), "Node reparented");
    Ok(())
}

pub(crate) fn remove_node(node: &Node) -> Result<()> {
    ensure(!node.is_root(), || "a workspace root cannot be removed".to_string())?;
    let parent = node
        .parent()
        .ok_or_else(|| Error::precondition(format!("'{}' has no parent", node.path())))?;
    let session = live_session(node)?;

    let old_path = node.path();
    let stale = subtree_entries(node)?;

    parent.write().children.retain(|c| !c.is_same(node));
    node.write().parent = None;
    link_subtree(node, None)?;
    if let Some(session) = session {
        session.index.write().remove_entries(&stale);
    }

    debug!(target: "jcrmock::graph", path = %old_path, items = stale.len(), "Node removed");
    Ok(())
}

pub(crate) fn set_identifier(node: &Node, identifier: &str) -> Result<()> {
    ensure_not_blank(identifier, "identifier")?;
    let session = live_session(node)?;
    if let Some(session) = &session {
        let owner = session
            .index
            .read()
            .identifier_owner(identifier, std::slice::from_ref(node));
        if let Some(owner) = owner {
            return Err(Error::precondition(format!(
                "identifier '{identifier}' is already used by '{}'",
                owner.path()
            )));
        }
    }

    let old = node.write().identifier.replace(identifier.to_string());
    if let Some(session) = session {
        session
            .index
            .write()
            .replace_identifier(node, old.as_deref(), identifier);
    }

    debug!(target: "jcrmock::graph", old = ?old, new = identifier, "Identifier set");
    Ok(())
}

// =============================================================================
// Properties
// =============================================================================

pub(crate) fn attach_property(node: &Node, property: &Property) -> Result<()> {
    let session = live_session(node)?;
    if property.parent().is_some_and(|p| p.is_same(node)) {
        return Ok(());
    }
    detach_property(property);

    let name = property.name();
    let replaced = {
        let mut data = node.write();
        let replaced = data
            .properties
            .iter()
            .position(|p| p.name() == name)
            .map(|i| data.properties.remove(i));
        data.properties.push(property.clone());
        replaced
    };
    if let Some(replaced) = &replaced {
        replaced.set_parent(None);
    }
    property.set_parent(Some(node.clone()));

    // Detached nodes have nothing to register into.
    if let Some(session) = session {
        let entry = IndexEntry {
            path: path::join(&node.path(), &name),
            item: Item::Property(property.clone()),
            identifier: None,
        };
        session.index.write().insert_entries(&[entry]);
    }
    Ok(())
}

pub(crate) fn detach_property(property: &Property) {
    let Some(parent) = property.parent() else {
        return;
    };
    let session = parent.session_shared();
    let stale_path = property.path();

    parent.write().properties.retain(|p| !p.is_same(property));
    property.set_parent(None);

    if let Some(session) = session {
        let entry = IndexEntry {
            path: stale_path,
            item: Item::Property(property.clone()),
            identifier: None,
        };
        session.index.write().remove_entries(&[entry]);
    }
}

// =============================================================================
// Subtree walks
// =============================================================================

/// Every node and property below (and including) `top`, with current paths
///
/// # Errors
///
/// Returns a precondition error if a node is reached twice.
pub(crate) fn subtree_entries(top: &Node) -> Result<Vec<IndexEntry>> {
    let mut entries = Vec::new();
    let mut visited = HashSet::new();
    let mut worklist = vec![(top.clone(), top.path())];

    while let Some((node, node_path)) = worklist.pop() {
        if !visited.insert(node.ptr()) {
            return Err(Error::precondition(format!("cycle detected at '{node_path}'")));
        }
        let (identifier, children, properties) = {
            let data = node.read();
            (
                data.identifier.clone(),
                data.children.clone(),
                data.properties.clone(),
            )
        };
        for property in properties {
            entries.push(IndexEntry {
                path: path::join(&node_path, &property.name()),
                item: Item::Property(property),
                identifier: None,
            });
        }
        for child in children.into_iter().rev() {
            let child_path = path::join(&node_path, &child.name());
            worklist.push((child, child_path));
        }
        entries.push(IndexEntry {
            path: node_path,
            item: Item::Node(node),
            identifier,
        });
    }
    Ok(entries)
}

/// Point every node of the subtree at `target` and collect its index entries
fn link_subtree(top: &Node, target: Option<&Arc<SessionShared>>) -> Result<Vec<IndexEntry>> {
    let session = target.map(Arc::downgrade).unwrap_or_default();
    let auto_identifiers = target.is_some_and(|s| s.auto_identifiers);

    let mut entries = subtree_entries(top)?;
    for entry in &mut entries {
        let node = match &entry.item {
            Item::Node(node) => node.clone(),
            Item::Property(_) => continue,
        };
        let mut data = node.write();
        data.session = session.clone();
        if auto_identifiers && data.identifier.is_none() {
            let identifier = Uuid::new_v4().to_string();
            data.identifier = Some(identifier.clone());
            entry.identifier = Some(identifier);
        }
    }
    Ok(entries)
}

/// Session of `node`, failing if it has been logged out or reset
fn live_session(node: &Node) -> Result<Option<Arc<SessionShared>>> {
    match node.session_shared() {
        Some(session) if !session.is_live() => Err(Error::precondition(format!(
            "session for workspace '{}' is no longer live",
            session.workspace.name()
        ))),
        session => Ok(session),
    }
}

fn check_identifiers(target: &SessionShared, entries: &[IndexEntry]) -> Result<()> {
    let nodes: Vec<Node> = entries
        .iter()
        .filter_map(|e| e.item.as_node().cloned())
        .collect();
    let clash = {
        let index = target.index.read();
        entries
            .iter()
            .filter_map(|e| e.identifier.as_deref())
            .find_map(|id| index.identifier_owner(id, &nodes).map(|_| id.to_string()))
    };
    match clash {
        Some(id) => Err(Error::precondition(format!(
            "identifier '{id}' is already used in workspace '{}'",
            target.workspace.name()
        ))),
        None => Ok(()),
    }
}

fn apply(
    stale: Option<(Arc<SessionShared>, Vec<IndexEntry>)>,
    fresh: Option<(Arc<SessionShared>, Vec<IndexEntry>)>,
) {
    match (stale, fresh) {
        (Some((old, stale)), Some((new, fresh))) if Arc::ptr_eq(&old, &new) => {
            let mut index = new.index.write();
            index.remove_entries(&stale);
            index.insert_entries(&fresh);
        }
        (stale, fresh) => {
            if let Some((old, stale)) = stale {
                old.index.write().remove_entries(&stale);
            }
            if let Some((new, fresh)) = fresh {
                new.index.write().insert_entries(&fresh);
            }
        }
    }
}

fn validate_name(name: &str) -> Result<()> {
    ensure_not_blank(name, "node name")?;
    ensure(
        !name.contains(path::SEPARATOR) && name != "." && name != "..",
        || format!("'{name}' is not a valid node name"),
    )
}
