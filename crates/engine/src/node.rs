//! Node: a named vertex of the content tree
//!
//! ## Design
//!
//! `Node` is a cheap handle (`Arc` around a `parking_lot::RwLock`). Cloning a
//! handle never copies the node; two handles are the same node when
//! [`Node::is_same`] holds.
//!
//! A parent exclusively owns its children and properties, and every child or
//! property holds its parent alive in turn. Any handle into a tree therefore
//! keeps the whole ancestry reachable: `Node::new("top").add_node("a")`
//! returns a node whose path stays `/top/a` after the `top` handle is gone.
//! Removing a node cuts both links between it and its former parent.
//!
//! The two links form a reference cycle, so a tree is only reclaimed once it
//! has been taken apart with [`Node::remove`]. Trees are expected to live for
//! one test.
//!
//! Every node keeps a weak link to the session it is registered in. A handle
//! that outlives its session still reads its name, path and subtree, while
//! [`Node::session`] returns `None`.
//!
//! ## Paths
//!
//! The path is derived by walking parent links, never stored. A detached node
//! behaves like the top of its own tree: `Node::new("a")` has path `/a`.
//!
//! ## Mutation
//!
//! Structural changes (attach, move, rename, remove, identifiers, properties)
//! go through [`crate::graph`], which keeps the session indexes consistent.

use crate::graph;
use crate::property::Property;
use crate::session::{Session, SessionShared};
use jcrmock_core::error::ensure_not_blank;
use jcrmock_core::{path, Error, Result, Value};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::fmt;
use std::sync::{Arc, Weak};

/// Primary type of nodes created outside a session
pub const DEFAULT_PRIMARY_TYPE: &str = "nt:unstructured";

/// Base type every node is an instance of
pub const NT_BASE: &str = "nt:base";

pub(crate) type NodeRef = Arc<RwLock<NodeData>>;

pub(crate) struct NodeData {
    pub(crate) name: String,
    pub(crate) identifier: Option<String>,
    pub(crate) primary_type: String,
    pub(crate) mixin_types: Vec<String>,
    pub(crate) children: Vec<Node>,
    pub(crate) properties: Vec<Property>,
    pub(crate) parent: Option<Node>,
    pub(crate) session: Weak<SessionShared>,
    pub(crate) is_root: bool,
}

/// Handle to a node of the content tree
#[derive(Clone)]
pub struct Node {
    inner: NodeRef,
}

impl Node {
    /// Create a detached node with the default primary type
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_type(name, DEFAULT_PRIMARY_TYPE)
    }

    /// Create a detached node with an explicit primary type
    pub fn with_type(name: impl Into<String>, primary_type: impl Into<String>) -> Self {
        Self::from_data(NodeData {
            name: name.into(),
            identifier: None,
            primary_type: primary_type.into(),
            mixin_types: Vec::new(),
            children: Vec::new(),
            properties: Vec::new(),
            parent: None,
            session: Weak::new(),
            is_root: false,
        })
    }

    pub(crate) fn root(session: Weak<SessionShared>, primary_type: &str) -> Self {
        Self::from_data(NodeData {
            name: String::new(),
            identifier: None,
            primary_type: primary_type.to_string(),
            mixin_types: Vec::new(),
            children: Vec::new(),
            properties: Vec::new(),
            parent: None,
            session,
            is_root: true,
        })
    }

    fn from_data(data: NodeData) -> Self {
        Self {
            inner: Arc::new(RwLock::new(data)),
        }
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, NodeData> {
        self.inner.read()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, NodeData> {
        self.inner.write()
    }

    pub(crate) fn ptr(&self) -> *const RwLock<NodeData> {
        Arc::as_ptr(&self.inner)
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// Check if two handles point at the same node
    pub fn is_same(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Node name (empty for a workspace root)
    pub fn name(&self) -> String {
        self.read().name.clone()
    }

    /// Identifier, if one was set
    pub fn identifier(&self) -> Option<String> {
        self.read().identifier.clone()
    }

    /// Set the identifier and update the session's identifier index
    ///
    /// # Errors
    ///
    /// Blank identifiers and identifiers already used by another node of the
    /// same session are precondition errors.
    pub fn set_identifier(&self, identifier: &str) -> Result<()> {
        graph::set_identifier(self, identifier)
    }

    /// REFERENCE value pointing at this node
    ///
    /// # Errors
    ///
    /// Returns a precondition error if the node has no identifier.
    pub fn reference_value(&self) -> Result<Value> {
        match self.identifier() {
            Some(identifier) => Value::reference(identifier),
            None => Err(Error::precondition(format!(
                "node '{}' has no identifier",
                self.path()
            ))),
        }
    }

    /// Check if this node is the root of a workspace
    pub fn is_root(&self) -> bool {
        self.read().is_root
    }

    // =========================================================================
    // Types
    // =========================================================================

    /// Primary node type
    pub fn primary_type(&self) -> String {
        self.read().primary_type.clone()
    }

    /// Replace the primary node type
    pub fn set_primary_type(&self, primary_type: &str) -> Result<()> {
        ensure_not_blank(primary_type, "primary type")?;
        self.write().primary_type = primary_type.to_string();
        Ok(())
    }

    /// Mixin types in the order they were added
    pub fn mixin_types(&self) -> Vec<String> {
        self.read().mixin_types.clone()
    }

    /// Add a mixin type; adding one twice has no effect
    pub fn add_mixin(&self, mixin: &str) -> Result<()> {
        ensure_not_blank(mixin, "mixin type")?;
        let mut data = self.write();
        if !data.mixin_types.iter().any(|m| m == mixin) {
            data.mixin_types.push(mixin.to_string());
        }
        Ok(())
    }

    /// Remove a mixin type, returning whether it was present
    pub fn remove_mixin(&self, mixin: &str) -> bool {
        let mut data = self.write();
        let before = data.mixin_types.len();
        data.mixin_types.retain(|m| m != mixin);
        data.mixin_types.len() != before
    }

    /// Check the primary type and mixins (every node is an `nt:base`)
    pub fn is_node_type(&self, node_type: &str) -> bool {
        let data = self.read();
        node_type == NT_BASE
            || data.primary_type == node_type
            || data.mixin_types.iter().any(|m| m == node_type)
    }

    // =========================================================================
    // Hierarchy
    // =========================================================================

    /// Parent node (`None` for roots and detached nodes)
    pub fn parent(&self) -> Option<Node> {
        self.read().parent.clone()
    }

    /// Session this node is registered in
    pub fn session(&self) -> Option<Session> {
        self.session_shared().map(Session::from_shared)
    }

    pub(crate) fn session_shared(&self) -> Option<Arc<SessionShared>> {
        self.read().session.upgrade()
    }

    /// Absolute path derived from the ancestor names
    pub fn path(&self) -> String {
        let mut names = Vec::new();
        let mut current = self.clone();
        loop {
            let (name, parent, is_root) = {
                let data = current.read();
                (data.name.clone(), data.parent.clone(), data.is_root)
            };
            match parent {
                Some(parent) => {
                    names.push(name);
                    current = parent;
                }
                None => {
                    if !is_root && !name.is_empty() {
                        names.push(name);
                    }
                    break;
                }
            }
        }
        names
            .iter()
            .rev()
            .fold(path::ROOT_PATH.to_string(), |acc, name| path::join(&acc, name))
    }

    /// Number of ancestors between this node and the top of its tree
    pub fn depth(&self) -> usize {
        path::depth(&self.path())
    }

    /// Ancestor at the given depth (`0` is the top of the tree, own depth is self)
    pub fn ancestor(&self, depth: usize) -> Option<Node> {
        let mut lineage = vec![self.clone()];
        while let Some(parent) = lineage.last().and_then(Node::parent) {
            lineage.push(parent);
        }
        lineage.reverse();
        let top_depth = lineage.first().map(Node::depth).unwrap_or(0);
        lineage.get(depth.checked_sub(top_depth)?).cloned()
    }

    /// Check if `ancestor` is a strict ancestor of this node
    pub fn is_descendant_of(&self, ancestor: &Node) -> bool {
        let mut current = self.parent();
        while let Some(node) = current {
            if node.is_same(ancestor) {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// First child with the given name
    pub(crate) fn child(&self, name: &str) -> Option<Node> {
        let data = self.read();
        data.children.iter().find(|c| c.read().name == name).cloned()
    }

    /// Resolve a relative path such as `a/b`, `..` or `../sibling`
    ///
    /// An absolute path is resolved through the session, if any.
    pub fn node(&self, rel_path: &str) -> Option<Node> {
        if path::is_absolute(rel_path) {
            return self.session()?.node(rel_path);
        }
        let mut current = self.clone();
        for segment in rel_path.split(path::SEPARATOR).filter(|s| !s.is_empty()) {
            current = match segment {
                "." => current,
                ".." => current.parent()?,
                name => current.child(name)?,
            };
        }
        Some(current)
    }

    /// Check if a relative path resolves to a node
    pub fn has_node(&self, rel_path: &str) -> bool {
        self.node(rel_path).is_some()
    }

    /// Children in sibling order
    pub fn nodes(&self) -> Vec<Node> {
        self.read().children.clone()
    }

    /// Check if this node has children
    pub fn has_nodes(&self) -> bool {
        !self.read().children.is_empty()
    }

    /// Attach `child` as the last child of this node
    pub fn add_child(&self, child: &Node) -> Result<()> {
        graph::reparent(child, self)
    }

    /// Create and attach a child with the session's default primary type
    pub fn add_node(&self, name: &str) -> Result<Node> {
        let primary_type = self
            .session_shared()
            .map(|s| s.default_primary_type.clone())
            .unwrap_or_else(|| DEFAULT_PRIMARY_TYPE.to_string());
        self.add_node_with_type(name, &primary_type)
    }

    /// Create and attach a child with an explicit primary type
    pub fn add_node_with_type(&self, name: &str, primary_type: &str) -> Result<Node> {
        ensure_not_blank(primary_type, "primary type")?;
        let child = Node::with_type(name, primary_type);
        graph::reparent(&child, self)?;
        Ok(child)
    }

    /// Move this node under `new_parent`, keeping its name
    pub fn move_to(&self, new_parent: &Node) -> Result<()> {
        graph::reparent(self, new_parent)
    }

    /// Rename this node in place
    pub fn rename(&self, new_name: &str) -> Result<()> {
        graph::rename(self, new_name)
    }

    /// Detach this node (and its subtree) from its parent
    pub fn remove(&self) -> Result<()> {
        graph::remove_node(self)
    }

    /// Move the child `src` before the child `dest` (`None` moves it last)
    pub fn order_before(&self, src: &str, dest: Option<&str>) -> Result<()> {
        let mut data = self.write();
        let position = |children: &[Node], name: &str| {
            children.iter().position(|c| c.read().name == name)
        };
        let from = position(&data.children, src)
            .ok_or_else(|| Error::precondition(format!("no child named '{src}'")))?;
        if let Some(dest) = dest {
            if position(&data.children, dest).is_none() {
                return Err(Error::precondition(format!("no child named '{dest}'")));
            }
        }
        let moved = data.children.remove(from);
        let to = dest
            .and_then(|dest| position(&data.children, dest))
            .unwrap_or(data.children.len());
        data.children.insert(to, moved);
        Ok(())
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Property by name or by relative path such as `child/prop`
    pub fn property(&self, rel_path: &str) -> Option<Property> {
        let (segments, name) = path::split_relative(rel_path);
        let owner = if segments.is_empty() {
            self.clone()
        } else {
            self.node(&segments.join("/"))?
        };
        let data = owner.read();
        data.properties.iter().find(|p| p.name() == name).cloned()
    }

    /// Check if a property exists at a relative path
    pub fn has_property(&self, rel_path: &str) -> bool {
        self.property(rel_path).is_some()
    }

    /// Properties in insertion order
    pub fn properties(&self) -> Vec<Property> {
        self.read().properties.clone()
    }

    /// Check if this node has properties
    pub fn has_properties(&self) -> bool {
        !self.read().properties.is_empty()
    }

    /// Set a single-valued property, replacing any property of the same name
    pub fn set_property(&self, name: &str, value: impl Into<Value>) -> Result<Property> {
        let property = Property::new(name, value)?;
        graph::attach_property(self, &property)?;
        Ok(property)
    }

    /// Set a multi-valued property; an empty list removes the property
    pub fn set_property_values<I, V>(&self, name: &str, values: I) -> Result<Option<Property>>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            ensure_not_blank(name, "property name")?;
            self.remove_property(name);
            return Ok(None);
        }
        let property = Property::new_multiple(name, values)?;
        graph::attach_property(self, &property)?;
        Ok(Some(property))
    }

    /// Set a single-valued property, or remove it when `value` is `None`
    pub fn set_or_remove_property<V: Into<Value>>(
        &self,
        name: &str,
        value: Option<V>,
    ) -> Result<Option<Property>> {
        match value {
            Some(value) => self.set_property(name, value).map(Some),
            None => {
                ensure_not_blank(name, "property name")?;
                self.remove_property(name);
                Ok(None)
            }
        }
    }

    /// Attach an existing property, replacing one of the same name
    pub fn attach_property(&self, property: &Property) -> Result<()> {
        graph::attach_property(self, property)
    }

    /// Remove a property by name, returning it detached
    pub fn remove_property(&self, name: &str) -> Option<Property> {
        let property = self.property(name)?;
        graph::detach_property(&property);
        Some(property)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.is_same(other)
    }
}

impl Eq for Node {}

impl TryFrom<&Node> for Value {
    type Error = Error;

    fn try_from(node: &Node) -> Result<Self> {
        node.reference_value()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("path", &self.path())
            .field("primary_type", &self.primary_type())
            .field("identifier", &self.identifier())
            .finish()
    }
}
