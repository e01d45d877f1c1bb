//! Per-session lookup indexes
//!
//! - identifier → node
//! - absolute path → item (node or property)
//!
//! Entries are computed outside the index lock (see [`IndexEntry`]) and
//! applied in one batch, so no node or property lock is ever taken while the
//! index is locked.

use crate::item::Item;
use crate::node::Node;
use std::collections::HashMap;
use tracing::trace;

/// One item of a subtree, captured together with its current path
#[derive(Debug, Clone)]
pub(crate) struct IndexEntry {
    pub(crate) path: String,
    pub(crate) item: Item,
    pub(crate) identifier: Option<String>,
}

#[derive(Debug, Default)]
pub(crate) struct ItemIndex {
    by_identifier: HashMap<String, Node>,
    by_path: HashMap<String, Item>,
}

impl ItemIndex {
    pub(crate) fn item(&self, path: &str) -> Option<Item> {
        self.by_path.get(path).cloned()
    }

    pub(crate) fn node_by_identifier(&self, identifier: &str) -> Option<Node> {
        self.by_identifier.get(identifier).cloned()
    }

    /// Node already holding `identifier`, unless it is one of `allowed`
    pub(crate) fn identifier_owner(&self, identifier: &str, allowed: &[Node]) -> Option<Node> {
        self.by_identifier
            .get(identifier)
            .filter(|owner| !allowed.iter().any(|n| n.is_same(owner)))
            .cloned()
    }

    /// Drop entries that still point at the captured items
    ///
    /// An entry that was meanwhile taken over by another item is left alone.
    pub(crate) fn remove_entries(&mut self, entries: &[IndexEntry]) {
        for entry in entries {
            if self
                .by_path
                .get(&entry.path)
                .is_some_and(|current| *current == entry.item)
            {
                trace!(target: "jcrmock::index", path = %entry.path, "Path unregistered");
                self.by_path.remove(&entry.path);
            }
            if let (Some(id), Item::Node(node)) = (&entry.identifier, &entry.item) {
                if self.by_identifier.get(id).is_some_and(|n| n.is_same(node)) {
                    self.by_identifier.remove(id);
                }
            }
        }
    }

    pub(crate) fn insert_entries(&mut self, entries: &[IndexEntry]) {
        for entry in entries {
            trace!(target: "jcrmock::index", path = %entry.path, "Path registered");
            self.by_path.insert(entry.path.clone(), entry.item.clone());
            if let (Some(id), Item::Node(node)) = (&entry.identifier, &entry.item) {
                self.by_identifier.insert(id.clone(), node.clone());
            }
        }
    }

    /// Swap the identifier of `node` from `old` to `new`
    pub(crate) fn replace_identifier(&mut self, node: &Node, old: Option<&str>, new: &str) {
        if let Some(old) = old.filter(|old| *old != new) {
            if self.by_identifier.get(old).is_some_and(|n| n.is_same(node)) {
                self.by_identifier.remove(old);
            }
        }
        self.by_identifier.insert(new.to_string(), node.clone());
    }

    pub(crate) fn clear(&mut self) {
        self.by_identifier.clear();
        self.by_path.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.by_path.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::Property;

    fn entry(path: &str, node: &Node, identifier: Option<&str>) -> IndexEntry {
        IndexEntry {
            path: path.to_string(),
            item: Item::Node(node.clone()),
            identifier: identifier.map(str::to_string),
        }
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut index = ItemIndex::default();
        let node = Node::new("a");
        index.insert_entries(&[entry("/a", &node, Some("id-a"))]);
        assert_eq!(index.item("/a"), Some(Item::Node(node.clone())));
        assert_eq!(index.node_by_identifier("id-a"), Some(node));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_remove_skips_entries_taken_over() {
        let mut index = ItemIndex::default();
        let old = Node::new("a");
        let new = Node::new("a");
        index.insert_entries(&[entry("/a", &old, None)]);
        index.insert_entries(&[entry("/a", &new, None)]);
        index.remove_entries(&[entry("/a", &old, None)]);
        assert_eq!(index.item("/a"), Some(Item::Node(new)));
    }

    #[test]
    fn test_replace_identifier() {
        let mut index = ItemIndex::default();
        let node = Node::new("a");
        index.replace_identifier(&node, None, "id-1");
        index.replace_identifier(&node, Some("id-1"), "id-2");
        assert!(index.node_by_identifier("id-1").is_none());
        assert_eq!(index.node_by_identifier("id-2"), Some(node));
    }

    #[test]
    fn test_identifier_owner() {
        let mut index = ItemIndex::default();
        let a = Node::new("a");
        let b = Node::new("b");
        index.insert_entries(&[entry("/a", &a, Some("id"))]);
        assert_eq!(index.identifier_owner("id", &[b.clone()]), Some(a.clone()));
        assert_eq!(index.identifier_owner("id", &[a]), None);
    }

    #[test]
    fn test_property_entries_and_clear() {
        let mut index = ItemIndex::default();
        let property = Property::new("p", "v").unwrap();
        index.insert_entries(&[IndexEntry {
            path: "/p".to_string(),
            item: Item::Property(property.clone()),
            identifier: None,
        }]);
        assert_eq!(index.item("/p"), Some(Item::Property(property)));
        index.clear();
        assert_eq!(index.len(), 0);
    }
}
