//! Item: either a node or a property, as returned by path lookups

use crate::node::Node;
use crate::property::Property;

/// Node or property stored in the path index
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// A node
    Node(Node),
    /// A property
    Property(Property),
}

impl Item {
    /// Check if this item is a node
    pub fn is_node(&self) -> bool {
        matches!(self, Item::Node(_))
    }

    /// Item name
    pub fn name(&self) -> String {
        match self {
            Item::Node(node) => node.name(),
            Item::Property(property) => property.name(),
        }
    }

    /// Absolute path derived from the tree
    pub fn path(&self) -> String {
        match self {
            Item::Node(node) => node.path(),
            Item::Property(property) => property.path(),
        }
    }

    /// Parent node (`None` for roots and detached items)
    pub fn parent(&self) -> Option<Node> {
        match self {
            Item::Node(node) => node.parent(),
            Item::Property(property) => property.parent(),
        }
    }

    /// The node, if this item is one
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Item::Node(node) => Some(node),
            Item::Property(_) => None,
        }
    }

    /// The property, if this item is one
    pub fn as_property(&self) -> Option<&Property> {
        match self {
            Item::Node(_) => None,
            Item::Property(property) => Some(property),
        }
    }

    /// Convert into a node
    pub fn into_node(self) -> Option<Node> {
        match self {
            Item::Node(node) => Some(node),
            Item::Property(_) => None,
        }
    }

    /// Convert into a property
    pub fn into_property(self) -> Option<Property> {
        match self {
            Item::Node(_) => None,
            Item::Property(property) => Some(property),
        }
    }
}

impl From<Node> for Item {
    fn from(node: Node) -> Self {
        Item::Node(node)
    }
}

impl From<Property> for Item {
    fn from(property: Property) -> Self {
        Item::Property(property)
    }
}
