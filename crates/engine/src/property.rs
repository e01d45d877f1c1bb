//! Property: a named, typed value (or ordered list of values) on a node
//!
//! ## Single vs multi-valued
//!
//! - [`Property::new`] builds a single-valued property from one value.
//! - [`Property::new_multiple`] always builds a multi-valued property, even
//!   when it is given exactly one value.
//!
//! Typed readers (`string`, `long`, ...) read the first value, so they work
//! on multi-valued properties too, but a genuinely incompatible conversion
//! still fails with a format error.
//!
//! A property never holds zero values: clearing the values removes the
//! property from its node.

use crate::graph;
use crate::node::Node;
use chrono::{DateTime, FixedOffset};
use jcrmock_core::error::{ensure, ensure_not_blank};
use jcrmock_core::{path, Error, PropertyType, Result, Value};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

pub(crate) struct PropertyData {
    name: String,
    values: Vec<Value>,
    multiple: bool,
    pub(crate) parent: Option<Node>,
}

/// Handle to a property
#[derive(Clone)]
pub struct Property {
    inner: Arc<RwLock<PropertyData>>,
}

impl Property {
    /// Create a detached single-valued property
    ///
    /// # Errors
    ///
    /// Returns a precondition error if the name is blank.
    pub fn new(name: &str, value: impl Into<Value>) -> Result<Self> {
        ensure_not_blank(name, "property name")?;
        Ok(Self::from_parts(name, vec![value.into()], false))
    }

    /// Create a detached multi-valued property
    ///
    /// # Errors
    ///
    /// Returns a precondition error if the name is blank, `values` is empty or
    /// the values do not share one type.
    pub fn new_multiple<I, V>(name: &str, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        ensure_not_blank(name, "property name")?;
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        check_values(name, &values)?;
        Ok(Self::from_parts(name, values, true))
    }

    fn from_parts(name: &str, values: Vec<Value>, multiple: bool) -> Self {
        Self {
            inner: Arc::new(RwLock::new(PropertyData {
                name: name.to_string(),
                values,
                multiple,
                parent: None,
            })),
        }
    }

    pub(crate) fn set_parent(&self, parent: Option<Node>) {
        self.inner.write().parent = parent;
    }

    /// Check if two handles point at the same property
    pub fn is_same(&self, other: &Property) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Property name
    pub fn name(&self) -> String {
        self.inner.read().name.clone()
    }

    /// Owning node, if attached
    pub fn parent(&self) -> Option<Node> {
        self.inner.read().parent.clone()
    }

    /// Path below the owning node (`/name` when detached)
    pub fn path(&self) -> String {
        let name = self.name();
        match self.parent() {
            Some(parent) => path::join(&parent.path(), &name),
            None => path::join(path::ROOT_PATH, &name),
        }
    }

    /// Node the first value refers to, resolved in the owning node's session
    ///
    /// Returns `Ok(None)` when the property is detached, its node is not in a
    /// session or no node carries the identifier.
    ///
    /// # Errors
    ///
    /// Returns a format error if the property is not a REFERENCE.
    pub fn node(&self) -> Result<Option<Node>> {
        let value = self.value();
        let Value::Reference(identifier) = &value else {
            return Err(Error::format(
                value.value_type(),
                "node",
                format!("property '{}' is not a reference", self.name()),
            ));
        };
        Ok(self
            .parent()
            .and_then(|parent| parent.session())
            .and_then(|session| session.node_by_identifier(identifier)))
    }

    /// Type of the stored values
    pub fn property_type(&self) -> PropertyType {
        self.inner.read().values[0].value_type()
    }

    /// Check if this is a multi-valued property
    pub fn is_multiple(&self) -> bool {
        self.inner.read().multiple
    }

    /// First value
    pub fn value(&self) -> Value {
        self.inner.read().values[0].clone()
    }

    /// All values in order
    pub fn values(&self) -> Vec<Value> {
        self.inner.read().values.clone()
    }

    // =========================================================================
    // Typed readers (first value)
    // =========================================================================

    /// First value as string
    pub fn string(&self) -> String {
        self.inner.read().values[0].as_string()
    }

    /// First value as boolean
    pub fn boolean(&self) -> Result<bool> {
        self.inner.read().values[0].as_boolean()
    }

    /// First value as long
    pub fn long(&self) -> Result<i64> {
        self.inner.read().values[0].as_long()
    }

    /// First value as double
    pub fn double(&self) -> Result<f64> {
        self.inner.read().values[0].as_double()
    }

    /// First value as date
    pub fn date(&self) -> Result<Option<DateTime<FixedOffset>>> {
        self.inner.read().values[0].as_date()
    }

    /// First value as bytes
    pub fn binary(&self) -> Vec<u8> {
        self.inner.read().values[0].as_binary()
    }

    /// Length of the first value
    pub fn length(&self) -> usize {
        self.inner.read().values[0].length()
    }

    /// Length of every value
    pub fn lengths(&self) -> Vec<usize> {
        self.inner.read().values.iter().map(Value::length).collect()
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Replace the value; `None` removes the property from its node
    ///
    /// A property set to `None` while detached keeps its previous value.
    pub fn set_value(&self, value: Option<Value>) {
        match value {
            Some(value) => {
                let mut data = self.inner.write();
                data.values = vec![value];
                data.multiple = false;
            }
            None => self.remove(),
        }
    }

    /// Replace all values; an empty list removes the property from its node
    pub fn set_values(&self, values: Vec<Value>) -> Result<()> {
        if values.is_empty() {
            self.remove();
            return Ok(());
        }
        check_values(&self.name(), &values)?;
        let mut data = self.inner.write();
        data.values = values;
        data.multiple = true;
        Ok(())
    }

    /// Detach this property from its node
    pub fn remove(&self) {
        graph::detach_property(self);
    }
}

fn check_values(name: &str, values: &[Value]) -> Result<()> {
    ensure(!values.is_empty(), || {
        format!("property '{name}' needs at least one value")
    })?;
    let first = values[0].value_type();
    ensure(values.iter().all(|v| v.value_type() == first), || {
        format!("values of property '{name}' must all be of type {first}")
    })
}

impl PartialEq for Property {
    fn eq(&self, other: &Self) -> bool {
        self.is_same(other)
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.inner.read();
        f.debug_struct("Property")
            .field("name", &data.name)
            .field("multiple", &data.multiple)
            .field("values", &data.values)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_valued() {
        let property = Property::new("title", "Hello").unwrap();
        assert!(!property.is_multiple());
        assert_eq!(property.property_type(), PropertyType::String);
        assert_eq!(property.string(), "Hello");
        assert_eq!(property.values().len(), 1);
        assert_eq!(property.path(), "/title");
    }

    #[test]
    fn test_multi_valued() {
        let property = Property::new_multiple("tags", ["value1", "value2", "value3"]).unwrap();
        assert!(property.is_multiple());
        assert_eq!(property.value(), Value::from("value1"));
        assert_eq!(property.values().len(), 3);
        assert_eq!(property.lengths(), vec![6, 6, 6]);
    }

    #[test]
    fn test_multiple_factory_with_one_value_is_multiple() {
        let property = Property::new_multiple("tags", ["only"]).unwrap();
        assert!(property.is_multiple());
    }

    #[test]
    fn test_multi_valued_reads_still_fail_on_bad_conversion() {
        let property = Property::new_multiple("flags", [true, false]).unwrap();
        assert!(property.boolean().unwrap());
        assert!(property.date().unwrap_err().is_format());
    }

    #[test]
    fn test_invalid_construction() {
        assert!(Property::new("", "x").unwrap_err().is_precondition());
        let empty: Vec<Value> = Vec::new();
        assert!(Property::new_multiple("p", empty).unwrap_err().is_precondition());
        let mixed = vec![Value::from("a"), Value::from(1i64)];
        assert!(Property::new_multiple("p", mixed).unwrap_err().is_precondition());
    }

    #[test]
    fn test_set_value_switches_to_single() {
        let property = Property::new_multiple("p", [1i64, 2]).unwrap();
        property.set_value(Some(Value::from(3i64)));
        assert!(!property.is_multiple());
        assert_eq!(property.long().unwrap(), 3);
    }

    #[test]
    fn test_set_value_none_removes_from_node() {
        let node = Node::new("n");
        let property = node.set_property("p", "v").unwrap();
        property.set_value(None);
        assert!(!node.has_property("p"));
        assert!(property.parent().is_none());
    }

    #[test]
    fn test_set_values_empty_removes_from_node() {
        let node = Node::new("n");
        let property = node.set_property("p", 1i64).unwrap();
        property.set_values(vec![Value::from(1i64), Value::from(2i64)]).unwrap();
        assert!(property.is_multiple());
        property.set_values(Vec::new()).unwrap();
        assert!(!node.has_property("p"));
    }

    #[test]
    fn test_typed_readers() {
        let node = Node::new("n");
        assert_eq!(node.set_property("l", 123456i64).unwrap().double().unwrap(), 123456.0);
        assert_eq!(node.set_property("d", 1.25).unwrap().long().unwrap(), 1);
        assert!(!node.set_property("s", "testString").unwrap().boolean().unwrap());
        assert_eq!(node.set_property("b", b"abc".to_vec()).unwrap().binary(), b"abc".to_vec());
    }

    #[test]
    fn test_reference_resolves_in_session() {
        let session = crate::Session::new("website", &jcrmock_core::RepositoryConfig::default());
        let root = session.root_node();
        let target = root.add_node("target").unwrap();
        target.set_identifier("target-id").unwrap();
        let page = root.add_node("page").unwrap();

        let link = page.set_property("link", target.reference_value().unwrap()).unwrap();
        assert_eq!(link.property_type(), PropertyType::Reference);
        assert_eq!(link.node().unwrap(), Some(target.clone()));

        target.remove().unwrap();
        assert_eq!(link.node().unwrap(), None);
    }

    #[test]
    fn test_reference_without_session_or_wrong_type() {
        let node = Node::new("n");
        let dangling = node.set_property("link", Value::reference("missing").unwrap()).unwrap();
        assert_eq!(dangling.node().unwrap(), None);

        let title = node.set_property("title", "Hello").unwrap();
        assert!(title.node().unwrap_err().is_format());
    }
}
