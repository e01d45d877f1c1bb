//! Tier 1: Coercion through the node API
//!
//! Conversions are computed on read; the stored type never changes.

use crate::test_utils::*;
use chrono::{DateTime, TimeZone, Utc};
use jcrmock::{PropertyType, Value};
use proptest::prelude::*;

#[test]
fn test_node_scenario() {
    init_tracing();
    let (_repository, session) = create_test_session();
    let node = session.root_node().add_node("testNode").unwrap();
    node.set_property("string", "testString").unwrap();
    node.set_property("boolean", true).unwrap();
    node.set_property("double", 1.25).unwrap();
    node.set_property("long", 123456i64).unwrap();

    let node = session.node("/testNode").unwrap();
    assert!(!node.property("string").unwrap().boolean().unwrap());
    assert_eq!(node.property("double").unwrap().long().unwrap(), 1);
    assert_eq!(node.property("long").unwrap().double().unwrap(), 123456.0);
    assert!(node.property("boolean").unwrap().date().unwrap_err().is_format());

    assert_eq!(node.property("string").unwrap().property_type(), PropertyType::String);
    assert_eq!(node.property("double").unwrap().string(), "1.25");
    assert_eq!(node.property("long").unwrap().string(), "123456");
    assert_eq!(node.property("boolean").unwrap().string(), "true");
}

#[test]
fn test_set_then_get_string() {
    let (_repository, session) = create_test_session();
    let node = session.root_node().add_node("n").unwrap();
    node.set_property("x", "v").unwrap();
    assert_eq!(node.property("x").unwrap().string(), "v");
    assert_eq!(session.property("/n/x").unwrap().string(), "v");
}

#[test]
fn test_multi_valued_scenario() {
    let (_repository, session) = create_test_session();
    let node = session.root_node().add_node("n").unwrap();
    let property = node
        .set_property_values("tags", ["value1", "value2", "value3"])
        .unwrap()
        .unwrap();
    assert!(property.is_multiple());
    assert_eq!(property.string(), "value1");
    assert_eq!(property.values().len(), 3);
}

#[test]
fn test_dates() {
    let (_repository, session) = create_test_session();
    let node = session.root_node().add_node("n").unwrap();
    let date: DateTime<Utc> = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    let property = node.set_property("created", date).unwrap();

    assert_eq!(property.string(), "2024-01-02T03:04:05.000Z");
    assert_eq!(property.long().unwrap(), date.timestamp_millis());
    assert!(property.boolean().unwrap_err().is_format());

    let from_long = node.set_property("stamp", date.timestamp_millis()).unwrap();
    assert_eq!(from_long.date().unwrap().unwrap(), date.fixed_offset());
}

#[test]
fn test_default_values_never_fail() {
    assert_eq!(Value::default_for(PropertyType::String).as_string(), "");
    assert!(!Value::default_for(PropertyType::Boolean).as_boolean().unwrap());
    assert_eq!(Value::default_for(PropertyType::Long).as_long().unwrap(), 0);
    assert_eq!(Value::default_for(PropertyType::Double).as_double().unwrap(), 0.0);
    assert_eq!(Value::default_for(PropertyType::Date).as_date().unwrap(), None);
    assert_eq!(Value::default_for(PropertyType::Date).as_long().unwrap(), 0);
    assert!(Value::default_for(PropertyType::Binary).as_binary().is_empty());

    assert_eq!(Value::from("").as_long().unwrap(), 0);
    assert_eq!(Value::from("  ").as_double().unwrap(), 0.0);
    assert_eq!(Value::from("").as_date().unwrap(), None);
}

#[test]
fn test_binary_leniency() {
    assert_eq!(Value::from(b"42".to_vec()).as_long().unwrap(), 42);
    assert_eq!(Value::from(b"not a number".to_vec()).as_long().unwrap(), 0);
    assert!(Value::from("not a number").as_long().unwrap_err().is_format());
}

proptest! {
    #[test]
    fn prop_long_string_roundtrip_through_property(n in any::<i64>()) {
        let node = Node::new("n");
        let property = node.set_property("value", n.to_string()).unwrap();
        prop_assert_eq!(property.long().unwrap(), n);
        prop_assert_eq!(property.property_type(), PropertyType::String);
    }

    #[test]
    fn prop_double_to_long_truncates(d in -1.0e12f64..1.0e12) {
        let node = Node::new("n");
        let property = node.set_property("value", d).unwrap();
        prop_assert_eq!(property.long().unwrap(), d.trunc() as i64);
    }
}
