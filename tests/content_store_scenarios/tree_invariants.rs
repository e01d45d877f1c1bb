//! Tier 2: Tree invariants
//!
//! - path(n) == join(path(parent(n)), name(n)) after any reparent
//! - a node is never its own ancestor
//! - only the newest identifier of a node resolves

use crate::test_utils::*;
use jcrmock::{path, reparent, Item};
use proptest::prelude::*;

#[test]
fn test_identifier_change_scenario() {
    let (_repository, session) = create_test_session();
    let node = session.root_node().add_node("n").unwrap();
    node.set_identifier("id-1").unwrap();
    node.set_identifier("id-2").unwrap();
    assert!(session.node_by_identifier("id-1").is_none());
    assert_eq!(session.node_by_identifier("id-2"), Some(node));
}

#[test]
fn test_ancestors_and_depth() {
    let (_repository, session) = create_test_session();
    let pages = create_pages(&session, 1);
    let section = pages[0].add_node("main").unwrap();
    let paragraph = section.add_node("0").unwrap();

    assert_eq!(paragraph.path(), "/content/page1/main/0");
    assert_eq!(paragraph.depth(), 4);
    assert_eq!(paragraph.ancestor(0), Some(session.root_node()));
    assert_eq!(paragraph.ancestor(2), Some(pages[0].clone()));
    assert_eq!(paragraph.ancestor(4), Some(paragraph.clone()));
    assert_eq!(paragraph.node("../../.."), session.node("/content"));
    assert_eq!(paragraph.node("/content/page1"), Some(pages[0].clone()));
}

#[test]
fn test_self_parenting_and_cycles_rejected() {
    let (_repository, session) = create_test_session();
    let pages = create_pages(&session, 1);
    let child = pages[0].add_node("child").unwrap();

    assert!(reparent(&pages[0], &pages[0]).unwrap_err().is_precondition());
    assert!(reparent(&pages[0], &child).unwrap_err().is_precondition());
    assert_eq!(child.path(), "/content/page1/child");
}

#[test]
fn test_items_by_path() {
    let (_repository, session) = create_test_session();
    let pages = create_pages(&session, 1);
    pages[0].set_property("title", "Home").unwrap();

    match session.item("/content/page1/title") {
        Some(Item::Property(property)) => assert_eq!(property.string(), "Home"),
        other => panic!("expected a property, got {other:?}"),
    }
    assert!(session.item("/content/page1").unwrap().is_node());
    assert_eq!(session.item("/content/page1/title").unwrap().parent(), Some(pages[0].clone()));
}

/// One random operation on a fixed set of nodes
#[derive(Debug, Clone)]
enum Op {
    Move(usize, usize),
    Rename(usize, u8),
    MoveToRoot(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..8, 0usize..8).prop_map(|(c, p)| Op::Move(c, p)),
        (0usize..8, any::<u8>()).prop_map(|(n, s)| Op::Rename(n, s)),
        (0usize..8).prop_map(Op::MoveToRoot),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_path_invariant_holds(ops in prop::collection::vec(op_strategy(), 0..50)) {
        let (_repository, session) = create_test_session();
        let root = session.root_node();
        let nodes: Vec<Node> = (0..8)
            .map(|i| root.add_node(&format!("node{i}")).unwrap())
            .collect();
        for (i, node) in nodes.iter().enumerate() {
            node.set_property("index", i as i64).unwrap();
        }

        for op in ops {
            // Failed operations (cycles, name clashes) must be no-ops.
            let _ = match op {
                Op::Move(child, parent) => reparent(&nodes[child], &nodes[parent]),
                Op::Rename(node, suffix) => nodes[node].rename(&format!("r{suffix}")),
                Op::MoveToRoot(node) => nodes[node].move_to(&root),
            };
        }

        for node in &nodes {
            let parent = node.parent().unwrap();
            let expected = path::join(&parent.path(), &node.name());
            prop_assert_eq!(node.path(), expected.clone());
            prop_assert_eq!(session.node(&expected), Some(node.clone()));
            prop_assert!(session.property_exists(&path::join(&expected, "index")));
            prop_assert!(!node.is_descendant_of(node));
        }
        // root + nodes + one property each
        prop_assert_eq!(session.item_count(), 1 + 2 * nodes.len());
    }
}
