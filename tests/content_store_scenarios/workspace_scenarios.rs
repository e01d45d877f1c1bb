//! Tier 3: Workspaces
//!
//! Sessions are cached per workspace until reset; each workspace has one
//! query manager slot and one listener list.

use crate::test_utils::*;
use jcrmock::query::JCR_SQL2;
use jcrmock::{QueryManager, QueryResult, StaticQueryManager, Value};
use std::sync::Arc;

#[test]
fn test_login_is_cached_until_reset() {
    let repository = create_test_repository();
    let first = repository.login("website").unwrap();
    first.root_node().add_node("page").unwrap();

    let second = repository.login("website").unwrap();
    assert!(first.is_same(&second));
    assert!(second.node_exists("/page"));

    repository.reset("website");
    let fresh = repository.login("website").unwrap();
    assert!(!fresh.node_exists("/page"));
    assert_eq!(fresh.root_node().nodes().len(), 0);
}

#[test]
fn test_query_results_as_nodes_and_rows() {
    let (_repository, session) = create_test_session();
    let pages = create_pages(&session, 3);
    for (i, page) in pages.iter().enumerate() {
        page.set_property("title", format!("Page {}", i + 1)).unwrap();
    }

    let statement = "SELECT * FROM [mgnl:page]";
    let manager = StaticQueryManager::new();
    manager
        .register(
            JCR_SQL2,
            statement,
            QueryResult::with_scores(pages.iter().cloned().zip([1.0, 0.5, 0.25])),
        )
        .unwrap();
    session.workspace().set_query_manager(Arc::new(manager));

    let result = session
        .workspace()
        .query_manager()
        .unwrap()
        .create_query(statement, JCR_SQL2)
        .unwrap()
        .execute()
        .unwrap();

    let once: Vec<String> = result.nodes().map(|n| n.path()).collect();
    let twice: Vec<String> = result.nodes().map(|n| n.path()).collect();
    assert_eq!(once, twice);
    assert_eq!(once.len(), 3);

    let rows: Vec<_> = result.rows().collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1].score(), 0.5);
    assert_eq!(rows[2].value("title"), Some(Value::from("Page 3")));
    assert_eq!(rows[0].value("jcr:path"), Some(Value::from("/content/page1")));
    assert_eq!(rows[0].node(), pages[0]);
}

#[test]
fn test_pending_changes_are_never_reported() {
    let (_repository, session) = create_test_session();
    session.root_node().add_node("page").unwrap();
    assert!(!session.has_pending_changes());
    session.save().unwrap();
    session.refresh(true).unwrap();
    assert!(session.node_exists("/page"));
}
