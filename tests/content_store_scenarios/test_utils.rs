//! Test utilities for the content store scenarios
//!
//! Provides helpers for building repositories and populated trees.

pub use jcrmock::{Node, Repository, Session};

/// Repository with the default configuration
pub fn create_test_repository() -> Repository {
    Repository::default()
}

/// Session on the default workspace of a fresh repository
pub fn create_test_session() -> (Repository, Session) {
    let repository = create_test_repository();
    let session = repository
        .login_default()
        .expect("Failed to log into default workspace");
    (repository, session)
}

/// Install a tracing subscriber once so `RUST_LOG`-style output shows up
/// when a scenario is run with `--nocapture`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_target(true)
        .try_init();
}

/// `/content/page{i}` for `i` in `1..=count`
pub fn create_pages(session: &Session, count: usize) -> Vec<Node> {
    let content = session
        .root_node()
        .add_node("content")
        .expect("Failed to add /content");
    (1..=count)
        .map(|i| {
            content
                .add_node_with_type(&format!("page{i}"), "mgnl:page")
                .expect("Failed to add page")
        })
        .collect()
}
