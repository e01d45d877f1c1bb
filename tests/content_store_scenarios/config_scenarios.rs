//! Tier 4: Configuration
//!
//! Repositories built from `jcrmock.toml`.

use jcrmock::{Error, Repository, RepositoryConfig};

#[test]
fn test_repository_from_toml() {
    let config = RepositoryConfig::from_toml_str(
        r#"
default_workspace = "config"
user_id = "superuser"
default_primary_type = "mgnl:content"
auto_identifiers = true
"#,
    )
    .unwrap();
    let repository = Repository::new(config).unwrap();
    let session = repository.login_default().unwrap();

    assert_eq!(session.workspace_name(), "config");
    assert_eq!(session.user_id(), "superuser");
    assert_eq!(session.root_node().primary_type(), "rep:root");

    let node = session.root_node().add_node("modules").unwrap();
    assert_eq!(node.primary_type(), "mgnl:content");
    let identifier = node.identifier().unwrap();
    assert_eq!(session.node_by_identifier(&identifier), Some(node));
}

#[test]
fn test_invalid_toml_is_config_error() {
    let err = RepositoryConfig::from_toml_str("user_id = ").unwrap_err();
    assert!(matches!(err, Error::Config(_)));

    let blank_toml = RepositoryConfig::from_toml_str("default_workspace = \" \"");
    assert!(matches!(blank_toml, Err(Error::Config(_))));

    let blank = RepositoryConfig {
        root_primary_type: String::new(),
        ..RepositoryConfig::default()
    };
    assert!(matches!(Repository::new(blank), Err(Error::Config(_))));
}
