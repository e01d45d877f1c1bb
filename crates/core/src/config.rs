//! Repository configuration via `jcrmock.toml`
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working repository. Tests usually build the config in code and only reach
//! for a file when several suites share one fixture setup.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Conventional config file name.
pub const CONFIG_FILE_NAME: &str = "jcrmock.toml";

/// Repository configuration loaded from `jcrmock.toml`.
///
/// # Example
///
/// ```toml
/// default_workspace = "website"
/// user_id = "admin"
/// auto_identifiers = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Workspace opened by `Repository::login_default`.
    #[serde(default = "default_workspace")]
    pub default_workspace: String,
    /// User id reported by every session.
    #[serde(default = "default_user_id")]
    pub user_id: String,
    /// Primary type of each workspace root node.
    #[serde(default = "default_root_primary_type")]
    pub root_primary_type: String,
    /// Primary type given to nodes created without an explicit type.
    #[serde(default = "default_primary_type")]
    pub default_primary_type: String,
    /// Assign a random UUID to nodes attached to a session without an identifier.
    #[serde(default)]
    pub auto_identifiers: bool,
}

fn default_workspace() -> String {
    "website".to_string()
}

fn default_user_id() -> String {
    "admin".to_string()
}

fn default_root_primary_type() -> String {
    "rep:root".to_string()
}

fn default_primary_type() -> String {
    "nt:unstructured".to_string()
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            default_workspace: default_workspace(),
            user_id: default_user_id(),
            root_primary_type: default_root_primary_type(),
            default_primary_type: default_primary_type(),
            auto_identifiers: false,
        }
    }
}

impl RepositoryConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# jcrmock repository configuration
#
# Workspace opened by login_default()
default_workspace = "website"

# User id reported by sessions
user_id = "admin"

# Primary type of workspace root nodes
root_primary_type = "rep:root"

# Primary type of nodes created without an explicit type
default_primary_type = "nt:unstructured"

# Assign a random UUID to every node attached without an identifier
auto_identifiers = false
"#
    }

    /// Parse and validate config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns a config error if the text is not valid TOML or fails validation.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: RepositoryConfig = toml::from_str(content)
            .map_err(|e| Error::config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Check that every name in the config is usable.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("default_workspace", &self.default_workspace),
            ("user_id", &self.user_id),
            ("root_primary_type", &self.root_primary_type),
            ("default_primary_type", &self.default_primary_type),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(Error::config(format!("'{field}' must not be blank")));
            }
        }
        Ok(())
    }
}
