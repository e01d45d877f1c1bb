//! Error types for the content repository
//!
//! The store raises exactly two kinds of errors:
//! - `Format`: a value cannot be represented in the requested type
//! - `Precondition`: a public operation was called with an invalid argument
//!
//! `Config` is reserved for loading a [`RepositoryConfig`](crate::RepositoryConfig)
//! and `Import` for reading system-view documents; neither is produced by the
//! store itself.
//!
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use crate::property_type::PropertyType;
use thiserror::Error;

/// Result type alias for repository operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the content repository
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A value cannot be converted to the requested representation
    #[error("Cannot convert {value_type} value to {target}: {reason}")]
    Format {
        /// Declared type of the stored value
        value_type: PropertyType,
        /// Requested representation ("long", "date", ...)
        target: &'static str,
        /// Human readable cause
        reason: String,
    },

    /// Invalid argument passed to a public operation
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Configuration could not be read, parsed or validated
    #[error("Configuration error: {0}")]
    Config(String),

    /// A system-view document is malformed
    #[error("Import error: {0}")]
    Import(String),
}

impl Error {
    /// Build a format error
    pub fn format(
        value_type: PropertyType,
        target: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Error::Format {
            value_type,
            target,
            reason: reason.into(),
        }
    }

    /// Build a precondition error
    pub fn precondition(message: impl Into<String>) -> Self {
        Error::Precondition(message.into())
    }

    /// Build a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Build an import error
    pub fn import(message: impl Into<String>) -> Self {
        Error::Import(message.into())
    }

    /// Check if this is a format error
    pub fn is_format(&self) -> bool {
        matches!(self, Error::Format { .. })
    }

    /// Check if this is a precondition error
    pub fn is_precondition(&self) -> bool {
        matches!(self, Error::Precondition(_))
    }
}

/// Fail with a precondition error unless `condition` holds
pub fn ensure(condition: bool, message: impl FnOnce() -> String) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(Error::Precondition(message()))
    }
}

/// Fail with a precondition error if `value` is empty or whitespace
pub fn ensure_not_blank(value: &str, what: &str) -> Result<()> {
    ensure(!value.trim().is_empty(), || format!("{what} must not be blank"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_format() {
        let err = Error::format(PropertyType::Boolean, "date", "not a date");
        let msg = err.to_string();
        assert!(msg.contains("Boolean"));
        assert!(msg.contains("date"));
        assert!(msg.contains("not a date"));
    }

    #[test]
    fn test_error_display_precondition() {
        let err = Error::precondition("node cannot be its own parent");
        assert!(err.to_string().contains("Precondition failed"));
        assert!(err.to_string().contains("own parent"));
    }

    #[test]
    fn test_error_predicates() {
        assert!(Error::format(PropertyType::Long, "boolean", "x").is_format());
        assert!(!Error::format(PropertyType::Long, "boolean", "x").is_precondition());
        assert!(Error::precondition("x").is_precondition());
        assert!(!Error::config("x").is_format());
        assert!(!Error::import("x").is_precondition());
        assert!(Error::import("bad tag").to_string().contains("bad tag"));
    }

    #[test]
    fn test_ensure_not_blank() {
        assert!(ensure_not_blank("id-1", "identifier").is_ok());
        let err = ensure_not_blank("  ", "identifier").unwrap_err();
        assert_eq!(err, Error::Precondition("identifier must not be blank".to_string()));
    }

    #[test]
    fn test_error_pattern_matching() {
        let err = Error::format(PropertyType::String, "long", "invalid digit");
        match err {
            Error::Format {
                value_type, target, ..
            } => {
                assert_eq!(value_type, PropertyType::String);
                assert_eq!(target, "long");
            }
            _ => panic!("Wrong error variant"),
        }
    }
}
