//! Core types for jcrmock
//!
//! This crate defines the foundational types used by the content store:
//! - Value: immutable typed scalar with the JCR conversion matrix
//! - PropertyType: type discriminator with JCR codes and names
//! - Error: format and precondition errors
//! - path: helpers for deriving and resolving item paths
//! - RepositoryConfig: repository settings, loadable from TOML

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod path;
pub mod property_type;
pub mod value;

pub use config::{RepositoryConfig, CONFIG_FILE_NAME};
pub use error::{Error, Result};
pub use property_type::PropertyType;
pub use value::Value;
