//! jcrmock - In-memory hierarchical content repository for unit tests
//!
//! jcrmock stands in for a JCR-style content repository: a tree of named,
//! typed nodes and properties with path and identifier lookup, JCR value
//! coercion, and query results that read as both nodes and rows.
//!
//! # Quick Start
//!
//! ```
//! use jcrmock::{Repository, Value};
//!
//! let repository = Repository::default();
//! let session = repository.login("website")?;
//!
//! let node = session.root_node().add_node("testNode")?;
//! node.set_property("double", 1.25)?;
//!
//! let property = session.property("/testNode/double").expect("registered");
//! assert_eq!(property.long()?, 1);
//! assert_eq!(property.value(), Value::from(1.25));
//! # Ok::<(), jcrmock::Error>(())
//! ```
//!
//! # Architecture
//!
//! - `jcrmock-core`: values, the coercion matrix, errors, paths and config
//! - `jcrmock-engine`: the content tree, sessions, the repository registry,
//!   query results, observation and system-view import
//!
//! Everything is re-exported here; tests only need this crate.

pub use jcrmock_core::path;
pub use jcrmock_core::{Error, PropertyType, RepositoryConfig, Result, Value, CONFIG_FILE_NAME};
pub use jcrmock_engine::observation;
pub use jcrmock_engine::query;
pub use jcrmock_engine::{
    import_system_view, import_system_view_into, reparent, Event, EventListener, Item, Node,
    NodeIterator, ObservationManager, Property, Query, QueryManager, QueryResult, Registration,
    Repository, Row, RowIterator, Session, StaticQueryManager, Workspace,
};
