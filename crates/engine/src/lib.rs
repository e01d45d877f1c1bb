//! In-memory content store for jcrmock
//!
//! This crate builds the synthetic repository on top of `jcrmock-core`:
//! - Node / Property: handles into the content tree
//! - graph: reparenting and index registration
//! - Session / Workspace: per-workspace root, path and identifier lookup
//! - Repository: session registry of one test context
//! - query: query results with node and row views, static query manager
//! - observation: listener registrations (never delivered)
//! - import: system-view XML into detached trees
//!
//! Everything lives in memory; nothing is persisted and nothing is pending.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod graph;
pub mod import;
mod index;
pub mod item;
pub mod node;
pub mod observation;
pub mod property;
pub mod query;
pub mod repository;
pub mod session;
pub mod workspace;

pub use graph::reparent;
pub use import::{import_system_view, import_system_view_into};
pub use item::Item;
pub use node::Node;
pub use observation::{Event, EventListener, ObservationManager, Registration};
pub use property::Property;
pub use query::{
    NodeIterator, Query, QueryManager, QueryResult, Row, RowIterator, StaticQueryManager,
};
pub use repository::Repository;
pub use session::Session;
pub use workspace::Workspace;
