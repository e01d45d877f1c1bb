//! Content Store Scenarios
//!
//! End-to-end tests against the public `jcrmock` API.
//!
//! ## Test Tier Structure
//!
//! - **Tier 1: Coercion** (the JCR conversion matrix through properties)
//! - **Tier 2: Tree invariants** (paths, identifiers, reparenting)
//! - **Tier 3: Workspaces** (login, reset, query and listener slots)
//! - **Tier 4: Configuration** (TOML-driven repositories)
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test content_store_scenarios
//! ```

mod test_utils;

// Tier 1: Coercion
mod coercion_scenarios;

// Tier 2: Tree invariants
mod tree_invariants;

// Tier 3: Workspaces
mod workspace_scenarios;

// Tier 4: Configuration
mod config_scenarios;
