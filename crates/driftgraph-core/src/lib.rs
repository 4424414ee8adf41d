#![forbid(unsafe_code)]
//! driftgraph-core library.
//!
//! An in-memory property graph used to correlate cloud resources, Terraform
//! state and detected drift. Nodes carry labels and JSON properties;
//! relationships are directed and typed.
//!
//! - [`GraphStore`]: tables plus label, adjacency and type indexes.
//! - [`GraphDatabase`]: the same store behind one read-write lock.
//! - Traversal: `find_path`, `find_impact_radius` (undirected, see
//!   [`traversal`]).
//! - Dependency closure: `find_dependencies`, `find_dependents`,
//!   `find_critical_paths` (directed `DEPENDS_ON`, see [`dependency`]).
//! - Pattern matching: one-hop [`Pattern`] queries.
//!
//! # Conventions
//!
//! - **Errors**: [`GraphError`] for graph operations; `anyhow::Result` for
//!   config loading.
//! - **Logging**: `tracing` macros. Mutations log at `debug`/`trace`, queries
//!   on [`GraphDatabase`] open a `debug` span. Returned errors are not logged
//!   here.

pub mod config;
pub mod database;
pub mod dependency;
pub mod error;
pub mod export;
pub mod model;
pub mod pattern;
pub mod store;
pub mod traversal;

pub use database::GraphDatabase;
pub use error::{ErrorCode, GraphError};
pub use export::ExportedGraph;
pub use model::{
    GraphStats, Node, Path, Properties, Relationship, RelationshipType, TraversalResult,
};
pub use pattern::{FilterParseError, Pattern, parse_filter};
pub use store::{GraphStore, IndexViolation};
