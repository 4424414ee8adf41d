//! Thread-safe facade over [`GraphStore`].
//!
//! [`GraphDatabase`] wraps one store in a single `parking_lot::RwLock`.
//! Mutations take the write lock; every query takes the read lock for its
//! whole duration, so a traversal never observes a half-applied mutation.
//!
//! Queries return owned values. Callers that need several reads against the
//! same snapshot use [`GraphDatabase::read`].

#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

use parking_lot::RwLock;
use tracing::instrument;

use crate::error::Result;
use crate::model::{GraphStats, Node, Path, Relationship, RelationshipType, TraversalResult};
use crate::pattern::Pattern;
use crate::store::{GraphStore, IndexViolation};

/// Shared, internally synchronized property graph.
#[derive(Debug, Default)]
pub struct GraphDatabase {
    inner: RwLock<GraphStore>,
}

impl From<GraphStore> for GraphDatabase {
    fn from(store: GraphStore) -> Self {
        Self {
            inner: RwLock::new(store),
        }
    }
}

impl GraphDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against a consistent snapshot under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&GraphStore) -> R) -> R {
        f(&self.inner.read())
    }

    /// Run `f` with exclusive access under the write lock.
    ///
    /// Readers never observe the store between two mutations made inside `f`.
    pub fn write<R>(&self, f: impl FnOnce(&mut GraphStore) -> R) -> R {
        f(&mut self.inner.write())
    }

    // -- mutations ----------------------------------------------------------

    pub fn add_node(&self, node: Node) -> Option<Node> {
        self.inner.write().add_node(node)
    }

    /// # Errors
    ///
    /// [`crate::GraphError::NodeNotFound`] if either endpoint is absent.
    pub fn add_relationship(&self, rel: Relationship) -> Result<Option<Relationship>> {
        self.inner.write().add_relationship(rel)
    }

    /// Delete a node and its incident relationships. Returns the number of
    /// relationships removed, or `None` if the node did not exist.
    pub fn delete_node(&self, id: &str) -> Option<usize> {
        self.inner.write().delete_node(id)
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    // -- lookups ------------------------------------------------------------

    pub fn get_node(&self, id: &str) -> Option<Node> {
        self.inner.read().get_node(id).cloned()
    }

    pub fn get_nodes_by_label(&self, label: &str) -> Vec<Node> {
        cloned(self.inner.read().get_nodes_by_label(label))
    }

    pub fn has_label(&self, id: &str, label: &str) -> bool {
        self.inner.read().has_label(id, label)
    }

    pub fn get_relationship(&self, id: &str) -> Option<Relationship> {
        self.inner.read().get_relationship(id).cloned()
    }

    pub fn get_outgoing_relationships(&self, node_id: &str) -> Vec<Relationship> {
        cloned(self.inner.read().get_outgoing_relationships(node_id))
    }

    pub fn get_incoming_relationships(&self, node_id: &str) -> Vec<Relationship> {
        cloned(self.inner.read().get_incoming_relationships(node_id))
    }

    pub fn get_relationships_by_type(&self, rel_type: &RelationshipType) -> Vec<Relationship> {
        cloned(self.inner.read().get_relationships_by_type(rel_type))
    }

    pub fn get_neighbors(&self, node_id: &str) -> Vec<Node> {
        cloned(self.inner.read().get_neighbors(node_id))
    }

    pub fn get_all_nodes(&self) -> Vec<Node> {
        cloned(self.inner.read().get_all_nodes())
    }

    pub fn get_all_relationships(&self) -> Vec<Relationship> {
        cloned(self.inner.read().get_all_relationships())
    }

    pub fn node_count(&self) -> usize {
        self.inner.read().node_count()
    }

    pub fn relationship_count(&self) -> usize {
        self.inner.read().relationship_count()
    }

    pub fn labels(&self) -> Vec<String> {
        self.inner
            .read()
            .labels()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn stats(&self) -> GraphStats {
        self.inner.read().stats()
    }

    // -- queries ------------------------------------------------------------

    /// # Errors
    ///
    /// See [`GraphStore::find_path`].
    #[instrument(skip(self), level = "debug")]
    pub fn find_path(&self, start: &str, end: &str) -> Result<Path> {
        self.inner.read().find_path(start, end)
    }

    #[instrument(skip(self), level = "debug")]
    pub fn find_impact_radius(&self, start: &str, max_depth: usize) -> TraversalResult {
        self.inner.read().find_impact_radius(start, max_depth)
    }

    #[instrument(skip(self), level = "debug")]
    pub fn find_dependencies(&self, node_id: &str, max_depth: usize) -> Vec<Node> {
        self.inner.read().find_dependencies(node_id, max_depth)
    }

    #[instrument(skip(self), level = "debug")]
    pub fn find_dependents(&self, node_id: &str, max_depth: usize) -> Vec<Node> {
        self.inner.read().find_dependents(node_id, max_depth)
    }

    pub fn direct_dependent_count(&self, node_id: &str) -> usize {
        self.inner.read().direct_dependent_count(node_id)
    }

    #[instrument(skip(self), level = "debug")]
    pub fn find_critical_paths(&self, min_dependents: usize) -> Vec<Node> {
        self.inner.read().find_critical_paths(min_dependents)
    }

    #[instrument(skip(self), level = "debug")]
    pub fn critical_nodes_ranked(&self, min_dependents: usize) -> Vec<(Node, usize)> {
        self.inner.read().critical_nodes_ranked(min_dependents)
    }

    #[instrument(skip(self), level = "debug")]
    pub fn match_pattern(&self, pattern: &Pattern) -> Vec<(Node, Node)> {
        self.inner.read().match_pattern(pattern)
    }

    pub fn to_dot(&self) -> String {
        self.inner.read().to_dot()
    }

    pub fn content_hash(&self) -> String {
        self.inner.read().content_hash()
    }

    /// # Errors
    ///
    /// Returns the first [`IndexViolation`] found.
    pub fn verify_indexes(&self) -> std::result::Result<(), IndexViolation> {
        self.inner.read().verify_indexes()
    }
}

fn cloned<T: Clone>(items: Vec<&T>) -> Vec<T> {
    items.into_iter().cloned().collect()
}
