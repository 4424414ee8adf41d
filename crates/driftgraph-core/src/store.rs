//! Node/relationship tables and the indexes derived from them.
//!
//! # Overview
//!
//! [`GraphStore`] owns two primary tables and four derived indexes:
//!
//! | table / index            | key               | value                       |
//! |--------------------------|-------------------|-----------------------------|
//! | `nodes`                  | node id           | [`Node`]                    |
//! | `relationships`          | relationship id   | [`Relationship`]            |
//! | `nodes_by_label`         | label             | set of node ids             |
//! | `outgoing`               | node id           | set of relationship ids     |
//! | `incoming`               | node id           | set of relationship ids     |
//! | `relationships_by_type`  | relationship type | set of relationship ids     |
//!
//! Indexes hold ids only and are resolved back through the primary tables
//! on read. Every mutation keeps them in exact correspondence with the
//! tables; [`GraphStore::verify_indexes`] checks that correspondence and is
//! what the property tests run after every operation.
//!
//! Index sets are ordered, so every traversal over them visits neighbours in
//! id order and query results are reproducible.
//!
//! `GraphStore` itself is not synchronized. Shared access goes through
//! [`crate::GraphDatabase`], which wraps one store in a single read-write
//! lock.

#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, trace};

use crate::error::{GraphError, Result};
use crate::model::{GraphStats, Node, Relationship, RelationshipType};

/// An index entry that disagrees with the primary tables.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("index inconsistency: {0}")]
pub struct IndexViolation(pub String);

// ---------------------------------------------------------------------------
// GraphStore
// ---------------------------------------------------------------------------

/// Unsynchronized property graph: primary tables plus derived indexes.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    nodes: HashMap<String, Node>,
    relationships: HashMap<String, Relationship>,
    nodes_by_label: HashMap<String, BTreeSet<String>>,
    outgoing: HashMap<String, BTreeSet<String>>,
    incoming: HashMap<String, BTreeSet<String>>,
    relationships_by_type: HashMap<RelationshipType, BTreeSet<String>>,
}

impl GraphStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Nodes
    // -----------------------------------------------------------------------

    /// Insert `node`, replacing any node with the same id.
    ///
    /// On replacement the id is dropped from label buckets the new label set
    /// no longer contains, so label lookups always reflect the current labels.
    /// Relationships attached to the id are kept. Returns the replaced node.
    pub fn add_node(&mut self, node: Node) -> Option<Node> {
        let id = node.id.clone();
        let previous = self.nodes.remove(&id);

        if let Some(old) = &previous {
            let dropped: Vec<&String> = old.labels.difference(&node.labels).collect();
            if !dropped.is_empty() {
                debug!(node_id = %id, dropped = dropped.len(), "node replaced with fewer labels");
            }
            for label in dropped {
                self.unindex_label(label, &id);
            }
        }

        for label in &node.labels {
            self.nodes_by_label
                .entry(label.clone())
                .or_default()
                .insert(id.clone());
        }
        self.outgoing.entry(id.clone()).or_default();
        self.incoming.entry(id.clone()).or_default();

        trace!(node_id = %id, replaced = previous.is_some(), "node added");
        self.nodes.insert(id, node);
        previous
    }

    /// Look up a node by id.
    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Return `true` if a node with `id` exists.
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// All nodes currently holding `label`, in id order.
    pub fn get_nodes_by_label(&self, label: &str) -> Vec<&Node> {
        self.nodes_by_label
            .get(label)
            .map(|ids| self.resolve_nodes(ids))
            .unwrap_or_default()
    }

    /// Number of nodes holding `label`, without resolving them.
    pub fn label_cardinality(&self, label: &str) -> usize {
        self.nodes_by_label.get(label).map_or(0, BTreeSet::len)
    }

    /// Return `true` if the node exists and holds `label`.
    pub fn has_label(&self, id: &str, label: &str) -> bool {
        self.nodes_by_label
            .get(label)
            .is_some_and(|ids| ids.contains(id))
    }

    /// Remove a node and every relationship that starts or ends at it.
    ///
    /// Returns `None` if the id is unknown, otherwise the number of
    /// relationships removed by the cascade.
    pub fn delete_node(&mut self, id: &str) -> Option<usize> {
        let node = self.nodes.remove(id)?;

        for label in &node.labels {
            self.unindex_label(label, id);
        }

        let outgoing = self.outgoing.remove(id).unwrap_or_default();
        let incoming = self.incoming.remove(id).unwrap_or_default();
        // A self-loop sits in both sets; the union visits it once.
        let incident: BTreeSet<String> = outgoing.union(&incoming).cloned().collect();

        let mut removed = 0;
        for rel_id in &incident {
            if let Some(rel) = self.relationships.remove(rel_id) {
                self.unlink(&rel);
                removed += 1;
            }
        }

        debug!(node_id = %id, cascaded = removed, "node deleted");
        Some(removed)
    }

    // -----------------------------------------------------------------------
    // Relationships
    // -----------------------------------------------------------------------

    /// Insert `rel`, which must connect two existing nodes.
    ///
    /// Re-adding an existing relationship id replaces it; the previous
    /// version is unlinked from every index first. Returns the replaced
    /// relationship.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] naming the first missing
    /// endpoint; nothing is stored in that case.
    pub fn add_relationship(&mut self, rel: Relationship) -> Result<Option<Relationship>> {
        for endpoint in [&rel.start_node, &rel.end_node] {
            if !self.nodes.contains_key(endpoint.as_str()) {
                return Err(GraphError::node_not_found(endpoint));
            }
        }

        let previous = self.relationships.remove(&rel.id);
        if let Some(old) = &previous {
            self.unlink(old);
        }

        self.outgoing
            .entry(rel.start_node.clone())
            .or_default()
            .insert(rel.id.clone());
        self.incoming
            .entry(rel.end_node.clone())
            .or_default()
            .insert(rel.id.clone());
        self.relationships_by_type
            .entry(rel.rel_type.clone())
            .or_default()
            .insert(rel.id.clone());

        trace!(
            rel_id = %rel.id,
            rel_type = %rel.rel_type,
            start = %rel.start_node,
            end = %rel.end_node,
            "relationship added"
        );
        self.relationships.insert(rel.id.clone(), rel);
        Ok(previous)
    }

    /// Look up a relationship by id.
    pub fn get_relationship(&self, id: &str) -> Option<&Relationship> {
        self.relationships.get(id)
    }

    /// Relationships starting at `node_id`, in relationship-id order.
    pub fn get_outgoing_relationships(&self, node_id: &str) -> Vec<&Relationship> {
        self.outgoing
            .get(node_id)
            .map(|ids| self.resolve_relationships(ids))
            .unwrap_or_default()
    }

    /// Relationships ending at `node_id`, in relationship-id order.
    pub fn get_incoming_relationships(&self, node_id: &str) -> Vec<&Relationship> {
        self.incoming
            .get(node_id)
            .map(|ids| self.resolve_relationships(ids))
            .unwrap_or_default()
    }

    /// All relationships of `rel_type`, in relationship-id order.
    pub fn get_relationships_by_type(&self, rel_type: &RelationshipType) -> Vec<&Relationship> {
        self.relationships_by_type
            .get(rel_type)
            .map(|ids| self.resolve_relationships(ids))
            .unwrap_or_default()
    }

    /// Iterate relationships incident to `node_id`: outgoing first, then incoming.
    ///
    /// A self-loop is yielded twice, once per direction.
    pub(crate) fn incident(&self, node_id: &str) -> impl Iterator<Item = &Relationship> {
        let out = self.outgoing.get(node_id).into_iter().flatten();
        let inc = self.incoming.get(node_id).into_iter().flatten();
        out.chain(inc)
            .filter_map(|rel_id| self.relationships.get(rel_id))
    }

    /// Iterate outgoing relationships of `node_id` without collecting.
    pub(crate) fn outgoing_iter(&self, node_id: &str) -> impl Iterator<Item = &Relationship> {
        self.outgoing
            .get(node_id)
            .into_iter()
            .flatten()
            .filter_map(|rel_id| self.relationships.get(rel_id))
    }

    /// Iterate incoming relationships of `node_id` without collecting.
    pub(crate) fn incoming_iter(&self, node_id: &str) -> impl Iterator<Item = &Relationship> {
        self.incoming
            .get(node_id)
            .into_iter()
            .flatten()
            .filter_map(|rel_id| self.relationships.get(rel_id))
    }

    /// Distinct nodes exactly one relationship away, in either direction.
    ///
    /// The node itself appears only if it has a self-loop.
    pub fn get_neighbors(&self, node_id: &str) -> Vec<&Node> {
        let ids: BTreeSet<&str> = self
            .incident(node_id)
            .filter_map(|rel| rel.other_end(node_id))
            .collect();
        ids.into_iter()
            .filter_map(|id| self.nodes.get(id))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Whole-graph accessors
    // -----------------------------------------------------------------------

    /// Reset to the empty graph.
    pub fn clear(&mut self) {
        debug!(
            nodes = self.nodes.len(),
            relationships = self.relationships.len(),
            "graph cleared"
        );
        *self = Self::default();
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node, in id order.
    pub fn get_all_nodes(&self) -> Vec<&Node> {
        let mut nodes: Vec<&Node> = self.nodes.values().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        nodes
    }

    /// Every relationship, in id order.
    pub fn get_all_relationships(&self) -> Vec<&Relationship> {
        let mut rels: Vec<&Relationship> = self.relationships.values().collect();
        rels.sort_by(|a, b| a.id.cmp(&b.id));
        rels
    }

    /// Labels held by at least one node, sorted.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.nodes_by_label.keys().map(String::as_str).collect();
        labels.sort_unstable();
        labels
    }

    /// Relationship types with at least one relationship, sorted by wire name.
    pub fn relationship_types(&self) -> Vec<&RelationshipType> {
        let mut types: Vec<&RelationshipType> = self.relationships_by_type.keys().collect();
        types.sort();
        types
    }

    /// Node and relationship counts, broken down by label and type.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            node_count: self.nodes.len(),
            relationship_count: self.relationships.len(),
            nodes_by_label: self
                .nodes_by_label
                .iter()
                .map(|(label, ids)| (label.clone(), ids.len()))
                .collect(),
            relationships_by_type: self
                .relationships_by_type
                .iter()
                .map(|(t, ids)| (t.as_str().to_string(), ids.len()))
                .collect(),
        }
    }

    // -----------------------------------------------------------------------
    // Consistency check
    // -----------------------------------------------------------------------

    /// Check every derived index against the primary tables.
    ///
    /// # Errors
    ///
    /// Returns the first [`IndexViolation`] found.
    pub fn verify_indexes(&self) -> std::result::Result<(), IndexViolation> {
        let violation = |msg: String| Err(IndexViolation(msg));

        // Label index <-> node labels.
        let mut expected_labels: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for node in self.nodes.values() {
            for label in &node.labels {
                expected_labels
                    .entry(label.as_str())
                    .or_default()
                    .insert(node.id.as_str());
            }
        }
        if expected_labels.len() != self.nodes_by_label.len() {
            return violation(format!(
                "{} label buckets, expected {}",
                self.nodes_by_label.len(),
                expected_labels.len()
            ));
        }
        for (label, ids) in &self.nodes_by_label {
            let actual: BTreeSet<&str> = ids.iter().map(String::as_str).collect();
            if expected_labels.get(label.as_str()) != Some(&actual) {
                return violation(format!("label bucket `{label}` is stale"));
            }
        }

        // Adjacency and type indexes <-> relationship endpoints.
        let mut expected_out: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        let mut expected_in: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        let mut expected_types: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for rel in self.relationships.values() {
            for endpoint in [&rel.start_node, &rel.end_node] {
                if !self.nodes.contains_key(endpoint.as_str()) {
                    return violation(format!("relationship `{}` dangles at `{endpoint}`", rel.id));
                }
            }
            expected_out
                .entry(rel.start_node.as_str())
                .or_default()
                .insert(rel.id.as_str());
            expected_in
                .entry(rel.end_node.as_str())
                .or_default()
                .insert(rel.id.as_str());
            expected_types
                .entry(rel.rel_type.as_str())
                .or_default()
                .insert(rel.id.as_str());
        }

        for (name, index, expected) in [
            ("outgoing", &self.outgoing, &expected_out),
            ("incoming", &self.incoming, &expected_in),
        ] {
            if index.len() != self.nodes.len() {
                return violation(format!(
                    "{name} index has {} entries for {} nodes",
                    index.len(),
                    self.nodes.len()
                ));
            }
            for (node_id, rel_ids) in index {
                if !self.nodes.contains_key(node_id) {
                    return violation(format!("{name} entry for missing node `{node_id}`"));
                }
                let actual: BTreeSet<&str> = rel_ids.iter().map(String::as_str).collect();
                let wanted = expected.get(node_id.as_str()).cloned().unwrap_or_default();
                if actual != wanted {
                    return violation(format!("{name} entry for `{node_id}` is stale"));
                }
            }
        }

        if expected_types.len() != self.relationships_by_type.len() {
            return violation(format!(
                "{} type buckets, expected {}",
                self.relationships_by_type.len(),
                expected_types.len()
            ));
        }
        for (rel_type, ids) in &self.relationships_by_type {
            let actual: BTreeSet<&str> = ids.iter().map(String::as_str).collect();
            if expected_types.get(rel_type.as_str()) != Some(&actual) {
                return violation(format!("type bucket `{rel_type}` is stale"));
            }
        }

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn resolve_nodes<'a>(&'a self, ids: &BTreeSet<String>) -> Vec<&'a Node> {
        ids.iter().filter_map(|id| self.nodes.get(id)).collect()
    }

    fn resolve_relationships<'a>(&'a self, ids: &BTreeSet<String>) -> Vec<&'a Relationship> {
        ids.iter()
            .filter_map(|id| self.relationships.get(id))
            .collect()
    }

    fn unindex_label(&mut self, label: &str, node_id: &str) {
        if let Some(ids) = self.nodes_by_label.get_mut(label) {
            ids.remove(node_id);
            if ids.is_empty() {
                self.nodes_by_label.remove(label);
            }
        }
    }

    /// Drop `rel` from the adjacency and type indexes (not from `relationships`).
    fn unlink(&mut self, rel: &Relationship) {
        if let Some(ids) = self.outgoing.get_mut(&rel.start_node) {
            ids.remove(&rel.id);
        }
        if let Some(ids) = self.incoming.get_mut(&rel.end_node) {
            ids.remove(&rel.id);
        }
        if let Some(ids) = self.relationships_by_type.get_mut(&rel.rel_type) {
            ids.remove(&rel.id);
            if ids.is_empty() {
                self.relationships_by_type.remove(&rel.rel_type);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
