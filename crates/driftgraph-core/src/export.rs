//! Snapshot export for visualization and change detection.
//!
//! - [`GraphStore::to_petgraph`] copies the snapshot (or a subset of it) into
//!   a `petgraph` [`StableDiGraph`] so callers can run petgraph algorithms or
//!   hand it to a renderer.
//! - [`GraphStore::to_dot`] renders Graphviz DOT. Nodes are labelled
//!   `id:Label:Label`, edges with their relationship type.
//! - [`GraphStore::content_hash`] is a BLAKE3 digest of the snapshot. Compare
//!   it against a stored value to tell whether a re-imported graph changed.

#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

use std::collections::HashMap;

use petgraph::dot::Dot;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};

use crate::model::{Node, Relationship};
use crate::store::GraphStore;

/// A petgraph copy of a snapshot plus the id → index mapping.
#[derive(Debug, Clone, Default)]
pub struct ExportedGraph {
    pub graph: StableDiGraph<Node, Relationship>,
    pub node_map: HashMap<String, NodeIndex>,
}

impl ExportedGraph {
    /// Look up the `NodeIndex` for a node id.
    pub fn node_index(&self, node_id: &str) -> Option<NodeIndex> {
        self.node_map.get(node_id).copied()
    }

    /// Render as Graphviz DOT.
    pub fn to_dot(&self) -> String {
        format!("{}", Dot::with_config(&self.graph, &[]))
    }
}

impl GraphStore {
    /// Copy the whole snapshot into a petgraph graph.
    pub fn to_petgraph(&self) -> ExportedGraph {
        self.to_petgraph_filtered(|_| true)
    }

    /// Copy the nodes accepted by `keep`, and the relationships between
    /// them, into a petgraph graph. Nodes are inserted in id order.
    pub fn to_petgraph_filtered(&self, keep: impl Fn(&Node) -> bool) -> ExportedGraph {
        let mut exported = ExportedGraph::default();

        for node in self.get_all_nodes() {
            if keep(node) {
                let idx = exported.graph.add_node(node.clone());
                exported.node_map.insert(node.id.clone(), idx);
            }
        }

        for rel in self.get_all_relationships() {
            if let (Some(start), Some(end)) = (
                exported.node_index(&rel.start_node),
                exported.node_index(&rel.end_node),
            ) {
                exported.graph.add_edge(start, end, rel.clone());
            }
        }

        exported
    }

    /// Render the whole snapshot as Graphviz DOT.
    pub fn to_dot(&self) -> String {
        self.to_petgraph().to_dot()
    }

    /// BLAKE3 digest over every node (id, labels, properties) and
    /// relationship (id, type, endpoints, properties), in id order.
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();

        for node in self.get_all_nodes() {
            hasher.update(b"N\x00");
            hasher.update(node.id.as_bytes());
            for label in &node.labels {
                hasher.update(b"\x00");
                hasher.update(label.as_bytes());
            }
            hash_properties(&mut hasher, &node.properties);
        }

        for rel in self.get_all_relationships() {
            hasher.update(b"R\x00");
            for part in [
                rel.id.as_str(),
                rel.rel_type.as_str(),
                rel.start_node.as_str(),
                rel.end_node.as_str(),
            ] {
                hasher.update(part.as_bytes());
                hasher.update(b"\x00");
            }
            hash_properties(&mut hasher, &rel.properties);
        }

        format!("blake3:{}", hasher.finalize())
    }
}

fn hash_properties(hasher: &mut blake3::Hasher, properties: &crate::model::Properties) {
    for (key, value) in properties {
        hasher.update(b"\x01");
        hasher.update(key.as_bytes());
        hasher.update(b"=");
        // `Value`'s Display is compact JSON; object keys are already sorted.
        hasher.update(value.to_string().as_bytes());
    }
    hasher.update(b"\x02");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
