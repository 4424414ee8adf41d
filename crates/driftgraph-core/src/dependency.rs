//! Directed `DEPENDS_ON` closures and fan-in analysis.
//!
//! # Edge Direction
//!
//! An edge `A -[DEPENDS_ON]-> B` means "A needs B".
//!
//! - [`GraphStore::find_dependencies`] follows outgoing edges: what `A` needs.
//! - [`GraphStore::find_dependents`] follows incoming edges: what would be
//!   affected if `B` changed.
//!
//! Only `DEPENDS_ON` edges participate; every other relationship type is
//! ignored here. Unlike [`crate::traversal`], direction matters.
//!
//! # Critical nodes
//!
//! [`GraphStore::find_critical_paths`] is a fan-in threshold over *direct*
//! dependents only. A node with a long tail of indirect dependents but few
//! direct ones is not flagged.

#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

use crate::model::{Node, Relationship};
use crate::store::GraphStore;

fn depends_on(rel: &&Relationship) -> bool {
    rel.rel_type.is_depends_on()
}

impl GraphStore {
    /// Nodes reachable from `node_id` over outgoing `DEPENDS_ON` edges within
    /// `max_depth` hops, nearest first.
    ///
    /// The start node is never part of the result, even when a cycle leads
    /// back to it. An unknown `node_id` yields an empty set.
    pub fn find_dependencies(&self, node_id: &str, max_depth: usize) -> Vec<Node> {
        let Some(start) = self.get_node(node_id) else {
            return Vec::new();
        };
        let tree = self.bounded_bfs(start.id.as_str(), max_depth, |id| {
            self.outgoing_iter(id)
                .filter(depends_on)
                .map(|rel| rel.end_node.as_str())
        });
        self.resolve_closure(&tree.order[1..])
    }

    /// Nodes that reach `node_id` over `DEPENDS_ON` edges within `max_depth`
    /// hops, nearest first. Mirror of [`GraphStore::find_dependencies`].
    pub fn find_dependents(&self, node_id: &str, max_depth: usize) -> Vec<Node> {
        let Some(start) = self.get_node(node_id) else {
            return Vec::new();
        };
        let tree = self.bounded_bfs(start.id.as_str(), max_depth, |id| {
            self.incoming_iter(id)
                .filter(depends_on)
                .map(|rel| rel.start_node.as_str())
        });
        self.resolve_closure(&tree.order[1..])
    }

    /// Number of `DEPENDS_ON` relationships ending at `node_id`.
    ///
    /// Parallel edges from the same dependent each count.
    pub fn direct_dependent_count(&self, node_id: &str) -> usize {
        self.incoming_iter(node_id).filter(depends_on).count()
    }

    /// Nodes with at least `min_dependents` direct incoming `DEPENDS_ON`
    /// relationships, in id order.
    pub fn find_critical_paths(&self, min_dependents: usize) -> Vec<Node> {
        self.get_all_nodes()
            .into_iter()
            .filter(|node| self.direct_dependent_count(&node.id) >= min_dependents)
            .cloned()
            .collect()
    }

    /// Critical nodes paired with their direct dependent count, highest first.
    ///
    /// Ties are broken by node id.
    pub fn critical_nodes_ranked(&self, min_dependents: usize) -> Vec<(Node, usize)> {
        let mut ranked: Vec<(Node, usize)> = self
            .get_all_nodes()
            .into_iter()
            .map(|node| (node, self.direct_dependent_count(&node.id)))
            .filter(|(_, count)| *count >= min_dependents)
            .map(|(node, count)| (node.clone(), count))
            .collect();
        ranked.sort_by(|(a, ca), (b, cb)| cb.cmp(ca).then_with(|| a.id.cmp(&b.id)));
        ranked
    }

    fn resolve_closure(&self, ids: &[&str]) -> Vec<Node> {
        ids.iter()
            .filter_map(|id| self.get_node(id))
            .cloned()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
