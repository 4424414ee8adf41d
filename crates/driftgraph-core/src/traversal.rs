//! Shortest-path search and depth-bounded reachability.
//!
//! # Direction
//!
//! Relationships are stored directed, but both queries here follow them in
//! either direction: for impact analysis what matters is that two resources
//! are connected, not which way the edge points. The directed closures over
//! `DEPENDS_ON` live in [`crate::dependency`].
//!
//! # Algorithm
//!
//! Plain breadth-first search. Each node is visited once and keeps the first
//! predecessor that discovered it, so only one shortest path is tracked.
//! Adjacency sets are ordered by relationship id, which makes the chosen
//! predecessor deterministic.
//!
//! # Complexity
//!
//! O(V + E) over the reached component.

#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

use std::collections::{HashMap, VecDeque};

use crate::error::{GraphError, Result};
use crate::model::{Path, TraversalResult};
use crate::store::GraphStore;

/// BFS tree over borrowed ids, before conversion to an owned result.
#[derive(Debug, Default)]
pub(crate) struct BfsTree<'a> {
    /// Reached ids in discovery order, start first.
    pub order: Vec<&'a str>,
    pub distances: HashMap<&'a str, usize>,
    pub parents: HashMap<&'a str, &'a str>,
}

impl GraphStore {
    /// Find a shortest undirected path from `start` to `end`.
    ///
    /// `start == end` yields a zero-length path holding the single node.
    ///
    /// # Errors
    ///
    /// - [`GraphError::NodeNotFound`] if either endpoint is absent.
    /// - [`GraphError::InvalidPath`] if both exist but are disconnected.
    pub fn find_path(&self, start: &str, end: &str) -> Result<Path> {
        let start_node = self
            .get_node(start)
            .ok_or_else(|| GraphError::node_not_found(start))?;
        if !self.contains_node(end) {
            return Err(GraphError::node_not_found(end));
        }

        let origin = start_node.id.as_str();
        // node id -> (predecessor id, id of the relationship crossed)
        let mut parents: HashMap<&str, (&str, &str)> = HashMap::new();
        let mut queue = VecDeque::from([origin]);
        parents.insert(origin, (origin, ""));

        while let Some(current) = queue.pop_front() {
            if current == end {
                return Ok(self.assemble_path(origin, current, &parents));
            }
            for rel in self.incident(current) {
                let Some(next) = rel.other_end(current) else {
                    continue;
                };
                if !parents.contains_key(next) {
                    parents.insert(next, (current, rel.id.as_str()));
                    queue.push_back(next);
                }
            }
        }

        Err(GraphError::InvalidPath {
            from: start.to_string(),
            to: end.to_string(),
        })
    }

    /// Collect every node within `max_depth` undirected hops of `start`.
    ///
    /// The start node is included at distance 0; nodes at `max_depth` are
    /// reached but not expanded. An unknown start yields an empty result.
    pub fn find_impact_radius(&self, start: &str, max_depth: usize) -> TraversalResult {
        let Some(start_node) = self.get_node(start) else {
            return TraversalResult::default();
        };

        let tree = self.bounded_bfs(start_node.id.as_str(), max_depth, |id| {
            self.incident(id).filter_map(move |rel| rel.other_end(id))
        });
        self.traversal_result_from(&tree)
    }

    /// Depth-bounded BFS from `origin` using `step` to enumerate successors.
    ///
    /// `origin` must exist in the store.
    pub(crate) fn bounded_bfs<'a, F, I>(
        &'a self,
        origin: &'a str,
        max_depth: usize,
        step: F,
    ) -> BfsTree<'a>
    where
        F: Fn(&'a str) -> I,
        I: Iterator<Item = &'a str>,
    {
        let mut tree = BfsTree::default();
        tree.order.push(origin);
        tree.distances.insert(origin, 0);

        let mut queue = VecDeque::from([(origin, 0usize)]);
        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            for next in step(current) {
                if tree.distances.contains_key(next) {
                    continue;
                }
                tree.distances.insert(next, depth + 1);
                tree.parents.insert(next, current);
                tree.order.push(next);
                queue.push_back((next, depth + 1));
            }
        }

        tree
    }

    fn traversal_result_from(&self, tree: &BfsTree<'_>) -> TraversalResult {
        TraversalResult {
            nodes: tree
                .order
                .iter()
                .filter_map(|id| self.get_node(id))
                .cloned()
                .collect(),
            distances: tree
                .distances
                .iter()
                .map(|(id, d)| ((*id).to_string(), *d))
                .collect(),
            parents: tree
                .parents
                .iter()
                .map(|(id, p)| ((*id).to_string(), (*p).to_string()))
                .collect(),
        }
    }

    /// Walk `parents` back from `target` and resolve ids to owned values.
    fn assemble_path(
        &self,
        origin: &str,
        target: &str,
        parents: &HashMap<&str, (&str, &str)>,
    ) -> Path {
        let mut node_ids = vec![target];
        let mut rel_ids = Vec::new();
        let mut current = target;
        while current != origin {
            let Some(&(prev, rel_id)) = parents.get(current) else {
                break;
            };
            rel_ids.push(rel_id);
            node_ids.push(prev);
            current = prev;
        }
        node_ids.reverse();
        rel_ids.reverse();

        let nodes: Vec<_> = node_ids
            .iter()
            .filter_map(|id| self.get_node(id))
            .cloned()
            .collect();
        let relationships: Vec<_> = rel_ids
            .iter()
            .filter_map(|id| self.get_relationship(id))
            .cloned()
            .collect();
        Path {
            length: relationships.len(),
            nodes,
            relationships,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
