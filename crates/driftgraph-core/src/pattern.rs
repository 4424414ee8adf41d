//! One-hop declarative pattern matching.
//!
//! A [`Pattern`] describes `(start:Labels)-[:TYPE]->(end:Labels {filter})`:
//!
//! 1. start candidates hold **every** start label (no labels = every node);
//! 2. the relationship type must equal `rel_type` when one is given;
//! 3. the end node holds **every** end label;
//! 4. the end node's properties contain every filter key with an exactly
//!    equal JSON value. Comparison is type-sensitive: the string `"true"`
//!    does not match the boolean `true`.
//!
//! Each satisfying relationship yields one `(start, end)` pair, so parallel
//! relationships between the same two nodes yield the pair more than once.
//!
//! # Usage
//!
//! ```rust
//! use driftgraph_core::{GraphStore, Node, Pattern, Relationship, RelationshipType};
//! use serde_json::json;
//!
//! let mut store = GraphStore::new();
//! store.add_node(Node::new("i-1").with_label("EC2"));
//! store.add_node(
//!     Node::new("subnet-1")
//!         .with_label("Subnet")
//!         .with_property("id", json!("subnet-123")),
//! );
//! store
//!     .add_relationship(Relationship::new("r1", RelationshipType::DependsOn, "i-1", "subnet-1"))
//!     .unwrap();
//!
//! let pattern = Pattern::new()
//!     .start_label("EC2")
//!     .rel_type(RelationshipType::DependsOn)
//!     .end_label("Subnet")
//!     .end_property("id", json!("subnet-123"));
//! assert_eq!(store.match_pattern(&pattern).len(), 1);
//! ```

#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

use serde::{Deserialize, Serialize};

use crate::model::{Node, Properties, RelationshipType};
use crate::store::GraphStore;

/// A malformed `key=value` end-node filter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterParseError {
    #[error("filter `{0}` is missing `=`")]
    MissingEquals(String),
    #[error("filter `{0}` has an empty key")]
    EmptyKey(String),
}

/// One-hop structural query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    #[serde(default)]
    pub start_labels: Vec<String>,
    /// `None` matches any relationship type.
    #[serde(default)]
    pub rel_type: Option<RelationshipType>,
    #[serde(default)]
    pub end_labels: Vec<String>,
    #[serde(default)]
    pub end_filter: Properties,
}

impl Pattern {
    /// An empty pattern: every outgoing relationship of every node.
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn start_label(mut self, label: impl Into<String>) -> Self {
        self.start_labels.push(label.into());
        self
    }

    #[must_use]
    pub fn rel_type(mut self, rel_type: impl Into<RelationshipType>) -> Self {
        self.rel_type = Some(rel_type.into());
        self
    }

    #[must_use]
    pub fn end_label(mut self, label: impl Into<String>) -> Self {
        self.end_labels.push(label.into());
        self
    }

    #[must_use]
    pub fn end_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.end_filter.insert(key.into(), value.into());
        self
    }

    /// Return `true` if `node` satisfies the end labels and property filter.
    pub fn accepts_end(&self, node: &Node) -> bool {
        self.end_labels.iter().all(|l| node.has_label(l))
            && self
                .end_filter
                .iter()
                .all(|(key, want)| node.property(key) == Some(want))
    }
}

/// Parse a `key=value` filter.
///
/// The value is read as JSON when it parses (`port=443`, `public=true`,
/// `name="web"`), and as a bare string otherwise (`id=subnet-123`).
///
/// # Errors
///
/// Returns [`FilterParseError`] when `=` is missing or the key is empty.
pub fn parse_filter(raw: &str) -> Result<(String, serde_json::Value), FilterParseError> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| FilterParseError::MissingEquals(raw.to_string()))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(FilterParseError::EmptyKey(raw.to_string()));
    }
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

impl GraphStore {
    /// Evaluate `pattern`, returning one `(start, end)` pair per matching
    /// relationship.
    pub fn match_pattern(&self, pattern: &Pattern) -> Vec<(Node, Node)> {
        let mut matches = Vec::new();

        for start in self.pattern_candidates(&pattern.start_labels) {
            for rel in self.outgoing_iter(&start.id) {
                if pattern.rel_type.as_ref().is_some_and(|t| *t != rel.rel_type) {
                    continue;
                }
                let Some(end) = self.get_node(&rel.end_node) else {
                    continue;
                };
                if pattern.accepts_end(end) {
                    matches.push((start.clone(), end.clone()));
                }
            }
        }

        matches
    }

    /// Nodes holding every label in `labels`, scanning the smallest bucket.
    fn pattern_candidates(&self, labels: &[String]) -> Vec<&Node> {
        let Some(seed) = labels.iter().min_by_key(|l| self.label_cardinality(l)) else {
            return self.get_all_nodes();
        };
        self.get_nodes_by_label(seed)
            .into_iter()
            .filter(|node| labels.iter().all(|l| node.has_label(l)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Relationship;
    use serde_json::json;

    fn pairs(matches: &[(Node, Node)]) -> Vec<(&str, &str)> {
        matches
            .iter()
            .map(|(s, e)| (s.id.as_str(), e.id.as_str()))
            .collect()
    }

    /// Two instances, each depending on its own subnet, plus a security group.
    fn infra() -> GraphStore {
        let mut store = GraphStore::new();
        store.add_node(Node::new("i-1").with_labels(["Resource", "EC2"]));
        store.add_node(Node::new("i-2").with_labels(["Resource", "EC2", "Drifted"]));
        store.add_node(
            Node::new("sn-a")
                .with_labels(["Resource", "Subnet"])
                .with_property("id", json!("subnet-123"))
                .with_property("public", json!(true)),
        );
        store.add_node(
            Node::new("sn-b")
                .with_labels(["Resource", "Subnet"])
                .with_property("id", json!("subnet-999"))
                .with_property("public", json!(false)),
        );
        store.add_node(Node::new("sg-1").with_labels(["Resource", "SecurityGroup"]));

        for (id, t, from, to) in [
            ("r1", "DEPENDS_ON", "i-1", "sn-a"),
            ("r2", "DEPENDS_ON", "i-2", "sn-b"),
            ("r3", "SECURES", "sg-1", "i-1"),
            ("r4", "SECURES", "sg-1", "i-2"),
        ] {
            store
                .add_relationship(Relationship::new(id, t, from, to))
                .unwrap();
        }
        store
    }

    #[test]
    fn full_pattern_matches_exactly_one_pair() {
        let store = infra();
        let pattern = Pattern::new()
            .start_label("EC2")
            .rel_type("DEPENDS_ON")
            .end_label("Subnet")
            .end_property("id", "subnet-123");
        assert_eq!(pairs(&store.match_pattern(&pattern)), [("i-1", "sn-a")]);
    }

    #[test]
    fn start_labels_must_all_be_present() {
        let store = infra();
        let pattern = Pattern::new().start_label("EC2").start_label("Drifted");
        assert_eq!(pairs(&store.match_pattern(&pattern)), [("i-2", "sn-b")]);
    }

    #[test]
    fn rel_type_filters_relationships() {
        let store = infra();
        let pattern = Pattern::new().rel_type(RelationshipType::Secures);
        assert_eq!(
            pairs(&store.match_pattern(&pattern)),
            [("sg-1", "i-1"), ("sg-1", "i-2")]
        );
    }

    #[test]
    fn end_labels_must_all_be_present() {
        let store = infra();
        let pattern = Pattern::new().end_label("EC2").end_label("Drifted");
        assert_eq!(pairs(&store.match_pattern(&pattern)), [("sg-1", "i-2")]);
    }

    #[test]
    fn filter_equality_is_type_sensitive() {
        let store = infra();
        let as_string = Pattern::new().end_property("public", "true");
        assert!(store.match_pattern(&as_string).is_empty());

        let as_bool = Pattern::new().end_property("public", true);
        assert_eq!(pairs(&store.match_pattern(&as_bool)), [("i-1", "sn-a")]);
    }

    #[test]
    fn missing_filter_key_rejects_end_node() {
        let store = infra();
        let pattern = Pattern::new().end_property("cidr", "10.0.0.0/24");
        assert!(store.match_pattern(&pattern).is_empty());
    }

    #[test]
    fn parallel_relationships_yield_duplicate_pairs() {
        let mut store = infra();
        store
            .add_relationship(Relationship::new("r5", "DEPENDS_ON", "i-1", "sn-a"))
            .unwrap();
        let pattern = Pattern::new().rel_type("DEPENDS_ON").start_label("EC2");
        assert_eq!(
            pairs(&store.match_pattern(&pattern)),
            [("i-1", "sn-a"), ("i-1", "sn-a"), ("i-2", "sn-b")]
        );
    }

    #[test]
    fn empty_pattern_returns_every_relationship() {
        let store = infra();
        assert_eq!(store.match_pattern(&Pattern::new()).len(), 4);
    }

    #[test]
    fn unknown_label_matches_nothing() {
        let store = infra();
        let pattern = Pattern::new().start_label("Lambda");
        assert!(store.match_pattern(&pattern).is_empty());
    }

    #[test]
    fn pattern_deserializes_from_json() {
        let pattern: Pattern = serde_json::from_value(json!({
            "start_labels": ["EC2"],
            "rel_type": "DEPENDS_ON",
            "end_filter": { "id": "subnet-999" }
        }))
        .unwrap();
        assert_eq!(pattern.rel_type, Some(RelationshipType::DependsOn));
        assert_eq!(pairs(&infra().match_pattern(&pattern)), [("i-2", "sn-b")]);
    }

    // -----------------------------------------------------------------------
    // parse_filter
    // -----------------------------------------------------------------------

    #[test]
    fn parse_filter_reads_json_scalars() {
        assert_eq!(parse_filter("port=443").unwrap(), ("port".into(), json!(443)));
        assert_eq!(parse_filter("public=true").unwrap(), ("public".into(), json!(true)));
        assert_eq!(parse_filter("name=\"web\"").unwrap(), ("name".into(), json!("web")));
    }

    #[test]
    fn parse_filter_falls_back_to_bare_string() {
        assert_eq!(
            parse_filter("id=subnet-123").unwrap(),
            ("id".into(), json!("subnet-123"))
        );
        assert_eq!(parse_filter("tag=").unwrap(), ("tag".into(), json!("")));
    }

    #[test]
    fn parse_filter_rejects_malformed_input() {
        assert_eq!(
            parse_filter("oops").unwrap_err(),
            FilterParseError::MissingEquals("oops".into())
        );
        assert_eq!(
            parse_filter("=x").unwrap_err(),
            FilterParseError::EmptyKey("=x".into())
        );
    }
}
