//! Value types stored in and returned by the graph engine.
//!
//! Nodes and relationships are plain owned structs. The store keeps them in
//! flat maps keyed by id and every index refers to them by id only, so a
//! value handed out by a query is a detached copy of the snapshot it was
//! read from.
//!
//! # Relationship types
//!
//! Relationship types are an open vocabulary. [`RelationshipType`] names the
//! conventional set shared by producers and consumers and falls back to
//! [`RelationshipType::Custom`] for anything else. The wire form of every
//! variant is its upper-snake name (`DEPENDS_ON`, `SECURES`, ...), and two
//! types are equal exactly when their wire forms are equal.

#![allow(clippy::module_name_repetitions)]

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Property map attached to nodes and relationships.
///
/// Values are arbitrary JSON; the engine never interprets them beyond
/// exact equality in pattern filters.
pub type Properties = BTreeMap<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A graph vertex.
///
/// The `id` is supplied by the producer and is the node's identity for its
/// whole lifetime. Re-adding a node with the same id replaces its labels and
/// properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub labels: BTreeSet<String>,
    #[serde(default)]
    pub properties: Properties,
}

impl Node {
    /// Create a node with no labels and no properties.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            labels: BTreeSet::new(),
            properties: Properties::new(),
        }
    }

    /// Add a label, returning the node for chaining.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.insert(label.into());
        self
    }

    /// Add several labels at once.
    #[must_use]
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels.extend(labels.into_iter().map(Into::into));
        self
    }

    /// Set a property, returning the node for chaining.
    #[must_use]
    pub fn with_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Return `true` if the node carries `label`.
    #[must_use]
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    /// Look up a property value.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&serde_json::Value> {
        self.properties.get(key)
    }
}

impl fmt::Display for Node {
    /// `id:Label1:Label2`, the form used for graph visualization.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)?;
        for label in &self.labels {
            write!(f, ":{label}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RelationshipType
// ---------------------------------------------------------------------------

/// Type tag of a relationship.
///
/// Parsing a known wire name always produces the dedicated variant, but
/// equality, ordering and hashing go through [`RelationshipType::as_str`], so
/// a hand-built `Custom("DEPENDS_ON")` still behaves as `DependsOn`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationshipType {
    DependsOn,
    Contains,
    PartOf,
    Secures,
    RoutesTo,
    ConnectsTo,
    RunsIn,
    RegistersTo,
    AppliesTo,
    Associates,
    Allows,
    Blocks,
    RequiredBy,
    DriftedFrom,
    CausedDriftIn,
    Custom(String),
}

impl RelationshipType {
    /// Every variant of the conventional vocabulary.
    pub const KNOWN: [Self; 15] = [
        Self::DependsOn,
        Self::Contains,
        Self::PartOf,
        Self::Secures,
        Self::RoutesTo,
        Self::ConnectsTo,
        Self::RunsIn,
        Self::RegistersTo,
        Self::AppliesTo,
        Self::Associates,
        Self::Allows,
        Self::Blocks,
        Self::RequiredBy,
        Self::DriftedFrom,
        Self::CausedDriftIn,
    ];

    /// Wire name of the type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::DependsOn => "DEPENDS_ON",
            Self::Contains => "CONTAINS",
            Self::PartOf => "PART_OF",
            Self::Secures => "SECURES",
            Self::RoutesTo => "ROUTES_TO",
            Self::ConnectsTo => "CONNECTS_TO",
            Self::RunsIn => "RUNS_IN",
            Self::RegistersTo => "REGISTERS_TO",
            Self::AppliesTo => "APPLIES_TO",
            Self::Associates => "ASSOCIATES",
            Self::Allows => "ALLOWS",
            Self::Blocks => "BLOCKS",
            Self::RequiredBy => "REQUIRED_BY",
            Self::DriftedFrom => "DRIFTED_FROM",
            Self::CausedDriftIn => "CAUSED_DRIFT_IN",
            Self::Custom(name) => name,
        }
    }

    /// Return `true` for a `DEPENDS_ON` relationship, however it was built.
    #[must_use]
    pub fn is_depends_on(&self) -> bool {
        self.as_str() == "DEPENDS_ON"
    }

    /// Return `true` if the type is outside the conventional vocabulary.
    #[must_use]
    pub fn is_custom(&self) -> bool {
        Self::parse_known(self.as_str()).is_none()
    }

    fn parse_known(s: &str) -> Option<Self> {
        Self::KNOWN.into_iter().find(|known| known.as_str() == s)
    }
}

impl From<&str> for RelationshipType {
    fn from(s: &str) -> Self {
        Self::parse_known(s).unwrap_or_else(|| Self::Custom(s.to_string()))
    }
}

impl From<String> for RelationshipType {
    fn from(s: String) -> Self {
        Self::parse_known(&s).unwrap_or(Self::Custom(s))
    }
}

impl From<RelationshipType> for String {
    fn from(t: RelationshipType) -> Self {
        match t {
            RelationshipType::Custom(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for RelationshipType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl PartialEq for RelationshipType {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for RelationshipType {}

impl Hash for RelationshipType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl PartialOrd for RelationshipType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RelationshipType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Relationship
// ---------------------------------------------------------------------------

/// A directed, typed edge between two nodes that exist in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: String,
    #[serde(rename = "type")]
    pub rel_type: RelationshipType,
    pub start_node: String,
    pub end_node: String,
    #[serde(default)]
    pub properties: Properties,
}

impl Relationship {
    /// Create a relationship `start -[rel_type]-> end` with no properties.
    pub fn new(
        id: impl Into<String>,
        rel_type: impl Into<RelationshipType>,
        start_node: impl Into<String>,
        end_node: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            rel_type: rel_type.into(),
            start_node: start_node.into(),
            end_node: end_node.into(),
            properties: Properties::new(),
        }
    }

    /// Set a property, returning the relationship for chaining.
    #[must_use]
    pub fn with_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Return the endpoint opposite `node_id`.
    ///
    /// For a self-loop both endpoints are `node_id`. Returns `None` when the
    /// relationship does not touch `node_id` at all.
    #[must_use]
    pub fn other_end(&self, node_id: &str) -> Option<&str> {
        if self.start_node == node_id {
            Some(&self.end_node)
        } else if self.end_node == node_id {
            Some(&self.start_node)
        } else {
            None
        }
    }

    /// Return `true` if `node_id` is either endpoint.
    #[must_use]
    pub fn touches(&self, node_id: &str) -> bool {
        self.start_node == node_id || self.end_node == node_id
    }

    /// Return `true` if the relationship connects `a` and `b` in either direction.
    #[must_use]
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.start_node == a && self.end_node == b) || (self.start_node == b && self.end_node == a)
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rel_type.as_str())
    }
}

// ---------------------------------------------------------------------------
// Query results
// ---------------------------------------------------------------------------

/// A route between two nodes returned by a shortest-path query.
///
/// `relationships[i]` connects `nodes[i]` and `nodes[i + 1]`, in whichever
/// direction it is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub nodes: Vec<Node>,
    pub relationships: Vec<Relationship>,
    /// Hop count (`nodes.len() - 1`).
    pub length: usize,
}

impl Path {
    /// Ids of the nodes along the path, start first.
    #[must_use]
    pub fn node_ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }
}

/// Nodes reached by a bounded traversal plus the BFS tree that reached them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraversalResult {
    /// Reached nodes in discovery order, start node first.
    pub nodes: Vec<Node>,
    /// Node id → hop count from the start.
    pub distances: HashMap<String, usize>,
    /// Node id → id of the node it was discovered from.
    pub parents: HashMap<String, String>,
}

impl TraversalResult {
    /// Return `true` if the traversal reached nothing (unknown start).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Return `true` if `node_id` was reached.
    #[must_use]
    pub fn contains(&self, node_id: &str) -> bool {
        self.distances.contains_key(node_id)
    }

    /// Reconstruct the id sequence from the start node to `node_id`.
    ///
    /// Returns `None` if `node_id` was not reached.
    #[must_use]
    pub fn path_to(&self, node_id: &str) -> Option<Vec<String>> {
        if !self.contains(node_id) {
            return None;
        }
        let mut path = vec![node_id.to_string()];
        let mut current = node_id;
        while let Some(parent) = self.parents.get(current) {
            path.push(parent.clone());
            current = parent;
        }
        path.reverse();
        Some(path)
    }
}

/// Per-label and per-type counts for a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub relationship_count: usize,
    pub nodes_by_label: BTreeMap<String, usize>,
    pub relationships_by_type: BTreeMap<String, usize>,
}
