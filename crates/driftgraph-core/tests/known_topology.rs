//! Known-topology regression tests for the graph engine.
//!
//! Each test builds a small infrastructure graph by hand and checks the
//! engine's answers against values worked out on paper.

use driftgraph_core::{
    GraphDatabase, GraphError, Node, Pattern, Relationship, RelationshipType,
};
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ids(nodes: &[Node]) -> Vec<&str> {
    nodes.iter().map(|n| n.id.as_str()).collect()
}

fn build(nodes: Vec<Node>, edges: &[(&str, &str, &str)]) -> GraphDatabase {
    let db = GraphDatabase::new();
    for node in nodes {
        db.add_node(node);
    }
    for (i, (from, rel_type, to)) in edges.iter().enumerate() {
        db.add_relationship(Relationship::new(format!("r{i}"), *rel_type, *from, *to))
            .unwrap();
    }
    db
}

fn plain(ids: &[&str]) -> Vec<Node> {
    ids.iter().map(|id| Node::new(*id)).collect()
}

/// A VPC with two subnets, three instances and a shared security group.
///
/// ```text
///   web-1 ──DEPENDS_ON──▶ sn-a ──PART_OF──▶ vpc
///   web-2 ──DEPENDS_ON──▶ sn-a
///   db-1  ──DEPENDS_ON──▶ sn-b ──PART_OF──▶ vpc
///   sg    ──SECURES────▶ web-1, web-2, db-1
///   web-1 ──DEPENDS_ON──▶ db-1
/// ```
fn vpc_graph() -> GraphDatabase {
    build(
        vec![
            Node::new("vpc").with_labels(["Resource", "VPC"]),
            Node::new("sn-a").with_labels(["Resource", "Subnet"]),
            Node::new("sn-b").with_labels(["Resource", "Subnet"]),
            Node::new("web-1").with_labels(["Resource", "EC2"]),
            Node::new("web-2").with_labels(["Resource", "EC2"]),
            Node::new("db-1").with_labels(["Resource", "RDS"]),
            Node::new("sg").with_labels(["Resource", "SecurityGroup"]),
        ],
        &[
            ("web-1", "DEPENDS_ON", "sn-a"),
            ("web-2", "DEPENDS_ON", "sn-a"),
            ("db-1", "DEPENDS_ON", "sn-b"),
            ("sn-a", "PART_OF", "vpc"),
            ("sn-b", "PART_OF", "vpc"),
            ("sg", "SECURES", "web-1"),
            ("sg", "SECURES", "web-2"),
            ("sg", "SECURES", "db-1"),
            ("web-1", "DEPENDS_ON", "db-1"),
        ],
    )
}

// ---------------------------------------------------------------------------
// Store and indexes
// ---------------------------------------------------------------------------

#[test]
fn label_and_adjacency_indexes_match_topology() {
    let db = vpc_graph();
    assert_eq!(ids(&db.get_nodes_by_label("EC2")), ["web-1", "web-2"]);
    assert_eq!(db.get_nodes_by_label("Resource").len(), 7);
    assert!(db.get_nodes_by_label("Lambda").is_empty());

    let out: Vec<_> = db
        .get_outgoing_relationships("web-1")
        .into_iter()
        .map(|r| r.end_node)
        .collect();
    assert_eq!(out.len(), 2);
    assert!(out.contains(&"sn-a".to_string()));
    assert!(out.contains(&"db-1".to_string()));

    assert_eq!(db.get_incoming_relationships("sg").len(), 0);
    assert_eq!(db.get_outgoing_relationships("sg").len(), 3);
    assert_eq!(
        db.get_relationships_by_type(&RelationshipType::Secures).len(),
        3
    );

    assert_eq!(db.node_count(), db.get_all_nodes().len());
    assert_eq!(db.relationship_count(), db.get_all_relationships().len());
    db.verify_indexes().unwrap();
}

#[test]
fn neighbors_are_distinct_and_undirected() {
    let db = vpc_graph();
    assert_eq!(ids(&db.get_neighbors("db-1")), ["sg", "sn-b", "web-1"]);
}

#[test]
fn stats_count_labels_and_types() {
    let stats = vpc_graph().stats();
    assert_eq!(stats.node_count, 7);
    assert_eq!(stats.relationship_count, 9);
    assert_eq!(stats.nodes_by_label["Subnet"], 2);
    assert_eq!(stats.relationships_by_type["DEPENDS_ON"], 4);
    assert_eq!(stats.relationships_by_type["PART_OF"], 2);
}

#[test]
fn delete_cascades_exactly_incident_relationships() {
    let db = vpc_graph();
    let before = db.relationship_count();
    let incident = db.get_outgoing_relationships("web-1").len()
        + db.get_incoming_relationships("web-1").len();

    assert_eq!(db.delete_node("web-1"), Some(incident));
    assert_eq!(db.relationship_count(), before - incident);
    assert!(db.get_all_relationships().iter().all(|r| !r.touches("web-1")));
    assert_eq!(ids(&db.get_nodes_by_label("EC2")), ["web-2"]);
    assert_eq!(db.delete_node("web-1"), None);
    db.verify_indexes().unwrap();
}

#[test]
fn relationship_to_missing_node_is_rejected() {
    let db = vpc_graph();
    let before = db.relationship_count();

    let err = db
        .add_relationship(Relationship::new("bad", "DEPENDS_ON", "web-1", "nat-gw"))
        .unwrap_err();
    assert_eq!(err, GraphError::NodeNotFound { id: "nat-gw".into() });

    let err = db
        .add_relationship(Relationship::new("bad", "DEPENDS_ON", "lambda", "vpc"))
        .unwrap_err();
    assert_eq!(err, GraphError::NodeNotFound { id: "lambda".into() });

    assert_eq!(db.relationship_count(), before);
}

#[test]
fn overwriting_node_drops_removed_labels_from_index() {
    let db = vpc_graph();
    db.add_node(Node::new("web-2").with_label("Resource"));
    assert_eq!(ids(&db.get_nodes_by_label("EC2")), ["web-1"]);
    assert!(!db.has_label("web-2", "EC2"));
    // Relationships survive a node overwrite.
    assert_eq!(db.get_outgoing_relationships("web-2").len(), 1);
    db.verify_indexes().unwrap();
}

// ---------------------------------------------------------------------------
// Traversal
// ---------------------------------------------------------------------------

#[test]
fn path_ignores_direction_both_ways() {
    let db = build(
        plain(&["a", "b", "c"]),
        &[("a", "CONNECTS_TO", "b"), ("b", "CONNECTS_TO", "c")],
    );
    assert_eq!(db.find_path("a", "c").unwrap().length, 2);
    assert_eq!(db.find_path("c", "a").unwrap().length, 2);
}

#[test]
fn path_across_the_vpc() {
    let db = vpc_graph();
    let path = db.find_path("web-2", "db-1").unwrap();
    assert_eq!(path.length, 2);
    assert_eq!(path.nodes.first().unwrap().id, "web-2");
    assert_eq!(path.nodes.last().unwrap().id, "db-1");
    assert_eq!(path.relationships.len(), path.nodes.len() - 1);
    for (rel, pair) in path.relationships.iter().zip(path.nodes.windows(2)) {
        assert!(rel.connects(&pair[0].id, &pair[1].id), "{rel:?} breaks the path");
    }
}

#[test]
fn impact_radius_of_subnet() {
    let db = vpc_graph();
    let result = db.find_impact_radius("sn-a", 1);
    let mut reached: Vec<_> = result.nodes.iter().map(|n| n.id.as_str()).collect();
    reached.sort_unstable();
    assert_eq!(reached, ["sn-a", "vpc", "web-1", "web-2"]);

    let wider = db.find_impact_radius("sn-a", 2);
    assert_eq!(wider.nodes.len(), 7);
    assert_eq!(wider.distances["sg"], 2);
}

// ---------------------------------------------------------------------------
// Dependency closure
// ---------------------------------------------------------------------------

#[test]
fn dependency_depth_bound_on_five_edge_chain() {
    let db = build(
        plain(&["n0", "n1", "n2", "n3", "n4", "n5"]),
        &[
            ("n0", "DEPENDS_ON", "n1"),
            ("n1", "DEPENDS_ON", "n2"),
            ("n2", "DEPENDS_ON", "n3"),
            ("n3", "DEPENDS_ON", "n4"),
            ("n4", "DEPENDS_ON", "n5"),
        ],
    );
    assert_eq!(ids(&db.find_dependencies("n0", 2)), ["n1", "n2"]);
    assert_eq!(db.find_dependencies("n0", 5).len(), 5);
}

#[test]
fn subnet_dependents_and_dependencies() {
    let db = vpc_graph();
    assert_eq!(ids(&db.find_dependents("sn-b", 3)), ["db-1", "web-1"]);
    // PART_OF is not a dependency edge.
    assert!(db.find_dependencies("sn-a", 3).is_empty());
    assert_eq!(ids(&db.find_dependencies("web-1", 3)), ["sn-a", "db-1", "sn-b"]);
}

#[test]
fn critical_node_threshold() {
    let db = build(
        plain(&["v", "a", "b", "c"]),
        &[
            ("a", "DEPENDS_ON", "v"),
            ("b", "DEPENDS_ON", "v"),
            ("c", "DEPENDS_ON", "v"),
        ],
    );
    assert_eq!(ids(&db.find_critical_paths(3)), ["v"]);
    assert!(db.find_critical_paths(4).is_empty());
}

// ---------------------------------------------------------------------------
// Pattern matching
// ---------------------------------------------------------------------------

#[test]
fn pattern_match_selects_one_subnet() {
    let db = GraphDatabase::new();
    db.add_node(Node::new("i-1").with_label("EC2"));
    db.add_node(Node::new("i-2").with_label("EC2"));
    db.add_node(
        Node::new("s-1")
            .with_label("Subnet")
            .with_property("id", json!("subnet-123")),
    );
    db.add_node(
        Node::new("s-2")
            .with_label("Subnet")
            .with_property("id", json!("subnet-999")),
    );
    db.add_relationship(Relationship::new("r1", "DEPENDS_ON", "i-1", "s-1"))
        .unwrap();
    db.add_relationship(Relationship::new("r2", "DEPENDS_ON", "i-2", "s-2"))
        .unwrap();

    let pattern = Pattern::new()
        .start_label("EC2")
        .rel_type(RelationshipType::DependsOn)
        .end_label("Subnet")
        .end_property("id", "subnet-123");
    let matches = db.match_pattern(&pattern);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].0.id, "i-1");
    assert_eq!(matches[0].1.id, "s-1");
}

// ---------------------------------------------------------------------------
// Empty graph
// ---------------------------------------------------------------------------

#[test]
fn empty_graph_queries() {
    let db = GraphDatabase::new();
    assert!(db.find_impact_radius("missing", 3).is_empty());
    assert!(db.find_dependencies("missing", 3).is_empty());
    assert!(db.find_dependents("missing", 3).is_empty());
    assert!(db.find_critical_paths(1).is_empty());
    assert!(db.match_pattern(&Pattern::new()).is_empty());

    let err = db.find_path("missing", "x").unwrap_err();
    assert_eq!(err, GraphError::NodeNotFound { id: "missing".into() });
    assert_eq!(err.code().code(), "E2001");
}

#[test]
fn clear_resets_everything() {
    let db = vpc_graph();
    db.clear();
    assert_eq!(db.node_count(), 0);
    assert_eq!(db.relationship_count(), 0);
    assert!(db.labels().is_empty());
    db.verify_indexes().unwrap();
}
