//! E2E query tests: load a snapshot and run every read command against it.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SNAPSHOT: &str = r#"{
  "nodes": [
    {"id": "vpc-1", "labels": ["Resource", "VPC"]},
    {"id": "subnet-a", "labels": ["Resource", "Subnet"], "properties": {"id": "subnet-123", "public": true}},
    {"id": "subnet-b", "labels": ["Resource", "Subnet"], "properties": {"id": "subnet-999", "public": false}},
    {"id": "i-web1", "labels": ["Resource", "EC2"]},
    {"id": "i-web2", "labels": ["Resource", "EC2"]},
    {"id": "i-api", "labels": ["Resource", "EC2", "Drifted"]},
    {"id": "sg-web", "labels": ["Resource", "SecurityGroup"]}
  ],
  "relationships": [
    {"id": "r01", "type": "DEPENDS_ON", "start_node": "i-web1", "end_node": "subnet-a"},
    {"id": "r02", "type": "DEPENDS_ON", "start_node": "i-web2", "end_node": "subnet-a"},
    {"id": "r03", "type": "DEPENDS_ON", "start_node": "i-api", "end_node": "subnet-a"},
    {"id": "r04", "type": "DEPENDS_ON", "start_node": "i-api", "end_node": "subnet-b"},
    {"id": "r05", "type": "PART_OF", "start_node": "subnet-a", "end_node": "vpc-1"},
    {"id": "r06", "type": "PART_OF", "start_node": "subnet-b", "end_node": "vpc-1"},
    {"id": "r07", "type": "SECURES", "start_node": "sg-web", "end_node": "i-web1"},
    {"id": "r08", "type": "SECURES", "start_node": "sg-web", "end_node": "i-web2"}
  ]
}"#;

fn dg_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("dg"));
    cmd.current_dir(dir);
    cmd.env("DRIFTGRAPH_LOG", "error");
    cmd.env("XDG_CONFIG_HOME", dir.join(".xdg"));
    cmd.env_remove("DRIFTGRAPH_GRAPH");
    cmd.env_remove("FORMAT");
    cmd
}

fn setup() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let graph = dir.path().join("graph.json");
    std::fs::write(&graph, SNAPSHOT).expect("write snapshot");
    (dir, graph)
}

fn run_json(dir: &Path, graph: &Path, args: &[&str]) -> Value {
    let output = dg_cmd(dir)
        .arg("--graph")
        .arg(graph)
        .args(args)
        .arg("--json")
        .output()
        .expect("dg should not crash");
    assert!(
        output.status.success(),
        "dg {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON")
}

fn ids(nodes: &Value) -> Vec<&str> {
    nodes
        .as_array()
        .expect("array")
        .iter()
        .map(|n| n["id"].as_str().expect("id"))
        .collect()
}

#[test]
fn stats_counts_labels_and_types() {
    let (dir, graph) = setup();
    let json = run_json(dir.path(), &graph, &["stats"]);
    assert_eq!(json["node_count"], 7);
    assert_eq!(json["relationship_count"], 8);
    assert_eq!(json["nodes_by_label"]["EC2"], 3);
    assert_eq!(json["relationships_by_type"]["DEPENDS_ON"], 4);
    assert!(json["content_hash"].as_str().unwrap().starts_with("blake3:"));
}

#[test]
fn node_lists_incident_relationships() {
    let (dir, graph) = setup();
    let json = run_json(dir.path(), &graph, &["node", "subnet-a"]);
    assert_eq!(json["node"]["properties"]["id"], "subnet-123");
    assert_eq!(json["outgoing"].as_array().unwrap().len(), 1);
    assert_eq!(json["incoming"].as_array().unwrap().len(), 3);
}

#[test]
fn path_is_undirected() {
    let (dir, graph) = setup();
    let json = run_json(dir.path(), &graph, &["path", "vpc-1", "sg-web"]);
    assert_eq!(json["length"], 3);
    let nodes = ids(&json["nodes"]);
    assert_eq!(nodes.first(), Some(&"vpc-1"));
    assert_eq!(nodes.last(), Some(&"sg-web"));
}

#[test]
fn impact_respects_depth_flag() {
    let (dir, graph) = setup();
    let json = run_json(dir.path(), &graph, &["impact", "sg-web", "--depth", "1"]);
    assert_eq!(json["depth"], 1);
    let mut reached = ids(&json["nodes"]);
    reached.sort_unstable();
    assert_eq!(reached, ["i-web1", "i-web2", "sg-web"]);
}

#[test]
fn deps_and_dependents() {
    let (dir, graph) = setup();
    let deps = run_json(dir.path(), &graph, &["deps", "i-api"]);
    assert_eq!(ids(&deps["nodes"]), ["subnet-a", "subnet-b"]);
    assert_eq!(deps["direction"], "dependencies");

    let dependents = run_json(dir.path(), &graph, &["dependents", "subnet-a"]);
    assert_eq!(ids(&dependents["nodes"]), ["i-web1", "i-web2", "i-api"]);
}

#[test]
fn critical_uses_threshold() {
    let (dir, graph) = setup();
    let json = run_json(dir.path(), &graph, &["critical", "--min", "3"]);
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["id"], "subnet-a");
    assert_eq!(entries[0]["direct_dependents"], 3);

    let none = run_json(dir.path(), &graph, &["critical", "--min", "4"]);
    assert!(none.as_array().unwrap().is_empty());
}

#[test]
fn match_filters_end_properties() {
    let (dir, graph) = setup();
    let json = run_json(
        dir.path(),
        &graph,
        &[
            "match",
            "--start-label",
            "EC2",
            "--type",
            "DEPENDS_ON",
            "--end-label",
            "Subnet",
            "--where",
            "id=subnet-999",
        ],
    );
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["start"]["id"], "i-api");
    assert_eq!(rows[0]["end"]["id"], "subnet-b");
}

#[test]
fn text_mode_is_tab_separated() {
    let (dir, graph) = setup();
    dg_cmd(dir.path())
        .arg("--graph")
        .arg(&graph)
        .args(["--format", "text", "neighbors", "subnet-a"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vpc-1\tResource,VPC"))
        .stdout(predicate::str::contains("i-api\tDrifted,EC2,Resource"));
}

#[test]
fn pretty_mode_has_sections() {
    let (dir, graph) = setup();
    dg_cmd(dir.path())
        .env("FORMAT", "pretty")
        .arg("--graph")
        .arg(&graph)
        .args(["stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Graph"))
        .stdout(predicate::str::contains("Relationship types"));
}

#[test]
fn export_dot_and_json() {
    let (dir, graph) = setup();
    dg_cmd(dir.path())
        .arg("--graph")
        .arg(&graph)
        .args(["export", "--dot"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("digraph {"))
        .stdout(predicate::str::contains("SECURES"));

    let output = dg_cmd(dir.path())
        .arg("--graph")
        .arg(&graph)
        .arg("export")
        .output()
        .expect("export");
    assert!(output.status.success());
    let exported = dir.path().join("exported.json");
    std::fs::write(&exported, &output.stdout).expect("write export");

    // Re-loading the export yields the same content hash.
    let original = run_json(dir.path(), &graph, &["stats"]);
    let reloaded = run_json(dir.path(), &exported, &["stats"]);
    assert_eq!(original["content_hash"], reloaded["content_hash"]);
}

#[test]
fn graph_env_var_is_used() {
    let (dir, graph) = setup();
    dg_cmd(dir.path())
        .env("DRIFTGRAPH_GRAPH", &graph)
        .args(["--format", "text", "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nodes\t7"));
}
