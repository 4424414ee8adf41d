//! JSON graph snapshots: `{ "nodes": [...], "relationships": [...] }`.
//!
//! Nodes are inserted before relationships, so relationship order within the
//! file does not matter. A relationship naming a node the file does not
//! define aborts the load.

use std::path::Path;

use anyhow::{Context, Result};
use driftgraph_core::{GraphDatabase, Node, Relationship};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl Snapshot {
    /// Copy a database into snapshot form, ids ascending.
    pub fn from_database(db: &GraphDatabase) -> Self {
        db.read(|store| Self {
            nodes: store.get_all_nodes().into_iter().cloned().collect(),
            relationships: store
                .get_all_relationships()
                .into_iter()
                .cloned()
                .collect(),
        })
    }

    /// Load the snapshot into a fresh database under one write lock.
    pub fn into_database(self) -> Result<GraphDatabase> {
        let db = GraphDatabase::new();
        db.write(|store| -> Result<()> {
            for node in self.nodes {
                store.add_node(node);
            }
            for rel in self.relationships {
                let id = rel.id.clone();
                store
                    .add_relationship(rel)
                    .with_context(|| format!("relationship `{id}`"))?;
            }
            Ok(())
        })?;
        Ok(db)
    }
}

/// Read and load a snapshot file.
pub fn load_snapshot(path: &Path) -> Result<GraphDatabase> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let db = snapshot
        .into_database()
        .with_context(|| format!("Failed to load {}", path.display()))?;

    info!(
        path = %path.display(),
        nodes = db.node_count(),
        relationships = db.relationship_count(),
        "snapshot loaded"
    );
    Ok(db)
}
