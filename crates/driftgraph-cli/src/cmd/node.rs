//! `dg node` and `dg neighbors`: single-node inspection.

use anyhow::Result;
use clap::Args;
use driftgraph_core::{GraphDatabase, GraphError, Node, Relationship};
use serde::Serialize;
use std::io::Write;

use crate::output::{
    OutputMode, label_list, pretty_kv, pretty_section, render_mode, text_node_row,
};

/// Arguments for `dg node`.
#[derive(Args, Debug)]
pub struct NodeArgs {
    /// Node id.
    pub id: String,
}

/// Arguments for `dg neighbors`.
#[derive(Args, Debug)]
pub struct NeighborsArgs {
    /// Node id.
    pub id: String,
}

#[derive(Debug, Serialize)]
struct NodeReport {
    node: Node,
    outgoing: Vec<Relationship>,
    incoming: Vec<Relationship>,
}

/// Fail with `NodeNotFound` unless `id` is in the graph.
pub fn require_node(db: &GraphDatabase, id: &str) -> Result<Node> {
    db.get_node(id)
        .ok_or_else(|| GraphError::NodeNotFound { id: id.to_string() }.into())
}

pub fn run_node(args: &NodeArgs, db: &GraphDatabase, output: OutputMode) -> Result<()> {
    let report = db.read(|store| {
        store.get_node(&args.id).map(|node| NodeReport {
            node: node.clone(),
            outgoing: store
                .get_outgoing_relationships(&args.id)
                .into_iter()
                .cloned()
                .collect(),
            incoming: store
                .get_incoming_relationships(&args.id)
                .into_iter()
                .cloned()
                .collect(),
        })
    });
    let Some(report) = report else {
        return Err(GraphError::NodeNotFound {
            id: args.id.clone(),
        }
        .into());
    };

    render_mode(
        output,
        &report,
        |r, w| {
            text_node_row(w, &r.node)?;
            for (key, value) in &r.node.properties {
                writeln!(w, "prop\t{key}\t{value}")?;
            }
            for rel in &r.outgoing {
                writeln!(w, "out\t{}\t{}\t{}", rel.id, rel.rel_type, rel.end_node)?;
            }
            for rel in &r.incoming {
                writeln!(w, "in\t{}\t{}\t{}", rel.id, rel.rel_type, rel.start_node)?;
            }
            Ok(())
        },
        |r, w| {
            pretty_section(w, &format!("Node {}", r.node.id))?;
            pretty_kv(w, "Labels", label_list(&r.node))?;
            for (key, value) in &r.node.properties {
                pretty_kv(w, key, value.to_string())?;
            }
            if !r.outgoing.is_empty() {
                writeln!(w)?;
                pretty_section(w, "Outgoing")?;
                for rel in &r.outgoing {
                    writeln!(w, "  -[{}]-> {}  ({})", rel.rel_type, rel.end_node, rel.id)?;
                }
            }
            if !r.incoming.is_empty() {
                writeln!(w)?;
                pretty_section(w, "Incoming")?;
                for rel in &r.incoming {
                    writeln!(w, "  <-[{}]- {}  ({})", rel.rel_type, rel.start_node, rel.id)?;
                }
            }
            Ok(())
        },
    )
}

pub fn run_neighbors(args: &NeighborsArgs, db: &GraphDatabase, output: OutputMode) -> Result<()> {
    require_node(db, &args.id)?;
    let neighbors = db.get_neighbors(&args.id);

    render_mode(
        output,
        &neighbors,
        |nodes, w| {
            for node in nodes {
                text_node_row(w, node)?;
            }
            Ok(())
        },
        |nodes, w| {
            pretty_section(w, &format!("Neighbors of {} ({})", args.id, nodes.len()))?;
            for node in nodes {
                writeln!(w, "  {node}")?;
            }
            Ok(())
        },
    )
}
