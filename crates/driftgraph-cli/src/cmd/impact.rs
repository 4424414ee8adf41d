//! `dg impact`: everything within N undirected hops of a node.

use anyhow::Result;
use clap::Args;
use driftgraph_core::GraphDatabase;
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::Write;

use crate::cmd::node::require_node;
use crate::output::{OutputMode, join_labels, pretty_kv, pretty_section, render_mode};

/// Arguments for `dg impact`.
#[derive(Args, Debug)]
pub struct ImpactArgs {
    /// Start node id.
    pub id: String,

    /// Maximum hop count (default: `[query] default_depth`).
    #[arg(long)]
    pub depth: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ImpactEntry {
    id: String,
    labels: BTreeSet<String>,
    distance: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<String>,
}

#[derive(Debug, Serialize)]
struct ImpactReport {
    start: String,
    depth: usize,
    nodes: Vec<ImpactEntry>,
}

pub fn run_impact(
    args: &ImpactArgs,
    default_depth: usize,
    db: &GraphDatabase,
    output: OutputMode,
) -> Result<()> {
    require_node(db, &args.id)?;
    let depth = args.depth.unwrap_or(default_depth);
    let result = db.find_impact_radius(&args.id, depth);

    let nodes = result
        .nodes
        .iter()
        .map(|node| ImpactEntry {
            id: node.id.clone(),
            labels: node.labels.clone(),
            distance: result.distances.get(&node.id).copied().unwrap_or_default(),
            parent: result.parents.get(&node.id).cloned(),
        })
        .collect();
    let report = ImpactReport {
        start: args.id.clone(),
        depth,
        nodes,
    };

    render_mode(
        output,
        &report,
        |r, w| {
            for entry in &r.nodes {
                writeln!(
                    w,
                    "{}\t{}\t{}",
                    entry.distance,
                    entry.id,
                    join_labels(&entry.labels)
                )?;
            }
            Ok(())
        },
        |r, w| {
            pretty_section(w, &format!("Impact radius of {}", r.start))?;
            pretty_kv(w, "Depth", r.depth.to_string())?;
            pretty_kv(w, "Reached", r.nodes.len().to_string())?;
            writeln!(w)?;
            for entry in &r.nodes {
                let indent = "  ".repeat(entry.distance + 1);
                writeln!(w, "{indent}{} [{}]", entry.id, join_labels(&entry.labels))?;
            }
            Ok(())
        },
    )
}
