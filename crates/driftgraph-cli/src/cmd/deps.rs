//! `dg deps`, `dg dependents` and `dg critical`.
//!
//! # Edge Direction
//!
//! `A -[DEPENDS_ON]-> B` means "A needs B".
//! `dg deps A` lists what A needs; `dg dependents B` lists what breaks if B
//! changes. Only `DEPENDS_ON` edges are followed.

use anyhow::Result;
use clap::Args;
use driftgraph_core::{GraphDatabase, Node};
use serde::Serialize;
use std::io::Write;

use crate::cmd::node::require_node;
use crate::output::{OutputMode, label_list, pretty_kv, pretty_section, render_mode, text_node_row};

/// Arguments for `dg deps` and `dg dependents`.
#[derive(Args, Debug)]
pub struct ClosureArgs {
    /// Node id.
    pub id: String,

    /// Maximum hop count (default: `[query] default_depth`).
    #[arg(long)]
    pub depth: Option<usize>,
}

/// Arguments for `dg critical`.
#[derive(Args, Debug)]
pub struct CriticalArgs {
    /// Minimum number of direct dependents (default:
    /// `[query] critical_min_dependents`).
    #[arg(long)]
    pub min: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Dependencies,
    Dependents,
}

impl Direction {
    const fn title(self) -> &'static str {
        match self {
            Self::Dependencies => "Dependencies",
            Self::Dependents => "Dependents",
        }
    }
}

#[derive(Debug, Serialize)]
struct ClosureReport {
    start: String,
    direction: Direction,
    depth: usize,
    nodes: Vec<Node>,
}

#[derive(Debug, Serialize)]
struct CriticalEntry {
    #[serde(flatten)]
    node: Node,
    direct_dependents: usize,
}

pub fn run_closure(
    args: &ClosureArgs,
    direction: Direction,
    default_depth: usize,
    db: &GraphDatabase,
    output: OutputMode,
) -> Result<()> {
    require_node(db, &args.id)?;
    let depth = args.depth.unwrap_or(default_depth);
    let nodes = match direction {
        Direction::Dependencies => db.find_dependencies(&args.id, depth),
        Direction::Dependents => db.find_dependents(&args.id, depth),
    };
    let report = ClosureReport {
        start: args.id.clone(),
        direction,
        depth,
        nodes,
    };

    render_mode(
        output,
        &report,
        |r, w| {
            for node in &r.nodes {
                text_node_row(w, node)?;
            }
            Ok(())
        },
        |r, w| {
            pretty_section(w, &format!("{} of {}", r.direction.title(), r.start))?;
            pretty_kv(w, "Depth", r.depth.to_string())?;
            pretty_kv(w, "Count", r.nodes.len().to_string())?;
            if !r.nodes.is_empty() {
                writeln!(w)?;
            }
            for node in &r.nodes {
                writeln!(w, "  {:<32} {}", node.id, label_list(node))?;
            }
            Ok(())
        },
    )
}

pub fn run_critical(
    args: &CriticalArgs,
    default_min: usize,
    db: &GraphDatabase,
    output: OutputMode,
) -> Result<()> {
    let min = args.min.unwrap_or(default_min);
    let entries: Vec<CriticalEntry> = db
        .critical_nodes_ranked(min)
        .into_iter()
        .map(|(node, direct_dependents)| CriticalEntry {
            node,
            direct_dependents,
        })
        .collect();

    render_mode(
        output,
        &entries,
        |entries, w| {
            for entry in entries {
                writeln!(
                    w,
                    "{}\t{}\t{}",
                    entry.direct_dependents,
                    entry.node.id,
                    label_list(&entry.node)
                )?;
            }
            Ok(())
        },
        |entries, w| {
            pretty_section(w, &format!("Critical nodes (≥ {min} direct dependents)"))?;
            if entries.is_empty() {
                writeln!(w, "  none")?;
            }
            for entry in entries {
                writeln!(
                    w,
                    "  {:>4}  {:<32} {}",
                    entry.direct_dependents,
                    entry.node.id,
                    label_list(&entry.node)
                )?;
            }
            Ok(())
        },
    )
}
