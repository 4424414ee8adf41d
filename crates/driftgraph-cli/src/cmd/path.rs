//! `dg path`: shortest undirected route between two nodes.

use anyhow::Result;
use clap::Args;
use driftgraph_core::GraphDatabase;
use std::io::Write;

use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `dg path`.
#[derive(Args, Debug)]
pub struct PathArgs {
    /// Start node id.
    pub from: String,
    /// End node id.
    pub to: String,
}

pub fn run_path(args: &PathArgs, db: &GraphDatabase, output: OutputMode) -> Result<()> {
    let path = db.find_path(&args.from, &args.to)?;

    render_mode(
        output,
        &path,
        |p, w| {
            writeln!(w, "{}", p.node_ids().join(" "))?;
            for rel in &p.relationships {
                writeln!(w, "{}\t{}\t{}\t{}", rel.id, rel.start_node, rel.rel_type, rel.end_node)?;
            }
            Ok(())
        },
        |p, w| {
            pretty_section(w, &format!("Path {} → {}", args.from, args.to))?;
            pretty_kv(w, "Hops", p.length.to_string())?;
            writeln!(w)?;
            if let Some(first) = p.nodes.first() {
                writeln!(w, "  {first}")?;
            }
            for (rel, node) in p.relationships.iter().zip(p.nodes.iter().skip(1)) {
                // Show the stored direction even when walked backwards.
                let arrow = if rel.end_node == node.id {
                    format!("-[{}]->", rel.rel_type)
                } else {
                    format!("<-[{}]-", rel.rel_type)
                };
                writeln!(w, "    {arrow}")?;
                writeln!(w, "  {node}")?;
            }
            Ok(())
        },
    )
}
