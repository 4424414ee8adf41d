//! `dg stats`: snapshot summary.

use anyhow::Result;
use driftgraph_core::{GraphDatabase, GraphStats};
use serde::Serialize;
use std::io::Write;

use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

#[derive(Debug, Serialize)]
struct StatsReport {
    #[serde(flatten)]
    stats: GraphStats,
    content_hash: String,
}

pub fn run_stats(db: &GraphDatabase, output: OutputMode) -> Result<()> {
    let report = db.read(|store| StatsReport {
        stats: store.stats(),
        content_hash: store.content_hash(),
    });

    render_mode(
        output,
        &report,
        |r, w| {
            writeln!(w, "nodes\t{}", r.stats.node_count)?;
            writeln!(w, "relationships\t{}", r.stats.relationship_count)?;
            for (label, count) in &r.stats.nodes_by_label {
                writeln!(w, "label\t{label}\t{count}")?;
            }
            for (rel_type, count) in &r.stats.relationships_by_type {
                writeln!(w, "type\t{rel_type}\t{count}")?;
            }
            writeln!(w, "hash\t{}", r.content_hash)
        },
        |r, w| {
            pretty_section(w, "Graph")?;
            pretty_kv(w, "Nodes", r.stats.node_count.to_string())?;
            pretty_kv(w, "Rels", r.stats.relationship_count.to_string())?;
            pretty_kv(w, "Hash", &r.content_hash)?;
            if !r.stats.nodes_by_label.is_empty() {
                writeln!(w)?;
                pretty_section(w, "Labels")?;
                for (label, count) in &r.stats.nodes_by_label {
                    writeln!(w, "  {label:<24} {count:>6}")?;
                }
            }
            if !r.stats.relationships_by_type.is_empty() {
                writeln!(w)?;
                pretty_section(w, "Relationship types")?;
                for (rel_type, count) in &r.stats.relationships_by_type {
                    writeln!(w, "  {rel_type:<24} {count:>6}")?;
                }
            }
            Ok(())
        },
    )
}
