//! `dg export`: write the loaded graph back out.
//!
//! - default: the snapshot JSON (ids ascending), normalized.
//! - `--dot`: Graphviz DOT, for `dg export --dot | dot -Tsvg`.

use anyhow::Result;
use clap::Args;
use driftgraph_core::GraphDatabase;
use std::io::{self, Write};

use crate::snapshot::Snapshot;

/// Arguments for `dg export`.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Emit Graphviz DOT instead of snapshot JSON.
    #[arg(long)]
    pub dot: bool,
}

pub fn run_export(args: &ExportArgs, db: &GraphDatabase) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.dot {
        write!(out, "{}", db.to_dot())?;
    } else {
        serde_json::to_writer_pretty(&mut out, &Snapshot::from_database(db))?;
        writeln!(out)?;
    }
    Ok(())
}
