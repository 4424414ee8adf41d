#![forbid(unsafe_code)]

mod cmd;
mod output;
mod snapshot;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use driftgraph_core::GraphDatabase;
use driftgraph_core::config::{EffectiveConfig, resolve_config};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "dg: query infrastructure dependency graphs",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Graph snapshot (JSON). Defaults to `[snapshot] path` in
    /// `.driftgraph/config.toml`.
    #[arg(long, global = true, env = "DRIFTGRAPH_GRAPH", value_name = "FILE")]
    graph: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Inspect",
        about = "Summarize the graph",
        long_about = "Show node/relationship counts per label and type plus the content hash.",
        after_help = "EXAMPLES:\n    # Summarize a snapshot\n    dg --graph graph.json stats\n\n    # Emit machine-readable output\n    dg stats --json"
    )]
    Stats,

    #[command(
        next_help_heading = "Inspect",
        about = "Show one node",
        long_about = "Show a node's labels, properties and incident relationships.",
        after_help = "EXAMPLES:\n    # Show a node\n    dg node i-0abc123\n\n    # Emit machine-readable output\n    dg node i-0abc123 --json"
    )]
    Node(cmd::node::NodeArgs),

    #[command(
        next_help_heading = "Inspect",
        about = "List adjacent nodes",
        long_about = "List distinct nodes one relationship away, in either direction.",
        after_help = "EXAMPLES:\n    # Neighbors of a subnet\n    dg neighbors subnet-123"
    )]
    Neighbors(cmd::node::NeighborsArgs),

    #[command(
        next_help_heading = "Traverse",
        about = "Find a shortest path",
        long_about = "Find a shortest path between two nodes, ignoring edge direction.",
        after_help = "EXAMPLES:\n    # Route from an instance to its VPC\n    dg path i-0abc123 vpc-1"
    )]
    Path(cmd::path::PathArgs),

    #[command(
        next_help_heading = "Traverse",
        about = "Show the impact radius of a node",
        long_about = "List every node within --depth undirected hops of a node.",
        after_help = "EXAMPLES:\n    # What could a drifted security group touch?\n    dg impact sg-1 --depth 2"
    )]
    Impact(cmd::impact::ImpactArgs),

    #[command(
        next_help_heading = "Dependencies",
        about = "List what a node depends on",
        long_about = "Follow outgoing DEPENDS_ON edges up to --depth hops.",
        after_help = "EXAMPLES:\n    # Direct and second-level dependencies\n    dg deps app-1 --depth 2"
    )]
    Deps(cmd::deps::ClosureArgs),

    #[command(
        next_help_heading = "Dependencies",
        about = "List what depends on a node",
        long_about = "Follow incoming DEPENDS_ON edges up to --depth hops.",
        after_help = "EXAMPLES:\n    # Who breaks if this subnet changes?\n    dg dependents subnet-123"
    )]
    Dependents(cmd::deps::ClosureArgs),

    #[command(
        next_help_heading = "Dependencies",
        about = "List nodes with many direct dependents",
        long_about = "List nodes with at least --min direct DEPENDS_ON dependents, highest first.",
        after_help = "EXAMPLES:\n    # Nodes at least five resources depend on\n    dg critical --min 5"
    )]
    Critical(cmd::deps::CriticalArgs),

    #[command(
        next_help_heading = "Query",
        about = "Match a one-hop pattern",
        long_about = "Match (start)-[type]->(end) by labels, relationship type and end-node properties.",
        after_help = "EXAMPLES:\n    # Instances depending on a given subnet\n    dg match --start-label EC2 --type DEPENDS_ON --end-label Subnet --where id=subnet-123"
    )]
    Match(cmd::match_cmd::MatchArgs),

    #[command(
        next_help_heading = "Query",
        about = "Export the graph",
        long_about = "Write the loaded graph as normalized snapshot JSON or Graphviz DOT.",
        after_help = "EXAMPLES:\n    # Render to SVG\n    dg export --dot | dot -Tsvg > graph.svg"
    )]
    Export(cmd::export::ExportArgs),

    #[command(
        next_help_heading = "Maintenance",
        about = "Generate shell completion scripts",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    dg completions bash"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

/// Default `EnvFilter` directives when `DRIFTGRAPH_LOG` is unset.
///
/// The binary's own events log under the `dg` target, the engine's under
/// `driftgraph_core`.
const fn default_log_directives(verbose: bool) -> &'static str {
    if verbose {
        "driftgraph=debug,dg=debug,info"
    } else {
        "driftgraph=info,dg=info,warn"
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("DRIFTGRAPH_LOG").unwrap_or_else(|_| {
        EnvFilter::new(default_log_directives(
            verbose || env::var("DEBUG").is_ok(),
        ))
    });

    let format = env::var("DRIFTGRAPH_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(io::stderr))
                .init();
        }
        _ => {
            registry
                .with(
                    fmt::layer()
                        .compact()
                        .with_ansi(io::stderr().is_terminal())
                        .with_writer(io::stderr),
                )
                .init();
        }
    }
}

/// Open the snapshot named by `--graph`, `DRIFTGRAPH_GRAPH` or config.
fn open_graph(cli: &Cli, config: &EffectiveConfig) -> anyhow::Result<GraphDatabase> {
    let path = cli
        .graph
        .clone()
        .or_else(|| config.snapshot_path())
        .context("no graph snapshot given; pass --graph <FILE> or set [snapshot] path in .driftgraph/config.toml")?;
    snapshot::load_snapshot(&path)
}

fn run(cli: &Cli, config: &EffectiveConfig, output: OutputMode) -> anyhow::Result<()> {
    let query = &config.project.query;

    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let db = open_graph(cli, config)?;

    match &cli.command {
        Commands::Stats => cmd::stats::run_stats(&db, output),
        Commands::Node(args) => cmd::node::run_node(args, &db, output),
        Commands::Neighbors(args) => cmd::node::run_neighbors(args, &db, output),
        Commands::Path(args) => cmd::path::run_path(args, &db, output),
        Commands::Impact(args) => {
            cmd::impact::run_impact(args, query.default_depth, &db, output)
        }
        Commands::Deps(args) => cmd::deps::run_closure(
            args,
            cmd::deps::Direction::Dependencies,
            query.default_depth,
            &db,
            output,
        ),
        Commands::Dependents(args) => cmd::deps::run_closure(
            args,
            cmd::deps::Direction::Dependents,
            query.default_depth,
            &db,
            output,
        ),
        Commands::Critical(args) => {
            cmd::deps::run_critical(args, query.critical_min_dependents, &db, output)
        }
        Commands::Match(args) => cmd::match_cmd::run_match(args, &db, output),
        Commands::Export(args) => cmd::export::run_export(args, &db),
        Commands::Completions(_) => Ok(()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = env::current_dir()?;
    let config = match resolve_config(&cwd) {
        Ok(config) => config,
        Err(err) => {
            let output = resolve_output_mode(cli.format, cli.json, None);
            render_error(output, &CliError::from(&err))?;
            std::process::exit(1);
        }
    };
    let output = resolve_output_mode(cli.format, cli.json, config.output_format());
    debug!(?output, project_root = ?config.project_root, "config resolved");

    if let Err(err) = run(&cli, &config, output) {
        render_error(output, &CliError::from(&err))?;
        std::process::exit(1);
    }
    Ok(())
}
