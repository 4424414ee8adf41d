//! Shared output layer for pretty/text/JSON parity across all `dg` commands.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format` / hidden `--json` flag
//! 2. `FORMAT` env var → `"pretty"` | `"text"` | `"json"`
//! 3. `[output] format` from project or user config
//! 4. Default: [`OutputMode::Pretty`] if stdout is a TTY; [`OutputMode::Text`] if piped.
//!
//! Errors go to stderr in the same mode. In JSON mode the body is
//! `{"error": "...", "code": "E2001", "hint": "..."}`.

use clap::ValueEnum;
use driftgraph_core::{ErrorCode, GraphError, Node};
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::{self, IsTerminal, Write};

/// Shared width for human pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 72;

/// Write a horizontal separator used by pretty human output.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Write a section heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// Render a left-aligned key/value line in human output.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<12} {}", format!("{key}:"), value.as_ref())
}

/// Comma-joined labels, or `-` for an unlabelled node.
pub fn label_list(node: &Node) -> String {
    join_labels(&node.labels)
}

pub fn join_labels(labels: &BTreeSet<String>) -> String {
    if labels.is_empty() {
        "-".to_string()
    } else {
        labels.iter().map(String::as_str).collect::<Vec<_>>().join(",")
    }
}

/// One tab-separated text row per node: `id<TAB>labels`.
pub fn text_node_row(w: &mut dyn Write, node: &Node) -> io::Result<()> {
    writeln!(w, "{}\t{}", node.id, label_list(node))
}

/// The three output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-optimized output (sections, visual framing).
    Pretty,
    /// Token-efficient plain text for agents and pipes.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl OutputMode {
    fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "text" => Some(Self::Text),
            "pretty" => Some(Self::Pretty),
            _ => None,
        }
    }
}

/// Core resolution logic, separated from I/O for testability.
fn resolve_output_mode_inner(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    format_env: Option<&str>,
    config_format: Option<&str>,
    is_tty: bool,
) -> OutputMode {
    if let Some(mode) = format_flag {
        return mode;
    }

    if json_flag {
        return OutputMode::Json;
    }

    // Unknown values fall through to the next source.
    if let Some(mode) = format_env.and_then(OutputMode::from_name) {
        return mode;
    }
    if let Some(mode) = config_format.and_then(OutputMode::from_name) {
        return mode;
    }

    if is_tty {
        OutputMode::Pretty
    } else {
        OutputMode::Text
    }
}

/// Resolve the output mode from CLI flags, environment, config and TTY
/// defaults.
pub fn resolve_output_mode(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    config_format: Option<&str>,
) -> OutputMode {
    let env_val = std::env::var("FORMAT").ok();
    let is_tty = io::stdout().is_terminal();
    resolve_output_mode_inner(
        format_flag,
        json_flag,
        env_val.as_deref(),
        config_format,
        is_tty,
    )
}

/// Render a serializable value with explicit pretty/text renderers.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, &mut out)?,
        OutputMode::Pretty => pretty_fn(value, &mut out)?,
    }
    Ok(())
}

/// A structured error with an optional stable code and hint.
#[derive(Debug, Serialize)]
pub struct CliError {
    /// Human-readable error message, including context.
    pub error: String,
    /// Stable `E####` code when the failure maps to one.
    pub code: Option<&'static str>,
    pub hint: Option<&'static str>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: None,
            hint: None,
        }
    }

    fn with_code(message: String, code: ErrorCode) -> Self {
        Self {
            error: message,
            code: Some(code.code()),
            hint: code.hint(),
        }
    }
}

impl From<&anyhow::Error> for CliError {
    /// Pick the code from the innermost recognizable cause.
    fn from(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");
        for cause in err.chain() {
            if let Some(graph_err) = cause.downcast_ref::<GraphError>() {
                return Self::with_code(message, graph_err.code());
            }
            if cause.downcast_ref::<serde_json::Error>().is_some() {
                return Self::with_code(message, ErrorCode::SnapshotParseError);
            }
            if cause.downcast_ref::<toml::de::Error>().is_some() {
                return Self::with_code(message, ErrorCode::ConfigParseError);
            }
        }
        Self::new(message)
    }
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, error)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            match error.code {
                Some(code) => writeln!(out, "error[{code}]: {}", error.error)?,
                None => writeln!(out, "error: {}", error.error)?,
            }
            if let Some(hint) = error.hint {
                writeln!(out, "  hint: {hint}")?;
            }
        }
    }
    Ok(())
}
