//! `dg match`: one-hop pattern queries.
//!
//! ```text
//! dg match --start-label EC2 --type DEPENDS_ON --end-label Subnet --where id=subnet-123
//! ```
//!
//! `--where` values are read as JSON when they parse (`port=443`,
//! `public=true`) and as plain strings otherwise.

use anyhow::{Context, Result};
use clap::Args;
use driftgraph_core::{GraphDatabase, Node, Pattern, parse_filter};
use serde::Serialize;
use std::io::Write;

use crate::output::{OutputMode, label_list, pretty_section, render_mode};

/// Arguments for `dg match`.
#[derive(Args, Debug)]
pub struct MatchArgs {
    /// Label the start node must hold (repeatable).
    #[arg(long = "start-label", value_name = "LABEL")]
    pub start_labels: Vec<String>,

    /// Relationship type to follow (any type if omitted).
    #[arg(long = "type", value_name = "TYPE")]
    pub rel_type: Option<String>,

    /// Label the end node must hold (repeatable).
    #[arg(long = "end-label", value_name = "LABEL")]
    pub end_labels: Vec<String>,

    /// End-node property filter `key=value` (repeatable).
    #[arg(long = "where", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,
}

impl MatchArgs {
    fn to_pattern(&self) -> Result<Pattern> {
        let mut pattern = Pattern::new();
        for label in &self.start_labels {
            pattern = pattern.start_label(label.as_str());
        }
        if let Some(rel_type) = &self.rel_type {
            pattern = pattern.rel_type(rel_type.as_str());
        }
        for label in &self.end_labels {
            pattern = pattern.end_label(label.as_str());
        }
        for raw in &self.filters {
            let (key, value) = parse_filter(raw).context("invalid --where filter")?;
            pattern = pattern.end_property(key, value);
        }
        Ok(pattern)
    }
}

#[derive(Debug, Serialize)]
struct MatchRow {
    start: Node,
    end: Node,
}

pub fn run_match(args: &MatchArgs, db: &GraphDatabase, output: OutputMode) -> Result<()> {
    let pattern = args.to_pattern()?;
    let rows: Vec<MatchRow> = db
        .match_pattern(&pattern)
        .into_iter()
        .map(|(start, end)| MatchRow { start, end })
        .collect();

    let rel = pattern
        .rel_type
        .as_ref()
        .map_or_else(|| "*".to_string(), ToString::to_string);

    render_mode(
        output,
        &rows,
        |rows, w| {
            for row in rows {
                writeln!(w, "{}\t{}", row.start.id, row.end.id)?;
            }
            Ok(())
        },
        |rows, w| {
            pretty_section(w, &format!("Matches ({})", rows.len()))?;
            for row in rows {
                writeln!(
                    w,
                    "  ({} [{}]) -[{rel}]-> ({} [{}])",
                    row.start.id,
                    label_list(&row.start),
                    row.end.id,
                    label_list(&row.end)
                )?;
            }
            Ok(())
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftgraph_core::RelationshipType;
    use serde_json::json;

    fn args(start: &[&str], rel_type: Option<&str>, end: &[&str], filters: &[&str]) -> MatchArgs {
        MatchArgs {
            start_labels: start.iter().map(ToString::to_string).collect(),
            rel_type: rel_type.map(ToString::to_string),
            end_labels: end.iter().map(ToString::to_string).collect(),
            filters: filters.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn flags_build_pattern() {
        let pattern = args(
            &["EC2"],
            Some("DEPENDS_ON"),
            &["Subnet"],
            &["id=subnet-123", "public=true"],
        )
        .to_pattern()
        .unwrap();
        assert_eq!(pattern.start_labels, ["EC2"]);
        assert_eq!(pattern.rel_type, Some(RelationshipType::DependsOn));
        assert_eq!(pattern.end_labels, ["Subnet"]);
        assert_eq!(pattern.end_filter["id"], json!("subnet-123"));
        assert_eq!(pattern.end_filter["public"], json!(true));
    }

    #[test]
    fn malformed_filter_is_rejected() {
        let err = args(&[], None, &[], &["nokey"]).to_pattern().unwrap_err();
        assert!(format!("{err:#}").contains("invalid --where filter"));
    }
}
