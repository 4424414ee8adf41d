//! Project and user configuration.
//!
//! - Project: `.driftgraph/config.toml`, found by walking up from the working
//!   directory. Holds query defaults, the default snapshot path and an
//!   optional output mode.
//! - User: `<config_dir>/driftgraph/config.toml`. Holds the preferred output
//!   mode; a project setting wins over it.
//!
//! Missing files fall back to defaults; malformed files are errors.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory marking a project root.
pub const PROJECT_DIR: &str = ".driftgraph";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Hop bound used by impact/dependency queries when none is given.
    #[serde(default = "default_depth")]
    pub default_depth: usize,
    /// Fan-in threshold used by critical-node queries when none is given.
    #[serde(default = "default_critical_min_dependents")]
    pub critical_min_dependents: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_depth: default_depth(),
            critical_min_dependents: default_critical_min_dependents(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Snapshot file, relative to the project root.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// `pretty`, `text` or `json`.
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub user: UserConfig,
    /// Directory containing `.driftgraph/`, if one was found.
    pub project_root: Option<PathBuf>,
}

impl EffectiveConfig {
    /// Snapshot path from the project config, resolved against the root.
    #[must_use]
    pub fn snapshot_path(&self) -> Option<PathBuf> {
        let relative = self.project.snapshot.path.as_ref()?;
        Some(match &self.project_root {
            Some(root) if relative.is_relative() => root.join(relative),
            _ => relative.clone(),
        })
    }

    /// Configured output mode, canonicalized. Unknown values are ignored.
    #[must_use]
    pub fn output_format(&self) -> Option<&'static str> {
        self.project
            .output
            .format
            .as_deref()
            .and_then(normalize_output_mode)
            .or_else(|| {
                self.user
                    .output
                    .format
                    .as_deref()
                    .and_then(normalize_output_mode)
            })
    }
}

/// Walk up from `start` looking for a `.driftgraph` directory.
#[must_use]
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(PROJECT_DIR).is_dir() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(PROJECT_DIR).join("config.toml");
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };
    load_user_config_from(&config_dir.join("driftgraph/config.toml"))
}

fn load_user_config_from(path: &Path) -> Result<UserConfig> {
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load project config (if a project root is found above `start`) and user
/// config.
pub fn resolve_config(start: &Path) -> Result<EffectiveConfig> {
    let project_root = find_project_root(start);
    let project = match &project_root {
        Some(root) => load_project_config(root)?,
        None => ProjectConfig::default(),
    };
    let user = load_user_config()?;

    Ok(EffectiveConfig {
        project,
        user,
        project_root,
    })
}

/// Map a configured output mode to its canonical name.
#[must_use]
pub fn normalize_output_mode(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pretty" | "human" => Some("pretty"),
        "text" | "table" => Some("text"),
        "json" => Some("json"),
        _ => None,
    }
}

const fn default_depth() -> usize {
    3
}

const fn default_critical_min_dependents() -> usize {
    3
}
