//! Configuration file support for Wharf.
//!
//! Wharf supports two configuration file locations:
//! - Global: `~/.wharf/config.toml` - User-wide defaults
//! - Workspace: `.wharf/config.toml` - Workspace-specific overrides
//!
//! Workspace config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Wharf configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generation settings
    pub generation: GenerationConfig,
}

/// Generation-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Maximum number of targets generated concurrently (None = auto-detect)
    pub max_concurrency: Option<usize>,

    /// Development region for projects that declare none
    pub default_development_region: Option<String>,

    /// Generate targets of one project in parallel
    pub parallel_targets: Option<bool>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.generation.max_concurrency.is_some() {
            self.generation.max_concurrency = other.generation.max_concurrency;
        }
        if other.generation.default_development_region.is_some() {
            self.generation.default_development_region =
                other.generation.default_development_region;
        }
        if other.generation.parallel_targets.is_some() {
            self.generation.parallel_targets = other.generation.parallel_targets;
        }
    }
}

/// Load merged configuration from global and workspace locations.
///
/// Order of precedence (highest to lowest):
/// 1. Workspace config (.wharf/config.toml)
/// 2. Global config (~/.wharf/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, workspace_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if workspace_path.exists() {
        config.merge(Config::load_or_default(workspace_path));
    }

    config
}

/// Get the global wharf config directory (~/.wharf).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".wharf"))
}

/// Get the global config path (~/.wharf/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the workspace config path (.wharf/config.toml).
pub fn workspace_config_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(".wharf").join("config.toml")
}

/// Load the effective configuration for a workspace.
pub fn load_workspace_config(workspace_root: &Path) -> Config {
    let workspace = workspace_config_path(workspace_root);
    match global_config_path() {
        Some(global) => load_config(&global, &workspace),
        None => Config::load_or_default(&workspace),
    }
}
