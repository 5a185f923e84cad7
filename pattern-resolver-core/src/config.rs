//! Resolver configuration
//!
//! Points the engine at its pattern definitions and sizing table. Everything is
//! defaulted so a bare checkout works without a config file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for the resolver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Directory holding one YAML file per pattern
    pub patterns_dir: PathBuf,

    /// Sizing defaults YAML file
    pub sizing_file: PathBuf,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            patterns_dir: PathBuf::from("config/patterns"),
            sizing_file: PathBuf::from("config/sizing-defaults.yaml"),
        }
    }
}

impl ResolverConfig {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply command-line overrides
    pub fn with_overrides(mut self, patterns_dir: Option<PathBuf>, sizing_file: Option<PathBuf>) -> Self {
        if let Some(dir) = patterns_dir {
            self.patterns_dir = dir;
        }
        if let Some(file) = sizing_file {
            self.sizing_file = file;
        }
        self
    }
}
