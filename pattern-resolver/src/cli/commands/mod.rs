//! Command implementations
//!
//! Every command returns whether all of its documents were valid; `main`
//! turns that into the process exit status.

pub mod cost;
pub mod dry_run;
pub mod patterns;
pub mod resolve;
pub mod validate;

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use pattern_resolver_core::catalog;
use pattern_resolver_core::{
    Orchestrator, ParsedDocument, PatternCatalog, PatternResolver, ResolverConfig, SizingDefaults,
    parse_documents,
};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Report format for commands without a variable-file output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Catalog and sizing table, loaded once per invocation
#[derive(Debug)]
pub struct Engine {
    pub catalog: PatternCatalog,
    pub defaults: SizingDefaults,
}

impl Engine {
    pub fn load(config: &ResolverConfig) -> Result<Self> {
        let (catalog, defaults) = catalog::load(config).with_context(|| {
            format!("Failed to load patterns from {:?}", config.patterns_dir)
        })?;
        debug!("Engine ready with {} patterns", catalog.len());
        Ok(Self { catalog, defaults })
    }

    pub fn resolver(&self) -> PatternResolver<'_> {
        PatternResolver::new(&self.catalog, &self.defaults)
    }

    pub fn orchestrator(&self) -> Orchestrator<'_> {
        Orchestrator::new(self.resolver())
    }
}

/// Read and split a request file; a file with no documents is an error
pub fn read_documents(path: &Path) -> Result<Vec<ParsedDocument>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read request file: {:?}", path))?;
    let documents = parse_documents(&content);

    if documents.is_empty() {
        bail!("No documents found in {:?}", path);
    }
    debug!("Read {} documents from {:?}", documents.len(), path);
    Ok(documents)
}

/// Plain rendering of a catalog list entry
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use tempfile::TempDir;

    pub const KEYVAULT: &str = r#"
name: keyvault
description: |
  Secret storage
  with private networking
category: single-resource
components: [keyvault, private-endpoint]
use_cases: [application secrets]
config:
  required: [name]
  optional:
    - soft_delete_days: {type: integer, default: 7}
sizing:
  small:
    dev: {sku: standard}
estimated_costs:
  small: {dev: 5}
"#;

    pub const SIZING: &str = "environment_defaults: {dev: small, staging: medium, prod: large}\n";

    pub const VALID_REQUEST: &str = r#"
metadata:
  project: myapp
  environment: dev
  business_unit: eng
  owners: [team@example.com]
pattern: keyvault
pattern_version: "1.0.0"
config:
  name: secrets
"#;

    /// Temp workspace holding a one-pattern catalog and a sizing table
    pub fn engine() -> (TempDir, Engine) {
        let dir = TempDir::new().unwrap();
        let patterns = dir.path().join("patterns");
        fs::create_dir(&patterns).unwrap();
        fs::write(patterns.join("keyvault.yaml"), KEYVAULT).unwrap();
        let sizing = dir.path().join("sizing-defaults.yaml");
        fs::write(&sizing, SIZING).unwrap();

        let config = ResolverConfig::default().with_overrides(Some(patterns), Some(sizing));
        let engine = Engine::load(&config).unwrap();
        (dir, engine)
    }

    pub fn request_file(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("request.yaml");
        fs::write(&path, content).unwrap();
        path
    }
}
