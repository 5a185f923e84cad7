//! Environment-based sizing and feature defaults

use crate::errors::{ResolveError, ResolveResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Size used when an environment has no entry in `environment_defaults`
pub const FALLBACK_SIZE: &str = "small";

/// Process-wide sizing table, read-only after load
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SizingDefaults {
    /// environment -> default t-shirt size
    #[serde(default)]
    pub environment_defaults: BTreeMap<String, String>,
    /// pattern -> size -> SKU string or parameter object
    #[serde(default)]
    pub common_skus: BTreeMap<String, BTreeMap<String, Value>>,
    /// feature -> environment -> enabled
    #[serde(default)]
    pub conditional_features: BTreeMap<String, BTreeMap<String, bool>>,
}

impl SizingDefaults {
    /// Parse a sizing table; an empty document yields empty defaults
    pub fn from_yaml_str(content: &str) -> ResolveResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let parsed: Option<Self> = serde_yaml::from_str(content)
            .map_err(|e| ResolveError::catalog(format!("invalid sizing defaults: {}", e)))?;
        Ok(parsed.unwrap_or_default())
    }

    /// Load the sizing table from disk; a missing file yields empty defaults
    pub fn load(path: &Path) -> ResolveResult<Self> {
        if !path.exists() {
            warn!("Sizing defaults file not found: {:?}", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| ResolveError::catalog(format!("failed to read {:?}: {}", path, e)))?;
        let defaults = Self::from_yaml_str(&content)?;

        info!(
            "Loaded sizing defaults: {} environments, {} common SKU tables, {} conditional features",
            defaults.environment_defaults.len(),
            defaults.common_skus.len(),
            defaults.conditional_features.len()
        );
        Ok(defaults)
    }

    /// Default t-shirt size for an environment
    pub fn default_size(&self, environment: &str) -> &str {
        self.environment_defaults.get(environment).map(String::as_str).unwrap_or(FALLBACK_SIZE)
    }

    /// Fallback SKU entry for a pattern at a given size
    pub fn common_sku(&self, pattern: &str, size: &str) -> Option<&Value> {
        self.common_skus.get(pattern)?.get(size)
    }

    /// Environment default for a conditional feature; `false` when unlisted
    pub fn conditional_default(&self, feature: &str, environment: &str) -> bool {
        self.conditional_features
            .get(feature)
            .and_then(|envs| envs.get(environment))
            .copied()
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SIZING: &str = r#"
environment_defaults:
  dev: small
  staging: medium
  prod: large
common_skus:
  keyvault:
    small: standard
    large: premium
  postgresql:
    small: {sku_name: B_Standard_B1ms, storage_mb: 32768}
conditional_features:
  enable_diagnostics: {dev: false, staging: true, prod: true}
  geo_redundant_backup: {prod: true}
"#;

    #[test]
    fn test_default_size() {
        let defaults = SizingDefaults::from_yaml_str(SIZING).unwrap();
        assert_eq!(defaults.default_size("dev"), "small");
        assert_eq!(defaults.default_size("prod"), "large");
        assert_eq!(defaults.default_size("qa"), FALLBACK_SIZE);
    }

    #[test]
    fn test_common_sku_lookup() {
        let defaults = SizingDefaults::from_yaml_str(SIZING).unwrap();
        assert_eq!(defaults.common_sku("keyvault", "large"), Some(&Value::from("premium")));
        assert!(defaults.common_sku("keyvault", "medium").is_none());
        assert!(defaults.common_sku("postgresql", "small").unwrap().is_object());
        assert!(defaults.common_sku("mongodb", "small").is_none());
    }

    #[test]
    fn test_conditional_default() {
        let defaults = SizingDefaults::from_yaml_str(SIZING).unwrap();
        assert!(defaults.conditional_default("enable_diagnostics", "prod"));
        assert!(!defaults.conditional_default("enable_diagnostics", "dev"));
        assert!(!defaults.conditional_default("geo_redundant_backup", "staging"));
        assert!(!defaults.conditional_default("unknown_feature", "prod"));
    }

    #[test]
    fn test_empty_document() {
        let defaults = SizingDefaults::from_yaml_str("").unwrap();
        assert_eq!(defaults, SizingDefaults::default());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let defaults = SizingDefaults::load(&dir.path().join("sizing.yaml")).unwrap();
        assert!(defaults.environment_defaults.is_empty());
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sizing.yaml");
        fs::write(&path, "environment_defaults: [dev, prod]\n").unwrap();
        assert!(matches!(SizingDefaults::load(&path), Err(ResolveError::Catalog { .. })));
    }
}
