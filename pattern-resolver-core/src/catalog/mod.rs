//! Pattern catalog
//!
//! Pattern definitions are loaded once from a directory of YAML files and are
//! read-only afterwards. The optional-config block comes in two shapes in the
//! definition files (a list of single-key mappings or a flat mapping); both are
//! normalized here so nothing downstream has to care.

pub mod sizing;

use crate::config::ResolverConfig;
use crate::errors::{ResolveError, ResolveResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub use sizing::SizingDefaults;

/// Flat parameter set: parameter name to scalar/list/object value
pub type ParamMap = BTreeMap<String, Value>;

/// How a pattern is presented and ordered in listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternCategory {
    SingleResource,
    Composite,
    #[default]
    #[serde(other)]
    Unknown,
}

impl PatternCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleResource => "single-resource",
            Self::Composite => "composite",
            Self::Unknown => "unknown",
        }
    }
}

/// Declaration of one optional config field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionalField {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    /// `Some(Value::Null)` when the definition declares `default: null`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl OptionalField {
    fn from_spec(spec: &Value) -> Self {
        // Non-object specs still declare the field, just without a default
        let Some(obj) = spec.as_object() else {
            return Self::default();
        };

        Self {
            field_type: obj.get("type").and_then(Value::as_str).map(String::from),
            default: obj.get("default").cloned(),
            allowed: obj.get("enum").and_then(Value::as_array).cloned(),
            description: obj.get("description").and_then(Value::as_str).map(String::from),
        }
    }
}

/// Canonical `field -> spec` mapping for a pattern's optional config
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<RawOptionalFields>")]
pub struct OptionalFields(BTreeMap<String, OptionalField>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOptionalFields {
    List(Vec<Value>),
    Map(Map<String, Value>),
}

impl From<Option<RawOptionalFields>> for OptionalFields {
    fn from(raw: Option<RawOptionalFields>) -> Self {
        let mut fields = BTreeMap::new();
        match raw {
            None => {}
            Some(RawOptionalFields::Map(map)) => {
                for (name, spec) in &map {
                    fields.insert(name.clone(), OptionalField::from_spec(spec));
                }
            }
            Some(RawOptionalFields::List(items)) => {
                // Later items win, non-mapping items are ignored
                for item in items.iter().filter_map(Value::as_object) {
                    for (name, spec) in item {
                        fields.insert(name.clone(), OptionalField::from_spec(spec));
                    }
                }
            }
        }
        Self(fields)
    }
}

impl OptionalFields {
    pub fn iter(&self) -> impl Iterator<Item = (&String, &OptionalField)> {
        self.0.iter()
    }

    pub fn get(&self, name: &str) -> Option<&OptionalField> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Required and optional config fields of a pattern
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternConfig {
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub optional: OptionalFields,
}

/// A reusable infrastructure template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: PatternCategory,
    /// Sub-resource descriptors, passed through untouched
    #[serde(default)]
    pub components: Vec<Value>,
    #[serde(default)]
    pub use_cases: Vec<Value>,
    #[serde(default)]
    pub config: PatternConfig,
    /// size -> environment -> parameters
    #[serde(default)]
    pub sizing: BTreeMap<String, BTreeMap<String, ParamMap>>,
    /// size -> environment -> monthly cost in USD; non-numeric cells count as unknown
    #[serde(default)]
    pub estimated_costs: BTreeMap<String, BTreeMap<String, Value>>,
}

impl Pattern {
    /// Fully resolved parameters for a (size, environment) pair, if defined
    pub fn sizing_for(&self, size: &str, environment: &str) -> Option<&ParamMap> {
        self.sizing.get(size)?.get(environment)
    }

    /// Monthly cost for a (size, environment) pair, as written in the catalog
    pub fn cost_for(&self, size: &str, environment: &str) -> Option<Number> {
        match self.estimated_costs.get(size)?.get(environment)? {
            Value::Number(cost) => Some(cost.clone()),
            other => {
                debug!("Ignoring non-numeric cost for '{}' at {}/{}: {}", self.name, size, environment, other);
                None
            }
        }
    }

    /// First line of the description
    pub fn summary_line(&self) -> &str {
        self.description.as_deref().and_then(|d| d.lines().next()).unwrap_or("")
    }

    /// Parse a pattern definition; `Ok(None)` for documents without a `name`
    pub fn from_yaml_str(content: &str) -> ResolveResult<Option<Self>> {
        let value: serde_yaml::Value = serde_yaml::from_str(content)
            .map_err(|e| ResolveError::catalog(format!("invalid YAML: {}", e)))?;

        if value.get("name").is_none() {
            return Ok(None);
        }

        serde_yaml::from_value(value)
            .map(Some)
            .map_err(|e| ResolveError::catalog(format!("invalid pattern definition: {}", e)))
    }
}

/// Listing entry for a pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternSummary {
    pub name: String,
    pub description: String,
    pub category: PatternCategory,
    pub components: Vec<Value>,
}

/// Detailed information about a pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternInfo {
    #[serde(flatten)]
    pub summary: PatternSummary,
    pub use_cases: Vec<Value>,
}

/// A parameter name used both by pattern sizing and by a conditional feature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceCollision {
    pub pattern: String,
    pub parameter: String,
}

/// Immutable set of patterns keyed by name
#[derive(Debug, Clone, Default)]
pub struct PatternCatalog {
    patterns: BTreeMap<String, Pattern>,
}

impl PatternCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from in-memory patterns; later duplicates replace earlier ones
    pub fn from_patterns(patterns: impl IntoIterator<Item = Pattern>) -> Self {
        let mut catalog = Self::new();
        for pattern in patterns {
            catalog.insert(pattern);
        }
        catalog
    }

    fn insert(&mut self, pattern: Pattern) {
        if let Some(previous) = self.patterns.insert(pattern.name.clone(), pattern) {
            warn!("Duplicate pattern definition replaced: {}", previous.name);
        }
    }

    /// Load every `*.yaml`/`*.yml` file in `dir`
    ///
    /// A missing directory yields an empty catalog. Files are read in path
    /// order so duplicate names resolve the same way on every run.
    pub fn load_dir(dir: &Path) -> ResolveResult<Self> {
        let mut catalog = Self::new();

        if !dir.exists() {
            warn!("Patterns directory not found: {:?}", dir);
            return Ok(catalog);
        }

        let entries = fs::read_dir(dir).map_err(|e| {
            ResolveError::catalog(format!("failed to read patterns directory {:?}: {}", dir, e))
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && matches!(
                        path.extension().and_then(|e| e.to_str()),
                        Some("yaml") | Some("yml")
                    )
            })
            .collect();
        files.sort();

        for path in files {
            let content = fs::read_to_string(&path).map_err(|e| {
                ResolveError::catalog(format!("failed to read {:?}: {}", path, e))
            })?;

            match Pattern::from_yaml_str(&content) {
                Ok(Some(pattern)) => {
                    debug!("Loaded pattern '{}' from {:?}", pattern.name, path);
                    catalog.insert(pattern);
                }
                Ok(None) => debug!("Skipping {:?}: no pattern name", path),
                Err(e) => {
                    return Err(ResolveError::catalog(format!("{:?}: {}", path, e)));
                }
            }
        }

        info!("Loaded {} patterns from {:?}", catalog.len(), dir);
        Ok(catalog)
    }

    pub fn get(&self, name: &str) -> Option<&Pattern> {
        self.patterns.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.patterns.contains_key(name)
    }

    /// Pattern names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.patterns.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.values()
    }

    /// List all patterns
    pub fn list(&self) -> Vec<PatternSummary> {
        self.iter()
            .map(|pattern| PatternSummary {
                name: pattern.name.clone(),
                description: pattern.summary_line().to_string(),
                category: pattern.category,
                components: pattern.components.clone(),
            })
            .collect()
    }

    /// Detailed information about one pattern
    pub fn info(&self, name: &str) -> Option<PatternInfo> {
        let pattern = self.get(name)?;
        Some(PatternInfo {
            summary: PatternSummary {
                name: pattern.name.clone(),
                description: pattern.summary_line().to_string(),
                category: pattern.category,
                components: pattern.components.clone(),
            },
            use_cases: pattern.use_cases.clone(),
        })
    }

    /// Sizing parameters that share a name with a conditional feature
    ///
    /// Resolution never lets the conditional default win over the sizing value,
    /// so these are reported, not rejected.
    pub fn namespace_collisions(&self, defaults: &SizingDefaults) -> Vec<NamespaceCollision> {
        let mut collisions = Vec::new();

        for pattern in self.iter() {
            let params: BTreeSet<&String> =
                pattern.sizing.values().flat_map(|envs| envs.values()).flat_map(|p| p.keys()).collect();

            for param in params {
                if defaults.conditional_features.contains_key(param) {
                    collisions.push(NamespaceCollision {
                        pattern: pattern.name.clone(),
                        parameter: param.clone(),
                    });
                }
            }
        }

        collisions
    }
}

/// Load the catalog and the sizing table named by `config`
pub fn load(config: &ResolverConfig) -> ResolveResult<(PatternCatalog, SizingDefaults)> {
    let defaults = SizingDefaults::load(&config.sizing_file)?;
    let catalog = PatternCatalog::load_dir(&config.patterns_dir)?;

    for collision in catalog.namespace_collisions(&defaults) {
        warn!(
            "Pattern '{}' sizes parameter '{}' which is also a conditional feature; sizing value takes precedence",
            collision.pattern, collision.parameter
        );
    }

    Ok((catalog, defaults))
}
