//! Request documents
//!
//! A submission is a YAML stream of one or more request documents. Fields are
//! read leniently so the validator can report every missing piece at once;
//! only input whose structure cannot be read at all is a schema error.

use crate::errors::{ResolveError, ResolveResult};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// What a request asks for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    #[default]
    Create,
    Destroy,
}

impl Action {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "create" => Some(Self::Create),
            "destroy" => Some(Self::Destroy),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Destroy => "destroy",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deployment environments a request may target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub const ALL: [Environment; 3] = [Self::Dev, Self::Staging, Self::Prod];

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|env| env.as_str() == value)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Staging => "staging",
            Self::Prod => "prod",
        }
    }
}

/// Project metadata of a request
///
/// An explicit null reads the same as an absent key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, deserialize_with = "scalar_string")]
    pub project: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub environment: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub business_unit: Option<String>,
    #[serde(default)]
    pub owners: Option<Vec<String>>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub location: Option<String>,
}

/// The `config` block: `name`, `size` and pattern-specific overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestConfig(BTreeMap<String, Value>);

impl RequestConfig {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn name(&self) -> Option<String> {
        self.get("name").map(scalar_text)
    }

    pub fn size(&self) -> Option<String> {
        self.get("size").map(scalar_text)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for RequestConfig {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// One pattern request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestDocument {
    #[serde(default, deserialize_with = "scalar_string")]
    pub version: Option<String>,
    /// Raw action; absent means `create`
    #[serde(default, deserialize_with = "scalar_string")]
    pub action: Option<String>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub pattern: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub pattern_version: Option<String>,
    #[serde(default)]
    pub config: Option<RequestConfig>,
}

impl RequestDocument {
    /// Parse a single-document YAML string
    pub fn from_yaml_str(content: &str) -> ResolveResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Action as written, defaulting to `create`
    pub fn action_name(&self) -> &str {
        self.action.as_deref().unwrap_or(Action::Create.as_str())
    }

    /// Typed action; `None` for unrecognized values
    pub fn action(&self) -> Option<Action> {
        Action::parse(self.action_name())
    }

    /// Pattern name as written, `unknown` when absent
    pub fn pattern_name(&self) -> &str {
        self.pattern.as_deref().unwrap_or("unknown")
    }

    pub fn environment(&self) -> Option<&str> {
        self.metadata.as_ref()?.environment.as_deref()
    }

    /// Lookup in the `config` block
    pub fn config_value(&self, field: &str) -> Option<&Value> {
        self.config.as_ref()?.get(field)
    }

    pub fn requested_size(&self) -> Option<String> {
        self.config.as_ref()?.size()
    }
}

/// A document whose structure could not be read
#[derive(Debug)]
pub struct MalformedDocument {
    pub action: String,
    pub pattern: String,
    pub error: ResolveError,
}

/// One entry of a parsed submission
#[derive(Debug)]
pub enum ParsedDocument {
    Request(RequestDocument),
    Malformed(MalformedDocument),
}

/// Split a YAML stream into request documents
///
/// Empty documents are dropped before numbering. Every document is parsed on
/// its own: one that is not valid YAML, or whose structure cannot be read,
/// fails only itself and comes back as [`ParsedDocument::Malformed`].
pub fn parse_documents(content: &str) -> Vec<ParsedDocument> {
    let documents: Vec<ParsedDocument> =
        split_documents(content).into_iter().filter_map(parse_document).collect();
    debug!("Parsed {} documents", documents.len());
    documents
}

fn parse_document(chunk: String) -> Option<ParsedDocument> {
    let value: serde_yaml::Value = match serde_yaml::from_str(&chunk) {
        Ok(value) => value,
        Err(e) => {
            debug!("Unparseable document: {}", e);
            return Some(ParsedDocument::Malformed(MalformedDocument {
                action: Action::Create.as_str().to_string(),
                pattern: "unknown".to_string(),
                error: e.into(),
            }));
        }
    };
    if value.is_null() {
        return None;
    }

    let parsed = match serde_yaml::from_value::<RequestDocument>(value.clone()) {
        Ok(document) => ParsedDocument::Request(document),
        Err(e) => {
            let field = |name: &str, fallback: &str| {
                value.get(name).and_then(|v| v.as_str()).unwrap_or(fallback).to_string()
            };
            ParsedDocument::Malformed(MalformedDocument {
                action: field("action", Action::Create.as_str()),
                pattern: field("pattern", "unknown"),
                error: ResolveError::schema(e.to_string()),
            })
        }
    };
    Some(parsed)
}

/// Cut a stream at `---` marker lines; chunks holding only blanks and comments are dropped
fn split_documents(content: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in content.lines() {
        if is_document_marker(line) {
            chunks.push(std::mem::take(&mut current));
            // Content may start on the marker line itself (`--- {pattern: x}`)
            let inline = line[3..].trim();
            if !inline.is_empty() && !inline.starts_with('#') {
                current.push_str(inline);
                current.push('\n');
            }
            continue;
        }
        current.push_str(line);
        current.push('\n');
    }
    chunks.push(current);

    chunks
        .into_iter()
        .filter(|chunk| {
            chunk.lines().any(|line| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with('#')
            })
        })
        .collect()
}

fn is_document_marker(line: &str) -> bool {
    match line.strip_prefix("---") {
        Some(rest) => rest.is_empty() || rest.starts_with([' ', '\t']),
        None => false,
    }
}

/// Render a scalar config value as plain text
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Accept strings, numbers and booleans as text (`version: 1` and `version: "1"` alike)
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_yaml::Value>::deserialize(deserializer)? {
        None | Some(serde_yaml::Value::Null) => Ok(None),
        Some(serde_yaml::Value::String(s)) => Ok(Some(s)),
        Some(serde_yaml::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(serde_yaml::Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(D::Error::custom(format!("expected a scalar, found {:?}", other))),
    }
}
