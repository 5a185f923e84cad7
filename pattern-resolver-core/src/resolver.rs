//! Pattern resolution
//!
//! Turns a validated request into the flat parameter map handed to the
//! provisioning tooling. Layers are applied in a fixed order, each a total
//! function over the same output map:
//!
//! 1. size: `config.size`, else the environment default, else `small`
//! 2. sizing parameters: pattern sizing, else the common SKU table, else nothing
//! 3. identity fields
//! 4. sizing parameters merged over the identity fields
//! 5. optional config: request override, else declared default, else absent
//! 6. conditional features, only for keys still absent
//!
//! Step 6 never overwrites a resolved value. That is how a pattern or request
//! opts out of an environment-wide default, and why a feature such as access
//! review is only ever enabled by an explicit flag, never by related data such
//! as a reviewer list.

use crate::catalog::{ParamMap, Pattern, PatternCatalog, SizingDefaults};
use crate::errors::{ResolveError, ResolveResult};
use crate::request::RequestDocument;
use crate::validation::{ValidationReport, Validator};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Resolved parameters, keyed by variable name
pub type Tfvars = BTreeMap<String, Value>;

/// Location used when a request does not name one
pub const DEFAULT_LOCATION: &str = "eastus";

/// Environment assumed for lookups on documents that carry none
pub const DEFAULT_ENVIRONMENT: &str = "dev";

/// Keys present in every resolved output
pub const IDENTITY_FIELDS: [&str; 7] =
    ["project", "environment", "business_unit", "owners", "location", "pattern_name", "name"];

/// Resolves request documents against a catalog and sizing table
///
/// Holds only shared references to immutable data, so one instance can serve
/// any number of concurrent callers.
#[derive(Debug, Clone, Copy)]
pub struct PatternResolver<'a> {
    catalog: &'a PatternCatalog,
    defaults: &'a SizingDefaults,
}

impl<'a> PatternResolver<'a> {
    pub fn new(catalog: &'a PatternCatalog, defaults: &'a SizingDefaults) -> Self {
        Self { catalog, defaults }
    }

    pub fn catalog(&self) -> &'a PatternCatalog {
        self.catalog
    }

    pub fn defaults(&self) -> &'a SizingDefaults {
        self.defaults
    }

    pub fn validate(&self, document: &RequestDocument) -> ValidationReport {
        Validator::new(self.catalog).validate(document)
    }

    /// T-shirt size a document resolves to
    pub fn resolve_size(&self, document: &RequestDocument) -> String {
        resolve_size(document, self.defaults)
    }

    /// Resolve a document to tfvars; invalid documents are never resolved
    pub fn resolve(&self, document: &RequestDocument) -> ResolveResult<Tfvars> {
        let report = self.validate(document);
        self.resolve_validated(document, &report)
    }

    /// Resolve a document whose validation `report` the caller already holds
    pub(crate) fn resolve_validated(
        &self,
        document: &RequestDocument,
        report: &ValidationReport,
    ) -> ResolveResult<Tfvars> {
        if !report.valid {
            return Err(ResolveError::validation(report.errors.clone()));
        }

        let (Some(pattern_name), Some(metadata)) = (&document.pattern, &document.metadata) else {
            return Err(ResolveError::schema("validated document lacks pattern or metadata"));
        };
        let pattern = self
            .catalog
            .get(pattern_name)
            .ok_or_else(|| ResolveError::schema(format!("pattern vanished: {}", pattern_name)))?;
        let environment = metadata.environment.as_deref().unwrap_or(DEFAULT_ENVIRONMENT);

        let size = self.resolve_size(document);
        let sizing = self.sizing_parameters(pattern, &size, environment);

        let project = Value::from(metadata.project.clone().unwrap_or_default());
        let mut tfvars = Tfvars::new();
        tfvars.insert("project".to_string(), project.clone());
        tfvars.insert("environment".to_string(), Value::from(environment));
        tfvars.insert(
            "business_unit".to_string(),
            Value::from(metadata.business_unit.clone().unwrap_or_default()),
        );
        tfvars.insert(
            "owners".to_string(),
            Value::from(metadata.owners.clone().unwrap_or_default()),
        );
        tfvars.insert(
            "location".to_string(),
            Value::from(metadata.location.as_deref().unwrap_or(DEFAULT_LOCATION)),
        );
        tfvars.insert("pattern_name".to_string(), Value::from(pattern.name.as_str()));
        tfvars.insert(
            "name".to_string(),
            document.config_value("name").cloned().unwrap_or(project),
        );

        tfvars.extend(sizing);
        self.apply_optional_config(&mut tfvars, pattern, document);
        self.apply_conditional_features(&mut tfvars, environment);

        debug!(
            "Resolved '{}' ({}/{}) to {} parameters",
            pattern.name,
            size,
            environment,
            tfvars.len()
        );
        Ok(tfvars)
    }

    /// Sizing parameters for a (size, environment) pair
    ///
    /// An absent entry is not an error and yields an empty set.
    pub fn sizing_parameters(&self, pattern: &Pattern, size: &str, environment: &str) -> ParamMap {
        if let Some(params) = pattern.sizing_for(size, environment) {
            return params.clone();
        }

        let mut params = ParamMap::new();
        match self.defaults.common_sku(&pattern.name, size) {
            Some(Value::Object(fields)) => {
                params.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            Some(sku) => {
                params.insert("sku".to_string(), sku.clone());
            }
            None => debug!("No sizing for '{}' at {}/{}", pattern.name, size, environment),
        }
        params
    }

    /// Overrides win over declared defaults; undeclared request fields are ignored
    fn apply_optional_config(&self, tfvars: &mut Tfvars, pattern: &Pattern, document: &RequestDocument) {
        for (field, spec) in pattern.config.optional.iter() {
            if let Some(value) = document.config_value(field) {
                tfvars.insert(field.clone(), value.clone());
            } else if let Some(default) = &spec.default {
                tfvars.insert(field.clone(), default.clone());
            }
        }
    }

    fn apply_conditional_features(&self, tfvars: &mut Tfvars, environment: &str) {
        for feature in self.defaults.conditional_features.keys() {
            if !tfvars.contains_key(feature) {
                let enabled = self.defaults.conditional_default(feature, environment);
                tfvars.insert(feature.clone(), Value::Bool(enabled));
            }
        }
    }
}

/// `config.size` when given, otherwise the environment's default size
pub fn resolve_size(document: &RequestDocument, defaults: &SizingDefaults) -> String {
    document.requested_size().unwrap_or_else(|| {
        let environment = document.environment().unwrap_or(DEFAULT_ENVIRONMENT);
        defaults.default_size(environment).to_string()
    })
}

/// Resolve `document` against `catalog` and `defaults`
pub fn resolve(
    document: &RequestDocument,
    catalog: &PatternCatalog,
    defaults: &SizingDefaults,
) -> ResolveResult<Tfvars> {
    PatternResolver::new(catalog, defaults).resolve(document)
}
