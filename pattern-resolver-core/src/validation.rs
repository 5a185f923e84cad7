//! Request validation
//!
//! Every rule is evaluated on its own so a caller sees all violations of a
//! document at once. Warnings are advisory and never make a document invalid.

use crate::catalog::PatternCatalog;
use crate::request::{Action, Environment, RequestDocument};
use serde::{Deserialize, Serialize};

/// Metadata fields every request must carry
pub const REQUIRED_METADATA: [&str; 4] = ["project", "environment", "business_unit", "owners"];

/// Outcome of validating one document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    fn from_findings(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self { valid: errors.is_empty(), errors, warnings }
    }
}

/// Checks request documents against the pattern catalog
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    catalog: &'a PatternCatalog,
}

impl<'a> Validator<'a> {
    pub fn new(catalog: &'a PatternCatalog) -> Self {
        Self { catalog }
    }

    pub fn validate(&self, document: &RequestDocument) -> ValidationReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if let Some(action) = &document.action {
            if Action::parse(action).is_none() {
                errors.push(format!("Invalid action: {}. Must be 'create' or 'destroy'", action));
            }
        }

        if document.pattern.is_none() {
            errors.push("Missing required field: pattern".to_string());
        }

        match &document.metadata {
            None => errors.push("Missing required field: metadata".to_string()),
            Some(meta) => {
                let present = [
                    meta.project.is_some(),
                    meta.environment.is_some(),
                    meta.business_unit.is_some(),
                    meta.owners.is_some(),
                ];
                for (field, present) in REQUIRED_METADATA.iter().zip(present) {
                    if !present {
                        errors.push(format!("Missing required metadata field: {}", field));
                    }
                }

                let env = meta.environment.as_deref().unwrap_or("");
                if Environment::parse(env).is_none() {
                    errors.push(format!(
                        "Invalid environment: {}. Must be dev, staging, or prod",
                        env
                    ));
                }

                for owner in meta.owners.iter().flatten() {
                    if !regex_utils::email::is_valid(owner) {
                        warnings.push(format!("Owner '{}' is not a valid email address", owner));
                    }
                }
            }
        }

        if let Some(name) = &document.pattern {
            match self.catalog.get(name) {
                None => errors.push(format!(
                    "Unknown pattern: {}. Available: {:?}",
                    name,
                    self.catalog.names()
                )),
                Some(pattern) => {
                    // `name` falls back to the project name during resolution
                    for field in pattern.config.required.iter().filter(|f| f.as_str() != "name") {
                        let supplied =
                            document.config.as_ref().is_some_and(|config| config.contains(field));
                        if !supplied {
                            errors.push(format!("Missing required config field: {}", field));
                        }
                    }
                }
            }
        }

        match &document.pattern_version {
            None => {
                warnings.push("pattern_version not specified; will use latest version".to_string())
            }
            Some(version) if !regex_utils::semver::is_valid(version) => {
                warnings.push(format!("pattern_version '{}' is not a semantic version", version))
            }
            Some(_) => {}
        }

        ValidationReport::from_findings(errors, warnings)
    }
}

/// Validate `document` against `catalog`
pub fn validate(document: &RequestDocument, catalog: &PatternCatalog) -> ValidationReport {
    Validator::new(catalog).validate(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Pattern;

    fn catalog() -> PatternCatalog {
        let keyvault = Pattern::from_yaml_str("name: keyvault\nconfig:\n  required: [name]\n")
            .unwrap()
            .unwrap();
        let postgresql = Pattern::from_yaml_str(
            "name: postgresql\nconfig:\n  required: [name, admin_group]\n",
        )
        .unwrap()
        .unwrap();
        PatternCatalog::from_patterns([keyvault, postgresql])
    }

    fn document(yaml: &str) -> RequestDocument {
        RequestDocument::from_yaml_str(yaml).unwrap()
    }

    const VALID: &str = r#"
pattern: keyvault
pattern_version: "1.0.0"
metadata:
  project: myapp
  environment: dev
  business_unit: eng
  owners: [a@co.com]
config:
  name: secrets
"#;

    #[test]
    fn test_valid_request() {
        let report = validate(&document(VALID), &catalog());
        assert!(report.valid);
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_missing_pattern_version_is_warning() {
        let yaml = VALID.replace("pattern_version: \"1.0.0\"\n", "");
        let report = validate(&document(&yaml), &catalog());
        assert!(report.valid);
        assert_eq!(report.warnings, vec!["pattern_version not specified; will use latest version"]);
    }

    #[test]
    fn test_advisory_warnings() {
        let yaml = VALID
            .replace("\"1.0.0\"", "latest")
            .replace("[a@co.com]", "[a@co.com, platform-team]");
        let report = validate(&document(&yaml), &catalog());
        assert!(report.valid);
        assert_eq!(report.warnings.len(), 2);
        assert!(report.warnings.iter().any(|w| w.contains("platform-team")));
        assert!(report.warnings.iter().any(|w| w.contains("'latest'")));
    }

    #[test]
    fn test_unknown_pattern_lists_catalog() {
        let yaml = VALID.replace("pattern: keyvault", "pattern: does-not-exist");
        let report = validate(&document(&yaml), &catalog());
        assert!(!report.valid);
        assert_eq!(
            report.errors,
            vec![r#"Unknown pattern: does-not-exist. Available: ["keyvault", "postgresql"]"#]
        );
    }

    #[test]
    fn test_all_violations_reported() {
        let report = validate(&document("action: upgrade\nmetadata:\n  environment: qa\n"), &catalog());
        assert!(!report.valid);
        assert_eq!(
            report.errors,
            vec![
                "Invalid action: upgrade. Must be 'create' or 'destroy'",
                "Missing required field: pattern",
                "Missing required metadata field: project",
                "Missing required metadata field: business_unit",
                "Missing required metadata field: owners",
                "Invalid environment: qa. Must be dev, staging, or prod",
            ]
        );
    }

    #[test]
    fn test_missing_metadata() {
        let report = validate(&document("pattern: keyvault\nconfig: {name: x}\n"), &catalog());
        assert_eq!(report.errors, vec!["Missing required field: metadata"]);
    }

    #[test]
    fn test_missing_environment_is_also_invalid() {
        let yaml = VALID.replace("  environment: dev\n", "");
        let report = validate(&document(&yaml), &catalog());
        assert_eq!(
            report.errors,
            vec![
                "Missing required metadata field: environment",
                "Invalid environment: . Must be dev, staging, or prod",
            ]
        );
    }

    #[test]
    fn test_null_metadata_value_counts_as_missing() {
        let yaml = VALID.replace("project: myapp", "project: ~").replace("[a@co.com]", "null");
        let report = validate(&document(&yaml), &catalog());
        assert_eq!(
            report.errors,
            vec![
                "Missing required metadata field: project",
                "Missing required metadata field: owners",
            ]
        );
    }

    #[test]
    fn test_required_config_fields() {
        let yaml = VALID.replace("pattern: keyvault", "pattern: postgresql");
        let report = validate(&document(&yaml), &catalog());
        assert_eq!(report.errors, vec!["Missing required config field: admin_group"]);

        // `name` may be omitted; it defaults to the project
        let yaml = VALID.replace("config:\n  name: secrets\n", "");
        assert!(validate(&document(&yaml), &catalog()).valid);
    }

    #[test]
    fn test_explicit_create_and_destroy() {
        for action in ["create", "destroy"] {
            let yaml = format!("action: {}\n{}", action, VALID);
            assert!(validate(&document(&yaml), &catalog()).valid);
        }
    }

    #[test]
    fn test_deterministic() {
        let doc = document("metadata: {environment: prod}\npattern: nope\n");
        let cat = catalog();
        assert_eq!(validate(&doc, &cat), validate(&doc, &cat));
    }
}
