//! Output serialization
//!
//! Single documents render as a tfvars file, a JSON object or `TF_VAR_`
//! environment lines. Batches render as JSON aggregates. Keys are always
//! emitted in sorted order so identical input gives byte-identical output.

use crate::cost::CostEstimate;
use crate::orchestrator::{BatchOutcome, DocumentResult};
use crate::resolver::Tfvars;
use serde::Serialize;
use serde_json::{Number, Value};

/// Prefix of environment-variable output
pub const ENV_PREFIX: &str = "TF_VAR_";

/// `key = value` lines for an infrastructure-as-code variable file
pub fn render_tfvars(tfvars: &Tfvars) -> String {
    tfvars
        .iter()
        .map(|(key, value)| format!("{} = {}", key, hcl_value(value)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn hcl_value(value: &Value) -> String {
    match value {
        Value::String(s) => hcl_string(s),
        Value::Array(items) => {
            format!("[{}]", items.iter().map(hcl_value).collect::<Vec<_>>().join(", "))
        }
        Value::Object(fields) => {
            let entries: Vec<String> = fields
                .iter()
                .map(|(key, value)| format!("{} = {}", hcl_string(key), hcl_value(value)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
        // Bools, numbers and null read the same in JSON and HCL
        other => other.to_string(),
    }
}

/// Quoted HCL string literal; template sequences are escaped so values stay literal
fn hcl_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '$' | '%' if chars.peek() == Some(&'{') => {
                out.push(c);
                out.push(c);
            }
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// Pretty JSON object of the resolved parameters
pub fn render_json(tfvars: &Tfvars) -> serde_json::Result<String> {
    serde_json::to_string_pretty(tfvars)
}

/// `TF_VAR_key=value` lines for CI environments
pub fn render_env(tfvars: &Tfvars) -> String {
    tfvars
        .iter()
        .map(|(key, value)| {
            let rendered = match value {
                // Multi-line strings are quoted so each variable stays on one line
                Value::String(s) if s.contains(['\n', '\r']) => value.to_string(),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            format!("{}{}={}", ENV_PREFIX, key, rendered)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Aggregate consumed by the provisioning workflow
#[derive(Debug, Serialize)]
pub struct MultiDocumentOutput<'a> {
    pub document_count: usize,
    pub all_valid: bool,
    pub execution_order: &'a [usize],
    pub patterns: &'a [DocumentResult],
    pub create_count: usize,
    pub destroy_count: usize,
}

impl<'a> From<&'a BatchOutcome> for MultiDocumentOutput<'a> {
    fn from(outcome: &'a BatchOutcome) -> Self {
        Self {
            document_count: outcome.document_count(),
            all_valid: outcome.all_valid(),
            execution_order: &outcome.execution_order,
            patterns: &outcome.results,
            create_count: outcome.create_count(),
            destroy_count: outcome.destroy_count(),
        }
    }
}

/// Validation verdict for one document of a batch
#[derive(Debug, Serialize)]
pub struct ValidationEntry<'a> {
    pub index: usize,
    pub action: &'a str,
    pub pattern: &'a str,
    pub valid: bool,
    pub errors: &'a [String],
    pub warnings: &'a [String],
}

impl<'a> From<&'a DocumentResult> for ValidationEntry<'a> {
    fn from(result: &'a DocumentResult) -> Self {
        Self {
            index: result.index,
            action: &result.action,
            pattern: &result.pattern,
            valid: result.valid,
            errors: &result.errors,
            warnings: &result.warnings,
        }
    }
}

/// Batch validation summary without resolved parameters
#[derive(Debug, Serialize)]
pub struct ValidationOutput<'a> {
    pub document_count: usize,
    pub all_valid: bool,
    pub validations: Vec<ValidationEntry<'a>>,
    pub execution_order: &'a [usize],
    pub create_count: usize,
    pub destroy_count: usize,
}

impl<'a> From<&'a BatchOutcome> for ValidationOutput<'a> {
    fn from(outcome: &'a BatchOutcome) -> Self {
        Self {
            document_count: outcome.document_count(),
            all_valid: outcome.all_valid(),
            validations: outcome.results.iter().map(ValidationEntry::from).collect(),
            execution_order: &outcome.execution_order,
            create_count: outcome.create_count(),
            destroy_count: outcome.destroy_count(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DryRunDetails<'a> {
    pub components: &'a [Value],
    pub estimated_cost_usd: Option<&'a Number>,
    pub resource_group: Option<&'a str>,
    pub environment_features: &'a [String],
}

/// One document of a dry-run report; details only for valid documents
#[derive(Debug, Serialize)]
pub struct DryRunDocument<'a> {
    pub index: usize,
    pub pattern: &'a str,
    pub action: &'a str,
    pub valid: bool,
    pub errors: &'a [String],
    pub warnings: &'a [String],
    #[serde(flatten)]
    pub details: Option<DryRunDetails<'a>>,
}

impl<'a> From<&'a DocumentResult> for DryRunDocument<'a> {
    fn from(result: &'a DocumentResult) -> Self {
        let details = result.valid.then(|| DryRunDetails {
            components: &result.components,
            estimated_cost_usd: result.estimated_cost_usd.as_ref(),
            resource_group: result.resource_group.as_deref(),
            environment_features: &result.environment_features,
        });
        Self {
            index: result.index,
            pattern: &result.pattern,
            action: &result.action,
            valid: result.valid,
            errors: &result.errors,
            warnings: &result.warnings,
            details,
        }
    }
}

/// Validate-and-resolve report without provisioning
#[derive(Debug, Serialize)]
pub struct DryRunReport<'a> {
    pub valid: bool,
    pub document_count: usize,
    pub documents: Vec<DryRunDocument<'a>>,
    pub total_monthly_cost_usd: Option<Number>,
    pub execution_order: &'a [usize],
    pub create_count: usize,
    pub destroy_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl<'a> From<&'a BatchOutcome> for DryRunReport<'a> {
    fn from(outcome: &'a BatchOutcome) -> Self {
        Self {
            valid: outcome.all_valid(),
            document_count: outcome.document_count(),
            documents: outcome.results.iter().map(DryRunDocument::from).collect(),
            total_monthly_cost_usd: outcome.total_monthly_cost(),
            execution_order: &outcome.execution_order,
            create_count: outcome.create_count(),
            destroy_count: outcome.destroy_count(),
            errors: outcome.all_errors(),
        }
    }
}

/// Cost line of a batch cost listing
#[derive(Debug, Serialize)]
pub struct CostEntry {
    #[serde(flatten)]
    pub estimate: Option<CostEstimate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub action: String,
}

impl CostEntry {
    pub fn new(action: impl Into<String>, pattern: &str, estimate: Option<CostEstimate>) -> Self {
        let error = estimate.is_none().then(|| format!("Unknown pattern: {}", pattern));
        Self { estimate, error, action: action.into() }
    }
}

pub fn render_batch(outcome: &BatchOutcome) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&MultiDocumentOutput::from(outcome))
}

pub fn render_validations(outcome: &BatchOutcome) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ValidationOutput::from(outcome))
}

pub fn render_dry_run(outcome: &BatchOutcome) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&DryRunReport::from(outcome))
}

pub fn render_costs(entries: &[CostEntry]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tfvars() -> Tfvars {
        let value = json!({
            "name": "secrets",
            "enable_diagnostics": false,
            "soft_delete_days": 7,
            "owners": ["a@co.com", "b@co.com"],
            "network_rules": {"default_action": "Deny"},
            "note": "say \"hi\"",
            "retention": null
        });
        serde_json::from_value(value).unwrap()
    }

    fn outcome() -> BatchOutcome {
        let mut create = DocumentResult::invalid(0, "create", "keyvault", Vec::new(), Vec::new());
        create.valid = true;
        create.tfvars = Some(tfvars());
        create.estimated_cost_usd = Some(Number::from(5));
        create.resource_group = Some("rg-myapp-keyvault-dev".to_string());
        create.components = vec![json!("keyvault")];

        let broken = DocumentResult::invalid(
            1,
            "destroy",
            "nope",
            vec!["Unknown pattern: nope. Available: [\"keyvault\"]".to_string()],
            vec!["pattern_version not specified; will use latest version".to_string()],
        );
        BatchOutcome::new(vec![create, broken])
    }

    #[test]
    fn test_render_tfvars() {
        let rendered = render_tfvars(&tfvars());
        let expected = [
            "enable_diagnostics = false",
            "name = \"secrets\"",
            "network_rules = {\"default_action\" = \"Deny\"}",
            "note = \"say \\\"hi\\\"\"",
            "owners = [\"a@co.com\", \"b@co.com\"]",
            "retention = null",
            "soft_delete_days = 7",
        ]
        .join("\n");
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_tfvars_strings_stay_literal() {
        let tfvars: Tfvars = serde_json::from_value(json!({
            "description": "line1\nline2\ttabbed\r",
            "template": "${var.x} and %{ if true }",
            "dollars": "cost $5 {approx}",
            "tags": {"note": "${env}"}
        }))
        .unwrap();

        let rendered = render_tfvars(&tfvars);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "description = \"line1\\nline2\\ttabbed\\r\"");
        assert_eq!(lines[1], "dollars = \"cost $5 {approx}\"");
        assert_eq!(lines[2], "tags = {\"note\" = \"$${env}\"}");
        assert_eq!(lines[3], "template = \"$${var.x} and %%{ if true }\"");
    }

    #[test]
    fn test_env_multiline_string_is_quoted() {
        let tfvars: Tfvars = serde_json::from_value(json!({"description": "line1\nline2", "name": "kv"})).unwrap();
        let rendered = render_env(&tfvars);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines, vec!["TF_VAR_description=\"line1\\nline2\"", "TF_VAR_name=kv"]);
    }

    #[test]
    fn test_render_env() {
        let rendered = render_env(&tfvars());
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "TF_VAR_enable_diagnostics=false");
        assert_eq!(lines[1], "TF_VAR_name=secrets");
        assert_eq!(lines[2], "TF_VAR_network_rules={\"default_action\":\"Deny\"}");
        assert_eq!(lines[4], "TF_VAR_owners=[\"a@co.com\",\"b@co.com\"]");
        assert!(lines.iter().all(|l| l.starts_with(ENV_PREFIX)));
    }

    #[test]
    fn test_render_json_round_trips() {
        let rendered = render_json(&tfvars()).unwrap();
        let parsed: Tfvars = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed, tfvars());
    }

    #[test]
    fn test_render_batch() {
        let rendered = render_batch(&outcome()).unwrap();
        let json: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(json["document_count"], 2);
        assert_eq!(json["all_valid"], false);
        assert_eq!(json["execution_order"], json!([0]));
        assert_eq!(json["create_count"], 1);
        assert_eq!(json["destroy_count"], 0);
        assert_eq!(json["patterns"][0]["tfvars"]["name"], "secrets");
        assert!(json["patterns"][1]["tfvars"].is_null());
    }

    #[test]
    fn test_render_validations() {
        let json: Value = serde_json::from_str(&render_validations(&outcome()).unwrap()).unwrap();
        let validations = json["validations"].as_array().unwrap();
        assert_eq!(validations.len(), 2);
        assert!(validations[0].get("tfvars").is_none());
        assert_eq!(validations[1]["warnings"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_render_dry_run() {
        let rendered = render_dry_run(&outcome()).unwrap();
        assert!(rendered.contains("\"total_monthly_cost_usd\": 5,"));
        assert!(rendered.contains("\"estimated_cost_usd\": 5,"));

        let json: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["total_monthly_cost_usd"], 5);
        assert_eq!(json["documents"][0]["resource_group"], "rg-myapp-keyvault-dev");
        assert!(json["documents"][1].get("resource_group").is_none());
        assert_eq!(json["errors"][0], "Document 1: Unknown pattern: nope. Available: [\"keyvault\"]");
    }

    #[test]
    fn test_dry_run_omits_errors_when_clean() {
        let mut ok = DocumentResult::invalid(0, "create", "keyvault", Vec::new(), Vec::new());
        ok.valid = true;
        let json: Value =
            serde_json::from_str(&render_dry_run(&BatchOutcome::new(vec![ok])).unwrap()).unwrap();
        assert!(json.get("errors").is_none());
        assert!(json["total_monthly_cost_usd"].is_null());
    }

    #[test]
    fn test_cost_entries() {
        let known = CostEntry::new(
            "create",
            "keyvault",
            Some(CostEstimate {
                pattern: "keyvault".to_string(),
                size: "small".to_string(),
                environment: "dev".to_string(),
                estimated_monthly_cost_usd: Some(Number::from(5)),
            }),
        );
        let unknown = CostEntry::new("destroy", "nope", None);

        let json: Value = serde_json::from_str(&render_costs(&[known, unknown]).unwrap()).unwrap();
        assert_eq!(json[0]["estimated_monthly_cost_usd"], 5.0);
        assert_eq!(json[0]["action"], "create");
        assert!(json[0].get("error").is_none());
        assert_eq!(json[1]["error"], "Unknown pattern: nope");
        assert_eq!(json[1]["action"], "destroy");
    }

    #[test]
    fn test_rendering_is_deterministic() {
        assert_eq!(render_batch(&outcome()).unwrap(), render_batch(&outcome()).unwrap());
        assert_eq!(render_tfvars(&tfvars()), render_tfvars(&tfvars()));
    }
}
