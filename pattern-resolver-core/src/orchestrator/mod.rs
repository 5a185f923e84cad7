//! Multi-document orchestration
//!
//! Every document in a submission is validated and resolved on its own; one
//! bad document never stops the others. Once all results are in, the batch is
//! ordered so destroys run before creates.

mod batch;

pub use batch::BatchOutcome;

use crate::cost::CostEstimator;
use crate::request::{Action, MalformedDocument, Metadata, ParsedDocument, RequestDocument};
use crate::resolver::{DEFAULT_ENVIRONMENT, PatternResolver, Tfvars};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use tracing::{debug, info};

/// Flags surfaced as environment features, with their display names
pub const ENVIRONMENT_FEATURES: [(&str, &str); 3] = [
    ("enable_diagnostics", "diagnostics"),
    ("enable_access_review", "access_review"),
    ("geo_redundant_backup", "geo_redundant_backup"),
];

/// Outcome for one document of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentResult {
    pub index: usize,
    pub action: String,
    pub pattern: String,
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub tfvars: Option<Tfvars>,
    pub estimated_cost_usd: Option<Number>,
    pub state_key: Option<String>,
    pub resource_group: Option<String>,
    #[serde(default)]
    pub components: Vec<Value>,
    #[serde(default)]
    pub environment_features: Vec<String>,
}

impl DocumentResult {
    /// Result for a document that failed validation or parsing
    pub fn invalid(
        index: usize,
        action: impl Into<String>,
        pattern: impl Into<String>,
        errors: Vec<String>,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            index,
            action: action.into(),
            pattern: pattern.into(),
            valid: false,
            errors,
            warnings,
            tfvars: None,
            estimated_cost_usd: None,
            state_key: None,
            resource_group: None,
            components: Vec::new(),
            environment_features: Vec::new(),
        }
    }

    /// Typed action; `None` when the document carried an unrecognized one
    pub fn parsed_action(&self) -> Option<Action> {
        Action::parse(&self.action)
    }

    pub fn is_valid_action(&self, action: Action) -> bool {
        self.valid && self.parsed_action() == Some(action)
    }
}

/// Validates, resolves and orders batches of request documents
#[derive(Debug, Clone, Copy)]
pub struct Orchestrator<'a> {
    resolver: PatternResolver<'a>,
    costs: CostEstimator<'a>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(resolver: PatternResolver<'a>) -> Self {
        let costs = CostEstimator::new(resolver.catalog(), resolver.defaults());
        Self { resolver, costs }
    }

    pub fn resolver(&self) -> &PatternResolver<'a> {
        &self.resolver
    }

    /// Resolve one document, reporting failures in the result instead of erroring
    pub fn resolve_document(&self, index: usize, document: &RequestDocument) -> DocumentResult {
        let action = document.action_name().to_string();
        let pattern_name = document.pattern_name().to_string();

        let report = self.resolver.validate(document);
        if !report.valid {
            debug!("Document {} ({}) failed validation: {:?}", index, pattern_name, report.errors);
            return DocumentResult::invalid(index, action, pattern_name, report.errors, report.warnings);
        }

        let tfvars = match self.resolver.resolve_validated(document, &report) {
            Ok(tfvars) => tfvars,
            Err(e) => {
                return DocumentResult::invalid(index, action, pattern_name, e.messages(), report.warnings);
            }
        };

        let components = self
            .resolver
            .catalog()
            .get(&pattern_name)
            .map(|pattern| pattern.components.clone())
            .unwrap_or_default();

        DocumentResult {
            index,
            action,
            valid: true,
            errors: Vec::new(),
            warnings: report.warnings,
            estimated_cost_usd: self.costs.estimate(document),
            state_key: Some(state_key(document)),
            resource_group: Some(resource_group(document)),
            components,
            environment_features: environment_features(&tfvars),
            tfvars: Some(tfvars),
            pattern: pattern_name,
        }
    }

    /// Resolve every document; results keep input order
    pub fn resolve_all(&self, documents: &[RequestDocument]) -> Vec<DocumentResult> {
        let results: Vec<DocumentResult> = documents
            .par_iter()
            .enumerate()
            .map(|(index, document)| self.resolve_document(index, document))
            .collect();
        log_summary(&results);
        results
    }

    /// Resolve a parsed submission, including documents that failed to parse
    pub fn resolve_parsed(&self, documents: &[ParsedDocument]) -> Vec<DocumentResult> {
        let results: Vec<DocumentResult> = documents
            .par_iter()
            .enumerate()
            .map(|(index, parsed)| match parsed {
                ParsedDocument::Request(document) => self.resolve_document(index, document),
                ParsedDocument::Malformed(bad) => malformed_result(index, bad),
            })
            .collect();
        log_summary(&results);
        results
    }

    /// Resolve and order a batch in one step
    pub fn run(&self, documents: &[ParsedDocument]) -> BatchOutcome {
        BatchOutcome::new(self.resolve_parsed(documents))
    }
}

fn malformed_result(index: usize, bad: &MalformedDocument) -> DocumentResult {
    DocumentResult::invalid(index, bad.action.clone(), bad.pattern.clone(), bad.error.messages(), Vec::new())
}

fn log_summary(results: &[DocumentResult]) {
    let valid = results.iter().filter(|r| r.valid).count();
    info!("Resolved batch: {} documents, {} valid", results.len(), valid);
}

/// Indices of valid documents in execution order: destroys, then creates
///
/// Relative order within each group is preserved; invalid documents are left
/// out entirely.
pub fn compute_execution_order(results: &[DocumentResult]) -> Vec<usize> {
    let destroys = results.iter().filter(|r| r.is_valid_action(Action::Destroy));
    let creates = results.iter().filter(|r| r.is_valid_action(Action::Create));
    let order: Vec<usize> = destroys.chain(creates).map(|r| r.index).collect();
    debug!("Execution order: {:?}", order);
    order
}

/// Key addressing a document's persisted provisioning state
pub fn state_key(document: &RequestDocument) -> String {
    let fallback = Metadata::default();
    let metadata = document.metadata.as_ref().unwrap_or(&fallback);
    let pattern = document.pattern_name();
    let name = document
        .config
        .as_ref()
        .and_then(|config| config.name())
        .unwrap_or_else(|| pattern.to_string());

    format!(
        "{}/{}/{}/{}-{}/terraform.tfstate",
        metadata.business_unit.as_deref().unwrap_or("default"),
        metadata.environment.as_deref().unwrap_or(DEFAULT_ENVIRONMENT),
        metadata.project.as_deref().unwrap_or("unknown"),
        pattern,
        name
    )
}

/// Resource group a document's resources are placed in
pub fn resource_group(document: &RequestDocument) -> String {
    let fallback = Metadata::default();
    let metadata = document.metadata.as_ref().unwrap_or(&fallback);
    format!(
        "rg-{}-{}-{}",
        metadata.project.as_deref().unwrap_or("unknown"),
        document.pattern_name(),
        metadata.environment.as_deref().unwrap_or(DEFAULT_ENVIRONMENT)
    )
}

/// Display names of the feature flags that resolved to `true`
pub fn environment_features(tfvars: &Tfvars) -> Vec<String> {
    ENVIRONMENT_FEATURES
        .iter()
        .filter(|(flag, _)| tfvars.get(*flag).and_then(Value::as_bool).unwrap_or(false))
        .map(|(_, label)| label.to_string())
        .collect()
}
