//! Batch-level aggregates over per-document results

use super::{DocumentResult, compute_execution_order};
use crate::cost::total_cost;
use crate::request::Action;
use serde_json::Number;

/// Per-document results of a submission plus its execution order
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub results: Vec<DocumentResult>,
    pub execution_order: Vec<usize>,
}

impl BatchOutcome {
    pub fn new(results: Vec<DocumentResult>) -> Self {
        let execution_order = compute_execution_order(&results);
        Self { results, execution_order }
    }

    pub fn document_count(&self) -> usize {
        self.results.len()
    }

    pub fn all_valid(&self) -> bool {
        self.results.iter().all(|r| r.valid)
    }

    pub fn create_count(&self) -> usize {
        self.count(Action::Create)
    }

    pub fn destroy_count(&self) -> usize {
        self.count(Action::Destroy)
    }

    fn count(&self, action: Action) -> usize {
        self.results.iter().filter(|r| r.is_valid_action(action)).count()
    }

    pub fn invalid(&self) -> impl Iterator<Item = &DocumentResult> {
        self.results.iter().filter(|r| !r.valid)
    }

    /// Sum of known monthly costs; `None` when nothing is priced
    pub fn total_monthly_cost(&self) -> Option<Number> {
        total_cost(self.results.iter().filter_map(|r| r.estimated_cost_usd.as_ref()))
    }

    /// Every error in the batch, prefixed with its document index
    pub fn all_errors(&self) -> Vec<String> {
        self.results
            .iter()
            .flat_map(|r| r.errors.iter().map(move |e| format!("Document {}: {}", r.index, e)))
            .collect()
    }

    /// Status a request-submission service answers with
    pub fn status_code(&self) -> u16 {
        if self.all_valid() { 200 } else { 400 }
    }
}
