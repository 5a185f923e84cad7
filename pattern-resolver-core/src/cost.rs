//! Monthly cost estimates
//!
//! Costs are precomputed per pattern in the catalog and passed through as
//! written, so `5` stays `5` in JSON output. Missing data yields `None`, never
//! zero and never an error.

use crate::catalog::{PatternCatalog, SizingDefaults};
use crate::request::RequestDocument;
use crate::resolver::{DEFAULT_ENVIRONMENT, resolve_size};
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Cost lookup result for one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub pattern: String,
    pub size: String,
    pub environment: String,
    pub estimated_monthly_cost_usd: Option<Number>,
}

/// Looks up catalog cost tables, sizing documents the same way the resolver does
#[derive(Debug, Clone, Copy)]
pub struct CostEstimator<'a> {
    catalog: &'a PatternCatalog,
    defaults: &'a SizingDefaults,
}

impl<'a> CostEstimator<'a> {
    pub fn new(catalog: &'a PatternCatalog, defaults: &'a SizingDefaults) -> Self {
        Self { catalog, defaults }
    }

    /// Monthly cost in USD, if the catalog has one
    pub fn estimate(&self, document: &RequestDocument) -> Option<Number> {
        self.estimate_record(document)?.estimated_monthly_cost_usd
    }

    /// Full lookup record; `None` only when the pattern is unknown
    pub fn estimate_record(&self, document: &RequestDocument) -> Option<CostEstimate> {
        let pattern = self.catalog.get(document.pattern.as_deref()?)?;
        let environment = document.environment().unwrap_or(DEFAULT_ENVIRONMENT);
        let size = resolve_size(document, self.defaults);

        Some(CostEstimate {
            pattern: pattern.name.clone(),
            estimated_monthly_cost_usd: pattern.cost_for(&size, environment),
            environment: environment.to_string(),
            size,
        })
    }
}

/// Sum of the known costs; `None` when nothing is priced
///
/// Whole-dollar totals stay integers so they render like the catalog values.
pub fn total_cost<'c>(costs: impl IntoIterator<Item = &'c Number>) -> Option<Number> {
    let total: f64 = costs.into_iter().filter_map(Number::as_f64).sum();
    if total <= 0.0 {
        return None;
    }
    if total.fract() == 0.0 && total < 9_007_199_254_740_992.0 {
        Some(Number::from(total as u64))
    } else {
        Number::from_f64(total)
    }
}
