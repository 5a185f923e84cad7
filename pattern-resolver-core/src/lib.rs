//! Core functionality for the pattern resolver
//!
//! Turns declarative infrastructure request documents into the concrete
//! parameter sets a provisioning tool consumes. A request names a pattern
//! from the catalog plus a handful of overrides; everything else is filled
//! in from environment-driven sizing, conditional feature defaults and the
//! pattern's own optional-field defaults.

pub mod catalog;
pub mod config;
pub mod cost;
pub mod errors;
pub mod orchestrator;
pub mod output;
pub mod request;
pub mod resolver;
pub mod validation;

pub use catalog::{Pattern, PatternCatalog, SizingDefaults};
pub use config::ResolverConfig;
pub use cost::{CostEstimate, CostEstimator};
pub use errors::{ResolveError, ResolveResult};
pub use orchestrator::{BatchOutcome, DocumentResult, Orchestrator};
pub use request::{Action, Environment, ParsedDocument, RequestDocument, parse_documents};
pub use resolver::{PatternResolver, Tfvars};
pub use validation::{ValidationReport, Validator};
