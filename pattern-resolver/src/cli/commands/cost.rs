//! Cost command: monthly estimates per document

use super::{Engine, OutputFormat, read_documents};
use anyhow::Result;
use clap::Args;
use pattern_resolver_core::output::{self, CostEntry};
use pattern_resolver_core::{CostEstimator, ParsedDocument};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct CostArgs {
    /// Request YAML file
    pub file: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

pub fn execute(args: CostArgs, engine: &Engine) -> Result<bool> {
    let documents = read_documents(&args.file)?;
    let entries = estimate_all(&documents, engine);

    match args.output {
        OutputFormat::Json => println!("{}", output::render_costs(&entries)?),
        OutputFormat::Text => print!("{}", text_report(&entries)),
    }

    Ok(entries.iter().all(|entry| entry.error.is_none()))
}

fn estimate_all(documents: &[ParsedDocument], engine: &Engine) -> Vec<CostEntry> {
    let estimator = CostEstimator::new(&engine.catalog, &engine.defaults);
    documents
        .iter()
        .map(|parsed| match parsed {
            ParsedDocument::Request(document) => CostEntry::new(
                document.action_name(),
                document.pattern_name(),
                estimator.estimate_record(document),
            ),
            ParsedDocument::Malformed(bad) => CostEntry {
                estimate: None,
                error: Some(bad.error.to_string()),
                action: bad.action.clone(),
            },
        })
        .collect()
}

fn text_report(entries: &[CostEntry]) -> String {
    let mut report = String::new();
    let mut total = 0.0;

    for entry in entries {
        match (&entry.estimate, &entry.error) {
            (Some(estimate), _) => {
                let cost = match estimate.estimated_monthly_cost_usd.as_ref().and_then(|c| c.as_f64()) {
                    Some(cost) => {
                        total += cost;
                        format!("${:.2}/month", cost)
                    }
                    None => "no estimate available".to_string(),
                };
                report.push_str(&format!(
                    "{} {} ({}, {}): {}\n",
                    entry.action, estimate.pattern, estimate.size, estimate.environment, cost
                ));
            }
            (None, error) => {
                report.push_str(&format!("{}: {}\n", entry.action, error.as_deref().unwrap_or("no estimate")));
            }
        }
    }

    report.push_str(&format!("Total: ${:.2}/month\n", total));
    report
}
