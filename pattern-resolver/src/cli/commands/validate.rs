//! Validate command

use super::{Engine, OutputFormat, read_documents};
use anyhow::Result;
use clap::Args;
use pattern_resolver_core::BatchOutcome;
use pattern_resolver_core::output;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Request YAML file
    pub file: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

pub fn execute(args: ValidateArgs, engine: &Engine) -> Result<bool> {
    let documents = read_documents(&args.file)?;
    let outcome = engine.orchestrator().run(&documents);

    match args.output {
        OutputFormat::Json => println!("{}", output::render_validations(&outcome)?),
        OutputFormat::Text => print!("{}", text_report(&outcome)),
    }

    Ok(outcome.all_valid())
}

fn text_report(outcome: &BatchOutcome) -> String {
    let mut report = String::new();
    for result in &outcome.results {
        let status = if result.valid { "valid" } else { "INVALID" };
        report.push_str(&format!(
            "Document {} ({} {}): {}\n",
            result.index, result.action, result.pattern, status
        ));
        for error in &result.errors {
            report.push_str(&format!("  error: {}\n", error));
        }
        for warning in &result.warnings {
            report.push_str(&format!("  warning: {}\n", warning));
        }
    }

    let invalid = outcome.invalid().count();
    if invalid == 0 {
        report.push_str(&format!("All {} documents valid\n", outcome.document_count()));
    } else {
        report.push_str(&format!("{} of {} documents invalid\n", invalid, outcome.document_count()));
    }
    report
}
