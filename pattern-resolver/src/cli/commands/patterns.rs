//! Patterns command: catalog listing

use super::{Engine, OutputFormat, display_value};
use anyhow::{Result, bail};
use clap::Args;
use pattern_resolver_core::catalog::{PatternInfo, PatternSummary};

#[derive(Debug, Args)]
pub struct PatternsArgs {
    /// Show details for a single pattern
    pub name: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

pub fn execute(args: PatternsArgs, engine: &Engine) -> Result<bool> {
    match args.name {
        Some(name) => {
            let Some(info) = engine.catalog.info(&name) else {
                bail!("Unknown pattern: {}. Available: {:?}", name, engine.catalog.names());
            };
            match args.output {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&info)?),
                OutputFormat::Text => print!("{}", info_text(&info)),
            }
        }
        None => {
            let listing = engine.catalog.list();
            match args.output {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&listing)?),
                OutputFormat::Text => print!("{}", listing_text(&listing)),
            }
        }
    }
    Ok(true)
}

fn listing_text(listing: &[PatternSummary]) -> String {
    if listing.is_empty() {
        return "No patterns found\n".to_string();
    }
    listing
        .iter()
        .map(|p| format!("{:<24} {:<16} {}\n", p.name, p.category.as_str(), p.description))
        .collect()
}

fn info_text(info: &PatternInfo) -> String {
    let summary = &info.summary;
    let mut text = format!("{} ({})\n", summary.name, summary.category.as_str());
    if !summary.description.is_empty() {
        text.push_str(&format!("  {}\n", summary.description));
    }
    if !summary.components.is_empty() {
        let components: Vec<String> = summary.components.iter().map(display_value).collect();
        text.push_str(&format!("Components: {}\n", components.join(", ")));
    }
    if !info.use_cases.is_empty() {
        text.push_str("Use cases:\n");
        for use_case in &info.use_cases {
            text.push_str(&format!("  - {}\n", display_value(use_case)));
        }
    }
    text
}
