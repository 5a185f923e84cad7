use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::cost::CostArgs;
use super::commands::dry_run::DryRunArgs;
use super::commands::patterns::PatternsArgs;
use super::commands::resolve::ResolveArgs;
use super::commands::validate::ValidateArgs;

#[derive(Parser, Debug)]
#[command(
    name = "resolve-pattern",
    version,
    about = "Resolve infrastructure pattern requests into provisioning variables",
    long_about = "Validates pattern request documents against the pattern catalog, fills in environment-driven sizing and feature defaults, and emits variables for the provisioning tool."
)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory of pattern definitions (overrides the config file)
    #[arg(long, global = true)]
    pub patterns_dir: Option<PathBuf>,

    /// Sizing defaults file (overrides the config file)
    #[arg(long, global = true)]
    pub sizing_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve request documents
    #[command(about = "Resolve a request file into tfvars, JSON, environment variables or a batch report")]
    Resolve(ResolveArgs),

    /// Validate request documents
    #[command(about = "Validate every document of a request file without emitting variables")]
    Validate(ValidateArgs),

    /// Estimate monthly costs
    #[command(about = "Estimate the monthly cost of each requested pattern")]
    Cost(CostArgs),

    /// List catalog patterns
    #[command(about = "List available patterns or show details for one")]
    Patterns(PatternsArgs),

    /// Validate and resolve without provisioning
    #[command(name = "dry-run", about = "Report what a request file would provision, and in which order")]
    DryRun(DryRunArgs),
}
