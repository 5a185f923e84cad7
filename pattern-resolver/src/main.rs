use anyhow::Result;
use clap::Parser;
use pattern_resolver_core::ResolverConfig;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
use cli::commands::{self, Engine};
use cli::{Cli, Commands};

fn main() -> Result<ExitCode> {
    // Parse CLI arguments first to get verbosity level
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    // Logs go to stderr; stdout carries the rendered output only
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config = ResolverConfig::load(cli.config.as_deref())?
        .with_overrides(cli.patterns_dir, cli.sizing_file);
    debug!("Resolver config: {:?}", config);
    let engine = Engine::load(&config)?;

    let all_valid = match cli.command {
        Commands::Resolve(args) => {
            info!("Resolve command: {:?}", args);
            commands::resolve::execute(args, &engine)?
        }
        Commands::Validate(args) => {
            info!("Validate command: {:?}", args);
            commands::validate::execute(args, &engine)?
        }
        Commands::Cost(args) => {
            info!("Cost command: {:?}", args);
            commands::cost::execute(args, &engine)?
        }
        Commands::Patterns(args) => {
            info!("Patterns command: {:?}", args);
            commands::patterns::execute(args, &engine)?
        }
        Commands::DryRun(args) => {
            info!("Dry-run command: {:?}", args);
            commands::dry_run::execute(args, &engine)?
        }
    };

    Ok(if all_valid { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
