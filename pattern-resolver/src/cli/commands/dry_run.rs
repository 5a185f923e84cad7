//! Dry-run command: validate and resolve a submission without provisioning

use super::{Engine, read_documents};
use anyhow::Result;
use clap::Args;
use pattern_resolver_core::output;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Args)]
pub struct DryRunArgs {
    /// Request YAML file
    pub file: PathBuf,
}

pub fn execute(args: DryRunArgs, engine: &Engine) -> Result<bool> {
    let documents = read_documents(&args.file)?;
    let outcome = engine.orchestrator().run(&documents);

    info!(
        "Dry run: {} documents, status {}",
        outcome.document_count(),
        outcome.status_code()
    );
    println!("{}", output::render_dry_run(&outcome)?);

    Ok(outcome.all_valid())
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;

    #[test]
    fn test_dry_run_status() {
        let (dir, engine) = engine();
        let path = request_file(&dir, VALID_REQUEST);
        assert!(execute(DryRunArgs { file: path }, &engine).unwrap());

        let broken = request_file(&dir, "pattern: keyvault\n");
        assert!(!execute(DryRunArgs { file: broken }, &engine).unwrap());
    }
}
