//! Resolve command: request file to provisioning variables

use super::{Engine, read_documents};
use anyhow::{Result, bail};
use clap::{Args, ValueEnum};
use pattern_resolver_core::output;
use pattern_resolver_core::{ParsedDocument, RequestDocument, Tfvars};
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Request YAML file; may hold several documents separated by `---`
    pub file: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = ResolveFormat::Tfvars)]
    pub output: ResolveFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResolveFormat {
    Tfvars,
    Json,
    Env,
    MultiJson,
}

pub fn execute(args: ResolveArgs, engine: &Engine) -> Result<bool> {
    let documents = read_documents(&args.file)?;

    if documents.len() > 1 || args.output == ResolveFormat::MultiJson {
        let outcome = engine.orchestrator().run(&documents);
        println!("{}", output::render_batch(&outcome)?);
        return Ok(outcome.all_valid());
    }

    let Some(parsed) = documents.first() else {
        bail!("No documents found in {:?}", args.file);
    };
    let document = match parsed {
        ParsedDocument::Request(document) => document,
        ParsedDocument::Malformed(bad) => {
            eprintln!("Error: {}", bad.error);
            return Ok(false);
        }
    };

    match resolve_single(document, engine) {
        Some(tfvars) => {
            println!("{}", render(&tfvars, args.output)?);
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Resolve one document, reporting problems on stderr
fn resolve_single(document: &RequestDocument, engine: &Engine) -> Option<Tfvars> {
    let resolver = engine.resolver();
    let report = resolver.validate(document);
    for warning in &report.warnings {
        warn!("{}", warning);
    }

    match resolver.resolve(document) {
        Ok(tfvars) => Some(tfvars),
        Err(e) => {
            eprintln!("Validation failed:");
            for message in e.messages() {
                eprintln!("  - {}", message);
            }
            None
        }
    }
}

fn render(tfvars: &Tfvars, format: ResolveFormat) -> Result<String> {
    Ok(match format {
        ResolveFormat::Tfvars => output::render_tfvars(tfvars),
        ResolveFormat::Json | ResolveFormat::MultiJson => output::render_json(tfvars)?,
        ResolveFormat::Env => output::render_env(tfvars),
    })
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;

    fn args(file: PathBuf, output: ResolveFormat) -> ResolveArgs {
        ResolveArgs { file, output }
    }

    #[test]
    fn test_single_valid_document() {
        let (dir, engine) = engine();
        let path = request_file(&dir, VALID_REQUEST);
        assert!(execute(args(path, ResolveFormat::Tfvars), &engine).unwrap());
    }

    #[test]
    fn test_single_invalid_document() {
        let (dir, engine) = engine();
        let path = request_file(&dir, &VALID_REQUEST.replace("keyvault", "mongodb"));
        assert!(!execute(args(path, ResolveFormat::Json), &engine).unwrap());
    }

    #[test]
    fn test_batch_reports_any_invalid() {
        let (dir, engine) = engine();
        let content = format!("{}---\n{}", VALID_REQUEST, VALID_REQUEST.replace("environment: dev", "environment: qa"));
        let path = request_file(&dir, &content);
        assert!(!execute(args(path, ResolveFormat::Tfvars), &engine).unwrap());
    }

    #[test]
    fn test_render_formats() {
        let (_dir, engine) = engine();
        let document = RequestDocument::from_yaml_str(VALID_REQUEST).unwrap();
        let tfvars = resolve_single(&document, &engine).unwrap();

        assert!(render(&tfvars, ResolveFormat::Tfvars).unwrap().contains("sku = \"standard\""));
        assert!(render(&tfvars, ResolveFormat::Env).unwrap().contains("TF_VAR_name=secrets"));
        let json: serde_json::Value =
            serde_json::from_str(&render(&tfvars, ResolveFormat::Json).unwrap()).unwrap();
        assert_eq!(json["soft_delete_days"], 7);
    }
}
