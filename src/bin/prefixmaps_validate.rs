//! Check the context registry and the integrity of bundled contexts.
//!
//! Usage:
//!   prefixmaps-validate                      # registry plus every bundled context
//!   prefixmaps-validate bioportal merged     # registry plus the named contexts
//!   prefixmaps-validate --registry-only --data-dir ./data

use anyhow::{Context, Result, bail};
use clap::Parser;
use prefixmaps::logging::{init_tracing, level_for};
use prefixmaps::schema_loader::{CONTEXT_REGISTRY_SCHEMA, CompiledSchema};
use prefixmaps::{ContextStore, PrefixMapError, REGISTRY_FILE, exit_code_for, find_data_dir};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Parser, Debug)]
#[command(name = "prefixmaps-validate", version)]
#[command(about = "Validate contexts.yaml and the bundled prefix-map contexts")]
struct Cli {
    /// Contexts to check; every serialized context when omitted.
    contexts: Vec<String>,
    /// Data directory holding contexts.yaml.
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Optional registry schema override.
    #[arg(long)]
    schema: Option<PathBuf>,
    /// Stop after validating contexts.yaml.
    #[arg(long)]
    registry_only: bool,
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(exit_code_for(&err));
    }
}

fn validate_registry_file(path: &Path, schema_override: Option<&Path>) -> Result<()> {
    let schema = match schema_override {
        Some(path) => CompiledSchema::load(path)?,
        None => CompiledSchema::from_json_str("context_registry", CONTEXT_REGISTRY_SCHEMA)?,
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading context registry {}", path.display()))?;
    let yaml: serde_yaml::Value = serde_yaml::from_str(&text)
        .with_context(|| format!("parsing context registry {}", path.display()))?;
    let instance: Value =
        serde_json::to_value(yaml).context("converting context registry to JSON")?;
    let violations = schema.violations(&instance);
    if !violations.is_empty() {
        return Err(PrefixMapError::InvalidRegistry(format!(
            "{} failed schema validation against {}:\n{}",
            path.display(),
            schema.name(),
            violations.join("\n")
        ))
        .into());
    }
    Ok(())
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(level_for(cli.verbose, false));

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => find_data_dir()?,
    };
    validate_registry_file(&data_dir.join(REGISTRY_FILE), cli.schema.as_deref())?;
    let store = ContextStore::open(&data_dir)?;
    println!(
        "ok\t{}\t{} contexts",
        REGISTRY_FILE,
        store.registry().names().count()
    );
    if cli.registry_only {
        return Ok(());
    }

    let names: Vec<String> = if cli.contexts.is_empty() {
        store.context_paths()?.into_keys().collect()
    } else {
        cli.contexts.clone()
    };

    let mut failed = Vec::new();
    for name in &names {
        let context = store.load_context(name)?;
        for message in context.validate(true) {
            warn!("{name}: {message}");
        }
        let report = context.integrity_report();
        if report.is_clean() {
            println!("ok\t{name}\t{} expansions", context.len());
        } else {
            for message in report.messages() {
                println!("fail\t{name}\t{message}");
            }
            failed.push(name.as_str());
        }
    }

    if !failed.is_empty() {
        bail!("integrity check failed for: {}", failed.join(", "));
    }
    Ok(())
}
