//! Refresh bundled prefix-map contexts from their upstream sources.
//!
//! Usage:
//!   slurp-prefixmaps                       # every registered context
//!   slurp-prefixmaps obo go merged         # a subset
//!   slurp-prefixmaps -d /tmp/out --offline linked_data bioportal
//!
//! One summary line per written context goes to stdout; logs go to stderr.

use anyhow::{Context, Result, bail};
use clap::Parser;
use prefixmaps::ingest::{Fetch, HttpFetcher, SourceReader, StaticFetcher};
use prefixmaps::logging::{init_tracing, level_for};
use prefixmaps::{ContextStore, EtlRunner, exit_code_for, find_data_dir};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "slurp-prefixmaps", version)]
#[command(about = "Regenerate prefix-map contexts from their registered sources")]
struct Cli {
    /// Contexts to regenerate; every registered context when omitted.
    contexts: Vec<String>,
    /// Directory to write contexts into (defaults to the data directory).
    #[arg(long, short = 'd')]
    output_directory: Option<PathBuf>,
    /// Data directory holding contexts.yaml and curated inputs (overrides
    /// PREFIXMAPS_DATA_DIR).
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// HTTP timeout per request.
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,
    /// Never touch the network; remote contexts fail.
    #[arg(long)]
    offline: bool,
    /// Fail when any written context has validation messages.
    #[arg(long)]
    strict: bool,
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Only log errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(exit_code_for(&err));
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(level_for(cli.verbose, cli.quiet));

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => find_data_dir()?,
    };
    let store = ContextStore::open(&data_dir)
        .with_context(|| format!("opening data directory {}", data_dir.display()))?;
    let output_dir = cli
        .output_directory
        .unwrap_or_else(|| store.dir().to_path_buf());

    let fetcher: Box<dyn Fetch> = if cli.offline {
        Box::new(StaticFetcher::offline())
    } else {
        Box::new(HttpFetcher::new(Duration::from_secs(cli.timeout_secs)))
    };
    let reader = SourceReader::new(store.dir(), fetcher);
    let runner = EtlRunner::new(store, reader);

    let mut report = runner.run(&cli.contexts, &output_dir)?;
    for summary in &report.summaries {
        println!(
            "{}\t{} expansions\t{} canonical\t{} warnings\t{}",
            summary.name,
            summary.expansions,
            summary.canonical,
            summary.validation_messages,
            summary.path.display()
        );
    }

    if !report.failures.is_empty() {
        let names: Vec<String> = report.failures.iter().map(|(n, _)| n.clone()).collect();
        let (_, first) = report.failures.remove(0);
        return Err(first.context(format!("failed to regenerate: {}", names.join(", "))));
    }

    if cli.strict {
        let noisy: Vec<&str> = report
            .summaries
            .iter()
            .filter(|s| s.validation_messages > 0)
            .map(|s| s.name.as_str())
            .collect();
        if !noisy.is_empty() {
            bail!("validation messages in: {}", noisy.join(", "));
        }
    }
    Ok(())
}
