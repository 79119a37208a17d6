//! Feed-Harvest main entry point
//!
//! This is the command-line interface for offline extraction: it reads a
//! previously captured feed snapshot, extracts records for each keyword and
//! writes the HTML/JSON/CSV result files.

use anyhow::{bail, Context};
use clap::Parser;
use feed_harvest::config::{load_config_with_hash, load_keywords, Config};
use feed_harvest::output::write_outputs;
use feed_harvest::{RecordExtractor, Snapshot};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Feed-Harvest: record extraction from lazily loading feeds
///
/// Turns a captured feed page into normalized ad records with timing
/// fields and classified media links.
#[derive(Parser, Debug)]
#[command(name = "feed-harvest")]
#[command(version = "1.0.0")]
#[command(about = "Extract ad records from a captured feed page", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Captured page markup to extract from
    #[arg(long, value_name = "FILE")]
    snapshot: PathBuf,

    /// Keyword the snapshot was gathered for
    #[arg(long, conflicts_with = "keywords_file", required_unless_present = "keywords_file")]
    keyword: Option<String>,

    /// File with one keyword per line; the snapshot is extracted once per keyword
    #[arg(long, value_name = "FILE")]
    keywords_file: Option<PathBuf>,

    /// Override the configured output directory
    #[arg(long, value_name = "DIR")]
    output_dir: Option<String>,

    /// Extract and report counts without writing any files
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.clone();
    }

    let keywords = match (&cli.keyword, &cli.keywords_file) {
        (Some(keyword), _) => vec![keyword.clone()],
        (None, Some(path)) => load_keywords(path)
            .with_context(|| format!("Failed to load keywords from {}", path.display()))?,
        (None, None) => bail!("either --keyword or --keywords-file is required"),
    };
    if keywords.is_empty() {
        bail!("no keywords to process");
    }

    let markup = tokio::fs::read_to_string(&cli.snapshot)
        .await
        .with_context(|| format!("Failed to read snapshot {}", cli.snapshot.display()))?;
    let snapshot = Snapshot::new(markup);

    handle_extract(&config, &snapshot, &keywords, cli.dry_run)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("feed_harvest=info,warn"),
            1 => EnvFilter::new("feed_harvest=debug,info"),
            2 => EnvFilter::new("feed_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Extracts records for every keyword and persists them unless `dry_run` is set
fn handle_extract(
    config: &Config,
    snapshot: &Snapshot,
    keywords: &[String],
    dry_run: bool,
) -> anyhow::Result<()> {
    let extractor = RecordExtractor::new(config)?;
    let mut total = 0;

    for keyword in keywords {
        let records = extractor.extract_all(snapshot, keyword);
        total += records.len();

        if dry_run {
            println!("{}: {} records", keyword, records.len());
            continue;
        }

        let written = write_outputs(&config.output, keyword, snapshot, &records)
            .with_context(|| format!("Failed to write results for '{}'", keyword))?;
        println!(
            "✓ {}: {} records -> {}",
            keyword,
            records.len(),
            written.json.display()
        );
    }

    tracing::info!("Processed {} keywords, {} records in total", keywords.len(), total);
    Ok(())
}
