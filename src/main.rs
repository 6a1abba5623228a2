//! Nyaa-Mirror main entry point
//!
//! This is the command-line interface for the Nyaa-Mirror catalog mirror.

use anyhow::Context;
use clap::Parser;
use nyaa_mirror::config::{load_config_or_default, validate, Config};
use nyaa_mirror::scanner::{
    discover_newest_id, scan, PageFetcher, RangeOptions, RangeScheduler, ScanOutcome,
};
use nyaa_mirror::storage::open_storage;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Nyaa-Mirror: an incremental torrent catalog mirror
///
/// Nyaa-Mirror walks post IDs in increasing order, fetches each listing
/// page and reconciles it into a local SQLite database. Posts and comments
/// that disappear upstream are kept and marked deleted.
#[derive(Parser, Debug)]
#[command(name = "nyaa-mirror")]
#[command(version)]
#[command(about = "An incremental torrent catalog mirror", long_about = None)]
struct Cli {
    /// Start after this ID (default: highest ID already stored)
    #[arg(long)]
    start: Option<i64>,

    /// Stop at this ID (default: newest ID from the RSS feed)
    #[arg(long)]
    end: Option<i64>,

    /// Path to the SQLite database (overrides the config file)
    #[arg(long, value_name = "PATH")]
    database: Option<PathBuf>,

    /// Skip IDs that already have a row in the database
    #[arg(long)]
    skip: bool,

    /// Skip ahead to the highest stored ID inside the range
    #[arg(long)]
    continue_in_range: bool,

    /// Path to TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,

    /// Validate config and show the range that would be scanned
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,
}

impl Cli {
    fn range_options(&self) -> RangeOptions {
        RangeOptions {
            start: self.start,
            end: self.end,
            skip_existing: self.skip,
            continue_in_range: self.continue_in_range,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match load_and_validate(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Failed to load configuration: {:#}", e);
            return Err(e.into());
        }
    };

    let result = if cli.stats {
        handle_stats(&config)
    } else if cli.dry_run {
        handle_dry_run(&config, cli.range_options()).await
    } else {
        handle_scan(&config, cli.range_options()).await
    };

    if let Err(e) = result {
        tracing::error!("{:#}", e);
        return Err(e.into());
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("nyaa_mirror=info,warn"),
            1 => EnvFilter::new("nyaa_mirror=debug,info"),
            2 => EnvFilter::new("nyaa_mirror=trace,debug"),
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

/// Loads the config file (or defaults), applies CLI overrides and validates
fn load_and_validate(cli: &Cli) -> anyhow::Result<Config> {
    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
    }

    let mut config = load_config_or_default(cli.config.as_deref())
        .context("could not read configuration")?;

    if let Some(database) = &cli.database {
        config.output.database_path = database.display().to_string();
    }

    validate(&config).context("invalid configuration")?;

    if let (Some(start), Some(end)) = (cli.start, cli.end) {
        anyhow::ensure!(start <= end, "--start ({}) is after --end ({})", start, end);
    }

    Ok(config)
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use nyaa_mirror::output::{load_statistics, print_statistics};

    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))
        .context("could not open database")?;

    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --dry-run mode: resolves the scan range without fetching
async fn handle_dry_run(config: &Config, options: RangeOptions) -> anyhow::Result<()> {
    println!("=== Nyaa-Mirror Dry Run ===\n");

    println!("Remote:");
    println!("  Base URL: {}", config.remote.base_url());
    println!("  User agent: {}", config.remote.user_agent);
    println!(
        "  Pacing: {}ms + up to {}ms jitter",
        config.pacing.base_delay_ms, config.pacing.jitter_ms
    );

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))
        .context("could not open database")?;
    let fetcher = PageFetcher::new(config)?;

    let discovered_end = if options.needs_discovery() {
        Some(
            discover_newest_id(fetcher.client(), &config.remote)
                .await
                .context("could not discover the newest post")?,
        )
    } else {
        None
    };

    let range = RangeScheduler::new(options).plan(&storage, discovered_end)?;

    println!("\n✓ Configuration is valid");
    match range.first_id() {
        Some(first) if !range.is_empty() => {
            println!("✓ Would scan IDs {} through {}", first, range.end_inclusive)
        }
        _ => println!("✓ Nothing to scan, the database is up to date"),
    }

    Ok(())
}

/// Handles the main scan operation
async fn handle_scan(config: &Config, options: RangeOptions) -> anyhow::Result<()> {
    let storage = open_storage(Path::new(&config.output.database_path))
        .context("could not open database")?;

    let cancel = CancellationToken::new();
    let signal_task = tokio::spawn(cancel_on_signal(cancel.clone()));

    let report = scan(config, storage, options, &cancel).await;
    signal_task.abort();
    let report = report?;

    tracing::debug!(
        "{} found, {} not found, {} skipped, {} retries",
        report.found,
        report.not_found,
        report.skipped,
        report.retries
    );

    match report.outcome {
        ScanOutcome::Done => println!("Finished going through all ids"),
        ScanOutcome::Cancelled => println!("Exiting early"),
    }

    Ok(())
}

/// Cancels `token` on the first interrupt or terminate signal
///
/// The scan notices cancellation before its next ID, so the ID in flight is
/// always reconciled first.
async fn cancel_on_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Signal received, stopping after the current id");
    token.cancel();
}
