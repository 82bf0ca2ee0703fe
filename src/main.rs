//! gpu-driver-specs main entry point
//!
//! This is the command-line interface for the driver archive harvester.

use anyhow::Context;
use clap::Parser;
use gpu_driver_specs::cache::CacheLayout;
use gpu_driver_specs::config::{load_config_with_hash, Config, FetchMode};
use gpu_driver_specs::crawler::crawl;
use gpu_driver_specs::output::{print_statistics, write_statistics, JsonLinesSink, RecordSink};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// gpu-driver-specs: harvest GPU support data from the driver archive
///
/// Crawls the FreeBSD driver archive, caches every detail page it reads and
/// writes one JSON object per supported GPU.
#[derive(Parser, Debug)]
#[command(name = "gpu-driver-specs")]
#[command(version)]
#[command(about = "Harvest GPU support data from the driver archive", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Write records to this file instead of stdout (JSON Lines)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Read the listing pages from the configured local snapshots
    #[arg(long)]
    replay: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the cache layout without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.replay {
        config.crawler.mode = FetchMode::Replay;
        gpu_driver_specs::config::validate(&config).context("replay mode is not configured")?;
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let stats = match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut sink = JsonLinesSink::new(BufWriter::new(file));
            run(config, &mut sink).await?
        }
        None => {
            let mut sink = JsonLinesSink::new(BufWriter::new(io::stdout().lock()));
            run(config, &mut sink).await?
        }
    };

    if !cli.quiet {
        // Records own stdout unless they went to a file.
        if cli.output.is_some() {
            print_statistics(&stats)?;
        } else {
            write_statistics(&mut io::stderr().lock(), &stats)?;
        }
    }

    Ok(())
}

async fn run(
    config: Config,
    sink: &mut dyn RecordSink,
) -> anyhow::Result<gpu_driver_specs::output::CrawlStats> {
    crawl(config, sink).await.map_err(|e| {
        tracing::error!("Crawl failed: {}", e);
        e.into()
    })
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so records on stdout stay machine readable.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("gpu_driver_specs=info,warn"),
            1 => EnvFilter::new("gpu_driver_specs=debug,info"),
            2 => EnvFilter::new("gpu_driver_specs=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows what a crawl would read and write
fn handle_dry_run(config: &Config) {
    let layout = CacheLayout::new(&config.cache.base_path);

    println!("=== gpu-driver-specs Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Mode: {}", config.crawler.mode);
    println!(
        "  Max concurrent fetches: {}",
        config.crawler.max_concurrent_fetches
    );
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  User agent: {}", config.user_agent.header_value());

    println!("\nListing pages:");
    let slots = [
        ("x64", &config.listing.x64_url, &config.listing.x64_file),
        ("x86", &config.listing.x86_url, &config.listing.x86_file),
    ];
    for (arch, url, file) in slots {
        match (config.crawler.mode, file) {
            (FetchMode::Replay, Some(file)) => println!(
                "  {}: {} (replayed from {})",
                arch,
                url,
                config.resolve_replay_file(file).display()
            ),
            _ => println!("  {}: {}", arch, url),
        }
    }

    println!("\nArchive fallback:");
    println!("  Availability: {}", config.archive.availability_url);
    println!("  Snapshots: {}", config.archive.snapshot_prefix);

    println!("\nCache layout:");
    println!("  Listings: {}", layout.listing_dir().display());
    println!("  Detail pages: {}", layout.detail_dir().display());

    println!("\n✓ Configuration is valid");
}
