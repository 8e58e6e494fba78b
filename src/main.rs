use anyhow::{Context, Result};
use clap::Parser;
use partsync::{SyncOptions, SyncReport};
use partsync_config::RuntimeConfig;
use std::path::PathBuf;

/// Register object-store time partitions in a Glue-compatible catalog
#[derive(Parser)]
#[command(name = "partsync")]
#[command(version)]
#[command(about = "Register object-store time partitions in a Glue-compatible catalog", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short = 'v', long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Print partitions that would be registered without writing them
    #[arg(long)]
    dry_run: bool,

    /// Rediscover from the first object even when the catalog has partitions
    #[arg(long)]
    full: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?
        .block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    // Step 1: Load base configuration
    let mut config = if let Some(config_path) = &cli.config {
        RuntimeConfig::load_from_path(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        RuntimeConfig::load_or_default().context("Failed to load configuration")?
    };

    // Step 2: Apply CLI overrides (highest priority)
    if let Some(level) = &cli.log_level {
        config.log.level = level.clone();
    }

    // Step 3: Initialize tracing before validation so its warnings are visible
    partsync::init_tracing(&config);
    config.validate()?;

    // Step 4: Sync
    let options = SyncOptions {
        full: cli.full,
        dry_run: cli.dry_run,
    };
    let report = partsync::run_sync(&config, options).await?;

    print_report(&report);
    Ok(())
}

fn print_report(report: &SyncReport) {
    if report.dry_run {
        for partition in &report.discovered {
            println!("{}\t{}", partition.values, partition.location);
        }
    }

    println!(
        "{} discovery: {} existing, {} discovered, {} registered{}",
        report.mode,
        report.existing,
        report.discovered.len(),
        report.registered,
        if report.dry_run { " (dry run)" } else { "" }
    );
}
