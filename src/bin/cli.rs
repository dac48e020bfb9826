//! Harvester CLI
//!
//! Local execution entry point for the digest harvest.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use harvester::{
    error::Result,
    fetch::{Credentials, SessionClient},
    models::Config,
    pipeline::run_harvest,
    storage::LocalStore,
};

/// Harvester - incremental mailing-list digest harvester
#[derive(Parser, Debug)]
#[command(
    name = "harvester",
    version,
    about = "Incrementally harvests job postings from a mailing-list digest archive"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full harvest: diff, scrape, store
    Run {
        /// Override the storage data directory
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("Harvester starting...");

    let mut config = Config::load_or_default(&cli.config);

    match cli.command {
        Command::Run { data_dir } => {
            if let Some(dir) = data_dir {
                config.storage.data_dir = dir.display().to_string();
            }
            config.validate()?;

            let credentials = Credentials::from_env()?;
            let client = SessionClient::new(config.archive.clone(), &config.fetch, credentials)?;
            let store = LocalStore::new(&config.storage.data_dir);

            let summary = run_harvest(&config, &client, &store).await?;
            if summary.noop {
                log::info!("Nothing new: latest compilations already recorded");
            } else {
                log::info!(
                    "Harvest complete: {} new weeks, {} posting records, {} embedded-URL records",
                    summary.new_weeks,
                    summary.posting_records,
                    summary.embedded_records
                );
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {e}");
                return Err(e);
            }
            log::info!("Archive index: {}", config.archive.index_url);
            log::info!(
                "Retry budget: {} attempts, {}s delay",
                config.retry.max_attempts,
                config.retry.delay_secs
            );
            log::info!("All validations passed!");
        }
    }

    log::info!("Done!");

    Ok(())
}
