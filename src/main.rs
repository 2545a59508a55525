//! OSM Power Fetcher CLI application
//!
//! Command-line interface for acquiring OpenStreetMap power-infrastructure extracts
//! and normalizing the extracted feature files.

use std::process;

use tracing::{info, warn};
use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

use osm_power_fetcher::cli::{
    handle_config, handle_download, handle_extract, handle_reconcile, Cli, Commands,
};
use osm_power_fetcher::config::{AppConfig, ConfigSource};
use osm_power_fetcher::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    let source = ConfigSource::from_cli(cli.global.config.clone(), cli.global.params.clone());
    let app_config = AppConfig::load(&source).await?;

    init_logging(&cli, &app_config.logging.level);

    info!("OSM Power Fetcher v{} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Download(args) => {
            info!("Executing download command");
            handle_download(args, &app_config).await
        }
        Commands::Extract(args) => {
            info!("Executing extract command");
            handle_extract(args, &app_config).await
        }
        Commands::Reconcile(args) => {
            info!("Executing reconcile command");
            handle_reconcile(args, &app_config).await
        }
        Commands::Config(args) => handle_config(args, &app_config, &source).await,
    }
}

/// Initialize logging from CLI verbosity and the configured level
fn init_logging(cli: &Cli, configured_level: &str) {
    let log_level = cli.log_level(configured_level);

    let mut invalid_level = false;
    let filter = match format!("osm_power_fetcher={}", log_level).parse() {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(_) => {
            invalid_level = true;
            EnvFilter::from_default_env().add_directive(LevelFilter::INFO.into())
        }
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if invalid_level {
        warn!("Invalid log level {:?}, using info", log_level);
    }
}
