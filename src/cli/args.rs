//! Command-line argument parsing for OSM Power Fetcher
//!
//! This module defines the CLI structure using clap derive macros: the direct
//! per-country download path, the bulk extraction path, standalone output
//! reconciliation and configuration management.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::CliOverrides;

/// OSM Power Fetcher - Acquire OpenStreetMap power-infrastructure extracts
#[derive(Parser, Debug)]
#[command(
    name = "osm_power_fetcher",
    version,
    about = "Acquire OpenStreetMap power-infrastructure extracts for energy system modelling",
    long_about = "Downloads OpenStreetMap extracts (latest or a dated snapshot) for a set of countries,
or runs a bulk extraction of substations, lines, cables and generators and normalizes the
results into fixed all_raw_<feature>s.<format> files."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode - only errors are logged
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Orchestrator parameters file (JSON); replaces the configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub params: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download PBF extracts, checksums and power metadata per country
    Download(DownloadArgs),

    /// Run a bulk power-feature extraction and normalize its outputs
    Extract(ExtractArgs),

    /// Normalize the files in <output-dir>/out without extracting
    Reconcile(ReconcileArgs),

    /// Show or initialize the configuration
    Config(ConfigArgs),
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level, with verbosity flags taking precedence over `configured`
    pub fn log_level(&self, configured: &str) -> String {
        if self.global.quiet {
            "error".to_string()
        } else if self.global.verbose {
            "debug".to_string()
        } else {
            configured.to_string()
        }
    }
}

/// Arguments for the download command
#[derive(Args, Debug, Clone, Default)]
pub struct DownloadArgs {
    /// Country codes to download (e.g. CO PE)
    #[arg(short, long, num_args = 1.., value_name = "CODE")]
    pub countries: Option<Vec<String>>,

    /// Directory for downloaded files [default: configured data_dir]
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Download a dated snapshot instead of the latest extract
    #[arg(long)]
    pub historical: bool,

    /// Snapshot date (YYYY-MM-DD) used with --historical
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub date: Option<String>,

    /// Skip the power metadata file
    #[arg(long)]
    pub no_power_json: bool,

    /// Print the results as JSON
    #[arg(long)]
    pub json: bool,
}

impl DownloadArgs {
    /// Command-line overrides for configuration resolution
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            countries: self.countries.clone(),
            historical: self.historical,
            date: self.date.clone(),
            download_power_json: self.no_power_json.then_some(false),
            data_dir: self.output_dir.clone(),
            output_dir: None,
        }
    }
}

/// Arguments for the extract command
#[derive(Args, Debug, Clone, Default)]
pub struct ExtractArgs {
    /// Country codes to extract (e.g. CO PE)
    #[arg(short, long, num_args = 1.., value_name = "CODE")]
    pub countries: Option<Vec<String>>,

    /// Snapshot date (YYYY-MM-DD); latest data when omitted
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub date: Option<String>,

    /// Directory for raw OSM data
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory for the normalized outputs
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Path to the earth_osm executable
    #[arg(long, value_name = "PATH")]
    pub earth_osm: Option<PathBuf>,
}

impl ExtractArgs {
    /// Command-line overrides for configuration resolution
    ///
    /// The date is left out: the bulk path validates it itself.
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            countries: self.countries.clone(),
            data_dir: self.data_dir.clone(),
            output_dir: self.output_dir.clone(),
            ..Default::default()
        }
    }
}

/// Arguments for the reconcile command
#[derive(Args, Debug, Clone, Default)]
pub struct ReconcileArgs {
    /// Directory holding the out/ working directory [default: configured output_dir]
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

/// Arguments for configuration management
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write a commented default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_download_args() {
        let cli = Cli::parse_from([
            "osm_power_fetcher",
            "download",
            "--countries",
            "CO",
            "PE",
            "--historical",
            "--date",
            "2020-01-01",
            "--no-power-json",
        ]);

        let Commands::Download(args) = cli.command else {
            panic!("expected download command");
        };
        let overrides = args.overrides();
        assert_eq!(
            overrides.countries,
            Some(vec!["CO".to_string(), "PE".to_string()])
        );
        assert!(overrides.historical);
        assert_eq!(overrides.date.as_deref(), Some("2020-01-01"));
        assert_eq!(overrides.download_power_json, Some(false));
    }

    #[test]
    fn test_download_output_dir_overrides_data_dir() {
        let cli = Cli::parse_from(["osm_power_fetcher", "download", "-o", "/tmp/osm"]);
        let Commands::Download(args) = cli.command else {
            panic!("expected download command");
        };
        assert_eq!(args.overrides().data_dir, Some(PathBuf::from("/tmp/osm")));
        assert_eq!(args.overrides().download_power_json, None);
    }

    #[test]
    fn test_global_args_after_subcommand() {
        let cli = Cli::parse_from([
            "osm_power_fetcher",
            "extract",
            "--date",
            "2020-01-01",
            "-v",
            "--params",
            "params.json",
        ]);
        assert!(cli.global.verbose);
        assert_eq!(cli.global.params, Some(PathBuf::from("params.json")));
        assert!(matches!(cli.command, Commands::Extract(_)));
    }

    #[test]
    fn test_log_level() {
        let cli = Cli::parse_from(["osm_power_fetcher", "reconcile"]);
        assert_eq!(cli.log_level("warn"), "warn");

        let cli = Cli::parse_from(["osm_power_fetcher", "-v", "reconcile"]);
        assert_eq!(cli.log_level("warn"), "debug");

        let cli = Cli::parse_from(["osm_power_fetcher", "reconcile", "--quiet"]);
        assert_eq!(cli.log_level("debug"), "error");
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["osm_power_fetcher", "-q", "-v", "reconcile"]);
        assert!(result.is_err());
    }
}
