//! Command handlers for OSM Power Fetcher CLI
//!
//! This module implements the command handlers that coordinate between CLI
//! arguments, the loaded configuration and the core application functionality.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info, warn};

use crate::app::{
    reconcile, run_countries, AcquisitionReport, Artifact, BulkFetcher, CountryAcquirer,
    EarthOsmExtractor, GeofabrikResolver, OsmClient, ReconcileAction, ReconcileReport,
};
use crate::cli::{ConfigAction, ConfigArgs, DownloadArgs, ExtractArgs, ReconcileArgs};
use crate::config::{AcquisitionConfig, AppConfig, CliOverrides, ConfigSource};
use crate::errors::{AppError, Result};

/// Handle the download command
///
/// Runs the direct per-country path: resolve each country, download its extract,
/// checksum and power metadata, and print a per-artifact report. Failed artifacts
/// are reported, not turned into an error exit.
pub async fn handle_download(args: DownloadArgs, app_config: &AppConfig) -> Result<()> {
    let start_time = Instant::now();

    let config = AcquisitionConfig::resolve(app_config, &args.overrides())?;
    config.warn_inconsistencies();

    match config.snapshot() {
        Some(date) => info!(
            "Downloading {} countries at snapshot {} into {}",
            config.countries.len(),
            date,
            config.data_dir.display()
        ),
        None => info!(
            "Downloading latest data for {} countries into {}",
            config.countries.len(),
            config.data_dir.display()
        ),
    }

    let client = Arc::new(OsmClient::with_config(app_config.client.clone())?);
    let resolver = Arc::new(GeofabrikResolver::new(client.clone()));
    let show_progress = !args.json && atty::is(atty::Stream::Stderr);
    let acquirer = CountryAcquirer::new(resolver, client).with_progress(show_progress);

    let report = run_countries(&acquirer, &config.countries, &config, &config.data_dir).await;

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| AppError::generic(format!("Failed to render report: {}", e)))?;
        println!("{}", json);
    } else {
        display_results_table(&report);
        println!();
        println!(
            "{} of {} countries complete in {:.1}s",
            report.complete_count(),
            report.len(),
            start_time.elapsed().as_secs_f64()
        );
    }

    Ok(())
}

/// Display per-country artifact outcomes as a table
fn display_results_table(report: &AcquisitionReport) {
    if report.is_empty() {
        println!("No countries processed.");
        return;
    }

    let country_width = report
        .countries()
        .iter()
        .map(|code| code.len())
        .max()
        .unwrap_or(7)
        .max(7); // Minimum width for "Country"
    let status_width = 10;

    print!("{:<width$}", "Country", width = country_width);
    for artifact in Artifact::ALL {
        print!(" {:>status_width$}", artifact.as_str(), status_width = status_width);
    }
    println!();

    println!(
        "{}",
        "─".repeat(country_width + (status_width + 1) * Artifact::ALL.len())
    );

    for (country, result) in report.iter() {
        print!("{:<width$}", country, width = country_width);
        for (_, ok) in result.flags() {
            print!(
                " {:>status_width$}",
                if ok { "SUCCESS" } else { "FAILED" },
                status_width = status_width
            );
        }
        println!();
    }
}

/// Handle the extract command
///
/// Runs the bulk path and exits with an error when the fetch reports failure.
pub async fn handle_extract(args: ExtractArgs, app_config: &AppConfig) -> Result<()> {
    let start_time = Instant::now();

    let config = AcquisitionConfig::resolve(app_config, &args.overrides())?;
    let target_date = args
        .date
        .clone()
        .or_else(|| app_config.osm_data.historical_date.clone());

    let extractor = EarthOsmExtractor::locate(args.earth_osm.clone())?;
    info!("Using extraction tool: {}", extractor.binary_path().display());

    let spinner = extraction_spinner(config.countries.len());
    let fetcher = BulkFetcher::new(Arc::new(extractor));
    let summary = fetcher
        .fetch_summary(
            &config.countries,
            target_date.as_deref(),
            &config.data_dir,
            &config.output_dir,
        )
        .await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    match summary {
        Some(summary) => {
            info!("OSM data fetch completed successfully");
            println!(
                "Extracted power features for {} in {:.1}s",
                summary.regions.join(", "),
                start_time.elapsed().as_secs_f64()
            );
            display_reconcile_summary(&summary.reconcile, &config.output_dir);
            Ok(())
        }
        None => {
            error!("OSM data fetch failed");
            Err(AppError::generic("OSM data fetch failed"))
        }
    }
}

/// Spinner shown while the extraction tool runs, only on a terminal
fn extraction_spinner(country_count: usize) -> Option<ProgressBar> {
    if !atty::is(atty::Stream::Stderr) {
        return None;
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style.tick_strings(&["◐", "◓", "◑", "◒"]));
    }
    spinner.set_message(format!(
        "Extracting power features for {} countries...",
        country_count
    ));
    spinner.enable_steady_tick(Duration::from_millis(120));
    Some(spinner)
}

/// Handle the reconcile command
pub async fn handle_reconcile(args: ReconcileArgs, app_config: &AppConfig) -> Result<()> {
    let output_dir = match args.output_dir {
        Some(dir) => dir,
        None => AcquisitionConfig::resolve(app_config, &CliOverrides::default())?.output_dir,
    };

    let report = reconcile(&output_dir).await?;
    display_reconcile_summary(&report, &output_dir);
    Ok(())
}

fn display_reconcile_summary(report: &ReconcileReport, output_dir: &Path) {
    if report.skipped {
        warn!("Nothing to reconcile in {}", output_dir.display());
        println!(
            "No working directory found under {}, outputs left untouched.",
            output_dir.display()
        );
        return;
    }

    println!(
        "Outputs in {}: {} moved, {} empty placeholders",
        output_dir.display(),
        report.relocated(),
        report.placeholders()
    );
    for action in &report.actions {
        let kind = match action {
            ReconcileAction::Relocated { .. } => "moved",
            ReconcileAction::Placeholder { .. } => "empty",
        };
        println!("  {:<6} {}", kind, action.destination().display());
    }
}

/// Handle configuration management
pub async fn handle_config(
    args: ConfigArgs,
    app_config: &AppConfig,
    source: &ConfigSource,
) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            match source.locate().await? {
                Some(path) => println!("# Loaded from: {}", path.display()),
                None => println!("# No configuration file found, showing defaults"),
            }
            print!("{}", app_config.resolved().to_toml()?);
            Ok(())
        }
        ConfigAction::Init { force } => {
            let path: PathBuf = match source {
                ConfigSource::File(Some(path)) => path.clone(),
                _ => AppConfig::get_default_config_path()?,
            };
            AppConfig::write_default_config(&path, force).await?;

            println!("Created default configuration file:");
            println!("   {}", path.display());
            println!("   You can customize settings by editing this file.");
            Ok(())
        }
    }
}
