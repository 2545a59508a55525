//! Core application logic for OSM Power Fetcher
//!
//! This module contains the two acquisition pipelines and the components they share:
//! region normalization and resolution, snapshot URL derivation, the download client,
//! per-country acquisition, bulk extraction and output reconciliation.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use osm_power_fetcher::app::{
//!     run_countries, CountryAcquirer, GeofabrikResolver, OsmClient,
//! };
//! use osm_power_fetcher::config::AcquisitionConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(OsmClient::new()?);
//! let resolver = Arc::new(GeofabrikResolver::new(client.clone()));
//! let acquirer = CountryAcquirer::new(resolver, client);
//!
//! let config = AcquisitionConfig::default();
//! let report = run_countries(&acquirer, &["CO", "PE"], &config, Path::new("data/osm")).await;
//!
//! for (country, result) in report.iter() {
//!     println!("{}: complete = {}", country, result.is_complete());
//! }
//! # Ok(())
//! # }
//! ```

pub mod acquire;
pub mod client;
pub mod driver;
pub mod extract;
pub mod hash;
pub mod models;
pub mod reconcile;
pub mod region;
pub mod resolver;
pub mod snapshot;

// Re-export main public API
pub use acquire::CountryAcquirer;
pub use client::{ClientConfig, Downloader, OsmClient};
pub use driver::{run_countries, AcquisitionReport};
pub use extract::{BulkFetcher, EarthOsmExtractor, ExtractionRequest, Extractor, FetchSummary};
pub use hash::Md5Hash;
pub use models::{
    Artifact, ArtifactStatus, CountryResult, ExpectedOutput, Feature, OutputFormat,
};
pub use reconcile::{reconcile, ReconcileAction, ReconcileReport};
pub use region::{normalize_region, normalize_regions};
pub use resolver::{GeofabrikResolver, IndexSource, Region, RegionResolver, RegionUrls};
pub use snapshot::{
    checksum_url, derive_snapshot_url, historical_pbf_url, power_json_url, SnapshotDate,
};
