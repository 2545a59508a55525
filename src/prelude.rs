//! Prelude module for OSM Power Fetcher Library
//!
//! This module re-exports the most commonly used items from the library,
//! providing a convenient way to import everything needed for typical usage
//! with a single `use osm_power_fetcher::prelude::*;` statement.
//!
//! # Usage
//!
//! ```rust,no_run
//! use osm_power_fetcher::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let extractor = EarthOsmExtractor::locate(None)?;
//!     let fetcher = BulkFetcher::new(Arc::new(extractor));
//!
//!     let ok = fetcher
//!         .fetch(&["CO", "PE"], Some("2020-01-01"), Path::new("data/osm"), Path::new("resources/osm/raw"))
//!         .await;
//!     println!("bulk fetch succeeded: {}", ok);
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, Result};

// Essential app components that are used in most integrations
pub use crate::app::{
    // Direct per-country path
    AcquisitionReport,
    Artifact,
    ArtifactStatus,
    // Bulk path
    BulkFetcher,
    ClientConfig,
    CountryAcquirer,
    CountryResult,
    Downloader,
    EarthOsmExtractor,
    ExtractionRequest,
    Extractor,
    GeofabrikResolver,
    OsmClient,
    ReconcileReport,
    Region,
    RegionResolver,
    SnapshotDate,

    derive_snapshot_url,
    normalize_region,
    normalize_regions,
    reconcile,
    run_countries,
};

// Configuration
pub use crate::config::{AcquisitionConfig, AppConfig, CliOverrides, ConfigSource};

// Commonly used constants
pub use crate::constants::{DEFAULT_RATE_LIMIT_RPS, LATEST_PBF_SUFFIX, USER_AGENT};

// Standard library re-exports that are commonly needed
pub use std::path::{Path, PathBuf};
pub use std::sync::Arc;

pub use tokio;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_imports() {
        let _client_config = ClientConfig::default();
        let config = AcquisitionConfig::default();

        assert_eq!(config.countries, vec!["CO".to_string()]);
        assert_eq!(normalize_region("pe"), "peru");
        assert_eq!(DEFAULT_RATE_LIMIT_RPS, 2);
    }

    #[tokio::test]
    async fn test_prelude_integration_pattern() {
        use tempfile::TempDir;

        let temp_dir = TempDir::new().unwrap();
        let report = reconcile(temp_dir.path()).await.unwrap();
        assert!(report.skipped);

        let url = derive_snapshot_url(
            "https://download.geofabrik.de/south-america/peru-latest.osm.pbf",
            "2020-01-01",
        )
        .unwrap();
        assert!(url.ends_with("peru-200101.osm.pbf"));
    }

    #[test]
    fn test_std_reexports() {
        let _path = PathBuf::from("/tmp/test");
        let data = Arc::new(42);
        assert_eq!(*data, 42);
    }
}
