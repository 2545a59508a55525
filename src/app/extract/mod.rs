//! Bulk extraction of power features
//!
//! Instead of fetching raw extracts country by country, the bulk path hands the whole
//! region list to an extraction tool that filters the power features and writes
//! aggregated CSV and GeoJSON files. The outputs are then normalized by
//! [`reconcile`](crate::app::reconcile::reconcile).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use crate::app::models::{Feature, OutputFormat};
use crate::app::reconcile::{reconcile, ReconcileReport};
use crate::app::region::normalize_regions;
use crate::app::snapshot::SnapshotDate;
use crate::constants::osm;
use crate::errors::ExtractResult;

pub mod earth_osm;

pub use earth_osm::EarthOsmExtractor;

/// Parameters of one extraction run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    /// Feature group, e.g. `power`
    pub primary_name: String,
    /// Normalized region names
    pub regions: Vec<String>,
    pub features: Vec<Feature>,
    pub formats: Vec<OutputFormat>,
    /// Raw-data directory
    pub data_dir: PathBuf,
    /// Output directory; the tool writes under `<out_dir>/out`
    pub out_dir: PathBuf,
    /// Merge all regions into one file per feature
    pub aggregate: bool,
    /// Re-download raw extracts that are already present
    pub update: bool,
    pub multiprocess: bool,
    pub show_progress: bool,
    /// Snapshot to extract; latest when absent
    pub date: Option<SnapshotDate>,
}

impl ExtractionRequest {
    /// Power-infrastructure request for `regions`
    pub fn power(
        regions: Vec<String>,
        data_dir: &Path,
        out_dir: &Path,
        date: Option<SnapshotDate>,
    ) -> Self {
        Self {
            primary_name: osm::PRIMARY_NAME.to_string(),
            regions,
            features: Feature::ALL.to_vec(),
            formats: OutputFormat::ALL.to_vec(),
            data_dir: data_dir.to_path_buf(),
            out_dir: out_dir.to_path_buf(),
            aggregate: true,
            update: false,
            multiprocess: true,
            show_progress: true,
            date,
        }
    }
}

/// Bulk geographic-data extraction service
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Run one extraction, writing outputs under `<request.out_dir>/out`
    async fn extract(&self, request: &ExtractionRequest) -> ExtractResult<()>;
}

/// Outcome of a bulk fetch that completed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSummary {
    pub regions: Vec<String>,
    pub reconcile: ReconcileReport,
}

/// Drives one extraction run followed by output reconciliation
pub struct BulkFetcher {
    extractor: Arc<dyn Extractor>,
}

impl BulkFetcher {
    pub fn new(extractor: Arc<dyn Extractor>) -> Self {
        Self { extractor }
    }

    /// Fetch the power features of `countries` into `output_dir`
    ///
    /// Returns `true` when extraction and reconciliation both completed. Every failure
    /// is logged and reported as `false`.
    pub async fn fetch<S: AsRef<str>>(
        &self,
        countries: &[S],
        target_date: Option<&str>,
        data_dir: &Path,
        output_dir: &Path,
    ) -> bool {
        self.fetch_summary(countries, target_date, data_dir, output_dir)
            .await
            .is_some()
    }

    /// Like [`fetch`](Self::fetch), returning what was reconciled on success
    pub async fn fetch_summary<S: AsRef<str>>(
        &self,
        countries: &[S],
        target_date: Option<&str>,
        data_dir: &Path,
        output_dir: &Path,
    ) -> Option<FetchSummary> {
        let date = match target_date.map(SnapshotDate::parse).transpose() {
            Ok(date) => date,
            Err(e) => {
                error!("{}", e);
                return None;
            }
        };

        for dir in [data_dir, output_dir] {
            if let Err(e) = tokio::fs::create_dir_all(dir).await {
                error!("Failed to create directory {}: {}", dir.display(), e);
                return None;
            }
        }

        let regions = normalize_regions(countries);
        info!("Fetching OSM data for regions: {:?}", regions);
        if let Some(date) = &date {
            info!("Using historical data for date: {}", date);
        }

        let request = ExtractionRequest::power(regions.clone(), data_dir, output_dir, date);

        info!("Starting OSM data download...");
        if let Err(e) = self.extractor.extract(&request).await {
            error!("Error fetching OSM data: {}", e);
            return None;
        }
        info!("OSM data download completed successfully");

        match reconcile(output_dir).await {
            Ok(report) => Some(FetchSummary {
                regions,
                reconcile: report,
            }),
            Err(e) => {
                error!("Error fetching OSM data: {}", e);
                None
            }
        }
    }
}
