//! Per-country acquisition of OSM extracts
//!
//! For one country code the acquirer resolves the region, chooses between the latest
//! extract and a dated snapshot, and fetches the PBF, its checksum and the auxiliary
//! power-feature metadata. Each artifact records its own outcome; no failure is
//! propagated to the caller.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::app::client::Downloader;
use crate::app::models::{ArtifactStatus, CountryResult};
use crate::app::region::normalize_region;
use crate::app::resolver::RegionResolver;
use crate::app::snapshot::{checksum_url, historical_pbf_url, power_json_url, SnapshotDate};
use crate::config::AcquisitionConfig;
use crate::constants::osm;

/// Fetches the raw artifacts of one country
pub struct CountryAcquirer {
    resolver: Arc<dyn RegionResolver>,
    downloader: Arc<dyn Downloader>,
    show_progress: bool,
}

impl CountryAcquirer {
    pub fn new(resolver: Arc<dyn RegionResolver>, downloader: Arc<dyn Downloader>) -> Self {
        Self {
            resolver,
            downloader,
            show_progress: false,
        }
    }

    /// Show a progress bar while downloading latest extracts
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Acquire the artifacts of `country_code` into `output_dir`
    pub async fn acquire(
        &self,
        country_code: &str,
        config: &AcquisitionConfig,
        output_dir: &Path,
    ) -> CountryResult {
        let region_name = normalize_region(country_code);

        let region = match self.resolver.resolve(&region_name).await {
            Ok(region) => region,
            Err(e) => {
                error!("Failed to get region information for {}: {}", region_name, e);
                return CountryResult::all_failed(e.to_string());
            }
        };
        let latest_url = region.urls.pbf;

        if let Err(e) = tokio::fs::create_dir_all(output_dir).await {
            error!(
                "Failed to create output directory {}: {}",
                output_dir.display(),
                e
            );
            return CountryResult::all_failed(e.to_string());
        }

        let snapshot = config.snapshot();
        let mut result = match snapshot {
            Some(date) => {
                self.fetch_historical(&region_name, &latest_url, date, output_dir)
                    .await
            }
            None => self.fetch_latest(&region_name, &latest_url, output_dir).await,
        };

        if config.download_power_json {
            result.power_json = self.fetch_power_json(&latest_url, snapshot, output_dir).await;
        }

        result
    }

    async fn fetch_historical(
        &self,
        region_name: &str,
        latest_url: &str,
        date: &SnapshotDate,
        output_dir: &Path,
    ) -> CountryResult {
        info!(
            "Downloading historical OSM data for {} ({})",
            region_name, date
        );

        let pbf_url = match historical_pbf_url(latest_url, date) {
            Ok(url) => url,
            Err(e) => {
                error!("Cannot derive historical URL for {}: {}", region_name, e);
                return CountryResult {
                    pbf: ArtifactStatus::Failed(e.to_string()),
                    ..Default::default()
                };
            }
        };

        let pbf = ArtifactStatus::from_download(
            self.downloader.download(&pbf_url, output_dir, true).await,
        );
        let md5 = match &pbf {
            ArtifactStatus::Fetched(path) => {
                info!("Successfully downloaded historical PBF: {}", path.display());

                let md5 = ArtifactStatus::from_download(
                    self.downloader
                        .download(&checksum_url(&pbf_url), output_dir, true)
                        .await,
                );
                match &md5 {
                    ArtifactStatus::Fetched(path) => {
                        info!("Successfully downloaded historical MD5: {}", path.display())
                    }
                    ArtifactStatus::Failed(reason) => {
                        warn!("Historical MD5 download failed: {}", reason)
                    }
                    ArtifactStatus::NotAttempted => {}
                }
                md5
            }
            ArtifactStatus::Failed(reason) => {
                error!("Error downloading OSM data for {}: {}", region_name, reason);
                ArtifactStatus::NotAttempted
            }
            ArtifactStatus::NotAttempted => ArtifactStatus::NotAttempted,
        };

        CountryResult {
            pbf,
            md5,
            power_json: ArtifactStatus::NotAttempted,
        }
    }

    async fn fetch_latest(
        &self,
        region_name: &str,
        latest_url: &str,
        output_dir: &Path,
    ) -> CountryResult {
        info!("Downloading latest OSM data for {}", region_name);

        let result = self
            .downloader
            .download_verified(latest_url, true, output_dir, self.show_progress)
            .await;

        match ArtifactStatus::from_download(result) {
            ArtifactStatus::Fetched(path) => {
                info!("Successfully downloaded latest PBF: {}", path.display());
                let md5 = ArtifactStatus::from_download(Ok(checksum_path(&path)));
                CountryResult {
                    pbf: ArtifactStatus::Fetched(path),
                    md5,
                    power_json: ArtifactStatus::NotAttempted,
                }
            }
            status => {
                let reason = match status {
                    ArtifactStatus::Failed(reason) => reason,
                    _ => "download not attempted".to_string(),
                };
                error!("Error downloading OSM data for {}: {}", region_name, reason);
                CountryResult {
                    pbf: ArtifactStatus::Failed(reason.clone()),
                    md5: ArtifactStatus::Failed(reason),
                    power_json: ArtifactStatus::NotAttempted,
                }
            }
        }
    }

    async fn fetch_power_json(
        &self,
        latest_url: &str,
        snapshot: Option<&SnapshotDate>,
        output_dir: &Path,
    ) -> ArtifactStatus {
        let url = match power_json_url(latest_url, snapshot) {
            Ok(url) => url,
            Err(e) => {
                warn!("Power.json download failed: {}", e);
                return ArtifactStatus::Failed(e.to_string());
            }
        };

        info!("Downloading power metadata: {}", url);
        let status =
            ArtifactStatus::from_download(self.downloader.download(&url, output_dir, true).await);

        match &status {
            ArtifactStatus::Fetched(path) => {
                info!("Successfully downloaded power.json: {}", path.display())
            }
            ArtifactStatus::Failed(reason) => warn!("Power.json download failed: {}", reason),
            ArtifactStatus::NotAttempted => {}
        }
        status
    }
}

/// Checksum file written next to a verified download
fn checksum_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(osm::MD5_SUFFIX);
    path.with_file_name(name)
}
