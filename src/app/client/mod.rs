//! HTTP client for the OSM extract server
//!
//! This module provides the download primitives used by the per-country pipeline:
//! a plain single-file download and a download verified against the published MD5
//! checksum.
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `http`: Rate-limited HTTP operations with typed status errors
//! - `download`: Streamed, atomic file downloads and checksum verification

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::errors::DownloadResult;

pub mod config;
pub mod download;
pub mod http;

pub use config::ClientConfig;

use download::DownloadHandler;
use http::HttpHandler;

/// Download primitives used by the per-country acquirer
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Download `url` into `dest_dir`, keeping an existing file when `allow_existing`
    async fn download(
        &self,
        url: &str,
        dest_dir: &Path,
        allow_existing: bool,
    ) -> DownloadResult<PathBuf>;

    /// Download `url` into `dest_dir` and verify it against `<url>.md5`
    ///
    /// Success implies the checksum was validated and saved next to the file.
    async fn download_verified(
        &self,
        url: &str,
        update: bool,
        dest_dir: &Path,
        show_progress: bool,
    ) -> DownloadResult<PathBuf>;
}

/// HTTP client for Geofabrik-style extract servers
#[derive(Debug)]
pub struct OsmClient {
    http_handler: HttpHandler,
    config: ClientConfig,
}

impl OsmClient {
    /// Creates a client with default configuration
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if HTTP client creation fails
    pub fn new() -> DownloadResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a client with custom configuration
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if HTTP client creation fails or the rate limit is zero
    pub fn with_config(config: ClientConfig) -> DownloadResult<Self> {
        let client = config.build_http_client()?;
        let http_handler = HttpHandler::new(client, config.rate_limit_rps)?;

        tracing::debug!(
            "Created OSM client ({} req/s, timeout {:?})",
            config.rate_limit_rps,
            config.request_timeout
        );

        Ok(Self {
            http_handler,
            config,
        })
    }

    /// Fetches a resource as text
    pub async fn get_text(&self, url: &str) -> DownloadResult<String> {
        let url = DownloadHandler::parse_url(url)?;
        self.http_handler.get_text(&url).await
    }

    /// Configuration the client was built with
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl Downloader for OsmClient {
    async fn download(
        &self,
        url: &str,
        dest_dir: &Path,
        allow_existing: bool,
    ) -> DownloadResult<PathBuf> {
        DownloadHandler::new(&self.http_handler)
            .download_to_dir(url, dest_dir, allow_existing, false)
            .await
    }

    async fn download_verified(
        &self,
        url: &str,
        update: bool,
        dest_dir: &Path,
        show_progress: bool,
    ) -> DownloadResult<PathBuf> {
        DownloadHandler::new(&self.http_handler)
            .download_verified(url, update, dest_dir, show_progress)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DownloadError;

    #[test]
    fn test_client_creation() {
        let client = OsmClient::new().unwrap();
        assert_eq!(
            client.config().rate_limit_rps,
            crate::constants::DEFAULT_RATE_LIMIT_RPS
        );
    }

    #[test]
    fn test_zero_rate_limit_rejected() {
        let result = OsmClient::with_config(ClientConfig {
            rate_limit_rps: 0,
            ..Default::default()
        });
        assert!(matches!(result, Err(DownloadError::Other(_))));
    }

    #[tokio::test]
    async fn test_invalid_url_rejected() {
        let client = OsmClient::new().unwrap();
        let result = client.get_text("not a url").await;
        assert!(matches!(result, Err(DownloadError::InvalidUrl { .. })));
    }
}
