//! File download operations with atomic writes and streaming
//!
//! Bodies are streamed into a `.tmp` sibling of the destination and renamed into
//! place once complete, so an interrupted download never leaves a truncated extract
//! under its final name.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::app::client::http::HttpHandler;
use crate::app::hash::Md5Hash;
use crate::app::snapshot::checksum_url;
use crate::constants::{files, osm};
use crate::errors::{DownloadError, DownloadResult};

/// File download operations handler
pub struct DownloadHandler<'a> {
    http_handler: &'a HttpHandler,
}

impl<'a> DownloadHandler<'a> {
    /// Creates a new DownloadHandler with the given HTTP handler
    pub fn new(http_handler: &'a HttpHandler) -> Self {
        Self { http_handler }
    }

    /// Parse a URL string into a `Url`
    pub fn parse_url(url: &str) -> DownloadResult<Url> {
        Url::parse(url).map_err(|e| DownloadError::InvalidUrl {
            url: url.to_string(),
            error: e.to_string(),
        })
    }

    /// Local file name for a URL: its last non-empty path segment
    pub fn file_name_for(url: &Url) -> DownloadResult<String> {
        url.path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .ok_or_else(|| DownloadError::InvalidUrl {
                url: url.to_string(),
                error: "URL has no file name".to_string(),
            })
    }

    fn temp_path_for(destination: &Path) -> PathBuf {
        let mut name = destination
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(files::TEMP_FILE_SUFFIX);
        destination.with_file_name(name)
    }

    /// Downloads `url` into `dest_dir`, named after the URL's file name
    ///
    /// An existing file is returned untouched when `allow_existing` is set.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::FileExists` when the file exists and `allow_existing`
    /// is false, or any transport/I/O error from the download itself.
    pub async fn download_to_dir(
        &self,
        url: &str,
        dest_dir: &Path,
        allow_existing: bool,
        show_progress: bool,
    ) -> DownloadResult<PathBuf> {
        let url = Self::parse_url(url)?;
        let destination = dest_dir.join(Self::file_name_for(&url)?);

        if allow_existing && destination.exists() {
            tracing::info!("Using existing file: {}", destination.display());
            return Ok(destination);
        }

        self.download_file(&url, &destination, false, show_progress)
            .await?;
        Ok(destination)
    }

    /// Downloads an extract and verifies it against its published `.md5`
    ///
    /// The checksum is fetched first. A local file that already matches it is kept;
    /// otherwise the extract is downloaded (always when `update` is set and the local
    /// copy is stale) and verified. The checksum text is saved next to the extract.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::HashMismatch` when the downloaded file does not match,
    /// after removing it, or `DownloadError::InvalidChecksum` when the `.md5` file
    /// cannot be parsed.
    pub async fn download_verified(
        &self,
        url: &str,
        update: bool,
        dest_dir: &Path,
        show_progress: bool,
    ) -> DownloadResult<PathBuf> {
        let pbf_url = Self::parse_url(url)?;
        let md5_url = Self::parse_url(&checksum_url(url))?;
        let file_name = Self::file_name_for(&pbf_url)?;
        let destination = dest_dir.join(&file_name);
        let md5_path = dest_dir.join(format!("{}{}", file_name, osm::MD5_SUFFIX));

        let checksum_text = self.http_handler.get_text(&md5_url).await?;
        let expected = Md5Hash::from_checksum_file(&checksum_text)?;

        if destination.exists() {
            let actual = Md5Hash::of_file(&destination).await?;
            if actual == expected {
                tracing::info!("Existing file matches checksum: {}", destination.display());
                tokio::fs::write(&md5_path, &checksum_text).await?;
                return Ok(destination);
            }
            if !update {
                return Err(DownloadError::HashMismatch {
                    path: destination,
                    expected: expected.to_hex(),
                    actual: actual.to_hex(),
                });
            }
            tracing::info!(
                "Existing file is stale, downloading again: {}",
                destination.display()
            );
        }

        self.download_file(&pbf_url, &destination, true, show_progress)
            .await?;

        let actual = Md5Hash::of_file(&destination).await?;
        if actual != expected {
            let _ = tokio::fs::remove_file(&destination).await;
            return Err(DownloadError::HashMismatch {
                path: destination,
                expected: expected.to_hex(),
                actual: actual.to_hex(),
            });
        }

        tokio::fs::write(&md5_path, &checksum_text).await?;
        tracing::debug!("Checksum verified: {} ({})", destination.display(), actual);
        Ok(destination)
    }

    /// Downloads a file to the specified path with atomic operations
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The file already exists and force is false
    /// - The HTTP request fails
    /// - File I/O operations fail
    pub async fn download_file(
        &self,
        url: &Url,
        destination: &Path,
        force: bool,
        show_progress: bool,
    ) -> DownloadResult<()> {
        if destination.exists() && !force {
            return Err(DownloadError::FileExists {
                path: destination.display().to_string(),
            });
        }

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let temp_path = Self::temp_path_for(destination);

        match self.download_attempt(url, &temp_path, show_progress).await {
            Ok(()) => {
                tokio::fs::rename(&temp_path, destination)
                    .await
                    .map_err(|_e| DownloadError::AtomicOperationFailed {
                        temp_path: temp_path.clone(),
                        final_path: destination.to_path_buf(),
                    })?;
                tracing::info!("Successfully downloaded: {}", destination.display());
                Ok(())
            }
            Err(e) => {
                if temp_path.exists() {
                    let _ = tokio::fs::remove_file(&temp_path).await;
                }
                Err(e)
            }
        }
    }

    /// Streams the response body into a temporary path
    async fn download_attempt(
        &self,
        url: &Url,
        temp_path: &Path,
        show_progress: bool,
    ) -> DownloadResult<()> {
        let response = self.http_handler.get_response(url).await?;
        let progress = Self::progress_bar(response.content_length(), url, show_progress)?;

        let mut file = File::create(temp_path).await?;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            progress.inc(chunk.len() as u64);
        }

        file.flush().await?;
        progress.finish_and_clear();
        Ok(())
    }

    fn progress_bar(
        length: Option<u64>,
        url: &Url,
        show_progress: bool,
    ) -> DownloadResult<ProgressBar> {
        if !show_progress || !atty::is(atty::Stream::Stderr) {
            return Ok(ProgressBar::hidden());
        }

        let bar = match length {
            Some(length) => ProgressBar::new(length),
            None => ProgressBar::new_spinner(),
        };
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} {msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta}) {bytes_per_sec}",
                )
                .map_err(|e| DownloadError::Other(format!("Progress bar template error: {}", e)))?
                .progress_chars("##-"),
        );
        bar.set_message(Self::file_name_for(url).unwrap_or_default());
        Ok(bar)
    }
}
