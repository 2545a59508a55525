//! In-memory collaborators shared by the integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use osm_power_fetcher::app::{
    Downloader, ExtractionRequest, Extractor, Region, RegionResolver, RegionUrls,
};
use osm_power_fetcher::errors::{
    DownloadError, DownloadResult, ExtractError, ExtractResult, ResolveError, ResolveResult,
};

pub const BASE_URL: &str = "https://download.example.org/south-america";

/// Latest extract URL for a region served by the fakes
pub fn latest_url(region: &str) -> String {
    format!("{}/{}-latest.osm.pbf", BASE_URL, region)
}

/// Resolver knowing a fixed set of regions
#[derive(Default)]
pub struct FakeResolver {
    regions: HashMap<String, Region>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeResolver {
    pub fn with_regions(names: &[&str]) -> Self {
        let regions = names
            .iter()
            .map(|name| {
                let region = Region {
                    id: name.to_string(),
                    name: name.to_string(),
                    parent: Some("south-america".to_string()),
                    iso3166_alpha2: Vec::new(),
                    urls: RegionUrls {
                        pbf: latest_url(name),
                        history: None,
                        updates: None,
                        taginfo: None,
                    },
                };
                (name.to_string(), region)
            })
            .collect();

        Self {
            regions,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Resolver serving a region whose URL breaks the naming convention
    pub fn with_region_url(name: &str, pbf: &str) -> Self {
        let mut resolver = Self::with_regions(&[name]);
        if let Some(region) = resolver.regions.get_mut(name) {
            region.urls.pbf = pbf.to_string();
        }
        resolver
    }
}

#[async_trait]
impl RegionResolver for FakeResolver {
    async fn resolve(&self, region_name: &str) -> ResolveResult<Region> {
        self.calls.lock().unwrap().push(region_name.to_string());
        self.regions
            .get(region_name)
            .cloned()
            .ok_or_else(|| ResolveError::UnknownRegion {
                name: region_name.to_string(),
            })
    }
}

/// One call made to the fake downloader
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadCall {
    Plain { url: String, allow_existing: bool },
    Verified { url: String, update: bool },
}

impl DownloadCall {
    pub fn url(&self) -> &str {
        match self {
            Self::Plain { url, .. } | Self::Verified { url, .. } => url,
        }
    }
}

/// Downloader writing small files instead of fetching them
#[derive(Default)]
pub struct FakeDownloader {
    failing_suffixes: Vec<String>,
    phantom_suffixes: Vec<String>,
    pub calls: Mutex<Vec<DownloadCall>>,
}

impl FakeDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// URLs ending with `suffix` fail with a 404
    pub fn failing(mut self, suffix: &str) -> Self {
        self.failing_suffixes.push(suffix.to_string());
        self
    }

    /// URLs ending with `suffix` report success without writing anything
    pub fn phantom(mut self, suffix: &str) -> Self {
        self.phantom_suffixes.push(suffix.to_string());
        self
    }

    pub fn calls(&self) -> Vec<DownloadCall> {
        self.calls.lock().unwrap().clone()
    }

    fn fetch(&self, url: &str, dest_dir: &Path) -> DownloadResult<PathBuf> {
        if self.failing_suffixes.iter().any(|s| url.ends_with(s)) {
            return Err(DownloadError::NotFound {
                url: url.to_string(),
            });
        }

        let name = url.rsplit('/').next().unwrap_or_default();
        let path = dest_dir.join(name);
        if !self.phantom_suffixes.iter().any(|s| url.ends_with(s)) {
            std::fs::write(&path, url.as_bytes())?;
        }
        Ok(path)
    }
}

#[async_trait]
impl Downloader for FakeDownloader {
    async fn download(
        &self,
        url: &str,
        dest_dir: &Path,
        allow_existing: bool,
    ) -> DownloadResult<PathBuf> {
        self.calls.lock().unwrap().push(DownloadCall::Plain {
            url: url.to_string(),
            allow_existing,
        });
        self.fetch(url, dest_dir)
    }

    async fn download_verified(
        &self,
        url: &str,
        update: bool,
        dest_dir: &Path,
        _show_progress: bool,
    ) -> DownloadResult<PathBuf> {
        self.calls.lock().unwrap().push(DownloadCall::Verified {
            url: url.to_string(),
            update,
        });
        let path = self.fetch(url, dest_dir)?;
        self.fetch(&format!("{}.md5", url), dest_dir)?;
        Ok(path)
    }
}

/// Extractor writing a fixed set of files into `<out_dir>/out`
#[derive(Default)]
pub struct FakeExtractor {
    outputs: Vec<(String, String)>,
    fail: bool,
    calls: AtomicUsize,
    pub requests: Mutex<Vec<ExtractionRequest>>,
}

impl FakeExtractor {
    pub fn producing(outputs: &[(&str, &str)]) -> Self {
        Self {
            outputs: outputs
                .iter()
                .map(|(name, content)| (name.to_string(), content.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ExtractionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Extractor for FakeExtractor {
    async fn extract(&self, request: &ExtractionRequest) -> ExtractResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        if self.fail {
            return Err(ExtractError::Other("simulated extraction failure".to_string()));
        }

        if self.outputs.is_empty() {
            return Ok(());
        }

        let out = request.out_dir.join("out");
        std::fs::create_dir_all(&out).map_err(|e| ExtractError::Other(e.to_string()))?;
        for (name, content) in &self.outputs {
            std::fs::write(out.join(name), content)
                .map_err(|e| ExtractError::Other(e.to_string()))?;
        }
        Ok(())
    }
}
