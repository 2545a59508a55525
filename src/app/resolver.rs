//! Region resolution against the Geofabrik region index
//!
//! The index (`index-v1-nogeom.json`) is a GeoJSON feature collection whose
//! feature properties carry the region id, its parent and the download URLs of the
//! current extracts. It is loaded once per resolver and queried in memory.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::app::client::OsmClient;
use crate::errors::{ResolveError, ResolveResult};

/// Download URLs published for a region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionUrls {
    /// Latest PBF extract
    pub pbf: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updates: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taginfo: Option<String>,
}

/// A region known to the extract server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Canonical id, e.g. `colombia`
    pub id: String,
    /// Display name, e.g. `Colombia`
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(rename = "iso3166-1:alpha2", default, skip_serializing_if = "Vec::is_empty")]
    pub iso3166_alpha2: Vec<String>,
    pub urls: RegionUrls,
}

/// Region-resolution service
#[async_trait]
pub trait RegionResolver: Send + Sync {
    /// Resolve a normalized region name
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::UnknownRegion` for names the service does not know, or
    /// the error that prevented the service from being queried.
    async fn resolve(&self, region_name: &str) -> ResolveResult<Region>;
}

#[derive(Debug, Deserialize)]
struct RegionIndex {
    features: Vec<IndexFeature>,
}

#[derive(Debug, Deserialize)]
struct IndexFeature {
    properties: Region,
}

/// Where the region index is read from
#[derive(Debug)]
pub enum IndexSource {
    /// Downloaded through the shared client
    Remote { client: Arc<OsmClient>, url: String },
    /// Read from a local copy of the index
    Local(PathBuf),
}

/// Resolver backed by the Geofabrik region index
#[derive(Debug)]
pub struct GeofabrikResolver {
    source: IndexSource,
    regions: OnceCell<Vec<Region>>,
}

impl GeofabrikResolver {
    /// Resolver downloading the index configured on `client`
    pub fn new(client: Arc<OsmClient>) -> Self {
        let url = client.config().index_url.clone();
        Self::with_source(IndexSource::Remote { client, url })
    }

    /// Resolver reading the index from `source`
    pub fn with_source(source: IndexSource) -> Self {
        Self {
            source,
            regions: OnceCell::new(),
        }
    }

    /// Resolver over an already loaded set of regions
    pub fn from_regions(regions: Vec<Region>) -> Self {
        Self {
            source: IndexSource::Local(PathBuf::new()),
            regions: OnceCell::new_with(Some(regions)),
        }
    }

    /// Parse the JSON text of a region index
    pub fn parse_index(json: &str) -> ResolveResult<Vec<Region>> {
        let index: RegionIndex = serde_json::from_str(json)?;
        Ok(index.features.into_iter().map(|f| f.properties).collect())
    }

    async fn load(&self) -> ResolveResult<Vec<Region>> {
        let json = match &self.source {
            IndexSource::Remote { client, url } => {
                tracing::info!("Fetching region index: {}", url);
                client.get_text(url).await?
            }
            IndexSource::Local(path) => {
                tracing::info!("Reading region index: {}", path.display());
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| ResolveError::Io {
                        path: path.clone(),
                        source,
                    })?
            }
        };

        let regions = Self::parse_index(&json)?;
        tracing::debug!("Region index holds {} regions", regions.len());
        Ok(regions)
    }

    async fn regions(&self) -> ResolveResult<&[Region]> {
        self.regions
            .get_or_try_init(|| self.load())
            .await
            .map(Vec::as_slice)
    }
}

#[async_trait]
impl RegionResolver for GeofabrikResolver {
    async fn resolve(&self, region_name: &str) -> ResolveResult<Region> {
        let regions = self.regions().await?;

        regions
            .iter()
            .find(|region| region.id == region_name)
            .or_else(|| {
                regions
                    .iter()
                    .find(|region| region.name.eq_ignore_ascii_case(region_name))
            })
            .cloned()
            .ok_or_else(|| ResolveError::UnknownRegion {
                name: region_name.to_string(),
            })
    }
}
