//! Extraction through the external `earth_osm` command-line tool

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::{ExtractionRequest, Extractor};
use crate::constants::{env, extract};
use crate::errors::{ExtractError, ExtractResult};

/// Runs `earth_osm extract` for each request
///
/// The tool's own output is passed through to the terminal.
#[derive(Debug, Clone)]
pub struct EarthOsmExtractor {
    binary_path: PathBuf,
}

impl EarthOsmExtractor {
    /// Create an extractor with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// Attempt to find `earth_osm` in PATH
    pub fn from_path() -> Option<Self> {
        which::which(extract::EARTH_OSM_BINARY).ok().map(Self::new)
    }

    /// Locate the tool: explicit path, then `EARTH_OSM_BIN`, then PATH
    ///
    /// # Errors
    ///
    /// Returns `ExtractError::BinaryNotFound` when none of the sources yields a binary.
    pub fn locate(explicit: Option<PathBuf>) -> ExtractResult<Self> {
        if let Some(path) = explicit {
            return Ok(Self::new(path));
        }
        if let Some(path) = std::env::var_os(env::EARTH_OSM_BIN).filter(|p| !p.is_empty()) {
            return Ok(Self::new(PathBuf::from(path)));
        }
        Self::from_path().ok_or_else(|| ExtractError::BinaryNotFound {
            name: extract::EARTH_OSM_BINARY.to_string(),
        })
    }

    pub fn binary_path(&self) -> &PathBuf {
        &self.binary_path
    }

    /// Command-line arguments for `request`
    pub fn command_args(request: &ExtractionRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["extract".into(), request.primary_name.clone().into()];

        args.push("--regions".into());
        args.extend(request.regions.iter().map(OsString::from));

        args.push("--features".into());
        args.extend(request.features.iter().map(|f| OsString::from(f.as_str())));

        args.push("--data_dir".into());
        args.push(request.data_dir.clone().into_os_string());
        args.push("--out_dir".into());
        args.push(request.out_dir.clone().into_os_string());

        args.push("--out_format".into());
        args.extend(request.formats.iter().map(|f| OsString::from(f.extension())));

        if request.aggregate {
            args.push("--out_aggregate".into());
        }
        if request.update {
            args.push("--update".into());
        }
        if request.multiprocess {
            args.push("--mp".into());
        }
        if let Some(date) = &request.date {
            args.push("--date".into());
            args.push(date.to_string().into());
        }

        args
    }
}

#[async_trait]
impl Extractor for EarthOsmExtractor {
    async fn extract(&self, request: &ExtractionRequest) -> ExtractResult<()> {
        let args = Self::command_args(request);
        tracing::debug!("Running {} {:?}", self.binary_path.display(), args);

        let status = Command::new(&self.binary_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| ExtractError::Spawn {
                binary: self.binary_path.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(ExtractError::Failed {
                status: status.to_string(),
            })
        }
    }
}
