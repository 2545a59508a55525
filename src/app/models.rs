//! Data models for OSM Power Fetcher
//!
//! This module defines the core data structures shared by both acquisition
//! pipelines: the artifacts fetched per country with their outcomes, and the
//! feature/format pairs that make up the normalized output layout.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::constants::output;
use crate::errors::DownloadError;

/// Files fetched for a single country on the direct-download path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Artifact {
    /// The OSM extract itself
    #[serde(rename = "pbf")]
    Pbf,
    /// Checksum companion of the extract
    #[serde(rename = "md5")]
    Md5,
    /// Power-feature metadata
    #[serde(rename = "power.json")]
    PowerJson,
}

impl Artifact {
    /// All artifacts in reporting order
    pub const ALL: [Artifact; 3] = [Artifact::Pbf, Artifact::Md5, Artifact::PowerJson];

    /// Key used in result mappings
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pbf => "pbf",
            Self::Md5 => "md5",
            Self::PowerJson => "power.json",
        }
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one artifact
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ArtifactStatus {
    /// Downloaded (or already present and valid) at the given path
    Fetched(PathBuf),
    /// Attempted and failed
    Failed(String),
    /// Never attempted, because it was not requested or a prerequisite failed
    #[default]
    NotAttempted,
}

impl ArtifactStatus {
    /// Whether the artifact is available on disk
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Fetched(_))
    }

    /// Fold a download result into a status
    ///
    /// A primitive that reports a path which does not exist is treated as a failure.
    pub fn from_download(result: Result<PathBuf, DownloadError>) -> Self {
        match result {
            Ok(path) if path.exists() => Self::Fetched(path),
            Ok(path) => Self::Failed(DownloadError::MissingOnDisk { path }.to_string()),
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}

/// Per-artifact outcome for one country
///
/// Serializes as `{"pbf": bool, "md5": bool, "power.json": bool}`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CountryResult {
    pub pbf: ArtifactStatus,
    pub md5: ArtifactStatus,
    pub power_json: ArtifactStatus,
}

impl CountryResult {
    /// Result with every artifact failed for the same reason
    pub fn all_failed(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            pbf: ArtifactStatus::Failed(reason.clone()),
            md5: ArtifactStatus::Failed(reason.clone()),
            power_json: ArtifactStatus::Failed(reason),
        }
    }

    /// Status of one artifact
    pub fn status(&self, artifact: Artifact) -> &ArtifactStatus {
        match artifact {
            Artifact::Pbf => &self.pbf,
            Artifact::Md5 => &self.md5,
            Artifact::PowerJson => &self.power_json,
        }
    }

    /// Whether one artifact was fetched
    pub fn succeeded(&self, artifact: Artifact) -> bool {
        self.status(artifact).is_success()
    }

    /// Success flags in reporting order
    pub fn flags(&self) -> [(Artifact, bool); 3] {
        Artifact::ALL.map(|artifact| (artifact, self.succeeded(artifact)))
    }

    /// Whether every artifact was fetched
    pub fn is_complete(&self) -> bool {
        self.flags().iter().all(|(_, ok)| *ok)
    }
}

impl Serialize for CountryResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(Artifact::ALL.len()))?;
        for (artifact, ok) in self.flags() {
            map.serialize_entry(artifact.as_str(), &ok)?;
        }
        map.end()
    }
}

/// Power-infrastructure feature types extracted by the bulk pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Substation,
    Line,
    Cable,
    Generator,
}

impl Feature {
    /// Features requested from the extraction tool, in request order
    pub const ALL: [Feature; 4] = [
        Feature::Substation,
        Feature::Line,
        Feature::Cable,
        Feature::Generator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Substation => "substation",
            Self::Line => "line",
            Self::Cable => "cable",
            Self::Generator => "generator",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialization formats written by the extraction tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    GeoJson,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 2] = [OutputFormat::Csv, OutputFormat::GeoJson];

    /// File extension, also the format name passed to the extraction tool
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::GeoJson => "geojson",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// One file of the normalized output layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExpectedOutput {
    pub feature: Feature,
    pub format: OutputFormat,
}

impl ExpectedOutput {
    pub fn new(feature: Feature, format: OutputFormat) -> Self {
        Self { feature, format }
    }

    /// Every expected output, features in reconciliation order
    pub fn all() -> Vec<ExpectedOutput> {
        [
            Feature::Generator,
            Feature::Cable,
            Feature::Line,
            Feature::Substation,
        ]
        .into_iter()
        .flat_map(|feature| {
            OutputFormat::ALL
                .into_iter()
                .map(move |format| Self::new(feature, format))
        })
        .collect()
    }

    /// Suffix identifying the extraction tool's file for this pair
    pub fn source_suffix(&self) -> String {
        format!("{}.{}", self.feature, self.format)
    }

    /// Fixed public file name, e.g. `all_raw_lines.geojson`
    pub fn file_name(&self) -> String {
        format!("{}{}s.{}", output::FILE_PREFIX, self.feature, self.format)
    }

    /// Destination inside `output_dir`
    pub fn destination(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(self.file_name())
    }
}
