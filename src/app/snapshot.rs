//! Snapshot dates and historical extract URLs
//!
//! Geofabrik publishes dated extracts next to the continuously updated one:
//! `colombia-latest.osm.pbf` becomes `colombia-200101.osm.pbf` for 2020-01-01, and
//! the power-feature metadata lives at `colombia-200101-power.json`. URLs are parsed
//! and their final path segment is rewritten; a URL that does not carry the
//! `-latest.osm.pbf` suffix is rejected instead of being passed through unchanged.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::osm;
use crate::errors::{SnapshotError, SnapshotResult};

/// A validated historical snapshot date
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnapshotDate(NaiveDate);

impl SnapshotDate {
    /// Parse a `YYYY-MM-DD` date
    pub fn parse(value: &str) -> SnapshotResult<Self> {
        NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map(Self)
            .map_err(|_| SnapshotError::InvalidDateFormat {
                value: value.to_string(),
            })
    }

    /// Two-digit year, month and day as used in dated extract names
    pub fn yymmdd(&self) -> String {
        self.0.format("%y%m%d").to_string()
    }
}

impl fmt::Display for SnapshotDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for SnapshotDate {
    type Err = SnapshotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for SnapshotDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SnapshotDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(serde::de::Error::custom)
    }
}

/// Replace the `-latest.osm.pbf` suffix of the URL's file name with `replacement`
fn rewrite_latest_suffix(latest_url: &str, replacement: &str) -> SnapshotResult<String> {
    let mut url = Url::parse(latest_url).map_err(|e| SnapshotError::InvalidUrl {
        url: latest_url.to_string(),
        error: e.to_string(),
    })?;

    let unexpected = || SnapshotError::UnexpectedSuffix {
        url: latest_url.to_string(),
        expected: osm::LATEST_PBF_SUFFIX.to_string(),
    };

    let file_name = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .ok_or_else(unexpected)?
        .to_string();

    let stem = file_name
        .strip_suffix(osm::LATEST_PBF_SUFFIX)
        .filter(|stem| !stem.is_empty())
        .ok_or_else(unexpected)?;
    let rewritten = format!("{}{}", stem, replacement);

    url.path_segments_mut()
        .map_err(|_| unexpected())?
        .pop()
        .push(&rewritten);

    Ok(url.to_string())
}

/// URL of the dated PBF extract for `date`
pub fn historical_pbf_url(latest_url: &str, date: &SnapshotDate) -> SnapshotResult<String> {
    rewrite_latest_suffix(
        latest_url,
        &format!("-{}{}", date.yymmdd(), osm::PBF_SUFFIX),
    )
}

/// Derive the historical PBF URL from a latest URL and a `YYYY-MM-DD` date
///
/// # Errors
///
/// Returns `SnapshotError::InvalidDateFormat` for malformed dates and
/// `SnapshotError::UnexpectedSuffix` when the URL is not a `-latest.osm.pbf` URL.
///
/// # Examples
///
/// ```rust
/// use osm_power_fetcher::app::derive_snapshot_url;
///
/// let url = derive_snapshot_url("https://x/region-latest.osm.pbf", "2020-01-01")?;
/// assert_eq!(url, "https://x/region-200101.osm.pbf");
/// # Ok::<(), osm_power_fetcher::errors::SnapshotError>(())
/// ```
pub fn derive_snapshot_url(latest_url: &str, date: &str) -> SnapshotResult<String> {
    let date = SnapshotDate::parse(date)?;
    historical_pbf_url(latest_url, &date)
}

/// URL of the power-feature metadata, dated when `date` is given
pub fn power_json_url(latest_url: &str, date: Option<&SnapshotDate>) -> SnapshotResult<String> {
    let replacement = match date {
        Some(date) => format!("-{}{}", date.yymmdd(), osm::POWER_JSON_SUFFIX),
        None => osm::POWER_JSON_SUFFIX.to_string(),
    };
    rewrite_latest_suffix(latest_url, &replacement)
}

/// URL of the checksum companion of an extract
pub fn checksum_url(pbf_url: &str) -> String {
    format!("{}{}", pbf_url, osm::MD5_SUFFIX)
}
