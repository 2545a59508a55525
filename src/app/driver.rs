//! Sequential multi-country acquisition
//!
//! Runs the per-country acquirer over an ordered country list and collects the
//! outcomes into an [`AcquisitionReport`]. A failing country never stops the batch.

use std::path::Path;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::{error, info};

use crate::app::acquire::CountryAcquirer;
use crate::app::models::CountryResult;
use crate::config::AcquisitionConfig;

/// Ordered per-country outcomes of a run
///
/// Entries keep the order in which countries were first seen. Recording a country a
/// second time replaces its earlier entry without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcquisitionReport {
    entries: Vec<(String, CountryResult)>,
}

impl AcquisitionReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one country
    pub fn insert(&mut self, country: impl Into<String>, result: CountryResult) {
        let country = country.into();
        match self.entries.iter_mut().find(|(code, _)| *code == country) {
            Some(entry) => entry.1 = result,
            None => self.entries.push((country, result)),
        }
    }

    pub fn get(&self, country: &str) -> Option<&CountryResult> {
        self.entries
            .iter()
            .find(|(code, _)| code == country)
            .map(|(_, result)| result)
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CountryResult)> {
        self.entries
            .iter()
            .map(|(code, result)| (code.as_str(), result))
    }

    /// Country codes in insertion order
    pub fn countries(&self) -> Vec<&str> {
        self.entries.iter().map(|(code, _)| code.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of countries with every artifact fetched
    pub fn complete_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, result)| result.is_complete())
            .count()
    }
}

impl Serialize for AcquisitionReport {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (country, result) in &self.entries {
            map.serialize_entry(country, result)?;
        }
        map.end()
    }
}

/// Acquire every country in order and report per-artifact outcomes
pub async fn run_countries<S: AsRef<str>>(
    acquirer: &CountryAcquirer,
    countries: &[S],
    config: &AcquisitionConfig,
    output_dir: &Path,
) -> AcquisitionReport {
    if let Err(e) = tokio::fs::create_dir_all(output_dir).await {
        error!(
            "Failed to create output directory {}: {}",
            output_dir.display(),
            e
        );
    }

    let mut report = AcquisitionReport::new();

    for country in countries {
        let country = country.as_ref();
        info!("Processing country: {}", country);

        let result = acquirer.acquire(country, config, output_dir).await;

        for (artifact, ok) in result.flags() {
            info!("  {}: {}", artifact, if ok { "SUCCESS" } else { "FAILED" });
        }

        report.insert(country, result);
    }

    info!(
        "Processed {} countries, {} fully successful",
        report.len(),
        report.complete_count()
    );

    report
}
