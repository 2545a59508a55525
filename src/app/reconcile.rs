//! Output reconciliation
//!
//! The extraction tool writes its aggregated files under `<output_dir>/out` with
//! names that depend on the regions requested. Downstream consumers expect exactly
//! one file per feature and format at a fixed path, so this module moves whatever was
//! produced onto those paths and creates empty placeholders for the rest.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::app::models::ExpectedOutput;
use crate::constants::output;
use crate::errors::{ReconcileError, ReconcileResult};

/// What happened to one expected output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileAction {
    /// A produced file was moved onto the expected path
    Relocated { from: PathBuf, to: PathBuf },
    /// Nothing was produced; an empty file was created at the expected path
    Placeholder { to: PathBuf },
}

impl ReconcileAction {
    /// Destination path
    pub fn destination(&self) -> &Path {
        match self {
            Self::Relocated { to, .. } | Self::Placeholder { to } => to,
        }
    }
}

/// Outcome of a reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// One action per expected output, in [`ExpectedOutput::all`] order
    pub actions: Vec<ReconcileAction>,
    /// The working directory did not exist and nothing was touched
    pub skipped: bool,
}

impl ReconcileReport {
    pub fn relocated(&self) -> usize {
        self.actions
            .iter()
            .filter(|action| matches!(action, ReconcileAction::Relocated { .. }))
            .count()
    }

    pub fn placeholders(&self) -> usize {
        self.actions
            .iter()
            .filter(|action| matches!(action, ReconcileAction::Placeholder { .. }))
            .count()
    }
}

/// Normalize the files under `<output_dir>/out` into the fixed output layout
///
/// # Errors
///
/// Returns `ReconcileError::Io` naming the path of the first filesystem operation
/// that failed. Actions completed before the failure are not rolled back.
pub async fn reconcile(output_dir: &Path) -> ReconcileResult<ReconcileReport> {
    let work_dir = output_dir.join(output::WORKING_SUBDIR);

    if !tokio::fs::try_exists(&work_dir).await.unwrap_or(false) {
        warn!(
            "Working directory {} does not exist, skipping output reconciliation",
            work_dir.display()
        );
        return Ok(ReconcileReport {
            actions: Vec::new(),
            skipped: true,
        });
    }

    let candidates = list_files(&work_dir).await?;
    let mut report = ReconcileReport::default();

    for expected in ExpectedOutput::all() {
        let destination = expected.destination(output_dir);
        let suffix = expected.source_suffix();

        let source = candidates
            .iter()
            .filter(|name| name.ends_with(&suffix))
            .min()
            .map(|name| work_dir.join(name));

        let action = match source {
            Some(source) => {
                info!("Moving {} to {}", source.display(), destination.display());
                tokio::fs::rename(&source, &destination)
                    .await
                    .map_err(|e| io_error(&source, e))?;
                ReconcileAction::Relocated {
                    from: source,
                    to: destination,
                }
            }
            None => {
                info!("Creating empty file: {}", destination.display());
                tokio::fs::File::create(&destination)
                    .await
                    .map_err(|e| io_error(&destination, e))?;
                ReconcileAction::Placeholder { to: destination }
            }
        };
        report.actions.push(action);
    }

    Ok(report)
}

/// Names of the regular files directly inside `dir`
async fn list_files(dir: &Path) -> ReconcileResult<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| io_error(dir, e))?;
    let mut names = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(|e| io_error(dir, e))? {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| io_error(&entry.path(), e))?;
        if !file_type.is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(name) => warn!("Ignoring non UTF-8 file name: {:?}", name),
        }
    }

    Ok(names)
}

fn io_error(path: &Path, source: std::io::Error) -> ReconcileError {
    ReconcileError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::{Feature, OutputFormat};
    use tempfile::TempDir;

    async fn write(path: &Path, content: &str) {
        tokio::fs::write(path, content).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_working_dir_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let stale = temp_dir.path().join("all_raw_lines.csv");
        write(&stale, "old").await;

        let report = reconcile(temp_dir.path()).await.unwrap();

        assert!(report.skipped);
        assert!(report.actions.is_empty());
        assert_eq!(tokio::fs::read_to_string(&stale).await.unwrap(), "old");
    }

    #[tokio::test]
    async fn test_empty_working_dir_creates_placeholders() {
        let temp_dir = TempDir::new().unwrap();
        tokio::fs::create_dir(temp_dir.path().join("out")).await.unwrap();

        let report = reconcile(temp_dir.path()).await.unwrap();

        assert!(!report.skipped);
        assert_eq!(report.placeholders(), 8);
        for expected in ExpectedOutput::all() {
            let metadata = tokio::fs::metadata(expected.destination(temp_dir.path()))
                .await
                .unwrap();
            assert_eq!(metadata.len(), 0);
        }
    }

    #[tokio::test]
    async fn test_produced_file_is_moved() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        tokio::fs::create_dir(&out).await.unwrap();
        write(&out.join("colombia_line.geojson"), "{\"type\":\"FeatureCollection\"}").await;

        let report = reconcile(temp_dir.path()).await.unwrap();

        let destination = ExpectedOutput::new(Feature::Line, OutputFormat::GeoJson)
            .destination(temp_dir.path());
        assert_eq!(
            tokio::fs::read_to_string(&destination).await.unwrap(),
            "{\"type\":\"FeatureCollection\"}"
        );
        assert!(!out.join("colombia_line.geojson").exists());
        assert_eq!(report.relocated(), 1);
        assert_eq!(report.placeholders(), 7);
    }

    #[tokio::test]
    async fn test_smallest_candidate_wins() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        tokio::fs::create_dir(&out).await.unwrap();
        write(&out.join("peru_substation.csv"), "peru").await;
        write(&out.join("colombia_substation.csv"), "colombia").await;

        reconcile(temp_dir.path()).await.unwrap();

        let destination = temp_dir.path().join("all_raw_substations.csv");
        assert_eq!(
            tokio::fs::read_to_string(&destination).await.unwrap(),
            "colombia"
        );
        assert!(out.join("peru_substation.csv").exists());
    }

    #[tokio::test]
    async fn test_existing_destination_is_replaced() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        tokio::fs::create_dir(&out).await.unwrap();
        write(&temp_dir.path().join("all_raw_cables.csv"), "stale").await;
        write(&temp_dir.path().join("all_raw_generators.csv"), "stale").await;
        write(&out.join("colombia_cable.csv"), "fresh").await;

        reconcile(temp_dir.path()).await.unwrap();

        assert_eq!(
            tokio::fs::read_to_string(temp_dir.path().join("all_raw_cables.csv"))
                .await
                .unwrap(),
            "fresh"
        );
        let generators = tokio::fs::metadata(temp_dir.path().join("all_raw_generators.csv"))
            .await
            .unwrap();
        assert_eq!(generators.len(), 0);
    }

    #[tokio::test]
    async fn test_directories_are_not_candidates() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        tokio::fs::create_dir_all(out.join("nested_line.csv")).await.unwrap();

        let report = reconcile(temp_dir.path()).await.unwrap();

        assert_eq!(report.relocated(), 0);
        assert!(out.join("nested_line.csv").is_dir());
    }
}
