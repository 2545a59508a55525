//! OSM Power Fetcher Library
//!
//! A Rust library for acquiring OpenStreetMap power-infrastructure extracts
//! (substations, lines, cables, generators) for a set of countries, optionally pinned
//! to a historical snapshot date, and for normalizing extraction outputs into a fixed
//! file layout.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};

#[cfg(test)]
mod tests {
    use super::*;
    use constants::*;

    #[test]
    fn test_constants_accessible() {
        assert_eq!(DEFAULT_RATE_LIMIT_RPS, 2);
        assert_eq!(LATEST_PBF_SUFFIX, "-latest.osm.pbf");
        assert!(USER_AGENT.contains("OSM-Power-Fetcher"));
    }

    #[test]
    fn test_error_types() {
        let extract_error = errors::ExtractError::Failed {
            status: "exit status: 1".to_string(),
        };
        let app_error = AppError::Extract(extract_error);

        assert_eq!(app_error.category(), "extraction");
        assert!(app_error.to_string().contains("exit status: 1"));
    }
}
