//! Application constants for OSM Power Fetcher
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain.

use std::time::Duration;

/// Environment variable names
pub mod env {
    /// Path to an orchestrator-supplied JSON parameters file
    pub const PARAMS: &str = "OSM_FETCHER_PARAMS";

    /// Explicit path to the earth_osm executable
    pub const EARTH_OSM_BIN: &str = "EARTH_OSM_BIN";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = "OSM-Power-Fetcher/0.1.0 (Energy System Modelling)";

    /// Default HTTP request timeout. PBF extracts run to several hundred MB.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30 * 60);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
}

/// Rate limiting
pub mod limits {
    /// Default request rate towards the extract server (requests per second)
    pub const DEFAULT_RATE_LIMIT_RPS: u32 = 2;
}

/// Geofabrik download service
pub mod geofabrik {
    /// Region index without geometries
    pub const INDEX_URL: &str = "https://download.geofabrik.de/index-v1-nogeom.json";
}

/// OSM extract naming conventions
pub mod osm {
    /// Suffix of a continuously updated extract
    pub const LATEST_PBF_SUFFIX: &str = "-latest.osm.pbf";

    /// Suffix of a dated extract, after the `-yymmdd` stamp
    pub const PBF_SUFFIX: &str = ".osm.pbf";

    /// Suffix of the auxiliary power-feature metadata file
    pub const POWER_JSON_SUFFIX: &str = "-power.json";

    /// Suffix of checksum companions
    pub const MD5_SUFFIX: &str = ".md5";

    /// Primary feature group handed to the extraction tool
    pub const PRIMARY_NAME: &str = "power";
}

/// Output layout
pub mod output {
    /// Subdirectory the extraction tool writes into
    pub const WORKING_SUBDIR: &str = "out";

    /// Prefix of normalized output files
    pub const FILE_PREFIX: &str = "all_raw_";
}

/// Built-in defaults used when neither CLI nor configuration provide a value
pub mod defaults {
    /// Countries fetched when none are configured
    pub const COUNTRIES: &[&str] = &["CO"];

    /// Raw-data directory
    pub const DATA_DIR: &str = "data/osm";

    /// Normalized output directory
    pub const OUTPUT_DIR: &str = "resources/osm/raw";

    /// Snapshot used by `--historical` when no date is configured
    pub const HISTORICAL_DATE: &str = "2020-01-01";
}

/// Bulk extraction tool
pub mod extract {
    /// Executable name searched on PATH
    pub const EARTH_OSM_BINARY: &str = "earth_osm";
}

/// File operation constants
pub mod files {
    /// Temporary file suffix for atomic operations
    pub const TEMP_FILE_SUFFIX: &str = ".tmp";

    /// Read buffer for streaming hash computation (64KB)
    pub const HASH_BUFFER_SIZE: usize = 64 * 1024;
}

/// Configuration file locations
pub mod config {
    /// Project-local configuration file
    pub const LOCAL_CONFIG_FILE: &str = "./osm-power-fetcher.toml";

    /// Generic project-local configuration file
    pub const FALLBACK_CONFIG_FILE: &str = "./config.toml";

    /// Application directory under the user config dir
    pub const APP_DIR_NAME: &str = "osm-power-fetcher";
}

// Re-export commonly used constants for convenience
pub use http::{DEFAULT_TIMEOUT as HTTP_TIMEOUT, USER_AGENT};
pub use limits::DEFAULT_RATE_LIMIT_RPS;
pub use osm::LATEST_PBF_SUFFIX;
