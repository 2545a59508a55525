//! Configuration management for OSM Power Fetcher
//!
//! Configuration comes from one of two sources: a TOML file found in the standard
//! locations, or a JSON parameters file handed over by a workflow orchestrator. Both
//! share the [`AppConfig`] shape. Command-line overrides are merged on top when the
//! run-time [`AcquisitionConfig`] is built, with explicit flags taking precedence over
//! file values, and file values over built-in defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::app::{ClientConfig, SnapshotDate};
use crate::constants::{config as config_paths, defaults, env, limits};
use crate::errors::{ConfigError, ConfigResult, SnapshotResult};

/// Unified application configuration for TOML and JSON serialization
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Country codes to process, in order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countries: Option<Vec<String>>,
    /// Acquisition settings
    pub osm_data: OsmDataConfig,
    /// HTTP client settings
    pub client: ClientConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// File-level acquisition settings
///
/// Every field is optional so that an unset value can be told apart from one that
/// merely equals the default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OsmDataConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_historical: Option<bool>,
    /// Snapshot date as written in the file (`YYYY-MM-DD`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub historical_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_power_json: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level for the application
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Where the file-level configuration is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// TOML file: explicit path, or the first file found in the standard locations
    File(Option<PathBuf>),
    /// Orchestrator-supplied JSON parameters
    Params(PathBuf),
}

impl ConfigSource {
    /// Choose the source from command-line arguments and the environment
    ///
    /// Orchestrator parameters, given with `--params` or `OSM_FETCHER_PARAMS`, replace
    /// the configuration file entirely.
    pub fn from_cli(config_file: Option<PathBuf>, params_file: Option<PathBuf>) -> Self {
        let params = params_file.or_else(|| {
            std::env::var_os(env::PARAMS)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        });

        match params {
            Some(path) => Self::Params(path),
            None => Self::File(config_file),
        }
    }

    /// Path of the file this source reads, if any
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` when an explicitly named file does not exist.
    pub async fn locate(&self) -> ConfigResult<Option<PathBuf>> {
        match self {
            Self::Params(path) | Self::File(Some(path)) => {
                if tokio::fs::try_exists(path).await.unwrap_or(false) {
                    Ok(Some(path.clone()))
                } else {
                    Err(ConfigError::NotFound { path: path.clone() })
                }
            }
            Self::File(None) => Ok(AppConfig::find_config_file().await),
        }
    }
}

impl AppConfig {
    /// Load configuration from `source`
    ///
    /// A missing discovered file yields the defaults; a missing explicit file is an
    /// error.
    pub async fn load(source: &ConfigSource) -> ConfigResult<Self> {
        match (source, source.locate().await?) {
            (_, None) => {
                debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
            (ConfigSource::Params(_), Some(path)) => Self::load_from_params(&path).await,
            (ConfigSource::File(_), Some(path)) => Self::load_from_file(&path).await,
        }
    }

    /// Find configuration file in standard locations
    pub async fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![
            PathBuf::from(config_paths::LOCAL_CONFIG_FILE),
            PathBuf::from(config_paths::FALLBACK_CONFIG_FILE),
        ];
        if let Ok(path) = Self::get_default_config_path() {
            search_paths.push(path);
        }

        for path in search_paths {
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                debug!("Found config file: {}", path.display());
                return Some(path);
            }
        }

        debug!("No config file found in standard locations");
        None
    }

    /// Get the default config file path for the current user
    pub fn get_default_config_path() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::InvalidValue {
            field: "config_dir".to_string(),
            value: String::new(),
            reason: "Could not determine user config directory".to_string(),
        })?;

        Ok(config_dir
            .join(config_paths::APP_DIR_NAME)
            .join("config.toml"))
    }

    /// Load configuration from a TOML file
    pub async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = read(path).await?;
        let config: AppConfig = toml::from_str(&content)?;

        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Load orchestrator parameters from a JSON file
    pub async fn load_from_params(path: &Path) -> ConfigResult<Self> {
        let content = read(path).await?;
        let config: AppConfig = serde_json::from_str(&content)?;

        info!("Loaded orchestrator parameters from: {}", path.display());
        Ok(config)
    }

    /// Copy of this configuration with every unset value replaced by its default
    pub fn resolved(&self) -> Self {
        let acquisition = AcquisitionConfig::defaults_over(self);
        Self {
            countries: Some(acquisition.countries),
            osm_data: OsmDataConfig {
                download_historical: Some(acquisition.download_historical),
                historical_date: self.osm_data.historical_date.clone(),
                download_power_json: Some(acquisition.download_power_json),
                data_dir: Some(acquisition.data_dir),
                output_dir: Some(acquisition.output_dir),
            },
            client: self.client.clone(),
            logging: self.logging.clone(),
        }
    }

    /// Render as TOML
    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the commented default configuration to `path`
    ///
    /// # Errors
    ///
    /// Refuses to overwrite an existing file unless `force` is set.
    pub async fn write_default_config(path: &Path, force: bool) -> ConfigResult<()> {
        if !force && tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(ConfigError::InvalidValue {
                field: "path".to_string(),
                value: path.display().to_string(),
                reason: "File already exists, use --force to overwrite".to_string(),
            });
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| ConfigError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        tokio::fs::write(path, Self::generate_default_config_content())
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        info!("Wrote default configuration to: {}", path.display());
        Ok(())
    }

    /// Generate default configuration content with helpful comments
    pub fn generate_default_config_content() -> String {
        format!(
            r#"# OSM Power Fetcher Configuration
# Values left out fall back to the built-in defaults shown here.

# Country codes to process (ISO 3166-1 alpha-2)
countries = ["{country}"]

[osm_data]
# Fetch a dated snapshot instead of the latest extract
download_historical = false

# Snapshot date (YYYY-MM-DD); also used by the extract command
# historical_date = "{date}"

# Fetch the power-feature metadata file next to each extract
download_power_json = true

# Raw downloads
data_dir = "{data_dir}"

# Normalized all_raw_* outputs
output_dir = "{output_dir}"

[client]
# HTTP client settings
request_timeout = "30m"
connect_timeout = "30s"
rate_limit_rps = {rps}
index_url = "https://download.geofabrik.de/index-v1-nogeom.json"

[logging]
level = "info"  # error, warn, info, debug, trace
"#,
            country = defaults::COUNTRIES.join("\", \""),
            date = defaults::HISTORICAL_DATE,
            data_dir = defaults::DATA_DIR,
            output_dir = defaults::OUTPUT_DIR,
            rps = limits::DEFAULT_RATE_LIMIT_RPS,
        )
    }
}

async fn read(path: &Path) -> ConfigResult<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Values given explicitly on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub countries: Option<Vec<String>>,
    /// `--historical` was passed
    pub historical: bool,
    pub date: Option<String>,
    pub download_power_json: Option<bool>,
    pub data_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

/// Run-time acquisition settings, immutable for the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcquisitionConfig {
    /// Country codes, in processing order
    pub countries: Vec<String>,
    pub download_historical: bool,
    pub historical_date: Option<SnapshotDate>,
    pub download_power_json: bool,
    /// Raw-data directory
    pub data_dir: PathBuf,
    /// Normalized output directory
    pub output_dir: PathBuf,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            countries: defaults::COUNTRIES.iter().map(|c| c.to_string()).collect(),
            download_historical: false,
            historical_date: None,
            download_power_json: true,
            data_dir: PathBuf::from(defaults::DATA_DIR),
            output_dir: PathBuf::from(defaults::OUTPUT_DIR),
        }
    }
}

impl AcquisitionConfig {
    /// Merge command-line overrides onto file values onto defaults
    ///
    /// `--historical` without any date selects the default snapshot. A configured
    /// historical mode without a date falls back to latest data. The configured date
    /// is only read while historical mode is on.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::InvalidDateFormat` for a date that is not `YYYY-MM-DD`.
    pub fn resolve(file: &AppConfig, cli: &CliOverrides) -> SnapshotResult<Self> {
        let base = Self::defaults_over(file);

        let download_historical = cli.historical || base.download_historical;
        let raw_date = cli
            .date
            .clone()
            .or_else(|| {
                download_historical
                    .then(|| file.osm_data.historical_date.clone())
                    .flatten()
            })
            .or_else(|| cli.historical.then(|| defaults::HISTORICAL_DATE.to_string()));
        let historical_date = raw_date.as_deref().map(SnapshotDate::parse).transpose()?;

        Ok(Self {
            countries: cli.countries.clone().unwrap_or(base.countries),
            download_historical,
            historical_date,
            download_power_json: cli
                .download_power_json
                .unwrap_or(base.download_power_json),
            data_dir: cli.data_dir.clone().unwrap_or(base.data_dir),
            output_dir: cli.output_dir.clone().unwrap_or(base.output_dir),
        })
    }

    /// File values onto defaults, leaving the date unparsed
    fn defaults_over(file: &AppConfig) -> Self {
        let defaults = Self::default();
        let osm = &file.osm_data;

        Self {
            countries: file.countries.clone().unwrap_or(defaults.countries),
            download_historical: osm
                .download_historical
                .unwrap_or(defaults.download_historical),
            historical_date: None,
            download_power_json: osm
                .download_power_json
                .unwrap_or(defaults.download_power_json),
            data_dir: osm.data_dir.clone().unwrap_or(defaults.data_dir),
            output_dir: osm.output_dir.clone().unwrap_or(defaults.output_dir),
        }
    }

    /// Snapshot to fetch, when historical mode is on and a date is known
    pub fn snapshot(&self) -> Option<&SnapshotDate> {
        if self.download_historical {
            self.historical_date.as_ref()
        } else {
            None
        }
    }

    /// Whether historical mode was requested
    pub fn is_historical(&self) -> bool {
        self.download_historical
    }

    /// Warn about settings that silently change behavior
    pub fn warn_inconsistencies(&self) {
        if self.download_historical && self.historical_date.is_none() {
            warn!("Historical download requested without a date, fetching latest data");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FILE_CONFIG: &str = r#"
countries = ["PE", "EC"]

[osm_data]
download_historical = true
historical_date = "2021-06-15"
download_power_json = false
data_dir = "raw/osm"

[client]
request_timeout = "10m"
rate_limit_rps = 4

[logging]
level = "debug"
"#;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.countries.is_none());
        assert_eq!(config.client.rate_limit_rps, limits::DEFAULT_RATE_LIMIT_RPS);
        assert_eq!(config.logging.level, "info");

        let acquisition = AcquisitionConfig::resolve(&config, &CliOverrides::default()).unwrap();
        assert_eq!(acquisition, AcquisitionConfig::default());
        assert_eq!(acquisition.countries, vec!["CO".to_string()]);
        assert_eq!(acquisition.data_dir, PathBuf::from("data/osm"));
        assert_eq!(acquisition.output_dir, PathBuf::from("resources/osm/raw"));
        assert!(acquisition.snapshot().is_none());
    }

    #[test]
    fn test_config_file_generation() {
        let content = AppConfig::generate_default_config_content();
        let parsed: AppConfig = toml::from_str(&content).unwrap();

        assert!(content.contains("# OSM Power Fetcher Configuration"));
        assert_eq!(parsed.countries, Some(vec!["CO".to_string()]));
        assert_eq!(parsed.osm_data.download_historical, Some(false));
        assert!(parsed.osm_data.historical_date.is_none());
        assert_eq!(parsed.client.rate_limit_rps, limits::DEFAULT_RATE_LIMIT_RPS);
    }

    #[test]
    fn test_file_values_override_defaults() {
        let file: AppConfig = toml::from_str(FILE_CONFIG).unwrap();
        let config = AcquisitionConfig::resolve(&file, &CliOverrides::default()).unwrap();

        assert_eq!(config.countries, vec!["PE".to_string(), "EC".to_string()]);
        assert_eq!(config.snapshot().unwrap().to_string(), "2021-06-15");
        assert!(!config.download_power_json);
        assert_eq!(config.data_dir, PathBuf::from("raw/osm"));
        assert_eq!(config.output_dir, PathBuf::from("resources/osm/raw"));
    }

    #[test]
    fn test_cli_overrides_file_values() {
        let file: AppConfig = toml::from_str(FILE_CONFIG).unwrap();
        let cli = CliOverrides {
            countries: Some(vec!["CO".to_string()]),
            date: Some("2020-01-01".to_string()),
            download_power_json: Some(true),
            data_dir: Some(PathBuf::from("/tmp/osm")),
            ..Default::default()
        };

        let config = AcquisitionConfig::resolve(&file, &cli).unwrap();

        assert_eq!(config.countries, vec!["CO".to_string()]);
        assert_eq!(config.snapshot().unwrap().yymmdd(), "200101");
        assert!(config.download_power_json);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/osm"));
    }

    #[test]
    fn test_historical_flag_uses_default_date() {
        let cli = CliOverrides {
            historical: true,
            ..Default::default()
        };
        let config = AcquisitionConfig::resolve(&AppConfig::default(), &cli).unwrap();

        assert!(config.is_historical());
        assert_eq!(config.snapshot().unwrap().to_string(), "2020-01-01");
    }

    #[test]
    fn test_date_without_historical_mode_is_latest() {
        let cli = CliOverrides {
            date: Some("2020-01-01".to_string()),
            ..Default::default()
        };
        let config = AcquisitionConfig::resolve(&AppConfig::default(), &cli).unwrap();

        assert!(config.historical_date.is_some());
        assert!(config.snapshot().is_none());
    }

    #[test]
    fn test_configured_historical_without_date_is_latest() {
        let file: AppConfig =
            serde_json::from_str(r#"{"osm_data":{"download_historical":true}}"#).unwrap();
        let config = AcquisitionConfig::resolve(&file, &CliOverrides::default()).unwrap();

        assert!(config.is_historical());
        assert!(config.historical_date.is_none());
        assert!(config.snapshot().is_none());
    }

    #[test]
    fn test_configured_date_ignored_outside_historical_mode() {
        let file: AppConfig = serde_json::from_str(
            r#"{"osm_data":{"download_historical":false,"historical_date":"2020/01/01"}}"#,
        )
        .unwrap();
        let config = AcquisitionConfig::resolve(&file, &CliOverrides::default()).unwrap();

        assert!(config.historical_date.is_none());
        assert!(config.snapshot().is_none());

        let historical: AppConfig = serde_json::from_str(
            r#"{"osm_data":{"download_historical":true,"historical_date":"2020/01/01"}}"#,
        )
        .unwrap();
        assert!(AcquisitionConfig::resolve(&historical, &CliOverrides::default()).is_err());
    }

    #[test]
    fn test_invalid_date_rejected() {
        let cli = CliOverrides {
            historical: true,
            date: Some("2020/01/01".to_string()),
            ..Default::default()
        };
        assert!(AcquisitionConfig::resolve(&AppConfig::default(), &cli).is_err());
    }

    #[test]
    fn test_resolved_fills_defaults() {
        let resolved = AppConfig::default().resolved();
        assert_eq!(resolved.countries, Some(vec!["CO".to_string()]));
        assert_eq!(resolved.osm_data.download_power_json, Some(true));

        let rendered = resolved.to_toml().unwrap();
        assert!(rendered.contains("[osm_data]"));
        assert!(rendered.contains("resources/osm/raw"));
    }

    #[tokio::test]
    async fn test_config_loading_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let source = ConfigSource::File(Some(temp_dir.path().join("nonexistent.toml")));

        let result = AppConfig::load(&source).await;
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_config_loading_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        tokio::fs::write(&config_path, FILE_CONFIG).await.unwrap();

        let config = AppConfig::load(&ConfigSource::File(Some(config_path)))
            .await
            .unwrap();

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.client.rate_limit_rps, 4);
        assert_eq!(
            config.client.request_timeout,
            std::time::Duration::from_secs(600)
        );
        assert_eq!(config.osm_data.output_dir, None);
    }

    #[tokio::test]
    async fn test_invalid_toml_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        tokio::fs::write(&config_path, "countries = [").await.unwrap();

        let result = AppConfig::load(&ConfigSource::File(Some(config_path))).await;
        assert!(matches!(result, Err(ConfigError::InvalidFormat(_))));
    }

    #[tokio::test]
    async fn test_params_loading() {
        let temp_dir = TempDir::new().unwrap();
        let params_path = temp_dir.path().join("params.json");
        tokio::fs::write(
            &params_path,
            r#"{"countries": ["BO"], "osm_data": {"output_dir": "results/osm"}}"#,
        )
        .await
        .unwrap();

        let config = AppConfig::load(&ConfigSource::Params(params_path))
            .await
            .unwrap();
        let acquisition = AcquisitionConfig::resolve(&config, &CliOverrides::default()).unwrap();

        assert_eq!(acquisition.countries, vec!["BO".to_string()]);
        assert_eq!(acquisition.output_dir, PathBuf::from("results/osm"));
        assert!(acquisition.download_power_json);
    }

    #[tokio::test]
    async fn test_write_default_config_respects_force() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        AppConfig::write_default_config(&path, false).await.unwrap();
        assert!(AppConfig::write_default_config(&path, false).await.is_err());
        AppConfig::write_default_config(&path, true).await.unwrap();

        let loaded = AppConfig::load(&ConfigSource::File(Some(path))).await.unwrap();
        assert_eq!(loaded.countries, Some(vec!["CO".to_string()]));
    }

    #[test]
    fn test_explicit_params_win_over_config_file() {
        let source = ConfigSource::from_cli(
            Some(PathBuf::from("config.toml")),
            Some(PathBuf::from("params.json")),
        );
        assert_eq!(source, ConfigSource::Params(PathBuf::from("params.json")));
    }
}
