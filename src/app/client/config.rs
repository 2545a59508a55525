//! HTTP client configuration and building logic
//!
//! This module handles the configuration and construction of the HTTP client used
//! for region index lookups and extract downloads.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::constants::{geofabrik, http, limits};
use crate::errors::{DownloadError, DownloadResult};

/// Configuration for the download client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Request timeout, covering the whole body transfer
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Connect timeout
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// Rate limit (requests per second)
    pub rate_limit_rps: u32,
    /// Region index location
    pub index_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: http::DEFAULT_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            rate_limit_rps: limits::DEFAULT_RATE_LIMIT_RPS,
            index_url: geofabrik::INDEX_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Builds the HTTP client with the specified configuration
    pub fn build_http_client(&self) -> DownloadResult<Client> {
        Client::builder()
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(http::USER_AGENT)
            .pool_idle_timeout(http::POOL_IDLE_TIMEOUT)
            .tcp_nodelay(true)
            .build()
            .map_err(DownloadError::Http)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.rate_limit_rps, limits::DEFAULT_RATE_LIMIT_RPS);
        assert_eq!(config.index_url, geofabrik::INDEX_URL);
    }

    #[test]
    fn test_http_client_creation() {
        let config = ClientConfig {
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            ..Default::default()
        };

        assert!(config.build_http_client().is_ok());
    }

    #[test]
    fn test_durations_are_human_readable() {
        let config: ClientConfig = toml::from_str(
            r#"
request_timeout = "10m"
connect_timeout = "45s"
rate_limit_rps = 1
index_url = "http://localhost/index.json"
"#,
        )
        .unwrap();

        assert_eq!(config.request_timeout, Duration::from_secs(600));
        assert_eq!(config.connect_timeout, Duration::from_secs(45));
        assert_eq!(config.rate_limit_rps, 1);
    }
}
