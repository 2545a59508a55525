//! Core HTTP operations with rate limiting
//!
//! Every request towards the extract server goes through a single rate limiter so
//! that sequential per-country downloads stay polite. Failures are reported to the
//! caller as typed errors and are never retried here.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Jitter, Quota, RateLimiter,
};
use reqwest::{Client, StatusCode};
use url::Url;

use crate::errors::{DownloadError, DownloadResult};

/// HTTP operations handler
#[derive(Debug)]
pub struct HttpHandler {
    client: Client,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl HttpHandler {
    /// Creates a new HttpHandler with the given client and rate limit
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::Other` if the rate limit is zero
    pub fn new(client: Client, rate_limit_rps: u32) -> DownloadResult<Self> {
        let rate_limiter = Self::build_rate_limiter(rate_limit_rps)?;
        Ok(Self {
            client,
            rate_limiter,
        })
    }

    fn build_rate_limiter(
        rate_limit_rps: u32,
    ) -> DownloadResult<RateLimiter<NotKeyed, InMemoryState, DefaultClock>> {
        let rps = NonZeroU32::new(rate_limit_rps)
            .ok_or_else(|| DownloadError::Other("Rate limit must be non-zero".to_string()))?;
        Ok(RateLimiter::direct(Quota::per_second(rps)))
    }

    /// Fetches a successful HTTP response
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::NotFound` for HTTP 404, `DownloadError::ServerError` for
    /// any other non-success status and `DownloadError::Http` for transport failures.
    pub async fn get_response(&self, url: &Url) -> DownloadResult<reqwest::Response> {
        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(100)))
            .await;

        let response = self.client.get(url.as_str()).send().await?;

        match response.status() {
            status if status.is_success() => {
                tracing::debug!("Fetched response: {}", url);
                Ok(response)
            }
            StatusCode::NOT_FOUND => Err(DownloadError::NotFound {
                url: url.to_string(),
            }),
            status => Err(DownloadError::ServerError {
                status: status.as_u16(),
                url: url.to_string(),
            }),
        }
    }

    /// Fetches a response body as text
    pub async fn get_text(&self, url: &Url) -> DownloadResult<String> {
        let response = self.get_response(url).await?;
        Ok(response.text().await?)
    }
}
