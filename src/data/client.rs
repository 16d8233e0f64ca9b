//! BCCh statistics API client
//!
//! Fetches series data and the series catalogue from the BCCh REST web service.
//! Every request goes through the injected `TtlCache`: the fully resolved
//! request URL is the cache key, hits are decoded without touching the network,
//! and only successfully decoded response bodies are stored.

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::time::Instant;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{AvailableSeries, Frequency, SeriesData};
use crate::cache::{CacheError, TtlCache};
use crate::config::Settings;
use crate::credentials::Credentials;
use crate::fetch::{fetch_many, FetchOutcome};

/// Endpoint of the BCCh REST web service
pub const BCCH_BASE_URL: &str = "https://si3.bcentral.cl/SieteRestWS/SieteRestWS.ashx";

/// Errors that can occur when fetching from the BCCh API
#[derive(Debug, Error)]
pub enum ApiError {
    /// User or password is empty
    #[error("missing BCCh credentials, use 'set-credentials' to save them")]
    MissingCredentials,

    /// The configured base URL cannot be parsed
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),

    /// HTTP request failed (connection, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Upstream answered with a status of 400 or above
    #[error("upstream returned status {status}")]
    Upstream { status: u16 },

    /// Failed to parse JSON response
    #[error("failed to parse JSON response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Storing the response in the cache failed
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    /// The request was cancelled before it completed
    #[error("request cancelled")]
    Cancelled,
}

/// Client for the BCCh statistics API
///
/// Cloning is cheap and clones share the same HTTP connection pool and cache.
#[derive(Debug, Clone)]
pub struct BcchClient {
    http_client: Client,
    cache: TtlCache,
    base_url: String,
    credentials: Credentials,
}

impl BcchClient {
    /// Creates a client using the endpoint and timeout from `settings`
    pub fn new(
        settings: &Settings,
        cache: TtlCache,
        credentials: Credentials,
    ) -> Result<Self, ApiError> {
        let http_client = Client::builder()
            .timeout(settings.request_timeout())
            .build()?;

        Ok(Self {
            http_client,
            cache,
            base_url: settings.base_url.clone(),
            credentials,
        })
    }

    /// Replaces the HTTP client, keeping cache, endpoint and credentials
    pub fn with_http_client(mut self, http_client: Client) -> Self {
        self.http_client = http_client;
        self
    }

    /// The cache shared by every request made through this client
    pub fn cache(&self) -> &TtlCache {
        &self.cache
    }

    /// Fetches observations for one series
    ///
    /// # Arguments
    /// * `series_id` - BCCh series identifier
    /// * `first_date` - Optional start date (`YYYY-MM-DD`)
    /// * `last_date` - Optional end date (`YYYY-MM-DD`)
    /// * `cancel` - Aborts the network call when cancelled
    pub async fn get_series_data(
        &self,
        series_id: &str,
        first_date: Option<&str>,
        last_date: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<SeriesData, ApiError> {
        let mut params = vec![("function", "GetSeries"), ("timeseries", series_id)];
        if let Some(first_date) = first_date {
            params.push(("firstdate", first_date));
        }
        if let Some(last_date) = last_date {
            params.push(("lastdate", last_date));
        }

        let url = self.endpoint(&params)?;
        self.read_through(url, cancel).await
    }

    /// Fetches the catalogue of series available at `frequency`
    pub async fn get_available_series(
        &self,
        frequency: Frequency,
        cancel: &CancellationToken,
    ) -> Result<AvailableSeries, ApiError> {
        let url = self.endpoint(&[
            ("function", "SearchSeries"),
            ("frequency", frequency.as_str()),
        ])?;
        self.read_through(url, cancel).await
    }

    /// Fetches many series with at most `concurrency` requests in flight
    ///
    /// Each series succeeds or fails on its own; see [`fetch_many`].
    pub async fn get_multiple_series_data(
        &self,
        series_ids: &[String],
        first_date: Option<&str>,
        last_date: Option<&str>,
        concurrency: i64,
        cancel: &CancellationToken,
    ) -> FetchOutcome<SeriesData, ApiError> {
        let client = self.clone();
        let first_date = first_date.map(str::to_string);
        let last_date = last_date.map(str::to_string);

        fetch_many(series_ids, concurrency, cancel, move |series_id, token| {
            let client = client.clone();
            let first_date = first_date.clone();
            let last_date = last_date.clone();
            async move {
                client
                    .get_series_data(
                        &series_id,
                        first_date.as_deref(),
                        last_date.as_deref(),
                        &token,
                    )
                    .await
            }
        })
        .await
    }

    /// Builds the request URL, which doubles as the cache key
    fn endpoint(&self, params: &[(&str, &str)]) -> Result<Url, ApiError> {
        if !self.credentials.is_complete() {
            return Err(ApiError::MissingCredentials);
        }

        let auth = [
            ("user", self.credentials.user.as_str()),
            ("pass", self.credentials.password.as_str()),
        ];
        Url::parse_with_params(&self.base_url, auth.iter().chain(params.iter()))
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))
    }

    /// Serves `url` from the cache, or fetches, decodes and caches it
    async fn read_through<T: DeserializeOwned>(
        &self,
        url: Url,
        cancel: &CancellationToken,
    ) -> Result<T, ApiError> {
        if let Some(cached) = self.cache.get(url.as_str()) {
            debug!(url = %redact(&url), "cache hit");
            return Ok(serde_json::from_slice(&cached)?);
        }

        let body = self.fetch_body(&url, cancel).await?;
        let value = serde_json::from_slice(&body)?;
        self.cache.put(url.as_str(), body)?;
        Ok(value)
    }

    /// Performs the GET request and returns the raw body of a successful response
    async fn fetch_body(&self, url: &Url, cancel: &CancellationToken) -> Result<Vec<u8>, ApiError> {
        let started = Instant::now();
        debug!(url = %redact(url), "cache miss, requesting");

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ApiError::Cancelled),
            response = self.http_client.get(url.clone()).send() => response?,
        };

        let status = response.status().as_u16();
        if status >= 400 {
            warn!(url = %redact(url), status, "upstream error");
            return Err(ApiError::Upstream { status });
        }

        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ApiError::Cancelled),
            body = response.bytes() => body?,
        };

        debug!(
            url = %redact(url),
            bytes = body.len(),
            elapsed = ?started.elapsed(),
            "response received"
        );
        Ok(body.to_vec())
    }
}

/// Renders `url` for logs with the password masked
fn redact(url: &Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            let value = if key == "pass" {
                "***".to_string()
            } else {
                value.into_owned()
            };
            (key.into_owned(), value)
        })
        .collect();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}
