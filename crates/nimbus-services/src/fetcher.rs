//! Current-weather retrieval from the OpenWeatherMap API.

use async_trait::async_trait;
use nimbus_core::WeatherPayload;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const CURRENT_WEATHER_PATH: &str = "/data/2.5/weather";

/// Weather fetch errors
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Weather request failed: {0}")]
    Request(String),

    #[error("Weather API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse weather response: {0}")]
    Parse(String),

    #[error("Weather fetch failed after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: Box<FetchError>,
    },
}

impl FetchError {
    /// Whether another attempt could succeed. A body that arrived but is not a
    /// JSON object will not improve on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Request(_) | FetchError::Status { .. })
    }
}

/// A single attempt at retrieving the current weather for a location.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current_weather(&self, location: &str) -> Result<WeatherPayload, FetchError>;
}

/// OpenWeatherMap current-weather client
pub struct OpenWeatherClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl Debug for OpenWeatherClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("OpenWeatherClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenWeatherClient {
    /// `timeout` bounds each request, not the whole retry sequence.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            CURRENT_WEATHER_PATH
        )
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn current_weather(&self, location: &str) -> Result<WeatherPayload, FetchError> {
        // The query string carries the API key, so errors are stripped of their URL.
        let response = self
            .http_client
            .get(self.endpoint())
            .query(&[("q", location), ("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| FetchError::Request(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Request(e.without_url().to_string()))?;

        serde_json::from_slice::<WeatherPayload>(&body).map_err(|e| FetchError::Parse(e.to_string()))
    }
}

/// Retries a `WeatherSource` immediately, without backoff.
#[derive(Clone)]
pub struct WeatherFetcher {
    source: Arc<dyn WeatherSource>,
}

impl WeatherFetcher {
    pub fn new(source: Arc<dyn WeatherSource>) -> Self {
        Self { source }
    }

    /// Fetch the current weather, making at most `retries` attempts.
    ///
    /// A `retries` of zero is treated as one attempt.
    #[tracing::instrument(skip(self))]
    pub async fn fetch(&self, location: &str, retries: u32) -> Result<WeatherPayload, FetchError> {
        let max_attempts = retries.max(1);

        let mut attempt = 1;
        loop {
            match self.source.current_weather(location).await {
                Ok(payload) => {
                    tracing::info!(location = %location, attempt, "Weather data fetched");
                    return Ok(payload);
                }
                Err(e) if !e.is_retryable() => {
                    tracing::error!(location = %location, error = %e, "Weather response rejected");
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(
                        location = %location,
                        attempt,
                        max_attempts,
                        error = %e,
                        "Weather API request failed"
                    );
                    if attempt >= max_attempts {
                        return Err(FetchError::Exhausted {
                            attempts: attempt,
                            source: Box::new(e),
                        });
                    }
                }
            }
            attempt += 1;
        }
    }
}
