//! HTTP client for the Slack Web API.
//!
//! Handles bearer authentication, timeouts, status classification and
//! envelope decoding. Method wrappers live in `endpoints`.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use nh_core::config::SyncConfig;
use nh_core::error::{NhError, NhResult};

use crate::limiter::{IntervalLimiter, RateLimiter};
use crate::response::SlackResponse;

/// Slack Web API client.
#[derive(Clone)]
pub struct SlackClient {
    inner: Client,
    /// API root, e.g. `https://slack.com/api`.
    base_url: String,
    token: String,
    timeout: Duration,
    limiter: Arc<dyn RateLimiter>,
}

impl SlackClient {
    /// Create a client from the bot token and sync settings. Enrichment
    /// calls are paced by an [`IntervalLimiter`] at the configured interval.
    pub fn new(token: &str, config: &SyncConfig) -> NhResult<Self> {
        let timeout = Duration::from_millis(config.api_timeout_ms);
        let inner = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(15))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| NhError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            timeout,
            limiter: Arc::new(IntervalLimiter::from_millis(config.rate_limit_interval_ms)),
        })
    }

    /// Replace the rate limiter.
    pub fn with_limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of a Web API method.
    pub fn method_url(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }

    /// Wait for the rate limiter.
    pub(crate) async fn pace(&self) {
        self.limiter.acquire().await;
    }

    /// GET a method with query parameters and decode its envelope.
    pub(crate) async fn get_method<T, Q>(&self, method: &str, query: &Q) -> NhResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        debug!("GET {method}");
        let response = self
            .inner
            .get(self.method_url(method))
            .bearer_auth(&self.token)
            .query(query)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(Self::classify_error)?;

        let response = Self::check_status(response).await?;
        Self::parse_response::<T>(response).await?.into_result(method)
    }

    /// POST a JSON body to a method and decode its envelope.
    pub(crate) async fn post_method<T, B>(&self, method: &str, body: &B) -> NhResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        debug!("POST {method}");
        let response = self
            .inner
            .post(self.method_url(method))
            .bearer_auth(&self.token)
            .json(body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(Self::classify_error)?;

        let response = Self::check_status(response).await?;
        Self::parse_response::<T>(response).await?.into_result(method)
    }

    /// Deserialize a response body into a SlackResponse<T>.
    pub async fn parse_response<T: DeserializeOwned>(
        response: Response,
    ) -> NhResult<SlackResponse<T>> {
        response
            .json::<SlackResponse<T>>()
            .await
            .map_err(|e| NhError::Serialization(format!("failed to parse response: {e}")))
    }

    /// Check the HTTP status code and convert to NhError if needed.
    async fn check_status(response: Response) -> NhResult<Response> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(NhError::AuthFailed(format!("slack returned {status}")));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("?")
                .to_string();
            return Err(NhError::ApiRejected {
                method: response.url().path().to_string(),
                error: format!("ratelimited (retry after {retry_after}s)"),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NhError::Http(format!("slack returned {status}: {body}")));
        }

        Ok(response)
    }

    /// Classify a reqwest error into an NhError variant.
    fn classify_error(e: reqwest::Error) -> NhError {
        if e.is_timeout() {
            NhError::Timeout(e.to_string())
        } else if e.is_connect() {
            NhError::Http(format!("connection failed: {e}"))
        } else if e.is_decode() {
            NhError::Serialization(e.to_string())
        } else {
            NhError::Http(e.to_string())
        }
    }
}
