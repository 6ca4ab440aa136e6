use std::time::Duration;

use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use snaptrack_domain::{HttpConfig, SnaptrackError};
use tracing::debug;

use crate::errors::{status_error, InfraError};

/// HTTP client with optional retry and a per-request timeout.
///
/// Only idempotent methods are ever retried. Capture adapters are built with
/// [`fail_fast`](Self::fail_fast) and never retry at all.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: usize,
    base_backoff: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Client configured from the `http` config section.
    pub fn from_config(config: &HttpConfig) -> Result<Self, SnaptrackError> {
        Self::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .max_attempts(config.max_attempts)
            .user_agent(concat!("snaptrack/", env!("CARGO_PKG_VERSION")))
            .build()
    }

    /// Client for the capture path: configured timeout, exactly one attempt
    /// regardless of `max_attempts`.
    pub fn fail_fast(config: &HttpConfig) -> Result<Self, SnaptrackError> {
        Self::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .max_attempts(1)
            .user_agent(concat!("snaptrack/", env!("CARGO_PKG_VERSION")))
            .build()
    }

    pub const fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the provided request builder with retry semantics.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, SnaptrackError> {
        let mut attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        while attempt < attempts {
            let cloned_builder = builder.try_clone().ok_or_else(|| {
                SnaptrackError::Internal(
                    "request body cannot be cloned; buffer the body to enable retries".into(),
                )
            })?;

            let request = cloned_builder.build().map_err(|err| SnaptrackError::from(InfraError::from(err)))?;

            let method = request.method().clone();
            let url = request.url().clone();
            if !method.is_idempotent() {
                attempts = 1;
            }
            debug!(attempt = attempt + 1, %method, %url, "sending HTTP request");

            match self.client.execute(request).await {
                Ok(response) => {
                    let status = response.status();
                    debug!(attempt = attempt + 1, %method, %url, %status, "received HTTP response");

                    if status.is_server_error() && attempt + 1 < attempts {
                        attempt += 1;
                        self.sleep_with_backoff(attempt).await;
                        continue;
                    }

                    return Ok(response);
                }
                Err(err) => {
                    debug!(attempt = attempt + 1, %method, %url, error = %err, "HTTP request failed");

                    if attempt + 1 < attempts && should_retry_error(&err) {
                        attempt += 1;
                        self.sleep_with_backoff(attempt).await;
                        continue;
                    }

                    return Err(InfraError::from(err).into());
                }
            }
        }

        Err(SnaptrackError::Internal("http client exhausted retries without producing a result".into()))
    }

    /// Like [`send`](Self::send) but turns non-2xx statuses into errors that
    /// carry the response body.
    pub async fn send_ok(&self, builder: RequestBuilder) -> Result<Response, SnaptrackError> {
        let response = self.send(builder).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, Some(&body)))
    }

    fn backoff_delay(&self, retry_number: usize) -> Duration {
        let shift = u32::try_from(retry_number.saturating_sub(1).min(8)).unwrap_or(8);
        self.base_backoff.saturating_mul(1u32 << shift)
    }

    async fn sleep_with_backoff(&self, retry_number: usize) {
        let delay = self.backoff_delay(retry_number);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_attempts: 1,
            base_backoff: Duration::from_millis(200),
            user_agent: None,
            default_headers: None,
        }
    }
}

impl HttpClientBuilder {
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub const fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn build(self) -> Result<HttpClient, SnaptrackError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| SnaptrackError::from(InfraError::from(err)))?;

        Ok(HttpClient { client, max_attempts: self.max_attempts.max(1), base_backoff: self.base_backoff })
    }
}

fn should_retry_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_request() || err.is_connect()
}
