//! Screenshot source backed by a local HTTP screenshot service.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use snaptrack_core::ScreenshotSource;
use snaptrack_domain::{CaptureConfig, Result, ScreenshotImage, SnaptrackError};
use tracing::{debug, instrument};
use url::Url;

use crate::errors::InfraError;
use crate::http::HttpClient;

pub struct HttpScreenshotSource {
    http: HttpClient,
    endpoint: Url,
    default_content_type: String,
}

impl HttpScreenshotSource {
    pub fn new(http: HttpClient, config: &CaptureConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.screenshot_endpoint).map_err(|err| {
            SnaptrackError::Config(format!(
                "invalid screenshot endpoint '{}': {err}",
                config.screenshot_endpoint
            ))
        })?;
        Ok(Self { http, endpoint, default_content_type: config.content_type.clone() })
    }
}

#[async_trait]
impl ScreenshotSource for HttpScreenshotSource {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn fetch_screenshot(&self) -> Result<ScreenshotImage> {
        let response = self.http.send_ok(self.http.request(Method::GET, self.endpoint.clone())).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map_or_else(|| self.default_content_type.clone(), str::to_string);

        let bytes = response.bytes().await.map_err(|err| SnaptrackError::from(InfraError::from(err)))?;
        if bytes.is_empty() {
            return Err(SnaptrackError::Network("screenshot service returned an empty body".into()));
        }

        debug!(size = bytes.len(), content_type = %content_type, "screenshot fetched");
        Ok(ScreenshotImage { bytes: bytes.to_vec(), content_type })
    }
}
