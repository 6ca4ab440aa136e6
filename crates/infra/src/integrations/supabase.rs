//! Supabase storage + REST client
//!
//! Implements the screenshot sink (object storage upload and `timelogs`
//! insert) and the remote URL mapping table.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use snaptrack_core::{ScreenshotSink, UrlMappingRepository};
use snaptrack_domain::{
    CaptureRecord, MappingId, NewUrlMapping, Result, ScreenshotImage, SinkConfig, SnaptrackError,
    UrlMapping, UrlMappingDraft,
};
use tracing::{debug, info, instrument};
use url::Url;

use crate::errors::InfraError;
use crate::http::HttpClient;

const PREFER: HeaderName = HeaderName::from_static("prefer");
const API_KEY: HeaderName = HeaderName::from_static("apikey");
const UPSERT: HeaderName = HeaderName::from_static("x-upsert");

/// Objects are always named `.png`, so they are always stored as PNG.
const OBJECT_CONTENT_TYPE: &str = "image/png";

/// Client for a Supabase project.
pub struct SupabaseClient {
    http: HttpClient,
    base_url: Url,
    auth_headers: HeaderMap,
    bucket: String,
    records_table: String,
    mappings_table: String,
}

impl SupabaseClient {
    pub fn new(http: HttpClient, config: &SinkConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|err| {
            SnaptrackError::Config(format!("invalid sink base url '{}': {err}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SnaptrackError::Config(format!("sink base url '{}' cannot be a base", config.base_url)));
        }

        let mut auth_headers = HeaderMap::new();
        if let Some(key) = config.api_key.as_deref().filter(|key| !key.is_empty()) {
            let invalid = |_| SnaptrackError::Config("sink api key is not a valid header value".into());
            auth_headers.insert(API_KEY, HeaderValue::from_str(key).map_err(invalid)?);
            auth_headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {key}")).map_err(invalid)?);
        }

        Ok(Self {
            http,
            base_url,
            auth_headers,
            bucket: config.bucket.clone(),
            records_table: config.records_table.clone(),
            mappings_table: config.mappings_table.clone(),
        })
    }

    /// Public URL of an object in the screenshot bucket.
    pub fn public_url(&self, filename: &str) -> Result<String> {
        self.endpoint(&["storage", "v1", "object", "public", &self.bucket, filename]).map(String::from)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SnaptrackError::Config("sink base url cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn table(&self, table: &str) -> Result<Url> {
        self.endpoint(&["rest", "v1", table])
    }

    fn mapping_row(&self, id: MappingId) -> Result<Url> {
        let mut url = self.table(&self.mappings_table)?;
        url.query_pairs_mut().append_pair("url_mapping_id", &format!("eq.{id}"));
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        self.http.request(method, url).headers(self.auth_headers.clone())
    }

    async fn json_rows<T: DeserializeOwned>(&self, builder: reqwest::RequestBuilder) -> Result<Vec<T>> {
        let response = self.http.send_ok(builder).await?;
        response.json::<Vec<T>>().await.map_err(|err| InfraError::from(err).into())
    }
}

#[async_trait]
impl ScreenshotSink for SupabaseClient {
    #[instrument(skip(self, image), fields(size = image.bytes.len()))]
    async fn upload(&self, filename: &str, image: &ScreenshotImage) -> Result<String> {
        let url = self.endpoint(&["storage", "v1", "object", &self.bucket, filename])?;
        if image.content_type != OBJECT_CONTENT_TYPE {
            debug!(source_content_type = %image.content_type, "storing screenshot as {OBJECT_CONTENT_TYPE}");
        }
        let builder = self
            .request(Method::POST, url)
            .header(CONTENT_TYPE, OBJECT_CONTENT_TYPE)
            .header(UPSERT, "false")
            .body(image.bytes.clone());

        self.http.send_ok(builder).await?;
        let public_url = self.public_url(filename)?;
        debug!(public_url = %public_url, "screenshot uploaded");
        Ok(public_url)
    }

    #[instrument(skip(self, record))]
    async fn insert_record(&self, record: &CaptureRecord) -> Result<()> {
        let builder = self
            .request(Method::POST, self.table(&self.records_table)?)
            .header(PREFER, "return=minimal")
            .json(record);

        self.http.send_ok(builder).await?;
        debug!(table = %self.records_table, "time log record inserted");
        Ok(())
    }
}

#[async_trait]
impl UrlMappingRepository for SupabaseClient {
    #[instrument(skip(self))]
    async fn list_mappings(&self) -> Result<Vec<UrlMapping>> {
        let mut url = self.table(&self.mappings_table)?;
        url.query_pairs_mut().append_pair("select", "*").append_pair("order", "created_at.desc");
        self.json_rows(self.request(Method::GET, url)).await
    }

    #[instrument(skip(self, draft))]
    async fn create_mapping(&self, draft: &UrlMappingDraft, owner_id: &str) -> Result<UrlMapping> {
        let builder = self
            .request(Method::POST, self.table(&self.mappings_table)?)
            .header(PREFER, "return=representation")
            .json(&NewUrlMapping { draft, owner_id });

        let created: Vec<UrlMapping> = self.json_rows(builder).await?;
        let row = created
            .into_iter()
            .next()
            .ok_or_else(|| SnaptrackError::Internal("mapping insert returned no row".into()))?;
        info!(mapping_id = row.id, "mapping inserted");
        Ok(row)
    }

    #[instrument(skip(self, draft))]
    async fn update_mapping(&self, id: MappingId, draft: &UrlMappingDraft) -> Result<()> {
        let builder = self
            .request(Method::PATCH, self.mapping_row(id)?)
            .header(PREFER, "return=representation")
            .json(draft);

        let updated: Vec<UrlMapping> = self.json_rows(builder).await?;
        if updated.is_empty() {
            return Err(SnaptrackError::NotFound(format!("url mapping {id}")));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_mapping(&self, id: MappingId) -> Result<()> {
        let builder =
            self.request(Method::DELETE, self.mapping_row(id)?).header(PREFER, "return=representation");

        let deleted: Vec<UrlMapping> = self.json_rows(builder).await?;
        if deleted.is_empty() {
            return Err(SnaptrackError::NotFound(format!("url mapping {id}")));
        }
        Ok(())
    }
}
