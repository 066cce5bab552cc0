//! Storyblok content delivery API client.
//!
//! Implements `ContentSource` over the `/v2/cdn` endpoints: stories,
//! datasource entries and the space version used for cache gating.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::Record;
use crate::source::{ContentSource, FetchRequest, FetchTarget};
use crate::util::{compact_text, is_http_url, normalize_text_option};

const STORIES_PER_PAGE: usize = 100;
const DATASOURCE_ENTRIES_PER_PAGE: usize = 1000;

/// Hosting region of a space
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[default]
    Eu,
    Us,
    Ap,
    Ca,
    Cn,
}

impl Region {
    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Eu => "https://api.storyblok.com",
            Self::Us => "https://api-us.storyblok.com",
            Self::Ap => "https://api-ap.storyblok.com",
            Self::Ca => "https://api-ca.storyblok.com",
            Self::Cn => "https://app.storyblokchina.cn",
        }
    }
}

/// Which revision of content to read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentVersion {
    Draft,
    #[default]
    Published,
}

impl ContentVersion {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
        }
    }
}

#[derive(Clone)]
pub struct StoryblokClient {
    base_url: String,
    access_token: String,
    version: ContentVersion,
    client: reqwest::Client,
}

impl std::fmt::Debug for StoryblokClient {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("StoryblokClient")
            .field("base_url", &self.base_url)
            .field("access_token", &"[REDACTED]")
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl StoryblokClient {
    pub fn new(
        access_token: impl Into<String>,
        region: Region,
        version: ContentVersion,
    ) -> Result<Self> {
        Self::with_base_url(access_token, region.base_url(), version)
    }

    /// Create a client against an explicit API origin (e.g. a caching proxy)
    pub fn with_base_url(
        access_token: impl Into<String>,
        base_url: impl Into<String>,
        version: ContentVersion,
    ) -> Result<Self> {
        let access_token = normalize_text_option(Some(access_token.into()))
            .ok_or_else(|| Error::Config("access token must not be empty".to_string()))?;
        let base_url = normalize_base_url(base_url.into())?;
        Ok(Self {
            base_url,
            access_token,
            version,
            client: reqwest::Client::builder().build()?,
        })
    }

    async fn get_json(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<(Value, Option<usize>)> {
        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .query(&[("token", self.access_token.as_str())])
            .query(query)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api(parse_api_error(status, &body)));
        }

        let total = response
            .headers()
            .get("total")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse().ok());
        let payload = response.json::<Value>().await?;
        Ok((payload, total))
    }

    /// Walk pages of `path` until `total` records or a short page arrive
    async fn collect_pages(
        &self,
        path: &str,
        query: Vec<(String, String)>,
        field: &str,
        per_page: usize,
    ) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        let mut page = 1usize;

        loop {
            let mut page_query = query.clone();
            page_query.push(("per_page".to_string(), per_page.to_string()));
            page_query.push(("page".to_string(), page.to_string()));

            let (payload, total) = self.get_json(path, &page_query).await?;
            let batch = records_from_payload(payload, field)?;
            let count = batch.len();
            records.extend(batch);

            tracing::debug!(path, page, count, total = ?total, "Fetched page");

            let exhausted = total.map_or(count < per_page, |total| records.len() >= total);
            if exhausted || count == 0 {
                break;
            }
            page += 1;
        }

        Ok(records)
    }
}

impl ContentSource for StoryblokClient {
    async fn fetch_records(&self, request: FetchRequest) -> Result<Vec<Record>> {
        match &request.target {
            FetchTarget::Stories => {
                let query = story_query(self.version, &request);
                self.collect_pages("/v2/cdn/stories", query, "stories", STORIES_PER_PAGE)
                    .await
            }
            FetchTarget::Datasource {
                datasource,
                dimension,
                switch_names_and_values,
            } => {
                let mut query = vec![("datasource".to_string(), datasource.clone())];
                if let Some(dimension) = dimension {
                    query.push(("dimension".to_string(), dimension.clone()));
                }
                let entries = self
                    .collect_pages(
                        "/v2/cdn/datasource_entries",
                        query,
                        "datasource_entries",
                        DATASOURCE_ENTRIES_PER_PAGE,
                    )
                    .await?;
                if *switch_names_and_values {
                    Ok(entries
                        .into_iter()
                        .map(|entry| entry.with_swapped_fields("name", "value"))
                        .collect())
                } else {
                    Ok(entries)
                }
            }
        }
    }

    async fn fetch_version(&self) -> Result<u64> {
        let (payload, _) = self.get_json("/v2/cdn/spaces/me", &[]).await?;
        parse_space_version(&payload)
    }
}

/// Query parameters for one stories request, excluding paging
fn story_query(version: ContentVersion, request: &FetchRequest) -> Vec<(String, String)> {
    let mut query: Vec<(String, String)> = request
        .params
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), "token" | "page" | "per_page"))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    query.push(("version".to_string(), version.as_str().to_string()));
    if let Some(category) = &request.category {
        query.push(("content_type".to_string(), category.clone()));
    }
    if let Some(published_after) = request.published_after {
        query.push((
            "published_at_gt".to_string(),
            published_after.format("%Y-%m-%d %H:%M").to_string(),
        ));
    }
    query
}

fn records_from_payload(mut payload: Value, field: &str) -> Result<Vec<Record>> {
    let items = payload
        .get_mut(field)
        .map(Value::take)
        .ok_or_else(|| Error::Api(format!("response did not include '{field}'")))?;
    Ok(serde_json::from_value(items)?)
}

#[derive(Debug, Deserialize)]
struct SpaceResponse {
    space: SpaceInfo,
}

#[derive(Debug, Deserialize)]
struct SpaceInfo {
    version: u64,
}

fn parse_space_version(payload: &Value) -> Result<u64> {
    let response = SpaceResponse::deserialize(payload)
        .map_err(|error| Error::Api(format!("invalid space payload: {error}")))?;
    Ok(response.space.version)
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

fn normalize_base_url(raw: String) -> Result<String> {
    let base_url = normalize_text_option(Some(raw))
        .ok_or_else(|| Error::Config("base URL must not be empty".to_string()))?;
    if is_http_url(&base_url) {
        Ok(base_url.trim_end_matches('/').to_string())
    } else {
        Err(Error::Config(
            "base URL must include http:// or https://".to_string(),
        ))
    }
}
