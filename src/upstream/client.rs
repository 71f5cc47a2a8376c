use super::config::{MAX_PAGE_SIZE, UpstreamConfig};
use super::{RawPayload, SocialApi, UpstreamError};
use crate::models::{PostId, UserId};
use log::debug;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;

/// HTTP client for the v1.1 REST endpoints used by the reach pipeline.
#[derive(Clone)]
pub struct TwitterClient {
    http: Client,
    config: UpstreamConfig,
}

impl TwitterClient {
    pub fn new(config: UpstreamConfig) -> Result<Self, UpstreamError> {
        if config.bearer_token.is_none() {
            return Err(UpstreamError::Config(
                "TWITTER_BEARER_TOKEN is required".to_string(),
            ));
        }

        let http = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(concat!("tweet-reach/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        let request = self.http.get(url);
        match &self.config.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(request: RequestBuilder) -> Result<Response, UpstreamError> {
        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "failed to read error body".to_string());
        Err(UpstreamError::status(status, upstream_message(&body)))
    }
}

#[rocket::async_trait]
impl SocialApi for TwitterClient {
    async fn fetch_post(&self, id: PostId) -> Result<RawPayload, UpstreamError> {
        debug!("upstream: fetching post {}", id);
        let request = self
            .get("statuses/show.json")
            .query(&[("id", id.to_string()), ("include_entities", "true".into())]);

        let body = Self::send(request).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn fetch_resharer_ids(
        &self,
        id: PostId,
        page_size: usize,
    ) -> Result<Vec<UserId>, UpstreamError> {
        let count = page_size.clamp(1, MAX_PAGE_SIZE);
        debug!("upstream: fetching up to {} resharer ids for post {}", count, id);
        let request = self.get("statuses/retweeters/ids.json").query(&[
            ("id", id.to_string()),
            ("count", count.to_string()),
            ("stringify_ids", "true".into()),
        ]);

        let body = Self::send(request).await?.bytes().await?;
        let page: ResharerIdsPage = serde_json::from_slice(&body)?;
        page.ids.into_iter().map(UpstreamId::into_id).collect()
    }

    async fn fetch_users_batch(&self, ids: &[UserId]) -> Result<Vec<RawPayload>, UpstreamError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        debug!("upstream: looking up {} users", ids.len());
        let joined = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let request = self
            .get("users/lookup.json")
            .query(&[("user_id", joined), ("include_entities", "false".into())]);

        let body = Self::send(request).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[derive(Debug, Deserialize)]
struct ResharerIdsPage {
    #[serde(default)]
    ids: Vec<UpstreamId>,
}

/// Ids arrive as strings when `stringify_ids` is honoured, as numbers otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UpstreamId {
    Number(u64),
    Text(String),
}

impl UpstreamId {
    fn into_id(self) -> Result<UserId, UpstreamError> {
        match self {
            UpstreamId::Number(id) => Ok(id),
            UpstreamId::Text(text) => text.parse().map_err(|_| UpstreamError::MalformedId(text)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    message: String,
}

/// Extract the upstream error message, falling back to the raw body.
fn upstream_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if !parsed.errors.is_empty() => parsed
            .errors
            .into_iter()
            .map(|entry| entry.message)
            .collect::<Vec<_>>()
            .join("; "),
        _ => body.to_string(),
    }
}
