use chrono::{DateTime, Utc};
use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type PostId = u64;
pub type UserId = u64;

// ===== Upstream Entities =====

/// A single post ("Tweet") as hydrated from the upstream API.
///
/// Built once from a mapped payload (see [`crate::mapping::POST_MAPPING`]) and
/// never mutated afterwards. Counters missing from upstream data default to 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Post {
    pub id: PostId,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub retweeted: bool,
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub favorited: bool,
    #[serde(default)]
    pub possibly_sensitive: bool,
    #[serde(default)]
    pub possibly_sensitive_appealable: bool,
    #[serde(default)]
    pub is_quote_status: bool,
    #[serde(default)]
    pub entities: Value,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// An account on the upstream platform, either a post author or a resharer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub screen_name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub friends_count: u64,
    #[serde(default)]
    pub listed_count: u64,
    #[serde(default)]
    pub favourites_count: u64,
    #[serde(default)]
    pub statuses_count: u64,
    #[serde(default)]
    pub time_zone: Option<String>,
    #[serde(default)]
    pub geo_enabled: bool,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub profile_image_url_https: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// ===== API Responses =====

/// JSON payload returned by the reach endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReachResponse {
    /// Sum of follower counts over all resharers.
    pub reach: u64,
    /// Compact magnitude of `reach`, e.g. `2.2K`.
    pub humanized_reach: String,
    /// One-sentence summary of the reach.
    pub reach_description: String,
    /// Whether the post was reshared at least once.
    pub has_retweets: bool,
    /// Number of resharers aggregated into `reach`.
    pub retweeters_count: u64,
    /// The post the reach was computed for.
    pub tweet: Option<Post>,
}

/// Error payload shared by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ErrorResponse {
    pub error: String,
}
