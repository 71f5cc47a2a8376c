use crate::config::{env_duration_millis, env_string};
use std::time::Duration;

/// Hard cap the upstream API puts on resharer ids and user lookups per call.
pub const MAX_PAGE_SIZE: usize = 100;

/// Configuration for the upstream API client.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub bearer_token: Option<String>,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl UpstreamConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: env_string("TWITTER_API_BASE_URL", "https://api.twitter.com/1.1"),
            bearer_token: std::env::var("TWITTER_BEARER_TOKEN")
                .ok()
                .filter(|token| !token.trim().is_empty()),
            request_timeout: env_duration_millis("TWITTER_TIMEOUT_MS", 15_000),
            connect_timeout: env_duration_millis("TWITTER_CONNECT_TIMEOUT_MS", 5_000),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
