use std::env;
use std::time::Duration;

pub(crate) fn env_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(default)
}

pub(crate) fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(default)
}

pub(crate) fn env_duration_millis(key: &str, default_millis: u64) -> Duration {
    Duration::from_millis(env_u64(key, default_millis))
}

pub(crate) fn env_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Default lifetime of a memoized reach result.
pub const DEFAULT_CACHE_TTL_MINUTES: u64 = 120;

/// Default namespace mixed into every cache key.
pub const DEFAULT_CACHE_PREFIX: &str = "tweet_reach::importer";

/// Runtime configuration for the reach pipeline.
#[derive(Debug, Clone)]
pub struct ReachConfig {
    pub cache_ttl: Duration,
    pub cache_prefix: String,
    pub page_size: usize,
}

impl ReachConfig {
    pub fn from_env() -> Self {
        let ttl_minutes = env_u64("REACH_CACHE_TTL_MINUTES", DEFAULT_CACHE_TTL_MINUTES);

        Self {
            cache_ttl: Duration::from_secs(ttl_minutes.saturating_mul(60)),
            cache_prefix: env_string("REACH_CACHE_PREFIX", DEFAULT_CACHE_PREFIX),
            page_size: env_usize("TWITTER_PAGE_SIZE", crate::upstream::MAX_PAGE_SIZE)
                .clamp(1, crate::upstream::MAX_PAGE_SIZE),
        }
    }
}

impl Default for ReachConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_MINUTES * 60),
            cache_prefix: DEFAULT_CACHE_PREFIX.to_string(),
            page_size: crate::upstream::MAX_PAGE_SIZE,
        }
    }
}
