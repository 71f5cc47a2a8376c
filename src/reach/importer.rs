use super::cache::ReachCache;
use super::parser::{extract_post_id, is_valid_url};
use super::progress::{NoProgress, ReachProgress};
use super::{ReachError, ReachResult};
use crate::config::ReachConfig;
use crate::mapping::Transform;
use crate::models::{Post, PostId, User, UserId};
use crate::upstream::{MAX_PAGE_SIZE, RawPayload, SocialApi};
use std::sync::Arc;

/// Upper bound on ids sent in a single user lookup.
pub const USER_LOOKUP_LIMIT: usize = MAX_PAGE_SIZE;

/// Drives the reach pipeline: parse, fetch, aggregate, memoize.
pub struct Importer {
    api: Arc<dyn SocialApi>,
    cache: ReachCache,
    page_size: usize,
}

impl Importer {
    pub fn new(api: Arc<dyn SocialApi>, config: ReachConfig) -> Self {
        Self {
            api,
            cache: ReachCache::new(config.cache_prefix, config.cache_ttl),
            page_size: config.page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn cache(&self) -> &ReachCache {
        &self.cache
    }

    /// Compute the reach of the post behind `tweet_url`.
    ///
    /// Results, including invalid-input and no-repost outcomes, are memoized
    /// per URL for the configured TTL.
    pub async fn compute_reach(&self, tweet_url: &str) -> Result<Arc<ReachResult>, ReachError> {
        self.compute_reach_with_progress(tweet_url, &NoProgress)
            .await
    }

    /// Same as [`Importer::compute_reach`], reporting resharer progress to `progress`.
    pub async fn compute_reach_with_progress(
        &self,
        tweet_url: &str,
        progress: &dyn ReachProgress,
    ) -> Result<Arc<ReachResult>, ReachError> {
        self.cache
            .get_or_compute(tweet_url, || {
                self.compute_reach_results(tweet_url, progress)
            })
            .await
    }

    async fn compute_reach_results(
        &self,
        tweet_url: &str,
        progress: &dyn ReachProgress,
    ) -> Result<ReachResult, ReachError> {
        let url_valid = is_valid_url(tweet_url);
        let tweet_id = if url_valid {
            extract_post_id(tweet_url)
        } else {
            None
        };

        let mut result = ReachResult::new(tweet_url)
            .with_url_validity(url_valid)
            .with_tweet_id(tweet_id);

        let Some(tweet_id) = tweet_id else {
            log::info!("no post id in '{}' ({:?})", tweet_url, result.status());
            return Ok(result);
        };

        result.set_post(self.fetch_post(tweet_id).await?);

        // Resharer lookups cost two upstream calls; skip them for posts nobody reshared.
        if !result.has_reposts() {
            log::info!("post {} has no reposts", tweet_id);
            return Ok(result);
        }

        self.add_resharers_to_result(&mut result, progress).await?;

        log::info!(
            "post {} reached {} accounts through {} resharers",
            tweet_id,
            result.reach(),
            result.retweeters_count()
        );

        Ok(result)
    }

    /// Fetch and map a single post.
    pub async fn fetch_post(&self, id: PostId) -> Result<Post, ReachError> {
        let raw = self.api.fetch_post(id).await?;
        Ok(Post::from_raw(&raw)?)
    }

    /// Fetch the resharers of the post on `result` and fold them into its reach.
    ///
    /// Only the first page of resharer ids is requested. Resharers whose
    /// payload cannot be mapped are logged and skipped.
    pub async fn add_resharers_to_result(
        &self,
        result: &mut ReachResult,
        progress: &dyn ReachProgress,
    ) -> Result<(), ReachError> {
        let Some(tweet_id) = result.tweet_id() else {
            return Ok(());
        };

        let resharer_ids = self
            .api
            .fetch_resharer_ids(tweet_id, self.page_size)
            .await?;
        log::debug!(
            "post {} returned {} resharer ids",
            tweet_id,
            resharer_ids.len()
        );

        progress.on_start(resharer_ids.len() as u64 + 1);
        progress.on_message("Fetching retweeters…");

        let users_data = match self.lookup_users(&resharer_ids).await {
            Ok(users_data) => users_data,
            Err(err) => {
                progress.on_finish();
                return Err(err);
            }
        };

        progress.on_message("Fetching user data…");
        progress.on_advance();

        for user_data in &users_data {
            match User::from_raw(user_data) {
                Ok(user) => {
                    result.add_resharer(user);
                }
                Err(err) => log::warn!("skipping unmappable resharer of post {}: {}", tweet_id, err),
            }
            progress.on_advance();
        }

        progress.on_finish();
        Ok(())
    }

    /// Look up `ids` in batches of at most [`USER_LOOKUP_LIMIT`].
    async fn lookup_users(&self, ids: &[UserId]) -> Result<Vec<RawPayload>, ReachError> {
        let mut users_data = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(USER_LOOKUP_LIMIT) {
            users_data.extend(self.api.fetch_users_batch(chunk).await?);
        }
        Ok(users_data)
    }
}
