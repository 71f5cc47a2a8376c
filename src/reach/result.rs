use super::humanize::metric_suffix;
use crate::models::{Post, PostId, ReachResponse, User};
use serde::{Deserialize, Serialize};

/// Terminal state of one reach computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReachStatus {
    /// The input was not an absolute URL.
    InvalidUrl,
    /// No numeric post id could be extracted from the URL.
    InvalidId,
    /// The post exists but was never reshared.
    NoReposts,
    /// Resharers were fetched and aggregated.
    Done,
}

impl ReachStatus {
    /// User-facing explanation for statuses that end the computation early.
    pub fn rejection_message(&self) -> Option<&'static str> {
        match self {
            ReachStatus::InvalidUrl => Some("The Tweet URL is not valid."),
            ReachStatus::InvalidId => Some("The Tweet ID could not be extracted from the URL."),
            ReachStatus::NoReposts | ReachStatus::Done => None,
        }
    }
}

/// Aggregate produced by the reach pipeline.
///
/// Built empty, filled by the importer through [`ReachResult::set_post`] and
/// [`ReachResult::add_resharer`], then shared read-only. The running counters
/// are updated on every insert so the aggregate can be observed while
/// resharers are still streaming in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReachResult {
    tweet_url: String,
    url_valid: bool,
    tweet_id: Option<PostId>,
    tweet: Option<Post>,
    retweeters: Vec<User>,
    retweeters_count: u64,
    reach: u64,
}

impl ReachResult {
    pub fn new(tweet_url: impl Into<String>) -> Self {
        Self {
            tweet_url: tweet_url.into(),
            ..Self::default()
        }
    }

    pub fn with_url_validity(mut self, valid: bool) -> Self {
        self.url_valid = valid;
        self
    }

    /// Optional id; leaving it unset marks the result as [`ReachStatus::InvalidId`].
    pub fn with_tweet_id(mut self, id: Option<PostId>) -> Self {
        self.tweet_id = id;
        self
    }

    pub fn set_post(&mut self, post: Post) -> &mut Self {
        self.tweet = Some(post);
        self
    }

    /// Append a resharer and fold its followers into the running reach.
    pub fn add_resharer(&mut self, user: User) -> &mut Self {
        self.retweeters_count += 1;
        self.reach = self.reach.saturating_add(user.followers_count);
        self.retweeters.push(user);
        self
    }

    pub fn tweet_url(&self) -> &str {
        &self.tweet_url
    }

    pub fn tweet_id(&self) -> Option<PostId> {
        self.tweet_id
    }

    pub fn tweet(&self) -> Option<&Post> {
        self.tweet.as_ref()
    }

    /// Author of the original post, when upstream included one.
    pub fn author(&self) -> Option<&User> {
        self.tweet.as_ref().and_then(|post| post.user.as_ref())
    }

    pub fn retweeters(&self) -> &[User] {
        &self.retweeters
    }

    pub fn retweeters_count(&self) -> u64 {
        self.retweeters_count
    }

    pub fn reach(&self) -> u64 {
        self.reach
    }

    pub fn url_is_valid(&self) -> bool {
        self.url_valid
    }

    pub fn id_is_valid(&self) -> bool {
        self.tweet_id.is_some()
    }

    pub fn has_reposts(&self) -> bool {
        self.tweet
            .as_ref()
            .is_some_and(|post| post.retweet_count > 0)
    }

    pub fn status(&self) -> ReachStatus {
        if !self.url_valid {
            ReachStatus::InvalidUrl
        } else if !self.id_is_valid() {
            ReachStatus::InvalidId
        } else if !self.has_reposts() {
            ReachStatus::NoReposts
        } else {
            ReachStatus::Done
        }
    }

    /// Compact magnitude of the reach, e.g. `2.2K`.
    pub fn humanized_reach(&self) -> String {
        metric_suffix(self.reach)
    }

    pub fn reach_description(&self) -> String {
        format!(
            "The Tweet had a reach of {} ({}).",
            self.humanized_reach(),
            self.reach
        )
    }

    pub fn to_response(&self) -> ReachResponse {
        ReachResponse {
            reach: self.reach,
            humanized_reach: self.humanized_reach(),
            reach_description: self.reach_description(),
            has_retweets: self.has_reposts(),
            retweeters_count: self.retweeters_count,
            tweet: self.tweet.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn user(id: u64, followers: u64) -> User {
        User {
            id,
            name: format!("user {id}"),
            screen_name: format!("user{id}"),
            location: None,
            description: None,
            url: None,
            followers_count: followers,
            friends_count: 0,
            listed_count: 0,
            favourites_count: 0,
            statuses_count: 0,
            time_zone: None,
            geo_enabled: false,
            verified: false,
            lang: None,
            profile_image_url_https: None,
            created_at: None,
        }
    }

    fn post(retweet_count: u64, author: Option<User>) -> Post {
        Post {
            id: 123,
            text: "hello".to_string(),
            source: "web".to_string(),
            lang: Some("en".to_string()),
            retweeted: false,
            retweet_count,
            favorited: false,
            possibly_sensitive: false,
            possibly_sensitive_appealable: false,
            is_quote_status: false,
            entities: Value::Null,
            user: author,
            created_at: None,
        }
    }

    #[test]
    fn new_result_is_empty() {
        let result = ReachResult::new("https://x.example/user/status/1");

        assert!(result.retweeters().is_empty());
        assert_eq!(result.retweeters_count(), 0);
        assert_eq!(result.reach(), 0);
        assert_eq!(result.humanized_reach(), "0");
        assert_eq!(result.status(), ReachStatus::InvalidUrl);
    }

    #[test]
    fn add_resharer_keeps_counters_in_step() {
        let mut result = ReachResult::new("u").with_url_validity(true);
        let followers = [5u64, 7, 0, 1_000, 3];
        let mut expected_reach = 0;

        for (idx, count) in followers.iter().enumerate() {
            result.add_resharer(user(idx as u64, *count));
            expected_reach += count;

            assert_eq!(result.reach(), expected_reach);
            assert_eq!(result.retweeters_count(), idx as u64 + 1);
            assert_eq!(result.retweeters().len(), idx + 1);
            assert_eq!(
                result.reach(),
                result.retweeters().iter().map(|u| u.followers_count).sum::<u64>()
            );
        }

        assert_eq!(result.retweeters()[1].id, 1);
    }

    #[test]
    fn reach_saturates_instead_of_overflowing() {
        let mut result = ReachResult::new("u");
        result.add_resharer(user(1, u64::MAX));
        result.add_resharer(user(2, 10));

        assert_eq!(result.reach(), u64::MAX);
        assert_eq!(result.retweeters_count(), 2);
    }

    #[test]
    fn status_follows_the_pipeline_outcome() {
        let invalid_id = ReachResult::new("u").with_url_validity(true);
        assert_eq!(invalid_id.status(), ReachStatus::InvalidId);

        let mut no_reposts = invalid_id.clone().with_tweet_id(Some(123));
        no_reposts.set_post(post(0, None));
        assert!(!no_reposts.has_reposts());
        assert_eq!(no_reposts.status(), ReachStatus::NoReposts);

        let mut done = ReachResult::new("u")
            .with_url_validity(true)
            .with_tweet_id(Some(123));
        done.set_post(post(2, None));
        assert!(done.has_reposts());
        assert_eq!(done.status(), ReachStatus::Done);
    }

    #[test]
    fn rejected_statuses_carry_a_message() {
        assert_eq!(
            ReachStatus::InvalidUrl.rejection_message(),
            Some("The Tweet URL is not valid.")
        );
        assert_eq!(
            ReachStatus::InvalidId.rejection_message(),
            Some("The Tweet ID could not be extracted from the URL.")
        );
        assert_eq!(ReachStatus::NoReposts.rejection_message(), None);
        assert_eq!(ReachStatus::Done.rejection_message(), None);
    }

    #[test]
    fn author_comes_from_the_post() {
        let mut result = ReachResult::new("u");
        assert!(result.author().is_none());

        result.set_post(post(1, Some(user(42, 10))));
        assert_eq!(result.author().map(|u| u.id), Some(42));
    }

    #[test]
    fn description_and_response_use_running_totals() {
        let mut result = ReachResult::new("u")
            .with_url_validity(true)
            .with_tweet_id(Some(123));
        result.set_post(post(2, None));
        result.add_resharer(user(1, 2_000));
        result.add_resharer(user(2, 153));

        assert_eq!(
            result.reach_description(),
            "The Tweet had a reach of 2.2K (2153)."
        );

        let response = result.to_response();
        assert_eq!(response.reach, 2_153);
        assert_eq!(response.humanized_reach, "2.2K");
        assert!(response.has_retweets);
        assert_eq!(response.retweeters_count, 2);
        assert_eq!(response.tweet.map(|t| t.id), Some(123));
    }
}
