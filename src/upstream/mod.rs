//! Boundary to the third-party social API.
//!
//! The reach pipeline only needs three logical operations, captured by the
//! [`SocialApi`] trait. [`TwitterClient`] implements them over HTTP; tests
//! substitute an in-memory implementation.

pub mod client;
pub mod config;
pub mod error;

pub use client::TwitterClient;
pub use config::{MAX_PAGE_SIZE, UpstreamConfig};
pub use error::UpstreamError;

use crate::models::{PostId, UserId};
use serde_json::Value;

/// Raw, not yet mapped, upstream payload.
pub type RawPayload = Value;

#[rocket::async_trait]
pub trait SocialApi: Send + Sync {
    /// Fetch a single post.
    async fn fetch_post(&self, id: PostId) -> Result<RawPayload, UpstreamError>;

    /// Fetch the ids of accounts that reshared `id`.
    ///
    /// Only the first page is requested; `page_size` is capped at
    /// [`MAX_PAGE_SIZE`] by the upstream API.
    async fn fetch_resharer_ids(
        &self,
        id: PostId,
        page_size: usize,
    ) -> Result<Vec<UserId>, UpstreamError>;

    /// Look up full user records for up to [`MAX_PAGE_SIZE`] ids in one call.
    async fn fetch_users_batch(&self, ids: &[UserId]) -> Result<Vec<RawPayload>, UpstreamError>;
}
