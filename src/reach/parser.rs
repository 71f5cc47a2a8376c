//! Post URL validation and id extraction.

use crate::models::PostId;
use reqwest::Url;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("The Tweet URL does not contain a valid status ID.")]
pub struct InvalidPostId;

/// True iff `url` is an absolute URL with a host.
pub fn is_valid_url(url: &str) -> bool {
    Url::parse(url.trim())
        .map(|parsed| parsed.has_host())
        .unwrap_or(false)
}

/// Extract the numeric post id from the last path segment of `url`.
///
/// Query strings and fragments trailing the segment are ignored. Returns
/// `None` when the segment is empty, contains anything but ASCII digits, or
/// does not fit in a `u64`.
pub fn extract_post_id(url: &str) -> Option<PostId> {
    let path = url.trim().split(['?', '#']).next().unwrap_or_default();
    let segment = path.rsplit('/').next()?;

    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    segment.parse().ok()
}

/// Fail-fast variant of [`extract_post_id`].
pub fn require_post_id(url: &str) -> Result<PostId, InvalidPostId> {
    extract_post_id(url).ok_or(InvalidPostId)
}
