//! Reach endpoint consumed by the front-end wizard.

use crate::error::ApiError;
use crate::models::ReachResponse;
use crate::reach::Importer;
use rocket::request::{FromRequest, Outcome, Request};
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;
use rocket_okapi::request::OpenApiFromRequest;
use std::convert::Infallible;

/// Header value browsers send with `XMLHttpRequest`-style calls.
const XML_HTTP_REQUEST: &str = "XMLHttpRequest";

/// Records whether the request carried `X-Requested-With: XMLHttpRequest`.
#[derive(Debug, Clone, Copy, OpenApiFromRequest)]
pub struct XmlHttpRequest(bool);

impl XmlHttpRequest {
    pub fn is_xhr(&self) -> bool {
        self.0
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for XmlHttpRequest {
    type Error = Infallible;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let is_xhr = request
            .headers()
            .get_one("X-Requested-With")
            .is_some_and(|value| value.eq_ignore_ascii_case(XML_HTTP_REQUEST));
        Outcome::Success(XmlHttpRequest(is_xhr))
    }
}

/// Compute the reach of the post linked by `tweet`.
///
/// Only answers XMLHttpRequest-style calls. Invalid URLs and ids are reported
/// as `400`; upstream failures as `500`.
#[openapi(tag = "Reach")]
#[get("/reach?<tweet>")]
pub async fn compute_reach(
    tweet: Option<String>,
    xhr: XmlHttpRequest,
    importer: &State<Importer>,
) -> Result<Json<ReachResponse>, ApiError> {
    log::debug!("reach request data: tweet={:?} xhr={}", tweet, xhr.is_xhr());

    if !xhr.is_xhr() {
        return Err(ApiError::BadRequest("Invalid request".to_string()));
    }

    let tweet_url = tweet
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Query parameter 'tweet' is required".to_string()))?;

    let result = importer.compute_reach(&tweet_url).await?;

    match result.status().rejection_message() {
        Some(message) => Err(ApiError::BadRequest(message.to_string())),
        None => Ok(Json(result.to_response())),
    }
}
