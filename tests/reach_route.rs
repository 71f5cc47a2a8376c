use std::sync::Arc;

use rocket::http::{Header, Status};
use rocket::local::blocking::Client;
use rocket::routes;
use tweet_reach::models::{ErrorResponse, ReachResponse};
use tweet_reach::routes::reach::compute_reach;
use tweet_reach::test_support::{MockSocialApi, TestRocketBuilder};

fn xhr() -> Header<'static> {
    Header::new("X-Requested-With", "XMLHttpRequest")
}

fn client_for(api: Arc<MockSocialApi>) -> Client {
    TestRocketBuilder::new()
        .manage_importer(api)
        .mount_api_routes(routes![compute_reach])
        .blocking_client()
}

fn scenario_api() -> MockSocialApi {
    MockSocialApi::new()
        .with_post(123, 2)
        .with_resharers(123, vec![10, 20])
        .with_user(10, 5)
        .with_user(20, 7)
}

#[test]
fn rejects_requests_without_xhr_header() {
    let api = Arc::new(scenario_api());
    let client = client_for(api.clone());

    let response = client
        .get("/api/v1/reach?tweet=https://twitter.com/a/status/123")
        .dispatch();
    assert_eq!(response.status(), Status::BadRequest);

    let payload: ErrorResponse = response.into_json().expect("error payload");
    assert_eq!(payload.error, "Invalid request");
    assert_eq!(api.total_calls(), 0);
}

#[test]
fn rejects_missing_tweet_parameter() {
    let api = Arc::new(scenario_api());
    let client = client_for(api.clone());

    let response = client.get("/api/v1/reach").header(xhr()).dispatch();
    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(api.total_calls(), 0);
}

#[test]
fn computes_reach_of_reshared_post() {
    let api = Arc::new(scenario_api());
    let client = client_for(api.clone());

    let response = client
        .get("/api/v1/reach?tweet=https://x.example/user/status/123")
        .header(xhr())
        .dispatch();
    assert_eq!(response.status(), Status::Ok);

    let payload: ReachResponse = response.into_json().expect("reach payload");
    assert_eq!(payload.reach, 12);
    assert_eq!(payload.retweeters_count, 2);
    assert!(payload.has_retweets);
    assert_eq!(payload.humanized_reach, "12");
    assert_eq!(payload.reach_description, "The Tweet had a reach of 12 (12).");

    let tweet = payload.tweet.expect("post included");
    assert_eq!(tweet.id, 123);
    assert_eq!(tweet.retweet_count, 2);

    assert_eq!(api.post_calls(), 1);
    assert_eq!(api.resharer_calls(), 1);
    assert_eq!(api.user_batches(), vec![vec![10, 20]]);
}

#[test]
fn response_uses_camel_case_keys() {
    let client = client_for(Arc::new(scenario_api()));

    let body = client
        .get("/api/v1/reach?tweet=https://twitter.com/a/status/123")
        .header(xhr())
        .dispatch()
        .into_string()
        .expect("response body");
    let json: serde_json::Value = serde_json::from_str(&body).expect("json body");

    for key in [
        "reach",
        "humanizedReach",
        "reachDescription",
        "hasRetweets",
        "retweetersCount",
        "tweet",
    ] {
        assert!(json.get(key).is_some(), "missing key {key}");
    }
}

#[test]
fn post_without_reposts_is_not_an_error() {
    let api = Arc::new(MockSocialApi::new().with_post(20, 0));
    let client = client_for(api.clone());

    let response = client
        .get("/api/v1/reach?tweet=https://twitter.com/jack/status/20")
        .header(xhr())
        .dispatch();
    assert_eq!(response.status(), Status::Ok);

    let payload: ReachResponse = response.into_json().expect("reach payload");
    assert!(!payload.has_retweets);
    assert_eq!(payload.reach, 0);
    assert_eq!(payload.retweeters_count, 0);
    assert_eq!(api.resharer_calls(), 0);
    assert_eq!(api.user_calls(), 0);
}

#[test]
fn invalid_post_id_is_a_bad_request() {
    let api = Arc::new(scenario_api());
    let client = client_for(api.clone());

    let response = client
        .get("/api/v1/reach?tweet=https://twitter.com/a/status/abc")
        .header(xhr())
        .dispatch();
    assert_eq!(response.status(), Status::BadRequest);

    let payload: ErrorResponse = response.into_json().expect("error payload");
    assert_eq!(
        payload.error,
        "The Tweet ID could not be extracted from the URL."
    );
    assert_eq!(api.total_calls(), 0);
}

#[test]
fn invalid_url_is_a_bad_request() {
    let api = Arc::new(scenario_api());
    let client = client_for(api.clone());

    let response = client
        .get("/api/v1/reach?tweet=not-a-url")
        .header(xhr())
        .dispatch();
    assert_eq!(response.status(), Status::BadRequest);

    let payload: ErrorResponse = response.into_json().expect("error payload");
    assert_eq!(payload.error, "The Tweet URL is not valid.");
    assert_eq!(api.total_calls(), 0);
}

#[test]
fn upstream_failure_is_an_internal_error() {
    let api = Arc::new(scenario_api().failing());
    let client = client_for(api.clone());

    let response = client
        .get("/api/v1/reach?tweet=https://twitter.com/a/status/123")
        .header(xhr())
        .dispatch();
    assert_eq!(response.status(), Status::InternalServerError);

    let payload: ErrorResponse = response.into_json().expect("error payload");
    assert!(payload.error.starts_with("Unable to compute reach"));
    assert_eq!(api.resharer_calls(), 0);
}

#[test]
fn repeated_requests_are_served_from_cache() {
    let api = Arc::new(scenario_api());
    let client = client_for(api.clone());

    for _ in 0..3 {
        let response = client
            .get("/api/v1/reach?tweet=https://twitter.com/a/status/123")
            .header(xhr())
            .dispatch();
        assert_eq!(response.status(), Status::Ok);
    }

    assert_eq!(api.post_calls(), 1);
    assert_eq!(api.resharer_calls(), 1);
    assert_eq!(api.user_calls(), 1);
}
