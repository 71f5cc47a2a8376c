//! Lightweight service health endpoint used for readiness checks and tests.

use crate::reach::Importer;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::okapi::schemars::JsonSchema;
use rocket_okapi::openapi;
use serde::{Deserialize, Serialize};

/// Basic response payload describing API health.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Static status string reporting application readiness.
    pub status: String,
    /// Number of unexpired reach results currently memoized.
    pub cached_results: usize,
}

/// Health check endpoint; drops expired cache slots and reports how many remain.
#[openapi(tag = "Health")]
#[get("/health")]
pub fn health_check(importer: &State<Importer>) -> Json<HealthResponse> {
    importer.cache().purge_expired();

    Json(HealthResponse {
        status: "ok".to_string(),
        cached_results: importer.cache().stats().live_entries,
    })
}
