#[macro_use]
extern crate rocket;

pub mod config;
pub mod error;
pub mod mapping;
pub mod models;
pub mod reach;
pub mod request_logger;
pub mod routes;
pub mod upstream;

use crate::config::ReachConfig;
use crate::reach::Importer;
use crate::request_logger::RequestLogger;
use crate::upstream::{TwitterClient, UpstreamConfig};
use env_logger::Env;
use rocket::fairing::AdHoc;
use rocket::http::Method;
use rocket::{Build, Rocket};
use rocket_cors::{AllowedOrigins, CorsOptions};
use rocket_okapi::{
    openapi_get_routes,
    rapidoc::{GeneralConfig, HideShowConfig, RapiDocConfig, make_rapidoc},
    settings::UrlObject,
    swagger_ui::{SwaggerUIConfig, make_swagger_ui},
};
use std::sync::{Arc, Once};

static LOGGER: Once = Once::new();

pub fn init_logger() {
    LOGGER.call_once(|| {
        env_logger::Builder::from_env(
            Env::default().default_filter_or("info,rocket::server=warn,rocket::request=warn"),
        )
        .init();
    });
}

/// Production server: the importer talks to the real upstream API configured
/// through the environment.
pub fn rocket() -> Rocket<Build> {
    init_logger();

    base_rocket(rocket::build()).attach(AdHoc::try_on_ignite(
        "Reach Importer",
        |rocket| async move {
            let upstream_config = UpstreamConfig::from_env();
            log::info!("upstream API base url: {}", upstream_config.base_url);

            match TwitterClient::new(upstream_config) {
                Ok(client) => {
                    let reach_config = ReachConfig::from_env();
                    log::info!(
                        "reach cache ttl {}s, resharer page size {}",
                        reach_config.cache_ttl.as_secs(),
                        reach_config.page_size
                    );
                    Ok(rocket.manage(Importer::new(Arc::new(client), reach_config)))
                }
                Err(err) => {
                    log::error!("failed to initialize upstream client: {}", err);
                    Err(rocket)
                }
            }
        },
    ))
}

/// Same routes and fairings as [`rocket`], backed by a caller-provided importer.
pub fn rocket_with_importer(importer: Importer) -> Rocket<Build> {
    init_logger();

    base_rocket(rocket::build()).manage(importer)
}

fn base_rocket(rocket: Rocket<Build>) -> Rocket<Build> {
    // Configure CORS
    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::all())
        .allowed_methods(
            vec![Method::Get, Method::Options]
                .into_iter()
                .map(From::from)
                .collect(),
        )
        .allow_credentials(true)
        .to_cors()
        .expect("Error creating CORS");

    rocket
        .attach(RequestLogger)
        .attach(cors)
        .mount(
            "/api/v1",
            openapi_get_routes![
                // Health routes
                routes::health::health_check,
                // Reach routes
                routes::reach::compute_reach,
            ],
        )
        .mount(
            "/api/docs/swagger/",
            make_swagger_ui(&SwaggerUIConfig {
                url: "../../v1/openapi.json".to_owned(),
                ..Default::default()
            }),
        )
        .mount(
            "/api/docs/rapidoc/",
            make_rapidoc(&RapiDocConfig {
                general: GeneralConfig {
                    spec_urls: vec![UrlObject::new("Tweet Reach API", "../../v1/openapi.json")],
                    ..Default::default()
                },
                hide_show: HideShowConfig {
                    allow_spec_url_load: false,
                    allow_spec_file_load: false,
                    ..Default::default()
                },
                ..Default::default()
            }),
        )
}

#[cfg_attr(not(test), allow(dead_code))]
pub mod test_support {
    use crate::config::ReachConfig;
    use crate::models::{PostId, UserId};
    use crate::reach::Importer;
    use crate::upstream::{RawPayload, SocialApi, UpstreamError};
    use parking_lot::Mutex;
    use reqwest::StatusCode;
    use rocket::config::LogLevel;
    use rocket::figment::Figment;
    use rocket::local::asynchronous::Client as AsyncClient;
    use rocket::local::blocking::Client;
    use rocket::{Build, Rocket, Route};
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory [`SocialApi`] that serves canned payloads and records calls.
    #[derive(Default)]
    pub struct MockSocialApi {
        posts: HashMap<PostId, RawPayload>,
        resharers: HashMap<PostId, Vec<UserId>>,
        users: HashMap<UserId, RawPayload>,
        failing: bool,
        failing_user_lookups: bool,
        post_calls: AtomicUsize,
        resharer_calls: AtomicUsize,
        user_batches: Mutex<Vec<Vec<UserId>>>,
    }

    impl MockSocialApi {
        pub fn new() -> Self {
            Self::default()
        }

        /// Register a post payload with the given repost counter.
        pub fn with_post(mut self, id: PostId, retweet_count: u64) -> Self {
            self.posts.insert(
                id,
                json!({
                    "id": id,
                    "text": format!("post {id}"),
                    "source": "web",
                    "lang": "en",
                    "retweet_count": retweet_count,
                    "created_at": "Wed Oct 10 20:19:24 +0000 2018",
                    "user": {
                        "id": 1,
                        "name": "Author",
                        "screen_name": "author",
                        "followers_count": 1000
                    }
                }),
            );
            self
        }

        /// Register a raw post payload as-is.
        pub fn with_post_payload(mut self, id: PostId, payload: Value) -> Self {
            self.posts.insert(id, payload);
            self
        }

        pub fn with_resharers(mut self, id: PostId, ids: Vec<UserId>) -> Self {
            self.resharers.insert(id, ids);
            self
        }

        /// Register a user with the given follower count.
        pub fn with_user(mut self, id: UserId, followers_count: u64) -> Self {
            self.users.insert(
                id,
                json!({
                    "id": id,
                    "name": format!("User {id}"),
                    "screen_name": format!("user{id}"),
                    "followers_count": followers_count
                }),
            );
            self
        }

        /// Register a raw user payload as-is.
        pub fn with_user_payload(mut self, id: UserId, payload: Value) -> Self {
            self.users.insert(id, payload);
            self
        }

        /// Only user lookups fail with a `503` upstream error.
        pub fn failing_user_lookups(mut self) -> Self {
            self.failing_user_lookups = true;
            self
        }

        /// Every call fails with a `503` upstream error.
        pub fn failing(mut self) -> Self {
            self.failing = true;
            self
        }

        pub fn post_calls(&self) -> usize {
            self.post_calls.load(Ordering::SeqCst)
        }

        pub fn resharer_calls(&self) -> usize {
            self.resharer_calls.load(Ordering::SeqCst)
        }

        pub fn user_calls(&self) -> usize {
            self.user_batches.lock().len()
        }

        /// Id batches passed to [`SocialApi::fetch_users_batch`], in call order.
        pub fn user_batches(&self) -> Vec<Vec<UserId>> {
            self.user_batches.lock().clone()
        }

        pub fn total_calls(&self) -> usize {
            self.post_calls() + self.resharer_calls() + self.user_calls()
        }

        fn check_failing(&self) -> Result<(), UpstreamError> {
            if self.failing {
                return Err(UpstreamError::status(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Over capacity".to_string(),
                ));
            }
            Ok(())
        }
    }

    #[rocket::async_trait]
    impl SocialApi for MockSocialApi {
        async fn fetch_post(&self, id: PostId) -> Result<RawPayload, UpstreamError> {
            self.post_calls.fetch_add(1, Ordering::SeqCst);
            self.check_failing()?;
            self.posts.get(&id).cloned().ok_or_else(|| {
                UpstreamError::status(
                    StatusCode::NOT_FOUND,
                    "No status found with that ID.".to_string(),
                )
            })
        }

        async fn fetch_resharer_ids(
            &self,
            id: PostId,
            page_size: usize,
        ) -> Result<Vec<UserId>, UpstreamError> {
            self.resharer_calls.fetch_add(1, Ordering::SeqCst);
            self.check_failing()?;
            Ok(self
                .resharers
                .get(&id)
                .map(|ids| ids.iter().copied().take(page_size).collect())
                .unwrap_or_default())
        }

        async fn fetch_users_batch(
            &self,
            ids: &[UserId],
        ) -> Result<Vec<RawPayload>, UpstreamError> {
            self.user_batches.lock().push(ids.to_vec());
            self.check_failing()?;
            if self.failing_user_lookups {
                return Err(UpstreamError::status(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Over capacity".to_string(),
                ));
            }
            Ok(ids
                .iter()
                .filter_map(|id| self.users.get(id).cloned())
                .collect())
        }
    }

    /// Builder for constructing Rocket instances tailored for integration tests.
    #[derive(Default)]
    pub struct TestRocketBuilder {
        figment: Figment,
        mounts: Vec<(String, Vec<Route>)>,
        importer: Option<Importer>,
    }

    impl TestRocketBuilder {
        /// Start a builder with sensible defaults: random port, logging disabled.
        pub fn new() -> Self {
            let figment = rocket::Config::figment()
                .merge(("port", 0))
                .merge(("log_level", LogLevel::Off))
                .merge(("cli_colors", false));

            Self {
                figment,
                mounts: Vec::new(),
                importer: None,
            }
        }

        /// Mount routes under `/api/v1`.
        pub fn mount_api_routes(mut self, routes: Vec<Route>) -> Self {
            self.mounts.push(("/api/v1".to_string(), routes));
            self
        }

        /// Manage an [`Importer`] backed by `api` with default reach settings.
        pub fn manage_importer(mut self, api: Arc<dyn SocialApi>) -> Self {
            self.importer = Some(Importer::new(api, ReachConfig::default()));
            self
        }

        /// Finish building the Rocket instance.
        pub fn build(self) -> Rocket<Build> {
            let mut rocket = rocket::custom(self.figment);

            for (base, routes) in self.mounts {
                rocket = rocket.mount(base, routes);
            }

            if let Some(importer) = self.importer {
                rocket = rocket.manage(importer);
            }

            rocket
        }

        /// Convenience helper to produce a blocking local client.
        pub fn blocking_client(self) -> Client {
            Client::tracked(self.build()).expect("valid Rocket instance")
        }

        /// Convenience helper to produce an asynchronous local client.
        pub async fn async_client(self) -> AsyncClient {
            AsyncClient::tracked(self.build())
                .await
                .expect("valid Rocket instance")
        }
    }
}
