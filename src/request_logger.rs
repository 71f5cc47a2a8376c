use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Data, Request, Response};
use std::time::Instant;

/// Request start time plus whether the caller identified as an XHR client.
struct RequestTiming {
    started: Instant,
    xhr: bool,
}

/// Fairing to log one line per HTTP request with timing
pub struct RequestLogger;

#[rocket::async_trait]
impl Fairing for RequestLogger {
    fn info(&self) -> Info {
        Info {
            name: "Request Logger",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _: &mut Data<'_>) {
        let xhr = request.headers().get_one("X-Requested-With").is_some();
        request.local_cache(|| RequestTiming {
            started: Instant::now(),
            xhr,
        });
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let timing = request.local_cache(|| RequestTiming {
            started: Instant::now(),
            xhr: false,
        });
        let duration = timing.started.elapsed();

        log::info!(
            "{} {}{} -> {} ({:.2}ms)",
            request.method(),
            request.uri(),
            if timing.xhr { " [xhr]" } else { "" },
            response.status().code,
            duration.as_secs_f64() * 1000.0
        );
    }
}
