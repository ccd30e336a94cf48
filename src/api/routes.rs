use crate::api::api_error::APIError;
use crate::api::logging::{log_request, log_response};
use crate::api::response::{write_out, Envelope};
use crate::api::server::AppState;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, HeaderName, StatusCode};
use axum::middleware;
use axum::response::Response;
use axum::routing::any;
use axum::Router;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing::Level;

const REDACTED: &str = "[redacted]";
const SENSITIVE_HEADERS: [&str; 4] = [
    "authorization",
    "proxy-authorization",
    "cookie",
    "x-api-key",
];

pub(super) fn new(state: AppState) -> Router {
    Router::new()
        .route("/200", any(ok))
        .route("/403", any(nope))
        .route("/headers", any(headers))
        .route("/authz", any(authz))
        .fallback(not_found)
        .layer(middleware::from_fn(log_response))
        .layer(middleware::from_fn(log_request))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(())
                .on_response(())
                .on_failure(()),
        )
        .with_state(state)
}

#[allow(clippy::unused_async)]
async fn ok() -> Response {
    write_out(StatusCode::OK, &Envelope::new("OK"))
}

#[allow(clippy::unused_async)]
async fn nope() -> Response {
    write_out(StatusCode::FORBIDDEN, &Envelope::new("NOPE"))
}

#[allow(clippy::unused_async)]
async fn not_found() -> Response {
    write_out(StatusCode::NOT_FOUND, &Envelope::new("Not Found"))
}

#[allow(clippy::unused_async)]
async fn headers(headers: HeaderMap) -> Response {
    for (name, value) in &headers {
        let value = if is_sensitive(name) {
            REDACTED.into()
        } else {
            String::from_utf8_lossy(value.as_bytes())
        };
        tracing::info!(name = %name, value = %value, "header");
    }
    write_out(StatusCode::OK, &Envelope::new("OK"))
}

#[allow(clippy::unused_async)]
async fn authz(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, APIError> {
    let received = headers.get(AUTHORIZATION).map(|value| value.as_bytes());
    state.config.authz_header.validate(received)?;
    Ok(write_out(StatusCode::OK, &Envelope::new("OK")))
}

fn is_sensitive(name: &HeaderName) -> bool {
    SENSITIVE_HEADERS.contains(&name.as_str())
}
