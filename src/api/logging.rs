//! Request and response logging middleware.
//!
//! Two independent [`axum::middleware::from_fn`] stages. [`log_request`] runs before routing
//! and records who asked for what, [`log_response`] wraps the handler and records what was
//! sent back and how long it took.

use crate::api::response;
use axum::body::{boxed, Body, Bytes, Full};
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use std::net::SocketAddr;
use std::time::Instant;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// When the request stage saw the request. Durations logged by [`log_response`] start here.
#[derive(Clone, Copy, Debug)]
pub(super) struct RequestStart(pub Instant);

pub(super) async fn log_request(mut req: Request<Body>, next: Next<Body>) -> Response {
    req.extensions_mut().insert(RequestStart(Instant::now()));
    tracing::info!(
        method = %req.method(),
        uri = %req.uri(),
        client_ip = %client_ip(&req),
        "rcv"
    );
    next.run(req).await
}

pub(super) async fn log_response(req: Request<Body>, next: Next<Body>) -> Response {
    let start = req
        .extensions()
        .get::<RequestStart>()
        .map_or_else(Instant::now, |RequestStart(start)| *start);
    let (parts, body) = next.run(req).await.into_parts();

    match hyper::body::to_bytes(body).await {
        Ok(bytes) => {
            log_status(parts.status, &fmt_body(&bytes), start);
            Response::from_parts(parts, boxed(Full::from(bytes)))
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to write response");
            let res = response::write_failed();
            log_status(res.status(), "", start);
            res
        }
    }
}

fn log_status(status: StatusCode, body: &str, start: Instant) {
    let duration = start.elapsed();
    if status.as_u16() >= 400 {
        tracing::error!(status = status.as_u16(), body = %body, ?duration, "rsp");
    } else {
        tracing::info!(status = status.as_u16(), body = %body, ?duration, "rsp");
    }
}

/// The first `X-Forwarded-For` hop when a proxy supplied one, otherwise the peer address.
fn client_ip<B>(req: &Request<B>) -> String {
    let forwarded = req
        .headers()
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    match forwarded {
        Some(ip) => ip.to_string(),
        None => req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map_or_else(|| "unknown".to_string(), |ConnectInfo(addr)| addr.to_string()),
    }
}

/// A single line rendering of a response body: JSON compacted, anything else lossily decoded.
fn fmt_body(bytes: &Bytes) -> String {
    match serde_json::from_slice::<serde_json::Value>(bytes) {
        Ok(value) => value.to_string(),
        Err(_) => String::from_utf8_lossy(bytes).replace(['\n', '\r'], ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::response::Envelope;
    use crate::api::test_logs::capture_logs;
    use axum::body::HttpBody;
    use axum::http::HeaderMap;
    use axum::routing::get;
    use axum::{middleware, Router};
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use std::time::Duration;
    use tower::ServiceExt;

    /// A response body whose first read fails.
    struct BrokenBody;

    impl HttpBody for BrokenBody {
        type Data = Bytes;
        type Error = io::Error;

        fn poll_data(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Option<Result<Self::Data, Self::Error>>> {
            Poll::Ready(Some(Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "body went away",
            ))))
        }

        fn poll_trailers(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Result<Option<HeaderMap>, Self::Error>> {
            Poll::Ready(Ok(None))
        }
    }

    #[allow(clippy::unused_async)]
    async fn broken() -> Response {
        Response::new(boxed(BrokenBody))
    }

    #[allow(clippy::unused_async)]
    async fn fine() -> &'static str {
        "fine"
    }

    async fn send(app: Router, req: Request<Body>) -> Response {
        app.oneshot(req).await.unwrap()
    }

    #[tokio::test]
    async fn unreadable_body_becomes_internal_error() {
        let (logs, _guard) = capture_logs();
        let app = Router::new()
            .route("/", get(broken))
            .layer(middleware::from_fn(log_response));

        let res = send(app, Request::new(Body::empty())).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.headers()["content-type"], "application/json");
        let body = hyper::body::to_bytes(res.into_body()).await.unwrap();
        let envelope: Envelope = serde_json::from_slice(&body).unwrap();
        assert_eq!(envelope, Envelope::new("Failed to write response"));

        let logs = logs.contents();
        assert!(logs.contains("failed to write response"), "{logs}");
        assert!(logs.contains("body went away"), "{logs}");
        let rsp = logs.lines().find(|l| l.contains("rsp")).expect(&logs);
        assert!(rsp.contains("ERROR"), "{rsp}");
        assert!(rsp.contains("status=500"), "{rsp}");
    }

    #[tokio::test]
    async fn duration_counts_from_request_stage() {
        let (logs, _guard) = capture_logs();
        let app = Router::new()
            .route("/", get(fine))
            .layer(middleware::from_fn(log_response));

        let mut req = Request::new(Body::empty());
        let earlier = Instant::now()
            .checked_sub(Duration::from_secs(3))
            .expect("monotonic clock too close to its origin");
        req.extensions_mut().insert(RequestStart(earlier));
        let res = send(app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        let logs = logs.contents();
        let rsp = logs.lines().find(|l| l.contains("rsp")).expect(&logs);
        assert!(rsp.contains("duration=3."), "{rsp}");
        assert!(rsp.contains("body=fine"), "{rsp}");
    }

    #[tokio::test]
    async fn request_stage_hands_its_start_to_response_stage() {
        let app = Router::new()
            .route(
                "/",
                get(|req: Request<Body>| async move {
                    if req.extensions().get::<RequestStart>().is_some() {
                        StatusCode::OK
                    } else {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                }),
            )
            .layer(middleware::from_fn(log_request));

        let res = send(app, Request::new(Body::empty())).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    fn request(forwarded_for: Option<&str>, peer: Option<SocketAddr>) -> Request<()> {
        let mut builder = Request::builder().uri("/authz");
        if let Some(forwarded_for) = forwarded_for {
            builder = builder.header(FORWARDED_FOR, forwarded_for);
        }
        let mut req = builder.body(()).unwrap();
        if let Some(peer) = peer {
            req.extensions_mut().insert(ConnectInfo(peer));
        }
        req
    }

    #[test]
    fn client_ip_prefers_first_forwarded_hop() {
        let peer = "10.0.0.1:4444".parse().unwrap();
        let req = request(Some("203.0.113.7, 10.0.0.2"), Some(peer));
        assert_eq!(client_ip(&req), "203.0.113.7");
    }

    #[test]
    fn client_ip_falls_back_to_peer() {
        let peer = "10.0.0.1:4444".parse().unwrap();
        assert_eq!(client_ip(&request(None, Some(peer))), "10.0.0.1:4444");
        assert_eq!(client_ip(&request(Some(" "), Some(peer))), "10.0.0.1:4444");
        assert_eq!(client_ip(&request(None, None)), "unknown");
    }

    #[test]
    fn body_is_rendered_on_one_line() {
        let pretty = Bytes::from_static(b"{\n  \"message\": \"OK\"\n}\n");
        assert_eq!(fmt_body(&pretty), r#"{"message":"OK"}"#);
        let text = Bytes::from_static(b"not\njson\r\n");
        assert_eq!(fmt_body(&text), "notjson");
    }
}
