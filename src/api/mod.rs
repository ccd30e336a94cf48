//! HTTP API simulating an edge authorization checkpoint.
//!
//! Every response has a `Content-Type: application/json` body of the form:
//!
//! ```json
//! { "message": "OK" }
//! ```
//!
//! No endpoint inspects the request method, query string or body.
//!
//! # API Endpoints
//!
//! ## `/200` (any)
//!
//!   Returns HTTP 200 (OK) and `{"message":"OK"}`.
//!
//! ## `/403` (any)
//!
//!   Returns HTTP 403 (Forbidden) and `{"message":"NOPE"}`.
//!
//! ## `/headers` (any)
//!
//!   Logs one entry per received header value, then returns HTTP 200 (OK) and
//!   `{"message":"OK"}`. Values of credential carrying headers such as `Authorization` and
//!   `Cookie` are logged as `[redacted]`.
//!
//! ## `/authz` (any)
//!
//!   Compares the `Authorization` header against the secret configured through the
//!   `AUTHZ_HEADER` environment variable.
//!
//!   Returns HTTP 200 (OK) and `{"message":"OK"}` on an exact match. Otherwise returns HTTP 403
//!   (Forbidden) with the reason as the message, either `No Authorization header` or
//!   `Wrong Authorization header`. When no secret is configured every request is denied.
//!
//!   ```bash
//!   ❯ curl -H 'Authorization: correct-header' http://localhost:8080/authz
//!   {"message":"OK"}
//!   ```
//!
//! Any other path returns HTTP 404 (Not Found) and `{"message":"Not Found"}`.
//!
//! # Logging
//!
//! Each request is logged on arrival (`rcv`: method, URI and client address, preferring the
//! first `X-Forwarded-For` hop) and on completion (`rsp`: status, body and duration). Responses
//! with a status of 400 or above are logged at `ERROR`, everything else at `INFO`.

mod api_error;
mod logging;
mod response;
mod routes;
pub mod server;
#[cfg(test)]
mod test_logs;

pub use response::{write_out, Envelope};
pub use server::{bind, supervise, Server};
