use crate::error::Error;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

const ENCODE_FAILED_BODY: &str = r#"{"message":"Failed to encode response"}"#;
const WRITE_FAILED_BODY: &str = r#"{"message":"Failed to write response"}"#;

/// The body of every API response.
#[derive(Serialize, Deserialize, Debug, Clone, Default, Ord, PartialOrd, Eq, PartialEq)]
pub struct Envelope {
    pub message: String,
}

impl Envelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Encode `body` as JSON and pair it with `status`. A body that can't be encoded becomes a
/// HTTP 500 with a generic envelope.
pub fn write_out<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => json_response(status, bytes),
        Err(err) => {
            let err = Error::Encode(err);
            tracing::error!(error = %err, cause = ?std::error::Error::source(&err), "write_out");
            encode_failed()
        }
    }
}

fn encode_failed() -> Response {
    json_response(StatusCode::INTERNAL_SERVER_ERROR, ENCODE_FAILED_BODY.into())
}

pub(crate) fn write_failed() -> Response {
    json_response(StatusCode::INTERNAL_SERVER_ERROR, WRITE_FAILED_BODY.into())
}

fn json_response(status: StatusCode, bytes: Vec<u8>) -> Response {
    (
        status,
        [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        bytes,
    )
        .into_response()
}
