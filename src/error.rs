//! Error types.

use std::net::AddrParseError;

/// Error enumerates the possible edge-authz error states.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when clients call the [`/authz` endpoint][crate::api#authz-any] without an
    /// `Authorization` header, or with an empty one.
    #[error("No Authorization header")]
    MissingAuthzHeader,

    /// Returned when clients call the [`/authz` endpoint][crate::api#authz-any] with an
    /// `Authorization` header that doesn't match the
    /// [expected secret][crate::authz::ExpectedSecret]. Also returned for every non-empty
    /// header when no secret was configured.
    #[error("Wrong Authorization header")]
    WrongAuthzHeader,

    /// Returned when a response payload can't be encoded as JSON.
    #[error("failed to encode response")]
    Encode(#[source] serde_json::Error),

    /// Returned when the [`Config::bind_addr`][crate::config::Config::bind_addr] can't be
    /// bound, e.g. it's already in use.
    #[error("failed to bind API listener")]
    Bind(#[from] hyper::Error),

    /// Returned when the running API server stops with an error.
    #[error("API server failed")]
    Serve(#[source] hyper::Error),

    /// Returned when the task running the API server panicked or was cancelled.
    #[error("API server task ended abnormally")]
    ServerTask(#[from] tokio::task::JoinError),

    /// Returned when `AUTHZ_BIND_ADDR` isn't a valid `ip:port` socket address.
    #[error("invalid bind address \"{0}\"")]
    InvalidBindAddr(String, #[source] AddrParseError),

    /// Returned when `AUTHZ_LOG_FORMAT` is neither `text` nor `json`.
    #[error("invalid log format \"{0}\", expected \"text\" or \"json\"")]
    InvalidLogFormat(String),

    /// Returned when a generic IO error occurs.
    #[error("an IO error occurred")]
    IO(#[from] std::io::Error),

    /// Returned when [trying to load a `Config`][crate::config::Config::try_from_file] fails
    /// due to invalid JSON content.
    #[error("invalid JSON")]
    InvalidJSON(#[from] serde_json::Error),
}
