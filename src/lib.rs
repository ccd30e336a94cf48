//! Edge Authz
//!
//! A tiny HTTP stub standing in for the authorization service an edge function (e.g. a
//! [Lambda@Edge] viewer request handler) calls before letting a request through to its origin.
//!
//! A handful of fixed response endpoints are served, plus [`/authz`][crate::api#authz-any]
//! which checks the `Authorization` header against a single shared secret read from the
//! environment at startup. It is meant for exercising the edge side of that contract, not for
//! guarding anything real.
//!
//! [Lambda@Edge]: https://docs.aws.amazon.com/AmazonCloudFront/latest/DeveloperGuide/lambda-at-the-edge.html
//!
#![warn(clippy::pedantic)]

pub mod api;
pub mod authz;
pub mod config;
pub mod error;

pub use api::bind as bind_http;
pub use authz::ExpectedSecret;
pub use config::{Config, SharedConfig};
