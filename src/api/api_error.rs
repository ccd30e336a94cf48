use crate::api::response::{write_out, Envelope};
use crate::error::Error;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

pub(crate) struct APIError(anyhow::Error);

impl IntoResponse for APIError {
    fn into_response(self) -> Response {
        let any_err = self.0;
        match any_err.downcast_ref::<Error>() {
            Some(err @ (Error::MissingAuthzHeader | Error::WrongAuthzHeader)) => {
                write_out(StatusCode::FORBIDDEN, &Envelope::new(err.to_string()))
            }
            _ => {
                tracing::error!(error = ?any_err, "request failed");
                write_out(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &Envelope::new("Internal Server Error"),
                )
            }
        }
    }
}

impl<E> From<E> for APIError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
