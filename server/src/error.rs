//! HTTP error conversions.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use keel_core::error::KeelError;

/// A [`KeelError`] on its way out of an HTTP handler.
#[derive(Debug)]
pub struct ApiError(pub KeelError);

impl From<KeelError> for ApiError {
    fn from(err: KeelError) -> Self {
        Self(err)
    }
}

/// Status code for an error returned to an HTTP client.
pub fn status_code(err: &KeelError) -> StatusCode {
    match err {
        KeelError::NotFound(_) | KeelError::InvalidState(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_code(&self.0);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }
        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.0.to_string(),
        )
            .into_response()
    }
}
