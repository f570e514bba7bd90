use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Failures a handler reports to the caller. The body is always
/// `{"detail": "<display text>"}`.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Email already registered")]
    EmailTaken,
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::EmailTaken => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ErrorBody { detail: self.to_string() })).into_response()
    }
}
