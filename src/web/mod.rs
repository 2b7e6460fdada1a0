//! HTTP surface
//!
//! Routes, handlers and the bearer-token gate for the film and account
//! stores. Every failure leaves as a JSON body `{ "message", "code" }`.

pub mod app;
pub mod handlers;
pub mod middleware;

use crate::core::{AuthFailure, FilmError};
use axum::Json;
use axum::extract::FromRequest;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

pub use app::{AppState, build_router};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: String,
}

#[derive(Debug)]
pub enum WebError {
    Film(FilmError),
    Input(String),
}

impl From<FilmError> for WebError {
    fn from(err: FilmError) -> Self {
        WebError::Film(err)
    }
}

impl From<JsonRejection> for WebError {
    fn from(rejection: JsonRejection) -> Self {
        WebError::Input(rejection.body_text())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message, code) = match self {
            WebError::Film(FilmError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, msg, "validation_error")
            }
            WebError::Film(FilmError::NotFound(msg)) => (StatusCode::NOT_FOUND, msg, "not_found"),
            WebError::Film(FilmError::Auth(AuthFailure::InvalidCredentials)) => (
                StatusCode::UNAUTHORIZED,
                "Invalid credentials".to_string(),
                "invalid_credentials",
            ),
            WebError::Film(FilmError::Auth(AuthFailure::MissingToken)) => (
                StatusCode::UNAUTHORIZED,
                "Missing bearer token".to_string(),
                "unauthorized",
            ),
            WebError::Film(FilmError::Auth(AuthFailure::InvalidToken)) => (
                StatusCode::FORBIDDEN,
                "Invalid token".to_string(),
                "forbidden",
            ),
            WebError::Film(FilmError::NotReady) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Film collection is still loading".to_string(),
                "not_ready",
            ),
            WebError::Film(err @ FilmError::Persistence(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                err.to_string(),
                "persistence_error",
            ),
            WebError::Film(err @ FilmError::Internal(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                err.to_string(),
                "internal_error",
            ),

            WebError::Input(msg) => (StatusCode::BAD_REQUEST, msg, "input_error"),
        };

        let body = Json(ErrorResponse {
            message,
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, WebError>;

/// `Json` extractor whose rejections answer 400 in the usual error shape.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(WebError))]
pub struct JsonBody<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: impl Into<WebError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_film_errors_map_to_status_codes() {
        assert_eq!(status_of(FilmError::validation("bad")), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(FilmError::not_found("gone")), StatusCode::NOT_FOUND);
        assert_eq!(status_of(FilmError::NotReady), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            status_of(FilmError::persistence("disk full")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_failures_split_between_401_and_403() {
        assert_eq!(
            status_of(FilmError::Auth(AuthFailure::MissingToken)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(FilmError::Auth(AuthFailure::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(FilmError::Auth(AuthFailure::InvalidToken)),
            StatusCode::FORBIDDEN
        );
    }
}
