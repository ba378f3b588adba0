use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::fmt::Display;

use life_ai::CallKind;
use serde::Serialize;
use tracing::error;

/// A failed generation call, including an unreadable request body.
/// Always rendered as a 500.
#[derive(Debug)]
pub struct ApiError {
    kind: CallKind,
    message: String,
}

impl ApiError {
    pub fn new(kind: CallKind, err: impl Display) -> Self {
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(call = self.kind.as_str(), error = %self.message, "generation request failed");
        let body = ErrorBody {
            error: self.kind.failure_message(),
            message: self.message,
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
