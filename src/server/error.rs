//! HTTP error mapping.
//!
//! Service errors keep their own types until the edge; this module decides
//! the status code and the machine-readable error tag for each of them.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use thiserror::Error;

use crate::auth::AuthError;
use crate::exercises::LogError;
use crate::models::ValidationError;
use crate::store::StoreError;

/// JSON body sent with every error response.
#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Log(#[from] LogError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("not signed in")]
    Unauthenticated,
}

impl ApiError {
    /// Status code and error tag for this failure.
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "invalid_entry"),
            ApiError::Log(LogError::Store(StoreError::NotConfigured)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "store_not_configured")
            }
            ApiError::Log(LogError::Store(_)) => (StatusCode::BAD_GATEWAY, "store_error"),
            ApiError::Log(LogError::Contention { .. }) => (StatusCode::CONFLICT, "conflict"),
            ApiError::Auth(AuthError::NotConfigured) => {
                (StatusCode::SERVICE_UNAVAILABLE, "auth_not_configured")
            }
            ApiError::Auth(_) => (StatusCode::BAD_GATEWAY, "auth_error"),
            ApiError::Unauthenticated => (StatusCode::UNAUTHORIZED, "unauthenticated"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = self.parts();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        (
            status,
            Json(ErrorBody {
                error,
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}
