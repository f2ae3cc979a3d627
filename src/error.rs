use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::{auth::repo::StoreError, messages};

/// Failures of the account operations, rendered as
/// `{ "success": false, "message": ... }`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request data")]
    Validation,

    #[error("email already in use")]
    Conflict,

    #[error("no account for this email")]
    UnknownAccount,

    #[error("password does not match")]
    WrongPassword,

    #[error("user not found")]
    NotFound,

    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation => StatusCode::BAD_REQUEST,
            ApiError::Conflict => StatusCode::CONFLICT,
            ApiError::UnknownAccount | ApiError::WrongPassword => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            ApiError::Validation => messages::INVALID_DATA,
            ApiError::Conflict => messages::EMAIL_IN_USE,
            ApiError::UnknownAccount => messages::ACCESS_DENIED,
            ApiError::WrongPassword => messages::WRONG_CREDENTIALS,
            ApiError::NotFound => messages::NOT_FOUND,
            ApiError::Internal(_) => messages::INTERNAL_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UniqueViolation(_) => ApiError::Conflict,
            other => ApiError::Internal(other.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(cause) = &self {
            error!(error = %format!("{cause:#}"), "request failed");
        }
        let body = Json(json!({
            "success": false,
            "message": self.message(),
        }));
        (self.status_code(), body).into_response()
    }
}
