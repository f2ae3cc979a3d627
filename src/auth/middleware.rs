use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, WWW_AUTHENTICATE},
        HeaderMap, HeaderValue, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::{messages, state::AppState};

/// Identity admitted by [`require_auth`], read by handlers via `Extension`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
    /// No `Authorization` header, or an empty one.
    MissingCredentials,
    /// Header present but not a valid `Bearer` token.
    InvalidToken,
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let message = match self {
            GateError::MissingCredentials => messages::GATE_MISSING_CREDENTIALS,
            GateError::InvalidToken => messages::GATE_INVALID_TOKEN,
        };
        (
            StatusCode::UNAUTHORIZED,
            [(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"))],
            Json(json!({ "error": message })),
        )
            .into_response()
    }
}

/// Pulls the token out of `Authorization: Bearer <token>`. The scheme is
/// case-sensitive and exactly one token segment is accepted.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, GateError> {
    let raw = headers
        .get(AUTHORIZATION)
        .ok_or(GateError::MissingCredentials)?;
    let value = raw.to_str().map_err(|_| GateError::InvalidToken)?;
    if value.trim().is_empty() {
        return Err(GateError::MissingCredentials);
    }

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) => Ok(token),
        _ => Err(GateError::InvalidToken),
    }
}

/// Rejects the request unless it carries a valid token, then inserts
/// [`AuthUser`] into the request extensions. No store lookup happens here.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, GateError> {
    let token = match bearer_token(request.headers()) {
        Ok(t) => t,
        Err(e) => {
            warn!(reason = ?e, "rejected request without usable credentials");
            return Err(e);
        }
    };

    let user_id = match state.jwt.verify(token) {
        Ok(id) => id,
        Err(_) => {
            warn!("invalid or expired token");
            return Err(GateError::InvalidToken);
        }
    };

    request.extensions_mut().insert(AuthUser(user_id));
    Ok(next.run(request).await)
}
