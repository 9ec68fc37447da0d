//! Identity Middleware
//!
//! Tokens are issued by the external identity provider. The middleware
//! validates the token, maps its identity onto a local account and makes the
//! resulting [`Caller`] available to handlers via Axum's Extension.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use kanboard_auth::JwtError;
use kanboard_board::{BoardError, Caller};
use std::sync::Arc;
use tracing::debug;

use crate::error::{board_error, ApiError};
use crate::models::ErrorResponse;
use crate::AppState;

const SESSION_COOKIE: &str = "session_token";

fn unauthorized(error: impl Into<String>, code: &str) -> ApiError {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new(error, code)),
    )
}

/// Read the token from the `session_token` cookie, falling back to an
/// `Authorization: Bearer <token>` header
pub fn extract_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix("session_token="))
        .filter(|token| !token.is_empty());

    if let Some(token) = from_cookie {
        return Ok(token.to_string());
    }

    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            unauthorized(
                format!("Missing authentication token ({SESSION_COOKIE} cookie or Authorization header)"),
                "MISSING_AUTH",
            )
        })?;

    auth_header
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .ok_or_else(|| {
            unauthorized(
                "Invalid Authorization header format. Expected 'Bearer <token>'",
                "INVALID_AUTH_FORMAT",
            )
        })
}

/// Authentication middleware for the protected routes
///
/// # Errors
/// Returns 401 Unauthorized if:
/// - Both cookie and Authorization header are missing
/// - Token is malformed, carries a bad signature or is expired
/// - No local account matches and signup is disabled
///
/// Returns 403 Forbidden for disabled accounts.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(request.headers())?;

    let identity = state.validator.identify(&token).map_err(|e| match e {
        JwtError::TokenExpired => unauthorized("Token expired", "TOKEN_EXPIRED"),
        other => unauthorized(format!("Invalid token: {}", other), "INVALID_TOKEN"),
    })?;

    let caller: Caller = state
        .board
        .resolve_identity(&identity, state.allow_signup)
        .await
        .map_err(|e| match e {
            BoardError::NotFound(message) => unauthorized(message, "UNKNOWN_ACCOUNT"),
            other => board_error(other),
        })?;

    debug!("Authenticated {} ({})", caller.username(), caller.id());
    request.extensions_mut().insert(caller);

    Ok(next.run(request).await)
}
