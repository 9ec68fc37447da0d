//! Mapping of board errors onto HTTP responses

use axum::{http::StatusCode, Json};
use kanboard_board::BoardError;
use tracing::error;

use crate::models::ErrorResponse;

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub type ApiResult<T> = Result<T, ApiError>;

pub fn status_for(err: &BoardError) -> StatusCode {
    match err {
        BoardError::NotFound(_) => StatusCode::NOT_FOUND,
        BoardError::PermissionDenied(_) => StatusCode::FORBIDDEN,
        BoardError::Validation(_) | BoardError::NoTeamMembership => StatusCode::BAD_REQUEST,
        BoardError::Conflict(_) => StatusCode::CONFLICT,
        BoardError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Convert a board error into the `{success: false, error, code}` envelope
pub fn board_error(err: BoardError) -> ApiError {
    let status = status_for(&err);
    if status.is_server_error() {
        error!("Board operation failed: {}", err);
    }
    (status, Json(ErrorResponse::new(err.to_string(), err.code())))
}
