//! Board operation errors

use sea_orm::DbErr;
use thiserror::Error;

/// Errors returned by board operations.
///
/// Every variant carries a message meant for the end user; none of them is
/// retried.
#[derive(Debug, Error)]
pub enum BoardError {
    /// Referenced entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// An authorization predicate denied the action
    #[error("{0}")]
    PermissionDenied(String),

    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// Project creation without a team and no team to fall back to
    #[error("You must belong to at least one team to create a project")]
    NoTeamMembership,

    /// Current state refuses the operation
    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl BoardError {
    pub fn not_found(what: &str) -> Self {
        BoardError::NotFound(format!("{what} not found"))
    }

    pub fn denied(message: impl Into<String>) -> Self {
        BoardError::PermissionDenied(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        BoardError::Validation(message.into())
    }

    /// Short machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            BoardError::NotFound(_) => "NOT_FOUND",
            BoardError::PermissionDenied(_) => "PERMISSION_DENIED",
            BoardError::Validation(_) => "VALIDATION_ERROR",
            BoardError::NoTeamMembership => "NO_TEAM_MEMBERSHIP",
            BoardError::Conflict(_) => "CONFLICT",
            BoardError::Database(_) => "DATABASE_ERROR",
        }
    }
}

pub type BoardResult<T> = Result<T, BoardError>;
