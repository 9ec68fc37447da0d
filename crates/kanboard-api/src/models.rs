//! Request and response bodies of the REST API
//!
//! Read-models of the board (teams, projects, board views, dashboard) are
//! returned as-is; this module only holds the API envelopes and the request
//! bodies that do not map one-to-one onto a board input type.

use chrono::NaiveDate;
use kanboard_board::projects::NewProject;
use kanboard_db::entities::{team_member, Priority, TeamRole, UserRole};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Always false
    pub success: bool,
    /// Error message
    pub error: String,
    /// Error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: &str) -> Self {
        Self {
            success: false,
            error: error.into(),
            code: Some(code.to_string()),
        }
    }
}

/// Acknowledgement of an admin mutation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminMessage {
    pub success: bool,
    pub message: String,
}

impl AdminMessage {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Outcome of adding a user to a team
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MemberAddedResponse {
    pub success: bool,
    pub message: String,
    /// False when the user was already a member
    pub added: bool,
    /// The new membership, or the existing one
    pub membership: team_member::Model,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
}

/// Request to create a team
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateTeamRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Request to create a project
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateProjectRequest {
    /// Owning team; the caller's first team when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub priority: Priority,
}

impl CreateProjectRequest {
    pub fn into_parts(self) -> (Option<Uuid>, NewProject) {
        (
            self.team_id,
            NewProject {
                title: self.title,
                description: self.description,
                start_date: self.start_date,
                end_date: self.end_date,
                priority: self.priority,
            },
        )
    }
}

/// Query parameters of the project list
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ProjectListQuery {
    pub team_id: Option<Uuid>,
    pub title: Option<String>,
    pub priority: Option<Priority>,
    pub start_from: Option<NaiveDate>,
    pub start_to: Option<NaiveDate>,
    pub end_from: Option<NaiveDate>,
    pub end_to: Option<NaiveDate>,
    #[serde(default)]
    pub include_inactive: bool,
}

/// Drag-and-drop move of a task card
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MoveTaskRequest {
    pub task_id: Uuid,
    pub new_status_id: Uuid,
    pub new_order: i32,
}

/// Result of a move; failures carry the reason in `error`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MoveTaskResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// New comment on a task
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentRequest {
    pub content: String,
}

/// Assign a task to a team member
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssignRequest {
    pub user_id: Uuid,
}

/// Result of clearing a task's assignee
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UnassignResponse {
    pub success: bool,
    /// Number of assignments removed (0 or 1)
    pub removed: u64,
}

/// Admin-side account creation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Global role; member when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

/// Add a user to a team
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddMemberRequest {
    pub user_id: Uuid,
    /// Team role; member when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<TeamRole>,
}

/// Change the team role of a membership
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChangeRoleRequest {
    pub role: TeamRole,
}
