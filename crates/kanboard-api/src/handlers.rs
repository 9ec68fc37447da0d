use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use kanboard_board::{
    collab::NewAttachment,
    dashboard::Dashboard,
    labels::NewLabel,
    members::{AddMemberOutcome, MemberView},
    projects::{ProjectDetail, ProjectFilter},
    stages::NewStage,
    tasks::{BoardView, NewTask, TaskChanges, TaskDetail},
    teams::{TeamChanges, TeamDeactivation, TeamDetail},
    users::{NewUser, ProfileChanges, UserAccount, UserChanges},
    BoardError, Caller,
};
use kanboard_db::entities::{
    assignment, attachment, comment, label, profile, project, status_stage, task, team, TeamRole,
    UserRole,
};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{board_error, ApiResult};
use crate::models::*;
use crate::AppState;

// ==================== System ====================

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ==================== Caller ====================

/// The authenticated caller with their profile
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Current user", body = Caller),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "me"
)]
pub async fn get_me(Extension(caller): Extension<Caller>) -> Json<Caller> {
    Json(caller)
}

/// Update the caller's own profile
#[utoipa::path(
    patch,
    path = "/api/me/profile",
    request_body = ProfileChanges,
    responses(
        (status = 200, description = "Updated profile", body = profile::Model),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Caller has no profile", body = ErrorResponse)
    ),
    tag = "me"
)]
pub async fn update_my_profile(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Json(changes): Json<ProfileChanges>,
) -> ApiResult<Json<profile::Model>> {
    let profile = state
        .board
        .update_own_profile(&caller, changes)
        .await
        .map_err(board_error)?;
    Ok(Json(profile))
}

/// Summary of the caller's teams, projects and assigned tasks
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Dashboard", body = Dashboard)
    ),
    tag = "me"
)]
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Json<Dashboard>> {
    let dashboard = state.board.dashboard(&caller).await.map_err(board_error)?;
    Ok(Json(dashboard))
}

// ==================== Teams ====================

/// List the caller's active teams
#[utoipa::path(
    get,
    path = "/api/teams",
    responses(
        (status = 200, description = "Teams the caller belongs to", body = Vec<team::Model>)
    ),
    tag = "teams"
)]
pub async fn list_teams(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Json<Vec<team::Model>>> {
    let teams = state.board.list_teams(&caller).await.map_err(board_error)?;
    Ok(Json(teams))
}

/// Create a team; the caller becomes its admin
#[utoipa::path(
    post,
    path = "/api/teams",
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team created", body = team::Model),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn create_team(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<CreateTeamRequest>,
) -> ApiResult<(StatusCode, Json<team::Model>)> {
    let team = state
        .board
        .create_team(&caller, &req.name, req.description)
        .await
        .map_err(board_error)?;
    Ok((StatusCode::CREATED, Json(team)))
}

/// Team with its projects, members, stages and labels
#[utoipa::path(
    get,
    path = "/api/teams/{id}",
    params(
        ("id" = Uuid, Path, description = "Team ID")
    ),
    responses(
        (status = 200, description = "Team detail", body = TeamDetail),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn get_team(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TeamDetail>> {
    let detail = state
        .board
        .team_detail(&caller, id)
        .await
        .map_err(board_error)?;
    Ok(Json(detail))
}

/// Rename a team or change its description (team admin)
#[utoipa::path(
    post,
    path = "/api/teams/{id}",
    params(
        ("id" = Uuid, Path, description = "Team ID")
    ),
    request_body = TeamChanges,
    responses(
        (status = 200, description = "Team updated", body = team::Model),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Not a team admin", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn update_team(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(changes): Json<TeamChanges>,
) -> ApiResult<Json<team::Model>> {
    let team = state
        .board
        .update_team(&caller, id, changes)
        .await
        .map_err(board_error)?;
    Ok(Json(team))
}

/// Deactivate a team (team admin)
#[utoipa::path(
    delete,
    path = "/api/teams/{id}",
    params(
        ("id" = Uuid, Path, description = "Team ID")
    ),
    responses(
        (status = 200, description = "Team deactivated", body = TeamDeactivation),
        (status = 403, description = "Not a team admin", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse),
        (status = 409, description = "Team still has active projects", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn deactivate_team(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TeamDeactivation>> {
    let outcome = state
        .board
        .deactivate_team(&caller, id)
        .await
        .map_err(board_error)?;
    Ok(Json(outcome))
}

/// Workflow stages of a team, in column order
#[utoipa::path(
    get,
    path = "/api/teams/{id}/stages",
    params(
        ("id" = Uuid, Path, description = "Team ID")
    ),
    responses(
        (status = 200, description = "Stages", body = Vec<status_stage::Model>),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn list_stages(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<status_stage::Model>>> {
    let stages = state
        .board
        .list_stages(&caller, id)
        .await
        .map_err(board_error)?;
    Ok(Json(stages))
}

/// Add a workflow stage (team admin)
#[utoipa::path(
    post,
    path = "/api/teams/{id}/stages",
    params(
        ("id" = Uuid, Path, description = "Team ID")
    ),
    request_body = NewStage,
    responses(
        (status = 201, description = "Stage created", body = status_stage::Model),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Not a team admin", body = ErrorResponse),
        (status = 409, description = "Stage name taken", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn create_stage(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(stage): Json<NewStage>,
) -> ApiResult<(StatusCode, Json<status_stage::Model>)> {
    let stage = state
        .board
        .create_stage(&caller, id, stage)
        .await
        .map_err(board_error)?;
    Ok((StatusCode::CREATED, Json(stage)))
}

/// Labels of a team
#[utoipa::path(
    get,
    path = "/api/teams/{id}/labels",
    params(
        ("id" = Uuid, Path, description = "Team ID")
    ),
    responses(
        (status = 200, description = "Labels", body = Vec<label::Model>),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn list_labels(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<label::Model>>> {
    let labels = state
        .board
        .list_labels(&caller, id)
        .await
        .map_err(board_error)?;
    Ok(Json(labels))
}

/// Add a label (team member)
#[utoipa::path(
    post,
    path = "/api/teams/{id}/labels",
    params(
        ("id" = Uuid, Path, description = "Team ID")
    ),
    request_body = NewLabel,
    responses(
        (status = 201, description = "Label created", body = label::Model),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 409, description = "Label name taken", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn create_label(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(new_label): Json<NewLabel>,
) -> ApiResult<(StatusCode, Json<label::Model>)> {
    let label = state
        .board
        .create_label(&caller, id, new_label)
        .await
        .map_err(board_error)?;
    Ok((StatusCode::CREATED, Json(label)))
}

// ==================== Projects ====================

/// List projects of the caller's teams
#[utoipa::path(
    get,
    path = "/api/projects",
    params(
        ("team_id" = Option<Uuid>, Query, description = "Filter by team"),
        ("title" = Option<String>, Query, description = "Filter by title (partial match)"),
        ("priority" = Option<String>, Query, description = "Filter by priority (baixa, media, alta, urgente)"),
        ("start_from" = Option<String>, Query, description = "Start date lower bound (YYYY-MM-DD)"),
        ("start_to" = Option<String>, Query, description = "Start date upper bound (YYYY-MM-DD)"),
        ("end_from" = Option<String>, Query, description = "End date lower bound (YYYY-MM-DD)"),
        ("end_to" = Option<String>, Query, description = "End date upper bound (YYYY-MM-DD)"),
        ("include_inactive" = Option<bool>, Query, description = "Include deactivated projects (default: false)")
    ),
    responses(
        (status = 200, description = "Projects, newest first", body = Vec<project::Model>)
    ),
    tag = "projects"
)]
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<ProjectListQuery>,
) -> ApiResult<Json<Vec<project::Model>>> {
    debug!("Listing projects with filters: {:?}", query);

    let filter = ProjectFilter {
        team_id: query.team_id,
        title: query.title,
        priority: query.priority,
        start_from: query.start_from,
        start_to: query.start_to,
        end_from: query.end_from,
        end_to: query.end_to,
        include_inactive: query.include_inactive,
    };
    let projects = state
        .board
        .list_projects(&caller, filter)
        .await
        .map_err(board_error)?;
    Ok(Json(projects))
}

/// Create a project
#[utoipa::path(
    post,
    path = "/api/projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = project::Model),
        (status = 400, description = "Invalid input or no team to fall back to", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse)
    ),
    tag = "projects"
)]
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<project::Model>)> {
    let (team_id, new_project) = req.into_parts();
    let project = state
        .board
        .create_project(&caller, team_id, new_project)
        .await
        .map_err(board_error)?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// Project with per-stage task counts
#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    params(
        ("id" = Uuid, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project detail", body = ProjectDetail),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    tag = "projects"
)]
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProjectDetail>> {
    let detail = state
        .board
        .project_detail(&caller, id)
        .await
        .map_err(board_error)?;
    Ok(Json(detail))
}

/// Deactivate a project (team admin)
#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    params(
        ("id" = Uuid, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project deactivated", body = project::Model),
        (status = 403, description = "Not a team admin", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    tag = "projects"
)]
pub async fn deactivate_project(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<project::Model>> {
    let project = state
        .board
        .deactivate_project(&caller, id)
        .await
        .map_err(board_error)?;
    Ok(Json(project))
}

/// Kanban board of a project
#[utoipa::path(
    get,
    path = "/api/projects/{id}/board",
    params(
        ("id" = Uuid, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Board columns with their cards", body = BoardView),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    tag = "projects"
)]
pub async fn get_board(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BoardView>> {
    let view = state.board.board(&caller, id).await.map_err(board_error)?;
    Ok(Json(view))
}

/// Create a task in a project
#[utoipa::path(
    post,
    path = "/api/projects/{id}/tasks",
    params(
        ("id" = Uuid, Path, description = "Project ID")
    ),
    request_body = NewTask,
    responses(
        (status = 201, description = "Task created", body = task::Model),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse),
        (status = 404, description = "Project or stage not found", body = ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(new_task): Json<NewTask>,
) -> ApiResult<(StatusCode, Json<task::Model>)> {
    let task = state
        .board
        .create_task(&caller, id, new_task)
        .await
        .map_err(board_error)?;
    Ok((StatusCode::CREATED, Json(task)))
}

// ==================== Tasks ====================

/// Task with labels, comments, attachments and assignee
#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    params(
        ("id" = Uuid, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task detail", body = TaskDetail),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskDetail>> {
    let detail = state
        .board
        .task_detail(&caller, id)
        .await
        .map_err(board_error)?;
    Ok(Json(detail))
}

/// Edit a task
#[utoipa::path(
    patch,
    path = "/api/tasks/{id}",
    params(
        ("id" = Uuid, Path, description = "Task ID")
    ),
    request_body = TaskChanges,
    responses(
        (status = 200, description = "Task updated", body = task::Model),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(changes): Json<TaskChanges>,
) -> ApiResult<Json<task::Model>> {
    let task = state
        .board
        .update_task(&caller, id, changes)
        .await
        .map_err(board_error)?;
    Ok(Json(task))
}

/// Move a task card to a stage and ordering key
///
/// Domain failures answer 200 with `success: false` and the reason.
#[utoipa::path(
    post,
    path = "/api/move-task",
    request_body = MoveTaskRequest,
    responses(
        (status = 200, description = "Move outcome", body = MoveTaskResponse),
        (status = 400, description = "Malformed body", body = MoveTaskResponse),
        (status = 500, description = "Internal server error", body = MoveTaskResponse)
    ),
    tag = "tasks"
)]
pub async fn move_task(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<MoveTaskRequest>, JsonRejection>,
) -> (StatusCode, Json<MoveTaskResponse>) {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            debug!("Rejected move-task body: {}", rejection.body_text());
            return (
                rejection.status(),
                Json(MoveTaskResponse {
                    success: false,
                    error: Some(rejection.body_text()),
                }),
            );
        }
    };

    match state
        .board
        .move_task(&caller, req.task_id, req.new_status_id, req.new_order)
        .await
    {
        Ok(_) => (
            StatusCode::OK,
            Json(MoveTaskResponse {
                success: true,
                error: None,
            }),
        ),
        Err(e) => {
            let status = if matches!(e, BoardError::Database(_)) {
                StatusCode::INTERNAL_SERVER_ERROR
            } else {
                StatusCode::OK
            };
            debug!("Move of task {} refused: {}", req.task_id, e);
            (
                status,
                Json(MoveTaskResponse {
                    success: false,
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}

/// Comment on a task
#[utoipa::path(
    post,
    path = "/api/tasks/{id}/comments",
    params(
        ("id" = Uuid, Path, description = "Task ID")
    ),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment added", body = comment::Model),
        (status = 400, description = "Empty comment", body = ErrorResponse),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(req): Json<CommentRequest>,
) -> ApiResult<(StatusCode, Json<comment::Model>)> {
    let comment = state
        .board
        .add_comment(&caller, id, &req.content)
        .await
        .map_err(board_error)?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// Register an attachment already stored in the blob store
#[utoipa::path(
    post,
    path = "/api/tasks/{id}/attachments",
    params(
        ("id" = Uuid, Path, description = "Task ID")
    ),
    request_body = NewAttachment,
    responses(
        (status = 201, description = "Attachment added", body = attachment::Model),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn add_attachment(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(new_attachment): Json<NewAttachment>,
) -> ApiResult<(StatusCode, Json<attachment::Model>)> {
    let attachment = state
        .board
        .add_attachment(&caller, id, new_attachment)
        .await
        .map_err(board_error)?;
    Ok((StatusCode::CREATED, Json(attachment)))
}

/// Make a team member the task's only assignee
#[utoipa::path(
    post,
    path = "/api/tasks/{id}/assign",
    params(
        ("id" = Uuid, Path, description = "Task ID")
    ),
    request_body = AssignRequest,
    responses(
        (status = 200, description = "Task assigned", body = assignment::Model),
        (status = 403, description = "Caller or assignee not a member", body = ErrorResponse),
        (status = 404, description = "Task or user not found", body = ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn assign_task(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(req): Json<AssignRequest>,
) -> ApiResult<Json<assignment::Model>> {
    let assignment = state
        .board
        .assign_task(&caller, id, req.user_id)
        .await
        .map_err(board_error)?;
    Ok(Json(assignment))
}

/// Clear the task's assignee
#[utoipa::path(
    post,
    path = "/api/tasks/{id}/unassign",
    params(
        ("id" = Uuid, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Assignments removed", body = UnassignResponse),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn unassign_task(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UnassignResponse>> {
    let removed = state
        .board
        .unassign_task(&caller, id)
        .await
        .map_err(board_error)?;
    Ok(Json(UnassignResponse {
        success: true,
        removed,
    }))
}

// ==================== Administration ====================

/// List every account (admin)
#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "Accounts with profiles", body = Vec<UserAccount>),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn admin_list_users(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Json<Vec<UserAccount>>> {
    let users = state.board.list_users(&caller).await.map_err(board_error)?;
    Ok(Json(users))
}

/// Create an account (admin)
#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Account created", body = AdminMessage),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 409, description = "Username taken", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn admin_create_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<AdminMessage>)> {
    let new_user = NewUser {
        id: None,
        username: req.username,
        email: req.email,
        full_name: req.full_name,
    };
    let created = state
        .board
        .create_user(&caller, new_user, req.role.unwrap_or(UserRole::Member))
        .await
        .map_err(board_error)?;

    Ok((
        StatusCode::CREATED,
        Json(AdminMessage::ok(format!(
            "User '{}' created",
            created.username()
        ))),
    ))
}

/// Edit an account, its role or profile (admin)
#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UserChanges,
    responses(
        (status = 200, description = "Account updated", body = AdminMessage),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn admin_update_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(changes): Json<UserChanges>,
) -> ApiResult<Json<AdminMessage>> {
    let account = state
        .board
        .update_user(&caller, id, changes)
        .await
        .map_err(board_error)?;
    Ok(Json(AdminMessage::ok(format!(
        "User '{}' updated",
        account.user.username
    ))))
}

/// Delete an account (admin)
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Account deleted", body = AdminMessage),
        (status = 400, description = "Cannot delete own account", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn admin_delete_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<AdminMessage>> {
    let user = state
        .board
        .delete_user(&caller, id)
        .await
        .map_err(board_error)?;
    Ok(Json(AdminMessage::ok(format!(
        "User '{}' deleted",
        user.username
    ))))
}

/// Delete a team and its memberships for good (admin)
#[utoipa::path(
    delete,
    path = "/api/admin/teams/{id}",
    params(
        ("id" = Uuid, Path, description = "Team ID")
    ),
    responses(
        (status = 200, description = "Team deleted", body = AdminMessage),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse),
        (status = 409, description = "Team still has active projects", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn admin_delete_team(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<AdminMessage>> {
    let deletion = state
        .board
        .hard_delete_team(&caller, id)
        .await
        .map_err(board_error)?;

    info!(
        "Team {} deleted through the admin API ({} memberships)",
        deletion.team_id, deletion.memberships_removed
    );
    Ok(Json(AdminMessage::ok(format!(
        "Team '{}' deleted ({} memberships removed)",
        deletion.name, deletion.memberships_removed
    ))))
}

/// Flip a team between active and inactive (admin)
#[utoipa::path(
    post,
    path = "/api/admin/teams/{id}/toggle-active",
    params(
        ("id" = Uuid, Path, description = "Team ID")
    ),
    responses(
        (status = 200, description = "Team toggled", body = AdminMessage),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn admin_toggle_team(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<AdminMessage>> {
    let team = state
        .board
        .toggle_team_active(&caller, id)
        .await
        .map_err(board_error)?;
    let state_name = if team.lifecycle.is_active() {
        "active"
    } else {
        "inactive"
    };
    Ok(Json(AdminMessage::ok(format!(
        "Team '{}' is now {}",
        team.name, state_name
    ))))
}

/// Members of a team (admin)
#[utoipa::path(
    get,
    path = "/api/admin/teams/{id}/members",
    params(
        ("id" = Uuid, Path, description = "Team ID")
    ),
    responses(
        (status = 200, description = "Memberships", body = Vec<MemberView>),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn admin_list_members(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<MemberView>>> {
    let members = state
        .board
        .list_members(&caller, id)
        .await
        .map_err(board_error)?;
    Ok(Json(members))
}

/// Add a user to a team (admin); existing members are left as they are
#[utoipa::path(
    post,
    path = "/api/admin/teams/{id}/members",
    params(
        ("id" = Uuid, Path, description = "Team ID")
    ),
    request_body = AddMemberRequest,
    responses(
        (status = 200, description = "Member added or already present", body = MemberAddedResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Team or user not found", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn admin_add_member(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<Json<MemberAddedResponse>> {
    let outcome = state
        .board
        .add_member(&caller, id, req.user_id, req.role.unwrap_or(TeamRole::Member))
        .await
        .map_err(board_error)?;

    let (added, message, membership) = match outcome {
        AddMemberOutcome::Added(m) => (true, "Member added to the team", m),
        AddMemberOutcome::AlreadyMember(m) => (false, "User is already a member of this team", m),
    };
    Ok(Json(MemberAddedResponse {
        success: true,
        message: message.to_string(),
        added,
        membership,
    }))
}

/// Change the team role of a membership (admin)
#[utoipa::path(
    patch,
    path = "/api/admin/teams/{id}/members/{membership_id}",
    params(
        ("id" = Uuid, Path, description = "Team ID"),
        ("membership_id" = Uuid, Path, description = "Membership ID")
    ),
    request_body = ChangeRoleRequest,
    responses(
        (status = 200, description = "Role changed", body = AdminMessage),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Membership not found", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn admin_change_member_role(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path((id, membership_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<ChangeRoleRequest>,
) -> ApiResult<Json<AdminMessage>> {
    state
        .board
        .change_member_role(&caller, id, membership_id, req.role)
        .await
        .map_err(board_error)?;
    Ok(Json(AdminMessage::ok("Member role updated")))
}

/// Remove a membership (admin)
#[utoipa::path(
    delete,
    path = "/api/admin/teams/{id}/members/{membership_id}",
    params(
        ("id" = Uuid, Path, description = "Team ID"),
        ("membership_id" = Uuid, Path, description = "Membership ID")
    ),
    responses(
        (status = 200, description = "Member removed", body = AdminMessage),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Membership not found", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn admin_remove_member(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path((id, membership_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<AdminMessage>> {
    state
        .board
        .remove_member(&caller, id, membership_id)
        .await
        .map_err(board_error)?;
    Ok(Json(AdminMessage::ok("Member removed from the team")))
}
