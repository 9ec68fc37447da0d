//! Shared loaders and guards used by the operation modules

use kanboard_db::entities::{project, status_stage, task, team, user};
use sea_orm::{ConnectionTrait, EntityTrait};
use uuid::Uuid;

use crate::caller::Caller;
use crate::error::{BoardError, BoardResult};
use crate::permissions::{self, Action, Memberships};

pub(crate) async fn team<C: ConnectionTrait>(conn: &C, id: Uuid) -> BoardResult<team::Model> {
    team::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| BoardError::not_found("Team"))
}

pub(crate) async fn project<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> BoardResult<project::Model> {
    project::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| BoardError::not_found("Project"))
}

pub(crate) async fn task<C: ConnectionTrait>(conn: &C, id: Uuid) -> BoardResult<task::Model> {
    task::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| BoardError::not_found("Task"))
}

pub(crate) async fn stage<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> BoardResult<status_stage::Model> {
    status_stage::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| BoardError::not_found("Status"))
}

pub(crate) async fn user<C: ConnectionTrait>(conn: &C, id: Uuid) -> BoardResult<user::Model> {
    user::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| BoardError::not_found("User"))
}

/// Task together with its project
pub(crate) async fn task_with_project<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> BoardResult<(task::Model, project::Model)> {
    let task = task(conn, id).await?;
    let project = project(conn, task.project_id).await?;
    Ok((task, project))
}

pub(crate) fn require_global(caller: &Caller, action: Action, message: &str) -> BoardResult<()> {
    if permissions::can(caller.profile.as_ref(), action) {
        Ok(())
    } else {
        Err(BoardError::denied(message))
    }
}

pub(crate) fn require_admin(caller: &Caller) -> BoardResult<()> {
    if caller.is_admin() {
        Ok(())
    } else {
        Err(BoardError::denied(
            "Only administrators can perform this action",
        ))
    }
}

pub(crate) async fn require_member<C: ConnectionTrait>(
    conn: &C,
    caller: &Caller,
    team_id: Uuid,
) -> BoardResult<()> {
    let memberships = Memberships::load_for_team(conn, caller.id(), team_id).await?;
    if permissions::is_team_member(caller, &memberships, team_id) {
        Ok(())
    } else {
        Err(BoardError::denied("You are not a member of this team"))
    }
}

pub(crate) async fn require_team_admin<C: ConnectionTrait>(
    conn: &C,
    caller: &Caller,
    team_id: Uuid,
    message: &str,
) -> BoardResult<()> {
    let memberships = Memberships::load_for_team(conn, caller.id(), team_id).await?;
    if permissions::is_team_admin(caller, &memberships, team_id) {
        Ok(())
    } else {
        Err(BoardError::denied(message))
    }
}

pub(crate) async fn require_view<C: ConnectionTrait>(
    conn: &C,
    caller: &Caller,
    team_id: Uuid,
) -> BoardResult<()> {
    let memberships = Memberships::load_for_team(conn, caller.id(), team_id).await?;
    if permissions::can_view_team(caller, &memberships, team_id) {
        Ok(())
    } else {
        Err(BoardError::denied("You do not have access to this team"))
    }
}

/// `#RRGGBB`
pub(crate) fn validate_color(color: &str) -> BoardResult<()> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(BoardError::invalid(format!(
            "Invalid color '{color}', expected #RRGGBB"
        )))
    }
}

/// Trimmed, non-empty, bounded text
pub(crate) fn required_text(value: &str, field: &str, max_len: usize) -> BoardResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(BoardError::invalid(format!("{field} is required")));
    }
    if value.chars().count() > max_len {
        return Err(BoardError::invalid(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(value.to_string())
}
