//! Per-user dashboard

use std::collections::HashMap;

use kanboard_db::entities::{assignment, project, status_stage, task, team, Lifecycle};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;
#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::caller::Caller;
use crate::config::DONE_STAGE_NAME;
use crate::error::BoardResult;
use crate::Board;

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AssignedTask {
    pub task: task::Model,
    pub project_title: String,
    pub stage_name: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Dashboard {
    pub teams: Vec<team::Model>,
    pub active_projects: Vec<project::Model>,
    pub assigned_tasks: Vec<AssignedTask>,
    pub total_projects: u64,
    pub total_tasks: u64,
    pub completed_tasks: u64,
    /// Rounded to one decimal
    pub completion_percent: f64,
}

/// `part / total` as a percentage with one decimal, 0 when `total` is 0
pub fn completion_percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 1000.0).round() / 10.0
}

impl Board {
    /// Summary of the caller's active teams, projects and tasks
    pub async fn dashboard(&self, caller: &Caller) -> BoardResult<Dashboard> {
        let teams = self.member_teams(caller).await?;
        if teams.is_empty() {
            return Ok(Dashboard::default());
        }
        let team_ids: Vec<Uuid> = teams.iter().map(|t| t.id).collect();

        let active_projects = project::Entity::find()
            .filter(project::Column::TeamId.is_in(team_ids.clone()))
            .filter(project::Column::Lifecycle.eq(Lifecycle::Active))
            .order_by_desc(project::Column::CreatedAt)
            .all(&self.db)
            .await?;
        let project_ids: Vec<Uuid> = active_projects.iter().map(|p| p.id).collect();

        let stages = status_stage::Entity::find()
            .filter(status_stage::Column::TeamId.is_in(team_ids))
            .all(&self.db)
            .await?;
        let done_stage_ids: Vec<Uuid> = stages
            .iter()
            .filter(|s| s.name == DONE_STAGE_NAME)
            .map(|s| s.id)
            .collect();

        let total_tasks = task::Entity::find()
            .filter(task::Column::ProjectId.is_in(project_ids.clone()))
            .count(&self.db)
            .await?;
        let completed_tasks = task::Entity::find()
            .filter(task::Column::ProjectId.is_in(project_ids.clone()))
            .filter(task::Column::StatusId.is_in(done_stage_ids))
            .count(&self.db)
            .await?;

        let assigned_ids: Vec<Uuid> = assignment::Entity::find()
            .filter(assignment::Column::UserId.eq(caller.id()))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|a| a.task_id)
            .collect();
        let assigned = task::Entity::find()
            .filter(task::Column::Id.is_in(assigned_ids))
            .filter(task::Column::ProjectId.is_in(project_ids))
            .order_by_asc(task::Column::DueAt)
            .all(&self.db)
            .await?;

        let project_titles: HashMap<Uuid, &str> = active_projects
            .iter()
            .map(|p| (p.id, p.title.as_str()))
            .collect();
        let stage_names: HashMap<Uuid, &str> =
            stages.iter().map(|s| (s.id, s.name.as_str())).collect();
        let assigned_tasks = assigned
            .into_iter()
            .map(|task| AssignedTask {
                project_title: project_titles
                    .get(&task.project_id)
                    .copied()
                    .unwrap_or_default()
                    .to_string(),
                stage_name: stage_names
                    .get(&task.status_id)
                    .copied()
                    .unwrap_or_default()
                    .to_string(),
                task,
            })
            .collect();

        debug!("Building dashboard for {}", caller.username());
        Ok(Dashboard {
            total_projects: active_projects.len() as u64,
            completion_percent: completion_percent(completed_tasks, total_tasks),
            teams,
            active_projects,
            assigned_tasks,
            total_tasks,
            completed_tasks,
        })
    }
}
