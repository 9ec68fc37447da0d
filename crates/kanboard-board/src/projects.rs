//! Project ledger

use chrono::{NaiveDate, Utc};
use kanboard_db::entities::{project, status_stage, task, team, Lifecycle, Priority};
use sea_orm::{
    sea_query::{Expr, Func, LikeExpr},
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;
#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::caller::Caller;
use crate::error::{BoardError, BoardResult};
use crate::lookup;
use crate::permissions::{self, Action, Memberships};
use crate::Board;

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct NewProject {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub priority: Priority,
}

/// `LIKE` pattern matching `title` anywhere, lowercased, with wildcards escaped
fn title_pattern(title: &str) -> LikeExpr {
    let escaped = title
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    LikeExpr::new(format!("%{}%", escaped)).escape('\\')
}

/// Filters for [`Board::list_projects`]; every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectFilter {
    pub team_id: Option<Uuid>,
    /// Case-insensitive substring of the title
    pub title: Option<String>,
    pub priority: Option<Priority>,
    pub start_from: Option<NaiveDate>,
    pub start_to: Option<NaiveDate>,
    pub end_from: Option<NaiveDate>,
    pub end_to: Option<NaiveDate>,
    #[serde(default)]
    pub include_inactive: bool,
}

/// Number of the project's tasks in one stage
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StageCount {
    pub stage: status_stage::Model,
    pub task_count: u64,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ProjectDetail {
    pub project: project::Model,
    pub team: team::Model,
    pub status_stats: Vec<StageCount>,
}

impl Board {
    /// Active teams the caller is a member of, by name
    pub(crate) async fn member_teams(&self, caller: &Caller) -> BoardResult<Vec<team::Model>> {
        let memberships = Memberships::load(&self.db, caller.id()).await?;
        let team_ids: Vec<Uuid> = memberships
            .team_ids()
            .into_iter()
            .filter(|id| permissions::is_team_member(caller, &memberships, *id))
            .collect();
        if team_ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(team::Entity::find()
            .filter(team::Column::Id.is_in(team_ids))
            .filter(team::Column::Lifecycle.eq(Lifecycle::Active))
            .order_by_asc(team::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Create a project in `team_id`, or in the caller's first active team
    /// (by name) when no team is given
    pub async fn create_project(
        &self,
        caller: &Caller,
        team_id: Option<Uuid>,
        new_project: NewProject,
    ) -> BoardResult<project::Model> {
        lookup::require_global(
            caller,
            Action::CreateProject,
            "You do not have permission to create projects",
        )?;

        let team = match team_id {
            Some(team_id) => {
                let team = lookup::team(&self.db, team_id).await?;
                lookup::require_member(&self.db, caller, team.id).await?;
                if !team.lifecycle.is_active() {
                    return Err(BoardError::invalid("Team is inactive"));
                }
                team
            }
            None => self
                .member_teams(caller)
                .await?
                .into_iter()
                .next()
                .ok_or(BoardError::NoTeamMembership)?,
        };

        let title = lookup::required_text(&new_project.title, "Title", 200)?;
        if new_project.end_date < new_project.start_date {
            return Err(BoardError::invalid("End date cannot precede start date"));
        }

        let now = Utc::now();
        let project = project::ActiveModel {
            id: Set(Uuid::new_v4()),
            team_id: Set(team.id),
            title: Set(title),
            description: Set(new_project.description.trim().to_string()),
            created_by: Set(caller.id()),
            created_at: Set(now),
            updated_at: Set(now),
            start_date: Set(new_project.start_date),
            end_date: Set(new_project.end_date),
            priority: Set(new_project.priority),
            lifecycle: Set(Lifecycle::Active),
        }
        .insert(&self.db)
        .await?;

        info!(
            "Project '{}' created in team '{}' by {}",
            project.title,
            team.name,
            caller.username()
        );
        Ok(project)
    }

    /// Soft-delete a project (team admin of its team)
    pub async fn deactivate_project(
        &self,
        caller: &Caller,
        project_id: Uuid,
    ) -> BoardResult<project::Model> {
        let project = lookup::project(&self.db, project_id).await?;
        lookup::require_team_admin(
            &self.db,
            caller,
            project.team_id,
            "Only team admins can deactivate this project",
        )
        .await?;

        let mut active: project::ActiveModel = project.into();
        active.lifecycle = Set(Lifecycle::Inactive);
        let project = active.update(&self.db).await?;

        info!(
            "Project '{}' deactivated by {}",
            project.title,
            caller.username()
        );
        Ok(project)
    }

    /// Projects of the caller's active teams, newest first
    pub async fn list_projects(
        &self,
        caller: &Caller,
        filter: ProjectFilter,
    ) -> BoardResult<Vec<project::Model>> {
        debug!("Listing projects with filters: {:?}", filter);

        let mut team_ids: Vec<Uuid> = self
            .member_teams(caller)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();
        if let Some(team_id) = filter.team_id {
            team_ids.retain(|id| *id == team_id);
        }
        if team_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = project::Entity::find().filter(project::Column::TeamId.is_in(team_ids));

        if !filter.include_inactive {
            query = query.filter(project::Column::Lifecycle.eq(Lifecycle::Active));
        }
        if let Some(title) = filter.title.as_deref().map(str::trim) {
            if !title.is_empty() {
                query = query.filter(
                    Expr::expr(Func::lower(Expr::col(project::Column::Title)))
                        .like(title_pattern(title)),
                );
            }
        }
        if let Some(priority) = filter.priority {
            query = query.filter(project::Column::Priority.eq(priority));
        }
        if let Some(date) = filter.start_from {
            query = query.filter(project::Column::StartDate.gte(date));
        }
        if let Some(date) = filter.start_to {
            query = query.filter(project::Column::StartDate.lte(date));
        }
        if let Some(date) = filter.end_from {
            query = query.filter(project::Column::EndDate.gte(date));
        }
        if let Some(date) = filter.end_to {
            query = query.filter(project::Column::EndDate.lte(date));
        }

        Ok(query
            .order_by_desc(project::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// A project with the number of its tasks in each stage of its team
    pub async fn project_detail(
        &self,
        caller: &Caller,
        project_id: Uuid,
    ) -> BoardResult<ProjectDetail> {
        let project = lookup::project(&self.db, project_id).await?;
        if !project.lifecycle.is_active() {
            return Err(BoardError::not_found("Project"));
        }
        let team = lookup::team(&self.db, project.team_id).await?;
        lookup::require_view(&self.db, caller, team.id).await?;

        let mut status_stats = Vec::new();
        for stage in self.team_stages(team.id).await? {
            let task_count = task::Entity::find()
                .filter(task::Column::ProjectId.eq(project.id))
                .filter(task::Column::StatusId.eq(stage.id))
                .count(&self.db)
                .await?;
            status_stats.push(StageCount { stage, task_count });
        }

        debug!("Getting project: {}", project.id);
        Ok(ProjectDetail {
            project,
            team,
            status_stats,
        })
    }
}
