//! Team lifecycle

use chrono::Utc;
use kanboard_db::entities::{
    label, project, status_stage, team, team_member, Lifecycle, TeamRole,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;
#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::caller::Caller;
use crate::config::{TeamDeactivationPolicy, DEFAULT_STAGES};
use crate::error::{BoardError, BoardResult};
use crate::lookup;
use crate::members::{self, MemberView};
use crate::permissions::Action;
use crate::Board;

const MAX_TEAM_NAME_LEN: usize = 100;

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct TeamChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Result of deactivating a team
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct TeamDeactivation {
    pub team: team::Model,
    /// Set when the team still had active projects and the policy let the
    /// deactivation through
    pub warning: Option<String>,
}

/// Result of a hard delete
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct TeamDeletion {
    pub team_id: Uuid,
    pub name: String,
    pub memberships_removed: u64,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct TeamDetail {
    pub team: team::Model,
    /// Active projects only
    pub projects: Vec<project::Model>,
    pub members: Vec<MemberView>,
    pub stages: Vec<status_stage::Model>,
    pub labels: Vec<label::Model>,
}

async fn active_project_count<C: sea_orm::ConnectionTrait>(
    conn: &C,
    team_id: Uuid,
) -> BoardResult<u64> {
    Ok(project::Entity::find()
        .filter(project::Column::TeamId.eq(team_id))
        .filter(project::Column::Lifecycle.eq(Lifecycle::Active))
        .count(conn)
        .await?)
}

impl Board {
    /// Create a team, enroll the creator as team admin and seed the default
    /// stages, all in one transaction
    pub async fn create_team(
        &self,
        caller: &Caller,
        name: &str,
        description: Option<String>,
    ) -> BoardResult<team::Model> {
        lookup::require_global(
            caller,
            Action::CreateTeam,
            "Only administrators can create teams",
        )?;
        let name = lookup::required_text(name, "Team name", MAX_TEAM_NAME_LEN)?;
        let description = description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let now = Utc::now();
        let txn = self.db.begin().await?;

        let team = team::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            description: Set(description),
            created_by: Set(caller.id()),
            lifecycle: Set(Lifecycle::Active),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        team_member::ActiveModel {
            id: Set(Uuid::new_v4()),
            team_id: Set(team.id),
            user_id: Set(caller.id()),
            role: Set(TeamRole::Admin),
            joined_at: Set(now),
        }
        .insert(&txn)
        .await?;

        if self.config.seed_default_stages {
            for stage in DEFAULT_STAGES {
                status_stage::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    team_id: Set(team.id),
                    name: Set(stage.name.to_string()),
                    color: Set(stage.color.to_string()),
                    position: Set(stage.position),
                }
                .insert(&txn)
                .await?;
            }
        }

        txn.commit().await?;

        info!("Team '{}' ({}) created by {}", team.name, team.id, caller.username());
        Ok(team)
    }

    /// Rename or re-describe a team (team admin)
    pub async fn update_team(
        &self,
        caller: &Caller,
        team_id: Uuid,
        changes: TeamChanges,
    ) -> BoardResult<team::Model> {
        let team = lookup::team(&self.db, team_id).await?;
        lookup::require_team_admin(
            &self.db,
            caller,
            team.id,
            "Only team admins can edit this team",
        )
        .await?;

        let mut active: team::ActiveModel = team.into();
        if let Some(name) = changes.name {
            active.name = Set(lookup::required_text(&name, "Team name", MAX_TEAM_NAME_LEN)?);
        }
        if let Some(description) = changes.description {
            let description = description.trim().to_string();
            active.description = Set((!description.is_empty()).then_some(description));
        }
        active.updated_at = Set(Utc::now());
        let team = active.update(&self.db).await?;

        info!("Team {} updated by {}", team.id, caller.username());
        Ok(team)
    }

    /// Soft-delete a team (team admin). Active child projects are handled
    /// according to the configured [`TeamDeactivationPolicy`].
    pub async fn deactivate_team(
        &self,
        caller: &Caller,
        team_id: Uuid,
    ) -> BoardResult<TeamDeactivation> {
        let team = lookup::team(&self.db, team_id).await?;
        lookup::require_team_admin(
            &self.db,
            caller,
            team.id,
            "Only team admins can deactivate this team",
        )
        .await?;

        let active_projects = active_project_count(&self.db, team.id).await?;
        let warning = if active_projects > 0 {
            match self.config.team_deactivation_policy {
                TeamDeactivationPolicy::Refuse => {
                    return Err(BoardError::Conflict(
                        "Cannot deactivate a team with active projects".to_string(),
                    ));
                }
                TeamDeactivationPolicy::Warn => {
                    warn!(
                        "Deactivating team {} with {} active projects",
                        team.id, active_projects
                    );
                    Some(format!(
                        "Team deactivated; its {active_projects} active project(s) keep working"
                    ))
                }
            }
        } else {
            None
        };

        let mut active: team::ActiveModel = team.into();
        active.lifecycle = Set(Lifecycle::Inactive);
        let team = active.update(&self.db).await?;

        info!("Team '{}' deactivated by {}", team.name, caller.username());
        Ok(TeamDeactivation { team, warning })
    }

    /// Remove a team and its memberships for good (global admin). Refused
    /// while any project of the team is active.
    pub async fn hard_delete_team(
        &self,
        caller: &Caller,
        team_id: Uuid,
    ) -> BoardResult<TeamDeletion> {
        lookup::require_global(
            caller,
            Action::DeleteTeam,
            "Only administrators can delete teams",
        )?;
        let team = lookup::team(&self.db, team_id).await?;

        if active_project_count(&self.db, team.id).await? > 0 {
            return Err(BoardError::Conflict(format!(
                "Team '{}' has active projects and cannot be deleted",
                team.name
            )));
        }

        let txn = self.db.begin().await?;

        let memberships_removed = team_member::Entity::delete_many()
            .filter(team_member::Column::TeamId.eq(team.id))
            .exec(&txn)
            .await?
            .rows_affected;

        team::Entity::delete_by_id(team.id).exec(&txn).await?;

        txn.commit().await?;

        info!(
            "Team '{}' deleted by {} ({} memberships removed)",
            team.name,
            caller.username(),
            memberships_removed
        );
        Ok(TeamDeletion {
            team_id: team.id,
            name: team.name,
            memberships_removed,
        })
    }

    /// Flip a team between active and inactive (global admin)
    pub async fn toggle_team_active(
        &self,
        caller: &Caller,
        team_id: Uuid,
    ) -> BoardResult<team::Model> {
        lookup::require_admin(caller)?;
        let team = lookup::team(&self.db, team_id).await?;

        let next = team.lifecycle.toggled();
        let mut active: team::ActiveModel = team.into();
        active.lifecycle = Set(next);
        let team = active.update(&self.db).await?;

        info!("Team {} is now {:?}", team.id, team.lifecycle);
        Ok(team)
    }

    /// Active teams the caller belongs to, by name
    pub async fn list_teams(&self, caller: &Caller) -> BoardResult<Vec<team::Model>> {
        let teams = self.member_teams(caller).await?;
        debug!("Listing {} teams for {}", teams.len(), caller.username());
        Ok(teams)
    }

    /// A team with its active projects, members, stages and labels
    pub async fn team_detail(&self, caller: &Caller, team_id: Uuid) -> BoardResult<TeamDetail> {
        let team = lookup::team(&self.db, team_id).await?;
        if !team.lifecycle.is_active() {
            return Err(BoardError::not_found("Team"));
        }
        lookup::require_view(&self.db, caller, team.id).await?;

        let projects = project::Entity::find()
            .filter(project::Column::TeamId.eq(team.id))
            .filter(project::Column::Lifecycle.eq(Lifecycle::Active))
            .order_by_desc(project::Column::CreatedAt)
            .all(&self.db)
            .await?;
        let members = members::member_views(&self.db, team.id).await?;
        let stages = self.team_stages(team.id).await?;
        let labels = self.team_labels(team.id).await?;

        debug!("Getting team: {}", team.id);
        Ok(TeamDetail {
            team,
            projects,
            members,
            stages,
            labels,
        })
    }
}
