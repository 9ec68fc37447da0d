//! Team membership administration

use chrono::Utc;
use kanboard_db::entities::{team_member, user, TeamRole};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;
#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::caller::Caller;
use crate::error::{BoardError, BoardResult};
use crate::lookup;
use crate::Board;

/// A membership with the member's names
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct MemberView {
    pub membership: team_member::Model,
    pub username: String,
    pub display_name: String,
}

/// Outcome of [`Board::add_member`]
#[derive(Debug, Clone, PartialEq)]
pub enum AddMemberOutcome {
    Added(team_member::Model),
    /// The pair already existed; nothing was written
    AlreadyMember(team_member::Model),
}

impl AddMemberOutcome {
    pub fn membership(&self) -> &team_member::Model {
        match self {
            AddMemberOutcome::Added(m) | AddMemberOutcome::AlreadyMember(m) => m,
        }
    }

    pub fn is_added(&self) -> bool {
        matches!(self, AddMemberOutcome::Added(_))
    }
}

pub(crate) async fn member_views<C: ConnectionTrait>(
    conn: &C,
    team_id: Uuid,
) -> BoardResult<Vec<MemberView>> {
    let rows = team_member::Entity::find()
        .filter(team_member::Column::TeamId.eq(team_id))
        .find_also_related(user::Entity)
        .order_by_asc(team_member::Column::JoinedAt)
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(membership, user)| {
            user.map(|user| MemberView {
                username: user.username.clone(),
                display_name: user.display_name().to_string(),
                membership,
            })
        })
        .collect())
}

async fn team_membership<C: ConnectionTrait>(
    conn: &C,
    team_id: Uuid,
    membership_id: Uuid,
) -> BoardResult<team_member::Model> {
    team_member::Entity::find_by_id(membership_id)
        .filter(team_member::Column::TeamId.eq(team_id))
        .one(conn)
        .await?
        .ok_or_else(|| BoardError::NotFound("Membership not found in this team".to_string()))
}

impl Board {
    /// Enroll a user in a team (global admin). Adding an existing member is
    /// not an error; the existing row is returned untouched.
    pub async fn add_member(
        &self,
        caller: &Caller,
        team_id: Uuid,
        user_id: Uuid,
        role: TeamRole,
    ) -> BoardResult<AddMemberOutcome> {
        lookup::require_admin(caller)?;
        let team = lookup::team(&self.db, team_id).await?;
        let user = lookup::user(&self.db, user_id).await?;

        let existing = team_member::Entity::find()
            .filter(team_member::Column::TeamId.eq(team.id))
            .filter(team_member::Column::UserId.eq(user.id))
            .one(&self.db)
            .await?;
        if let Some(existing) = existing {
            warn!(
                "{} is already a member of team '{}'",
                user.display_name(),
                team.name
            );
            return Ok(AddMemberOutcome::AlreadyMember(existing));
        }

        let membership = team_member::ActiveModel {
            id: Set(Uuid::new_v4()),
            team_id: Set(team.id),
            user_id: Set(user.id),
            role: Set(role),
            joined_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await?;

        info!(
            "{} added to team '{}' as {:?}",
            user.username, team.name, role
        );
        Ok(AddMemberOutcome::Added(membership))
    }

    /// Remove a membership of the given team (global admin)
    pub async fn remove_member(
        &self,
        caller: &Caller,
        team_id: Uuid,
        membership_id: Uuid,
    ) -> BoardResult<team_member::Model> {
        lookup::require_admin(caller)?;
        let membership = team_membership(&self.db, team_id, membership_id).await?;

        membership.clone().delete(&self.db).await?;

        info!(
            "Membership {} removed from team {} by {}",
            membership.id,
            team_id,
            caller.username()
        );
        Ok(membership)
    }

    /// Change the team-scoped role of a membership (global admin)
    pub async fn change_member_role(
        &self,
        caller: &Caller,
        team_id: Uuid,
        membership_id: Uuid,
        role: TeamRole,
    ) -> BoardResult<team_member::Model> {
        lookup::require_admin(caller)?;
        let membership = team_membership(&self.db, team_id, membership_id).await?;

        if membership.role == role {
            return Ok(membership);
        }

        let mut active: team_member::ActiveModel = membership.into();
        active.role = Set(role);
        let membership = active.update(&self.db).await?;

        info!("Membership {} is now {:?}", membership.id, role);
        Ok(membership)
    }

    /// Members of a team with their usernames
    pub async fn list_members(
        &self,
        caller: &Caller,
        team_id: Uuid,
    ) -> BoardResult<Vec<MemberView>> {
        let team = lookup::team(&self.db, team_id).await?;
        lookup::require_view(&self.db, caller, team.id).await?;

        debug!("Listing members of team {}", team.id);
        member_views(&self.db, team.id).await
    }
}
