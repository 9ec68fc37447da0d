//! Authorization gate
//!
//! Two layers of checks:
//! - global role predicates, a function of the caller's profile role only
//! - team-scoped predicates, a function of the caller's membership rows
//!
//! A global admin does not bypass team-scoped checks. Every predicate denies
//! when the caller has no profile, and none of them can fail.

use kanboard_db::entities::{profile, team_member, TeamRole, UserRole};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::caller::Caller;

/// Actions gated by the caller's global role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateTeam,
    CreateProject,
    CreateTask,
    EditTask,
    DeleteTask,
    DeleteProject,
    DeleteTeam,
}

impl Action {
    pub fn allows(self, role: UserRole) -> bool {
        match self {
            Action::CreateProject | Action::CreateTask | Action::EditTask => {
                matches!(role, UserRole::Admin | UserRole::Member)
            }
            Action::CreateTeam | Action::DeleteTask | Action::DeleteProject | Action::DeleteTeam => {
                role == UserRole::Admin
            }
        }
    }
}

/// Global role check
pub fn can(profile: Option<&profile::Model>, action: Action) -> bool {
    profile.is_some_and(|p| action.allows(p.role))
}

/// Membership rows of one caller
#[derive(Debug, Clone, Default)]
pub struct Memberships {
    rows: Vec<team_member::Model>,
}

impl Memberships {
    pub fn new(rows: Vec<team_member::Model>) -> Self {
        Self { rows }
    }

    /// Load every membership of `user_id`
    pub async fn load<C>(conn: &C, user_id: Uuid) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let rows = team_member::Entity::find()
            .filter(team_member::Column::UserId.eq(user_id))
            .all(conn)
            .await?;
        Ok(Self { rows })
    }

    /// Load the membership of `user_id` in one team (zero or one row)
    pub async fn load_for_team<C>(conn: &C, user_id: Uuid, team_id: Uuid) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let rows = team_member::Entity::find()
            .filter(team_member::Column::UserId.eq(user_id))
            .filter(team_member::Column::TeamId.eq(team_id))
            .all(conn)
            .await?;
        Ok(Self { rows })
    }

    pub fn role_in(&self, team_id: Uuid) -> Option<TeamRole> {
        self.rows
            .iter()
            .find(|m| m.team_id == team_id)
            .map(|m| m.role)
    }

    pub fn team_ids(&self) -> Vec<Uuid> {
        self.rows.iter().map(|m| m.team_id).collect()
    }
}

/// Caller holds a membership (any role) in the team
pub fn is_team_member(caller: &Caller, memberships: &Memberships, team_id: Uuid) -> bool {
    caller.profile.is_some() && memberships.role_in(team_id).is_some()
}

/// Caller holds a team-admin membership in the team
pub fn is_team_admin(caller: &Caller, memberships: &Memberships, team_id: Uuid) -> bool {
    caller.profile.is_some() && memberships.role_in(team_id) == Some(TeamRole::Admin)
}

/// Team members and global admins may read a team's data
pub fn can_view_team(caller: &Caller, memberships: &Memberships, team_id: Uuid) -> bool {
    is_team_member(caller, memberships, team_id) || caller.is_admin()
}
