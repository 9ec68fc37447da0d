//! User entity: the account an identity provider subject maps to

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
#[cfg(feature = "openapi")]
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema), schema(as = User))]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// User UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Login name (unique)
    #[sea_orm(unique)]
    pub username: String,

    /// Contact email (optional)
    pub email: Option<String>,

    /// User's full name (optional)
    pub full_name: Option<String>,

    /// Whether the user account is active
    pub is_active: bool,

    /// When the user account was created
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = DateTime))]
    pub created_at: ChronoDateTimeUtc,

    /// When the account was last updated
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = DateTime))]
    pub updated_at: ChronoDateTimeUtc,
}

impl Model {
    /// Name to show in messages: full name when set, username otherwise
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.username,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// User has (at most) one profile
    #[sea_orm(has_one = "super::profile::Entity")]
    Profile,

    /// User is a member of teams
    #[sea_orm(has_many = "super::team_member::Entity")]
    TeamMemberships,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl Related<super::team_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TeamMemberships.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        self.updated_at = sea_orm::Set(chrono::Utc::now());
        Ok(self)
    }
}
