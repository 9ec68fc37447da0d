//! Team entity: the tenant that owns projects, status stages and labels

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use super::lifecycle::Lifecycle;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema), schema(as = Team))]
#[sea_orm(table_name = "teams")]
pub struct Model {
    /// Team UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Team name
    pub name: String,

    /// Free-form description
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// User who created the team
    pub created_by: Uuid,

    /// Active or soft-deleted
    pub lifecycle: Lifecycle,

    /// When the team was created
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = DateTime))]
    pub created_at: ChronoDateTimeUtc,

    /// When the team was last updated
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = DateTime))]
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Team was created by a user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Creator,

    /// Team has members
    #[sea_orm(has_many = "super::team_member::Entity")]
    Members,

    /// Team owns projects
    #[sea_orm(has_many = "super::project::Entity")]
    Projects,

    /// Team owns its workflow stages
    #[sea_orm(has_many = "super::status_stage::Entity")]
    StatusStages,

    /// Team owns labels
    #[sea_orm(has_many = "super::label::Entity")]
    Labels,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::team_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl Related<super::status_stage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatusStages.def()
    }
}

impl Related<super::label::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Labels.def()
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
