//! Project entity, owned by a team

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use super::lifecycle::Lifecycle;

/// Priority shared by projects and tasks
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum Priority {
    #[sea_orm(string_value = "baixa")]
    #[serde(rename = "baixa")]
    Low,

    #[default]
    #[sea_orm(string_value = "media")]
    #[serde(rename = "media")]
    Medium,

    #[sea_orm(string_value = "alta")]
    #[serde(rename = "alta")]
    High,

    #[sea_orm(string_value = "urgente")]
    #[serde(rename = "urgente")]
    Urgent,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema), schema(as = Project))]
#[sea_orm(table_name = "projects")]
pub struct Model {
    /// Project UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning team
    pub team_id: Uuid,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// User who created the project
    pub created_by: Uuid,

    #[cfg_attr(feature = "openapi", schema(value_type = String, format = DateTime))]
    pub created_at: ChronoDateTimeUtc,

    #[cfg_attr(feature = "openapi", schema(value_type = String, format = DateTime))]
    pub updated_at: ChronoDateTimeUtc,

    #[cfg_attr(feature = "openapi", schema(value_type = String, format = Date))]
    pub start_date: Date,

    #[cfg_attr(feature = "openapi", schema(value_type = String, format = Date))]
    pub end_date: Date,

    pub priority: Priority,

    /// Active or soft-deleted
    pub lifecycle: Lifecycle,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::team::Entity",
        from = "Column::TeamId",
        to = "super::team::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Team,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Creator,

    #[sea_orm(has_many = "super::task::Entity")]
    Tasks,
}

impl Related<super::team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl Related<super::task::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tasks.def()
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
