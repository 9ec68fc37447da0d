//! Task entity: a card on a project's board

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use super::project::Priority;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema), schema(as = Task))]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    /// Task UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning project
    pub project_id: Uuid,

    /// Current stage; always a stage of the project's team
    pub status_id: Uuid,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub created_by: Uuid,

    #[cfg_attr(feature = "openapi", schema(value_type = String, format = DateTime))]
    pub created_at: ChronoDateTimeUtc,

    #[cfg_attr(feature = "openapi", schema(value_type = String, format = DateTime))]
    pub updated_at: ChronoDateTimeUtc,

    /// Optional deadline
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = DateTime))]
    pub due_at: Option<ChronoDateTimeUtc>,

    pub priority: Priority,

    /// Ordering key inside the stage column. Not unique: equal keys are a
    /// display concern.
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Project,

    #[sea_orm(
        belongs_to = "super::status_stage::Entity",
        from = "Column::StatusId",
        to = "super::status_stage::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Status,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Creator,

    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,

    #[sea_orm(has_many = "super::attachment::Entity")]
    Attachments,

    #[sea_orm(has_many = "super::assignment::Entity")]
    Assignments,

    #[sea_orm(has_many = "super::task_label::Entity")]
    TaskLabels,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::status_stage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Status.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl Related<super::attachment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attachments.def()
    }
}

impl Related<super::assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl Related<super::task_label::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TaskLabels.def()
    }
}

impl Related<super::label::Entity> for Entity {
    fn to() -> RelationDef {
        super::task_label::Relation::Label.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::task_label::Relation::Task.def().rev())
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
