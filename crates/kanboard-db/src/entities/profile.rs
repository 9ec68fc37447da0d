//! Profile entity: global role and personal details attached to a user

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Global role of a user in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Administrator: may create teams and delete anything
    #[sea_orm(string_value = "admin")]
    Admin,

    /// Regular member
    #[sea_orm(string_value = "member")]
    Member,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema), schema(as = Profile))]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    /// Profile UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning user (one profile per user)
    #[sea_orm(unique)]
    pub user_id: Uuid,

    /// Global role
    pub role: UserRole,

    /// Short biography
    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,

    /// Phone number
    pub phone: Option<String>,

    /// Date of birth
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = Date))]
    pub birthdate: Option<Date>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
