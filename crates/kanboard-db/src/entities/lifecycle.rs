//! Lifecycle state shared by soft-deletable records (teams, projects)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Soft-delete state. Deactivation never cascades to child rows, so every
/// read path has to filter on the parent's lifecycle explicitly.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    #[sea_orm(string_value = "active")]
    Active,

    #[sea_orm(string_value = "inactive")]
    Inactive,
}

impl Lifecycle {
    pub fn is_active(self) -> bool {
        self == Lifecycle::Active
    }

    /// The opposite state
    pub fn toggled(self) -> Self {
        match self {
            Lifecycle::Active => Lifecycle::Inactive,
            Lifecycle::Inactive => Lifecycle::Active,
        }
    }
}
