//! Team labels

use kanboard_db::entities::label;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;
#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::caller::Caller;
use crate::error::{BoardError, BoardResult};
use crate::lookup;
use crate::Board;

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct NewLabel {
    pub name: String,
    pub color: String,
}

impl Board {
    pub(crate) async fn team_labels(&self, team_id: Uuid) -> BoardResult<Vec<label::Model>> {
        Ok(label::Entity::find()
            .filter(label::Column::TeamId.eq(team_id))
            .order_by_asc(label::Column::Name)
            .all(&self.db)
            .await?)
    }

    pub async fn list_labels(
        &self,
        caller: &Caller,
        team_id: Uuid,
    ) -> BoardResult<Vec<label::Model>> {
        let team = lookup::team(&self.db, team_id).await?;
        lookup::require_view(&self.db, caller, team.id).await?;

        debug!("Listing labels of team {}", team.id);
        self.team_labels(team.id).await
    }

    /// Add a label (any team member)
    pub async fn create_label(
        &self,
        caller: &Caller,
        team_id: Uuid,
        new_label: NewLabel,
    ) -> BoardResult<label::Model> {
        let team = lookup::team(&self.db, team_id).await?;
        lookup::require_member(&self.db, caller, team.id).await?;
        if !team.lifecycle.is_active() {
            return Err(BoardError::invalid("Team is inactive"));
        }

        let name = lookup::required_text(&new_label.name, "Label name", 50)?;
        lookup::validate_color(&new_label.color)?;

        let duplicate = label::Entity::find()
            .filter(label::Column::TeamId.eq(team.id))
            .filter(label::Column::Name.eq(&name))
            .one(&self.db)
            .await?
            .is_some();
        if duplicate {
            return Err(BoardError::Conflict(format!(
                "Label '{name}' already exists in this team"
            )));
        }

        let label = label::ActiveModel {
            id: Set(Uuid::new_v4()),
            team_id: Set(team.id),
            name: Set(name),
            color: Set(new_label.color),
        }
        .insert(&self.db)
        .await?;

        info!("Label '{}' added to team {}", label.name, team.id);
        Ok(label)
    }
}
