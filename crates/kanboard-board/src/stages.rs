//! Status pipeline: the ordered workflow columns of a team

use kanboard_db::entities::status_stage;
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
pub struct NewStage {
    pub name: String,
    pub color: String,
    pub position: i32,
}

impl Board {
    /// Stages of a team in column order
    pub(crate) async fn team_stages(&self, team_id: Uuid) -> BoardResult<Vec<status_stage::Model>> {
        Ok(status_stage::Entity::find()
            .filter(status_stage::Column::TeamId.eq(team_id))
            .order_by_asc(status_stage::Column::Position)
            .order_by_asc(status_stage::Column::Name)
            .all(&self.db)
            .await?)
    }

    pub async fn list_stages(
        &self,
        caller: &Caller,
        team_id: Uuid,
    ) -> BoardResult<Vec<status_stage::Model>> {
        let team = lookup::team(&self.db, team_id).await?;
        lookup::require_view(&self.db, caller, team.id).await?;

        debug!("Listing stages of team {}", team.id);
        self.team_stages(team.id).await
    }

    /// Add a workflow column (team admin)
    pub async fn create_stage(
        &self,
        caller: &Caller,
        team_id: Uuid,
        stage: NewStage,
    ) -> BoardResult<status_stage::Model> {
        let team = lookup::team(&self.db, team_id).await?;
        lookup::require_team_admin(
            &self.db,
            caller,
            team.id,
            "Only team admins can add status stages",
        )
        .await?;
        if !team.lifecycle.is_active() {
            return Err(BoardError::invalid("Team is inactive"));
        }

        let name = lookup::required_text(&stage.name, "Stage name", 50)?;
        lookup::validate_color(&stage.color)?;
        if stage.position < 1 {
            return Err(BoardError::invalid("Stage order must be at least 1"));
        }

        let duplicate = status_stage::Entity::find()
            .filter(status_stage::Column::TeamId.eq(team.id))
            .filter(status_stage::Column::Name.eq(&name))
            .one(&self.db)
            .await?
            .is_some();
        if duplicate {
            return Err(BoardError::Conflict(format!(
                "Stage '{name}' already exists in this team"
            )));
        }

        let stage = status_stage::ActiveModel {
            id: Set(Uuid::new_v4()),
            team_id: Set(team.id),
            name: Set(name),
            color: Set(stage.color),
            position: Set(stage.position),
        }
        .insert(&self.db)
        .await?;

        info!("Stage '{}' added to team {}", stage.name, team.id);
        Ok(stage)
    }
}
