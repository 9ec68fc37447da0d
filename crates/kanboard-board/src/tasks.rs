//! Task board
//!
//! Tasks sit in the stage columns of their project's team. The ordering key
//! (`position`) is appended as `max + 1` on create and set verbatim by
//! [`Board::move_task`]; siblings are never renumbered, so equal keys are
//! possible and only matter for display.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use kanboard_db::entities::{
    assignment, attachment, comment, label, project, status_stage, task, task_label, Priority,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;
#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::caller::Caller;
use crate::error::{BoardError, BoardResult};
use crate::lookup;
use crate::permissions::Action;
use crate::Board;

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct NewTask {
    /// Target column; the team's first stage when absent
    pub status_id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub label_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due_at: Option<DateTime<Utc>>,
    /// Remove the due date (wins over `due_at`)
    #[serde(default)]
    pub clear_due_at: bool,
    /// Replaces the whole label set when present
    pub label_ids: Option<Vec<Uuid>>,
}

/// A task as shown on the board
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BoardCard {
    pub task: task::Model,
    pub label_ids: Vec<Uuid>,
    pub assignee_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BoardColumn {
    pub stage: status_stage::Model,
    pub tasks: Vec<BoardCard>,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BoardView {
    pub project: project::Model,
    pub columns: Vec<BoardColumn>,
    /// Labels available in the project's team
    pub labels: Vec<label::Model>,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct TaskDetail {
    pub task: task::Model,
    pub project: project::Model,
    pub stage: status_stage::Model,
    pub labels: Vec<label::Model>,
    /// Oldest first
    pub comments: Vec<comment::Model>,
    /// Newest first
    pub attachments: Vec<attachment::Model>,
    pub assignment: Option<assignment::Model>,
}

/// Next free key at the end of a column: `max(position) + 1`, 1 when empty
async fn next_position<C: ConnectionTrait>(conn: &C, status_id: Uuid) -> BoardResult<i32> {
    let max = task::Entity::find()
        .select_only()
        .column_as(task::Column::Position.max(), "max_position")
        .filter(task::Column::StatusId.eq(status_id))
        .into_tuple::<Option<i32>>()
        .one(conn)
        .await?;
    Ok(max.flatten().unwrap_or(0) + 1)
}

/// Load and check a label set against the owning team
async fn team_label_ids<C: ConnectionTrait>(
    conn: &C,
    team_id: Uuid,
    label_ids: &[Uuid],
) -> BoardResult<Vec<Uuid>> {
    let mut seen = HashSet::new();
    let unique: Vec<Uuid> = label_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();
    if unique.is_empty() {
        return Ok(unique);
    }

    let labels = label::Entity::find()
        .filter(label::Column::Id.is_in(unique.clone()))
        .all(conn)
        .await?;
    if labels.len() != unique.len() || labels.iter().any(|l| l.team_id != team_id) {
        return Err(BoardError::invalid(
            "Labels must belong to the project's team",
        ));
    }
    Ok(unique)
}

async fn link_labels<C: ConnectionTrait>(
    conn: &C,
    task_id: Uuid,
    label_ids: &[Uuid],
) -> BoardResult<()> {
    if label_ids.is_empty() {
        return Ok(());
    }
    let links = label_ids.iter().map(|label_id| task_label::ActiveModel {
        task_id: Set(task_id),
        label_id: Set(*label_id),
    });
    task_label::Entity::insert_many(links)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

impl Board {
    /// Move a task to another column and ordering key.
    ///
    /// Checks, in order: task exists, stage exists, caller is a member of the
    /// project's team, caller may edit tasks. Only the moved row is written.
    pub async fn move_task(
        &self,
        caller: &Caller,
        task_id: Uuid,
        new_status_id: Uuid,
        new_order: i32,
    ) -> BoardResult<task::Model> {
        let (task, project) = lookup::task_with_project(&self.db, task_id).await?;
        let stage = lookup::stage(&self.db, new_status_id).await?;
        lookup::require_member(&self.db, caller, project.team_id).await?;
        lookup::require_global(
            caller,
            Action::EditTask,
            "You do not have permission to move tasks",
        )?;

        if stage.team_id != project.team_id {
            return Err(BoardError::invalid(
                "Status does not belong to the project's team",
            ));
        }
        if new_order < 0 {
            return Err(BoardError::invalid("Order must not be negative"));
        }

        let mut active: task::ActiveModel = task.into();
        active.status_id = Set(stage.id);
        active.position = Set(new_order);
        let task = active.update(&self.db).await?;

        info!(
            "Task {} moved to '{}' at {} by {}",
            task.id,
            stage.name,
            new_order,
            caller.username()
        );
        Ok(task)
    }

    /// Append a task at the end of a column of the project's board
    pub async fn create_task(
        &self,
        caller: &Caller,
        project_id: Uuid,
        new_task: NewTask,
    ) -> BoardResult<task::Model> {
        lookup::require_global(
            caller,
            Action::CreateTask,
            "You do not have permission to create tasks",
        )?;
        let project = lookup::project(&self.db, project_id).await?;
        lookup::require_member(&self.db, caller, project.team_id).await?;
        if !project.lifecycle.is_active() {
            return Err(BoardError::invalid("Project is inactive"));
        }

        let title = lookup::required_text(&new_task.title, "Title", 200)?;

        let stage = match new_task.status_id {
            Some(status_id) => {
                let stage = lookup::stage(&self.db, status_id).await?;
                if stage.team_id != project.team_id {
                    return Err(BoardError::invalid(
                        "Status does not belong to the project's team",
                    ));
                }
                stage
            }
            None => self
                .team_stages(project.team_id)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| BoardError::invalid("The team has no status stages"))?,
        };

        let label_ids = team_label_ids(&self.db, project.team_id, &new_task.label_ids).await?;

        let now = Utc::now();
        let txn = self.db.begin().await?;

        let position = next_position(&txn, stage.id).await?;
        let task = task::ActiveModel {
            id: Set(Uuid::new_v4()),
            project_id: Set(project.id),
            status_id: Set(stage.id),
            title: Set(title),
            description: Set(new_task.description.trim().to_string()),
            created_by: Set(caller.id()),
            created_at: Set(now),
            updated_at: Set(now),
            due_at: Set(new_task.due_at),
            priority: Set(new_task.priority),
            position: Set(position),
        }
        .insert(&txn)
        .await?;

        link_labels(&txn, task.id, &label_ids).await?;

        txn.commit().await?;

        info!(
            "Task '{}' created in project {} by {}",
            task.title,
            project.id,
            caller.username()
        );
        Ok(task)
    }

    /// Edit task fields and replace its labels
    pub async fn update_task(
        &self,
        caller: &Caller,
        task_id: Uuid,
        changes: TaskChanges,
    ) -> BoardResult<task::Model> {
        let (task, project) = lookup::task_with_project(&self.db, task_id).await?;
        lookup::require_member(&self.db, caller, project.team_id).await?;
        lookup::require_global(
            caller,
            Action::EditTask,
            "You do not have permission to edit tasks",
        )?;

        let label_ids = match &changes.label_ids {
            Some(ids) => Some(team_label_ids(&self.db, project.team_id, ids).await?),
            None => None,
        };

        let mut active: task::ActiveModel = task.into();
        if let Some(title) = changes.title {
            active.title = Set(lookup::required_text(&title, "Title", 200)?);
        }
        if let Some(description) = changes.description {
            active.description = Set(description.trim().to_string());
        }
        if let Some(priority) = changes.priority {
            active.priority = Set(priority);
        }
        if changes.clear_due_at {
            active.due_at = Set(None);
        } else if let Some(due_at) = changes.due_at {
            active.due_at = Set(Some(due_at));
        }
        active.updated_at = Set(Utc::now());

        let txn = self.db.begin().await?;
        let task = active.update(&txn).await?;
        if let Some(label_ids) = label_ids {
            task_label::Entity::delete_many()
                .filter(task_label::Column::TaskId.eq(task.id))
                .exec(&txn)
                .await?;
            link_labels(&txn, task.id, &label_ids).await?;
        }
        txn.commit().await?;

        info!("Task {} updated by {}", task.id, caller.username());
        Ok(task)
    }

    /// Columns of a project's board with their cards, ordered by
    /// (position asc, created_at desc)
    pub async fn board(&self, caller: &Caller, project_id: Uuid) -> BoardResult<BoardView> {
        let project = lookup::project(&self.db, project_id).await?;
        if !project.lifecycle.is_active() {
            return Err(BoardError::not_found("Project"));
        }
        lookup::require_view(&self.db, caller, project.team_id).await?;

        let stages = self.team_stages(project.team_id).await?;
        let labels = self.team_labels(project.team_id).await?;
        let tasks = task::Entity::find()
            .filter(task::Column::ProjectId.eq(project.id))
            .order_by_asc(task::Column::Position)
            .order_by_desc(task::Column::CreatedAt)
            .all(&self.db)
            .await?;
        let task_ids: Vec<Uuid> = tasks.iter().map(|t| t.id).collect();

        let mut labels_by_task: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        let mut assignee_by_task: HashMap<Uuid, Uuid> = HashMap::new();
        if !task_ids.is_empty() {
            for link in task_label::Entity::find()
                .filter(task_label::Column::TaskId.is_in(task_ids.clone()))
                .all(&self.db)
                .await?
            {
                labels_by_task
                    .entry(link.task_id)
                    .or_default()
                    .push(link.label_id);
            }
            for row in assignment::Entity::find()
                .filter(assignment::Column::TaskId.is_in(task_ids))
                .order_by_asc(assignment::Column::AssignedAt)
                .all(&self.db)
                .await?
            {
                assignee_by_task.insert(row.task_id, row.user_id);
            }
        }

        let mut cards_by_stage: HashMap<Uuid, Vec<BoardCard>> = HashMap::new();
        for task in tasks {
            let card = BoardCard {
                label_ids: labels_by_task.remove(&task.id).unwrap_or_default(),
                assignee_id: assignee_by_task.get(&task.id).copied(),
                task,
            };
            cards_by_stage
                .entry(card.task.status_id)
                .or_default()
                .push(card);
        }

        let columns = stages
            .into_iter()
            .map(|stage| BoardColumn {
                tasks: cards_by_stage.remove(&stage.id).unwrap_or_default(),
                stage,
            })
            .collect();

        debug!("Getting board of project: {}", project.id);
        Ok(BoardView {
            project,
            columns,
            labels,
        })
    }

    /// A task with its labels, comments, attachments and assignment
    pub async fn task_detail(&self, caller: &Caller, task_id: Uuid) -> BoardResult<TaskDetail> {
        let (task, project) = lookup::task_with_project(&self.db, task_id).await?;
        lookup::require_view(&self.db, caller, project.team_id).await?;

        let stage = lookup::stage(&self.db, task.status_id).await?;
        let labels = task
            .find_related(label::Entity)
            .order_by_asc(label::Column::Name)
            .all(&self.db)
            .await?;
        let comments = task
            .find_related(comment::Entity)
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await?;
        let attachments = task
            .find_related(attachment::Entity)
            .order_by_desc(attachment::Column::UploadedAt)
            .all(&self.db)
            .await?;
        let assignment = task
            .find_related(assignment::Entity)
            .order_by_desc(assignment::Column::AssignedAt)
            .one(&self.db)
            .await?;

        debug!("Getting task: {}", task.id);
        Ok(TaskDetail {
            task,
            project,
            stage,
            labels,
            comments,
            attachments,
            assignment,
        })
    }
}
