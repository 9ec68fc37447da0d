//! Collaboration records: comments, attachments and the task assignee

use chrono::Utc;
use kanboard_db::entities::{assignment, attachment, comment};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::caller::Caller;
use crate::error::{BoardError, BoardResult};
use crate::lookup;
use crate::permissions::Memberships;
use crate::Board;

/// Metadata of a file already stored in the blob store
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct NewAttachment {
    /// Reference returned by the blob store
    pub file_ref: String,
    pub original_name: String,
    pub size_bytes: i64,
    pub mime_type: Option<String>,
}

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

impl Board {
    /// Comment on a task (team member)
    pub async fn add_comment(
        &self,
        caller: &Caller,
        task_id: Uuid,
        content: &str,
    ) -> BoardResult<comment::Model> {
        let (task, project) = lookup::task_with_project(&self.db, task_id).await?;
        lookup::require_member(&self.db, caller, project.team_id).await?;

        let content = content.trim();
        if content.is_empty() {
            return Err(BoardError::invalid("Comment content is required"));
        }

        let now = Utc::now();
        let comment = comment::ActiveModel {
            id: Set(Uuid::new_v4()),
            task_id: Set(task.id),
            author_id: Set(caller.id()),
            content: Set(content.to_string()),
            created_at: Set(now),
            edited_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!("Comment added to task {} by {}", task.id, caller.username());
        Ok(comment)
    }

    /// Make `user_id` the only assignee of a task. Both the caller and the
    /// assignee must be members of the task's team.
    pub async fn assign_task(
        &self,
        caller: &Caller,
        task_id: Uuid,
        user_id: Uuid,
    ) -> BoardResult<assignment::Model> {
        let (task, project) = lookup::task_with_project(&self.db, task_id).await?;
        lookup::require_member(&self.db, caller, project.team_id).await?;

        let assignee = lookup::user(&self.db, user_id).await?;
        let assignee_memberships =
            Memberships::load_for_team(&self.db, assignee.id, project.team_id).await?;
        if assignee_memberships.role_in(project.team_id).is_none() {
            return Err(BoardError::denied(format!(
                "{} is not a member of this team",
                assignee.display_name()
            )));
        }

        let txn = self.db.begin().await?;

        assignment::Entity::delete_many()
            .filter(assignment::Column::TaskId.eq(task.id))
            .exec(&txn)
            .await?;

        let assignment = assignment::ActiveModel {
            id: Set(Uuid::new_v4()),
            task_id: Set(task.id),
            user_id: Set(assignee.id),
            assigned_by: Set(caller.id()),
            assigned_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(
            "Task {} assigned to {} by {}",
            task.id,
            assignee.username,
            caller.username()
        );
        Ok(assignment)
    }

    /// Drop every assignment of a task; returns how many were removed
    pub async fn unassign_task(&self, caller: &Caller, task_id: Uuid) -> BoardResult<u64> {
        let (task, project) = lookup::task_with_project(&self.db, task_id).await?;
        lookup::require_member(&self.db, caller, project.team_id).await?;

        let removed = assignment::Entity::delete_many()
            .filter(assignment::Column::TaskId.eq(task.id))
            .exec(&self.db)
            .await?
            .rows_affected;

        info!(
            "Task {} unassigned by {} ({} removed)",
            task.id,
            caller.username(),
            removed
        );
        Ok(removed)
    }

    /// Register an attachment for a task (team member)
    pub async fn add_attachment(
        &self,
        caller: &Caller,
        task_id: Uuid,
        new_attachment: NewAttachment,
    ) -> BoardResult<attachment::Model> {
        let (task, project) = lookup::task_with_project(&self.db, task_id).await?;
        lookup::require_member(&self.db, caller, project.team_id).await?;

        let file_ref = lookup::required_text(&new_attachment.file_ref, "File reference", 512)?;
        let original_name = lookup::required_text(&new_attachment.original_name, "File name", 255)?;
        if new_attachment.size_bytes < 0 {
            return Err(BoardError::invalid("File size must not be negative"));
        }
        let mime_type = new_attachment
            .mime_type
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());

        let attachment = attachment::ActiveModel {
            id: Set(Uuid::new_v4()),
            task_id: Set(task.id),
            uploaded_by: Set(caller.id()),
            file_ref: Set(file_ref),
            original_name: Set(original_name),
            size_bytes: Set(new_attachment.size_bytes),
            mime_type: Set(mime_type),
            uploaded_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await?;

        info!(
            "Attachment '{}' added to task {} by {}",
            attachment.original_name,
            task.id,
            caller.username()
        );
        Ok(attachment)
    }
}

