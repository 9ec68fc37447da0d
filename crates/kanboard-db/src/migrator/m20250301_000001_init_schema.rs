//! Initial schema: accounts, teams, workflow stages, projects and tasks

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // 1. users + profiles
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(uuid(User::Id).primary_key())
                    .col(string_len(User::Username, 150).not_null().unique_key())
                    .col(string_len_null(User::Email, 255))
                    .col(string_len_null(User::FullName, 255))
                    .col(boolean(User::IsActive).not_null().default(true))
                    .col(
                        timestamp_with_time_zone(User::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(User::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Profile::Table)
                    .if_not_exists()
                    .col(uuid(Profile::Id).primary_key())
                    .col(uuid(Profile::UserId).not_null().unique_key())
                    .col(
                        string_len(Profile::Role, 20)
                            .not_null()
                            .default("member"),
                    )
                    .col(ColumnDef::new(Profile::Bio).text().null())
                    .col(string_len_null(Profile::Phone, 20))
                    .col(ColumnDef::new(Profile::Birthdate).date().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profiles_user_id")
                            .from(Profile::Table, Profile::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 2. teams + team_members
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Team::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Team::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Team::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Team::Description).text())
                    .col(ColumnDef::new(Team::CreatedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(Team::Lifecycle)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Team::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Team::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teams_created_by")
                            .from(Team::Table, Team::CreatedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_teams_name")
                    .table(Team::Table)
                    .col(Team::Name)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TeamMember::Table)
                    .if_not_exists()
                    .col(uuid(TeamMember::Id).primary_key())
                    .col(uuid(TeamMember::TeamId).not_null())
                    .col(uuid(TeamMember::UserId).not_null())
                    .col(
                        string_len(TeamMember::Role, 20)
                            .not_null()
                            .default("member"),
                    )
                    .col(
                        timestamp_with_time_zone(TeamMember::JoinedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_team_members_team_id")
                            .from(TeamMember::Table, TeamMember::TeamId)
                            .to(Team::Table, Team::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_team_members_user_id")
                            .from(TeamMember::Table, TeamMember::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_team_members_team_user")
                    .table(TeamMember::Table)
                    .col(TeamMember::TeamId)
                    .col(TeamMember::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_team_members_user_id")
                    .table(TeamMember::Table)
                    .col(TeamMember::UserId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 3. status_stages + labels (team-scoped)
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(StatusStage::Table)
                    .if_not_exists()
                    .col(uuid(StatusStage::Id).primary_key())
                    .col(uuid(StatusStage::TeamId).not_null())
                    .col(string_len(StatusStage::Name, 50).not_null())
                    .col(
                        string_len(StatusStage::Color, 7)
                            .not_null()
                            .default("#007bff"),
                    )
                    .col(integer(StatusStage::Position).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_status_stages_team_id")
                            .from(StatusStage::Table, StatusStage::TeamId)
                            .to(Team::Table, Team::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_status_stages_team_name")
                    .table(StatusStage::Table)
                    .col(StatusStage::TeamId)
                    .col(StatusStage::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Label::Table)
                    .if_not_exists()
                    .col(uuid(Label::Id).primary_key())
                    .col(uuid(Label::TeamId).not_null())
                    .col(string_len(Label::Name, 50).not_null())
                    .col(string_len(Label::Color, 7).not_null().default("#6c757d"))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_labels_team_id")
                            .from(Label::Table, Label::TeamId)
                            .to(Team::Table, Team::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_labels_team_name")
                    .table(Label::Table)
                    .col(Label::TeamId)
                    .col(Label::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 4. projects
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Project::Table)
                    .if_not_exists()
                    .col(uuid(Project::Id).primary_key())
                    .col(uuid(Project::TeamId).not_null())
                    .col(string_len(Project::Title, 200).not_null())
                    .col(ColumnDef::new(Project::Description).text().not_null())
                    .col(uuid(Project::CreatedBy).not_null())
                    .col(
                        timestamp_with_time_zone(Project::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Project::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Project::StartDate).date().not_null())
                    .col(ColumnDef::new(Project::EndDate).date().not_null())
                    .col(
                        string_len(Project::Priority, 10)
                            .not_null()
                            .default("media"),
                    )
                    .col(
                        string_len(Project::Lifecycle, 16)
                            .not_null()
                            .default("active"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_projects_team_id")
                            .from(Project::Table, Project::TeamId)
                            .to(Team::Table, Team::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_projects_created_by")
                            .from(Project::Table, Project::CreatedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_projects_team_id")
                    .table(Project::Table)
                    .col(Project::TeamId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 5. tasks + task_labels
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Task::Table)
                    .if_not_exists()
                    .col(uuid(Task::Id).primary_key())
                    .col(uuid(Task::ProjectId).not_null())
                    .col(uuid(Task::StatusId).not_null())
                    .col(string_len(Task::Title, 200).not_null())
                    .col(ColumnDef::new(Task::Description).text().not_null())
                    .col(uuid(Task::CreatedBy).not_null())
                    .col(
                        timestamp_with_time_zone(Task::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Task::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(timestamp_with_time_zone_null(Task::DueAt))
                    .col(string_len(Task::Priority, 10).not_null().default("media"))
                    .col(integer(Task::Position).not_null().default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_project_id")
                            .from(Task::Table, Task::ProjectId)
                            .to(Project::Table, Project::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_status_id")
                            .from(Task::Table, Task::StatusId)
                            .to(StatusStage::Table, StatusStage::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_created_by")
                            .from(Task::Table, Task::CreatedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tasks_project_status")
                    .table(Task::Table)
                    .col(Task::ProjectId)
                    .col(Task::StatusId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TaskLabel::Table)
                    .if_not_exists()
                    .col(uuid(TaskLabel::TaskId).not_null())
                    .col(uuid(TaskLabel::LabelId).not_null())
                    .primary_key(
                        Index::create()
                            .col(TaskLabel::TaskId)
                            .col(TaskLabel::LabelId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_labels_task_id")
                            .from(TaskLabel::Table, TaskLabel::TaskId)
                            .to(Task::Table, Task::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_labels_label_id")
                            .from(TaskLabel::Table, TaskLabel::LabelId)
                            .to(Label::Table, Label::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 6. collaboration records: assignments, comments, attachments
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Assignment::Table)
                    .if_not_exists()
                    .col(uuid(Assignment::Id).primary_key())
                    .col(uuid(Assignment::TaskId).not_null())
                    .col(uuid(Assignment::UserId).not_null())
                    .col(uuid(Assignment::AssignedBy).not_null())
                    .col(
                        timestamp_with_time_zone(Assignment::AssignedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_assignments_task_id")
                            .from(Assignment::Table, Assignment::TaskId)
                            .to(Task::Table, Task::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_assignments_user_id")
                            .from(Assignment::Table, Assignment::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_assignments_assigned_by")
                            .from(Assignment::Table, Assignment::AssignedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_assignments_task_user")
                    .table(Assignment::Table)
                    .col(Assignment::TaskId)
                    .col(Assignment::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Comment::Table)
                    .if_not_exists()
                    .col(uuid(Comment::Id).primary_key())
                    .col(uuid(Comment::TaskId).not_null())
                    .col(uuid(Comment::AuthorId).not_null())
                    .col(ColumnDef::new(Comment::Content).text().not_null())
                    .col(
                        timestamp_with_time_zone(Comment::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Comment::EditedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_task_id")
                            .from(Comment::Table, Comment::TaskId)
                            .to(Task::Table, Task::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_author_id")
                            .from(Comment::Table, Comment::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Attachment::Table)
                    .if_not_exists()
                    .col(uuid(Attachment::Id).primary_key())
                    .col(uuid(Attachment::TaskId).not_null())
                    .col(uuid(Attachment::UploadedBy).not_null())
                    .col(string_len(Attachment::FileRef, 512).not_null())
                    .col(string_len(Attachment::OriginalName, 255).not_null())
                    .col(big_integer(Attachment::SizeBytes).not_null().default(0))
                    .col(string_len(Attachment::MimeType, 100).not_null())
                    .col(
                        timestamp_with_time_zone(Attachment::UploadedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attachments_task_id")
                            .from(Attachment::Table, Attachment::TaskId)
                            .to(Task::Table, Task::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attachments_uploaded_by")
                            .from(Attachment::Table, Attachment::UploadedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order (respecting foreign keys)
        manager
            .drop_table(Table::drop().table(Attachment::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Comment::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Assignment::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(TaskLabel::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Task::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Project::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Label::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(StatusStage::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(TeamMember::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Team::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Profile::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await?;

        Ok(())
    }
}

// ============================================================
// Table identifiers
// ============================================================

#[derive(DeriveIden)]
enum User {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Username,
    Email,
    FullName,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Profile {
    #[sea_orm(iden = "profiles")]
    Table,
    Id,
    UserId,
    Role,
    Bio,
    Phone,
    Birthdate,
}

#[derive(DeriveIden)]
enum Team {
    #[sea_orm(iden = "teams")]
    Table,
    Id,
    Name,
    Description,
    CreatedBy,
    Lifecycle,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TeamMember {
    #[sea_orm(iden = "team_members")]
    Table,
    Id,
    TeamId,
    UserId,
    Role,
    JoinedAt,
}

#[derive(DeriveIden)]
enum StatusStage {
    #[sea_orm(iden = "status_stages")]
    Table,
    Id,
    TeamId,
    Name,
    Color,
    Position,
}

#[derive(DeriveIden)]
enum Label {
    #[sea_orm(iden = "labels")]
    Table,
    Id,
    TeamId,
    Name,
    Color,
}

#[derive(DeriveIden)]
enum Project {
    #[sea_orm(iden = "projects")]
    Table,
    Id,
    TeamId,
    Title,
    Description,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
    StartDate,
    EndDate,
    Priority,
    Lifecycle,
}

#[derive(DeriveIden)]
enum Task {
    #[sea_orm(iden = "tasks")]
    Table,
    Id,
    ProjectId,
    StatusId,
    Title,
    Description,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
    DueAt,
    Priority,
    Position,
}

#[derive(DeriveIden)]
enum TaskLabel {
    #[sea_orm(iden = "task_labels")]
    Table,
    TaskId,
    LabelId,
}

#[derive(DeriveIden)]
enum Assignment {
    #[sea_orm(iden = "assignments")]
    Table,
    Id,
    TaskId,
    UserId,
    AssignedBy,
    AssignedAt,
}

#[derive(DeriveIden)]
enum Comment {
    #[sea_orm(iden = "comments")]
    Table,
    Id,
    TaskId,
    AuthorId,
    Content,
    CreatedAt,
    EditedAt,
}

#[derive(DeriveIden)]
enum Attachment {
    #[sea_orm(iden = "attachments")]
    Table,
    Id,
    TaskId,
    UploadedBy,
    FileRef,
    OriginalName,
    SizeBytes,
    MimeType,
    UploadedAt,
}
