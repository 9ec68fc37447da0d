//! Integration tests for projects, tasks, collaboration records, users and
//! the dashboard

use chrono::{Duration, NaiveDate, Utc};
use kanboard_auth::Identity;
use kanboard_board::{
    collab::NewAttachment,
    labels::NewLabel,
    projects::{NewProject, ProjectFilter},
    stages::NewStage,
    tasks::{NewTask, TaskChanges},
    teams::TeamChanges,
    users::{NewUser, ProfileChanges, UserChanges},
    Board, BoardConfig, BoardError, Caller,
};
use kanboard_db::entities::{status_stage, Priority, TeamRole, UserRole};
use kanboard_db::{connect, migrate};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

async fn setup() -> Board {
    let db = connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    migrate(&db).await.expect("Failed to run migrations");
    Board::new(db, BoardConfig::default())
}

async fn register(board: &Board, username: &str, role: UserRole) -> Caller {
    board
        .register_user(NewUser::named(username), role)
        .await
        .expect("Failed to register user")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_project(title: &str) -> NewProject {
    NewProject {
        title: title.to_string(),
        description: "desc".to_string(),
        start_date: date(2025, 1, 1),
        end_date: date(2025, 6, 30),
        priority: Priority::Medium,
    }
}

fn new_task(title: &str, status_id: Option<Uuid>) -> NewTask {
    NewTask {
        status_id,
        title: title.to_string(),
        description: String::new(),
        due_at: None,
        priority: Priority::Medium,
        label_ids: Vec::new(),
    }
}

async fn stage_named(board: &Board, team_id: Uuid, name: &str) -> status_stage::Model {
    status_stage::Entity::find()
        .filter(status_stage::Column::TeamId.eq(team_id))
        .filter(status_stage::Column::Name.eq(name))
        .one(board.db())
        .await
        .unwrap()
        .expect("Stage not found")
}

/// Admin-owned team with `member` enrolled as a team member, plus one project
async fn team_with_member(
    board: &Board,
    admin: &Caller,
    member: &Caller,
) -> (Uuid, Uuid) {
    let team = board.create_team(admin, "Core", None).await.unwrap();
    board
        .add_member(admin, team.id, member.id(), TeamRole::Member)
        .await
        .unwrap();
    let project = board
        .create_project(admin, Some(team.id), new_project("Launch"))
        .await
        .unwrap();
    (team.id, project.id)
}

// ==================== Projects ====================

#[tokio::test]
async fn test_create_project_falls_back_to_first_team_by_name() {
    let board = setup().await;
    let admin = register(&board, "admin", UserRole::Admin).await;
    let zeta = board.create_team(&admin, "Zeta", None).await.unwrap();
    let alpha = board.create_team(&admin, "Alpha", None).await.unwrap();

    let project = board
        .create_project(&admin, None, new_project("Default team"))
        .await
        .unwrap();

    assert_eq!(project.team_id, alpha.id);
    assert_ne!(project.team_id, zeta.id);
}

#[tokio::test]
async fn test_create_project_without_any_team_fails() {
    let board = setup().await;
    let loner = register(&board, "loner", UserRole::Member).await;

    let result = board.create_project(&loner, None, new_project("Orphan")).await;
    assert!(matches!(result, Err(BoardError::NoTeamMembership)));
    assert!(board
        .list_projects(&loner, ProjectFilter::default())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_create_project_validates_input_and_membership() {
    let board = setup().await;
    let admin = register(&board, "admin", UserRole::Admin).await;
    let outsider = register(&board, "outsider", UserRole::Member).await;
    let team = board.create_team(&admin, "Core", None).await.unwrap();

    let mut backwards = new_project("Backwards");
    backwards.end_date = date(2024, 12, 31);
    assert!(matches!(
        board.create_project(&admin, Some(team.id), backwards).await,
        Err(BoardError::Validation(_))
    ));
    assert!(matches!(
        board
            .create_project(&admin, Some(team.id), new_project("  "))
            .await,
        Err(BoardError::Validation(_))
    ));
    assert!(matches!(
        board
            .create_project(&outsider, Some(team.id), new_project("Sneaky"))
            .await,
        Err(BoardError::PermissionDenied(_))
    ));
    assert!(matches!(
        board
            .create_project(&admin, Some(Uuid::new_v4()), new_project("Nowhere"))
            .await,
        Err(BoardError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_list_projects_title_filter_ignores_case_and_wildcards() {
    let board = setup().await;
    let admin = register(&board, "admin", UserRole::Admin).await;
    let team = board.create_team(&admin, "Core", None).await.unwrap();
    for title in ["Website", "WEB api", "100% done"] {
        board
            .create_project(&admin, Some(team.id), new_project(title))
            .await
            .unwrap();
    }

    let titled = |title: &str| ProjectFilter {
        title: Some(title.to_string()),
        ..Default::default()
    };

    let web = board.list_projects(&admin, titled("wEb")).await.unwrap();
    assert_eq!(web.len(), 2);

    let percent = board.list_projects(&admin, titled("%")).await.unwrap();
    assert_eq!(percent.len(), 1);
    assert_eq!(percent[0].title, "100% done");

    assert!(board
        .list_projects(&admin, titled("_"))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_deactivate_project_requires_team_admin() {
    let board = setup().await;
    let admin = register(&board, "admin", UserRole::Admin).await;
    let member = register(&board, "bruno", UserRole::Member).await;
    let (_, project_id) = team_with_member(&board, &admin, &member).await;

    assert!(matches!(
        board.deactivate_project(&member, project_id).await,
        Err(BoardError::PermissionDenied(_))
    ));

    board.deactivate_project(&admin, project_id).await.unwrap();
    assert!(matches!(
        board.project_detail(&admin, project_id).await,
        Err(BoardError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_list_projects_filters() {
    let board = setup().await;
    let admin = register(&board, "admin", UserRole::Admin).await;
    let team = board.create_team(&admin, "Core", None).await.unwrap();

    let mut urgent = new_project("Urgent fix");
    urgent.priority = Priority::Urgent;
    urgent.start_date = date(2025, 3, 1);
    urgent.end_date = date(2025, 3, 31);
    board
        .create_project(&admin, Some(team.id), urgent)
        .await
        .unwrap();
    board
        .create_project(&admin, Some(team.id), new_project("Website"))
        .await
        .unwrap();
    let retired = board
        .create_project(&admin, Some(team.id), new_project("Retired site"))
        .await
        .unwrap();
    board.deactivate_project(&admin, retired.id).await.unwrap();

    let all = board
        .list_projects(&admin, ProjectFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let by_priority = board
        .list_projects(
            &admin,
            ProjectFilter {
                priority: Some(Priority::Urgent),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_priority.len(), 1);
    assert_eq!(by_priority[0].title, "Urgent fix");

    let by_title = board
        .list_projects(
            &admin,
            ProjectFilter {
                title: Some("site".to_string()),
                include_inactive: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_title.len(), 2);

    let by_start = board
        .list_projects(
            &admin,
            ProjectFilter {
                start_from: Some(date(2025, 2, 1)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_start.len(), 1);

    let other_team = board
        .list_projects(
            &admin,
            ProjectFilter {
                team_id: Some(Uuid::new_v4()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(other_team.is_empty());
}

#[tokio::test]
async fn test_project_detail_counts_tasks_per_stage() {
    let board = setup().await;
    let admin = register(&board, "admin", UserRole::Admin).await;
    let member = register(&board, "bruno", UserRole::Member).await;
    let (team_id, project_id) = team_with_member(&board, &admin, &member).await;
    let done = stage_named(&board, team_id, "Concluído").await;

    board
        .create_task(&admin, project_id, new_task("a", None))
        .await
        .unwrap();
    board
        .create_task(&admin, project_id, new_task("b", None))
        .await
        .unwrap();
    board
        .create_task(&member, project_id, new_task("c", Some(done.id)))
        .await
        .unwrap();

    let detail = board.project_detail(&member, project_id).await.unwrap();
    let counts: Vec<(String, u64)> = detail
        .status_stats
        .iter()
        .map(|s| (s.stage.name.clone(), s.task_count))
        .collect();
    assert_eq!(
        counts,
        vec![
            ("A Fazer".to_string(), 2),
            ("Em Andamento".to_string(), 0),
            ("Em Revisão".to_string(), 0),
            ("Concluído".to_string(), 1),
        ]
    );
}

// ==================== Teams, stages and labels ====================

#[tokio::test]
async fn test_team_detail_and_update() {
    let board = setup().await;
    let admin = register(&board, "admin", UserRole::Admin).await;
    let member = register(&board, "bruno", UserRole::Member).await;
    let outsider = register(&board, "outsider", UserRole::Member).await;
    let (team_id, _) = team_with_member(&board, &admin, &member).await;

    let detail = board.team_detail(&member, team_id).await.unwrap();
    assert_eq!(detail.members.len(), 2);
    assert_eq!(detail.projects.len(), 1);
    assert_eq!(detail.stages.len(), 4);

    assert!(matches!(
        board.team_detail(&outsider, team_id).await,
        Err(BoardError::PermissionDenied(_))
    ));
    assert!(matches!(
        board
            .update_team(
                &member,
                team_id,
                TeamChanges {
                    name: Some("Mine".to_string()),
                    description: None,
                },
            )
            .await,
        Err(BoardError::PermissionDenied(_))
    ));

    let renamed = board
        .update_team(
            &admin,
            team_id,
            TeamChanges {
                name: Some("Core Platform".to_string()),
                description: Some("Shared services".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Core Platform");
    assert_eq!(renamed.description.as_deref(), Some("Shared services"));
}

#[tokio::test]
async fn test_stage_creation_rules() {
    let board = setup().await;
    let admin = register(&board, "admin", UserRole::Admin).await;
    let member = register(&board, "bruno", UserRole::Member).await;
    let (team_id, _) = team_with_member(&board, &admin, &member).await;

    let stage = |name: &str, color: &str, position: i32| NewStage {
        name: name.to_string(),
        color: color.to_string(),
        position,
    };

    assert!(matches!(
        board
            .create_stage(&member, team_id, stage("Blocked", "#dc3545", 5))
            .await,
        Err(BoardError::PermissionDenied(_))
    ));
    assert!(matches!(
        board
            .create_stage(&admin, team_id, stage("Blocked", "red", 5))
            .await,
        Err(BoardError::Validation(_))
    ));
    assert!(matches!(
        board
            .create_stage(&admin, team_id, stage("Blocked", "#dc3545", 0))
            .await,
        Err(BoardError::Validation(_))
    ));
    assert!(matches!(
        board
            .create_stage(&admin, team_id, stage("A Fazer", "#dc3545", 5))
            .await,
        Err(BoardError::Conflict(_))
    ));

    let created = board
        .create_stage(&admin, team_id, stage("Blocked", "#dc3545", 5))
        .await
        .unwrap();
    let stages = board.list_stages(&member, team_id).await.unwrap();
    assert_eq!(stages.last().map(|s| s.id), Some(created.id));
}

#[tokio::test]
async fn test_labels_are_team_scoped() {
    let board = setup().await;
    let admin = register(&board, "admin", UserRole::Admin).await;
    let member = register(&board, "bruno", UserRole::Member).await;
    let (team_id, project_id) = team_with_member(&board, &admin, &member).await;
    let other_team = board.create_team(&admin, "Other", None).await.unwrap();

    let bug = board
        .create_label(
            &member,
            team_id,
            NewLabel {
                name: "bug".to_string(),
                color: "#dc3545".to_string(),
            },
        )
        .await
        .unwrap();
    let foreign = board
        .create_label(
            &admin,
            other_team.id,
            NewLabel {
                name: "bug".to_string(),
                color: "#dc3545".to_string(),
            },
        )
        .await
        .unwrap();
    assert!(matches!(
        board
            .create_label(
                &member,
                team_id,
                NewLabel {
                    name: "bug".to_string(),
                    color: "#000000".to_string(),
                },
            )
            .await,
        Err(BoardError::Conflict(_))
    ));

    let mut with_foreign = new_task("Mixed", None);
    with_foreign.label_ids = vec![bug.id, foreign.id];
    assert!(matches!(
        board.create_task(&member, project_id, with_foreign).await,
        Err(BoardError::Validation(_))
    ));

    let mut labelled = new_task("Labelled", None);
    labelled.label_ids = vec![bug.id, bug.id];
    let task = board
        .create_task(&member, project_id, labelled)
        .await
        .unwrap();
    let detail = board.task_detail(&member, task.id).await.unwrap();
    assert_eq!(
        detail.labels.iter().map(|l| l.id).collect::<Vec<_>>(),
        vec![bug.id]
    );
}

// ==================== Tasks ====================

#[tokio::test]
async fn test_create_task_appends_per_column() {
    let board = setup().await;
    let admin = register(&board, "admin", UserRole::Admin).await;
    let member = register(&board, "bruno", UserRole::Member).await;
    let (team_id, project_id) = team_with_member(&board, &admin, &member).await;
    let todo = stage_named(&board, team_id, "A Fazer").await;
    let review = stage_named(&board, team_id, "Em Revisão").await;

    let first = board
        .create_task(&admin, project_id, new_task("first", None))
        .await
        .unwrap();
    let second = board
        .create_task(&admin, project_id, new_task("second", Some(todo.id)))
        .await
        .unwrap();
    let elsewhere = board
        .create_task(&admin, project_id, new_task("review", Some(review.id)))
        .await
        .unwrap();

    assert_eq!(first.status_id, todo.id);
    assert_eq!(first.position, 1);
    assert_eq!(second.position, 2);
    assert_eq!(elsewhere.position, 1);

    // A move to a high key pushes the next append past it
    board
        .move_task(&admin, first.id, todo.id, 10)
        .await
        .unwrap();
    let third = board
        .create_task(&admin, project_id, new_task("third", Some(todo.id)))
        .await
        .unwrap();
    assert_eq!(third.position, 11);
}

#[tokio::test]
async fn test_create_task_rejects_outsiders_and_inactive_projects() {
    let board = setup().await;
    let admin = register(&board, "admin", UserRole::Admin).await;
    let member = register(&board, "bruno", UserRole::Member).await;
    let outsider = register(&board, "outsider", UserRole::Member).await;
    let (_, project_id) = team_with_member(&board, &admin, &member).await;

    assert!(matches!(
        board
            .create_task(&outsider, project_id, new_task("x", None))
            .await,
        Err(BoardError::PermissionDenied(_))
    ));

    board.deactivate_project(&admin, project_id).await.unwrap();
    assert!(matches!(
        board
            .create_task(&member, project_id, new_task("x", None))
            .await,
        Err(BoardError::Validation(_))
    ));
}

#[tokio::test]
async fn test_update_task_fields_and_labels() {
    let board = setup().await;
    let admin = register(&board, "admin", UserRole::Admin).await;
    let member = register(&board, "bruno", UserRole::Member).await;
    let (team_id, project_id) = team_with_member(&board, &admin, &member).await;
    let ui = board
        .create_label(
            &member,
            team_id,
            NewLabel {
                name: "ui".to_string(),
                color: "#17a2b8".to_string(),
            },
        )
        .await
        .unwrap();

    let mut draft = new_task("Draft", None);
    draft.due_at = Some(Utc::now() + Duration::days(3));
    draft.label_ids = vec![ui.id];
    let task = board.create_task(&member, project_id, draft).await.unwrap();

    let updated = board
        .update_task(
            &member,
            task.id,
            TaskChanges {
                title: Some("Final".to_string()),
                priority: Some(Priority::High),
                clear_due_at: true,
                label_ids: Some(Vec::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Final");
    assert_eq!(updated.priority, Priority::High);
    assert!(updated.due_at.is_none());
    let detail = board.task_detail(&member, task.id).await.unwrap();
    assert!(detail.labels.is_empty());
}

#[tokio::test]
async fn test_board_groups_cards_by_stage() {
    let board = setup().await;
    let admin = register(&board, "admin", UserRole::Admin).await;
    let member = register(&board, "bruno", UserRole::Member).await;
    let (team_id, project_id) = team_with_member(&board, &admin, &member).await;
    let doing = stage_named(&board, team_id, "Em Andamento").await;

    let a = board
        .create_task(&admin, project_id, new_task("a", None))
        .await
        .unwrap();
    let b = board
        .create_task(&admin, project_id, new_task("b", None))
        .await
        .unwrap();
    let c = board
        .create_task(&admin, project_id, new_task("c", Some(doing.id)))
        .await
        .unwrap();
    board.assign_task(&admin, c.id, member.id()).await.unwrap();
    // Put b ahead of a
    board.move_task(&admin, b.id, a.status_id, 0).await.unwrap();

    let view = board.board(&member, project_id).await.unwrap();
    assert_eq!(view.columns.len(), 4);
    assert_eq!(view.columns[0].stage.name, "A Fazer");
    assert_eq!(
        view.columns[0]
            .tasks
            .iter()
            .map(|card| card.task.id)
            .collect::<Vec<_>>(),
        vec![b.id, a.id]
    );
    assert_eq!(view.columns[1].tasks.len(), 1);
    assert_eq!(view.columns[1].tasks[0].assignee_id, Some(member.id()));
    assert!(view.columns[2].tasks.is_empty());
}

// ==================== Collaboration ====================

#[tokio::test]
async fn test_comments_and_attachments() {
    let board = setup().await;
    let admin = register(&board, "admin", UserRole::Admin).await;
    let member = register(&board, "bruno", UserRole::Member).await;
    let outsider = register(&board, "outsider", UserRole::Member).await;
    let (_, project_id) = team_with_member(&board, &admin, &member).await;
    let task = board
        .create_task(&admin, project_id, new_task("Discuss", None))
        .await
        .unwrap();

    assert!(matches!(
        board.add_comment(&member, task.id, "   ").await,
        Err(BoardError::Validation(_))
    ));
    assert!(matches!(
        board.add_comment(&outsider, task.id, "hi").await,
        Err(BoardError::PermissionDenied(_))
    ));
    assert!(matches!(
        board.add_comment(&member, Uuid::new_v4(), "hi").await,
        Err(BoardError::NotFound(_))
    ));

    board.add_comment(&member, task.id, "first").await.unwrap();
    board.add_comment(&admin, task.id, "second").await.unwrap();

    let attachment = board
        .add_attachment(
            &member,
            task.id,
            NewAttachment {
                file_ref: "blob://abc".to_string(),
                original_name: "spec.pdf".to_string(),
                size_bytes: 2048,
                mime_type: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(attachment.mime_type, "application/octet-stream");

    let detail = board.task_detail(&member, task.id).await.unwrap();
    assert_eq!(
        detail
            .comments
            .iter()
            .map(|c| c.content.as_str())
            .collect::<Vec<_>>(),
        vec!["first", "second"]
    );
    assert_eq!(detail.attachments.len(), 1);
}

#[tokio::test]
async fn test_assignment_rules() {
    let board = setup().await;
    let admin = register(&board, "admin", UserRole::Admin).await;
    let member = register(&board, "bruno", UserRole::Member).await;
    let outsider = register(&board, "outsider", UserRole::Member).await;
    let (_, project_id) = team_with_member(&board, &admin, &member).await;
    let task = board
        .create_task(&admin, project_id, new_task("Own me", None))
        .await
        .unwrap();

    // Nothing to remove is still a success
    assert_eq!(board.unassign_task(&member, task.id).await.unwrap(), 0);

    assert!(matches!(
        board.assign_task(&member, task.id, outsider.id()).await,
        Err(BoardError::PermissionDenied(_))
    ));
    assert!(matches!(
        board.assign_task(&outsider, task.id, member.id()).await,
        Err(BoardError::PermissionDenied(_))
    ));

    board.assign_task(&member, task.id, member.id()).await.unwrap();
    assert_eq!(board.unassign_task(&member, task.id).await.unwrap(), 1);
    let detail = board.task_detail(&member, task.id).await.unwrap();
    assert!(detail.assignment.is_none());
}

// ==================== Membership administration ====================

#[tokio::test]
async fn test_membership_admin_is_scoped_to_team() {
    let board = setup().await;
    let admin = register(&board, "admin", UserRole::Admin).await;
    let member = register(&board, "bruno", UserRole::Member).await;
    let (team_id, _) = team_with_member(&board, &admin, &member).await;
    let other = board.create_team(&admin, "Other", None).await.unwrap();

    let members = board.list_members(&admin, team_id).await.unwrap();
    let bruno = members
        .iter()
        .find(|m| m.username == "bruno")
        .expect("bruno is a member");

    assert!(matches!(
        board
            .remove_member(&admin, other.id, bruno.membership.id)
            .await,
        Err(BoardError::NotFound(_))
    ));
    assert!(matches!(
        board
            .change_member_role(&member, team_id, bruno.membership.id, TeamRole::Admin)
            .await,
        Err(BoardError::PermissionDenied(_))
    ));

    let promoted = board
        .change_member_role(&admin, team_id, bruno.membership.id, TeamRole::Admin)
        .await
        .unwrap();
    assert_eq!(promoted.role, TeamRole::Admin);

    // As team admin, bruno gets past the role check and hits the
    // active-project rule instead
    assert!(matches!(
        board.deactivate_team(&member, team_id).await,
        Err(BoardError::Conflict(_))
    ));
}

// ==================== Users ====================

#[tokio::test]
async fn test_resolve_identity() {
    let board = setup().await;
    let identity = Identity {
        user_id: Uuid::new_v4(),
        username: "newcomer".to_string(),
    };

    assert!(matches!(
        board.resolve_identity(&identity, false).await,
        Err(BoardError::NotFound(_))
    ));

    let caller = board.resolve_identity(&identity, true).await.unwrap();
    assert_eq!(caller.id(), identity.user_id);
    assert_eq!(caller.role(), Some(UserRole::Member));

    // Second login finds the same account
    let again = board.resolve_identity(&identity, false).await.unwrap();
    assert_eq!(again.id(), caller.id());
}

#[tokio::test]
async fn test_resolve_identity_matches_provisioned_username() {
    let board = setup().await;
    let admin = board.bootstrap_admin("helena").await.unwrap();

    let identity = Identity {
        user_id: Uuid::new_v4(),
        username: "helena".to_string(),
    };
    let caller = board.resolve_identity(&identity, false).await.unwrap();
    assert_eq!(caller.id(), admin.id());
    assert!(caller.is_admin());
}

#[tokio::test]
async fn test_bootstrap_admin_promotes_existing_member() {
    let board = setup().await;
    let member = register(&board, "helena", UserRole::Member).await;
    assert!(!member.is_admin());

    let promoted = board.bootstrap_admin("helena").await.unwrap();
    assert_eq!(promoted.id(), member.id());
    assert!(promoted.is_admin());

    // Idempotent
    let again = board.bootstrap_admin("helena").await.unwrap();
    assert!(again.is_admin());
}

#[tokio::test]
async fn test_register_rejects_duplicate_username() {
    let board = setup().await;
    register(&board, "ana", UserRole::Member).await;

    assert!(matches!(
        board
            .register_user(NewUser::named("ana"), UserRole::Member)
            .await,
        Err(BoardError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_user_administration() {
    let board = setup().await;
    let admin = register(&board, "admin", UserRole::Admin).await;
    let member = register(&board, "bruno", UserRole::Member).await;

    assert!(matches!(
        board.list_users(&member).await,
        Err(BoardError::PermissionDenied(_))
    ));

    let carla = board
        .create_user(
            &admin,
            NewUser {
                email: Some("carla@example.com".to_string()),
                ..NewUser::named("carla")
            },
            UserRole::Member,
        )
        .await
        .unwrap();
    assert_eq!(board.list_users(&admin).await.unwrap().len(), 3);

    let updated = board
        .update_user(
            &admin,
            carla.id(),
            UserChanges {
                full_name: Some("Carla Dias".to_string()),
                role: Some(UserRole::Admin),
                profile: ProfileChanges {
                    phone: Some("555-0100".to_string()),
                    ..Default::default()
                },
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.user.display_name(), "Carla Dias");
    let profile = updated.profile.expect("profile");
    assert_eq!(profile.role, UserRole::Admin);
    assert_eq!(profile.phone.as_deref(), Some("555-0100"));

    assert!(matches!(
        board.delete_user(&admin, admin.id()).await,
        Err(BoardError::Validation(_))
    ));
    board.delete_user(&admin, carla.id()).await.unwrap();
    assert!(matches!(
        board.load_caller(carla.id()).await,
        Err(BoardError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_update_own_profile() {
    let board = setup().await;
    let member = register(&board, "bruno", UserRole::Member).await;

    let profile = board
        .update_own_profile(
            &member,
            ProfileChanges {
                bio: Some("Backend developer".to_string()),
                birthdate: Some(date(1990, 5, 17)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(profile.bio.as_deref(), Some("Backend developer"));
    assert_eq!(profile.role, UserRole::Member);

    let future = Utc::now().date_naive() + Duration::days(30);
    assert!(matches!(
        board
            .update_own_profile(
                &member,
                ProfileChanges {
                    birthdate: Some(future),
                    ..Default::default()
                },
            )
            .await,
        Err(BoardError::Validation(_))
    ));
}

// ==================== Dashboard ====================

#[tokio::test]
async fn test_dashboard_summary() {
    let board = setup().await;
    let admin = register(&board, "admin", UserRole::Admin).await;
    let member = register(&board, "bruno", UserRole::Member).await;
    let (team_id, project_id) = team_with_member(&board, &admin, &member).await;
    let done = stage_named(&board, team_id, "Concluído").await;

    let mine = board
        .create_task(&admin, project_id, new_task("mine", None))
        .await
        .unwrap();
    board
        .create_task(&admin, project_id, new_task("other", None))
        .await
        .unwrap();
    board
        .create_task(&admin, project_id, new_task("finished", Some(done.id)))
        .await
        .unwrap();
    board.assign_task(&admin, mine.id, member.id()).await.unwrap();

    let dashboard = board.dashboard(&member).await.unwrap();
    assert_eq!(dashboard.teams.len(), 1);
    assert_eq!(dashboard.total_projects, 1);
    assert_eq!(dashboard.total_tasks, 3);
    assert_eq!(dashboard.completed_tasks, 1);
    assert_eq!(dashboard.completion_percent, 33.3);
    assert_eq!(dashboard.assigned_tasks.len(), 1);
    assert_eq!(dashboard.assigned_tasks[0].task.id, mine.id);
    assert_eq!(dashboard.assigned_tasks[0].stage_name, "A Fazer");

    let empty = board
        .dashboard(&register(&board, "loner", UserRole::Member).await)
        .await
        .unwrap();
    assert_eq!(empty.total_tasks, 0);
    assert_eq!(empty.completion_percent, 0.0);
}
