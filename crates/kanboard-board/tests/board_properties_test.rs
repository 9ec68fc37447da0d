//! Integration tests for the authorization gate and the state-sensitive
//! board operations, against an in-memory SQLite database

use chrono::{NaiveDate, Utc};
use kanboard_board::{
    members::AddMemberOutcome,
    permissions::{self, Action, Memberships},
    projects::NewProject,
    tasks::NewTask,
    users::NewUser,
    Board, BoardConfig, BoardError, Caller, TeamDeactivationPolicy,
};
use kanboard_db::entities::{
    assignment, project, status_stage, task, team, team_member, user, Lifecycle, TeamRole,
    UserRole,
};
use kanboard_db::{connect, migrate};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use uuid::Uuid;

/// Helper to create a board over a fresh in-memory database
async fn setup_with(config: BoardConfig) -> Board {
    let db = connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    migrate(&db).await.expect("Failed to run migrations");
    Board::new(db, config)
}

async fn setup() -> Board {
    setup_with(BoardConfig::default()).await
}

async fn register(board: &Board, username: &str, role: UserRole) -> Caller {
    board
        .register_user(NewUser::named(username), role)
        .await
        .expect("Failed to register user")
}

/// A user row without a profile, as created outside registration
async fn profileless(board: &Board, username: &str) -> Caller {
    let user = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        email: Set(None),
        full_name: Set(None),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    }
    .insert(board.db())
    .await
    .expect("Failed to insert user");
    Caller::new(user, None)
}

fn new_project(title: &str) -> NewProject {
    NewProject {
        title: title.to_string(),
        description: String::new(),
        start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
        priority: Default::default(),
    }
}

fn new_task(title: &str, status_id: Option<Uuid>) -> NewTask {
    NewTask {
        status_id,
        title: title.to_string(),
        description: String::new(),
        due_at: None,
        priority: Default::default(),
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

async fn membership_count(board: &Board, team_id: Uuid, user_id: Option<Uuid>) -> u64 {
    let mut query = team_member::Entity::find().filter(team_member::Column::TeamId.eq(team_id));
    if let Some(user_id) = user_id {
        query = query.filter(team_member::Column::UserId.eq(user_id));
    }
    query.count(board.db()).await.unwrap()
}

#[tokio::test]
async fn test_profileless_caller_is_denied_everywhere() {
    let board = setup().await;
    let admin = register(&board, "admin", UserRole::Admin).await;
    let ghost = profileless(&board, "ghost").await;

    let team = board.create_team(&admin, "Core", None).await.unwrap();
    let project = board
        .create_project(&admin, Some(team.id), new_project("Launch"))
        .await
        .unwrap();
    let task = board
        .create_task(&admin, project.id, new_task("Write docs", None))
        .await
        .unwrap();

    // Even a team-admin membership row does not help without a profile
    team_member::ActiveModel {
        id: Set(Uuid::new_v4()),
        team_id: Set(team.id),
        user_id: Set(ghost.id()),
        role: Set(TeamRole::Admin),
        joined_at: Set(Utc::now()),
    }
    .insert(board.db())
    .await
    .unwrap();

    let memberships = Memberships::load(board.db(), ghost.id()).await.unwrap();
    assert!(!permissions::is_team_member(&ghost, &memberships, team.id));
    assert!(!permissions::is_team_admin(&ghost, &memberships, team.id));
    assert!(!permissions::can_view_team(&ghost, &memberships, team.id));
    assert!(!permissions::can(ghost.profile.as_ref(), Action::CreateTask));

    assert!(matches!(
        board.create_team(&ghost, "Shadow", None).await,
        Err(BoardError::PermissionDenied(_))
    ));
    assert!(matches!(
        board
            .create_project(&ghost, Some(team.id), new_project("Nope"))
            .await,
        Err(BoardError::PermissionDenied(_))
    ));
    assert!(matches!(
        board.move_task(&ghost, task.id, task.status_id, 5).await,
        Err(BoardError::PermissionDenied(_))
    ));
    assert!(matches!(
        board.deactivate_team(&ghost, team.id).await,
        Err(BoardError::PermissionDenied(_))
    ));
    assert!(matches!(
        board.add_comment(&ghost, task.id, "hello").await,
        Err(BoardError::PermissionDenied(_))
    ));
}

#[tokio::test]
async fn test_create_team_enrolls_creator_as_team_admin() {
    let board = setup().await;
    let admin = register(&board, "admin", UserRole::Admin).await;

    let team = board
        .create_team(&admin, "  Platform  ", Some("Infra".to_string()))
        .await
        .unwrap();

    assert_eq!(team.name, "Platform");
    assert_eq!(team.lifecycle, Lifecycle::Active);

    let rows = team_member::Entity::find()
        .filter(team_member::Column::TeamId.eq(team.id))
        .all(board.db())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].user_id, admin.id());
    assert_eq!(rows[0].role, TeamRole::Admin);

    let memberships = Memberships::load(board.db(), admin.id()).await.unwrap();
    assert!(permissions::is_team_admin(&admin, &memberships, team.id));
}

#[tokio::test]
async fn test_create_team_seeds_default_stages() {
    let board = setup().await;
    let admin = register(&board, "admin", UserRole::Admin).await;

    let team = board.create_team(&admin, "Platform", None).await.unwrap();
    let stages = board.list_stages(&admin, team.id).await.unwrap();

    let names: Vec<(&str, &str, i32)> = stages
        .iter()
        .map(|s| (s.name.as_str(), s.color.as_str(), s.position))
        .collect();
    assert_eq!(
        names,
        vec![
            ("A Fazer", "#6c757d", 1),
            ("Em Andamento", "#007bff", 2),
            ("Em Revisão", "#ffc107", 3),
            ("Concluído", "#28a745", 4),
        ]
    );
}

#[tokio::test]
async fn test_create_team_without_seeding() {
    let board = setup_with(BoardConfig {
        seed_default_stages: false,
        ..Default::default()
    })
    .await;
    let admin = register(&board, "admin", UserRole::Admin).await;

    let team = board.create_team(&admin, "Bare", None).await.unwrap();
    assert!(board.list_stages(&admin, team.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_team_requires_name() {
    let board = setup().await;
    let admin = register(&board, "admin", UserRole::Admin).await;

    assert!(matches!(
        board.create_team(&admin, "   ", None).await,
        Err(BoardError::Validation(_))
    ));
    assert_eq!(team::Entity::find().count(board.db()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_hard_delete_refused_while_projects_are_active() {
    let board = setup().await;
    let admin = register(&board, "admin", UserRole::Admin).await;
    let member = register(&board, "bruno", UserRole::Member).await;

    let team = board.create_team(&admin, "Core", None).await.unwrap();
    board
        .add_member(&admin, team.id, member.id(), TeamRole::Member)
        .await
        .unwrap();
    let project = board
        .create_project(&admin, Some(team.id), new_project("Launch"))
        .await
        .unwrap();

    let result = board.hard_delete_team(&admin, team.id).await;
    assert!(matches!(result, Err(BoardError::Conflict(_))));

    // Nothing changed
    let team_after = team::Entity::find_by_id(team.id)
        .one(board.db())
        .await
        .unwrap()
        .expect("Team must survive");
    assert_eq!(team_after.lifecycle, Lifecycle::Active);
    assert_eq!(membership_count(&board, team.id, None).await, 2);
    let project_after = project::Entity::find_by_id(project.id)
        .one(board.db())
        .await
        .unwrap()
        .expect("Project must survive");
    assert_eq!(project_after.lifecycle, Lifecycle::Active);
}

#[tokio::test]
async fn test_hard_delete_reports_removed_memberships() {
    let board = setup().await;
    let admin = register(&board, "admin", UserRole::Admin).await;
    let member = register(&board, "bruno", UserRole::Member).await;

    let team = board.create_team(&admin, "Core", None).await.unwrap();
    board
        .add_member(&admin, team.id, member.id(), TeamRole::Member)
        .await
        .unwrap();
    let project = board
        .create_project(&admin, Some(team.id), new_project("Old"))
        .await
        .unwrap();
    board.deactivate_project(&admin, project.id).await.unwrap();

    let report = board.hard_delete_team(&admin, team.id).await.unwrap();
    assert_eq!(report.memberships_removed, 2);
    assert_eq!(report.name, "Core");

    assert!(team::Entity::find_by_id(team.id)
        .one(board.db())
        .await
        .unwrap()
        .is_none());
    assert_eq!(membership_count(&board, team.id, None).await, 0);
    // Users are untouched
    assert!(board.load_caller(member.id()).await.is_ok());
}

#[tokio::test]
async fn test_hard_delete_requires_global_admin() {
    let board = setup().await;
    let admin = register(&board, "admin", UserRole::Admin).await;
    let member = register(&board, "bruno", UserRole::Member).await;
    let team = board.create_team(&admin, "Core", None).await.unwrap();

    assert!(matches!(
        board.hard_delete_team(&member, team.id).await,
        Err(BoardError::PermissionDenied(_))
    ));
}

#[tokio::test]
async fn test_assign_twice_keeps_only_the_second_assignee() {
    let board = setup().await;
    let admin = register(&board, "admin", UserRole::Admin).await;
    let bruno = register(&board, "bruno", UserRole::Member).await;
    let carla = register(&board, "carla", UserRole::Member).await;

    let team = board.create_team(&admin, "Core", None).await.unwrap();
    for user in [&bruno, &carla] {
        board
            .add_member(&admin, team.id, user.id(), TeamRole::Member)
            .await
            .unwrap();
    }
    let project = board
        .create_project(&admin, Some(team.id), new_project("Launch"))
        .await
        .unwrap();
    let task = board
        .create_task(&admin, project.id, new_task("Ship", None))
        .await
        .unwrap();

    board.assign_task(&admin, task.id, bruno.id()).await.unwrap();
    board.assign_task(&admin, task.id, carla.id()).await.unwrap();

    let rows = assignment::Entity::find()
        .filter(assignment::Column::TaskId.eq(task.id))
        .all(board.db())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].user_id, carla.id());
    assert_eq!(rows[0].assigned_by, admin.id());
}

#[tokio::test]
async fn test_move_missing_task_is_not_found_and_writes_nothing() {
    let board = setup().await;
    let admin = register(&board, "admin", UserRole::Admin).await;
    let team = board.create_team(&admin, "Core", None).await.unwrap();
    let project = board
        .create_project(&admin, Some(team.id), new_project("Launch"))
        .await
        .unwrap();
    let existing = board
        .create_task(&admin, project.id, new_task("Keep me", None))
        .await
        .unwrap();
    let doing = stage_named(&board, team.id, "Em Andamento").await;

    let result = board.move_task(&admin, Uuid::new_v4(), doing.id, 0).await;
    assert!(matches!(result, Err(BoardError::NotFound(_))));

    let after = task::Entity::find_by_id(existing.id)
        .one(board.db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.status_id, existing.status_id);
    assert_eq!(after.position, existing.position);
}

#[tokio::test]
async fn test_move_checks_run_in_order() {
    let board = setup().await;
    let admin = register(&board, "admin", UserRole::Admin).await;
    let outsider = register(&board, "outsider", UserRole::Member).await;
    let team = board.create_team(&admin, "Core", None).await.unwrap();
    let project = board
        .create_project(&admin, Some(team.id), new_project("Launch"))
        .await
        .unwrap();
    let task = board
        .create_task(&admin, project.id, new_task("Ship", None))
        .await
        .unwrap();

    // Missing stage is reported before membership
    assert!(matches!(
        board.move_task(&outsider, task.id, Uuid::new_v4(), 1).await,
        Err(BoardError::NotFound(_))
    ));
    // Existing stage, caller outside the team
    assert!(matches!(
        board.move_task(&outsider, task.id, task.status_id, 1).await,
        Err(BoardError::PermissionDenied(_))
    ));

    // Stage of another team
    let other = board.create_team(&admin, "Other", None).await.unwrap();
    let foreign = stage_named(&board, other.id, "A Fazer").await;
    assert!(matches!(
        board.move_task(&admin, task.id, foreign.id, 1).await,
        Err(BoardError::Validation(_))
    ));
    assert!(matches!(
        board.move_task(&admin, task.id, task.status_id, -1).await,
        Err(BoardError::Validation(_))
    ));
}

#[tokio::test]
async fn test_add_then_remove_member_round_trip() {
    let board = setup().await;
    let admin = register(&board, "admin", UserRole::Admin).await;
    let bruno = register(&board, "bruno", UserRole::Member).await;
    let team = board.create_team(&admin, "Core", None).await.unwrap();

    let outcome = board
        .add_member(&admin, team.id, bruno.id(), TeamRole::Member)
        .await
        .unwrap();
    assert!(outcome.is_added());
    assert_eq!(membership_count(&board, team.id, Some(bruno.id())).await, 1);

    board
        .remove_member(&admin, team.id, outcome.membership().id)
        .await
        .unwrap();
    assert_eq!(membership_count(&board, team.id, Some(bruno.id())).await, 0);
}

#[tokio::test]
async fn test_add_existing_member_is_ignored() {
    let board = setup().await;
    let admin = register(&board, "admin", UserRole::Admin).await;
    let bruno = register(&board, "bruno", UserRole::Member).await;
    let team = board.create_team(&admin, "Core", None).await.unwrap();

    let first = board
        .add_member(&admin, team.id, bruno.id(), TeamRole::Member)
        .await
        .unwrap();
    let second = board
        .add_member(&admin, team.id, bruno.id(), TeamRole::Admin)
        .await
        .unwrap();

    assert!(matches!(second, AddMemberOutcome::AlreadyMember(_)));
    assert_eq!(second.membership().id, first.membership().id);
    assert_eq!(second.membership().role, TeamRole::Member);
    assert_eq!(membership_count(&board, team.id, Some(bruno.id())).await, 1);
}

#[tokio::test]
async fn test_member_scenario_create_task_but_not_deactivate_team() {
    let board = setup().await;
    let alice = register(&board, "alice", UserRole::Admin).await;
    let bruno = register(&board, "bruno", UserRole::Member).await;

    let team = board.create_team(&alice, "Core", None).await.unwrap();
    let memberships = Memberships::load(board.db(), alice.id()).await.unwrap();
    assert!(permissions::is_team_admin(&alice, &memberships, team.id));

    assert!(matches!(
        board.create_team(&bruno, "Mine", None).await,
        Err(BoardError::PermissionDenied(_))
    ));

    board
        .add_member(&alice, team.id, bruno.id(), TeamRole::Member)
        .await
        .unwrap();
    let project = board
        .create_project(&alice, Some(team.id), new_project("Launch"))
        .await
        .unwrap();

    let task = board
        .create_task(&bruno, project.id, new_task("Bruno's task", None))
        .await
        .unwrap();
    assert_eq!(task.created_by, bruno.id());

    assert!(matches!(
        board.deactivate_team(&bruno, team.id).await,
        Err(BoardError::PermissionDenied(_))
    ));
}

#[tokio::test]
async fn test_move_leaves_siblings_untouched() {
    let board = setup().await;
    let admin = register(&board, "admin", UserRole::Admin).await;
    let team = board.create_team(&admin, "Core", None).await.unwrap();
    let project = board
        .create_project(&admin, Some(team.id), new_project("Launch"))
        .await
        .unwrap();
    let todo = stage_named(&board, team.id, "A Fazer").await;
    let doing = stage_named(&board, team.id, "Em Andamento").await;

    let mut column = Vec::new();
    for title in ["one", "two", "three"] {
        column.push(
            board
                .create_task(&admin, project.id, new_task(title, Some(todo.id)))
                .await
                .unwrap(),
        );
    }
    assert_eq!(
        column.iter().map(|t| t.position).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );

    let moved = board
        .move_task(&admin, column[0].id, doing.id, 1)
        .await
        .unwrap();
    assert_eq!(moved.status_id, doing.id);
    assert_eq!(moved.position, 1);

    for sibling in &column[1..] {
        let after = task::Entity::find_by_id(sibling.id)
            .one(board.db())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.status_id, todo.id);
        assert_eq!(after.position, sibling.position);
    }
}

#[tokio::test]
async fn test_deactivation_policy_refuse() {
    let board = setup_with(BoardConfig {
        team_deactivation_policy: TeamDeactivationPolicy::Refuse,
        ..Default::default()
    })
    .await;
    let admin = register(&board, "admin", UserRole::Admin).await;
    let team = board.create_team(&admin, "Core", None).await.unwrap();
    board
        .create_project(&admin, Some(team.id), new_project("Launch"))
        .await
        .unwrap();

    assert!(matches!(
        board.deactivate_team(&admin, team.id).await,
        Err(BoardError::Conflict(_))
    ));
    let after = team::Entity::find_by_id(team.id)
        .one(board.db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.lifecycle, Lifecycle::Active);
}

#[tokio::test]
async fn test_deactivation_policy_warn() {
    let board = setup_with(BoardConfig {
        team_deactivation_policy: TeamDeactivationPolicy::Warn,
        ..Default::default()
    })
    .await;
    let admin = register(&board, "admin", UserRole::Admin).await;
    let team = board.create_team(&admin, "Core", None).await.unwrap();
    let project = board
        .create_project(&admin, Some(team.id), new_project("Launch"))
        .await
        .unwrap();

    let outcome = board.deactivate_team(&admin, team.id).await.unwrap();
    assert_eq!(outcome.team.lifecycle, Lifecycle::Inactive);
    assert!(outcome.warning.is_some());

    // No cascade to the project
    let project_after = project::Entity::find_by_id(project.id)
        .one(board.db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(project_after.lifecycle, Lifecycle::Active);
}

#[tokio::test]
async fn test_deactivate_team_without_projects_has_no_warning() {
    let board = setup().await;
    let admin = register(&board, "admin", UserRole::Admin).await;
    let team = board.create_team(&admin, "Core", None).await.unwrap();

    let outcome = board.deactivate_team(&admin, team.id).await.unwrap();
    assert_eq!(outcome.team.lifecycle, Lifecycle::Inactive);
    assert!(outcome.warning.is_none());
    assert!(board.list_teams(&admin).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_global_admin_without_team_admin_role_cannot_deactivate() {
    let board = setup().await;
    let owner = register(&board, "owner", UserRole::Admin).await;
    let other_admin = register(&board, "root", UserRole::Admin).await;
    let team = board.create_team(&owner, "Core", None).await.unwrap();

    assert!(matches!(
        board.deactivate_team(&other_admin, team.id).await,
        Err(BoardError::PermissionDenied(_))
    ));

    // Global admin can still toggle through the admin surface
    let toggled = board.toggle_team_active(&other_admin, team.id).await.unwrap();
    assert_eq!(toggled.lifecycle, Lifecycle::Inactive);
    let toggled = board.toggle_team_active(&other_admin, team.id).await.unwrap();
    assert_eq!(toggled.lifecycle, Lifecycle::Active);
}
