//! REST API for the Kanban board
//!
//! Every route except the health check sits behind [`middleware::require_auth`],
//! which turns the identity-provider token into a [`kanboard_board::Caller`].

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use kanboard_auth::JwtValidator;
use kanboard_board::Board;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across handlers
pub struct AppState {
    pub board: Board,
    pub validator: Arc<JwtValidator>,
    /// Register unknown identities as members on first request
    pub allow_signup: bool,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Kanboard API",
        version = "0.1.0",
        description = "REST API for teams, projects and Kanban task boards"
    ),
    paths(
        handlers::health_check,
        handlers::get_me,
        handlers::update_my_profile,
        handlers::get_dashboard,
        handlers::list_teams,
        handlers::create_team,
        handlers::get_team,
        handlers::update_team,
        handlers::deactivate_team,
        handlers::list_stages,
        handlers::create_stage,
        handlers::list_labels,
        handlers::create_label,
        handlers::list_projects,
        handlers::create_project,
        handlers::get_project,
        handlers::deactivate_project,
        handlers::get_board,
        handlers::create_task,
        handlers::get_task,
        handlers::update_task,
        handlers::move_task,
        handlers::add_comment,
        handlers::add_attachment,
        handlers::assign_task,
        handlers::unassign_task,
        handlers::admin_list_users,
        handlers::admin_create_user,
        handlers::admin_update_user,
        handlers::admin_delete_user,
        handlers::admin_delete_team,
        handlers::admin_toggle_team,
        handlers::admin_list_members,
        handlers::admin_add_member,
        handlers::admin_change_member_role,
        handlers::admin_remove_member,
    ),
    components(
        schemas(
            models::ErrorResponse,
            models::AdminMessage,
            models::MemberAddedResponse,
            models::HealthResponse,
            models::CreateTeamRequest,
            models::CreateProjectRequest,
            models::ProjectListQuery,
            models::MoveTaskRequest,
            models::MoveTaskResponse,
            models::CommentRequest,
            models::AssignRequest,
            models::UnassignResponse,
            models::CreateUserRequest,
            models::AddMemberRequest,
            models::ChangeRoleRequest,
        )
    ),
    tags(
        (name = "me", description = "Current user, profile and dashboard"),
        (name = "teams", description = "Teams, workflow stages and labels"),
        (name = "projects", description = "Projects and their boards"),
        (name = "tasks", description = "Tasks, comments, attachments and assignees"),
        (name = "admin", description = "User and membership administration"),
        (name = "system", description = "System health and info endpoints")
    )
)]
pub struct ApiDoc;

/// API server configuration
pub struct ApiServerConfig {
    /// Address to bind the API server
    pub bind_addr: SocketAddr,
    /// Enable CORS (for development)
    pub enable_cors: bool,
    /// Allowed CORS origins (if None, localhost origins are allowed)
    pub cors_origins: Option<Vec<String>>,
    /// Register unknown identities on first request
    pub allow_signup: bool,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3080)),
            enable_cors: true,
            cors_origins: None,
            allow_signup: false,
        }
    }
}

/// API Server
pub struct ApiServer {
    config: ApiServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(config: ApiServerConfig, board: Board, validator: JwtValidator) -> Self {
        let state = Arc::new(AppState {
            board,
            validator: Arc::new(validator),
            allow_signup: config.allow_signup,
        });

        Self { config, state }
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let api_doc = ApiDoc::openapi();

        // Build PUBLIC routes (no authentication required)
        let public_router = Router::new().route("/api/health", get(handlers::health_check));

        // Build PROTECTED routes (require an identity token)
        let protected_router = Router::new()
            .route("/api/me", get(handlers::get_me))
            .route("/api/me/profile", patch(handlers::update_my_profile))
            .route("/api/dashboard", get(handlers::get_dashboard))
            .route(
                "/api/teams",
                get(handlers::list_teams).post(handlers::create_team),
            )
            .route(
                "/api/teams/{id}",
                get(handlers::get_team)
                    .post(handlers::update_team)
                    .delete(handlers::deactivate_team),
            )
            .route(
                "/api/teams/{id}/stages",
                get(handlers::list_stages).post(handlers::create_stage),
            )
            .route(
                "/api/teams/{id}/labels",
                get(handlers::list_labels).post(handlers::create_label),
            )
            .route(
                "/api/projects",
                get(handlers::list_projects).post(handlers::create_project),
            )
            .route(
                "/api/projects/{id}",
                get(handlers::get_project).delete(handlers::deactivate_project),
            )
            .route("/api/projects/{id}/board", get(handlers::get_board))
            .route("/api/projects/{id}/tasks", post(handlers::create_task))
            .route(
                "/api/tasks/{id}",
                get(handlers::get_task).patch(handlers::update_task),
            )
            .route("/api/move-task", post(handlers::move_task))
            .route("/api/tasks/{id}/comments", post(handlers::add_comment))
            .route("/api/tasks/{id}/attachments", post(handlers::add_attachment))
            .route("/api/tasks/{id}/assign", post(handlers::assign_task))
            .route("/api/tasks/{id}/unassign", post(handlers::unassign_task))
            // Administration
            .route(
                "/api/admin/users",
                get(handlers::admin_list_users).post(handlers::admin_create_user),
            )
            .route(
                "/api/admin/users/{id}",
                patch(handlers::admin_update_user).delete(handlers::admin_delete_user),
            )
            .route(
                "/api/admin/teams/{id}",
                delete(handlers::admin_delete_team),
            )
            .route(
                "/api/admin/teams/{id}/toggle-active",
                post(handlers::admin_toggle_team),
            )
            .route(
                "/api/admin/teams/{id}/members",
                get(handlers::admin_list_members).post(handlers::admin_add_member),
            )
            .route(
                "/api/admin/teams/{id}/members/{membership_id}",
                patch(handlers::admin_change_member_role).delete(handlers::admin_remove_member),
            )
            .layer(axum_middleware::from_fn_with_state(
                self.state.clone(),
                middleware::require_auth,
            ))
            .with_state(self.state.clone());

        let api_router = public_router.merge(protected_router);

        // SwaggerUi automatically creates a route for /api/openapi.json
        let router = Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", api_doc))
            .merge(api_router);

        // Build middleware stack
        let mut router = router.layer(TraceLayer::new_for_http());

        if self.config.enable_cors {
            router = router.layer(self.cors_layer());
        }

        router
    }

    /// Cookie-based auth needs credentials, which rules out a wildcard origin
    fn cors_layer(&self) -> CorsLayer {
        let allowed = self.config.cors_origins.clone();

        CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::PATCH,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
            .allow_credentials(true)
            .allow_origin(AllowOrigin::predicate(
                move |origin: &HeaderValue, _| {
                    let origin_str = origin.to_str().unwrap_or("");
                    match &allowed {
                        Some(origins) => origins.iter().any(|o| o == origin_str),
                        None => {
                            origin_str.starts_with("http://localhost:")
                                || origin_str.starts_with("http://127.0.0.1:")
                                || origin_str.starts_with("https://localhost:")
                                || origin_str.starts_with("https://127.0.0.1:")
                        }
                    }
                },
            ))
    }

    /// Start the API server and run until `shutdown` resolves
    pub async fn start(
        self,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), anyhow::Error> {
        let router = self.build_router();

        info!("Starting API server on {}", self.config.bind_addr);
        info!(
            "OpenAPI spec: http://{}/api/openapi.json",
            self.config.bind_addr
        );
        info!("Swagger UI: http://{}/swagger-ui", self.config.bind_addr);

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

        info!("API server stopped");
        Ok(())
    }
}
