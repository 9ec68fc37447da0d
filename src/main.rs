//! Kanboard - team, project and Kanban task board service
//!
//! Runs the REST API by default; subcommands cover schema migrations, admin
//! bootstrap and development tokens.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use kanboard_api::{ApiServer, ApiServerConfig};
use kanboard_auth::{IdentityClaims, JwtValidator};
use kanboard_board::{Board, BoardConfig, TeamDeactivationPolicy};
use sea_orm::DatabaseConnection;
use std::{net::SocketAddr, path::PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Kanboard - teams, projects and Kanban task boards
#[derive(Parser, Debug)]
#[command(name = "kanboard")]
#[command(about = "Team, project and Kanban task board service", long_about = None)]
#[command(version = env!("GIT_TAG"))]
#[command(long_version = concat!(env!("GIT_TAG"), "\nCommit: ", env!("GIT_HASH"), "\nBuilt: ", env!("BUILD_TIME")))]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Address to bind the API server
    #[arg(long, env = "KANBOARD_API_ADDR", default_value = "127.0.0.1:3080")]
    api_addr: SocketAddr,

    /// Database URL (sqlite://path?mode=rwc, postgres://..., sqlite::memory:)
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite::memory:", global = true)]
    database_url: String,

    /// Shared HS256 secret of the identity provider
    #[arg(long, env = "KANBOARD_JWT_SECRET", global = true)]
    jwt_secret: Option<String>,

    /// PEM public key of the identity provider (RS256)
    #[arg(long, env = "KANBOARD_JWT_PUBLIC_KEY", conflicts_with = "jwt_secret")]
    jwt_public_key: Option<PathBuf>,

    /// Required `iss` claim
    #[arg(long, env = "KANBOARD_JWT_ISSUER", global = true)]
    jwt_issuer: Option<String>,

    /// Required `aud` claim
    #[arg(long, env = "KANBOARD_JWT_AUDIENCE", global = true)]
    jwt_audience: Option<String>,

    /// Register unknown identities as members on their first request
    #[arg(long, env = "KANBOARD_ALLOW_SIGNUP")]
    allow_signup: bool,

    /// Username that gets the global admin role at startup
    #[arg(long, env = "KANBOARD_BOOTSTRAP_ADMIN")]
    bootstrap_admin: Option<String>,

    /// What deactivating a team with active projects does
    #[arg(long, value_enum, default_value = "refuse")]
    team_deactivation_policy: PolicyArg,

    /// Do not seed the default workflow stages into new teams
    #[arg(long)]
    no_default_stages: bool,

    /// Disable CORS headers
    #[arg(long)]
    no_cors: bool,

    /// Allowed CORS origin (repeatable; localhost origins when omitted)
    #[arg(long = "cors-origin")]
    cors_origins: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply pending database migrations and exit
    Migrate,

    /// Give a user the global admin role, creating the account if needed
    GrantAdmin {
        /// Username to promote
        username: String,
    },

    /// Print a signed identity token (development only, needs --jwt-secret)
    IssueToken {
        /// Username claim
        #[arg(long)]
        username: String,

        /// Subject claim; random when omitted (accounts are then matched by username)
        #[arg(long)]
        user_id: Option<uuid::Uuid>,

        /// Validity in hours
        #[arg(long, default_value = "24")]
        hours: i64,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyArg {
    Refuse,
    Warn,
}

impl From<PolicyArg> for TeamDeactivationPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Refuse => TeamDeactivationPolicy::Refuse,
            PolicyArg::Warn => TeamDeactivationPolicy::Warn,
        }
    }
}

/// `RUST_LOG` wins over `--log-level`
fn init_logging(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .context("Failed to initialize logging filter")?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();

    Ok(())
}

async fn open_database(database_url: &str) -> Result<DatabaseConnection> {
    let db = kanboard_db::connect(database_url)
        .await
        .with_context(|| format!("Failed to connect to database at {}", database_url))?;
    kanboard_db::migrate(&db)
        .await
        .context("Failed to run database migrations")?;
    Ok(db)
}

fn board_config(cli: &Cli) -> BoardConfig {
    BoardConfig {
        seed_default_stages: !cli.no_default_stages,
        team_deactivation_policy: cli.team_deactivation_policy.into(),
    }
}

fn build_validator(cli: &Cli) -> Result<JwtValidator> {
    let mut validator = match (&cli.jwt_public_key, &cli.jwt_secret) {
        (Some(path), _) => {
            let pem = std::fs::read(path)
                .with_context(|| format!("Failed to read public key {}", path.display()))?;
            JwtValidator::from_rsa_pem(&pem).context("Invalid RSA public key")?
        }
        (None, Some(secret)) => JwtValidator::new(secret.as_bytes()),
        (None, None) => {
            anyhow::bail!("Either --jwt-secret or --jwt-public-key is required to serve the API")
        }
    };

    if let Some(issuer) = &cli.jwt_issuer {
        validator = validator.with_issuer(issuer.clone());
    }
    if let Some(audience) = &cli.jwt_audience {
        validator = validator.with_audience(audience.clone());
    }
    Ok(validator)
}

async fn serve(cli: Cli) -> Result<()> {
    info!("Kanboard starting...");

    let validator = build_validator(&cli)?;

    if cli.database_url == "sqlite::memory:" {
        warn!("Using an in-memory database; all data is lost on exit");
    }
    let db = open_database(&cli.database_url).await?;
    let board = Board::new(db, board_config(&cli));

    if let Some(username) = &cli.bootstrap_admin {
        board
            .bootstrap_admin(username)
            .await
            .with_context(|| format!("Failed to bootstrap admin '{}'", username))?;
    }

    let config = ApiServerConfig {
        bind_addr: cli.api_addr,
        enable_cors: !cli.no_cors,
        cors_origins: (!cli.cors_origins.is_empty()).then(|| cli.cors_origins.clone()),
        allow_signup: cli.allow_signup,
    };
    if config.allow_signup {
        info!("Unknown identities will be registered as members");
    }

    let server = ApiServer::new(config, board, validator);
    server.start(shutdown_signal()).await?;

    info!("Kanboard stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down..."),
        Err(e) => warn!("Failed to listen for Ctrl+C: {}", e),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    init_logging(&cli.log_level)?;

    match cli.command.take() {
        Some(Commands::Migrate) => {
            open_database(&cli.database_url).await?;
            info!("Database is up to date");
            Ok(())
        }
        Some(Commands::GrantAdmin { username }) => {
            let db = open_database(&cli.database_url).await?;
            let board = Board::new(db, board_config(&cli));
            let admin = board
                .bootstrap_admin(&username)
                .await
                .with_context(|| format!("Failed to grant admin role to '{}'", username))?;
            println!("{} ({}) is now an admin", admin.username(), admin.id());
            Ok(())
        }
        Some(Commands::IssueToken {
            username,
            user_id,
            hours,
        }) => {
            let secret = cli
                .jwt_secret
                .as_deref()
                .context("issue-token needs --jwt-secret")?;
            let mut claims = IdentityClaims::new(
                user_id.unwrap_or_else(uuid::Uuid::new_v4),
                username,
                chrono::Duration::hours(hours),
            );
            if let Some(issuer) = &cli.jwt_issuer {
                claims = claims.with_issuer(issuer.clone());
            }
            if let Some(audience) = &cli.jwt_audience {
                claims = claims.with_audience(audience.clone());
            }
            let token =
                JwtValidator::encode(secret.as_bytes(), &claims).context("Failed to sign token")?;
            println!("{}", token);
            Ok(())
        }
        None => serve(cli).await,
    }
}
