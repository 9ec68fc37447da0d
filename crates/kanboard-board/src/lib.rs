//! Kanban board domain core
//!
//! Teams own projects, workflow stages and labels; projects own tasks placed
//! in stage columns; tasks carry comments, attachments and one assignee.
//! Every mutating operation goes through the authorization gate in
//! [`permissions`] before touching the database.

pub mod caller;
pub mod collab;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod labels;
mod lookup;
pub mod members;
pub mod permissions;
pub mod projects;
pub mod stages;
pub mod tasks;
pub mod teams;
pub mod users;

pub use caller::Caller;
pub use config::{BoardConfig, TeamDeactivationPolicy, DEFAULT_STAGES};
pub use error::{BoardError, BoardResult};
pub use permissions::Action;

use sea_orm::DatabaseConnection;

/// Entry point for every board operation
#[derive(Clone)]
pub struct Board {
    db: DatabaseConnection,
    config: BoardConfig,
}

impl Board {
    pub fn new(db: DatabaseConnection, config: BoardConfig) -> Self {
        Self { db, config }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }
}
