//! The authenticated caller aggregate

use kanboard_db::entities::{profile, user, UserRole};
use serde::Serialize;
use uuid::Uuid;
#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// A user together with their (possibly missing) profile.
///
/// Accounts created outside registration may lack a profile; such callers
/// are denied by every permission predicate.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Caller {
    pub user: user::Model,
    pub profile: Option<profile::Model>,
}

impl Caller {
    pub fn new(user: user::Model, profile: Option<profile::Model>) -> Self {
        Self { user, profile }
    }

    pub fn id(&self) -> Uuid {
        self.user.id
    }

    pub fn username(&self) -> &str {
        &self.user.username
    }

    pub fn role(&self) -> Option<UserRole> {
        self.profile.as_ref().map(|p| p.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(UserRole::Admin)
    }
}
