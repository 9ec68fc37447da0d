//! Accounts and profiles
//!
//! A profile is created together with its user in one explicit registration
//! step. Later edits to either record are explicit as well.

use chrono::{NaiveDate, Utc};
use kanboard_auth::Identity;
use kanboard_db::entities::{profile, user, UserRole};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait, TryIntoModel,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;
#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::caller::Caller;
use crate::error::{BoardError, BoardResult};
use crate::lookup;
use crate::Board;

/// Input for registration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
    /// Fixed id, e.g. the identity provider subject. Random when absent.
    pub id: Option<Uuid>,
    pub username: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
}

impl NewUser {
    pub fn named(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Default::default()
        }
    }
}

/// Profile fields a user may edit on their own profile
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ProfileChanges {
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub birthdate: Option<NaiveDate>,
}

/// Admin-side edit of an account
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UserChanges {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub is_active: Option<bool>,
    pub role: Option<UserRole>,
    #[serde(flatten)]
    pub profile: ProfileChanges,
}

/// User row with its profile, as listed by the admin surface
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UserAccount {
    pub user: user::Model,
    pub profile: Option<profile::Model>,
}

const MAX_USERNAME_LEN: usize = 150;
const MAX_PHONE_LEN: usize = 20;

/// Empty strings clear optional text fields
fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn apply_profile_changes(
    active: &mut profile::ActiveModel,
    changes: ProfileChanges,
) -> BoardResult<()> {
    if let Some(bio) = changes.bio {
        active.bio = Set(optional_text(Some(bio)));
    }
    if let Some(phone) = changes.phone {
        let phone = optional_text(Some(phone));
        if phone
            .as_deref()
            .is_some_and(|p| p.chars().count() > MAX_PHONE_LEN)
        {
            return Err(BoardError::invalid(format!(
                "Phone must be at most {MAX_PHONE_LEN} characters"
            )));
        }
        active.phone = Set(phone);
    }
    if let Some(birthdate) = changes.birthdate {
        if birthdate > Utc::now().date_naive() {
            return Err(BoardError::invalid("Birthdate cannot be in the future"));
        }
        active.birthdate = Set(Some(birthdate));
    }
    Ok(())
}

async fn profile_of<C: ConnectionTrait>(
    conn: &C,
    user: &user::Model,
) -> BoardResult<Option<profile::Model>> {
    Ok(user.find_related(profile::Entity).one(conn).await?)
}

/// Update only when something changed
async fn persist_profile<C: ConnectionTrait>(
    conn: &C,
    active: profile::ActiveModel,
) -> BoardResult<profile::Model> {
    if active.is_changed() {
        Ok(active.update(conn).await?)
    } else {
        Ok(active.try_into_model()?)
    }
}

impl Board {
    /// Create a user and its profile in one transaction
    pub async fn register_user(&self, new_user: NewUser, role: UserRole) -> BoardResult<Caller> {
        let username = lookup::required_text(&new_user.username, "Username", MAX_USERNAME_LEN)?;

        let taken = user::Entity::find()
            .filter(user::Column::Username.eq(&username))
            .one(&self.db)
            .await?
            .is_some();
        if taken {
            return Err(BoardError::Conflict(format!(
                "Username '{username}' is already taken"
            )));
        }

        let now = Utc::now();
        let txn = self.db.begin().await?;

        let user = user::ActiveModel {
            id: Set(new_user.id.unwrap_or_else(Uuid::new_v4)),
            username: Set(username),
            email: Set(optional_text(new_user.email)),
            full_name: Set(optional_text(new_user.full_name)),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let profile = profile::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.id),
            role: Set(role),
            bio: Set(None),
            phone: Set(None),
            birthdate: Set(None),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!("Registered user {} ({:?})", user.username, role);
        Ok(Caller::new(user, Some(profile)))
    }

    /// Make sure `username` exists and holds the global admin role
    pub async fn bootstrap_admin(&self, username: &str) -> BoardResult<Caller> {
        let username = lookup::required_text(username, "Username", MAX_USERNAME_LEN)?;

        let existing = user::Entity::find()
            .filter(user::Column::Username.eq(&username))
            .one(&self.db)
            .await?;

        let Some(user) = existing else {
            return self
                .register_user(NewUser::named(username), UserRole::Admin)
                .await;
        };

        let profile = match profile_of(&self.db, &user).await? {
            Some(profile) if profile.role == UserRole::Admin => profile,
            Some(profile) => {
                let mut active: profile::ActiveModel = profile.into();
                active.role = Set(UserRole::Admin);
                active.update(&self.db).await?
            }
            None => {
                profile::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user.id),
                    role: Set(UserRole::Admin),
                    bio: Set(None),
                    phone: Set(None),
                    birthdate: Set(None),
                }
                .insert(&self.db)
                .await?
            }
        };

        info!("Granted admin role to {}", user.username);
        Ok(Caller::new(user, Some(profile)))
    }

    /// Build the caller aggregate for a known user id
    pub async fn load_caller(&self, user_id: Uuid) -> BoardResult<Caller> {
        let user = lookup::user(&self.db, user_id).await?;
        let profile = profile_of(&self.db, &user).await?;
        Ok(Caller::new(user, profile))
    }

    /// Map an identity-provider identity onto a local account.
    ///
    /// Lookup is by id first, then by username (accounts provisioned ahead of
    /// their first login). Unknown identities are registered as members when
    /// `allow_signup` is set and rejected with `NotFound` otherwise.
    pub async fn resolve_identity(
        &self,
        identity: &Identity,
        allow_signup: bool,
    ) -> BoardResult<Caller> {
        let mut found = user::Entity::find_by_id(identity.user_id)
            .one(&self.db)
            .await?;
        if found.is_none() {
            found = user::Entity::find()
                .filter(user::Column::Username.eq(&identity.username))
                .one(&self.db)
                .await?;
        }

        match found {
            Some(user) if !user.is_active => {
                warn!("Rejected login for disabled account {}", user.username);
                Err(BoardError::denied("This account is disabled"))
            }
            Some(user) => {
                let profile = profile_of(&self.db, &user).await?;
                debug!("Resolved identity {} to user {}", identity.username, user.id);
                Ok(Caller::new(user, profile))
            }
            None if allow_signup => {
                let new_user = NewUser {
                    id: Some(identity.user_id),
                    ..NewUser::named(identity.username.clone())
                };
                self.register_user(new_user, UserRole::Member).await
            }
            None => Err(BoardError::NotFound(format!(
                "No account for '{}'",
                identity.username
            ))),
        }
    }

    /// Edit the caller's own profile
    pub async fn update_own_profile(
        &self,
        caller: &Caller,
        changes: ProfileChanges,
    ) -> BoardResult<profile::Model> {
        let Some(profile) = caller.profile.clone() else {
            return Err(BoardError::denied("Your account has no profile"));
        };

        let mut active: profile::ActiveModel = profile.into();
        apply_profile_changes(&mut active, changes)?;
        let profile = persist_profile(&self.db, active).await?;

        info!("Updated profile of {}", caller.username());
        Ok(profile)
    }

    /// All accounts, by username (admin only)
    pub async fn list_users(&self, caller: &Caller) -> BoardResult<Vec<UserAccount>> {
        lookup::require_admin(caller)?;

        let rows = user::Entity::find()
            .find_also_related(profile::Entity)
            .order_by_asc(user::Column::Username)
            .all(&self.db)
            .await?;

        debug!("Listing {} users", rows.len());
        Ok(rows
            .into_iter()
            .map(|(user, profile)| UserAccount { user, profile })
            .collect())
    }

    /// Register an account on someone's behalf (admin only)
    pub async fn create_user(
        &self,
        caller: &Caller,
        new_user: NewUser,
        role: UserRole,
    ) -> BoardResult<Caller> {
        lookup::require_admin(caller)?;
        self.register_user(new_user, role).await
    }

    /// Edit account, role and profile fields (admin only)
    pub async fn update_user(
        &self,
        caller: &Caller,
        user_id: Uuid,
        changes: UserChanges,
    ) -> BoardResult<UserAccount> {
        lookup::require_admin(caller)?;

        let user = lookup::user(&self.db, user_id).await?;
        let profile = profile_of(&self.db, &user).await?;

        let txn = self.db.begin().await?;

        let mut active_user: user::ActiveModel = user.into();
        if let Some(email) = changes.email {
            active_user.email = Set(optional_text(Some(email)));
        }
        if let Some(full_name) = changes.full_name {
            active_user.full_name = Set(optional_text(Some(full_name)));
        }
        if let Some(is_active) = changes.is_active {
            if !is_active && user_id == caller.id() {
                return Err(BoardError::invalid("You cannot disable your own account"));
            }
            active_user.is_active = Set(is_active);
        }
        active_user.updated_at = Set(Utc::now());
        let user = active_user.update(&txn).await?;

        let profile = match profile {
            Some(profile) => {
                let mut active: profile::ActiveModel = profile.into();
                if let Some(role) = changes.role {
                    active.role = Set(role);
                }
                apply_profile_changes(&mut active, changes.profile)?;
                persist_profile(&txn, active).await?
            }
            None => {
                let mut active = profile::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user.id),
                    role: Set(changes.role.unwrap_or(UserRole::Member)),
                    bio: Set(None),
                    phone: Set(None),
                    birthdate: Set(None),
                };
                apply_profile_changes(&mut active, changes.profile)?;
                active.insert(&txn).await?
            }
        };

        txn.commit().await?;

        info!("User {} updated by {}", user.username, caller.username());
        Ok(UserAccount {
            user,
            profile: Some(profile),
        })
    }

    /// Delete an account; its profile and memberships cascade (admin only)
    pub async fn delete_user(&self, caller: &Caller, user_id: Uuid) -> BoardResult<user::Model> {
        lookup::require_admin(caller)?;

        if user_id == caller.id() {
            return Err(BoardError::invalid("You cannot delete your own account"));
        }

        let user = lookup::user(&self.db, user_id).await?;
        user.clone().delete(&self.db).await?;

        info!("User {} deleted by {}", user.username, caller.username());
        Ok(user)
    }
}
