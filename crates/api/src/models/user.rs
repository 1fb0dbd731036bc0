//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{Email, UserId, Username};

/// A registered account.
///
/// The password hash never leaves the repository layer, so this type is safe
/// to serialize straight into a response.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login email address, unique.
    pub email: Email,
    /// Display handle, unique.
    pub username: Username,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    #[serde(skip)]
    pub updated_at: DateTime<Utc>,
}

/// A user together with the stored password hash, for login.
#[derive(Debug, sqlx::FromRow)]
pub struct UserCredentials {
    #[sqlx(flatten)]
    pub user: User,
    /// Argon2id PHC string.
    pub password_hash: String,
}
