//! Authentication service.
//!
//! Provides password registration and login, and issues bearer tokens.

mod error;
mod token;

pub use error::AuthError;
pub use token::{Claims, TokenError, TokenKeys};

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use tracing::instrument;

use bazaar_core::{Email, UserId, Username};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Hash verified against when the email is unknown, so both failed-login
/// paths cost one Argon2 verification.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("bazaar-unknown-account").ok());

/// Authentication service.
///
/// Handles user registration, login and bearer-token subject lookup.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: &'a TokenKeys,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenKeys) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens,
        }
    }

    /// Register a new user with email, username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` / `AuthError::InvalidUsername` for
    /// malformed input.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::UserAlreadyExists` if the email or username is taken.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        let username = Username::parse(username)?;
        validate_password(password)?;

        if self
            .users
            .exists_by_email_or_username(&email, &username)
            .await?
        {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = hash_password(password)?;

        // The unique constraints still catch a concurrent registration
        let user = self
            .users
            .create(&email, &username, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Login with email and password, returning the user and a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email is unknown or the
    /// password does not match.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AuthError> {
        let email = Email::parse(email)?;
        if password.is_empty() {
            return Err(AuthError::WeakPassword("password is required".to_string()));
        }

        let Some(credentials) = self.users.get_credentials(&email).await? else {
            verify_unknown_account(password);
            tracing::warn!("login for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if let Err(e) = verify_password(password, &credentials.password_hash) {
            tracing::warn!(user_id = %credentials.user.id, "login with wrong password");
            return Err(e);
        }

        let token = self.tokens.issue(&credentials.user)?;
        tracing::info!(user_id = %credentials.user.id, "user logged in");
        Ok((credentials.user, token))
    }

    /// Look up the subject of a verified token.
    ///
    /// Returns `None` if the user has since been removed.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the lookup fails.
    pub async fn validate_user(&self, user_id: UserId) -> Result<Option<User>, AuthError> {
        Ok(self.users.get_by_id(user_id).await?)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Spend the same verification work as a real account, discarding the result.
fn verify_unknown_account(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}
