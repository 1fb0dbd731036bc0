//! Bearer token authentication extractor.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};

use crate::error::{AppError, set_sentry_user};
use crate::models::User;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Extractor that requires a valid bearer token for an existing user.
///
/// Rejects with 401 when the `Authorization` header is missing or malformed,
/// the token fails verification, or the user it names no longer exists.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub User);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

        let claims = state.tokens().verify(token).inspect_err(|e| {
            tracing::warn!(error = %e, "bearer token rejected");
        })?;

        let user = AuthService::new(state.pool(), state.tokens())
            .validate_user(claims.sub)
            .await?
            .ok_or_else(|| {
                tracing::warn!(user_id = %claims.sub, "bearer token for unknown user");
                AppError::Unauthorized("User no longer exists".to_string())
            })?;

        set_sentry_user(&user.id, user.username.as_str());
        Ok(Self(user))
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let token = headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?
        .trim();

    (!token.is_empty()).then_some(token)
}
