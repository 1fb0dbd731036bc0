//! Registration, login and current-user handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::RequireAuth;
use crate::models::User;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Registration body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Login body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: User,
    /// Bearer token for the `Authorization` header.
    pub token: String,
}

/// `POST /auth/register`
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let user = AuthService::new(state.pool(), state.tokens())
        .register(&body.email, &body.username, &body.password)
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let (user, token) = AuthService::new(state.pool(), state.tokens())
        .login(&body.email, &body.password)
        .await?;

    Ok(Json(LoginResponse { user, token }))
}

/// `GET /auth/me`
pub async fn me(RequireAuth(user): RequireAuth) -> Json<User> {
    Json(user)
}
