//! Category CRUD handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use bazaar_core::CategoryId;

use super::MessageResponse;
use crate::error::Result;
use crate::extract::{ApiJson, ApiPath, nullable};
use crate::models::{Category, CategoryChanges};
use crate::services::categories::CategoryService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Partial update; `"description": null` clears the description.
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
}

/// `GET /api/categories`
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = CategoryService::new(state.pool()).list().await?;
    Ok(Json(categories))
}

/// `POST /api/categories`
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>)> {
    let category = CategoryService::new(state.pool())
        .create(&body.name, body.description)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// `GET /api/categories/{id}`
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CategoryId>,
) -> Result<Json<Category>> {
    let category = CategoryService::new(state.pool()).get(id).await?;
    Ok(Json(category))
}

/// `PATCH /api/categories/{id}`
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CategoryId>,
    ApiJson(body): ApiJson<UpdateCategoryRequest>,
) -> Result<Json<Category>> {
    let changes = CategoryChanges {
        name: body.name,
        description: body.description,
    };
    let category = CategoryService::new(state.pool()).update(id, changes).await?;
    Ok(Json(category))
}

/// `DELETE /api/categories/{id}`
pub async fn destroy(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CategoryId>,
) -> Result<Json<MessageResponse>> {
    CategoryService::new(state.pool()).delete(id).await?;
    Ok(Json(MessageResponse::new("Category deleted successfully")))
}
