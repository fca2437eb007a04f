//! HTTP handlers for category management endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::category::{CategoryInput, CategoryService};
use crate::AppState;
use shared::Category;

/// Create a category
pub async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<CategoryInput>,
) -> AppResult<Json<Category>> {
    let service = CategoryService::new(state.db);
    let categoria = service.create(input).await?;
    Ok(Json(categoria))
}

/// List categories
pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    let service = CategoryService::new(state.db);
    let categorias = service.list().await?;
    Ok(Json(categorias))
}

/// Get a category by id
pub async fn get_category(
    State(state): State<AppState>,
    Path(categoria_id): Path<Uuid>,
) -> AppResult<Json<Category>> {
    let service = CategoryService::new(state.db);
    let categoria = service.get(categoria_id).await?;
    Ok(Json(categoria))
}

/// Update a category
pub async fn update_category(
    State(state): State<AppState>,
    Path(categoria_id): Path<Uuid>,
    Json(input): Json<CategoryInput>,
) -> AppResult<Json<Category>> {
    let service = CategoryService::new(state.db);
    let categoria = service.update(categoria_id, input).await?;
    Ok(Json(categoria))
}

/// Delete a category
pub async fn delete_category(
    State(state): State<AppState>,
    Path(categoria_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = CategoryService::new(state.db);
    service.delete(categoria_id).await?;
    Ok(Json(()))
}
