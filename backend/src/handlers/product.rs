//! HTTP handlers for product management endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::product::{
    CreateProductInput, CreatedProduct, ProductService, ProductWithCategory, UpdateProductInput,
};
use crate::AppState;
use shared::Product;

/// Create a product
pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<CreateProductInput>,
) -> AppResult<Json<CreatedProduct>> {
    let service = ProductService::new(state.db);
    let producto = service.create(input).await?;
    Ok(Json(producto))
}

/// List products
pub async fn list_products(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ProductWithCategory>>> {
    let service = ProductService::new(state.db);
    let productos = service.list().await?;
    Ok(Json(productos))
}

/// Get a product by id
pub async fn get_product(
    State(state): State<AppState>,
    Path(producto_id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db);
    let producto = service.get(producto_id).await?;
    Ok(Json(producto))
}

/// Update a product
pub async fn update_product(
    State(state): State<AppState>,
    Path(producto_id): Path<Uuid>,
    Json(input): Json<UpdateProductInput>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db);
    let producto = service.update(producto_id, input).await?;
    Ok(Json(producto))
}

/// Delete a product
pub async fn delete_product(
    State(state): State<AppState>,
    Path(producto_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = ProductService::new(state.db);
    service.delete(producto_id).await?;
    Ok(Json(()))
}
