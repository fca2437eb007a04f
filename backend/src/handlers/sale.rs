//! HTTP handlers for sales endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::PageQuery;
use crate::services::sale::{
    CreateSaleInput, CreatedSale, SaleDetail, SaleService, SaleWithParties, UpdateSaleInput,
};
use crate::AppState;
use shared::{PaginatedResponse, Sale};

/// Create a sale
pub async fn create_sale(
    State(state): State<AppState>,
    Json(input): Json<CreateSaleInput>,
) -> AppResult<Json<CreatedSale>> {
    let service = SaleService::new(state.db);
    let venta = service.create(input).await?;
    Ok(Json(venta))
}

/// List sales
pub async fn list_sales(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<SaleWithParties>>> {
    let service = SaleService::new(state.db);
    let ventas = service.list(page.into_pagination()).await?;
    Ok(Json(ventas))
}

/// Get a sale with its lines and lot slices
pub async fn get_sale(
    State(state): State<AppState>,
    Path(venta_id): Path<Uuid>,
) -> AppResult<Json<SaleDetail>> {
    let service = SaleService::new(state.db);
    let venta = service.get(venta_id).await?;
    Ok(Json(venta))
}

/// Update non-quantity fields of a sale
pub async fn update_sale(
    State(state): State<AppState>,
    Path(venta_id): Path<Uuid>,
    Json(input): Json<UpdateSaleInput>,
) -> AppResult<Json<Sale>> {
    let service = SaleService::new(state.db);
    let venta = service.update(venta_id, input).await?;
    Ok(Json(venta))
}

/// Delete a sale
pub async fn delete_sale(
    State(state): State<AppState>,
    Path(venta_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = SaleService::new(state.db);
    service.delete(venta_id).await?;
    Ok(Json(()))
}
