//! HTTP handlers for stock ledger endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::stock::{StockService, StockWithProduct, UpdateStockInput};
use crate::AppState;
use shared::Stock;

/// Stock update response with an optional low-stock advisory
#[derive(Debug, Serialize)]
pub struct StockUpdateResponse {
    pub stock: Stock,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advertencia: Option<String>,
}

/// List stock for all products
pub async fn list_stock(State(state): State<AppState>) -> AppResult<Json<Vec<StockWithProduct>>> {
    let service = StockService::new(state.db);
    let stock = service.list().await?;
    Ok(Json(stock))
}

/// Get stock for one product
pub async fn get_stock_by_product(
    State(state): State<AppState>,
    Path(producto_id): Path<Uuid>,
) -> AppResult<Json<Stock>> {
    let service = StockService::new(state.db);
    let stock = service.get_by_product(producto_id).await?;
    Ok(Json(stock))
}

/// Update counters and thresholds for one product's stock
pub async fn update_stock(
    State(state): State<AppState>,
    Path(producto_id): Path<Uuid>,
    Json(input): Json<UpdateStockInput>,
) -> AppResult<Json<StockUpdateResponse>> {
    let service = StockService::new(state.db);
    let (stock, advertencia) = service.update(producto_id, input).await?;
    Ok(Json(StockUpdateResponse { stock, advertencia }))
}
