//! HTTP handlers for production lot endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::lot::{CreateLotInput, CreatedLot, LotService, UpdateLotInput};
use crate::AppState;
use shared::ProductionLot;

/// Create a production lot
pub async fn create_lot(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateLotInput>,
) -> AppResult<Json<CreatedLot>> {
    let service = LotService::new(state.db);
    let lote = service.create(Some(current_user.0.user_id), input).await?;
    Ok(Json(lote))
}

/// List production lots
pub async fn list_lots(State(state): State<AppState>) -> AppResult<Json<Vec<ProductionLot>>> {
    let service = LotService::new(state.db);
    let lotes = service.list().await?;
    Ok(Json(lotes))
}

/// Get a production lot by id
pub async fn get_lot(
    State(state): State<AppState>,
    Path(lote_id): Path<Uuid>,
) -> AppResult<Json<ProductionLot>> {
    let service = LotService::new(state.db);
    let lote = service.get(lote_id).await?;
    Ok(Json(lote))
}

/// List lots of one product
pub async fn get_lots_by_product(
    State(state): State<AppState>,
    Path(producto_id): Path<Uuid>,
) -> AppResult<Json<Vec<ProductionLot>>> {
    let service = LotService::new(state.db);
    let lotes = service.list_by_product(producto_id).await?;
    Ok(Json(lotes))
}

/// Update a production lot
pub async fn update_lot(
    State(state): State<AppState>,
    Path(lote_id): Path<Uuid>,
    Json(input): Json<UpdateLotInput>,
) -> AppResult<Json<ProductionLot>> {
    let service = LotService::new(state.db);
    let lote = service.update(lote_id, input).await?;
    Ok(Json(lote))
}

/// Delete a production lot
pub async fn delete_lot(
    State(state): State<AppState>,
    Path(lote_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = LotService::new(state.db);
    service.delete(lote_id).await?;
    Ok(Json(()))
}
