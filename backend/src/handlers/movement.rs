//! HTTP handlers for inventory movement endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::PageQuery;
use crate::middleware::CurrentUser;
use crate::services::movement::{MovementService, MovementWithRefs, RecordMovementInput};
use crate::AppState;
use shared::{InventoryMovement, PaginatedResponse};

/// Record an inventory movement
pub async fn record_movement(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecordMovementInput>,
) -> AppResult<Json<InventoryMovement>> {
    let service = MovementService::new(state.db);
    let movimiento = service.record(Some(current_user.0.user_id), input).await?;
    Ok(Json(movimiento))
}

/// List inventory movements
pub async fn list_movements(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<MovementWithRefs>>> {
    let service = MovementService::new(state.db);
    let movimientos = service.list(page.into_pagination()).await?;
    Ok(Json(movimientos))
}

/// Get a movement by id
pub async fn get_movement(
    State(state): State<AppState>,
    Path(movimiento_id): Path<Uuid>,
) -> AppResult<Json<MovementWithRefs>> {
    let service = MovementService::new(state.db);
    let movimiento = service.get(movimiento_id).await?;
    Ok(Json(movimiento))
}

/// Delete a movement
pub async fn delete_movement(
    State(state): State<AppState>,
    Path(movimiento_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = MovementService::new(state.db);
    service.delete(movimiento_id).await?;
    Ok(Json(()))
}
