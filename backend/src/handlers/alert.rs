//! HTTP handlers for alert endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::alert::{AlertService, AlertWithRefs, UpdateAlertStatusInput};
use crate::AppState;
use shared::Alert;

/// Discard all alerts and regenerate them from current state
pub async fn generate_alerts(State(state): State<AppState>) -> AppResult<Json<Vec<Alert>>> {
    let service = AlertService::new(state.db);
    let alertas = service.regenerate_all().await?;
    Ok(Json(alertas))
}

/// List alerts
pub async fn list_alerts(State(state): State<AppState>) -> AppResult<Json<Vec<AlertWithRefs>>> {
    let service = AlertService::new(state.db);
    let alertas = service.list().await?;
    Ok(Json(alertas))
}

/// Update an alert's handling status
pub async fn update_alert_status(
    State(state): State<AppState>,
    Path(alerta_id): Path<Uuid>,
    Json(input): Json<UpdateAlertStatusInput>,
) -> AppResult<Json<Alert>> {
    let service = AlertService::new(state.db);
    let alerta = service.update_status(alerta_id, input).await?;
    Ok(Json(alerta))
}
