//! HTTP handlers for parameter endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::parameter::{ParameterService, UpdateParameterInput};
use crate::AppState;
use shared::Parameter;

/// List parameters
pub async fn list_parameters(State(state): State<AppState>) -> AppResult<Json<Vec<Parameter>>> {
    let service = ParameterService::new(state.db);
    let parametros = service.list().await?;
    Ok(Json(parametros))
}

/// Get a parameter by id
pub async fn get_parameter(
    State(state): State<AppState>,
    Path(parametro_id): Path<Uuid>,
) -> AppResult<Json<Parameter>> {
    let service = ParameterService::new(state.db);
    let parametro = service.get(parametro_id).await?;
    Ok(Json(parametro))
}

/// Update a parameter value
pub async fn update_parameter(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(parametro_id): Path<Uuid>,
    Json(input): Json<UpdateParameterInput>,
) -> AppResult<Json<Parameter>> {
    let service = ParameterService::new(state.db);
    let parametro = service
        .update(parametro_id, Some(current_user.0.user_id), input)
        .await?;
    Ok(Json(parametro))
}
