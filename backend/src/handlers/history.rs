//! HTTP handlers for historical aggregate endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::history::HistoryService;
use crate::AppState;
use shared::{HistoryPoint, PeriodGranularity};

/// Query parameters for history endpoints
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub granularidad: Option<PeriodGranularity>,
}

impl HistoryQuery {
    fn granularity(&self) -> PeriodGranularity {
        self.granularidad.unwrap_or(PeriodGranularity::Diario)
    }
}

/// Time-bucketed sale totals for a product
pub async fn get_sales_history(
    State(state): State<AppState>,
    Path(producto_id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<HistoryPoint>>> {
    let service = HistoryService::new(state.db);
    let historial = service
        .sales_history(producto_id, query.granularity())
        .await?;
    Ok(Json(historial))
}

/// Time-bucketed produced quantities for a product
pub async fn get_production_history(
    State(state): State<AppState>,
    Path(producto_id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<HistoryPoint>>> {
    let service = HistoryService::new(state.db);
    let historial = service
        .production_history(producto_id, query.granularity())
        .await?;
    Ok(Json(historial))
}
