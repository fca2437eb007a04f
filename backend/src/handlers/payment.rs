//! HTTP handlers for payment endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::payment::{
    CreatePaymentInput, CreatedPayment, OutstandingSaleView, PaymentService,
    PaymentWithAllocations,
};
use crate::AppState;

/// Register a payment and apply it across outstanding sales
pub async fn create_payment(
    State(state): State<AppState>,
    Json(input): Json<CreatePaymentInput>,
) -> AppResult<Json<CreatedPayment>> {
    let service = PaymentService::new(state.db);
    let pago = service.create(input).await?;
    Ok(Json(pago))
}

/// Payments made by a client
pub async fn get_payments_by_client(
    State(state): State<AppState>,
    Path(cliente_id): Path<Uuid>,
) -> AppResult<Json<Vec<PaymentWithAllocations>>> {
    let service = PaymentService::new(state.db);
    let pagos = service.list_by_client(cliente_id).await?;
    Ok(Json(pagos))
}

/// Sales of a client with an outstanding balance
pub async fn get_outstanding_sales_by_client(
    State(state): State<AppState>,
    Path(cliente_id): Path<Uuid>,
) -> AppResult<Json<Vec<OutstandingSaleView>>> {
    let service = PaymentService::new(state.db);
    let ventas = service.outstanding_by_client(cliente_id).await?;
    Ok(Json(ventas))
}
