//! Payment allocator
//!
//! Applies a client payment across their outstanding sales oldest-first,
//! splitting over as many sales as the amount covers. Explicit-sales mode
//! requires the amount to match the cited sales' combined balance exactly;
//! auto mode caps the amount at the client's total outstanding debt.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::{
    payment_totals_consistent, plan_payment_allocation, OutstandingSale, Payment,
    PaymentAllocation, PaymentMethod, SaleStatus,
};

// ---------------------------------------------------------------------------
// Inputs and outputs
// ---------------------------------------------------------------------------

/// Input for registering a payment
#[derive(Debug, Deserialize)]
pub struct CreatePaymentInput {
    pub cliente_id: Uuid,
    pub monto_pagado: Decimal,
    pub metodo_pago: PaymentMethod,
    pub fecha_pago: Option<DateTime<Utc>>,
    /// Explicit sales to settle; omitted means all outstanding sales
    pub ventas: Option<Vec<Uuid>>,
    pub notas: Option<String>,
}

/// Result of registering a payment
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPayment {
    pub pago: Payment,
    pub pagos_aplicados: Vec<PaymentAllocation>,
}

/// Payment with its allocation detail and sale summaries
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentWithAllocations {
    #[serde(flatten)]
    pub pago: Payment,
    pub pagos_aplicados: Vec<AllocationDetail>,
}

/// One allocation enriched with its sale's date and total
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AllocationDetail {
    pub venta_id: Uuid,
    pub fecha_venta: DateTime<Utc>,
    pub total_venta: Decimal,
    pub saldo_previo: Decimal,
    pub pago_aplicado: Decimal,
    pub saldo_restante: Decimal,
}

/// Outstanding sale summary for a client
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OutstandingSaleView {
    pub venta_id: Uuid,
    pub fecha_venta: DateTime<Utc>,
    pub total_venta: Decimal,
    pub saldo_venta: Decimal,
}

#[derive(sqlx::FromRow)]
struct PendingSaleRow {
    id: Uuid,
    cliente_id: Uuid,
    saldo_venta: Decimal,
}

/// Payment allocator service
#[derive(Clone)]
pub struct PaymentService {
    db: PgPool,
}

impl PaymentService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Register a payment and apply it across the client's outstanding sales
    pub async fn create(&self, input: CreatePaymentInput) -> AppResult<CreatedPayment> {
        if input.monto_pagado <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "montoPagado".to_string(),
                message: "Paid amount must be greater than zero".to_string(),
                message_es: "El campo \"montoPagado\" debe ser un número mayor a cero".to_string(),
            });
        }

        let pendientes = match &input.ventas {
            Some(ids) if !ids.is_empty() => {
                let encontradas = sqlx::query_as::<_, PendingSaleRow>(
                    r#"
                    SELECT id, cliente_id, saldo_venta
                    FROM ventas
                    WHERE id = ANY($1) AND saldo_venta > 0
                    ORDER BY fecha_venta ASC
                    "#,
                )
                .bind(&ids[..])
                .fetch_all(&self.db)
                .await?;

                if encontradas.is_empty() {
                    return Err(AppError::NoOutstandingSales);
                }

                let ajenas: Vec<Uuid> = encontradas
                    .iter()
                    .filter(|v| v.cliente_id != input.cliente_id)
                    .map(|v| v.id)
                    .collect();
                if !ajenas.is_empty() {
                    return Err(AppError::SaleNotOwnedByClient { ventas: ajenas });
                }

                let sin_saldo: Vec<Uuid> = ids
                    .iter()
                    .filter(|id| !encontradas.iter().any(|v| v.id == **id))
                    .copied()
                    .collect();
                if !sin_saldo.is_empty() {
                    return Err(AppError::ValidationError(format!(
                        "One or more cited sales have no outstanding balance: {:?}",
                        sin_saldo
                    )));
                }

                let total_deuda: Decimal = encontradas.iter().map(|v| v.saldo_venta).sum();
                if input.monto_pagado != total_deuda {
                    return Err(AppError::AmountMismatch {
                        esperado: total_deuda,
                    });
                }

                encontradas
            }
            _ => {
                let encontradas = sqlx::query_as::<_, PendingSaleRow>(
                    r#"
                    SELECT id, cliente_id, saldo_venta
                    FROM ventas
                    WHERE cliente_id = $1 AND saldo_venta > 0
                    ORDER BY fecha_venta ASC
                    "#,
                )
                .bind(input.cliente_id)
                .fetch_all(&self.db)
                .await?;

                if encontradas.is_empty() {
                    return Err(AppError::NoOutstandingSales);
                }

                let total_deuda: Decimal = encontradas.iter().map(|v| v.saldo_venta).sum();
                if input.monto_pagado > total_deuda {
                    return Err(AppError::AmountExceedsDebt { deuda: total_deuda });
                }

                encontradas
            }
        };

        let orden: Vec<OutstandingSale> = pendientes
            .iter()
            .map(|v| OutstandingSale {
                venta_id: v.id,
                saldo: v.saldo_venta,
            })
            .collect();
        let plan = plan_payment_allocation(input.monto_pagado, &orden);

        let aplicados: Vec<Decimal> = plan.aplicaciones.iter().map(|a| a.pago_aplicado).collect();
        if !payment_totals_consistent(input.monto_pagado, &aplicados, plan.restante) {
            return Err(AppError::Internal(
                "Payment allocation does not add up to the paid amount".to_string(),
            ));
        }

        let fecha_pago = input.fecha_pago.unwrap_or_else(Utc::now);
        let mut tx = self.db.begin().await?;

        for aplicacion in &plan.aplicaciones {
            let estado = if aplicacion.saldo_restante == Decimal::ZERO {
                SaleStatus::Completada
            } else {
                SaleStatus::Pendiente
            };
            sqlx::query(
                "UPDATE ventas SET saldo_venta = $1, estado = $2, updated_at = NOW() WHERE id = $3",
            )
            .bind(aplicacion.saldo_restante)
            .bind(estado)
            .bind(aplicacion.venta_id)
            .execute(&mut *tx)
            .await?;
        }

        let pago = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO pagos (cliente_id, monto_pagado, saldo_restante, metodo_pago, fecha_pago, notas)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, cliente_id, monto_pagado, saldo_restante, metodo_pago, fecha_pago,
                      notas, created_at
            "#,
        )
        .bind(input.cliente_id)
        .bind(input.monto_pagado)
        .bind(plan.restante)
        .bind(input.metodo_pago)
        .bind(fecha_pago)
        .bind(&input.notas)
        .fetch_one(&mut *tx)
        .await?;

        let mut pagos_aplicados = Vec::with_capacity(plan.aplicaciones.len());
        for aplicacion in &plan.aplicaciones {
            let registro = sqlx::query_as::<_, PaymentAllocation>(
                r#"
                INSERT INTO pago_aplicaciones (pago_id, venta_id, saldo_previo, pago_aplicado, saldo_restante)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, pago_id, venta_id, saldo_previo, pago_aplicado, saldo_restante
                "#,
            )
            .bind(pago.id)
            .bind(aplicacion.venta_id)
            .bind(aplicacion.saldo_previo)
            .bind(aplicacion.pago_aplicado)
            .bind(aplicacion.saldo_restante)
            .fetch_one(&mut *tx)
            .await?;
            pagos_aplicados.push(registro);
        }

        tx.commit().await?;

        Ok(CreatedPayment {
            pago,
            pagos_aplicados,
        })
    }

    /// Payments made by a client, newest first, with allocation detail
    pub async fn list_by_client(&self, cliente_id: Uuid) -> AppResult<Vec<PaymentWithAllocations>> {
        let pagos = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, cliente_id, monto_pagado, saldo_restante, metodo_pago, fecha_pago,
                   notas, created_at
            FROM pagos
            WHERE cliente_id = $1
            ORDER BY fecha_pago DESC
            "#,
        )
        .bind(cliente_id)
        .fetch_all(&self.db)
        .await?;

        if pagos.is_empty() {
            return Err(AppError::NotFound("Pagos para este cliente".to_string()));
        }

        let mut resultado = Vec::with_capacity(pagos.len());
        for pago in pagos {
            let pagos_aplicados = sqlx::query_as::<_, AllocationDetail>(
                r#"
                SELECT pa.venta_id, v.fecha_venta, v.total_venta,
                       pa.saldo_previo, pa.pago_aplicado, pa.saldo_restante
                FROM pago_aplicaciones pa
                JOIN ventas v ON v.id = pa.venta_id
                WHERE pa.pago_id = $1
                "#,
            )
            .bind(pago.id)
            .fetch_all(&self.db)
            .await?;

            resultado.push(PaymentWithAllocations {
                pago,
                pagos_aplicados,
            });
        }

        Ok(resultado)
    }

    /// Sales of a client that still carry an outstanding balance
    pub async fn outstanding_by_client(
        &self,
        cliente_id: Uuid,
    ) -> AppResult<Vec<OutstandingSaleView>> {
        let ventas = sqlx::query_as::<_, OutstandingSaleView>(
            r#"
            SELECT id AS venta_id, fecha_venta, total_venta, saldo_venta
            FROM ventas
            WHERE cliente_id = $1 AND saldo_venta > 0
            ORDER BY fecha_venta DESC
            "#,
        )
        .bind(cliente_id)
        .fetch_all(&self.db)
        .await?;

        if ventas.is_empty() {
            return Err(AppError::NotFound(
                "Ventas con saldo pendiente para este cliente".to_string(),
            ));
        }

        Ok(ventas)
    }
}
