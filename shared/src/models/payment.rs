//! Payment models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Accepted payment methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Efectivo,
    Transferencia,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Efectivo => "efectivo",
            PaymentMethod::Transferencia => "transferencia",
        }
    }
}

/// A client payment applied across outstanding sales
///
/// Invariant: `Σ pago_aplicado` over the allocations plus `saldo_restante`
/// equals `monto_pagado`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub cliente_id: Uuid,
    pub monto_pagado: Decimal,
    pub saldo_restante: Decimal,
    pub metodo_pago: PaymentMethod,
    pub fecha_pago: DateTime<Utc>,
    pub notas: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One slice of a payment applied to a single sale
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAllocation {
    pub id: Uuid,
    pub pago_id: Uuid,
    pub venta_id: Uuid,
    pub saldo_previo: Decimal,
    pub pago_aplicado: Decimal,
    pub saldo_restante: Decimal,
}
