//! Sales models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Sale lifecycle status
///
/// `Completada` holds exactly when the outstanding balance is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Pendiente,
    Completada,
    Cancelada,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Pendiente => "pendiente",
            SaleStatus::Completada => "completada",
            SaleStatus::Cancelada => "cancelada",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pendiente" => Some(SaleStatus::Pendiente),
            "completada" => Some(SaleStatus::Completada),
            "cancelada" => Some(SaleStatus::Cancelada),
            _ => None,
        }
    }
}

/// A sale to a client
///
/// Invariant: `saldo_venta == total_venta - pago_inicial - Σ payments
/// applied`, and `estado == completada` iff `saldo_venta == 0`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,
    pub cliente_id: Uuid,
    pub vendedor_id: Uuid,
    pub total_venta: Decimal,
    pub saldo_venta: Decimal,
    pub pago_inicial: Decimal,
    pub fecha_venta: DateTime<Utc>,
    pub estado: SaleStatus,
    pub notas: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One product line of a sale
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    pub id: Uuid,
    pub venta_id: Uuid,
    pub producto_id: Uuid,
    pub cantidad: Decimal,
    pub precio_unitario: Decimal,
}

/// Per-lot consumption recorded for one sale line
///
/// The quantities of a line's allocations sum to the line quantity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineLot {
    pub id: Uuid,
    pub venta_linea_id: Uuid,
    pub lote_id: Uuid,
    pub cantidad: Decimal,
}
