//! Inventory movement models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Movement kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR")]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementType {
    #[sqlx(rename = "ENTRADA")]
    Entrada,
    #[sqlx(rename = "SALIDA")]
    Salida,
    #[sqlx(rename = "AJUSTE")]
    Ajuste,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Entrada => "ENTRADA",
            MovementType::Salida => "SALIDA",
            MovementType::Ajuste => "AJUSTE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ENTRADA" => Some(MovementType::Entrada),
            "SALIDA" => Some(MovementType::Salida),
            "AJUSTE" => Some(MovementType::Ajuste),
            _ => None,
        }
    }
}

/// An auditable record of a stock-affecting event
///
/// Append-only: rows are never mutated after creation. `cantidad` is signed
/// only for AJUSTE movements.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InventoryMovement {
    pub id: Uuid,
    pub movimiento_id: String,
    pub producto_id: Uuid,
    pub lote_id: Option<Uuid>,
    pub tipo_movimiento: MovementType,
    pub razon: String,
    pub cantidad: Decimal,
    pub fecha_movimiento: DateTime<Utc>,
    pub costo_movimiento: Option<Decimal>,
    pub usuario_id: Option<Uuid>,
    pub origen_destino: String,
    pub created_at: DateTime<Utc>,
}
