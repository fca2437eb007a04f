//! Production lot models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lot lifecycle status
///
/// `Agotado` is reached automatically when the available quantity drops to
/// zero; the damage/expiry/packaging states are administrative transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR")]
pub enum LotStatus {
    #[serde(rename = "disponible")]
    #[sqlx(rename = "disponible")]
    Disponible,
    #[serde(rename = "dañado")]
    #[sqlx(rename = "dañado")]
    Danado,
    #[serde(rename = "expirado")]
    #[sqlx(rename = "expirado")]
    Expirado,
    #[serde(rename = "agotado")]
    #[sqlx(rename = "agotado")]
    Agotado,
    #[serde(rename = "mal_empaque")]
    #[sqlx(rename = "mal_empaque")]
    MalEmpaque,
}

impl LotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LotStatus::Disponible => "disponible",
            LotStatus::Danado => "dañado",
            LotStatus::Expirado => "expirado",
            LotStatus::Agotado => "agotado",
            LotStatus::MalEmpaque => "mal_empaque",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "disponible" => Some(LotStatus::Disponible),
            "dañado" => Some(LotStatus::Danado),
            "expirado" => Some(LotStatus::Expirado),
            "agotado" => Some(LotStatus::Agotado),
            "mal_empaque" => Some(LotStatus::MalEmpaque),
            _ => None,
        }
    }

    /// Only `disponible` lots count towards sellable stock.
    pub fn is_sellable(&self) -> bool {
        matches!(self, LotStatus::Disponible)
    }
}

/// A dated batch of produced units of one product
///
/// Invariant: `cantidad_disponible == cantidad_producida - cantidad_vendida`,
/// and a non-positive available quantity forces `estado == agotado`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductionLot {
    pub id: Uuid,
    pub producto_id: Uuid,
    pub fecha_produccion: DateTime<Utc>,
    pub cantidad_producida: Decimal,
    pub cantidad_vendida: Decimal,
    pub cantidad_disponible: Decimal,
    pub fecha_vencimiento: DateTime<Utc>,
    pub costo_lote: Decimal,
    pub ubicacion_lote: String,
    pub codigo_lote: String,
    pub estado: LotStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
