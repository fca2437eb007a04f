//! Operational parameter models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A named, operator-configurable numeric threshold
///
/// Threshold-driven computations read parameters by name; a missing required
/// parameter is a configuration error, never a silent default.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub id: Uuid,
    pub nombre: String,
    pub valor: Decimal,
    pub descripcion: Option<String>,
    pub actualizado_por: Option<Uuid>,
    pub fecha_actualizacion: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameter names every deployment must carry
pub mod parametros {
    pub const LIMITE_DEUDAS_CLIENTE: &str = "limite_Deudas_Cliente";
    pub const DIAS_PROXIMOS_A_EXPIRAR: &str = "dias_Proximos_A_Expirar";
    pub const STOCK_MINIMO: &str = "stock_Minimo";
    pub const STOCK_MAXIMO: &str = "stock_Maximo";
    pub const DIAS_ANTES_ALERTA_EXPIRACION: &str = "dias_Antes_Alerta_Expiracion";
    pub const CANTIDAD_MINIMA_REABASTECIMIENTO: &str = "cantidad_minima_reabastecimiento";
}
