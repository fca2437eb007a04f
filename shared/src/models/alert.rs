//! Alert models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Alert category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    StockBajo,
    Vencimiento,
    AlmacenamientoMaximo,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::StockBajo => "stock_bajo",
            AlertType::Vencimiento => "vencimiento",
            AlertType::AlmacenamientoMaximo => "almacenamiento_maximo",
        }
    }
}

/// Alert priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AlertPriority {
    Baja,
    Media,
    Alta,
}

/// Alert handling status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Pendiente,
    EnProceso,
    Resuelto,
}

impl AlertStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pendiente" => Some(AlertStatus::Pendiente),
            "en_proceso" => Some(AlertStatus::EnProceso),
            "resuelto" => Some(AlertStatus::Resuelto),
            _ => None,
        }
    }
}

/// A derived inventory alert
///
/// The whole collection is regenerated on each alert run; rows carry
/// threshold/actual snapshots taken at generation time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: Uuid,
    pub producto_id: Uuid,
    pub lote_id: Option<Uuid>,
    pub tipo_alerta: AlertType,
    pub descripcion: String,
    pub prioridad: AlertPriority,
    pub umbral_reabastecimiento: Option<Decimal>,
    pub stock_actual: Option<Decimal>,
    pub stock_minimo: Option<Decimal>,
    pub stock_maximo: Option<Decimal>,
    pub fecha_vencimiento: Option<DateTime<Utc>>,
    pub fecha_alerta: DateTime<Utc>,
    pub estado: AlertStatus,
    pub created_at: DateTime<Utc>,
}
