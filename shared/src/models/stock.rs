//! Stock ledger models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Per-product running stock figures, one row per product
///
/// `stock_actual` is the movement-driven counter; `stock_disponible` is the
/// derived sum of available quantity over the product's `disponible` lots.
/// The two are maintained by independent triggers and may legitimately
/// differ.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    pub id: Uuid,
    pub producto_id: Uuid,
    pub stock_actual: Decimal,
    pub stock_reservado: Decimal,
    pub stock_minimo: Decimal,
    pub stock_maximo: Decimal,
    pub stock_disponible: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
