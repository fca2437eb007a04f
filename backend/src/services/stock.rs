//! Stock ledger service
//!
//! Keeps the two per-product figures of the ledger:
//! - `stock_actual`, a plain counter driven by inventory movements, and
//! - `stock_disponible`, derived as the sum of available quantity over the
//!   product's `disponible` lots.
//!
//! `recompute_available` is the single, explicit synchronization point for
//! the derived figure; every lot mutation path calls it before committing.

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::{parametros, Stock};

/// Recompute `stock_disponible` from the product's `disponible` lots
///
/// Runs on the caller's connection so lot mutation and recompute commit
/// together.
pub async fn recompute_available(
    conn: &mut PgConnection,
    producto_id: Uuid,
) -> AppResult<Decimal> {
    let disponible = sqlx::query_scalar::<_, Decimal>(
        r#"
        SELECT COALESCE(SUM(cantidad_disponible), 0)
        FROM lotes_produccion
        WHERE producto_id = $1 AND estado = 'disponible'
        "#,
    )
    .bind(producto_id)
    .fetch_one(&mut *conn)
    .await?;

    sqlx::query("UPDATE stocks SET stock_disponible = $1, updated_at = NOW() WHERE producto_id = $2")
        .bind(disponible)
        .bind(producto_id)
        .execute(&mut *conn)
        .await?;

    Ok(disponible)
}

/// Apply a signed delta to `stock_actual`
///
/// When `reject_negative` is set (SALIDA movements), a delta that would push
/// the counter below zero fails with `InsufficientStock` before any write.
pub async fn apply_delta(
    conn: &mut PgConnection,
    producto_id: Uuid,
    delta: Decimal,
    reject_negative: bool,
) -> AppResult<Decimal> {
    let actual = sqlx::query_scalar::<_, Decimal>(
        "SELECT stock_actual FROM stocks WHERE producto_id = $1 FOR UPDATE",
    )
    .bind(producto_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound("Stock".to_string()))?;

    let nuevo = actual + delta;
    if reject_negative && nuevo < Decimal::ZERO {
        return Err(AppError::InsufficientStock {
            solicitado: -delta,
            disponible: actual,
        });
    }

    sqlx::query("UPDATE stocks SET stock_actual = $1, updated_at = NOW() WHERE producto_id = $2")
        .bind(nuevo)
        .bind(producto_id)
        .execute(&mut *conn)
        .await?;

    Ok(nuevo)
}

/// Input for updating stock thresholds
#[derive(Debug, Deserialize)]
pub struct UpdateStockInput {
    pub stock_actual: Option<Decimal>,
    pub stock_reservado: Option<Decimal>,
    pub stock_minimo: Option<Decimal>,
    pub stock_maximo: Option<Decimal>,
}

/// Stock row joined with its product name
#[derive(Debug, serde::Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StockWithProduct {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub stock: Stock,
    pub producto_nombre: String,
}

/// Stock ledger service
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

impl StockService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List stock for all products
    pub async fn list(&self) -> AppResult<Vec<StockWithProduct>> {
        let rows = sqlx::query_as::<_, StockWithProduct>(
            r#"
            SELECT s.id, s.producto_id, s.stock_actual, s.stock_reservado, s.stock_minimo,
                   s.stock_maximo, s.stock_disponible, s.created_at, s.updated_at,
                   p.nombre AS producto_nombre
            FROM stocks s
            JOIN productos p ON p.id = s.producto_id
            ORDER BY p.nombre
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Get the stock row for one product
    pub async fn get_by_product(&self, producto_id: Uuid) -> AppResult<Stock> {
        sqlx::query_as::<_, Stock>(
            r#"
            SELECT id, producto_id, stock_actual, stock_reservado, stock_minimo,
                   stock_maximo, stock_disponible, created_at, updated_at
            FROM stocks
            WHERE producto_id = $1
            "#,
        )
        .bind(producto_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock".to_string()))
    }

    /// Update counters and thresholds for one product's stock
    ///
    /// Returns the updated row and a low-stock advisory when the available
    /// quantity sits below the restocking threshold parameter.
    pub async fn update(
        &self,
        producto_id: Uuid,
        input: UpdateStockInput,
    ) -> AppResult<(Stock, Option<String>)> {
        let existing = self.get_by_product(producto_id).await?;

        for (field, value) in [
            ("stockActual", &input.stock_actual),
            ("stockReservado", &input.stock_reservado),
            ("stockMinimo", &input.stock_minimo),
        ] {
            if let Some(v) = value {
                if *v < Decimal::ZERO {
                    return Err(AppError::Validation {
                        field: field.to_string(),
                        message: format!("The field \"{}\" must be zero or positive", field),
                        message_es: format!("El campo \"{}\" debe ser un número positivo", field),
                    });
                }
            }
        }
        if let Some(maximo) = input.stock_maximo {
            if maximo <= Decimal::ZERO {
                return Err(AppError::Validation {
                    field: "stockMaximo".to_string(),
                    message: "The field \"stockMaximo\" must be greater than zero".to_string(),
                    message_es: "El campo \"stockMaximo\" debe ser un número positivo mayor que cero"
                        .to_string(),
                });
            }
        }

        let stock = sqlx::query_as::<_, Stock>(
            r#"
            UPDATE stocks
            SET stock_actual = $1, stock_reservado = $2, stock_minimo = $3, stock_maximo = $4,
                updated_at = NOW()
            WHERE producto_id = $5
            RETURNING id, producto_id, stock_actual, stock_reservado, stock_minimo,
                      stock_maximo, stock_disponible, created_at, updated_at
            "#,
        )
        .bind(input.stock_actual.unwrap_or(existing.stock_actual))
        .bind(input.stock_reservado.unwrap_or(existing.stock_reservado))
        .bind(input.stock_minimo.unwrap_or(existing.stock_minimo))
        .bind(input.stock_maximo.unwrap_or(existing.stock_maximo))
        .bind(producto_id)
        .fetch_one(&self.db)
        .await?;

        let umbral = sqlx::query_scalar::<_, Decimal>(
            "SELECT valor FROM parametros WHERE nombre = $1",
        )
        .bind(parametros::CANTIDAD_MINIMA_REABASTECIMIENTO)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::parameter_missing(parametros::CANTIDAD_MINIMA_REABASTECIMIENTO))?;

        let advertencia = if stock.stock_disponible < umbral {
            Some(format!(
                "El stock disponible ({}) está por debajo de la cantidad mínima de reabastecimiento ({}).",
                stock.stock_disponible, umbral
            ))
        } else {
            None
        };

        Ok((stock, advertencia))
    }
}
