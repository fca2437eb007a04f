//! Inventory movement recorder
//!
//! Append-only log of stock-affecting events. Recording a movement and
//! applying its stock/lot effects commit in the same transaction, so a
//! movement row never exists without its effects and vice versa.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::sequence::{SequenceKind, SequenceService};
use crate::services::stock;
use shared::{InventoryMovement, LotStatus, MovementType, PaginatedResponse, Pagination, PaginationMeta};

/// Input for recording an inventory movement
#[derive(Debug, Deserialize)]
pub struct RecordMovementInput {
    pub producto_id: Uuid,
    pub lote_id: Option<Uuid>,
    pub tipo_movimiento: MovementType,
    pub razon: String,
    pub cantidad: Decimal,
    pub origen_destino: Option<String>,
}

/// Movement row joined with product, lot and user summaries
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MovementWithRefs {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub movimiento: InventoryMovement,
    pub producto_nombre: String,
    pub codigo_lote: Option<String>,
    pub usuario_nombre: Option<String>,
}

/// Inventory movement service
#[derive(Clone)]
pub struct MovementService {
    db: PgPool,
}

impl MovementService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a movement and apply its stock/lot effects atomically
    pub async fn record(
        &self,
        actor: Option<Uuid>,
        input: RecordMovementInput,
    ) -> AppResult<InventoryMovement> {
        if input.razon.trim().is_empty() {
            return Err(AppError::Validation {
                field: "razon".to_string(),
                message: "A reason is required".to_string(),
                message_es: "El campo \"razon\" es requerido".to_string(),
            });
        }

        match input.tipo_movimiento {
            MovementType::Entrada | MovementType::Salida => {
                if input.cantidad <= Decimal::ZERO {
                    return Err(AppError::Validation {
                        field: "cantidad".to_string(),
                        message: "Quantity must be a positive number".to_string(),
                        message_es: "El campo \"cantidad\" debe ser un número positivo".to_string(),
                    });
                }
            }
            // Adjustments carry a sign: positive increases, negative decreases.
            MovementType::Ajuste => {
                if input.cantidad == Decimal::ZERO {
                    return Err(AppError::Validation {
                        field: "cantidad".to_string(),
                        message: "Adjustment quantity cannot be zero".to_string(),
                        message_es: "El campo \"cantidad\" de un ajuste no puede ser cero".to_string(),
                    });
                }
            }
        }

        let costo_unitario = sqlx::query_scalar::<_, Decimal>(
            "SELECT costo FROM productos WHERE id = $1",
        )
        .bind(input.producto_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Producto".to_string()))?;

        if let Some(lote_id) = input.lote_id {
            let pertenece = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM lotes_produccion WHERE id = $1 AND producto_id = $2)",
            )
            .bind(lote_id)
            .bind(input.producto_id)
            .fetch_one(&self.db)
            .await?;

            if !pertenece {
                return Err(AppError::Validation {
                    field: "loteId".to_string(),
                    message: "The lot does not exist or does not belong to the product".to_string(),
                    message_es: "El lote no existe o no pertenece al producto".to_string(),
                });
            }
        }

        let movimiento_id = SequenceService::new(self.db.clone())
            .next_code(SequenceKind::Movimiento, "MOV")
            .await?;

        let mut tx = self.db.begin().await?;

        match input.tipo_movimiento {
            MovementType::Entrada => {
                stock::apply_delta(&mut *tx, input.producto_id, input.cantidad, false).await?;
                if let Some(lote_id) = input.lote_id {
                    sqlx::query(
                        r#"
                        UPDATE lotes_produccion
                        SET cantidad_producida = cantidad_producida + $1,
                            cantidad_disponible = cantidad_producida + $1 - cantidad_vendida,
                            updated_at = NOW()
                        WHERE id = $2
                        "#,
                    )
                    .bind(input.cantidad)
                    .bind(lote_id)
                    .execute(&mut *tx)
                    .await?;
                }
            }
            MovementType::Salida => {
                stock::apply_delta(&mut *tx, input.producto_id, -input.cantidad, true).await?;
                if let Some(lote_id) = input.lote_id {
                    sqlx::query(
                        r#"
                        UPDATE lotes_produccion
                        SET cantidad_vendida = cantidad_vendida + $1,
                            cantidad_disponible = cantidad_producida - (cantidad_vendida + $1),
                            estado = CASE
                                WHEN cantidad_producida - (cantidad_vendida + $1) <= 0 THEN $2
                                ELSE estado
                            END,
                            updated_at = NOW()
                        WHERE id = $3
                        "#,
                    )
                    .bind(input.cantidad)
                    .bind(LotStatus::Agotado)
                    .bind(lote_id)
                    .execute(&mut *tx)
                    .await?;
                }
            }
            MovementType::Ajuste => {
                stock::apply_delta(&mut *tx, input.producto_id, input.cantidad, false).await?;
            }
        }

        if input.lote_id.is_some() {
            stock::recompute_available(&mut *tx, input.producto_id).await?;
        }

        let costo_movimiento = input.cantidad.abs() * costo_unitario;
        let movimiento = sqlx::query_as::<_, InventoryMovement>(
            r#"
            INSERT INTO movimientos_inventario (
                movimiento_id, producto_id, lote_id, tipo_movimiento, razon, cantidad,
                fecha_movimiento, costo_movimiento, usuario_id, origen_destino
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, movimiento_id, producto_id, lote_id, tipo_movimiento, razon, cantidad,
                      fecha_movimiento, costo_movimiento, usuario_id, origen_destino, created_at
            "#,
        )
        .bind(&movimiento_id)
        .bind(input.producto_id)
        .bind(input.lote_id)
        .bind(input.tipo_movimiento)
        .bind(&input.razon)
        .bind(input.cantidad)
        .bind(Utc::now())
        .bind(costo_movimiento)
        .bind(actor)
        .bind(input.origen_destino.as_deref().unwrap_or("almacen"))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(movimiento)
    }

    /// List movements, newest first, with product/lot/user summaries
    pub async fn list(
        &self,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<MovementWithRefs>> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM movimientos_inventario")
            .fetch_one(&self.db)
            .await?;

        let movimientos = sqlx::query_as::<_, MovementWithRefs>(
            r#"
            SELECT m.id, m.movimiento_id, m.producto_id, m.lote_id, m.tipo_movimiento, m.razon,
                   m.cantidad, m.fecha_movimiento, m.costo_movimiento, m.usuario_id,
                   m.origen_destino, m.created_at,
                   p.nombre AS producto_nombre,
                   l.codigo_lote AS codigo_lote,
                   u.nombre AS usuario_nombre
            FROM movimientos_inventario m
            JOIN productos p ON p.id = m.producto_id
            LEFT JOIN lotes_produccion l ON l.id = m.lote_id
            LEFT JOIN usuarios u ON u.id = m.usuario_id
            ORDER BY m.fecha_movimiento DESC, m.created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: movimientos,
            pagination: PaginationMeta {
                page: pagination.page,
                per_page: pagination.per_page,
                total,
            },
        })
    }

    /// Get a movement by id
    pub async fn get(&self, id: Uuid) -> AppResult<MovementWithRefs> {
        sqlx::query_as::<_, MovementWithRefs>(
            r#"
            SELECT m.id, m.movimiento_id, m.producto_id, m.lote_id, m.tipo_movimiento, m.razon,
                   m.cantidad, m.fecha_movimiento, m.costo_movimiento, m.usuario_id,
                   m.origen_destino, m.created_at,
                   p.nombre AS producto_nombre,
                   l.codigo_lote AS codigo_lote,
                   u.nombre AS usuario_nombre
            FROM movimientos_inventario m
            JOIN productos p ON p.id = m.producto_id
            LEFT JOIN lotes_produccion l ON l.id = m.lote_id
            LEFT JOIN usuarios u ON u.id = m.usuario_id
            WHERE m.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Movimiento".to_string()))
    }

    /// Delete a movement
    ///
    /// Unconditional: movements have no dependent-entity check, unlike
    /// products and lots.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM movimientos_inventario WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Movimiento".to_string()));
        }

        Ok(())
    }
}
