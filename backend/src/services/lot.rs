//! Production lot allocator
//!
//! Lots are dated batches of produced units, depleted by sales and outgoing
//! movements. A lot holds `cantidad_disponible = cantidad_producida -
//! cantidad_vendida` at all times and drops to `agotado` the moment its
//! available quantity reaches zero. Every mutation that can change the
//! `disponible` set ends with an explicit stock recompute.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::sequence::{SequenceKind, SequenceService};
use crate::services::stock;
use shared::{parametros, InventoryMovement, LotStatus, MovementType, ProductionLot};

const SELECT_LOT: &str = r#"
    SELECT id, producto_id, fecha_produccion, cantidad_producida, cantidad_vendida,
           cantidad_disponible, fecha_vencimiento, costo_lote, ubicacion_lote,
           codigo_lote, estado, created_at, updated_at
    FROM lotes_produccion
"#;

/// Deplete a lot by `cantidad` on the caller's connection
///
/// Fails with `InsufficientLotQuantity` before any write when the lot cannot
/// cover the requested quantity; flips the lot to `agotado` when its
/// available quantity reaches zero.
pub async fn consume_lot(
    conn: &mut PgConnection,
    lote_id: Uuid,
    cantidad: Decimal,
) -> AppResult<ProductionLot> {
    let lote = sqlx::query_as::<_, ProductionLot>(&format!("{SELECT_LOT} WHERE id = $1 FOR UPDATE"))
        .bind(lote_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Lote".to_string()))?;

    if cantidad > lote.cantidad_disponible {
        return Err(AppError::InsufficientLotQuantity {
            codigo_lote: lote.codigo_lote.clone(),
            solicitado: cantidad,
            disponible: lote.cantidad_disponible,
        });
    }

    let vendida = lote.cantidad_vendida + cantidad;
    let disponible = lote.cantidad_producida - vendida;
    let estado = if disponible <= Decimal::ZERO {
        LotStatus::Agotado
    } else {
        lote.estado
    };

    let actualizado = sqlx::query_as::<_, ProductionLot>(
        r#"
        UPDATE lotes_produccion
        SET cantidad_vendida = $1, cantidad_disponible = $2, estado = $3, updated_at = NOW()
        WHERE id = $4
        RETURNING id, producto_id, fecha_produccion, cantidad_producida, cantidad_vendida,
                  cantidad_disponible, fecha_vencimiento, costo_lote, ubicacion_lote,
                  codigo_lote, estado, created_at, updated_at
        "#,
    )
    .bind(vendida)
    .bind(disponible)
    .bind(estado)
    .bind(lote_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(actualizado)
}

/// Input for creating a production lot
#[derive(Debug, Deserialize)]
pub struct CreateLotInput {
    pub producto_id: Uuid,
    pub cantidad_producida: Decimal,
    pub ubicacion_lote: String,
    pub fecha_produccion: Option<DateTime<Utc>>,
}

/// Input for updating a production lot
#[derive(Debug, Deserialize)]
pub struct UpdateLotInput {
    pub cantidad_producida: Option<Decimal>,
    pub fecha_vencimiento: Option<DateTime<Utc>>,
    pub estado: Option<String>,
}

/// Result of creating a lot: the lot, its ENTRADA movement and an optional
/// near-expiry advisory
#[derive(Debug, Serialize)]
pub struct CreatedLot {
    pub lote: ProductionLot,
    pub movimiento: InventoryMovement,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advertencia: Option<String>,
}

/// Production lot service
#[derive(Clone)]
pub struct LotService {
    db: PgPool,
}

impl LotService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a production lot and its ENTRADA movement in one transaction
    pub async fn create(&self, actor: Option<Uuid>, input: CreateLotInput) -> AppResult<CreatedLot> {
        if let Err(msg) = shared::validate_positive_quantity(input.cantidad_producida) {
            return Err(AppError::Validation {
                field: "cantidadProducida".to_string(),
                message: msg.to_string(),
                message_es: "El campo \"cantidadProducida\" debe ser un número positivo".to_string(),
            });
        }
        if input.ubicacion_lote.trim().is_empty() {
            return Err(AppError::Validation {
                field: "ubicacionLote".to_string(),
                message: "Lot location cannot be empty".to_string(),
                message_es: "El campo \"ubicacionLote\" es requerido".to_string(),
            });
        }

        let producto = sqlx::query_as::<_, (Decimal, i32, String)>(
            "SELECT costo, dias_expiracion, nombre FROM productos WHERE id = $1",
        )
        .bind(input.producto_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Producto".to_string()))?;
        let (costo_unitario, dias_expiracion, _nombre) = producto;

        let dias_proximos = sqlx::query_scalar::<_, Decimal>(
            "SELECT valor FROM parametros WHERE nombre = $1",
        )
        .bind(parametros::DIAS_PROXIMOS_A_EXPIRAR)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::parameter_missing(parametros::DIAS_PROXIMOS_A_EXPIRAR))?;

        let fecha_produccion = input.fecha_produccion.unwrap_or_else(Utc::now);
        let fecha_vencimiento = fecha_produccion + Duration::days(dias_expiracion as i64);
        let costo_lote = input.cantidad_producida * costo_unitario;

        let sequences = SequenceService::new(self.db.clone());
        let codigo_lote = sequences.next_code(SequenceKind::Lote, "LOTE").await?;
        let movimiento_id = sequences.next_code(SequenceKind::Movimiento, "MOV").await?;

        let mut tx = self.db.begin().await?;

        let lote = sqlx::query_as::<_, ProductionLot>(
            r#"
            INSERT INTO lotes_produccion (
                producto_id, fecha_produccion, cantidad_producida, cantidad_vendida,
                cantidad_disponible, fecha_vencimiento, costo_lote, ubicacion_lote,
                codigo_lote, estado
            )
            VALUES ($1, $2, $3, 0, $3, $4, $5, $6, $7, 'disponible')
            RETURNING id, producto_id, fecha_produccion, cantidad_producida, cantidad_vendida,
                      cantidad_disponible, fecha_vencimiento, costo_lote, ubicacion_lote,
                      codigo_lote, estado, created_at, updated_at
            "#,
        )
        .bind(input.producto_id)
        .bind(fecha_produccion)
        .bind(input.cantidad_producida)
        .bind(fecha_vencimiento)
        .bind(costo_lote)
        .bind(&input.ubicacion_lote)
        .bind(&codigo_lote)
        .fetch_one(&mut *tx)
        .await?;

        stock::apply_delta(&mut *tx, input.producto_id, input.cantidad_producida, false).await?;
        stock::recompute_available(&mut *tx, input.producto_id).await?;

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
        .bind(lote.id)
        .bind(MovementType::Entrada)
        .bind("PRODUCTOS FABRICADOS")
        .bind(input.cantidad_producida)
        .bind(fecha_produccion)
        .bind(costo_lote)
        .bind(actor)
        .bind("almacen")
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let dias_restantes = (fecha_vencimiento - Utc::now()).num_days();
        let advertencia = if dias_proximos != Decimal::ZERO
            && Decimal::from(dias_restantes) <= dias_proximos
        {
            Some(format!(
                "Producto próximo a expirar en {} días.",
                dias_restantes
            ))
        } else {
            None
        };

        Ok(CreatedLot {
            lote,
            movimiento,
            advertencia,
        })
    }

    /// List all production lots
    pub async fn list(&self) -> AppResult<Vec<ProductionLot>> {
        let lotes = sqlx::query_as::<_, ProductionLot>(&format!(
            "{SELECT_LOT} ORDER BY fecha_produccion DESC"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(lotes)
    }

    /// Get a lot by id
    pub async fn get(&self, id: Uuid) -> AppResult<ProductionLot> {
        sqlx::query_as::<_, ProductionLot>(&format!("{SELECT_LOT} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Lote".to_string()))
    }

    /// List all lots of one product
    pub async fn list_by_product(&self, producto_id: Uuid) -> AppResult<Vec<ProductionLot>> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM productos WHERE id = $1)",
        )
        .bind(producto_id)
        .fetch_one(&self.db)
        .await?;

        if !exists {
            return Err(AppError::NotFound("Producto".to_string()));
        }

        let lotes = sqlx::query_as::<_, ProductionLot>(&format!(
            "{SELECT_LOT} WHERE producto_id = $1 ORDER BY fecha_produccion ASC"
        ))
        .bind(producto_id)
        .fetch_all(&self.db)
        .await?;

        Ok(lotes)
    }

    /// Adjust produced quantity, expiration or status of a lot
    ///
    /// Produced quantity can never drop below the quantity already sold.
    /// Status changes are administrative transitions; `agotado` is still
    /// enforced whenever the available quantity ends at zero or below.
    pub async fn update(&self, id: Uuid, input: UpdateLotInput) -> AppResult<ProductionLot> {
        let lote = self.get(id).await?;

        let estado_solicitado = match &input.estado {
            None => None,
            Some(s) => Some(LotStatus::from_str(s).ok_or_else(|| AppError::Validation {
                field: "estado".to_string(),
                message: "Invalid lot status".to_string(),
                message_es: "Estado de lote inválido".to_string(),
            })?),
        };

        let cantidad_producida = match input.cantidad_producida {
            Some(nueva) => {
                if nueva < lote.cantidad_vendida {
                    return Err(AppError::ProducedBelowSold {
                        vendido: lote.cantidad_vendida,
                    });
                }
                nueva
            }
            None => lote.cantidad_producida,
        };

        let cantidad_disponible = cantidad_producida - lote.cantidad_vendida;
        let mut estado = estado_solicitado.unwrap_or(lote.estado);
        if cantidad_disponible <= Decimal::ZERO {
            estado = LotStatus::Agotado;
        }
        let fecha_vencimiento = input.fecha_vencimiento.unwrap_or(lote.fecha_vencimiento);

        let mut tx = self.db.begin().await?;

        let actualizado = sqlx::query_as::<_, ProductionLot>(
            r#"
            UPDATE lotes_produccion
            SET cantidad_producida = $1, cantidad_disponible = $2, fecha_vencimiento = $3,
                estado = $4, updated_at = NOW()
            WHERE id = $5
            RETURNING id, producto_id, fecha_produccion, cantidad_producida, cantidad_vendida,
                      cantidad_disponible, fecha_vencimiento, costo_lote, ubicacion_lote,
                      codigo_lote, estado, created_at, updated_at
            "#,
        )
        .bind(cantidad_producida)
        .bind(cantidad_disponible)
        .bind(fecha_vencimiento)
        .bind(estado)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        stock::recompute_available(&mut *tx, lote.producto_id).await?;
        tx.commit().await?;

        Ok(actualizado)
    }

    /// Delete a lot that no movement or sale references
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let lote = self.get(id).await?;

        let referenciado = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM movimientos_inventario WHERE lote_id = $1)
                OR EXISTS(SELECT 1 FROM venta_linea_lotes WHERE lote_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if referenciado {
            return Err(AppError::InUse("El lote".to_string()));
        }

        let mut tx = self.db.begin().await?;

        // Undo the lot's contribution to the running counter, clamped at zero.
        let actual = sqlx::query_scalar::<_, Decimal>(
            "SELECT stock_actual FROM stocks WHERE producto_id = $1 FOR UPDATE",
        )
        .bind(lote.producto_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock".to_string()))?;

        let nuevo = (actual - lote.cantidad_producida).max(Decimal::ZERO);
        sqlx::query("UPDATE stocks SET stock_actual = $1, updated_at = NOW() WHERE producto_id = $2")
            .bind(nuevo)
            .bind(lote.producto_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM lotes_produccion WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        stock::recompute_available(&mut *tx, lote.producto_id).await?;
        tx.commit().await?;

        Ok(())
    }
}
