//! Sales engine
//!
//! Creates sales against caller-chosen production lots. The caller cites the
//! lots a line may draw from; the engine consumes the oldest-dated lots
//! first until the requested quantity is covered, records one SALIDA
//! movement per consumed lot and keeps the stock ledger in step — all inside
//! a single transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::lot::consume_lot;
use crate::services::sequence::{SequenceKind, SequenceService};
use crate::services::stock;
use shared::{
    parametros, plan_line_allocation, validate_allocation_coverage, LotCandidate, LotStatus,
    MovementType, PaginatedResponse, Pagination, PaginationMeta, PlannedConsumption, Sale,
    SaleLine, SaleStatus,
};

// ---------------------------------------------------------------------------
// Inputs and outputs
// ---------------------------------------------------------------------------

/// One lot citation inside a sale line
#[derive(Debug, Deserialize)]
pub struct LotCitationInput {
    pub lote_id: Uuid,
    pub cantidad: Decimal,
}

/// One product line of a sale request
#[derive(Debug, Deserialize)]
pub struct SaleLineInput {
    pub producto_id: Uuid,
    pub cantidad: Decimal,
    pub precio_unitario: Option<Decimal>,
    pub lotes: Vec<LotCitationInput>,
}

/// Input for creating a sale
#[derive(Debug, Deserialize)]
pub struct CreateSaleInput {
    pub cliente_id: Uuid,
    pub vendedor_id: Uuid,
    pub productos: Vec<SaleLineInput>,
    pub pago_inicial: Option<Decimal>,
    pub fecha_venta: Option<DateTime<Utc>>,
    pub notas: Option<String>,
}

/// Input for updating a sale
///
/// Line items are immutable after creation; `productos` exists only so the
/// attempt can be rejected explicitly instead of being silently ignored.
#[derive(Debug, Deserialize)]
pub struct UpdateSaleInput {
    pub cliente_id: Option<Uuid>,
    pub vendedor_id: Option<Uuid>,
    pub pago_inicial: Option<Decimal>,
    pub fecha_venta: Option<DateTime<Utc>>,
    pub notas: Option<String>,
    pub productos: Option<serde_json::Value>,
}

/// Consumption actually performed for a sale, per lot
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LotUsage {
    pub producto_id: Uuid,
    pub lote_id: Uuid,
    pub cantidad_usada: Decimal,
}

/// Result of creating a sale
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedSale {
    pub venta: Sale,
    pub lotes_usados: Vec<LotUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advertencia_deuda: Option<String>,
}

/// Sale row joined with client and seller names
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SaleWithParties {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub venta: Sale,
    pub cliente_nombre: String,
    pub vendedor_nombre: String,
}

/// Lot slice of a sale line, with the lot code
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineLotDetail {
    pub lote_id: Uuid,
    pub codigo_lote: String,
    pub cantidad: Decimal,
}

/// Sale line with product summary and its lot slices
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineDetail {
    #[serde(flatten)]
    pub linea: SaleLine,
    pub producto_nombre: String,
    pub lotes: Vec<SaleLineLotDetail>,
}

/// Full sale view
#[derive(Debug, Serialize)]
pub struct SaleDetail {
    #[serde(flatten)]
    pub venta: SaleWithParties,
    pub lineas: Vec<SaleLineDetail>,
}

/// Validated, planned line ready for persistence
struct PreparedLine {
    producto_id: Uuid,
    cantidad: Decimal,
    precio_unitario: Decimal,
    consumos: Vec<PlannedConsumption>,
}

#[derive(sqlx::FromRow)]
struct SaleLineRow {
    #[sqlx(flatten)]
    linea: SaleLine,
    producto_nombre: String,
}

/// Sales engine service
#[derive(Clone)]
pub struct SaleService {
    db: PgPool,
}

impl SaleService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a sale, consuming the cited lots oldest-first
    pub async fn create(&self, input: CreateSaleInput) -> AppResult<CreatedSale> {
        if input.productos.is_empty() {
            return Err(AppError::Validation {
                field: "productos".to_string(),
                message: "At least one product line is required".to_string(),
                message_es: "El campo \"productos\" es requerido y debe ser un array de productos"
                    .to_string(),
            });
        }

        let pago_inicial = input.pago_inicial.unwrap_or(Decimal::ZERO);
        if pago_inicial < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "pagoInicial".to_string(),
                message: "Initial payment must be zero or positive".to_string(),
                message_es: "El campo \"pagoInicial\" debe ser un número positivo o cero".to_string(),
            });
        }

        for (cliente_o_vendedor, id) in [("cliente", input.cliente_id), ("vendedor", input.vendedor_id)] {
            let existe = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM usuarios WHERE id = $1)",
            )
            .bind(id)
            .fetch_one(&self.db)
            .await?;
            if !existe {
                return Err(AppError::NotFound(format!("El {}", cliente_o_vendedor)));
            }
        }

        // Debt-limit breach is advisory: the sale proceeds with a warning.
        let limite_deudas = sqlx::query_scalar::<_, Decimal>(
            "SELECT valor FROM parametros WHERE nombre = $1",
        )
        .bind(parametros::LIMITE_DEUDAS_CLIENTE)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::parameter_missing(parametros::LIMITE_DEUDAS_CLIENTE))?;

        let deuda_cliente = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(saldo_venta), 0)
            FROM ventas
            WHERE cliente_id = $1 AND estado = 'pendiente'
            "#,
        )
        .bind(input.cliente_id)
        .fetch_one(&self.db)
        .await?;

        let advertencia_deuda = if deuda_cliente > limite_deudas {
            Some(format!(
                "Advertencia: El cliente ha superado el límite de deudas permitido ({} Bs). \
                 La venta se ha realizado, pero la deuda hasta la fecha del cliente es {} Bs.",
                limite_deudas, deuda_cliente
            ))
        } else {
            None
        };

        // Validate and plan every line before the first write.
        let mut lineas = Vec::with_capacity(input.productos.len());
        let mut total_venta = Decimal::ZERO;

        for linea in &input.productos {
            let preparada = self.prepare_line(linea).await?;
            total_venta += preparada.cantidad * preparada.precio_unitario;
            lineas.push(preparada);
        }

        if pago_inicial > total_venta {
            return Err(AppError::Validation {
                field: "pagoInicial".to_string(),
                message: "Initial payment cannot exceed the sale total".to_string(),
                message_es: "El pago inicial no puede ser mayor que el total de la venta".to_string(),
            });
        }

        let saldo_venta = total_venta - pago_inicial;
        let estado = if saldo_venta == Decimal::ZERO {
            SaleStatus::Completada
        } else {
            SaleStatus::Pendiente
        };
        let fecha_venta = input.fecha_venta.unwrap_or_else(Utc::now);

        // Burned codes on a failed transaction are fine: the sequence
        // contract is gap-tolerant.
        let sequences = SequenceService::new(self.db.clone());
        let total_consumos: usize = lineas.iter().map(|l| l.consumos.len()).sum();
        let mut codigos_movimiento = Vec::with_capacity(total_consumos);
        for _ in 0..total_consumos {
            codigos_movimiento.push(sequences.next_code(SequenceKind::Movimiento, "MOV").await?);
        }
        let mut codigos = codigos_movimiento.into_iter();

        let mut tx = self.db.begin().await?;

        let venta = sqlx::query_as::<_, Sale>(
            r#"
            INSERT INTO ventas (
                cliente_id, vendedor_id, total_venta, saldo_venta, pago_inicial,
                fecha_venta, estado, notas
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, cliente_id, vendedor_id, total_venta, saldo_venta, pago_inicial,
                      fecha_venta, estado, notas, created_at, updated_at
            "#,
        )
        .bind(input.cliente_id)
        .bind(input.vendedor_id)
        .bind(total_venta)
        .bind(saldo_venta)
        .bind(pago_inicial)
        .bind(fecha_venta)
        .bind(estado)
        .bind(&input.notas)
        .fetch_one(&mut *tx)
        .await?;

        let mut lotes_usados = Vec::new();
        let mut productos_afectados = Vec::new();

        for linea in &lineas {
            let linea_id = sqlx::query_scalar::<_, Uuid>(
                r#"
                INSERT INTO venta_lineas (venta_id, producto_id, cantidad, precio_unitario)
                VALUES ($1, $2, $3, $4)
                RETURNING id
                "#,
            )
            .bind(venta.id)
            .bind(linea.producto_id)
            .bind(linea.cantidad)
            .bind(linea.precio_unitario)
            .fetch_one(&mut *tx)
            .await?;

            for consumo in &linea.consumos {
                sqlx::query(
                    r#"
                    INSERT INTO venta_linea_lotes (venta_linea_id, lote_id, cantidad)
                    VALUES ($1, $2, $3)
                    "#,
                )
                .bind(linea_id)
                .bind(consumo.lote_id)
                .bind(consumo.cantidad)
                .execute(&mut *tx)
                .await?;

                consume_lot(&mut *tx, consumo.lote_id, consumo.cantidad).await?;
                stock::apply_delta(&mut *tx, linea.producto_id, -consumo.cantidad, true).await?;

                let codigo = codigos.next().ok_or_else(|| {
                    AppError::Internal("Movement code pool exhausted".to_string())
                })?;
                sqlx::query(
                    r#"
                    INSERT INTO movimientos_inventario (
                        movimiento_id, producto_id, lote_id, tipo_movimiento, razon, cantidad,
                        fecha_movimiento, costo_movimiento, usuario_id, origen_destino
                    )
                    VALUES ($1, $2, $3, $4, 'VENTA', $5, $6, $7, $8, 'VENTA')
                    "#,
                )
                .bind(&codigo)
                .bind(linea.producto_id)
                .bind(consumo.lote_id)
                .bind(MovementType::Salida)
                .bind(consumo.cantidad)
                .bind(fecha_venta)
                .bind(consumo.cantidad * linea.precio_unitario)
                .bind(input.vendedor_id)
                .execute(&mut *tx)
                .await?;

                lotes_usados.push(LotUsage {
                    producto_id: linea.producto_id,
                    lote_id: consumo.lote_id,
                    cantidad_usada: consumo.cantidad,
                });
            }

            if !productos_afectados.contains(&linea.producto_id) {
                productos_afectados.push(linea.producto_id);
            }
        }

        for producto_id in productos_afectados {
            stock::recompute_available(&mut *tx, producto_id).await?;
        }

        tx.commit().await?;

        Ok(CreatedSale {
            venta,
            lotes_usados,
            advertencia_deuda,
        })
    }

    /// Validate one line and plan its lot consumption
    async fn prepare_line(&self, linea: &SaleLineInput) -> AppResult<PreparedLine> {
        if linea.cantidad <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "cantidad".to_string(),
                message: "Each product needs a quantity greater than zero".to_string(),
                message_es: "Cada producto debe tener una \"cantidad\" mayor a cero".to_string(),
            });
        }
        if linea.lotes.is_empty() {
            return Err(AppError::Validation {
                field: "lotes".to_string(),
                message: "At least one lot must be selected for the product".to_string(),
                message_es: "Debes seleccionar al menos un lote para el producto".to_string(),
            });
        }

        let producto = sqlx::query_as::<_, (String, Decimal)>(
            "SELECT nombre, precio_venta FROM productos WHERE id = $1",
        )
        .bind(linea.producto_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Producto".to_string()))?;
        let (producto_nombre, precio_venta) = producto;
        let precio_unitario = linea.precio_unitario.unwrap_or(precio_venta);

        let mut candidatos = Vec::with_capacity(linea.lotes.len());
        let mut citadas = Vec::with_capacity(linea.lotes.len());

        for cita in &linea.lotes {
            let lote = sqlx::query_as::<_, (Uuid, DateTime<Utc>, Decimal, String, LotStatus)>(
                r#"
                SELECT producto_id, fecha_produccion, cantidad_disponible, codigo_lote, estado
                FROM lotes_produccion
                WHERE id = $1
                "#,
            )
            .bind(cita.lote_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Lote".to_string()))?;
            let (lote_producto_id, fecha_produccion, disponible, codigo_lote, estado) = lote;

            if lote_producto_id != linea.producto_id {
                return Err(AppError::Validation {
                    field: "lotes".to_string(),
                    message: format!(
                        "Lot {} does not belong to product {}",
                        codigo_lote, producto_nombre
                    ),
                    message_es: format!(
                        "El lote {} no pertenece al producto {}",
                        codigo_lote, producto_nombre
                    ),
                });
            }
            if !estado.is_sellable() {
                return Err(AppError::Validation {
                    field: "lotes".to_string(),
                    message: format!("Lot {} is not available for sale", codigo_lote),
                    message_es: format!("El lote {} no está disponible para la venta", codigo_lote),
                });
            }
            if cita.cantidad > disponible {
                return Err(AppError::InsufficientLotQuantity {
                    codigo_lote,
                    solicitado: cita.cantidad,
                    disponible,
                });
            }

            citadas.push(cita.cantidad);
            candidatos.push(LotCandidate {
                lote_id: cita.lote_id,
                cantidad_citada: cita.cantidad,
                fecha_produccion,
            });
        }

        if validate_allocation_coverage(linea.cantidad, &citadas).is_err() {
            let cubierto: Decimal = citadas.iter().copied().sum();
            return Err(AppError::LotCoverageInsufficient {
                producto: producto_nombre,
                cubierto,
                solicitado: linea.cantidad,
            });
        }

        let plan = plan_line_allocation(linea.cantidad, &candidatos);
        if plan.faltante > Decimal::ZERO {
            return Err(AppError::LotCoverageInsufficient {
                producto: producto_nombre,
                cubierto: linea.cantidad - plan.faltante,
                solicitado: linea.cantidad,
            });
        }

        Ok(PreparedLine {
            producto_id: linea.producto_id,
            cantidad: linea.cantidad,
            precio_unitario,
            consumos: plan.consumos,
        })
    }

    /// List sales, newest first
    pub async fn list(&self, pagination: Pagination) -> AppResult<PaginatedResponse<SaleWithParties>> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ventas")
            .fetch_one(&self.db)
            .await?;

        let ventas = sqlx::query_as::<_, SaleWithParties>(
            r#"
            SELECT v.id, v.cliente_id, v.vendedor_id, v.total_venta, v.saldo_venta,
                   v.pago_inicial, v.fecha_venta, v.estado, v.notas, v.created_at, v.updated_at,
                   c.nombre AS cliente_nombre,
                   u.nombre AS vendedor_nombre
            FROM ventas v
            JOIN usuarios c ON c.id = v.cliente_id
            JOIN usuarios u ON u.id = v.vendedor_id
            ORDER BY v.fecha_venta DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: ventas,
            pagination: PaginationMeta {
                page: pagination.page,
                per_page: pagination.per_page,
                total,
            },
        })
    }

    /// Get a sale with its lines and lot slices
    pub async fn get(&self, id: Uuid) -> AppResult<SaleDetail> {
        let venta = sqlx::query_as::<_, SaleWithParties>(
            r#"
            SELECT v.id, v.cliente_id, v.vendedor_id, v.total_venta, v.saldo_venta,
                   v.pago_inicial, v.fecha_venta, v.estado, v.notas, v.created_at, v.updated_at,
                   c.nombre AS cliente_nombre,
                   u.nombre AS vendedor_nombre
            FROM ventas v
            JOIN usuarios c ON c.id = v.cliente_id
            JOIN usuarios u ON u.id = v.vendedor_id
            WHERE v.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Venta".to_string()))?;

        let lineas = sqlx::query_as::<_, SaleLineRow>(
            r#"
            SELECT vl.id, vl.venta_id, vl.producto_id, vl.cantidad, vl.precio_unitario,
                   p.nombre AS producto_nombre
            FROM venta_lineas vl
            JOIN productos p ON p.id = vl.producto_id
            WHERE vl.venta_id = $1
            "#,
        )
        .bind(id)
        .fetch_all(&self.db)
        .await?;

        let mut detalle = Vec::with_capacity(lineas.len());
        for SaleLineRow {
            linea,
            producto_nombre,
        } in lineas
        {
            let lotes = sqlx::query_as::<_, SaleLineLotDetail>(
                r#"
                SELECT vll.lote_id, l.codigo_lote, vll.cantidad
                FROM venta_linea_lotes vll
                JOIN lotes_produccion l ON l.id = vll.lote_id
                WHERE vll.venta_linea_id = $1
                "#,
            )
            .bind(linea.id)
            .fetch_all(&self.db)
            .await?;

            detalle.push(SaleLineDetail {
                linea,
                producto_nombre,
                lotes,
            });
        }

        Ok(SaleDetail {
            venta,
            lineas: detalle,
        })
    }

    /// Update non-quantity fields of a sale and recompute balance/status
    ///
    /// Editing line items would desync lot depletion and the movement log,
    /// so the attempt is rejected outright.
    pub async fn update(&self, id: Uuid, input: UpdateSaleInput) -> AppResult<Sale> {
        if input.productos.is_some() {
            return Err(AppError::ValidationError(
                "Sale line items cannot be modified; create a new sale instead".to_string(),
            ));
        }

        let venta = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, cliente_id, vendedor_id, total_venta, saldo_venta, pago_inicial,
                   fecha_venta, estado, notas, created_at, updated_at
            FROM ventas
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Venta".to_string()))?;

        let pago_inicial = input.pago_inicial.unwrap_or(venta.pago_inicial);
        if pago_inicial < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "pagoInicial".to_string(),
                message: "Initial payment must be zero or positive".to_string(),
                message_es: "El campo \"pagoInicial\" debe ser un número positivo o cero".to_string(),
            });
        }

        let total_venta = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(cantidad * precio_unitario), 0) FROM venta_lineas WHERE venta_id = $1",
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        let pagos_aplicados = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(pago_aplicado), 0) FROM pago_aplicaciones WHERE venta_id = $1",
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        let saldo_venta = total_venta - pago_inicial - pagos_aplicados;
        if saldo_venta < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "pagoInicial".to_string(),
                message: "Initial payment plus applied payments exceed the sale total".to_string(),
                message_es: "El pago inicial más los pagos aplicados superan el total de la venta"
                    .to_string(),
            });
        }

        let estado = if saldo_venta == Decimal::ZERO {
            SaleStatus::Completada
        } else {
            SaleStatus::Pendiente
        };

        let actualizada = sqlx::query_as::<_, Sale>(
            r#"
            UPDATE ventas
            SET cliente_id = $1, vendedor_id = $2, total_venta = $3, saldo_venta = $4,
                pago_inicial = $5, fecha_venta = $6, estado = $7, notas = $8, updated_at = NOW()
            WHERE id = $9
            RETURNING id, cliente_id, vendedor_id, total_venta, saldo_venta, pago_inicial,
                      fecha_venta, estado, notas, created_at, updated_at
            "#,
        )
        .bind(input.cliente_id.unwrap_or(venta.cliente_id))
        .bind(input.vendedor_id.unwrap_or(venta.vendedor_id))
        .bind(total_venta)
        .bind(saldo_venta)
        .bind(pago_inicial)
        .bind(input.fecha_venta.unwrap_or(venta.fecha_venta))
        .bind(estado)
        .bind(input.notas.or(venta.notas))
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        Ok(actualizada)
    }

    /// Delete a sale whose lot consumptions are no longer referenced by
    /// VENTA movements
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let existe = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM ventas WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.db)
            .await?;
        if !existe {
            return Err(AppError::NotFound("Venta".to_string()));
        }

        let con_movimientos = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1
                FROM movimientos_inventario m
                JOIN venta_linea_lotes vll ON vll.lote_id = m.lote_id
                JOIN venta_lineas vl ON vl.id = vll.venta_linea_id
                WHERE vl.venta_id = $1 AND m.razon = 'VENTA'
            )
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if con_movimientos {
            return Err(AppError::InUse("La venta".to_string()));
        }

        sqlx::query("DELETE FROM ventas WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(())
    }
}
