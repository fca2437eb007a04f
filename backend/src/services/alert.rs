//! Alert generator
//!
//! Derives alerts from the stock ledger, the production lots and the
//! operational thresholds. Every run replaces the whole alert collection:
//! delete and regeneration commit in one transaction, so two runs over the
//! same state produce the same alert set.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use rust_decimal::prelude::ToPrimitive;
use shared::{
    expires_within, parametros, stock_alert_kind, Alert, AlertPriority, AlertStatus, AlertType,
};

/// Threshold parameters loaded once per run; any missing one aborts the
/// sweep before the delete
struct AlertThresholds {
    dias_proximos: i64,
    stock_minimo: Decimal,
    stock_maximo: Decimal,
    dias_antes_alerta: Decimal,
    cantidad_minima: Decimal,
}

/// Input for updating an alert's handling status
#[derive(Debug, Deserialize)]
pub struct UpdateAlertStatusInput {
    pub estado: String,
}

/// Alert row joined with product and lot summaries
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AlertWithRefs {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub alerta: Alert,
    pub producto_nombre: String,
    pub codigo_lote: Option<String>,
}

#[derive(sqlx::FromRow)]
struct StockSweepRow {
    producto_id: Uuid,
    producto_nombre: Option<String>,
    stock_disponible: Decimal,
}

#[derive(sqlx::FromRow)]
struct LotSweepRow {
    lote_id: Uuid,
    codigo_lote: String,
    fecha_vencimiento: DateTime<Utc>,
    producto_id: Uuid,
    producto_nombre: Option<String>,
}

/// Alert generator service
#[derive(Clone)]
pub struct AlertService {
    db: PgPool,
}

impl AlertService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn load_thresholds(&self) -> AppResult<AlertThresholds> {
        let mut valores = [Decimal::ZERO; 5];
        for (i, nombre) in [
            parametros::DIAS_PROXIMOS_A_EXPIRAR,
            parametros::STOCK_MINIMO,
            parametros::STOCK_MAXIMO,
            parametros::DIAS_ANTES_ALERTA_EXPIRACION,
            parametros::CANTIDAD_MINIMA_REABASTECIMIENTO,
        ]
        .into_iter()
        .enumerate()
        {
            valores[i] = sqlx::query_scalar::<_, Decimal>(
                "SELECT valor FROM parametros WHERE nombre = $1",
            )
            .bind(nombre)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::parameter_missing(nombre))?;
        }

        let dias_proximos = valores[0].to_i64().ok_or_else(|| {
            AppError::Configuration(format!(
                "Parameter \"{}\" must be a whole number of days",
                parametros::DIAS_PROXIMOS_A_EXPIRAR
            ))
        })?;

        Ok(AlertThresholds {
            dias_proximos,
            stock_minimo: valores[1],
            stock_maximo: valores[2],
            dias_antes_alerta: valores[3],
            cantidad_minima: valores[4],
        })
    }

    /// Discard all alerts and regenerate them from current state
    pub async fn regenerate_all(&self) -> AppResult<Vec<Alert>> {
        let umbrales = self.load_thresholds().await?;
        let ahora = Utc::now();

        let stocks = sqlx::query_as::<_, StockSweepRow>(
            r#"
            SELECT s.producto_id, p.nombre AS producto_nombre, s.stock_disponible
            FROM stocks s
            LEFT JOIN productos p ON p.id = s.producto_id
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let lotes_disponibles = sqlx::query_as::<_, LotSweepRow>(
            r#"
            SELECT l.id AS lote_id, l.codigo_lote, l.fecha_vencimiento,
                   l.producto_id, p.nombre AS producto_nombre
            FROM lotes_produccion l
            LEFT JOIN productos p ON p.id = l.producto_id
            WHERE l.estado = 'disponible'
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let lotes: Vec<LotSweepRow> = lotes_disponibles
            .into_iter()
            .filter(|l| expires_within(l.fecha_vencimiento, ahora, umbrales.dias_proximos))
            .collect();

        let mut tx = self.db.begin().await?;
        sqlx::query("DELETE FROM alertas").execute(&mut *tx).await?;

        let mut generadas = Vec::new();

        for stock in stocks {
            let Some(nombre) = stock.producto_nombre else {
                tracing::warn!(
                    producto_id = %stock.producto_id,
                    "Stock row without product during alert sweep, skipping"
                );
                continue;
            };

            let Some(tipo) = stock_alert_kind(
                stock.stock_disponible,
                umbrales.stock_minimo,
                umbrales.stock_maximo,
            ) else {
                continue;
            };

            let alerta = match tipo {
                AlertType::StockBajo => {
                    self.insert_alert(
                        &mut tx,
                        NewAlert {
                            producto_id: stock.producto_id,
                            lote_id: None,
                            tipo_alerta: AlertType::StockBajo,
                            descripcion: format!(
                                "El stock del producto \"{}\" está por debajo del umbral mínimo ({} unidades).",
                                nombre, umbrales.stock_minimo
                            ),
                            prioridad: AlertPriority::Alta,
                            umbral_reabastecimiento: Some(umbrales.cantidad_minima),
                            stock_actual: Some(stock.stock_disponible),
                            stock_minimo: Some(umbrales.stock_minimo),
                            stock_maximo: None,
                            fecha_vencimiento: None,
                            fecha_alerta: ahora,
                        },
                    )
                    .await?
                }
                AlertType::AlmacenamientoMaximo => {
                    self.insert_alert(
                        &mut tx,
                        NewAlert {
                            producto_id: stock.producto_id,
                            lote_id: None,
                            tipo_alerta: AlertType::AlmacenamientoMaximo,
                            descripcion: format!(
                                "El stock del producto \"{}\" ha excedido el máximo permitido ({} unidades).",
                                nombre, umbrales.stock_maximo
                            ),
                            prioridad: AlertPriority::Media,
                            umbral_reabastecimiento: None,
                            stock_actual: Some(stock.stock_disponible),
                            stock_minimo: None,
                            stock_maximo: Some(umbrales.stock_maximo),
                            fecha_vencimiento: None,
                            fecha_alerta: ahora,
                        },
                    )
                    .await?
                }
                AlertType::Vencimiento => unreachable!("stock sweep never yields expiry alerts"),
            };
            generadas.push(alerta);
        }

        for lote in lotes {
            let Some(nombre) = lote.producto_nombre else {
                tracing::warn!(
                    lote_id = %lote.lote_id,
                    "Lot without product during alert sweep, skipping"
                );
                continue;
            };

            let alerta = self
                .insert_alert(
                    &mut tx,
                    NewAlert {
                        producto_id: lote.producto_id,
                        lote_id: Some(lote.lote_id),
                        tipo_alerta: AlertType::Vencimiento,
                        descripcion: format!(
                            "El lote \"{}\" del producto \"{}\" está próximo a vencer en los próximos {} días.",
                            lote.codigo_lote, nombre, umbrales.dias_antes_alerta
                        ),
                        prioridad: AlertPriority::Media,
                        umbral_reabastecimiento: None,
                        stock_actual: None,
                        stock_minimo: None,
                        stock_maximo: None,
                        fecha_vencimiento: Some(lote.fecha_vencimiento),
                        fecha_alerta: ahora,
                    },
                )
                .await?;
            generadas.push(alerta);
        }

        tx.commit().await?;

        Ok(generadas)
    }

    async fn insert_alert(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        alerta: NewAlert,
    ) -> AppResult<Alert> {
        let fila = sqlx::query_as::<_, Alert>(
            r#"
            INSERT INTO alertas (
                producto_id, lote_id, tipo_alerta, descripcion, prioridad,
                umbral_reabastecimiento, stock_actual, stock_minimo, stock_maximo,
                fecha_vencimiento, fecha_alerta, estado
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'pendiente')
            RETURNING id, producto_id, lote_id, tipo_alerta, descripcion, prioridad,
                      umbral_reabastecimiento, stock_actual, stock_minimo, stock_maximo,
                      fecha_vencimiento, fecha_alerta, estado, created_at
            "#,
        )
        .bind(alerta.producto_id)
        .bind(alerta.lote_id)
        .bind(alerta.tipo_alerta)
        .bind(&alerta.descripcion)
        .bind(alerta.prioridad)
        .bind(alerta.umbral_reabastecimiento)
        .bind(alerta.stock_actual)
        .bind(alerta.stock_minimo)
        .bind(alerta.stock_maximo)
        .bind(alerta.fecha_vencimiento)
        .bind(alerta.fecha_alerta)
        .fetch_one(&mut **tx)
        .await?;

        Ok(fila)
    }

    /// List alerts with product and lot summaries
    pub async fn list(&self) -> AppResult<Vec<AlertWithRefs>> {
        let alertas = sqlx::query_as::<_, AlertWithRefs>(
            r#"
            SELECT a.id, a.producto_id, a.lote_id, a.tipo_alerta, a.descripcion, a.prioridad,
                   a.umbral_reabastecimiento, a.stock_actual, a.stock_minimo, a.stock_maximo,
                   a.fecha_vencimiento, a.fecha_alerta, a.estado, a.created_at,
                   p.nombre AS producto_nombre,
                   l.codigo_lote AS codigo_lote
            FROM alertas a
            JOIN productos p ON p.id = a.producto_id
            LEFT JOIN lotes_produccion l ON l.id = a.lote_id
            ORDER BY a.fecha_alerta DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(alertas)
    }

    /// Move an alert through its handling workflow
    pub async fn update_status(
        &self,
        id: Uuid,
        input: UpdateAlertStatusInput,
    ) -> AppResult<Alert> {
        let estado = AlertStatus::from_str(&input.estado).ok_or_else(|| AppError::Validation {
            field: "estado".to_string(),
            message: "Invalid alert status".to_string(),
            message_es: "Estado de alerta inválido".to_string(),
        })?;

        sqlx::query_as::<_, Alert>(
            r#"
            UPDATE alertas
            SET estado = $1
            WHERE id = $2
            RETURNING id, producto_id, lote_id, tipo_alerta, descripcion, prioridad,
                      umbral_reabastecimiento, stock_actual, stock_minimo, stock_maximo,
                      fecha_vencimiento, fecha_alerta, estado, created_at
            "#,
        )
        .bind(estado)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Alerta".to_string()))
    }
}

struct NewAlert {
    producto_id: Uuid,
    lote_id: Option<Uuid>,
    tipo_alerta: AlertType,
    descripcion: String,
    prioridad: AlertPriority,
    umbral_reabastecimiento: Option<Decimal>,
    stock_actual: Option<Decimal>,
    stock_minimo: Option<Decimal>,
    stock_maximo: Option<Decimal>,
    fecha_vencimiento: Option<DateTime<Utc>>,
    fecha_alerta: DateTime<Utc>,
}
