//! Historical aggregates consumed by the forecasting collaborator
//!
//! Buckets are returned in ascending period order as `{period, total}`
//! pairs: sale totals for sales containing the product, and produced
//! quantities per production lot.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::{HistoryPoint, PeriodGranularity};

fn period_format(granularity: PeriodGranularity) -> &'static str {
    match granularity {
        PeriodGranularity::Diario => "YYYY-MM-DD",
        PeriodGranularity::Mensual => "YYYY-MM",
    }
}

/// Historical aggregate service
#[derive(Clone)]
pub struct HistoryService {
    db: PgPool,
}

impl HistoryService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn ensure_product(&self, producto_id: Uuid) -> AppResult<()> {
        let existe = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM productos WHERE id = $1)",
        )
        .bind(producto_id)
        .fetch_one(&self.db)
        .await?;

        if !existe {
            return Err(AppError::NotFound("Producto".to_string()));
        }
        Ok(())
    }

    /// Time-bucketed sums of sale totals for sales containing the product
    pub async fn sales_history(
        &self,
        producto_id: Uuid,
        granularity: PeriodGranularity,
    ) -> AppResult<Vec<HistoryPoint>> {
        self.ensure_product(producto_id).await?;

        let rows = sqlx::query_as::<_, (String, rust_decimal::Decimal)>(&format!(
            r#"
            SELECT to_char(date_trunc('{unit}', v.fecha_venta), '{fmt}') AS period,
                   SUM(v.total_venta) AS total
            FROM ventas v
            WHERE EXISTS (
                SELECT 1 FROM venta_lineas vl
                WHERE vl.venta_id = v.id AND vl.producto_id = $1
            )
            GROUP BY 1
            ORDER BY 1 ASC
            "#,
            unit = granularity.date_trunc_unit(),
            fmt = period_format(granularity),
        ))
        .bind(producto_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(period, total)| HistoryPoint { period, total })
            .collect())
    }

    /// Time-bucketed sums of produced quantities for the product's lots
    pub async fn production_history(
        &self,
        producto_id: Uuid,
        granularity: PeriodGranularity,
    ) -> AppResult<Vec<HistoryPoint>> {
        self.ensure_product(producto_id).await?;

        let rows = sqlx::query_as::<_, (String, rust_decimal::Decimal)>(&format!(
            r#"
            SELECT to_char(date_trunc('{unit}', fecha_produccion), '{fmt}') AS period,
                   SUM(cantidad_producida) AS total
            FROM lotes_produccion
            WHERE producto_id = $1
            GROUP BY 1
            ORDER BY 1 ASC
            "#,
            unit = granularity.date_trunc_unit(),
            fmt = period_format(granularity),
        ))
        .bind(producto_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(period, total)| HistoryPoint { period, total })
            .collect())
    }
}
