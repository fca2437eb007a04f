//! Operational parameter store
//!
//! Named numeric thresholds consumed by the business rules. Reads by name
//! are strict: a missing required parameter aborts the dependent operation
//! with a configuration error instead of falling back to a default.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::{parametros, Parameter};

/// Default values seeded into a fresh deployment
const DEFAULT_PARAMETERS: &[(&str, i64, &str)] = &[
    (
        parametros::LIMITE_DEUDAS_CLIENTE,
        1000,
        "Límite de deudas permitido para un cliente",
    ),
    (
        parametros::DIAS_PROXIMOS_A_EXPIRAR,
        7,
        "Número de días para considerar que un producto está próximo a expirar",
    ),
    (
        parametros::STOCK_MINIMO,
        50,
        "Stock mínimo para generar alertas de reabastecimiento",
    ),
    (
        parametros::STOCK_MAXIMO,
        2000,
        "Stock máximo para generar alertas de almacenamiento",
    ),
    (
        parametros::DIAS_ANTES_ALERTA_EXPIRACION,
        5,
        "Número de días antes de la expiración para generar una alerta",
    ),
    (
        parametros::CANTIDAD_MINIMA_REABASTECIMIENTO,
        30,
        "Cantidad mínima para generar una alerta de reabastecimiento",
    ),
];

/// Input for updating a parameter value
#[derive(Debug, Deserialize)]
pub struct UpdateParameterInput {
    pub valor: Decimal,
}

/// Parameter store service
#[derive(Clone)]
pub struct ParameterService {
    db: PgPool,
}

impl ParameterService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Read a required parameter value by name
    pub async fn get_value(&self, nombre: &str) -> AppResult<Decimal> {
        sqlx::query_scalar::<_, Decimal>("SELECT valor FROM parametros WHERE nombre = $1")
            .bind(nombre)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::parameter_missing(nombre))
    }

    /// List all parameters
    pub async fn list(&self) -> AppResult<Vec<Parameter>> {
        let parametros = sqlx::query_as::<_, Parameter>(
            r#"
            SELECT id, nombre, valor, descripcion, actualizado_por, fecha_actualizacion,
                   created_at, updated_at
            FROM parametros
            ORDER BY nombre
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(parametros)
    }

    /// Get a parameter by id
    pub async fn get(&self, id: Uuid) -> AppResult<Parameter> {
        sqlx::query_as::<_, Parameter>(
            r#"
            SELECT id, nombre, valor, descripcion, actualizado_por, fecha_actualizacion,
                   created_at, updated_at
            FROM parametros
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Parámetro".to_string()))
    }

    /// Update a parameter value, recording the editor and edit time
    ///
    /// Values are not range-validated; operators own their thresholds.
    pub async fn update(
        &self,
        id: Uuid,
        editor: Option<Uuid>,
        input: UpdateParameterInput,
    ) -> AppResult<Parameter> {
        sqlx::query_as::<_, Parameter>(
            r#"
            UPDATE parametros
            SET valor = $1, actualizado_por = $2, fecha_actualizacion = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING id, nombre, valor, descripcion, actualizado_por, fecha_actualizacion,
                      created_at, updated_at
            "#,
        )
        .bind(input.valor)
        .bind(editor)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Parámetro".to_string()))
    }

    /// Insert the default parameters that do not exist yet
    pub async fn seed_defaults(&self) -> AppResult<()> {
        for (nombre, valor, descripcion) in DEFAULT_PARAMETERS {
            let inserted = sqlx::query(
                r#"
                INSERT INTO parametros (nombre, valor, descripcion)
                VALUES ($1, $2, $3)
                ON CONFLICT (nombre) DO NOTHING
                "#,
            )
            .bind(nombre)
            .bind(Decimal::from(*valor))
            .bind(descripcion)
            .execute(&self.db)
            .await?;

            if inserted.rows_affected() > 0 {
                tracing::info!("Parámetro {} creado con valor por defecto {}", nombre, valor);
            }
        }

        Ok(())
    }
}
