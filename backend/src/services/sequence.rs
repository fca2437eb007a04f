//! Sequential human-readable code generation
//!
//! Codes follow the `PREFIX-NNNNNN` contract (zero-padded to six digits) and
//! are monotonically increasing and gap-tolerant. The counter lives in the
//! `sequences` table and is advanced with a single atomic upsert, so
//! concurrent creators cannot mint the same code.

use sqlx::PgPool;

use crate::error::{AppError, AppResult};

/// Entity families that carry sequential codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    Lote,
    Movimiento,
    Producto,
}

impl SequenceKind {
    pub fn key(&self) -> &'static str {
        match self {
            SequenceKind::Lote => "lote",
            SequenceKind::Movimiento => "movimiento",
            SequenceKind::Producto => "producto",
        }
    }

    /// Table and code column holding previously issued codes, used to seed
    /// the counter on first use.
    fn code_source(&self) -> (&'static str, &'static str) {
        match self {
            SequenceKind::Lote => ("lotes_produccion", "codigo_lote"),
            SequenceKind::Movimiento => ("movimientos_inventario", "movimiento_id"),
            SequenceKind::Producto => ("productos", "sku"),
        }
    }
}

/// Service minting sequential codes for lots, movements and SKUs
#[derive(Clone)]
pub struct SequenceService {
    db: PgPool,
}

impl SequenceService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Produce the next `PREFIX-NNNNNN` code for the given entity family
    pub async fn next_code(&self, kind: SequenceKind, prefix: &str) -> AppResult<String> {
        let next = match self.try_increment(kind).await? {
            Some(n) => n,
            None => {
                // First use: seed from the most recently created entity so
                // codes continue where pre-existing data left off.
                let seed = self.seed_value(kind).await?;
                self.insert_or_increment(kind, seed).await?
            }
        };

        Ok(format!("{}-{:06}", prefix, next))
    }

    async fn try_increment(&self, kind: SequenceKind) -> AppResult<Option<i64>> {
        let next = sqlx::query_scalar::<_, i64>(
            "UPDATE sequences SET valor = valor + 1 WHERE kind = $1 RETURNING valor",
        )
        .bind(kind.key())
        .fetch_optional(&self.db)
        .await?;

        Ok(next)
    }

    /// Counter value matching the latest issued code, or zero when none exist
    async fn seed_value(&self, kind: SequenceKind) -> AppResult<i64> {
        let (table, column) = kind.code_source();
        let last_code = sqlx::query_scalar::<_, String>(&format!(
            "SELECT {column} FROM {table} ORDER BY created_at DESC LIMIT 1"
        ))
        .fetch_optional(&self.db)
        .await?;

        match last_code {
            None => Ok(0),
            Some(code) => parse_code_suffix(&code).ok_or_else(|| {
                // An existing but unparsable code must never be silently
                // restarted: a fresh counter would mint duplicates.
                AppError::Internal(format!(
                    "Existing {} code \"{}\" has no numeric suffix",
                    kind.key(),
                    code
                ))
            }),
        }
    }

    /// Racing first uses both land here; the upsert keeps the counter atomic.
    async fn insert_or_increment(&self, kind: SequenceKind, seed: i64) -> AppResult<i64> {
        let next = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO sequences (kind, valor) VALUES ($1, $2 + 1)
            ON CONFLICT (kind) DO UPDATE SET valor = sequences.valor + 1
            RETURNING valor
            "#,
        )
        .bind(kind.key())
        .bind(seed)
        .fetch_one(&self.db)
        .await?;

        Ok(next)
    }
}

/// Parse the numeric suffix of a `PREFIX-NNNNNN` style code
pub fn parse_code_suffix(code: &str) -> Option<i64> {
    code.rsplit('-').next()?.parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_standard_codes() {
        assert_eq!(parse_code_suffix("LOTE-000042"), Some(42));
        assert_eq!(parse_code_suffix("MOV-000001"), Some(1));
        assert_eq!(parse_code_suffix("SC-PAN-DULCE-000317"), Some(317));
    }

    #[test]
    fn rejects_codes_without_numeric_suffix() {
        assert_eq!(parse_code_suffix("LOTE-ABC"), None);
        assert_eq!(parse_code_suffix("SINGUION"), None);
        assert_eq!(parse_code_suffix(""), None);
    }
}
