//! Product category service

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::Category;

/// Input for creating or updating a category
#[derive(Debug, Deserialize)]
pub struct CategoryInput {
    pub nombre: String,
    pub descripcion: Option<String>,
}

const SELECT_CATEGORY: &str = r#"
    SELECT id, nombre, descripcion, created_at, updated_at
    FROM categorias
"#;

/// Category service
#[derive(Clone)]
pub struct CategoryService {
    db: PgPool,
}

impl CategoryService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create(&self, input: CategoryInput) -> AppResult<Category> {
        if input.nombre.trim().is_empty() {
            return Err(AppError::Validation {
                field: "nombre".to_string(),
                message: "Category name cannot be empty".to_string(),
                message_es: "El campo \"nombre\" es requerido".to_string(),
            });
        }

        let tomado = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM categorias WHERE nombre = $1)",
        )
        .bind(&input.nombre)
        .fetch_one(&self.db)
        .await?;
        if tomado {
            return Err(AppError::DuplicateEntry("categoría".to_string()));
        }

        let categoria = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categorias (nombre, descripcion)
            VALUES ($1, $2)
            RETURNING id, nombre, descripcion, created_at, updated_at
            "#,
        )
        .bind(&input.nombre)
        .bind(&input.descripcion)
        .fetch_one(&self.db)
        .await?;

        Ok(categoria)
    }

    pub async fn list(&self) -> AppResult<Vec<Category>> {
        let categorias =
            sqlx::query_as::<_, Category>(&format!("{SELECT_CATEGORY} ORDER BY nombre"))
                .fetch_all(&self.db)
                .await?;

        Ok(categorias)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(&format!("{SELECT_CATEGORY} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Categoría".to_string()))
    }

    pub async fn update(&self, id: Uuid, input: CategoryInput) -> AppResult<Category> {
        self.get(id).await?;

        if input.nombre.trim().is_empty() {
            return Err(AppError::Validation {
                field: "nombre".to_string(),
                message: "Category name cannot be empty".to_string(),
                message_es: "El campo \"nombre\" es requerido".to_string(),
            });
        }

        let categoria = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categorias
            SET nombre = $1, descripcion = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING id, nombre, descripcion, created_at, updated_at
            "#,
        )
        .bind(&input.nombre)
        .bind(&input.descripcion)
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        Ok(categoria)
    }

    /// Delete a category no product references
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.get(id).await?;

        let en_uso = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM productos WHERE categoria_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;
        if en_uso {
            return Err(AppError::InUse("La categoría".to_string()));
        }

        sqlx::query("DELETE FROM categorias WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(())
    }
}
