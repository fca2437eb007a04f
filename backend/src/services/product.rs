//! Product catalog service
//!
//! Products own the pricing and shelf-life data every lot and sale snapshot
//! from. Creating a product also creates its stock row, seeded from the
//! operational threshold parameters.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::sequence::{SequenceKind, SequenceService};
use shared::{parametros, Product};

/// Input for creating a product
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductInput {
    #[validate(length(min = 1, max = 255))]
    pub nombre: String,
    pub descripcion: Option<String>,
    pub categoria_id: Uuid,
    pub precio_venta: Decimal,
    pub costo: Decimal,
    #[validate(length(min = 1, max = 50))]
    pub unidad_medida: String,
    pub dias_expiracion: i32,
}

/// Input for updating a product
#[derive(Debug, Deserialize)]
pub struct UpdateProductInput {
    pub nombre: Option<String>,
    pub descripcion: Option<String>,
    pub categoria_id: Option<Uuid>,
    pub precio_venta: Option<Decimal>,
    pub costo: Option<Decimal>,
    pub unidad_medida: Option<String>,
    pub dias_expiracion: Option<i32>,
}

/// Product row joined with its category name
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithCategory {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub producto: Product,
    pub categoria_nombre: String,
}

/// Result of creating a product
#[derive(Debug, Serialize)]
pub struct CreatedProduct {
    pub producto: Product,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advertencia: Option<String>,
}

/// SKU prefix built from the product name: `SC-<NAME-WITH-DASHES>`
pub fn sku_prefix(nombre: &str) -> String {
    let slug = nombre
        .trim()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_uppercase();
    format!("SC-{}", slug)
}

const SELECT_PRODUCT: &str = r#"
    SELECT id, nombre, descripcion, categoria_id, sku, precio_venta, costo,
           unidad_medida, dias_expiracion, created_at, updated_at
    FROM productos
"#;

/// Product catalog service
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

impl ProductService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    fn validate_fields(
        precio_venta: Option<Decimal>,
        costo: Option<Decimal>,
        dias_expiracion: Option<i32>,
    ) -> AppResult<()> {
        if let Some(precio) = precio_venta {
            if precio <= Decimal::ZERO {
                return Err(AppError::Validation {
                    field: "precioVenta".to_string(),
                    message: "Sale price must be a positive number".to_string(),
                    message_es: "El campo \"precioVenta\" debe ser un número positivo".to_string(),
                });
            }
        }
        if let Some(costo) = costo {
            if costo <= Decimal::ZERO {
                return Err(AppError::Validation {
                    field: "costo".to_string(),
                    message: "Cost must be a positive number".to_string(),
                    message_es: "El campo \"costo\" debe ser un número positivo".to_string(),
                });
            }
        }
        if let Some(dias) = dias_expiracion {
            if dias <= 0 {
                return Err(AppError::Validation {
                    field: "diasExpiracion".to_string(),
                    message: "Expiration days must be a positive number".to_string(),
                    message_es: "El campo \"diasExpiracion\" debe ser un número positivo".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Create a product with its stock row, seeded from parameters
    pub async fn create(&self, input: CreateProductInput) -> AppResult<CreatedProduct> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
        if input.nombre.trim().is_empty() {
            return Err(AppError::Validation {
                field: "nombre".to_string(),
                message: "Product name cannot be empty".to_string(),
                message_es: "El campo \"nombre\" es requerido".to_string(),
            });
        }
        if input.unidad_medida.trim().is_empty() {
            return Err(AppError::Validation {
                field: "unidadMedida".to_string(),
                message: "Unit of measure cannot be empty".to_string(),
                message_es: "El campo \"unidadMedida\" es requerido".to_string(),
            });
        }
        Self::validate_fields(
            Some(input.precio_venta),
            Some(input.costo),
            Some(input.dias_expiracion),
        )?;

        let nombre_tomado = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM productos WHERE nombre = $1)",
        )
        .bind(&input.nombre)
        .fetch_one(&self.db)
        .await?;
        if nombre_tomado {
            return Err(AppError::DuplicateEntry("producto".to_string()));
        }

        let categoria_existe = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM categorias WHERE id = $1)",
        )
        .bind(input.categoria_id)
        .fetch_one(&self.db)
        .await?;
        if !categoria_existe {
            return Err(AppError::Validation {
                field: "categoriaId".to_string(),
                message: "The given category does not exist".to_string(),
                message_es: "La categoría proporcionada no existe".to_string(),
            });
        }

        // Stock thresholds come from configuration; their absence is an
        // operator problem, not a caller problem.
        let mut umbrales = [Decimal::ZERO; 3];
        for (i, nombre) in [
            parametros::STOCK_MINIMO,
            parametros::STOCK_MAXIMO,
            parametros::DIAS_PROXIMOS_A_EXPIRAR,
        ]
        .into_iter()
        .enumerate()
        {
            umbrales[i] =
                sqlx::query_scalar::<_, Decimal>("SELECT valor FROM parametros WHERE nombre = $1")
                    .bind(nombre)
                    .fetch_optional(&self.db)
                    .await?
                    .ok_or_else(|| AppError::parameter_missing(nombre))?;
        }
        let [stock_minimo, stock_maximo, dias_proximos] = umbrales;

        let sku = SequenceService::new(self.db.clone())
            .next_code(SequenceKind::Producto, &sku_prefix(&input.nombre))
            .await?;

        let mut tx = self.db.begin().await?;

        let producto = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO productos (
                nombre, descripcion, categoria_id, sku, precio_venta, costo,
                unidad_medida, dias_expiracion
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, nombre, descripcion, categoria_id, sku, precio_venta, costo,
                      unidad_medida, dias_expiracion, created_at, updated_at
            "#,
        )
        .bind(&input.nombre)
        .bind(&input.descripcion)
        .bind(input.categoria_id)
        .bind(&sku)
        .bind(input.precio_venta)
        .bind(input.costo)
        .bind(&input.unidad_medida)
        .bind(input.dias_expiracion)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO stocks (producto_id, stock_actual, stock_reservado, stock_minimo,
                                stock_maximo, stock_disponible)
            VALUES ($1, 0, 0, $2, $3, 0)
            "#,
        )
        .bind(producto.id)
        .bind(stock_minimo)
        .bind(stock_maximo)
        .execute(&mut *tx)
        .await?;

        // A shelf life shorter than the expiry window deserves an advisory
        // alert right away.
        let advertencia = if Decimal::from(input.dias_expiracion) <= dias_proximos {
            let vence = Utc::now() + Duration::days(input.dias_expiracion as i64);
            sqlx::query(
                r#"
                INSERT INTO alertas (producto_id, tipo_alerta, descripcion, prioridad,
                                     fecha_vencimiento, fecha_alerta, estado)
                VALUES ($1, 'vencimiento', $2, 'media', $3, NOW(), 'pendiente')
                "#,
            )
            .bind(producto.id)
            .bind(format!(
                "El producto \"{}\" tiene una vida útil de {} días, dentro de la ventana de expiración.",
                producto.nombre, input.dias_expiracion
            ))
            .bind(vence)
            .execute(&mut *tx)
            .await?;

            Some(format!(
                "Producto con vida útil de {} días, próxima a la ventana de expiración.",
                input.dias_expiracion
            ))
        } else {
            None
        };

        tx.commit().await?;

        Ok(CreatedProduct {
            producto,
            advertencia,
        })
    }

    /// List all products with their category names
    pub async fn list(&self) -> AppResult<Vec<ProductWithCategory>> {
        let productos = sqlx::query_as::<_, ProductWithCategory>(
            r#"
            SELECT p.id, p.nombre, p.descripcion, p.categoria_id, p.sku, p.precio_venta,
                   p.costo, p.unidad_medida, p.dias_expiracion, p.created_at, p.updated_at,
                   c.nombre AS categoria_nombre
            FROM productos p
            JOIN categorias c ON c.id = p.categoria_id
            ORDER BY p.nombre
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(productos)
    }

    /// Get a product by id
    pub async fn get(&self, id: Uuid) -> AppResult<Product> {
        sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Producto".to_string()))
    }

    /// Update a product
    pub async fn update(&self, id: Uuid, input: UpdateProductInput) -> AppResult<Product> {
        let existente = self.get(id).await?;

        Self::validate_fields(input.precio_venta, input.costo, input.dias_expiracion)?;

        if let Some(nombre) = &input.nombre {
            if nombre.trim().is_empty() {
                return Err(AppError::Validation {
                    field: "nombre".to_string(),
                    message: "Product name cannot be empty".to_string(),
                    message_es: "El campo \"nombre\" es requerido".to_string(),
                });
            }
            let tomado = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM productos WHERE nombre = $1 AND id <> $2)",
            )
            .bind(nombre)
            .bind(id)
            .fetch_one(&self.db)
            .await?;
            if tomado {
                return Err(AppError::DuplicateEntry("producto".to_string()));
            }
        }

        if let Some(categoria_id) = input.categoria_id {
            let existe = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM categorias WHERE id = $1)",
            )
            .bind(categoria_id)
            .fetch_one(&self.db)
            .await?;
            if !existe {
                return Err(AppError::Validation {
                    field: "categoriaId".to_string(),
                    message: "The given category does not exist".to_string(),
                    message_es: "La categoría proporcionada no existe".to_string(),
                });
            }
        }

        let producto = sqlx::query_as::<_, Product>(
            r#"
            UPDATE productos
            SET nombre = $1, descripcion = $2, categoria_id = $3, precio_venta = $4,
                costo = $5, unidad_medida = $6, dias_expiracion = $7, updated_at = NOW()
            WHERE id = $8
            RETURNING id, nombre, descripcion, categoria_id, sku, precio_venta, costo,
                      unidad_medida, dias_expiracion, created_at, updated_at
            "#,
        )
        .bind(input.nombre.unwrap_or(existente.nombre))
        .bind(input.descripcion.or(existente.descripcion))
        .bind(input.categoria_id.unwrap_or(existente.categoria_id))
        .bind(input.precio_venta.unwrap_or(existente.precio_venta))
        .bind(input.costo.unwrap_or(existente.costo))
        .bind(input.unidad_medida.unwrap_or(existente.unidad_medida))
        .bind(input.dias_expiracion.unwrap_or(existente.dias_expiracion))
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        Ok(producto)
    }

    /// Delete a product no lot, movement or sale references
    ///
    /// The stock row and any alerts for the product go with it.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.get(id).await?;

        let referenciado = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM lotes_produccion WHERE producto_id = $1)
                OR EXISTS(SELECT 1 FROM movimientos_inventario WHERE producto_id = $1)
                OR EXISTS(SELECT 1 FROM venta_lineas WHERE producto_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if referenciado {
            return Err(AppError::InUse("El producto".to_string()));
        }

        let mut tx = self.db.begin().await?;
        sqlx::query("DELETE FROM alertas WHERE producto_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM stocks WHERE producto_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM productos WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sku_prefix_slugifies_names() {
        assert_eq!(sku_prefix("Pan Dulce"), "SC-PAN-DULCE");
        assert_eq!(sku_prefix("  galletas   de miel "), "SC-GALLETAS-DE-MIEL");
        assert_eq!(sku_prefix("Yogurt"), "SC-YOGURT");
    }
}
