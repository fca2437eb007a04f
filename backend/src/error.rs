//! Error handling for the Almacen inventory and sales platform
//!
//! Provides consistent error responses in English and Spanish

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String, message_es: String },

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_es: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business rule violations
    #[error("Insufficient stock: requested {solicitado}, current {disponible}")]
    InsufficientStock {
        solicitado: Decimal,
        disponible: Decimal,
    },

    #[error("Insufficient lot quantity in {codigo_lote}: requested {solicitado}, available {disponible}")]
    InsufficientLotQuantity {
        codigo_lote: String,
        solicitado: Decimal,
        disponible: Decimal,
    },

    #[error("Cited lots cover {cubierto} of the requested {solicitado} for product {producto}")]
    LotCoverageInsufficient {
        producto: String,
        cubierto: Decimal,
        solicitado: Decimal,
    },

    #[error("Produced quantity cannot drop below the sold quantity ({vendido})")]
    ProducedBelowSold { vendido: Decimal },

    #[error("Paid amount must equal the outstanding total ({esperado})")]
    AmountMismatch { esperado: Decimal },

    #[error("Paid amount exceeds the client's outstanding debt ({deuda})")]
    AmountExceedsDebt { deuda: Decimal },

    #[error("No outstanding sales for this client")]
    NoOutstandingSales,

    #[error("One or more sales do not belong to the client")]
    SaleNotOwnedByClient { ventas: Vec<uuid::Uuid> },

    #[error("{0} is referenced by other records")]
    InUse(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    /// Required-parameter lookup failure (operator-fixable, not caller-fixable)
    pub fn parameter_missing(nombre: &str) -> Self {
        AppError::Configuration(format!("Parameter \"{nombre}\" is not configured"))
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_es: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Unauthorized {
                message,
                message_es,
            } => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail {
                    code: "UNAUTHORIZED".to_string(),
                    message_en: message.clone(),
                    message_es: message_es.clone(),
                    field: None,
                },
            ),
            AppError::Validation {
                field,
                message,
                message_es,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: message.clone(),
                    message_es: message_es.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_es: format!("Datos inválidos: {}", msg),
                    field: None,
                },
            ),
            AppError::DuplicateEntry(field) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "DUPLICATE_ENTRY".to_string(),
                    message_en: format!("A record with this {} already exists", field),
                    message_es: format!("Ya existe un registro con este {}", field),
                    field: Some(field.clone()),
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message_en: format!("{} not found", resource),
                    message_es: format!("No se encontró {}", resource),
                    field: None,
                },
            ),
            AppError::InsufficientStock {
                solicitado,
                disponible,
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INSUFFICIENT_STOCK".to_string(),
                    message_en: format!(
                        "Not enough stock for the outgoing movement: requested {}, current {}",
                        solicitado, disponible
                    ),
                    message_es: format!(
                        "No hay suficiente stock para realizar la salida: solicitado {}, actual {}",
                        solicitado, disponible
                    ),
                    field: None,
                },
            ),
            AppError::InsufficientLotQuantity {
                codigo_lote,
                solicitado,
                disponible,
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INSUFFICIENT_LOT_QUANTITY".to_string(),
                    message_en: format!(
                        "Requested quantity ({}) for lot {} exceeds its available quantity ({})",
                        solicitado, codigo_lote, disponible
                    ),
                    message_es: format!(
                        "La cantidad solicitada ({}) para el lote {} excede la cantidad disponible ({})",
                        solicitado, codigo_lote, disponible
                    ),
                    field: None,
                },
            ),
            AppError::LotCoverageInsufficient {
                producto,
                cubierto,
                solicitado,
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "LOT_COVERAGE_INSUFFICIENT".to_string(),
                    message_en: format!(
                        "The cited lots cover {} of the requested {} for product {}",
                        cubierto, solicitado, producto
                    ),
                    message_es: format!(
                        "La cantidad total de los lotes ({}) no cubre la cantidad solicitada ({}) para el producto {}",
                        cubierto, solicitado, producto
                    ),
                    field: None,
                },
            ),
            AppError::ProducedBelowSold { vendido } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "PRODUCED_BELOW_SOLD".to_string(),
                    message_en: format!(
                        "Produced quantity cannot be lower than the quantity already sold ({})",
                        vendido
                    ),
                    message_es: format!(
                        "La cantidad producida no puede ser menor que la cantidad ya vendida ({})",
                        vendido
                    ),
                    field: None,
                },
            ),
            AppError::AmountMismatch { esperado } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "AMOUNT_MISMATCH".to_string(),
                    message_en: format!(
                        "Paid amount must equal the outstanding total ({}) of the cited sales",
                        esperado
                    ),
                    message_es: format!(
                        "El monto pagado debe ser igual a la suma total de las deudas ({}) de las ventas especificadas",
                        esperado
                    ),
                    field: None,
                },
            ),
            AppError::AmountExceedsDebt { deuda } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "AMOUNT_EXCEEDS_DEBT".to_string(),
                    message_en: format!(
                        "Paid amount cannot exceed the client's total outstanding debt ({})",
                        deuda
                    ),
                    message_es: format!(
                        "El monto pagado no puede ser mayor que el saldo total ({}) de todas las deudas del cliente",
                        deuda
                    ),
                    field: None,
                },
            ),
            AppError::NoOutstandingSales => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "NO_OUTSTANDING_SALES".to_string(),
                    message_en: "No sales with an outstanding balance were found for this client"
                        .to_string(),
                    message_es: "No se encontraron ventas con saldo pendiente para este cliente"
                        .to_string(),
                    field: None,
                },
            ),
            AppError::SaleNotOwnedByClient { ventas } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "SALE_NOT_OWNED_BY_CLIENT".to_string(),
                    message_en: format!(
                        "One or more sales do not belong to the given client: {:?}",
                        ventas
                    ),
                    message_es: format!(
                        "Una o más ventas no pertenecen al cliente proporcionado: {:?}",
                        ventas
                    ),
                    field: None,
                },
            ),
            AppError::InUse(resource) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "RESOURCE_IN_USE".to_string(),
                    message_en: format!("{} cannot be deleted because other records reference it", resource),
                    message_es: format!("{} no puede ser eliminado porque está asociado a otros registros", resource),
                    field: None,
                },
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "CONFIGURATION_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_es: format!("Error de configuración: {}", msg),
                    field: None,
                },
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "DATABASE_ERROR".to_string(),
                    message_en: "A database error occurred".to_string(),
                    message_es: "Ocurrió un error en la base de datos".to_string(),
                    field: None,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_es: "Error interno del servidor".to_string(),
                    field: None,
                },
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: "An internal server error occurred".to_string(),
                    message_es: "Error interno del servidor".to_string(),
                    field: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
