//! Route definitions for the Almacen inventory and sales platform

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
///
/// The state handle is needed up front so the auth middleware can verify
/// tokens against the configured secret.
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - catalog
        .nest("/categorias", category_routes(&state))
        .nest("/productos", product_routes(&state))
        // Protected routes - inventory core
        .nest("/stock", stock_routes(&state))
        .nest("/lotes", lot_routes(&state))
        .nest("/movimientos", movement_routes(&state))
        // Protected routes - commercial core
        .nest("/ventas", sale_routes(&state))
        .nest("/pagos", payment_routes(&state))
        // Protected routes - derived state and configuration
        .nest("/alertas", alert_routes(&state))
        .nest("/parametros", parameter_routes(&state))
        .nest("/historial", history_routes(&state))
}

/// Category management routes (protected)
fn category_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/:categoria_id",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Product management routes (protected)
fn product_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/:producto_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route("/:producto_id/lotes", get(handlers::get_lots_by_product))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Stock ledger routes (protected)
fn stock_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_stock))
        .route(
            "/:producto_id",
            get(handlers::get_stock_by_product).put(handlers::update_stock),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Production lot routes (protected)
fn lot_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_lots).post(handlers::create_lot))
        .route(
            "/:lote_id",
            get(handlers::get_lot)
                .put(handlers::update_lot)
                .delete(handlers::delete_lot),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Inventory movement routes (protected)
fn movement_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_movements).post(handlers::record_movement),
        )
        .route(
            "/:movimiento_id",
            get(handlers::get_movement).delete(handlers::delete_movement),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Sales routes (protected)
fn sale_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales).post(handlers::create_sale))
        .route(
            "/:venta_id",
            get(handlers::get_sale)
                .put(handlers::update_sale)
                .delete(handlers::delete_sale),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Payment routes (protected)
fn payment_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_payment))
        .route(
            "/cliente/:cliente_id",
            get(handlers::get_payments_by_client),
        )
        .route(
            "/cliente/:cliente_id/pendientes",
            get(handlers::get_outstanding_sales_by_client),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Alert routes (protected)
fn alert_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_alerts))
        .route("/generar", post(handlers::generate_alerts))
        .route("/:alerta_id/estado", put(handlers::update_alert_status))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Parameter routes (protected)
fn parameter_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_parameters))
        .route(
            "/:parametro_id",
            get(handlers::get_parameter).put(handlers::update_parameter),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Historical aggregate routes (protected)
fn history_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/ventas/:producto_id", get(handlers::get_sales_history))
        .route(
            "/produccion/:producto_id",
            get(handlers::get_production_history),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}
