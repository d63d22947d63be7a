//! Route definitions for the storefront and dashboard API

use axum::routing::{get, post};
use axum::Router;

use crate::database::AppState;
use crate::handler::{
    create_order, create_platform, create_service, dashboard_summary, get_order, get_platform,
    get_service, health, list_orders, list_platforms, list_services, quote_price, reset_catalog,
    update_order_status,
};

/// Creates the application router
///
/// # Route Definitions
///
/// - `GET /health` - liveness and catalog readiness
/// - `GET|POST /api/platforms`, `GET /api/platforms/{slug}`
/// - `GET|POST /api/services`, `GET /api/services/{id}`
/// - `POST /api/quote` - price calculator
/// - `GET|POST /api/orders`, `GET /api/orders/{id}`
/// - `POST /api/orders/{id}/status` - payment completion
/// - `GET /api/dashboard/summary`
/// - `POST /api/admin/reset` - clears the catalog
///
/// # Example Usage
///
/// ```no_run
/// # use std::sync::Arc;
/// # use boostdesk::database::{AppState, RedbStore};
/// # use boostdesk::route::create_app;
/// let store = RedbStore::open("data.db").unwrap();
/// let state = AppState::new(Arc::new(store));
/// let app = create_app(state);
/// // axum::serve(listener, app).await.unwrap();
/// ```
pub fn create_app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/platforms", get(list_platforms).post(create_platform))
        .route("/platforms/{slug}", get(get_platform))
        .route("/services", get(list_services).post(create_service))
        .route("/services/{id}", get(get_service))
        .route("/quote", post(quote_price))
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/status", post(update_order_status))
        .route("/dashboard/summary", get(dashboard_summary))
        .route("/admin/reset", post(reset_catalog));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes)
        .with_state(state)
}
