//! HTTP request handlers for the storefront and the admin dashboard
//!
//! Handlers are thin: they translate requests into catalog, pricing and
//! ledger calls and map [`StoreError`]s to JSON error responses.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::json;

use crate::database::AppState;
use crate::error::StoreError;
use crate::model::{
    normalize_slug, CreatePlatform, ListParams, NewOrder, Platform, PlatformType, QuoteRequest,
    RawService, ServiceId, ServiceType, StatusUpdate,
};
use crate::pricing::{
    currency_rate, demo_platform_factor, demo_price, quote, quote_with_factor, PricingSource, Quote,
};

/// Liveness plus catalog readiness
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "ready": state.catalog.is_ready(),
    }))
}

/// Lists platforms
///
/// `GET /api/platforms?active_only=true` returns only storefront-visible ones.
pub async fn list_platforms(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, StoreError> {
    let platforms = if params.active_only {
        state.catalog.get_active_platforms()?
    } else {
        state.catalog.get_platforms()?
    };
    Ok(Json(platforms))
}

/// Gets one platform by slug
///
/// # Response
///
/// - **200 OK** - the platform, active or not
/// - **404 Not Found** - unknown slug
pub async fn get_platform(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, StoreError> {
    state
        .catalog
        .find_platform(&slug)?
        .map(Json)
        .ok_or_else(|| StoreError::NotFound(format!("platform `{}`", slug)))
}

/// Adds a platform from the dashboard
///
/// # Response
///
/// - **201 Created** - platform stored
/// - **409 Conflict** - slug already present
/// - **400 Bad Request** - slug is not a single lowercase token
pub async fn create_platform(
    State(state): State<AppState>,
    Json(payload): Json<CreatePlatform>,
) -> Result<impl IntoResponse, StoreError> {
    let slug = normalize_slug(&payload.slug)
        .ok_or_else(|| StoreError::Validation(format!("invalid slug `{}`", payload.slug)))?;

    let platform = Platform {
        id: slug.clone(),
        slug,
        name: payload.name,
        description: payload.description,
        website: payload.website,
        color: payload.color,
        icon: payload.icon,
        kind: payload.kind.map(PlatformType::from).unwrap_or_default(),
        active: true,
        created_at: Utc::now(),
    };

    if !state.catalog.add_platform(platform.clone())? {
        return Ok((
            StatusCode::CONFLICT,
            Json(json!({
                "error": "Platform already exists",
                "code": "conflict"
            })),
        )
            .into_response());
    }

    Ok((StatusCode::CREATED, Json(platform)).into_response())
}

/// Lists services; `active_only` hides inactive and orphaned services
pub async fn list_services(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, StoreError> {
    Ok(Json(state.catalog.get_services(params.active_only)?))
}

/// Adds a service; the body uses the stored camelCase record shape
///
/// # Response
///
/// - **201 Created** - service stored
/// - **409 Conflict** - a service with the same id exists; `7` and `"7"` count as the same id
/// - **400 Bad Request** - id, platformId or a non-negative price missing
pub async fn create_service(
    State(state): State<AppState>,
    Json(payload): Json<RawService>,
) -> Result<impl IntoResponse, StoreError> {
    let service = payload
        .into_service()
        .ok_or_else(|| StoreError::Validation("service needs id, platformId and a non-negative price".to_string()))?;

    if !state.catalog.add_service(service.clone())? {
        return Ok((
            StatusCode::CONFLICT,
            Json(json!({
                "error": "Service already exists",
                "code": "conflict"
            })),
        )
            .into_response());
    }

    Ok((StatusCode::CREATED, Json(service)).into_response())
}

/// Prices a service in the requested currency
///
/// The formula depends on `source`: stored services use their own price,
/// demo services additionally apply the platform factor.
///
/// # Steps
///
/// 1. Resolve the currency rate, rejecting unknown codes
/// 2. Look up the unit price from the stored or demo catalog
/// 3. Clamp the quantity and compute the total
///
/// # Response
///
/// - **200 OK** - a [`Quote`]
/// - **400 Bad Request** - unknown currency or missing selector
/// - **404 Not Found** - service, demo service or demo platform unknown
pub async fn quote_price(
    State(state): State<AppState>,
    Json(payload): Json<QuoteRequest>,
) -> Result<impl IntoResponse, StoreError> {
    let rate = currency_rate(&payload.currency)
        .ok_or_else(|| StoreError::Validation(format!("unsupported currency `{}`", payload.currency)))?;

    let total = match payload.source {
        PricingSource::Catalog => {
            let id = payload
                .service_id
                .ok_or_else(|| StoreError::Validation("serviceId is required".to_string()))?;
            let service = state
                .catalog
                .find_service(&id)?
                .ok_or_else(|| StoreError::NotFound(format!("service `{}`", id)))?;
            quote(service.price, payload.quantity, rate)
        }
        PricingSource::Demo => {
            let kind = payload
                .service_type
                .map(ServiceType::from)
                .ok_or_else(|| StoreError::Validation("serviceType is required".to_string()))?;
            let price = demo_price(&kind)
                .ok_or_else(|| StoreError::NotFound(format!("demo service `{}`", String::from(kind))))?;
            let slug = payload.platform.unwrap_or_default().to_lowercase();
            let factor = demo_platform_factor(&slug)
                .ok_or_else(|| StoreError::NotFound(format!("demo platform `{}`", slug)))?;
            quote_with_factor(price, factor, payload.quantity, rate)
        }
    };

    Ok(Json(Quote::new(payload.quantity, &payload.currency, total)))
}

/// All orders, newest first
pub async fn list_orders(State(state): State<AppState>) -> Result<impl IntoResponse, StoreError> {
    Ok(Json(state.ledger.list_orders()?))
}

/// Creates an order from checkout and makes it the current order
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<NewOrder>,
) -> Result<impl IntoResponse, StoreError> {
    let order = state.ledger.create_order(payload)?;
    state.ledger.set_current_order(&order.id)?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// # Response
///
/// - **200 OK** - the order
/// - **404 Not Found** - no order with this `TX` id
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, StoreError> {
    state
        .ledger
        .find_by_id(&id)?
        .map(Json)
        .ok_or_else(|| StoreError::NotFound(format!("order `{}`", id)))
}

/// Applies a status change, typically on payment completion
///
/// # Response
///
/// - **200 OK** - order updated, body is the updated order
/// - **404 Not Found** - no such order
/// - **409 Conflict** - transition is not `processing -> completed`
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<StatusUpdate>,
) -> Result<impl IntoResponse, StoreError> {
    if !state
        .ledger
        .set_status(&id, payload.status, payload.transaction_id)?
    {
        return Err(StoreError::NotFound(format!("order `{}`", id)));
    }

    state
        .ledger
        .find_by_id(&id)?
        .map(Json)
        .ok_or_else(|| StoreError::NotFound(format!("order `{}`", id)))
}

/// Dashboard counters: order totals by status, the current order and catalog sizes
pub async fn dashboard_summary(State(state): State<AppState>) -> Result<impl IntoResponse, StoreError> {
    let summary = state.ledger.summary()?;
    let current_order = state.ledger.current_order()?;
    let platforms = state.catalog.get_platforms()?.len();
    let services = state.catalog.get_services(false)?.len();

    Ok(Json(json!({
        "orders": summary,
        "currentOrderId": current_order,
        "platforms": platforms,
        "services": services,
    })))
}

/// Clears the catalog; the next startup seeds it again
pub async fn reset_catalog(State(state): State<AppState>) -> Result<impl IntoResponse, StoreError> {
    state.catalog.reset()?;
    Ok(Json(json!({ "message": "Catalog reset" })))
}

/// Service lookup by path id, used by the storefront's service page
///
/// The path segment is parsed as an integer when possible, but a service
/// stored with the text id `"7"` is still found at `/api/services/7`.
///
/// # Response
///
/// - **200 OK** - the service
/// - **404 Not Found** - no service with this id
pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, StoreError> {
    let id = ServiceId::parse(&id);
    state
        .catalog
        .find_service(&id)?
        .map(Json)
        .ok_or_else(|| StoreError::NotFound(format!("service `{}`", id)))
}
