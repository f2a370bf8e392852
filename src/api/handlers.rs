//! API request handlers.

use crate::api::extract::{RequestId, UserId};
use crate::endpoint::EndpointContext;
use crate::error::{ApiError, ErrorResponse};
use crate::models::{
    AddPayload, AddTickerRequest, DebugLogsResponse, FeedPayload, HealthResponse, Insight,
    ListPayload, RemovePayload, TickerItem,
};
use crate::state::AppState;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, Uri};
use serde::Deserialize;
use std::sync::Arc;

// ============================================================================
// Health Check
// ============================================================================

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Watchlist
// ============================================================================

/// List the caller's watchlist.
#[utoipa::path(
    get,
    path = "/watchlist",
    params(
        ("X-User-ID" = String, Header, description = "Acting user")
    ),
    responses(
        (status = 200, description = "Watchlist entries", body = Vec<TickerItem>),
        (status = 400, description = "Missing user header", body = ErrorResponse)
    ),
    tag = "Watchlist"
)]
pub async fn list_watchlist(
    State(state): State<Arc<AppState>>,
    RequestId(request_id): RequestId,
    UserId(user_id): UserId,
) -> Result<Json<Vec<TickerItem>>, ApiError> {
    let ctx = EndpointContext::new(request_id.clone());
    state
        .endpoints
        .watchlist_list
        .invoke(&ctx, ListPayload { user_id })
        .await
        .map(Json)
        .map_err(|e| state.report(request_id.as_deref(), e.into()))
}

/// Add or replace a ticker in the caller's watchlist.
#[utoipa::path(
    post,
    path = "/watchlist",
    params(
        ("X-User-ID" = String, Header, description = "Acting user")
    ),
    request_body = AddTickerRequest,
    responses(
        (status = 200, description = "Stored entry", body = TickerItem),
        (status = 400, description = "Malformed body or missing user header", body = ErrorResponse)
    ),
    tag = "Watchlist"
)]
pub async fn add_ticker(
    State(state): State<Arc<AppState>>,
    RequestId(request_id): RequestId,
    UserId(user_id): UserId,
    body: Result<Json<AddTickerRequest>, JsonRejection>,
) -> Result<Json<TickerItem>, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        state.report(
            request_id.as_deref(),
            ApiError::InvalidRequest(rejection.body_text()),
        )
    })?;

    if body.symbol.is_empty() {
        return Err(state.report(
            request_id.as_deref(),
            ApiError::InvalidRequest("symbol cannot be empty".to_string()),
        ));
    }

    let ctx = EndpointContext::new(request_id.clone());
    let payload = AddPayload {
        user_id,
        symbol: body.symbol,
        on_hand: body.on_hand,
    };
    state
        .endpoints
        .watchlist_add
        .invoke(&ctx, payload)
        .await
        .map(Json)
        .map_err(|e| state.report(request_id.as_deref(), e.into()))
}

/// Remove a ticker from the caller's watchlist.
///
/// Succeeds whether or not the symbol was present.
#[utoipa::path(
    delete,
    path = "/watchlist/{symbol}",
    params(
        ("symbol" = String, Path, description = "Symbol to remove"),
        ("X-User-ID" = String, Header, description = "Acting user")
    ),
    responses(
        (status = 204, description = "Removed"),
        (status = 400, description = "Missing user header", body = ErrorResponse)
    ),
    tag = "Watchlist"
)]
pub async fn remove_ticker(
    State(state): State<Arc<AppState>>,
    RequestId(request_id): RequestId,
    UserId(user_id): UserId,
    Path(symbol): Path<String>,
) -> Result<StatusCode, ApiError> {
    let ctx = EndpointContext::new(request_id.clone());
    state
        .endpoints
        .watchlist_remove
        .invoke(&ctx, RemovePayload { user_id, symbol })
        .await
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(|e| state.report(request_id.as_deref(), e.into()))
}

// ============================================================================
// Insight feeds
// ============================================================================

/// Market insights for the demo symbols.
#[utoipa::path(
    get,
    path = "/insights",
    params(
        ("X-User-ID" = String, Header, description = "Acting user")
    ),
    responses(
        (status = 200, description = "Generated insights", body = Vec<Insight>),
        (status = 400, description = "Missing user header", body = ErrorResponse)
    ),
    tag = "Insights"
)]
pub async fn list_insights(
    State(state): State<Arc<AppState>>,
    RequestId(request_id): RequestId,
    UserId(user_id): UserId,
) -> Result<Json<Vec<Insight>>, ApiError> {
    let ctx = EndpointContext::new(request_id.clone());
    state
        .endpoints
        .insights_list
        .invoke(&ctx, FeedPayload { user_id })
        .await
        .map(Json)
        .map_err(|e| state.report(request_id.as_deref(), e.into()))
}

/// Portfolio insights for the demo symbols.
#[utoipa::path(
    get,
    path = "/portfolio",
    params(
        ("X-User-ID" = String, Header, description = "Acting user")
    ),
    responses(
        (status = 200, description = "Generated insights", body = Vec<Insight>),
        (status = 400, description = "Missing user header", body = ErrorResponse)
    ),
    tag = "Insights"
)]
pub async fn list_portfolio(
    State(state): State<Arc<AppState>>,
    RequestId(request_id): RequestId,
    UserId(user_id): UserId,
) -> Result<Json<Vec<Insight>>, ApiError> {
    let ctx = EndpointContext::new(request_id.clone());
    state
        .endpoints
        .portfolio_list
        .invoke(&ctx, FeedPayload { user_id })
        .await
        .map(Json)
        .map_err(|e| state.report(request_id.as_deref(), e.into()))
}

// ============================================================================
// Debug
// ============================================================================

/// Query of the `/debug` route.
#[derive(Debug, Deserialize)]
pub struct DebugLogsQuery {
    /// `on` or `off`; omitted to read the current state.
    #[serde(rename = "debug-logs")]
    pub debug_logs: Option<String>,
}

/// Read or flip the payload-logging switch. Mounted only in debug mode.
#[utoipa::path(
    get,
    path = "/debug",
    params(
        ("debug-logs" = Option<String>, Query, description = "`on` or `off`")
    ),
    responses(
        (status = 200, description = "Current state", body = DebugLogsResponse),
        (status = 400, description = "Unknown value", body = ErrorResponse)
    ),
    tag = "Debug"
)]
pub async fn debug_logs(
    State(state): State<Arc<AppState>>,
    RequestId(request_id): RequestId,
    Query(query): Query<DebugLogsQuery>,
) -> Result<Json<DebugLogsResponse>, ApiError> {
    let Some(toggle) = state.debug.as_ref() else {
        return Err(state.report(
            request_id.as_deref(),
            ApiError::NotFound("/debug".to_string()),
        ));
    };

    match query.debug_logs.as_deref() {
        Some("on") => toggle.set(true),
        Some("off") => toggle.set(false),
        Some(other) => {
            return Err(state.report(
                request_id.as_deref(),
                ApiError::InvalidRequest(format!(
                    "debug-logs must be 'on' or 'off', got '{}'",
                    other
                )),
            ));
        }
        None => {}
    }

    let debug_logs = if toggle.is_enabled() { "on" } else { "off" };
    Ok(Json(DebugLogsResponse {
        debug_logs: debug_logs.to_string(),
    }))
}

/// Fallback for unmatched routes.
pub async fn not_found(
    State(state): State<Arc<AppState>>,
    RequestId(request_id): RequestId,
    uri: Uri,
) -> ApiError {
    state.report(
        request_id.as_deref(),
        ApiError::NotFound(uri.path().to_string()),
    )
}
