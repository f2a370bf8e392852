//! Route configuration.

use crate::api::docs::ApiDoc;
use crate::api::handlers;
use crate::state::AppState;
use axum::Router;
use axum::routing::{delete, get};
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Service routes as `(method, verb, path)`.
pub const MOUNTS: [(&str, &str, &str); 5] = [
    ("watchlist.list", "GET", "/watchlist"),
    ("watchlist.add", "POST", "/watchlist"),
    ("watchlist.remove", "DELETE", "/watchlist/{symbol}"),
    ("insights.list", "GET", "/insights"),
    ("portfolio.list", "GET", "/portfolio"),
];

/// Creates the API router.
///
/// The `/debug` route is mounted only when the state carries a debug toggle.
pub fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Watchlist
        .route(
            "/watchlist",
            get(handlers::list_watchlist).post(handlers::add_ticker),
        )
        .route("/watchlist/{symbol}", delete(handlers::remove_ticker))
        // Feeds
        .route("/insights", get(handlers::list_insights))
        .route("/portfolio", get(handlers::list_portfolio));

    for (method, verb, path) in MOUNTS {
        info!(method, verb, path, "HTTP handler mounted");
    }

    if state.debug.is_some() {
        router = router.route(
            "/debug",
            get(handlers::debug_logs).post(handlers::debug_logs),
        );
        info!(verb = "GET", path = "/debug", "debug log toggle mounted");
    }

    router
        .fallback(handlers::not_found)
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
