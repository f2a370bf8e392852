//! OpenAPI documentation.

use crate::error::ErrorResponse;
use crate::models::{
    AddTickerRequest, DebugLogsResponse, HealthResponse, Insight, Sentiment, TickerItem,
};
use utoipa::OpenApi;

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::health_check,
        crate::api::handlers::list_watchlist,
        crate::api::handlers::add_ticker,
        crate::api::handlers::remove_ticker,
        crate::api::handlers::list_insights,
        crate::api::handlers::list_portfolio,
        crate::api::handlers::debug_logs,
    ),
    components(
        schemas(
            HealthResponse,
            TickerItem,
            AddTickerRequest,
            Insight,
            Sentiment,
            DebugLogsResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Watchlist", description = "Per-user watchlist management"),
        (name = "Insights", description = "Generated market and portfolio insights"),
        (name = "Debug", description = "Runtime payload logging, debug mode only"),
    ),
    info(
        title = "Trading Assistant API",
        version = "0.1.0",
        description = "REST API for per-user watchlists and generated market insights",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;
