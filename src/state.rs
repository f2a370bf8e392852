//! Application state management.

use crate::config::ServerConfig;
use crate::endpoint::{DebugToggle, Endpoints, PayloadLogger};
use crate::error::{ApiError, ErrorSink, TracingErrorSink};
use crate::service::{FeedService, Insights, Portfolio, Watchlist, WatchlistService};
use std::sync::Arc;

/// Application state shared across all handlers.
pub struct AppState {
    /// Endpoints for every service method.
    pub endpoints: Endpoints,
    /// Receives transport and internal errors.
    pub error_sink: Arc<dyn ErrorSink>,
    /// Runtime payload-logging switch; `Some` only in debug mode.
    pub debug: Option<Arc<DebugToggle>>,
}

impl AppState {
    /// Creates a new application state with the default services.
    #[must_use]
    pub fn new() -> Self {
        Self::with_services(
            Arc::new(Watchlist::new()),
            Arc::new(Insights),
            Arc::new(Portfolio),
            false,
        )
    }

    /// Creates a new application state from configuration.
    #[must_use]
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::with_services(
            Arc::new(Watchlist::new()),
            Arc::new(Insights),
            Arc::new(Portfolio),
            config.debug,
        )
    }

    /// Creates a new application state around the given services.
    ///
    /// Every endpoint gets a [`PayloadLogger`]. In `debug` mode the logger
    /// starts verbose and the toggle is exposed for the `/debug` route.
    #[must_use]
    pub fn with_services(
        watchlist: Arc<dyn WatchlistService>,
        insights: Arc<dyn FeedService>,
        portfolio: Arc<dyn FeedService>,
        debug: bool,
    ) -> Self {
        let toggle = Arc::new(DebugToggle::new(debug));
        let mut endpoints = Endpoints::new(watchlist, insights, portfolio);
        endpoints.use_interceptor(Arc::new(PayloadLogger::new(Arc::clone(&toggle))));

        Self {
            endpoints,
            error_sink: Arc::new(TracingErrorSink),
            debug: debug.then_some(toggle),
        }
    }

    /// Replaces the error sink.
    #[must_use]
    pub fn with_error_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.error_sink = sink;
        self
    }

    /// Reports `err` to the sink and hands it back for the response.
    pub fn report(&self, request_id: Option<&str>, err: ApiError) -> ApiError {
        self.error_sink.report(request_id, &err);
        err
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
