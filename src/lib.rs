//! # ta-server - Trading Assistant REST API Server
//!
//! A small HTTP service keeping a per-user watchlist of ticker symbols and
//! publishing demo market insights. Built with [Axum](https://crates.io/crates/axum)
//! for async HTTP handling and provides OpenAPI/Swagger documentation via
//! [utoipa](https://crates.io/crates/utoipa).
//!
//! ## Key Features
//!
//! - **Per-user Watchlists**: Add, replace, list and remove ticker entries,
//!   keyed by the `X-User-ID` header.
//!
//! - **Insight Feeds**: Generated market and portfolio insights for a fixed
//!   set of demo symbols.
//!
//! - **Endpoint Interceptors**: Every service method runs behind the same
//!   invoke contract with an ordered interceptor chain.
//!
//! - **Graceful Shutdown**: SIGINT/SIGTERM drain in-flight requests with a
//!   fixed deadline before the listener is forcibly closed.
//!
//! - **Structured Logging**: JSON or text output through `tracing`, with a
//!   request span carrying the request id and client IP.
//!
//! ## Architecture
//!
//! ```text
//! HTTP ─► middleware chain ─► handlers ─► Endpoints ─► services ─► WatchlistStore
//!         (cors, request id,              (interceptors)
//!          client ip, trace,
//!          catch panic)
//! ```
//!
//! ## Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Route handlers, extractors, middleware and router configuration |
//! | [`cli`] | Command line interface |
//! | [`config`] | TOML configuration with CLI and environment overrides |
//! | [`endpoint`] | Uniform endpoint contract and interceptors |
//! | [`error`] | API error types with `IntoResponse` implementation |
//! | [`logging`] | Tracing subscriber setup |
//! | [`models`] | Request/response DTOs with OpenAPI schemas |
//! | [`server`] | Listener lifecycle and graceful shutdown |
//! | [`service`] | Watchlist and feed services |
//! | [`state`] | Application state management |
//! | [`store`] | In-memory watchlist store |
//!
//! ## API Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/watchlist` | List the caller's watchlist |
//! | POST | `/watchlist` | Add or replace a ticker |
//! | DELETE | `/watchlist/{symbol}` | Remove a ticker |
//! | GET | `/insights` | Market insights |
//! | GET | `/portfolio` | Portfolio insights |
//! | GET/POST | `/debug?debug-logs=on\|off` | Payload logging toggle (debug mode) |
//!
//! ## Example Usage
//!
//! ```bash
//! # Start with defaults (localhost:8080)
//! cargo run -- api-server
//!
//! # Custom host/port and text logs
//! TA_SERVER_PORT=3000 cargo run -- api-server --host 0.0.0.0 --log-format text
//!
//! # Add a ticker
//! curl -X POST http://localhost:8080/watchlist \
//!   -H "X-User-ID: alice" -H "Content-Type: application/json" \
//!   -d '{"symbol": "TSLA", "on_hand": true}'
//!
//! # List it
//! curl -H "X-User-ID: alice" http://localhost:8080/watchlist
//! ```
//!
//! ## Swagger UI
//!
//! Once the server is running, access the interactive API documentation at:
//!
//! ```text
//! http://localhost:8080/swagger-ui/
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod logging;
pub mod models;
pub mod server;
pub mod service;
pub mod state;
pub mod store;
